//! Proof-of-Seal certificate: a single US-Letter PDF page describing one seal.

use anyhow::anyhow;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

const PAGE_WIDTH: i32 = 612;
const PAGE_HEIGHT: i32 = 792;
const KEY_COL_WIDTH: f32 = 140.0;
const VALUE_COL_WIDTH: f32 = 380.0;
const ROW_HEIGHT: f32 = 20.0;
const CELL_FONT_SIZE: f32 = 9.0;
const CELL_PADDING: f32 = 4.0;

/// Helvetica advance widths (1/1000 em) for ' '..='~', from the standard AFM.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

pub const HEADING: &str = "SOVEREIGN-CLOUD - Proof-of-Seal Certificate";

/// Everything printed on a certificate.
#[derive(Debug, Clone)]
pub struct CertificateInfo {
    pub registry_id: String,
    pub actor: String,
    pub original_name: String,
    pub stored_name: String,
    pub zone: String,
    pub mime: String,
    pub title: String,
    pub timestamp_utc: String,
    pub sha256: String,
}

impl CertificateInfo {
    fn rows(&self) -> [(&'static str, &str); 7] {
        [
            ("File Name", &self.original_name),
            ("Stored As", &self.stored_name),
            ("Zone", &self.zone),
            ("MIME", &self.mime),
            ("Title", &self.title),
            ("Timestamp (UTC)", &self.timestamp_utc),
            ("SHA-256", &self.sha256),
        ]
    }
}

/// Minimal MIME guess from the file extension.
pub fn guess_mime(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// The standard Type1 fonts only cover Latin-1 via WinAnsi; keep to printable ASCII.
fn pdf_text(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' '..='~' => c,
            '\u{2010}'..='\u{2015}' => '-',
            _ => '?',
        })
        .collect()
}

/// Width in text-space units of ASCII `text` set in Helvetica at 1000 pt.
fn helvetica_units(text: &str) -> u32 {
    text.bytes()
        .map(|b| match b {
            b' '..=b'~' => u32::from(HELVETICA_WIDTHS[usize::from(b - b' ')]),
            _ => 556,
        })
        .sum()
}

/// Fit `s` into the value column, cutting with "..." when it would overflow.
fn cell_text(s: &str) -> String {
    let text = pdf_text(s);
    let max_units = ((VALUE_COL_WIDTH - 2.0 * CELL_PADDING) * 1000.0 / CELL_FONT_SIZE) as u32;
    if helvetica_units(&text) <= max_units {
        return text;
    }
    let budget = max_units - helvetica_units("...");
    let mut used = 0;
    let mut cut = String::new();
    for c in text.chars() {
        let w = helvetica_units(c.encode_utf8(&mut [0u8; 4]));
        if used + w > budget {
            break;
        }
        used += w;
        cut.push(c);
    }
    cut.push_str("...");
    cut
}

fn text_at(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(pdf_text(text))]));
    ops.push(Operation::new("ET", vec![]));
}

fn page_operations(info: &CertificateInfo) -> Vec<Operation> {
    let mut ops = Vec::new();
    let left = (PAGE_WIDTH as f32 - KEY_COL_WIDTH - VALUE_COL_WIDTH) / 2.0;

    text_at(&mut ops, "F2", 16.0, left, 720.0, HEADING);
    text_at(
        &mut ops,
        "F2",
        13.0,
        left,
        690.0,
        &format!("Registry ID: {}", info.registry_id),
    );
    text_at(&mut ops, "F1", 11.0, left, 668.0, &format!("Issued To: {}", info.actor));
    text_at(&mut ops, "F1", 11.0, left, 652.0, "Entity: Sovereign-Cloud Registry");

    let table_top = 628.0;
    ops.push(Operation::new("w", vec![0.3_f32.into()]));
    ops.push(Operation::new("RG", vec![0.5_f32.into(), 0.5_f32.into(), 0.5_f32.into()]));
    for (i, (key, value)) in info.rows().iter().enumerate() {
        let y = table_top - ROW_HEIGHT * (i as f32 + 1.0);
        ops.push(Operation::new(
            "re",
            vec![left.into(), y.into(), KEY_COL_WIDTH.into(), ROW_HEIGHT.into()],
        ));
        ops.push(Operation::new(
            "re",
            vec![
                (left + KEY_COL_WIDTH).into(),
                y.into(),
                VALUE_COL_WIDTH.into(),
                ROW_HEIGHT.into(),
            ],
        ));
        ops.push(Operation::new("S", vec![]));
        text_at(&mut ops, "F2", CELL_FONT_SIZE, left + CELL_PADDING, y + 7.0, key);
        text_at(
            &mut ops,
            "F1",
            CELL_FONT_SIZE,
            left + KEY_COL_WIDTH + CELL_PADDING,
            y + 7.0,
            &cell_text(value),
        );
    }

    let footer_y = table_top - ROW_HEIGHT * (info.rows().len() as f32) - 30.0;
    text_at(
        &mut ops,
        "F3",
        10.0,
        left,
        footer_y,
        "Digitally recorded and authenticated by the Sovereign-Cloud sealing tool.",
    );
    ops
}

fn build_document(info: &CertificateInfo) -> anyhow::Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font = |base: &str| {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Object::Name(base.as_bytes().to_vec()),
            "Encoding" => "WinAnsiEncoding",
        }
    };
    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let italic_id = doc.add_object(font("Helvetica-Oblique"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
            "F3" => italic_id,
        },
    });

    let content = Content {
        operations: page_operations(info),
    };
    let encoded = content
        .encode()
        .map_err(|e| anyhow!("Failed to encode certificate content: {}", e))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(pdf_text(&format!("Proof-of-Seal {}", info.registry_id))),
        "Author" => Object::string_literal(pdf_text(&info.actor)),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    Ok(doc)
}

/// Render the certificate and write it to `cert_path`, replacing any existing file.
pub fn write_certificate(cert_path: &Path, info: &CertificateInfo) -> anyhow::Result<()> {
    let mut doc = build_document(info)?;
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| anyhow!("Failed to render certificate: {}", e))?;
    std::fs::write(cert_path, bytes)
        .map_err(|e| anyhow!("Failed to write certificate {}: {}", cert_path.display(), e))?;
    tracing::debug!(certificate = %cert_path.display(), "certificate written");
    Ok(())
}
