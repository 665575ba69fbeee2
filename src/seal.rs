//! Seal command: hash the file, copy it into its zone, write the certificate, append the ledger.

use crate::certificate::{self, CertificateInfo};
use crate::digest;
use crate::ledger::{self, LedgerRecord};
use crate::zone::Zone;
use anyhow::anyhow;
use std::path::{Path, PathBuf};

pub const CERTIFICATES_DIR: &str = "certificates";
pub const REGISTRY_DIR: &str = "registry";
pub const LEDGER_FILE: &str = "ledger.json";

/// Inputs for one seal.
#[derive(Debug, Clone)]
pub struct SealRequest {
    pub source: PathBuf,
    pub zone: Zone,
    pub title: String,
    pub actor: String,
    /// Vault root holding the zone, certificate and registry directories.
    pub root: PathBuf,
}

/// What a completed seal wrote.
#[derive(Debug, Clone)]
pub struct SealOutcome {
    pub record: LedgerRecord,
    pub artifact_path: PathBuf,
    pub certificate_path: PathBuf,
    pub ledger_path: PathBuf,
    pub ledger_len: usize,
}

pub fn ledger_path(root: &Path) -> PathBuf {
    root.join(REGISTRY_DIR).join(LEDGER_FILE)
}

/// `SOVC-` plus the first 12 hex characters of the digest.
pub fn registry_id(sha256: &str) -> String {
    let prefix: String = sha256.chars().take(12).collect();
    format!("SOVC-{}", prefix)
}

fn create_dir(path: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(path).map_err(|e| anyhow!("Failed to create {}: {}", path.display(), e))
}

/// Relative path with forward slashes, as stored in the ledger.
fn rel(parts: &[&str]) -> String {
    parts.join("/")
}

pub fn run(request: &SealRequest) -> anyhow::Result<SealOutcome> {
    let source = request
        .source
        .canonicalize()
        .map_err(|e| anyhow!("Input file not found: {}: {}", request.source.display(), e))?;
    if !source.is_file() {
        return Err(anyhow!("Input is not a file: {}", source.display()));
    }
    let file_name = source
        .file_name()
        .and_then(|p| p.to_str())
        .ok_or_else(|| anyhow!("Input file name is not valid UTF-8: {}", source.display()))?
        .to_string();

    let zone_dir = request.root.join(request.zone.dir_name());
    let cert_dir = request.root.join(CERTIFICATES_DIR);
    let ledger_path = ledger_path(&request.root);
    // Copying a file onto itself truncates it.
    if let Ok(existing) = zone_dir.join(&file_name).canonicalize() {
        if existing == source {
            return Err(anyhow!(
                "{} is already sealed in zone {}",
                source.display(),
                request.zone
            ));
        }
    }
    create_dir(&zone_dir)?;
    create_dir(&cert_dir)?;
    create_dir(&request.root.join(REGISTRY_DIR))?;

    let sha256 = digest::sha256_file(&source)?;
    tracing::debug!(source = %source.display(), %sha256, "hashed input");

    let artifact_path = zone_dir.join(&file_name);
    std::fs::copy(&source, &artifact_path).map_err(|e| {
        anyhow!(
            "Failed to copy {} to {}: {}",
            source.display(),
            artifact_path.display(),
            e
        )
    })?;
    tracing::debug!(artifact = %artifact_path.display(), "artifact stored");

    let timestamp = chrono::Utc::now().to_rfc3339();
    let registry_id = registry_id(&sha256);
    let artifact = rel(&[request.zone.dir_name(), &file_name]);
    let cert_name = format!("{}.pdf", sha256);
    let certificate_path = cert_dir.join(&cert_name);

    let info = CertificateInfo {
        registry_id: registry_id.clone(),
        actor: request.actor.clone(),
        original_name: file_name.clone(),
        stored_name: artifact.clone(),
        zone: request.zone.to_string(),
        mime: certificate::guess_mime(&source).to_string(),
        title: request.title.clone(),
        timestamp_utc: timestamp.clone(),
        sha256: sha256.clone(),
    };
    certificate::write_certificate(&certificate_path, &info)?;

    let record = LedgerRecord {
        id: sha256,
        registry_id,
        title: request.title.clone(),
        zone: request.zone,
        actor: request.actor.clone(),
        timestamp,
        artifact,
        certificate_path: rel(&[CERTIFICATES_DIR, &cert_name]),
    };
    let ledger_len = ledger::append(&ledger_path, record.clone())?;

    tracing::info!(
        id = %record.id,
        zone = %record.zone,
        ledger_entries = ledger_len,
        "file sealed"
    );

    Ok(SealOutcome {
        record,
        artifact_path,
        certificate_path,
        ledger_path,
        ledger_len,
    })
}
