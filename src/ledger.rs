//! Seal ledger: a single pretty-printed JSON array of records, rewritten on every append.
//!
//! Read-modify-write with no locking; two concurrent seals can lose an entry.

use crate::zone::Zone;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// SHA-256 hex digest of the sealed artifact.
    pub id: String,
    pub registry_id: String,
    pub title: String,
    pub zone: Zone,
    pub actor: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    /// Stored artifact, relative to the vault root.
    pub artifact: String,
    /// Certificate PDF, relative to the vault root.
    pub certificate_path: String,
}

/// Read all records. A missing or blank file is an empty ledger; anything else that
/// is not a JSON array of records is an error.
pub fn load(ledger_path: &Path) -> anyhow::Result<Vec<LedgerRecord>> {
    let s = match std::fs::read_to_string(ledger_path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(anyhow::anyhow!(
                "Failed to read ledger {}: {}",
                ledger_path.display(),
                e
            ))
        }
    };
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&s).map_err(|e| {
        anyhow::anyhow!("Invalid ledger JSON in {}: {}", ledger_path.display(), e)
    })
}

/// Overwrite the ledger with `records`, pretty-printed.
pub fn save(ledger_path: &Path, records: &[LedgerRecord]) -> anyhow::Result<()> {
    if let Some(parent) = ledger_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("Failed to create {}: {}", parent.display(), e)
            })?;
        }
    }
    let mut out = serde_json::to_string_pretty(records)?;
    out.push('\n');
    std::fs::write(ledger_path, out)
        .map_err(|e| anyhow::anyhow!("Failed to write ledger {}: {}", ledger_path.display(), e))
}

/// Append one record after the existing ones. Returns the ledger length afterwards.
pub fn append(ledger_path: &Path, record: LedgerRecord) -> anyhow::Result<usize> {
    let mut records = load(ledger_path)?;
    records.push(record);
    save(ledger_path, &records)?;
    tracing::debug!(
        ledger = %ledger_path.display(),
        entries = records.len(),
        "ledger updated"
    );
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(n: usize) -> LedgerRecord {
        let id = format!("{:064x}", n);
        LedgerRecord {
            registry_id: format!("SOVC-{}", &id[..12]),
            id: id.clone(),
            title: format!("Doc {}", n),
            zone: Zone::ALL[n % 3],
            actor: "A. Smith".to_string(),
            timestamp: "2025-01-01T00:00:00+00:00".to_string(),
            artifact: format!("{}/doc{}.txt", Zone::ALL[n % 3], n),
            certificate_path: format!("certificates/{}.pdf", id),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("ledger.json")).unwrap().is_empty());
    }

    #[test]
    fn first_append_creates_single_element_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry").join("ledger.json");
        let rec = record(1);

        assert_eq!(append(&path, rec.clone()).unwrap(), 1);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["zone"], "encrypted");
        assert_eq!(load(&path).unwrap(), vec![rec]);
    }

    #[test]
    fn empty_array_file_is_fresh_ledger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "[]").unwrap();
        append(&path, record(7)).unwrap();
        assert_eq!(load(&path).unwrap(), vec![record(7)]);
    }

    #[test]
    fn unreadable_ledger_is_error_not_empty() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("registry");
        std::fs::write(&blocker, b"plain file").unwrap();
        // The parent is a file, so the read fails with something other than NotFound.
        let path = blocker.join("ledger.json");

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to read ledger"));
        assert!(append(&path, record(1)).is_err());
    }

    #[test]
    fn ledger_path_that_is_a_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::create_dir_all(&path).unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn blank_file_is_fresh_ledger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "\n  \n").unwrap();
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn appends_keep_insertion_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let expected: Vec<LedgerRecord> = (0..5).map(record).collect();
        for (i, rec) in expected.iter().enumerate() {
            assert_eq!(append(&path, rec.clone()).unwrap(), i + 1);
        }
        assert_eq!(load(&path).unwrap(), expected);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let records: Vec<LedgerRecord> = (10..13).map(record).collect();
        save(&path, &records).unwrap();
        assert_eq!(load(&path).unwrap(), records);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n"));
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn corrupt_ledger_is_fatal_and_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = append(&path, record(1)).unwrap_err();
        assert!(err.to_string().contains("Invalid ledger JSON"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn non_array_json_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, r#"{"id": "x"}"#).unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn unknown_zone_in_ledger_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let mut value = serde_json::to_value(vec![record(1)]).unwrap();
        value[0]["zone"] = serde_json::Value::String("vault".into());
        std::fs::write(&path, value.to_string()).unwrap();
        assert!(load(&path).is_err());
    }
}
