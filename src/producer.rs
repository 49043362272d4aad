//! Export document sinks: NATS publication and on-disk artifacts

use crate::config::ExportConfig;
use crate::export::{artifact_name, ExportDocument};
use anyhow::{bail, Context, Result};
use async_nats::Client;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Producer for publishing export documents to NATS
#[derive(Clone)]
pub struct ExportProducer {
    client: Client,
    subject: String,
}

impl ExportProducer {
    /// Create a new export producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish an export document
    pub async fn publish(&self, document: &ExportDocument, session_id: Uuid) -> Result<()> {
        let payload = document.to_json(false)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            session_id = %session_id,
            accounts = document.suspicious_accounts.len(),
            rings = document.fraud_rings.len(),
            "Published export document"
        );

        Ok(())
    }

    /// Get the subject name
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Upper bound on `_<n>` suffixes tried for one timestamp
const MAX_NAME_ATTEMPTS: usize = 1024;

/// Writes export documents as timestamped JSON artifacts
#[derive(Debug, Clone)]
pub struct ExportFileWriter {
    output_dir: PathBuf,
    file_prefix: String,
    pretty: bool,
}

impl ExportFileWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, file_prefix: &str, pretty: bool) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            file_prefix: file_prefix.to_string(),
            pretty,
        }
    }

    /// Build a writer from config; `None` when no output directory is set
    pub fn from_config(config: &ExportConfig) -> Option<Self> {
        config
            .output_dir
            .as_ref()
            .map(|dir| Self::new(dir, &config.file_prefix, config.pretty))
    }

    /// Write `document` as `<prefix>_<unix-millis>.json`.
    ///
    /// Existing artifacts are never overwritten: a name already taken gets a
    /// `_<n>` suffix before the extension.
    pub fn write(&self, document: &ExportDocument, at: DateTime<Utc>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create export directory {}", self.output_dir.display())
        })?;

        let payload = document.to_json(self.pretty)?;
        let base = artifact_name(&self.file_prefix, at);
        let stem = base.trim_end_matches(".json");

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = match attempt {
                0 => base.clone(),
                n => format!("{}_{}.json", stem, n),
            };
            let path = self.output_dir.join(name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to create export {}", path.display()))
                }
            };
            file.write_all(&payload)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;

            info!(path = %path.display(), "Export artifact written");
            return Ok(path);
        }

        bail!(
            "No free export name for {} in {}",
            base,
            self.output_dir.display()
        )
    }
}

#[cfg(test)]
mod tests {
    // Publication tests would require a running NATS server
    use super::*;
    use crate::export::{ExportedRing, ExportedSummary};
    use chrono::TimeZone;

    #[test]
    fn test_file_writer_round_trip() {
        let dir = std::env::temp_dir().join(format!("forensics-export-{}", Uuid::new_v4()));
        let writer = ExportFileWriter::new(&dir, "fincen_extract", true);

        let document = ExportDocument {
            suspicious_accounts: Vec::new(),
            fraud_rings: vec![ExportedRing {
                ring_id: "RING_001".to_string(),
                member_accounts: vec!["ACC_1".to_string(), "ACC_2".to_string()],
                pattern_type: "cycle".to_string(),
                risk_score: 91.0,
            }],
            summary: ExportedSummary {
                fraud_rings_detected: Some(1.into()),
                ..Default::default()
            },
        };

        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let path = writer.write(&document, at).unwrap();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("fincen_extract_1704067200000.json")
        );

        let written: ExportDocument =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, document);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_same_millisecond_exports_do_not_collide() {
        let dir = std::env::temp_dir().join(format!("forensics-export-{}", Uuid::new_v4()));
        let writer = ExportFileWriter::new(&dir, "fincen_extract", false);
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let first = ExportDocument::default();
        let second = ExportDocument {
            summary: ExportedSummary {
                fraud_rings_detected: Some(2.into()),
                ..Default::default()
            },
            ..Default::default()
        };

        let path_a = writer.write(&first, at).unwrap();
        let path_b = writer.write(&second, at).unwrap();
        assert_ne!(path_a, path_b);
        assert_eq!(
            path_b.file_name().and_then(|n| n.to_str()),
            Some("fincen_extract_1704067200000_1.json")
        );
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 2);

        let read = |path: &PathBuf| -> ExportDocument {
            serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
        };
        assert_eq!(read(&path_a), first);
        assert_eq!(read(&path_b), second);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_writer_disabled_without_output_dir() {
        assert!(ExportFileWriter::from_config(&ExportConfig::default()).is_none());
    }

    #[test]
    fn test_writer_from_config() {
        let config = ExportConfig {
            output_dir: Some(PathBuf::from("exports")),
            ..Default::default()
        };
        assert!(ExportFileWriter::from_config(&config).is_some());
    }
}
