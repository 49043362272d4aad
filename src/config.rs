//! Configuration management for the forensics service

use crate::export::DEFAULT_FILE_PREFIX;
use crate::graph::filter::Selection;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject carrying finished analysis results
    pub analysis_subject: String,
    /// Subject for outgoing export documents
    pub export_subject: String,
}

/// Default view applied to every new graph for the logged overview
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewConfig {
    pub isolated_ring_id: Option<String>,
    #[serde(default)]
    pub high_risk_only: bool,
}

impl ViewConfig {
    pub fn selection(&self) -> Selection {
        Selection {
            isolated_ring_id: self.isolated_ring_id.clone(),
            high_risk_only: self.high_risk_only,
        }
    }
}

/// Export artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// When set, exports are also written here
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_true")]
    pub pretty: bool,
    /// Publish exports on the export subject
    #[serde(default = "default_true")]
    pub publish: bool,
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_prefix: default_file_prefix(),
            pretty: true,
            publish: true,
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of analysis results handled concurrently
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                analysis_subject: "analysis.results".to_string(),
                export_subject: "forensics.exports".to_string(),
            },
            view: ViewConfig::default(),
            export: ExportConfig::default(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::filter::ViewMode;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.nats.analysis_subject, "analysis.results");
        assert_eq!(config.export.file_prefix, "fincen_extract");
        assert!(config.export.output_dir.is_none());
        assert_eq!(config.pipeline.workers, 4);
        assert_eq!(config.view.selection().mode(), ViewMode::All);
    }

    #[test]
    fn test_shipped_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/config.toml");
        let config = AppConfig::load_from_path(path).unwrap();
        assert_eq!(config.nats.export_subject, "forensics.exports");
        assert!(config.export.publish);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_view_selection() {
        let view = ViewConfig {
            isolated_ring_id: Some("RING_007".to_string()),
            high_risk_only: true,
        };
        assert_eq!(view.selection().mode(), ViewMode::Isolated("RING_007"));
    }
}
