use crate::batch::DEFAULT_BATCH_SIZE;
use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// EbaConfig
// ---------------------------------------------------------------------------

/// Optional `<ebafiles>/config.yaml`. Every key has a default, so a missing
/// file and an empty file behave the same.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EbaConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sloctl: Option<PathBuf>,
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_output_extension() -> String {
    "yml".to_string()
}

impl Default for EbaConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            sloctl: None,
            output_extension: default_output_extension(),
        }
    }
}

impl EbaConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: EbaConfig = serde_yaml::from_str(&data)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Semantic checks that serde can't express. Any `WarnLevel::Error`
    /// entry means the config must not be used.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.batch_size == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "batch_size must be at least 1".to_string(),
            });
        } else if self.batch_size > DEFAULT_BATCH_SIZE {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "batch_size {} exceeds {DEFAULT_BATCH_SIZE}; Nobl9 may reject larger adjustments",
                    self.batch_size
                ),
            });
        }

        let ext = self.output_extension.as_str();
        if ext.is_empty() || ext.contains(['/', '\\', '.']) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "output_extension '{ext}' must be a bare extension such as 'yml'"
                ),
            });
        } else if !ext.eq_ignore_ascii_case("yml") && !ext.eq_ignore_ascii_case("yaml") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("output_extension '{ext}' is not yml or yaml"),
            });
        }

        if let Some(bin) = &self.sloctl {
            if bin.as_os_str().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "sloctl path is empty".to_string(),
                });
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = EbaConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.batch_size, 30);
        assert_eq!(cfg.output_extension, "yml");
        assert!(cfg.sloctl.is_none());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(paths::config_path(dir.path()), "batch_size: 10\n").unwrap();
        let cfg = EbaConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.batch_size, 10);
        assert_eq!(cfg.output_extension, "yml");
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(paths::config_path(dir.path()), "\n").unwrap();
        assert_eq!(EbaConfig::load(dir.path()).unwrap().batch_size, 30);
    }

    #[test]
    fn full_file_is_read() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            paths::config_path(dir.path()),
            "batch_size: 12\nsloctl: /opt/nobl9/sloctl\noutput_extension: yaml\n",
        )
        .unwrap();
        let loaded = EbaConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.batch_size, 12);
        assert_eq!(loaded.sloctl, Some(PathBuf::from("/opt/nobl9/sloctl")));
        assert_eq!(loaded.output_extension, "yaml");
        assert!(loaded.validate().is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(paths::config_path(dir.path()), "batch_size: [1, 2\n").unwrap();
        assert!(EbaConfig::load(dir.path()).is_err());
    }

    #[test]
    fn zero_batch_size_is_an_error() {
        let cfg = EbaConfig {
            batch_size: 0,
            ..EbaConfig::default()
        };
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
    }

    #[test]
    fn large_batch_size_is_a_warning() {
        let cfg = EbaConfig {
            batch_size: 50,
            ..EbaConfig::default()
        };
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
        assert!(warnings[0].message.contains("50"));
    }

    #[test]
    fn bad_extension() {
        let cfg = EbaConfig {
            output_extension: ".yml".to_string(),
            ..EbaConfig::default()
        };
        assert!(cfg
            .validate()
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("output_extension")));

        let cfg = EbaConfig {
            output_extension: "txt".to_string(),
            ..EbaConfig::default()
        };
        assert_eq!(cfg.validate()[0].level, WarnLevel::Warning);
    }
}
