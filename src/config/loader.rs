//! Configuration loader

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::cache::CacheConfig;
use crate::error::{ConfigError, FixLensError};

use super::presets::Preset;
use super::{AnalysisConfig, CollaboratorConfig, FixConfig, RuleConfig, RunConfig, ScanConfig};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILENAME: &str = ".fixlens.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preset name (minimal, standard, strict)
    #[serde(default = "default_preset")]
    pub preset: String,

    /// File discovery settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Detector settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Per-kind overrides, keyed by issue kind name
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,

    /// Patch validation settings
    #[serde(default)]
    pub fix: FixConfig,

    /// Run limits
    #[serde(default)]
    pub run: RunConfig,

    /// Analysis cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Rewrite collaborator settings
    #[serde(default)]
    pub collaborator: CollaboratorConfig,
}

fn default_preset() -> String {
    "standard".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            scan: ScanConfig::default(),
            analysis: AnalysisConfig::default(),
            rules: HashMap::new(),
            fix: FixConfig::default(),
            run: RunConfig::default(),
            cache: CacheConfig::default(),
            collaborator: CollaboratorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or return default
    pub fn load_or_default() -> Result<Self, FixLensError> {
        let config_path = Path::new(CONFIG_FILENAME);

        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path when given, otherwise fall back to the working directory
    pub fn load(path: Option<&Path>) -> Result<Self, FixLensError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_or_default(),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, FixLensError> {
        let content = fs::read_to_string(path).map_err(|e| {
            FixLensError::Config(ConfigError::FileRead {
                path: path.display().to_string(),
                source: e,
            })
        })?;

        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), preset = %config.preset, "Loaded configuration");
        Ok(config)
    }

    /// Create a new configuration from a preset
    pub fn from_preset(preset: Preset) -> Self {
        let mut config = Self {
            preset: preset.name().to_string(),
            ..Default::default()
        };

        match preset {
            Preset::Minimal => {
                config.analysis.deep_heuristics = false;
                for kind in preset.disabled_kinds() {
                    config
                        .rules
                        .insert(kind.to_string(), RuleConfig { enabled: false });
                }
            }
            Preset::Standard => {}
            Preset::Strict => {
                config.fix.min_length_ratio = 0.5;
                config.run.max_files = 500;
            }
        }

        config
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, FixLensError> {
        toml::to_string_pretty(self).map_err(Into::into)
    }

    /// Check if an issue kind is enabled
    pub fn is_rule_enabled(&self, kind: &str) -> bool {
        self.rules.get(kind).map(|r| r.enabled).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.preset, "standard");
        assert!(config.analysis.deep_heuristics);
        assert_eq!(config.run.max_files, 50);
        assert_eq!(config.scan.backup_marker, ".backup_");
        assert!(!config.scan.respect_gitignore);
        assert!((config.fix.min_length_ratio - 0.2).abs() < f64::EPSILON);
        assert!(!config.collaborator.enabled);
    }

    #[test]
    fn test_from_preset_minimal_disables_style_kinds() {
        let config = Config::from_preset(Preset::Minimal);
        assert_eq!(config.preset, "minimal");
        assert!(!config.analysis.deep_heuristics);
        assert!(!config.is_rule_enabled("StyleIssue"));
        assert!(config.is_rule_enabled("SecurityIssue"));
    }

    #[test]
    fn test_from_preset_strict() {
        let config = Config::from_preset(Preset::Strict);
        assert_eq!(config.preset, "strict");
        assert_eq!(config.run.max_files, 500);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let toml_content = r#"
preset = "standard"

[scan]
ignore_dirs = ["vendor"]

[rules.StyleIssue]
enabled = false

[run]
max_files = 10
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.scan.ignore_dirs, vec!["vendor".to_string()]);
        assert!(config.scan.extensions.contains(&"py".to_string()));
        assert!(!config.is_rule_enabled("StyleIssue"));
        assert!(config.is_rule_enabled("BareExcept"));
        assert_eq!(config.run.max_files, 10);
        assert_eq!(config.collaborator.timeout_secs, 60);
    }

    #[test]
    fn test_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);

        let config = Config::from_preset(Preset::Minimal);
        fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.preset, "minimal");
        assert!(!loaded.is_rule_enabled("CodeQuality"));
    }

    #[test]
    fn test_load_from_missing_file_is_config_error() {
        let result = Config::load_from_file(Path::new("/nonexistent/.fixlens.toml"));
        assert!(matches!(
            result,
            Err(FixLensError::Config(ConfigError::FileRead { .. }))
        ));
    }
}
