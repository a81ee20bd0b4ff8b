//! Post-processing configuration, read from YAML.

use std::path::{Path, PathBuf};

use hf_results::{DEFAULT_DATA_DIR, RunStore};
use serde::{Deserialize, Serialize};

use crate::error::{PostError, PostResult};
use crate::fields::EdgeSelect;

pub const DEFAULT_RUN_NAME: &str = "simulation";
pub const DEFAULT_SLICE_SAMPLES: usize = 105;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    /// Folder holding stored runs.
    pub data_dir: PathBuf,
    /// Run loaded when no name is given.
    pub default_run_name: String,
    /// Number of sample points along an interpolated slice.
    pub slice_samples: usize,
    pub default_edge: EdgeSelect,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".").join(DEFAULT_DATA_DIR),
            default_run_name: DEFAULT_RUN_NAME.to_string(),
            slice_samples: DEFAULT_SLICE_SAMPLES,
            default_edge: EdgeSelect::Mean,
        }
    }
}

impl PostConfig {
    pub fn load(path: &Path) -> PostResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> PostResult<Self> {
        let config: PostConfig = serde_yaml::from_str(content)
            .map_err(|e| PostError::Config(format!("Failed to parse config YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PostResult<()> {
        if self.slice_samples < 2 {
            return Err(PostError::Config(format!(
                "slice_samples must be at least 2, got {}",
                self.slice_samples
            )));
        }
        if self.default_run_name.trim().is_empty() {
            return Err(PostError::Config(
                "default_run_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn store(&self) -> RunStore {
        RunStore::open(self.data_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = PostConfig::from_yaml("slice_samples: 21\n").unwrap();
        assert_eq!(config.slice_samples, 21);
        assert_eq!(config.default_run_name, "simulation");
        assert_eq!(config.default_edge, EdgeSelect::Mean);
    }

    #[test]
    fn full_config_parses() {
        let yaml = "data_dir: /tmp/runs\ndefault_run_name: radial\nslice_samples: 51\ndefault_edge: top\n";
        let config = PostConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/runs"));
        assert_eq!(config.default_run_name, "radial");
        assert_eq!(config.default_edge, EdgeSelect::Top);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            PostConfig::from_yaml("slice_samples: 1\n"),
            Err(PostError::Config(_))
        ));
        assert!(matches!(
            PostConfig::from_yaml("default_edge: diagonal\n"),
            Err(PostError::Config(_))
        ));
    }
}
