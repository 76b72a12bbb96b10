use serde::{Deserialize, Serialize};

/// Configuration for code chunking behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Lines per fragment window
    pub window_lines: usize,

    /// A file with more imports than this is tagged `heavy-imports`
    pub heavy_import_threshold: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            window_lines: 30,
            heavy_import_threshold: 5,
        }
    }
}

impl ChunkerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window_lines == 0 {
            return Err("window_lines must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(ChunkerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_window_invalid() {
        let config = ChunkerConfig {
            window_lines: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_like_input_keeps_defaults() {
        let config: ChunkerConfig = serde_json::from_str(r#"{"window_lines": 40}"#).unwrap();
        assert_eq!(config.window_lines, 40);
        assert_eq!(config.heavy_import_threshold, 5);
    }
}
