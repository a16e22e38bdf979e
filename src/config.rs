use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Configuration for the trace memory and its context window builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum size of one trace chunk, in characters. The context window
    /// builder grows its window one chunk at a time, so smaller chunks give a
    /// finer-grained fit at the cost of more render/count iterations.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    200
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

impl MemoryConfig {
    /// Load config from the file named by `WAYFINDER_CONFIG`, falling back to
    /// defaults when the variable is unset or the file is unreadable.
    pub fn load() -> Self {
        if let Ok(path) = env::var("WAYFINDER_CONFIG") {
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded memory config from {:?}", path);
                    return config;
                }
                Err(e) => {
                    tracing::error!("Failed to load {:?}: {}", path, e);
                }
            }
        }
        Self::default()
    }

    /// Parse config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_chunk_size() {
        assert_eq!(MemoryConfig::default().chunk_size, 200);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_size = 64").unwrap();
        let config = MemoryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.chunk_size, 64);
    }

    #[test]
    fn test_from_file_empty_uses_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = MemoryConfig::from_file(file.path()).unwrap();
        assert_eq!(config.chunk_size, 200);
    }

    #[test]
    fn test_from_file_missing_is_error() {
        assert!(MemoryConfig::from_file("/nonexistent/wayfinder.toml").is_err());
    }
}
