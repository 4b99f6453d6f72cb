//! Server configuration from environment variables

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Directory holding the backing files of live documents
    pub storage_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage_dir: default_storage_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparseable numbers fall
    /// back to their defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("PDFDESK_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            storage_dir: lookup("PDFDESK_STORAGE_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map_or(defaults.storage_dir, PathBuf::from),
            max_upload_bytes: lookup("PDFDESK_MAX_UPLOAD_BYTES")
                .and_then(|n| n.trim().parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_upload_bytes),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    std::env::temp_dir().join("pdfdesk")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
        assert!(config.storage_dir.ends_with("pdfdesk"));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PDFDESK_PORT", "9100"),
            ("PDFDESK_STORAGE_DIR", "/var/lib/pdfdesk"),
            ("PDFDESK_MAX_UPLOAD_BYTES", "1024"),
        ]);
        assert_eq!(config.port, 9100);
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/pdfdesk"));
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("PDFDESK_PORT", "eighty"),
            ("PDFDESK_STORAGE_DIR", "  "),
            ("PDFDESK_MAX_UPLOAD_BYTES", "0"),
        ]);
        assert_eq!(config, Config::default());
    }
}
