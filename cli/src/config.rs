//! Parser settings file.
//!
//! `yaclap parse --config FILE` reads a [`ParserConfig`] from YAML. Missing
//! keys fall back to the defaults.
//!
//! ```yaml
//! prefix: "/"
//! arguments_first: true
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;
use yaclap_core::ParserConfig;

/// Errors raised while loading a settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Loads parser settings from a YAML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ParserConfig, ConfigError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yaclap.yaml");
        fs::write(&path, "prefix: \"/\"\narguments_first: true\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.prefix, "/");
        assert!(config.arguments_first);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yaclap.yaml");
        fs::write(&path, "arguments_first: true\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.prefix, "--");
        assert!(config.arguments_first);
    }

    #[test]
    fn test_config_round_trips_through_yaml() {
        let config = ParserConfig::default().with_prefix("-").arguments_first(true);
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: ParserConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.yaml"));
    }

    #[test]
    fn test_malformed_yaml_is_yaml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "arguments_first: [not, a, bool]\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }
}
