//! Transpiler options.
//!
//! All fields have defaults, so an empty TOML file (or no file at all) gives
//! the standard behaviour:
//!
//! ```toml
//! call_names = ["updateDisplay", "readSensor"]
//! pointer_types = ["BLEServer", "BLEService", "BLECharacteristic", "BLEAdvertising"]
//! value_types = ["Preferences"]
//! startup_delay_ms = 1000
//! serial_buffer_size = 1024
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Error loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Options controlling translation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranspileOptions {
    /// Extra identifiers whose `name(args)` form is a call, never an array
    /// index.
    pub call_names: Vec<String>,
    /// Library types declared as null-initialized pointers.
    pub pointer_types: Vec<String>,
    /// Library types always declared by value.
    pub value_types: Vec<String>,
    /// Delay at the start of `setup()`.
    pub startup_delay_ms: u32,
    /// Serial rx/tx buffer size configured after `SerialBegin`.
    pub serial_buffer_size: u32,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            call_names: Vec::new(),
            pointer_types: ["BLEServer", "BLEService", "BLECharacteristic", "BLEAdvertising"]
                .into_iter()
                .map(String::from)
                .collect(),
            value_types: vec!["Preferences".to_string()],
            startup_delay_ms: 1000,
            serial_buffer_size: 1024,
        }
    }
}

impl TranspileOptions {
    /// Parses options from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads options from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// True if `type_name` is declared as a pointer.
    pub fn is_pointer_type(&self, type_name: &str) -> bool {
        let listed = |list: &[String]| list.iter().any(|t| t.eq_ignore_ascii_case(type_name));
        listed(&self.pointer_types) && !listed(&self.value_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(
            TranspileOptions::from_toml("").unwrap(),
            TranspileOptions::default()
        );
    }

    #[test]
    fn test_partial_config() {
        let options = TranspileOptions::from_toml(
            "call_names = [\"readSensor\"]\nstartup_delay_ms = 250\n",
        )
        .unwrap();
        assert_eq!(options.call_names, vec!["readSensor".to_string()]);
        assert_eq!(options.startup_delay_ms, 250);
        assert_eq!(options.serial_buffer_size, 1024);
    }

    #[test]
    fn test_unknown_key_is_error() {
        let err = TranspileOptions::from_toml("startup_delay = 5").unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn test_pointer_types() {
        let mut options = TranspileOptions::default();
        assert!(options.is_pointer_type("bleserver"));
        assert!(!options.is_pointer_type("Preferences"));
        options.pointer_types.push("Preferences".to_string());
        assert!(!options.is_pointer_type("Preferences"));
    }

    #[test]
    fn test_missing_file() {
        let err = TranspileOptions::load(Path::new("/nonexistent/vb2arduino.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
