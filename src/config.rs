use crate::error::TranspileError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for a [`crate::Transpiler`]. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspilerConfig {
    /// Reject documents whose doctype declares entities.
    pub disable_entities: bool,
    /// Value written to the stylesheet's `version` attribute.
    pub target_version: String,
    /// Rewrite calls to registered native callbacks into `ext:call(...)`.
    pub native_callbacks: bool,
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        Self {
            disable_entities: true,
            target_version: "1.0".to_string(),
            native_callbacks: true,
        }
    }
}

impl TranspilerConfig {
    pub fn from_json(json: &str) -> Result<Self, TranspileError> {
        serde_json::from_str(json)
            .map_err(|e| TranspileError::Config(format!("Invalid configuration: {}", e)))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TranspileError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            TranspileError::Config(format!(
                "Failed to read configuration from '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TranspilerConfig::default();
        assert!(config.disable_entities);
        assert_eq!(config.target_version, "1.0");
        assert!(config.native_callbacks);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TranspilerConfig::from_json(r#"{ "native_callbacks": false }"#).unwrap();
        assert!(!config.native_callbacks);
        assert!(config.disable_entities);
        assert_eq!(config.target_version, "1.0");
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        assert!(matches!(
            TranspilerConfig::from_json("{ \"disable_entities\": \"yes\" }"),
            Err(TranspileError::Config(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downlevel.json");
        std::fs::write(&path, r#"{ "target_version": "1.1" }"#).unwrap();
        assert_eq!(
            TranspilerConfig::from_file(&path).unwrap().target_version,
            "1.1"
        );
        assert!(TranspilerConfig::from_file(dir.path().join("missing.json")).is_err());
    }
}
