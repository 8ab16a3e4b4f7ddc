//! YAML reading and writing for entity files

pub mod diagnostics;

pub use diagnostics::{YamlError, YamlSyntaxError};

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Parse a YAML file into `T`, mapping parse errors to source diagnostics
pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml_str(&content, &path.display().to_string())
}

/// Parse YAML text into `T`; `filename` is used for diagnostics only
pub fn parse_yaml_str<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, content, filename).into())
}

/// Serialize `value` and write it to `path`
///
/// Writes to a sibling temp file first and renames it over the target, so a
/// reader never sees a half-written entity.
pub fn write_yaml_file<T: Serialize>(path: &Path, value: &T) -> Result<(), YamlError> {
    let yaml = serde_yml::to_string(value).map_err(|e| YamlError::Serialize(e.to_string()))?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
    struct Sample {
        name: String,
        stock: u32,
    }

    #[test]
    fn test_write_then_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.pws.yaml");
        let sample = Sample {
            name: "Pine board".to_string(),
            stock: 40,
        };

        write_yaml_file(&path, &sample).unwrap();
        let parsed: Sample = parse_yaml_file(&path).unwrap();
        assert_eq!(parsed, sample);
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[test]
    fn test_fractional_stock_is_a_diagnostic() {
        let err = parse_yaml_str::<Sample>("name: x\nstock: 2.5\n", "x.pws.yaml").unwrap_err();
        match err {
            YamlError::Syntax(e) => assert!(e.message().contains("u32")),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}
