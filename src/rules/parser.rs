//! Rules parser for loading the approval YAML document.
//!
//! This module handles loading the rule set from disk with proper
//! error reporting; pattern compilation lives in [`super::compile`].

use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, Result, TfApplyError};

use super::spec::RuleSet;

/// Parser for approval rules files.
#[derive(Debug, Default, Clone, Copy)]
pub struct RulesParser;

impl RulesParser {
    /// Creates a new rules parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads a rule set from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<RuleSet> {
        let path = path.as_ref();
        info!("Loading approval rules from: {}", path.display());

        if !path.exists() {
            return Err(TfApplyError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            TfApplyError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses a rule set from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<RuleSet> {
        debug!("Parsing YAML rules");

        let rules: RuleSet = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            TfApplyError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!("Parsed {} approval rules", rules.len());
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_rules_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "changedResources:\n  - path: aws_instance\\.web\n    attributes:\n      - name: instance_type\n        new: ^t2\\."
        )
        .unwrap();

        let parser = RulesParser::new();
        let rules = parser.load_file(file.path()).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.changed_resources[0].path, "aws_instance\\.web");
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let parser = RulesParser::new();
        let result = parser.load_file("/nonexistent/apply.yml");
        assert!(matches!(
            result,
            Err(TfApplyError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_invalid_yaml_is_a_config_error() {
        let parser = RulesParser::new();
        let result = parser.parse_yaml("changedResources: {not a list", None);
        assert!(matches!(
            result,
            Err(TfApplyError::Config(ConfigError::ParseError { .. }))
        ));
    }
}
