use anyhow::{Context, Result, bail};
use argbind::{ArgumentDefinition, ParseConfig, Registry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Contents of a definitions file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Definitions {
    #[serde(default)]
    pub config: ParseConfig,

    #[serde(default)]
    pub arguments: Vec<ArgumentDefinition>,
}

impl Definitions {
    /// Validate the declared arguments into a registry.
    pub fn registry(&self) -> Result<Registry> {
        Registry::from_definitions(self.arguments.iter().cloned())
            .context("invalid argument definitions")
    }
}

pub fn load_definitions(path: &Path) -> Result<Definitions> {
    if !path.exists() {
        bail!("definitions file not found: {}", path.display());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read definitions: {}", path.display()))?;
    let defs: Definitions = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse definitions JSON: {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        arguments = defs.arguments.len(),
        "loaded definitions"
    );
    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::Definitions;
    use argbind::BundleKeys;

    #[test]
    fn parses_config_and_arguments() {
        let defs: Definitions = serde_json::from_str(
            r#"{
                "config": { "bundle-keys": "whole" },
                "arguments": [
                    { "long-name": "input", "position": 0, "required": true },
                    { "long-name": "verbose", "short-name": "v", "has-value": false }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(defs.config.bundle_keys, BundleKeys::Whole);
        let registry = defs.registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(!registry.find_short('v').unwrap().has_value);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let defs: Definitions = serde_json::from_str(
            r#"{ "arguments": [ { "long-name": "a" }, { "long-name": "A" } ] }"#,
        )
        .unwrap();
        let err = defs.registry().unwrap_err();
        assert!(format!("{err:#}").contains("invalid argument definitions"));
    }

    #[test]
    fn positional_with_short_name_is_rejected() {
        let defs: Definitions = serde_json::from_str(
            r#"{
                "config": { "help-keys": ["help"] },
                "arguments": [ { "long-name": "input", "position": 0, "short-name": "i" } ]
            }"#,
        )
        .unwrap();
        assert_eq!(defs.config.help_keys, vec!["help"]);
        let err = defs.registry().unwrap_err();
        assert!(format!("{err:#}").contains("positional 'input' cannot have a short name"));
    }
}
