use serde::{Deserialize, Serialize};

/// How an unrecognized character inside a short-option bundle is keyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleKeys {
    /// `-xy` with neither `x` nor `y` declared records `x` and `y`.
    #[default]
    PerChar,
    /// `-xy` records the whole remainder `xy`, once per character.
    Whole,
}

/// Parser settings that are not tied to a single argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParseConfig {
    pub bundle_keys: BundleKeys,
    /// Named keys that request usage output instead of a bound value.
    pub help_keys: Vec<String>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            bundle_keys: BundleKeys::PerChar,
            help_keys: vec!["help".to_string(), "h".to_string(), "?".to_string()],
        }
    }
}

impl ParseConfig {
    pub fn bundle_keys(mut self, bundle_keys: BundleKeys) -> Self {
        self.bundle_keys = bundle_keys;
        self
    }

    pub fn help_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.help_keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{BundleKeys, ParseConfig};

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: ParseConfig = serde_json::from_str(r#"{ "bundle-keys": "whole" }"#).unwrap();
        assert_eq!(config.bundle_keys, BundleKeys::Whole);
        assert_eq!(config.help_keys, vec!["help", "h", "?"]);

        let config: ParseConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ParseConfig::default());
    }
}
