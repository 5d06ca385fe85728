use serde::{Deserialize, Serialize};

/// Declared metadata for one argument.
///
/// A definition is either *named* (`position == None`), matched by
/// `--long_name` or `-c`, or *positional* (`position == Some(i)`), matched
/// by encounter order. Positional definitions keep a `long_name` for usage
/// output and diagnostics, but it is never looked up while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgumentDefinition {
    pub long_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<char>,
    #[serde(default = "default_has_value")]
    pub has_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, rename = "required")]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
}

fn default_has_value() -> bool {
    true
}

impl ArgumentDefinition {
    /// A named, value-taking, optional argument.
    pub fn named(long_name: impl Into<String>) -> Self {
        Self {
            long_name: long_name.into(),
            short_name: None,
            has_value: true,
            default_value: None,
            is_required: false,
            position: None,
            help: String::new(),
        }
    }

    /// A named argument that never consumes a value (`--verbose`, `-v`).
    pub fn flag(long_name: impl Into<String>) -> Self {
        Self::named(long_name).has_value(false)
    }

    /// A positional argument at `index`; `name` is only used for display.
    pub fn positional(name: impl Into<String>, index: usize) -> Self {
        Self {
            position: Some(index),
            ..Self::named(name)
        }
    }

    pub fn short(mut self, c: char) -> Self {
        self.short_name = Some(c);
        self
    }

    pub fn has_value(mut self, has_value: bool) -> Self {
        self.has_value = has_value;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.is_required = required;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn is_positional(&self) -> bool {
        self.position.is_some()
    }

    pub fn is_named(&self) -> bool {
        self.position.is_none()
    }

    /// Case-insensitive comparison against a `--name` token.
    pub(crate) fn matches_long(&self, name: &str) -> bool {
        self.is_named() && self.long_name.to_lowercase() == name.to_lowercase()
    }
}
