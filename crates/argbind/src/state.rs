use indexmap::IndexMap;
use serde::Serialize;

/// Sentinel value recorded for flag-style named arguments.
pub const PRESENT: &str = "1";

/// Values collected by one parse pass.
///
/// Keys of `named` are unique and the last write wins. `positional` and
/// `errors` are append-only and keep encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseState {
    pub named: IndexMap<String, String>,
    pub positional: Vec<String>,
    pub errors: Vec<String>,
}

impl ParseState {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Whether any of `help_keys` was recorded as a named argument.
    pub fn wants_help<S: AsRef<str>>(&self, help_keys: &[S]) -> bool {
        help_keys.iter().any(|k| self.named.contains_key(k.as_ref()))
    }

    pub(crate) fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.named.insert(name.into(), value.into());
    }

    pub(crate) fn set_present(&mut self, name: impl Into<String>) {
        self.set(name, PRESENT);
    }
}
