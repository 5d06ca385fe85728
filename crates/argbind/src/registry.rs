use serde::Serialize;
use thiserror::Error;

use crate::definition::ArgumentDefinition;

/// A definition that would make lookups ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("arg definition conflict: --{0} is declared more than once")]
    DuplicateLongName(String),
    #[error("arg definition conflict: -{short} maps to both '{first}' and '{second}'")]
    DuplicateShortName {
        short: char,
        first: String,
        second: String,
    },
    #[error("arg definition conflict: positional '{name}' cannot have {field}")]
    PositionalWithNamedField { name: String, field: &'static str },
    #[error("arg definition conflict: position {index} maps to both '{first}' and '{second}'")]
    DuplicatePosition {
        index: usize,
        first: String,
        second: String,
    },
}

/// Declared arguments, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Registry {
    definitions: Vec<ArgumentDefinition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting the first conflicting definition.
    pub fn from_definitions<I>(definitions: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = ArgumentDefinition>,
    {
        let mut registry = Self::new();
        for def in definitions {
            registry.add(def)?;
        }
        Ok(registry)
    }

    /// Register one definition.
    ///
    /// Long names must be unique case-insensitively among named
    /// definitions, short names must be unique, and no two positional
    /// definitions may share an index. Positional definitions cannot carry
    /// a short name, a default value or `has_value == false`.
    pub fn add(&mut self, def: ArgumentDefinition) -> Result<(), RegistryError> {
        if let Some(index) = def.position {
            let field = if def.short_name.is_some() {
                Some("a short name")
            } else if def.default_value.is_some() {
                Some("a default value")
            } else if !def.has_value {
                Some("has-value disabled")
            } else {
                None
            };
            if let Some(field) = field {
                return Err(RegistryError::PositionalWithNamedField {
                    name: def.long_name,
                    field,
                });
            }
            if let Some(prev) = self.positional_at(index) {
                return Err(RegistryError::DuplicatePosition {
                    index,
                    first: prev.long_name.clone(),
                    second: def.long_name,
                });
            }
        } else {
            if self.find_long(&def.long_name).is_some() {
                return Err(RegistryError::DuplicateLongName(def.long_name));
            }
            if let Some(short) = def.short_name {
                if let Some(prev) = self.find_short(short) {
                    return Err(RegistryError::DuplicateShortName {
                        short,
                        first: prev.long_name.clone(),
                        second: def.long_name,
                    });
                }
            }
        }

        self.definitions.push(def);
        Ok(())
    }

    /// Builder-style `add`.
    pub fn with(mut self, def: ArgumentDefinition) -> Result<Self, RegistryError> {
        self.add(def)?;
        Ok(self)
    }

    pub fn definitions(&self) -> &[ArgumentDefinition] {
        &self.definitions
    }

    pub fn named(&self) -> impl Iterator<Item = &ArgumentDefinition> {
        self.definitions.iter().filter(|d| d.is_named())
    }

    pub fn positionals(&self) -> impl Iterator<Item = &ArgumentDefinition> {
        self.definitions.iter().filter(|d| d.is_positional())
    }

    /// Look up a named definition by long name, ignoring case.
    pub fn find_long(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.definitions.iter().find(|d| d.matches_long(name))
    }

    pub fn find_short(&self, c: char) -> Option<&ArgumentDefinition> {
        self.named().find(|d| d.short_name == Some(c))
    }

    pub fn positional_at(&self, index: usize) -> Option<&ArgumentDefinition> {
        self.positionals().find(|d| d.position == Some(index))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
