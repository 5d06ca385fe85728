//! Hooks that run around the token pass.
//!
//! Every parser starts with [`DefaultValueFilter`] followed by
//! [`RequiredFilter`]; filters added by the caller run after those two, in
//! the order they were added.

use crate::registry::Registry;
use crate::state::ParseState;

/// A hook invoked before and after the token pass.
///
/// Filters see the registry read-only and may freely change the parse
/// state: add errors, rewrite named values or positional arguments.
pub trait Filter {
    fn before_parsing(&mut self, _registry: &Registry, _state: &mut ParseState) {}

    fn after_parsing(&mut self, _registry: &Registry, _state: &mut ParseState) {}
}

/// Fills absent named arguments from their declared default value.
///
/// Values given on the command line are never overwritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueFilter;

impl Filter for DefaultValueFilter {
    fn after_parsing(&mut self, registry: &Registry, state: &mut ParseState) {
        for def in registry.named() {
            let Some(default_value) = &def.default_value else {
                continue;
            };
            if !state.contains(&def.long_name) {
                tracing::trace!(name = %def.long_name, "applying default value");
                state.set(def.long_name.clone(), default_value.clone());
            }
        }
    }
}

/// Reports required arguments that were not supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFilter;

impl Filter for RequiredFilter {
    fn after_parsing(&mut self, registry: &Registry, state: &mut ParseState) {
        for def in registry.definitions().iter().filter(|d| d.is_required) {
            match def.position {
                Some(index) => {
                    if state.positional.len() <= index {
                        state.add_error(format!(
                            "missing required positional argument at index {index}"
                        ));
                    }
                }
                None => {
                    if !state.contains(&def.long_name) {
                        state.add_error(format!("missing required argument: {}", def.long_name));
                    }
                }
            }
        }
    }
}

/// Adapter turning a closure into an after-parsing filter.
pub struct AfterParsing<F>(pub F);

impl<F> Filter for AfterParsing<F>
where
    F: FnMut(&Registry, &mut ParseState),
{
    fn after_parsing(&mut self, registry: &Registry, state: &mut ParseState) {
        (self.0)(registry, state)
    }
}

/// Adapter turning a closure into a before-parsing filter.
pub struct BeforeParsing<F>(pub F);

impl<F> Filter for BeforeParsing<F>
where
    F: FnMut(&Registry, &mut ParseState),
{
    fn before_parsing(&mut self, registry: &Registry, state: &mut ParseState) {
        (self.0)(registry, state)
    }
}

pub(crate) fn default_filters() -> Vec<Box<dyn Filter>> {
    vec![Box::new(DefaultValueFilter), Box::new(RequiredFilter)]
}
