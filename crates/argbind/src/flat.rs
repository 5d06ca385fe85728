//! The flat evaluator: no registry lookups and no short-option bundling.
//!
//! Tokens are classified on their own:
//! - `--name` records `name = "1"`
//! - `-name=value` records `name = value`, `-name` records `name = "1"`
//! - anything else that is not empty is positional
//!
//! The registry is only consulted by the filters (defaults and required
//! checks), so `--name value` never consumes `value`.

use indexmap::IndexMap;

use crate::definition::ArgumentDefinition;
use crate::filter::{self, Filter};
use crate::parser::{Parsed, Unparsed};
use crate::registry::{Registry, RegistryError};
use crate::state::ParseState;

pub struct FlatEvaluator<S = Unparsed> {
    registry: Registry,
    filters: Vec<Box<dyn Filter>>,
    stage: S,
}

impl FlatEvaluator<Unparsed> {
    pub fn new<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            registry: Registry::new(),
            filters: filter::default_filters(),
            stage: Unparsed {
                argv: argv.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn argument(mut self, def: ArgumentDefinition) -> Result<Self, RegistryError> {
        self.registry.add(def)?;
        Ok(self)
    }

    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn evaluate(self) -> FlatEvaluator<Parsed> {
        let Self {
            registry,
            mut filters,
            stage,
        } = self;

        tracing::debug!(tokens = stage.argv.len(), "evaluating flat arguments");

        let mut state = ParseState::default();
        for filter in filters.iter_mut() {
            filter.before_parsing(&registry, &mut state);
        }

        for token in &stage.argv {
            classify(token, &mut state);
        }

        for filter in filters.iter_mut() {
            filter.after_parsing(&registry, &mut state);
        }

        FlatEvaluator {
            registry,
            filters,
            stage: Parsed { state },
        }
    }

    pub fn into_state(self) -> ParseState {
        self.evaluate().into_state()
    }
}

impl FlatEvaluator<Parsed> {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn named(&self) -> &IndexMap<String, String> {
        &self.stage.state.named
    }

    pub fn positional(&self) -> &[String] {
        &self.stage.state.positional
    }

    pub fn errors(&self) -> &[String] {
        &self.stage.state.errors
    }

    pub fn into_state(self) -> ParseState {
        self.stage.state
    }
}

fn classify(token: &str, state: &mut ParseState) {
    if token.is_empty() {
        return;
    }
    if let Some(name) = token.strip_prefix("--") {
        state.set_present(name);
    } else if let Some(rest) = token.strip_prefix('-') {
        match rest.split_once('=') {
            Some((name, value)) => state.set(name, value),
            None => state.set_present(rest),
        }
    } else {
        state.positional.push(token.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::FlatEvaluator;
    use crate::definition::ArgumentDefinition;

    #[test]
    fn splits_single_dash_assignments() {
        let state = FlatEvaluator::new(["-level=3", "-quiet", "file.txt", "", "-empty="]).into_state();
        assert_eq!(state.get("level"), Some("3"));
        assert_eq!(state.get("quiet"), Some("1"));
        assert_eq!(state.get("empty"), Some(""));
        assert_eq!(state.positional, vec!["file.txt"]);
    }

    #[test]
    fn double_dash_never_splits_or_consumes() {
        let state = FlatEvaluator::new(["--output=x", "--input", "in.txt"])
            .argument(ArgumentDefinition::named("input"))
            .unwrap()
            .into_state();
        assert_eq!(state.get("output=x"), Some("1"));
        assert_eq!(state.get("input"), Some("1"));
        assert_eq!(state.positional, vec!["in.txt"]);
    }

    #[test]
    fn does_not_bundle_short_options() {
        let state = FlatEvaluator::new(["-vf"])
            .argument(ArgumentDefinition::flag("verbose").short('v'))
            .unwrap()
            .into_state();
        assert_eq!(state.get("vf"), Some("1"));
        assert!(!state.contains("verbose"));
    }

    #[test]
    fn runs_default_filters() {
        let parsed = FlatEvaluator::new(Vec::<String>::new())
            .argument(ArgumentDefinition::named("level").default_value("1"))
            .unwrap()
            .argument(ArgumentDefinition::named("target").required(true))
            .unwrap()
            .evaluate();
        assert_eq!(parsed.named().get("level").map(String::as_str), Some("1"));
        assert_eq!(parsed.errors(), ["missing required argument: target"]);
    }
}
