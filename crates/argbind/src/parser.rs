//! Token classification and the single parse pass.

use indexmap::IndexMap;

use crate::config::{BundleKeys, ParseConfig};
use crate::definition::ArgumentDefinition;
use crate::filter::{self, Filter};
use crate::registry::{Registry, RegistryError};
use crate::state::ParseState;
use crate::usage::UsageReporter;

/// Parser stage before the token pass: holds the argument vector.
pub struct Unparsed {
    pub(crate) argv: Vec<String>,
}

/// Parser stage after the token pass: holds the collected values.
pub struct Parsed {
    pub(crate) state: ParseState,
}

/// Parsing engine for one argument vector.
///
/// The engine is a typestate: [`Parser::parse`] consumes a
/// `Parser<Unparsed>` and returns a `Parser<Parsed>`, so the token pass
/// runs exactly once per engine and a parsed engine cannot be parsed
/// again:
///
/// ```compile_fail
/// let parsed = argbind::Parser::new(["--verbose"]).parse();
/// let again = parsed.parse();
/// ```
pub struct Parser<S = Unparsed> {
    registry: Registry,
    config: ParseConfig,
    filters: Vec<Box<dyn Filter>>,
    stage: S,
}

impl Parser<Unparsed> {
    /// Create an engine with the default filters (default values, then
    /// required checks).
    pub fn new<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            filters: filter::default_filters(),
            ..Self::without_default_filters(argv)
        }
    }

    /// Create an engine with an empty filter pipeline.
    pub fn without_default_filters<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            registry: Registry::new(),
            config: ParseConfig::default(),
            filters: Vec::new(),
            stage: Unparsed {
                argv: argv.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    /// Register one argument definition (builder style).
    pub fn argument(mut self, def: ArgumentDefinition) -> Result<Self, RegistryError> {
        self.registry.add(def)?;
        Ok(self)
    }

    pub fn add_argument(&mut self, def: ArgumentDefinition) -> Result<(), RegistryError> {
        self.registry.add(def)
    }

    /// Append a filter; it runs after every filter added before it.
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.add_filter(filter);
        self
    }

    pub fn add_filter(&mut self, filter: impl Filter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn argv(&self) -> &[String] {
        &self.stage.argv
    }

    /// Run the filters and the token pass.
    pub fn parse(self) -> Parser<Parsed> {
        let Self {
            registry,
            config,
            mut filters,
            stage,
        } = self;

        tracing::debug!(tokens = stage.argv.len(), "parsing arguments");

        let mut state = ParseState::default();
        for filter in filters.iter_mut() {
            filter.before_parsing(&registry, &mut state);
        }

        Classifier {
            registry: &registry,
            config: &config,
            argv: &stage.argv,
            state: &mut state,
        }
        .run();

        for filter in filters.iter_mut() {
            filter.after_parsing(&registry, &mut state);
        }

        tracing::debug!(
            named = state.named.len(),
            positional = state.positional.len(),
            errors = state.errors.len(),
            "parsed arguments"
        );

        Parser {
            registry,
            config,
            filters,
            stage: Parsed { state },
        }
    }

    /// Parse and return the collected values.
    pub fn into_state(self) -> ParseState {
        self.parse().into_state()
    }
}

impl Parser<Parsed> {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    pub fn state(&self) -> &ParseState {
        &self.stage.state
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

    /// Whether one of the configured help keys was given.
    pub fn wants_help(&self) -> bool {
        self.stage.state.wants_help(self.config.help_keys.as_slice())
    }

    /// Whether the caller should show usage instead of using the values.
    pub fn needs_usage(&self) -> bool {
        self.stage.state.has_errors() || self.wants_help()
    }

    /// Report errors or a help request to `reporter`.
    ///
    /// Returns `true` when usage was shown.
    pub fn show_usage_if_necessary(&self, reporter: &mut dyn UsageReporter) -> bool {
        let state = &self.stage.state;
        if state.has_errors() {
            reporter.show_usage_with_errors(&self.registry, &state.errors);
            return true;
        }
        if self.wants_help() {
            tracing::debug!("help requested");
            reporter.show_usage(&self.registry);
            return true;
        }
        false
    }

    pub fn into_state(self) -> ParseState {
        self.stage.state
    }
}

/// One left-to-right pass over the argument vector.
struct Classifier<'a> {
    registry: &'a Registry,
    config: &'a ParseConfig,
    argv: &'a [String],
    state: &'a mut ParseState,
}

impl Classifier<'_> {
    fn run(mut self) {
        let argv = self.argv;
        let mut cursor = 0usize;
        while cursor < argv.len() {
            let token = argv[cursor].as_str();
            if token.is_empty() {
                tracing::trace!(cursor, "skipping empty token");
            } else if let Some(name) = token.strip_prefix("--") {
                tracing::trace!(cursor, name, "long option");
                self.long_option(&mut cursor, name);
            } else if let Some(bundle) = token.strip_prefix('-') {
                tracing::trace!(cursor, bundle, "short option bundle");
                self.short_bundle(&mut cursor, bundle);
            } else {
                tracing::trace!(cursor, token, "positional");
                self.state.positional.push(token.to_string());
            }
            cursor += 1;
        }
    }

    /// `--name`, optionally followed by its value. `=` is not split.
    fn long_option(&mut self, cursor: &mut usize, name: &str) {
        let registry = self.registry;
        match registry.find_long(name) {
            None => self.state.set_present(name),
            Some(def) if !def.has_value => self.state.set_present(def.long_name.clone()),
            Some(def) => self.take_value(cursor, name, &def.long_name),
        }
    }

    /// `-abc`: every character is resolved on its own.
    fn short_bundle(&mut self, cursor: &mut usize, bundle: &str) {
        let registry = self.registry;
        let bundled = bundle.chars().count() > 1;
        for c in bundle.chars() {
            match registry.find_short(c) {
                None => match self.config.bundle_keys {
                    BundleKeys::PerChar => self.state.set_present(c.to_string()),
                    BundleKeys::Whole => self.state.set_present(bundle),
                },
                Some(def) if !def.has_value => self.state.set_present(def.long_name.clone()),
                Some(def) => {
                    if bundled {
                        self.state.add_error(format!(
                            "short name {c} has a value and is used with other options"
                        ));
                    }
                    self.take_value(cursor, &def.long_name, &def.long_name);
                }
            }
        }
    }

    /// Consume the token after `cursor` as the value of `long_name`.
    ///
    /// The next token is taken verbatim, even when it starts with `-`.
    fn take_value(&mut self, cursor: &mut usize, given: &str, long_name: &str) {
        *cursor += 1;
        match self.argv.get(*cursor) {
            Some(value) => self.state.set(long_name, value.clone()),
            None => self
                .state
                .add_error(format!("value missing for parameter: {given}")),
        }
    }
}
