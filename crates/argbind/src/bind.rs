//! Binding parsed values onto typed option structs.
//!
//! A type implementing [`Options`] (usually through `#[derive(Options)]`)
//! lists one [`FieldBinding`] per field. [`Binder`] turns those bindings
//! into a [`Registry`], runs the parser and fills a fresh value from the
//! resulting [`ParseState`].

use std::ffi::OsString;
use std::marker::PhantomData;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ParseConfig;
use crate::definition::ArgumentDefinition;
use crate::filter::Filter;
use crate::parser::{Parsed, Parser, Unparsed};
use crate::registry::{Registry, RegistryError};
use crate::state::ParseState;
use crate::usage::UsageReporter;

/// How a raw argument value becomes a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// The value is passed through (and parsed, for non-string fields).
    Text,
    /// The field is `true` when the argument is present with a non-empty value.
    Flag,
}

/// Conversion from a raw argument value.
///
/// `None` means the argument was not supplied at all. Absent values map to
/// the type's zero value unless the type says otherwise (`Option<T>` maps
/// them to `None`).
pub trait FromArgValue: Sized + Default {
    const COERCION: Coercion = Coercion::Text;

    fn from_arg_value(value: Option<&str>) -> Result<Self, String>;
}

impl FromArgValue for bool {
    const COERCION: Coercion = Coercion::Flag;

    fn from_arg_value(value: Option<&str>) -> Result<Self, String> {
        Ok(value.is_some_and(|v| !v.is_empty()))
    }
}

impl FromArgValue for String {
    fn from_arg_value(value: Option<&str>) -> Result<Self, String> {
        Ok(value.unwrap_or_default().to_string())
    }
}

impl FromArgValue for PathBuf {
    fn from_arg_value(value: Option<&str>) -> Result<Self, String> {
        Ok(value.map(PathBuf::from).unwrap_or_default())
    }
}

impl<T: FromArgValue> FromArgValue for Option<T> {
    const COERCION: Coercion = T::COERCION;

    fn from_arg_value(value: Option<&str>) -> Result<Self, String> {
        match value {
            Some(v) => T::from_arg_value(Some(v)).map(Some),
            None => Ok(None),
        }
    }
}

macro_rules! from_str_arg_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromArgValue for $ty {
                fn from_arg_value(value: Option<&str>) -> Result<Self, String> {
                    match value {
                        Some(v) => v.trim().parse::<$ty>().map_err(|e| e.to_string()),
                        None => Ok(Self::default()),
                    }
                }
            }
        )*
    };
}

from_str_arg_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char);

/// One declared argument bound to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub definition: ArgumentDefinition,
    pub coercion: Coercion,
}

impl FieldBinding {
    /// Bind `definition` to a field of type `T`.
    ///
    /// Named flag fields (`bool`) never take a value; every other named
    /// field consumes the token after its name.
    pub fn new<T: FromArgValue>(mut definition: ArgumentDefinition) -> Self {
        let coercion = T::COERCION;
        if definition.is_named() {
            definition.has_value = coercion == Coercion::Text;
        }
        Self {
            definition,
            coercion,
        }
    }

    /// The raw value for this binding, if one was collected.
    pub fn raw<'s>(&self, state: &'s ParseState) -> Option<&'s str> {
        match self.definition.position {
            Some(index) => state.positional(index),
            None => state.get(&self.definition.long_name),
        }
    }
}

/// A struct that can be populated from parsed arguments.
pub trait Options: Sized {
    /// One binding per bound field, in declaration order.
    fn bindings() -> Vec<FieldBinding>;

    /// Build a value, reading field `i` through `filler.field(i)`.
    fn fill(filler: &mut Filler<'_>) -> Self;
}

/// Hands out converted field values during [`Options::fill`].
pub struct Filler<'a> {
    bindings: &'a [FieldBinding],
    state: &'a ParseState,
    errors: Vec<String>,
}

impl<'a> Filler<'a> {
    pub fn new(bindings: &'a [FieldBinding], state: &'a ParseState) -> Self {
        Self {
            bindings,
            state,
            errors: Vec::new(),
        }
    }

    /// Value for the binding at `index`.
    ///
    /// Conversion failures are recorded and the field gets its zero value.
    pub fn field<T: FromArgValue>(&mut self, index: usize) -> T {
        let Some(binding) = self.bindings.get(index) else {
            self.errors.push(format!("no field binding at index {index}"));
            return T::default();
        };
        let raw = binding.raw(self.state);
        match T::from_arg_value(raw) {
            Ok(v) => v,
            Err(reason) => {
                self.errors.push(format!(
                    "invalid value for argument {}: {reason}",
                    binding.definition.long_name
                ));
                T::default()
            }
        }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// Why no options value was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("help requested")]
    Help,
    #[error("{}", .0.join("; "))]
    Errors(Vec<String>),
    #[error(transparent)]
    Definition(#[from] RegistryError),
}

/// Registry and fill logic for one [`Options`] type.
pub struct Binder<T> {
    bindings: Vec<FieldBinding>,
    registry: Registry,
    config: ParseConfig,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Options> Binder<T> {
    /// Derive the registry from `T::bindings()`.
    pub fn new() -> Result<Self, RegistryError> {
        let bindings = T::bindings();
        let registry = Registry::from_definitions(bindings.iter().map(|b| b.definition.clone()))?;
        Ok(Self {
            bindings,
            registry,
            config: ParseConfig::default(),
            _marker: PhantomData,
        })
    }

    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn bindings(&self) -> &[FieldBinding] {
        &self.bindings
    }

    /// A parser carrying this binder's registry and configuration.
    pub fn prepare<I, S>(&self, argv: I) -> Parser<Unparsed>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Parser::new(argv)
            .with_registry(self.registry.clone())
            .with_config(self.config.clone())
    }

    /// Build a value from `state`, returning the errors of the fill phase.
    pub fn fill(&self, state: &ParseState) -> (T, Vec<String>) {
        let mut filler = Filler::new(&self.bindings, state);
        let value = T::fill(&mut filler);
        (value, filler.into_errors())
    }

    /// Fill a value unless the parse collected errors or requested help.
    ///
    /// The check is repeated after filling, since conversion failures are
    /// only discovered then.
    pub fn bind(&self, parsed: &Parser<Parsed>) -> Result<T, Rejection> {
        let help_keys = parsed.config().help_keys.as_slice();
        check_usage(parsed.state(), &[], help_keys)?;
        let (value, fill_errors) = self.fill(parsed.state());
        check_usage(parsed.state(), &fill_errors, help_keys)?;
        Ok(value)
    }

    pub fn parse<I, S>(&self, argv: I) -> Result<T, Rejection>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bind(&self.prepare(argv).parse())
    }

    /// Parse `argv`, or report to `reporter` and return `None`.
    pub fn parse_or_show_usage<I, S>(&self, argv: I, reporter: &mut dyn UsageReporter) -> Option<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.report(&self.prepare(argv).parse(), reporter)
    }

    /// Like [`Binder::parse_or_show_usage`] for raw OS arguments.
    ///
    /// An argument that is not valid UTF-8 is kept in lossy form so later
    /// positions do not shift, and records `invalid UTF-8 in argument N`.
    pub fn parse_os_or_show_usage<I, S>(
        &self,
        args: I,
        reporter: &mut dyn UsageReporter,
    ) -> Option<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let (argv, invalid) = decode_args(args);
        let parsed = self
            .prepare(argv)
            .filter(InvalidArguments(invalid))
            .parse();
        self.report(&parsed, reporter)
    }

    fn report(&self, parsed: &Parser<Parsed>, reporter: &mut dyn UsageReporter) -> Option<T> {
        match self.bind(parsed) {
            Ok(value) => Some(value),
            Err(Rejection::Help) => {
                tracing::debug!("help requested");
                reporter.show_usage(parsed.registry());
                None
            }
            Err(rejection) => {
                let errors = match rejection {
                    Rejection::Errors(errors) => errors,
                    other => vec![other.to_string()],
                };
                tracing::debug!(count = errors.len(), "arguments rejected");
                reporter.show_usage_with_errors(parsed.registry(), &errors);
                None
            }
        }
    }
}

/// Split OS arguments into UTF-8 strings and one error per invalid argument.
fn decode_args<I, S>(args: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut argv = Vec::new();
    let mut errors = Vec::new();
    for (index, arg) in args.into_iter().enumerate() {
        match arg.into().into_string() {
            Ok(arg) => argv.push(arg),
            Err(raw) => {
                errors.push(format!("invalid UTF-8 in argument {index}"));
                argv.push(raw.to_string_lossy().into_owned());
            }
        }
    }
    (argv, errors)
}

/// Seeds the parse state with argument decoding errors.
struct InvalidArguments(Vec<String>);

impl Filter for InvalidArguments {
    fn before_parsing(&mut self, _registry: &Registry, state: &mut ParseState) {
        state.errors.extend(self.0.iter().cloned());
    }
}

fn check_usage<S: AsRef<str>>(
    state: &ParseState,
    extra_errors: &[String],
    help_keys: &[S],
) -> Result<(), Rejection> {
    if state.has_errors() || !extra_errors.is_empty() {
        return Err(Rejection::Errors(
            state.errors.iter().chain(extra_errors).cloned().collect(),
        ));
    }
    if state.wants_help(help_keys) {
        return Err(Rejection::Help);
    }
    Ok(())
}

/// Parse `argv` into a new `T`.
pub fn parse_into<T, I, S>(argv: I) -> Result<T, Rejection>
where
    T: Options,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Binder::<T>::new()?.parse(argv)
}

/// Parse `argv` into a new `T`, or show usage and return `None`.
pub fn parse_into_or_show_usage<T, I, S>(argv: I, reporter: &mut dyn UsageReporter) -> Option<T>
where
    T: Options,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    match Binder::<T>::new() {
        Ok(binder) => binder.parse_or_show_usage(argv, reporter),
        Err(err) => {
            tracing::error!(error = %err, "invalid argument definitions");
            reporter.show_usage_with_errors(&Registry::new(), &[err.to_string()]);
            None
        }
    }
}

/// Parse raw OS arguments into a new `T`, or show usage and return `None`.
pub fn parse_os_into_or_show_usage<T, I, S>(args: I, reporter: &mut dyn UsageReporter) -> Option<T>
where
    T: Options,
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    match Binder::<T>::new() {
        Ok(binder) => binder.parse_os_or_show_usage(args, reporter),
        Err(err) => {
            tracing::error!(error = %err, "invalid argument definitions");
            reporter.show_usage_with_errors(&Registry::new(), &[err.to_string()]);
            None
        }
    }
}

/// Parse the process arguments into a new `T`, reporting to stderr.
pub fn from_env<T: Options>() -> Option<T> {
    parse_os_into_or_show_usage(
        std::env::args_os().skip(1),
        &mut crate::usage::StderrReporter::from_env(),
    )
}

#[cfg(test)]
mod tests {
    use super::{Binder, FieldBinding, Filler, FromArgValue, Options, Rejection, decode_args};
    use crate::definition::ArgumentDefinition;
    use crate::state::ParseState;
    use crate::usage::CollectingReporter;

    #[derive(Debug, Default, PartialEq)]
    struct CopyArgs {
        input: String,
        output: String,
        verbose: bool,
        retries: u32,
    }

    impl Options for CopyArgs {
        fn bindings() -> Vec<FieldBinding> {
            vec![
                FieldBinding::new::<String>(ArgumentDefinition::positional("input", 0).required(true)),
                FieldBinding::new::<String>(ArgumentDefinition::positional("output", 1)),
                FieldBinding::new::<bool>(ArgumentDefinition::named("verbose").short('v')),
                FieldBinding::new::<u32>(ArgumentDefinition::named("retries").default_value("3")),
            ]
        }

        fn fill(filler: &mut Filler<'_>) -> Self {
            Self {
                input: filler.field(0),
                output: filler.field(1),
                verbose: filler.field(2),
                retries: filler.field(3),
            }
        }
    }

    #[test]
    fn bool_bindings_become_flags() {
        let binder = Binder::<CopyArgs>::new().unwrap();
        let verbose = binder.registry().find_long("verbose").unwrap();
        assert!(!verbose.has_value);
        let retries = binder.registry().find_long("retries").unwrap();
        assert!(retries.has_value);
    }

    #[test]
    fn fills_positional_named_and_defaults() {
        let binder = Binder::<CopyArgs>::new().unwrap();
        let value = binder.parse(["a.txt", "-v"]).unwrap();
        assert_eq!(
            value,
            CopyArgs {
                input: "a.txt".to_string(),
                output: String::new(),
                verbose: true,
                retries: 3,
            }
        );
    }

    #[test]
    fn conversion_failure_rejects_after_fill() {
        let binder = Binder::<CopyArgs>::new().unwrap();
        let err = binder.parse(["a.txt", "--retries", "many"]).unwrap_err();
        let Rejection::Errors(errors) = err else {
            panic!("expected Errors, got: {err:?}");
        };
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("invalid value for argument retries:"));
    }

    #[test]
    fn help_is_rejected_and_reported() {
        let binder = Binder::<CopyArgs>::new().unwrap();
        assert_eq!(binder.parse(["a.txt", "--help"]).unwrap_err(), Rejection::Help);

        let mut reporter = CollectingReporter::default();
        assert!(binder.parse_or_show_usage(["-?"], &mut reporter).is_none());
        // `-?` without the required input still reports the missing argument.
        assert_eq!(
            reporter.errors,
            vec!["missing required positional argument at index 0"]
        );
    }

    #[test]
    fn empty_flag_value_is_false() {
        assert!(!bool::from_arg_value(Some("")).unwrap());
        assert!(bool::from_arg_value(Some("1")).unwrap());
        assert!(!bool::from_arg_value(None).unwrap());
    }

    #[test]
    fn option_maps_absent_to_none() {
        assert_eq!(Option::<u8>::from_arg_value(None).unwrap(), None);
        assert_eq!(Option::<u8>::from_arg_value(Some("7")).unwrap(), Some(7));
        assert!(Option::<u8>::from_arg_value(Some("x")).is_err());
    }

    #[test]
    fn filler_reads_state_directly() {
        let bindings = CopyArgs::bindings();
        let mut state = ParseState::default();
        state.positional.push("in".to_string());
        state.named.insert("verbose".to_string(), String::new());
        let mut filler = Filler::new(&bindings, &state);
        let value = CopyArgs::fill(&mut filler);
        assert!(filler.errors().is_empty());
        assert_eq!(value.input, "in");
        assert!(!value.verbose);
        assert_eq!(value.retries, 0);
    }

    #[test]
    fn decodes_valid_os_arguments_unchanged() {
        let (argv, errors) = decode_args(["a.txt", "-v"]);
        assert_eq!(argv, vec!["a.txt", "-v"]);
        assert!(errors.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn invalid_utf8_argument_goes_through_usage() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let bad = OsString::from_vec(b"in\xff.txt".to_vec());
        let args = vec![OsString::from("-v"), bad, OsString::from("out.txt")];

        let binder = Binder::<CopyArgs>::new().unwrap();
        let mut reporter = CollectingReporter::default();
        assert!(binder.parse_os_or_show_usage(args, &mut reporter).is_none());
        assert_eq!(reporter.usage_shown, 1);
        assert_eq!(reporter.errors, vec!["invalid UTF-8 in argument 1"]);
    }

    #[test]
    fn os_arguments_bind_like_strings() {
        let mut reporter = CollectingReporter::default();
        let value = super::parse_os_into_or_show_usage::<CopyArgs, _, _>(
            ["a.txt", "b.txt", "--retries", "5"],
            &mut reporter,
        )
        .unwrap();
        assert_eq!(value.output, "b.txt");
        assert_eq!(value.retries, 5);
        assert_eq!(reporter.usage_shown, 0);
    }
}
