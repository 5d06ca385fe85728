//! Argument vector parsing with short-option bundling and typed binding.
//!
//! Two layers:
//! - [`Parser`] turns an argument vector into a [`ParseState`] (named
//!   values, positional values, collected errors) using a [`Registry`] of
//!   [`ArgumentDefinition`]s and a pipeline of [`Filter`]s.
//! - [`Options`] / `#[derive(Options)]` builds the registry from a struct's
//!   fields and fills a new value of that struct from the parse result.
//!
//! # Example
//!
//! ```rust
//! use argbind::Options;
//!
//! #[derive(Debug, Default, Options)]
//! struct CopyArgs {
//!     /// File to read
//!     #[arg(position = 0, required)]
//!     input: String,
//!     #[arg(position = 1)]
//!     output: String,
//!     #[arg(short = 'v')]
//!     verbose: bool,
//!     #[arg(short = 'f')]
//!     full_detail: bool,
//! }
//!
//! let copy: CopyArgs = argbind::parse_into(["input.txt", "output.txt", "-vf"]).unwrap();
//! assert_eq!(copy.input, "input.txt");
//! assert_eq!(copy.output, "output.txt");
//! assert!(copy.verbose && copy.full_detail);
//! ```
//!
//! Grammar (each element of argv is one token):
//! - `--name` is a flag, or takes the next token as its value when declared so
//! - `-abc` is a bundle of short flags; a value-taking short option consumes
//!   the next token
//! - everything else is positional
//! - `help`, `h` and `?` request usage output instead of a value

mod bind;
mod config;
mod definition;
mod filter;
mod flat;
mod parser;
mod registry;
mod state;
mod usage;

pub use argbind_derive::Options;

pub use bind::{
    Binder, Coercion, FieldBinding, Filler, FromArgValue, Options, Rejection, from_env,
    parse_into, parse_into_or_show_usage, parse_os_into_or_show_usage,
};
pub use config::{BundleKeys, ParseConfig};
pub use definition::ArgumentDefinition;
pub use filter::{AfterParsing, BeforeParsing, DefaultValueFilter, Filter, RequiredFilter};
pub use flat::FlatEvaluator;
pub use parser::{Parsed, Parser, Unparsed};
pub use registry::{Registry, RegistryError};
pub use state::{PRESENT, ParseState};
pub use usage::{CollectingReporter, StderrReporter, UsageReporter, render_usage};
