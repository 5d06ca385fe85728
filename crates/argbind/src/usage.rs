//! Usage text rendering and reporting.

use std::io::Write;

use crate::definition::ArgumentDefinition;
use crate::registry::Registry;

/// Receives the "show usage" decision made after parsing or binding.
pub trait UsageReporter {
    /// Help was requested explicitly.
    fn show_usage(&mut self, registry: &Registry);

    /// Parsing or binding collected errors.
    fn show_usage_with_errors(&mut self, registry: &Registry, errors: &[String]);
}

/// Writes usage text (and errors) to stderr.
#[derive(Debug, Clone)]
pub struct StderrReporter {
    program: String,
}

impl StderrReporter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use the file name of `argv[0]` as program name.
    pub fn from_env() -> Self {
        Self::new(program_name(std::env::args_os().next()))
    }
}

impl UsageReporter for StderrReporter {
    fn show_usage(&mut self, registry: &Registry) {
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(render_usage(&self.program, registry).as_bytes());
    }

    fn show_usage_with_errors(&mut self, registry: &Registry, errors: &[String]) {
        let mut err = std::io::stderr().lock();
        for e in errors {
            let _ = writeln!(err, "error: {e}");
        }
        let _ = writeln!(err);
        let _ = err.write_all(render_usage(&self.program, registry).as_bytes());
    }
}

/// Records what would have been shown; useful in tests.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    pub usage_shown: usize,
    pub errors: Vec<String>,
}

impl UsageReporter for CollectingReporter {
    fn show_usage(&mut self, _registry: &Registry) {
        self.usage_shown += 1;
    }

    fn show_usage_with_errors(&mut self, _registry: &Registry, errors: &[String]) {
        self.usage_shown += 1;
        self.errors.extend(errors.iter().cloned());
    }
}

fn program_name(argv0: Option<std::ffi::OsString>) -> String {
    argv0
        .as_deref()
        .map(std::path::Path::new)
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "program".to_string())
}

fn value_name(def: &ArgumentDefinition) -> String {
    def.long_name.to_ascii_uppercase()
}

fn format_left(def: &ArgumentDefinition) -> String {
    if def.is_positional() {
        let n = value_name(def);
        return if def.is_required {
            format!("<{n}>")
        } else {
            format!("[{n}]")
        };
    }

    let mut out = match def.short_name {
        Some(c) => format!("-{c}, --{}", def.long_name),
        None => format!("    --{}", def.long_name),
    };
    if def.has_value {
        out.push_str(&format!(" <{}>", value_name(def)));
    }
    out
}

fn format_help(def: &ArgumentDefinition) -> String {
    let mut parts: Vec<String> = Vec::new();
    let help = def.help.trim();
    if !help.is_empty() {
        parts.push(help.to_string());
    }
    if def.is_required && def.is_named() {
        parts.push("(required)".to_string());
    }
    if let Some(default_value) = &def.default_value {
        parts.push(format!("[default: {default_value}]"));
    }
    parts.join(" ")
}

fn push_rows(out: &mut String, title: &str, defs: &[&ArgumentDefinition]) {
    if defs.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let rows: Vec<(String, String)> = defs
        .iter()
        .map(|d| (format_left(d), format_help(d)))
        .collect();
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}

/// Render usage text for `registry`.
///
/// Positional arguments are listed by index, named ones in registration
/// order.
pub fn render_usage(program: &str, registry: &Registry) -> String {
    let mut positionals: Vec<&ArgumentDefinition> = registry.positionals().collect();
    positionals.sort_by_key(|d| d.position);
    let options: Vec<&ArgumentDefinition> = registry.named().collect();

    let mut out = format!("Usage: {program}");
    if !options.is_empty() {
        out.push_str(" [OPTIONS]");
    }
    for def in &positionals {
        out.push(' ');
        out.push_str(&format_left(def));
    }
    out.push('\n');

    push_rows(&mut out, "Arguments", &positionals);
    push_rows(&mut out, "Options", &options);
    out
}
