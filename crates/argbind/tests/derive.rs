use std::path::PathBuf;

use argbind::{Binder, CollectingReporter, Options, Rejection, render_usage};

#[derive(Debug, Default, Options)]
struct NoAttributes {
    input: String,
    output: String,
}

#[derive(Debug, Default, Options)]
struct CopyFiles {
    /// File to read
    #[arg(position = 0, required)]
    input: String,
    #[arg(position = 1)]
    output: String,
    #[arg(short = 'v')]
    verbose: bool,
    #[arg(short = 'f')]
    full_detail: bool,
}

#[derive(Debug, Default, Options)]
struct WithDefaults {
    #[arg(default = "no.txt")]
    output: String,
    #[arg(short = 'v', default = "1")]
    verbose: bool,
    #[arg(short = 'l', default = "2")]
    level: u32,
}

#[derive(Debug, Default, Options)]
struct Renamed {
    #[arg(long = "dry-run", short = 'n', help = "Print what would be done")]
    dry_run: bool,
    #[arg(long = "config", required)]
    config_path: Option<PathBuf>,
    r#type: String,
    #[arg(skip)]
    seen: Vec<String>,
}

#[test]
fn field_names_become_long_names() {
    let args: NoAttributes =
        argbind::parse_into(["--input", "input.txt", "--output", "output.txt"]).unwrap();
    assert_eq!(args.input, "input.txt");
    assert_eq!(args.output, "output.txt");
}

#[test]
fn long_names_match_case_insensitively() {
    let args: NoAttributes = argbind::parse_into(["--Input", "a", "--OUTPUT", "b"]).unwrap();
    assert_eq!(args.input, "a");
    assert_eq!(args.output, "b");
}

#[test]
fn absent_fields_keep_zero_values() {
    let args: NoAttributes = argbind::parse_into(Vec::<String>::new()).unwrap();
    assert_eq!(args.input, "");
    assert_eq!(args.output, "");
}

#[test]
fn positional_arguments_and_short_bundle() {
    let args: CopyFiles = argbind::parse_into(["input.txt", "output.txt", "-vf"]).unwrap();
    assert_eq!(args.input, "input.txt");
    assert_eq!(args.output, "output.txt");
    assert!(args.verbose);
    assert!(args.full_detail);
}

#[test]
fn flags_are_false_when_absent() {
    let args: CopyFiles = argbind::parse_into(["input.txt", "-v"]).unwrap();
    assert!(args.verbose);
    assert!(!args.full_detail);
}

#[test]
fn missing_required_positional_yields_no_value() {
    let err = argbind::parse_into::<CopyFiles, _, _>(["-f"]).unwrap_err();
    assert_eq!(
        err,
        Rejection::Errors(vec![
            "missing required positional argument at index 0".to_string()
        ])
    );

    let mut reporter = CollectingReporter::default();
    let value = argbind::parse_into_or_show_usage::<CopyFiles, _, _>(["-f"], &mut reporter);
    assert!(value.is_none());
    assert_eq!(reporter.usage_shown, 1);
    assert_eq!(reporter.errors.len(), 1);
}

#[test]
fn defaults_fill_absent_fields_only() {
    let args: WithDefaults = argbind::parse_into(Vec::<String>::new()).unwrap();
    assert_eq!(args.output, "no.txt");
    assert!(args.verbose);
    assert_eq!(args.level, 2);

    let args: WithDefaults = argbind::parse_into(["--output", "yes.txt", "-l", "7"]).unwrap();
    assert_eq!(args.output, "yes.txt");
    assert_eq!(args.level, 7);
}

#[test]
fn value_short_option_in_bundle_is_an_error() {
    let err = argbind::parse_into::<WithDefaults, _, _>(["-vl", "3"]).unwrap_err();
    let Rejection::Errors(errors) = err else {
        panic!("expected Errors, got: {err:?}");
    };
    assert_eq!(
        errors,
        vec!["short name l has a value and is used with other options"]
    );
}

#[test]
fn help_request_is_rejected() {
    let err = argbind::parse_into::<WithDefaults, _, _>(["--help"]).unwrap_err();
    assert_eq!(err, Rejection::Help);

    let mut reporter = CollectingReporter::default();
    assert!(argbind::parse_into_or_show_usage::<WithDefaults, _, _>(["-h"], &mut reporter).is_none());
    assert_eq!(reporter.usage_shown, 1);
    assert!(reporter.errors.is_empty());
}

#[test]
fn attribute_overrides_and_skip() {
    let args: Renamed =
        argbind::parse_into(["-n", "--config", "app.toml", "--type", "fast"]).unwrap();
    assert!(args.dry_run);
    assert_eq!(args.config_path, Some(PathBuf::from("app.toml")));
    assert_eq!(args.r#type, "fast");
    assert!(args.seen.is_empty());

    let err = argbind::parse_into::<Renamed, _, _>(["-n"]).unwrap_err();
    assert_eq!(
        err,
        Rejection::Errors(vec!["missing required argument: config".to_string()])
    );
}

#[test]
fn derived_metadata_matches_field_declarations() {
    let bindings = CopyFiles::bindings();
    assert_eq!(bindings.len(), 4);

    let input = &bindings[0].definition;
    assert_eq!(input.long_name, "input");
    assert_eq!(input.position, Some(0));
    assert!(input.is_required);
    assert_eq!(input.help, "File to read");

    let verbose = &bindings[2].definition;
    assert_eq!(verbose.short_name, Some('v'));
    assert!(!verbose.has_value);

    let renamed = Renamed::bindings();
    assert_eq!(renamed.len(), 3);
    assert_eq!(renamed[0].definition.long_name, "dry-run");
    assert_eq!(renamed[1].definition.long_name, "config");
    assert!(renamed[1].definition.has_value);
    assert_eq!(renamed[2].definition.long_name, "type");
}

#[test]
fn usage_lists_derived_arguments() {
    let binder = Binder::<CopyFiles>::new().unwrap();
    let text = render_usage("copy", binder.registry());
    assert!(text.starts_with("Usage: copy [OPTIONS] <INPUT> [OUTPUT]\n"));
    assert!(text.contains("<INPUT>   File to read"));
    assert!(text.contains("-f, --full_detail"));
}
