// Command-line interface for gss
//
// This binary is a thin shell around the gss-babel engine: it reads the input (a file or stdin),
// layers the configuration, runs one conversion and writes the result to stdout or a file.
// Everything format-related lives in gss-babel; everything about defaults lives in gss-config.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected from the file extension, while being overwrittable by an explicit --from flag.
// Usage:
//  gss <input> --to <format> [--from <format>] [--output <file>]          - Convert between formats (default)
//  gss convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  gss - --from json --to yaml                                            - Read stdin
//  gss formats                                                            - Describe available formats
//  gss --list-formats                                                     - List format names
//
// Extra Parameters:
//
// Conversion options can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and layers the value over the configuration file.
// Names shared by both sides (header, delimiter, limit, line-separator, key-value-separator)
// set the input side; prefix them with output- to set the output side.
// Example:
//  gss data.csv --to tsv --extra-comment '#' --extra-output-delimiter ';' --extra-pretty

use clap::{Arg, ArgAction, Command, ValueHint};
use gss_babel::{ConvertOptions, FormatRegistry, Schema, SerializedDocument};
use gss_config::Loader;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};

const SUBCOMMANDS: &[&str] = &["convert", "formats", "help"];

const CONVERT_KEYS: &[&str] = &["sorted", "reversed"];

const INPUT_KEYS: &[&str] = &[
    "header",
    "delimiter",
    "comment",
    "lazy_quotes",
    "trim",
    "skip_lines",
    "drop_cr",
    "limit",
    "line_separator",
    "key_value_separator",
];

const OUTPUT_KEYS: &[&str] = &[
    "pretty",
    "indent",
    "header",
    "expand_header",
    "delimiter",
    "limit",
    "line_separator",
    "key_value_separator",
    "no_data_value",
    "escape_space",
    "escape_equal",
    "escape_colon",
    "escape_new_line",
    "key_case",
    "value_case",
];

const LIMIT_KEYS: &[&str] = &["max_depth", "max_input_bytes"];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = if let Some(key) = arg.strip_prefix("--extra-") {
            Some(key)
        } else {
            arg.strip_prefix("--extras-")
        };

        if let Some(key) = key_opt {
            // A following argument is the value unless it is another flag
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with("--"));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("gss")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert structured data between formats")
        .long_about(
            "gss converts structured data between formats: bson, csv, go, json, jsonl,\n\
            properties, tags, toml, tsv, hcl, hcl2 and yaml.\n\n\
            Commands:\n  \
            - convert: Convert a document (default command)\n  \
            - formats: Describe the available formats\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to set any key of the [input], [output] or [limits]\n  \
            configuration sections. Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            gss data.csv --to json                      # CSV to JSON on stdout\n  \
            gss data.json --to yaml --sorted            # Sorted keys\n  \
            gss - --from jsonl --to csv < events.jsonl  # Read stdin\n  \
            gss data.json --to bson -o data.bson        # Binary output\n  \
            gss data.json --to json --extra-pretty      # Pretty-printed JSON",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a gss.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between formats (default command)")
                .long_about(
                    "Convert a document from one format to another.\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Input is read from stdin when the path is '-' or omitted.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    gss convert input.csv --to json              # CSV to JSON (stdout)\n  \
                    gss convert input.yaml --to toml -o out.toml # YAML to a TOML file\n  \
                    gss input.json --to yaml                     # 'convert' is optional",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path, or - for stdin")
                        .required(false)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .long_help(
                            "Target format to convert to.\n\n\
                            Use the format name, not the file extension.\n\
                            Use --list-formats to see all options.",
                        )
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("sorted")
                        .long("sorted")
                        .help("Sort map keys before encoding")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("reversed")
                        .long("reversed")
                        .help("Sort keys in descending order (implies --sorted)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("schema")
                        .long("schema")
                        .value_name("FIELDS")
                        .help("Field type hints, e.g. 'age=int,name=string'")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(Command::new("formats").about("Describe the available formats"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            if should_inject_convert(&cleaned_args) {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .map(|s| s.as_str())
                .unwrap_or("-");
            let Some(to) = sub_matches.get_one::<String>("to") else {
                eprintln!("Error: --to is required");
                std::process::exit(1);
            };

            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => detect_source_format(input),
            };

            let reversed = sub_matches.get_flag("reversed");
            let sorted = sub_matches.get_flag("sorted") || reversed;
            let options = load_cli_options(config_path, sorted, reversed, &extra_params);

            let schema = sub_matches.get_one::<String>("schema").map(|raw| {
                raw.parse::<Schema>().unwrap_or_else(|e| {
                    eprintln!("Error: invalid --schema: {e}");
                    std::process::exit(1);
                })
            });

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output, schema.as_ref(), &options);
        }
        Some(("formats", _)) => {
            handle_formats_command();
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// A command line without a subcommand is a conversion, unless it only asks
/// for help or the version.
fn should_inject_convert(args: &[String]) -> bool {
    match args.get(1) {
        Some(first) => {
            !SUBCOMMANDS.contains(&first.as_str())
                && !matches!(first.as_str(), "-h" | "--help" | "-V" | "--version")
        }
        None => false,
    }
}

fn detect_source_format(input: &str) -> String {
    if input == "-" {
        eprintln!("Error: Cannot detect the format of stdin");
        eprintln!("Please specify --from explicitly");
        std::process::exit(1);
    }
    match FormatRegistry::global().detect_format_from_filename(input) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect format from filename '{input}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    schema: Option<&Schema>,
    options: &ConvertOptions,
) {
    let registry = FormatRegistry::global();

    // Validate formats exist before touching the input
    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = read_input(input).unwrap_or_else(|e| {
        eprintln!("Error reading '{input}': {e}");
        std::process::exit(1);
    });

    tracing::debug!(input, from, to, bytes = source.len(), "converting");
    let result =
        gss_babel::convert_with(registry, &source, from, to, schema, options).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });

    match (output, result) {
        (Some(path), data) => {
            fs::write(path, data.into_bytes()).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        (None, SerializedDocument::Text(text)) => {
            print!("{text}");
        }
        (None, SerializedDocument::Binary(bytes)) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(&bytes).and_then(|_| stdout.flush()) {
                eprintln!("Error writing to stdout: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn read_input(input: &str) -> io::Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(input)
    }
}

/// Handle the formats command
fn handle_formats_command() {
    println!("Available formats:\n");
    for format in FormatRegistry::global().iter() {
        let direction = match (format.supports_decoding(), format.supports_encoding()) {
            (true, true) => "read/write",
            (true, false) => "read",
            (false, true) => "write",
            (false, false) => "-",
        };
        let extensions = format
            .file_extensions()
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  {:<11} {:<10} {:<22} {}",
            format.name(),
            direction,
            extensions,
            format.description()
        );
    }
}

/// Handle the list-formats flag
fn handle_list_formats_command() {
    for format_name in gss_babel::formats() {
        println!("{format_name}");
    }
}

fn load_cli_options(
    explicit_path: Option<&str>,
    sorted: bool,
    reversed: bool,
    extra_params: &HashMap<String, String>,
) -> ConvertOptions {
    let loader = Loader::new().with_optional_file("gss.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    let loader = apply_config_overrides(loader, sorted, reversed, extra_params).unwrap_or_else(
        |err| {
            eprintln!("Error: {err}");
            std::process::exit(1);
        },
    );

    loader.build_options().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(
    mut loader: Loader,
    sorted: bool,
    reversed: bool,
    extra_params: &HashMap<String, String>,
) -> Result<Loader, String> {
    if sorted {
        loader = loader
            .set_override("convert.sorted", true)
            .map_err(|e| e.to_string())?;
    }
    if reversed {
        loader = loader
            .set_override("convert.reversed", true)
            .map_err(|e| e.to_string())?;
    }

    // Sorted so that errors are reported deterministically
    let mut params: Vec<_> = extra_params.iter().collect();
    params.sort();

    for (name, raw) in params {
        let key = config_key(name).ok_or_else(|| format!("Unknown parameter --extra-{name}"))?;
        let field = key.rsplit('.').next().unwrap_or_default();
        let updated = if field == "header" {
            let columns: Vec<String> = raw
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            loader.set_override(&key, columns)
        } else if field.ends_with("separator") {
            loader.set_override(&key, unescape_separator(raw))
        } else {
            loader.set_override(&key, raw.as_str())
        };
        loader = updated.map_err(|e| e.to_string())?;
    }
    Ok(loader)
}

/// Maps an extra parameter name onto a configuration key.
fn config_key(name: &str) -> Option<String> {
    let name = name.replace('-', "_");

    if let Some(key) = name.strip_prefix("input_") {
        return INPUT_KEYS
            .contains(&key)
            .then(|| format!("input.{key}"));
    }
    if let Some(key) = name.strip_prefix("output_") {
        return OUTPUT_KEYS
            .contains(&key)
            .then(|| format!("output.{key}"));
    }

    let name = name.as_str();
    if CONVERT_KEYS.contains(&name) {
        Some(format!("convert.{name}"))
    } else if INPUT_KEYS.contains(&name) {
        Some(format!("input.{name}"))
    } else if OUTPUT_KEYS.contains(&name) {
        Some(format!("output.{name}"))
    } else if LIMIT_KEYS.contains(&name) {
        Some(format!("limits.{name}"))
    } else {
        None
    }
}

/// Shells make literal control characters awkward to pass, so `\n`, `\r`
/// and `\t` are accepted as escapes.
fn unescape_separator(raw: &str) -> String {
    raw.replace("\\r", "\r")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}
