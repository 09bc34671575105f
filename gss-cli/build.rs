use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the default registry listing in gss-babel/src/registry.rs.
// Build scripts can't depend on the crate they build for, so it is duplicated here.
const AVAILABLE_FORMATS: &[&str] = &[
    "bson",
    "csv",
    "go",
    "json",
    "jsonl",
    "properties",
    "tags",
    "toml",
    "tsv",
    "hcl",
    "hcl2",
    "yaml",
];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("gss")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert structured data between formats")
        .arg_required_else_help(true)
        .arg(
            Arg::new("input")
                .help("Input file, or - for stdin")
                .index(1)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_FORMATS)),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_FORMATS)),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_hint(ValueHint::FilePath),
        )
        .arg(Arg::new("sorted").long("sorted").action(ArgAction::SetTrue))
        .arg(Arg::new("reversed").long("reversed").action(ArgAction::SetTrue))
        .arg(Arg::new("schema").long("schema").value_hint(ValueHint::Other))
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats")
                .action(ArgAction::SetTrue),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "gss", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "gss", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "gss", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
