use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "polyfold - build molecular poses from residue sequences and manage tagged silent-file containers.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a pose from a one-letter residue sequence and append it to a silent file.
    Build(BuildArgs),
    /// Stream a silent file and list its record tags and residue counts.
    List(ListArgs),
    /// Re-encode every record of a silent file into another encoding.
    Convert(ConvertArgs),
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// One-letter residue sequence (e.g. "ARNDCEQG").
    #[arg(short, long, required = true, value_name = "SEQUENCE")]
    pub sequence: String,

    /// Silent file to append the built pose to.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub out: PathBuf,

    /// Residue-type vocabulary family: 'fa_standard' or 'centroid'.
    #[arg(short = 't', long, default_value = "fa_standard", value_name = "NAME")]
    pub type_set: String,

    /// Do not apply N-/C-terminus patches to the chain ends.
    #[arg(long)]
    pub no_termini: bool,

    /// Wire encoding for the appended record: 'text' or 'binary'.
    /// Overrides the options file.
    #[arg(short, long, value_name = "NAME")]
    pub encoding: Option<String>,

    /// Silent-file options in TOML format.
    #[arg(long, value_name = "PATH")]
    pub options: Option<PathBuf>,

    /// Record tag; defaults to the first eight sequence characters.
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Attach an auxiliary scalar to the record (e.g. --score total=-12.5).
    /// Can be used multiple times.
    #[arg(long = "score", value_name = "KEY=VALUE")]
    pub scores: Vec<String>,
}

/// Arguments for the `list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Silent file to read.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Treat a truncated trailing record as end of stream instead of an error.
    #[arg(long)]
    pub tolerate_truncated_tail: bool,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Silent file to read.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Silent file to append re-encoded records to.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Target wire encoding: 'text' or 'binary'.
    #[arg(short, long, required = true, value_name = "NAME")]
    pub encoding: String,
}
