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
    author = "MolQL Developers",
    version,
    about = "MolQL CLI - select atoms from macromolecular structures with a structural query language, and save or replay the resulting selections.",
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
    /// Run a query against a structure and report (or save) the selection.
    Select(SelectArgs),
    /// Re-apply a saved selection to a structure.
    Replay(ReplayArgs),
    /// Parse and compile a query without running it, printing its canonical form.
    Check(CheckArgs),
}

/// Where the structure comes from.
#[derive(Args, Debug, Clone)]
pub struct StructureInput {
    /// Path to the atom table (CSV with a header row).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Optional bond table (CSV with columns a, b and optionally order, flags).
    #[arg(short, long, value_name = "PATH")]
    pub bonds: Option<PathBuf>,
}

/// Query text, given inline or read from a file.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct QuerySource {
    /// Query text, e.g. "(atom-groups :residue-test (eq (label_comp_id) HOH))".
    #[arg(short = 'e', long = "query", value_name = "TEXT")]
    pub text: Option<String>,

    /// Read the query text from a file.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub query_file: Option<PathBuf>,
}

/// Query engine settings shared by every command that compiles queries.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryOptions {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the maximum expression nesting depth.
    #[arg(short = 'd', long, value_name = "INT")]
    pub max_depth: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S query.script-range-cutoff=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `select` subcommand.
#[derive(Args, Debug)]
pub struct SelectArgs {
    #[command(flatten)]
    pub structure: StructureInput,

    #[command(flatten)]
    pub query: QuerySource,

    #[command(flatten)]
    pub options: QueryOptions,

    /// Write the selection as a replayable JSON document.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Save the selection so that it replays against any structure.
    #[arg(long)]
    pub any_structure: bool,

    /// Print every selected element.
    #[arg(short, long)]
    pub list: bool,
}

/// Arguments for the `replay` subcommand.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub structure: StructureInput,

    /// Path to a selection saved by `select --output`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub selection: PathBuf,

    /// Skip the structure compatibility check.
    #[arg(long)]
    pub ignore_hash: bool,

    /// Print every selected element.
    #[arg(short, long)]
    pub list: bool,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub query: QuerySource,

    #[command(flatten)]
    pub options: QueryOptions,
}
