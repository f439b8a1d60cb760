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
    about = "loopmend CLI - A command-line interface for loopmend, a pipeline for detecting and repairing missing loops in deposited protein structures before simulation.",
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
    /// Detect and repair missing loops in a structure, writing a simulation-ready file.
    Prepare(PrepareArgs),
    /// Report chains, gaps, discontinuities, and the completeness score of a structure.
    Inspect(InspectArgs),
    /// Download a structure from the RCSB PDB archive.
    Fetch(FetchArgs),
}

/// Arguments for the `prepare` subcommand.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    // --- Core Arguments ---
    /// Path to the input structure file in PDB format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output structure file.
    /// Defaults to '<input stem>_prepared.pdb' next to the input; when the
    /// name is taken, a version counter is appended instead of overwriting.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a repair configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Reference Sequence ---
    /// Provide or override the reference sequence for one chain, as CHAIN=SEQUENCE.
    /// Can be used multiple times; chains without an override use the SEQRES records.
    #[arg(short = 's', long = "sequence", value_name = "CHAIN=SEQUENCE")]
    pub sequences: Vec<String>,

    // --- Input Cleanup ---
    /// Keep only the given chain; can be used multiple times (e.g. -C A -C B).
    #[arg(short = 'C', long = "chain", value_name = "ID")]
    pub chains: Vec<char>,

    /// Remove water molecules before analysis.
    #[arg(long)]
    pub drop_waters: bool,

    /// Remove all heteroatoms (ligands, ions, and waters) before analysis.
    #[arg(long, conflicts_with = "drop_waters")]
    pub drop_hetero: bool,

    // --- Repair Overrides ---
    /// Override the number of successful decoys to collect.
    #[arg(short = 'n', long, value_name = "INT")]
    pub target_success_count: Option<usize>,

    /// Override the maximum number of modeling attempts.
    #[arg(long, value_name = "INT")]
    pub max_attempts: Option<usize>,

    /// Override the statistical score weight in the combined decoy score.
    #[arg(long, value_name = "FLOAT")]
    pub statistical_weight: Option<f64>,

    /// Override the per-attempt wall-clock budget in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub attempt_timeout: Option<f64>,

    /// Skip the post-repair renumbering pass, keeping deposited numbering.
    #[arg(long)]
    pub no_renumber: bool,

    /// Keep deposited heteroatom numbers when renumbering.
    #[arg(long, conflicts_with = "no_renumber")]
    pub keep_hetero_numbering: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the structure file in PDB format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Provide or override the reference sequence for one chain, as CHAIN=SEQUENCE.
    #[arg(short = 's', long = "sequence", value_name = "CHAIN=SEQUENCE")]
    pub sequences: Vec<String>,
}

/// Arguments for the `fetch` subcommand.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// The four-character PDB accession code (e.g. 1CRN).
    #[arg(required = true, value_name = "ID")]
    pub id: String,

    /// Directory to place the downloaded file in.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}
