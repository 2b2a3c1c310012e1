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
    author = "Tony Kan",
    version,
    about = "HBE CLI - Computes the interaction energy of hydrogen-bonded residue pairs using an external energy evaluator.",
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
    /// Evaluate every side-chain/side-chain bond of an HBPlus listing.
    Batch(BatchArgs),
    /// Evaluate a single bond given as two atom specifiers.
    Pair(PairArgs),
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Path to the PDB structure, with hydrogens, that the listing was computed from.
    #[arg(short = 's', long, required = true, value_name = "PATH")]
    pub structure: PathBuf,

    /// Path to the HBPlus hydrogen bond listing (.hb2).
    #[arg(short = 'b', long, required = true, value_name = "PATH")]
    pub bonds: PathBuf,

    /// Evaluate every bond, not only side-chain/side-chain bonds without OXT.
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub eval: EvalArgs,
}

/// Arguments for the `pair` subcommand.
#[derive(Args, Debug)]
pub struct PairArgs {
    /// Path to the PDB structure, with hydrogens.
    #[arg(short = 's', long, required = true, value_name = "PATH")]
    pub structure: PathBuf,

    /// Donor atom, in the form [c]nnnn[i].ATOM (e.g. A12.OG).
    #[arg(value_name = "DONOR")]
    pub donor: String,

    /// Acceptor atom, in the form [c]nnnn[i].ATOM (e.g. A15.OD1).
    #[arg(value_name = "ACCEPTOR")]
    pub acceptor: String,

    #[command(flatten)]
    pub eval: EvalArgs,
}

/// Options shared by every evaluating subcommand.
#[derive(Args, Debug, Default)]
pub struct EvalArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Let the evaluator relax the fragments before reporting the energy.
    #[arg(short, long)]
    pub relax: bool,

    /// Report the hydrogen-bond energy term only (overrides --relax).
    #[arg(short = 'o', long)]
    pub hbonds_only: bool,

    /// Pass the structure to the evaluator directly instead of through a control file.
    /// Only applies to single-point evaluations.
    #[arg(long)]
    pub direct: bool,

    /// Override the energy evaluator program.
    #[arg(long, value_name = "PATH")]
    pub evaluator: Option<PathBuf>,

    /// Override the time limit for one evaluator invocation, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Override how many times a failed evaluation is retried.
    #[arg(long, value_name = "INT")]
    pub retries: Option<u32>,

    /// Override the directory that holds per-bond scratch files.
    #[arg(long, value_name = "PATH")]
    pub scratch_dir: Option<PathBuf>,

    /// Override the maximum number of records accepted from a bond listing.
    #[arg(long, value_name = "INT")]
    pub max_records: Option<usize>,

    /// Shift hydrogen atom names one column right before evaluation.
    #[arg(long)]
    pub fix_hydrogen_names: bool,

    /// Also write one CSV row per bond to this path.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S evaluator.timeout-secs=60
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_batch_command_with_global_flags() {
        let cli = Cli::parse_from([
            "hbe", "-vv", "batch", "-s", "in.pdb", "-b", "in.hb2", "--all", "-r", "-S",
            "evaluator.max-retries=2",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Batch(args) => {
                assert_eq!(args.structure, PathBuf::from("in.pdb"));
                assert_eq!(args.bonds, PathBuf::from("in.hb2"));
                assert!(args.all);
                assert!(args.eval.relax);
                assert_eq!(args.eval.set_values, vec!["evaluator.max-retries=2"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_pair_command_positionals() {
        let cli = Cli::parse_from(["hbe", "pair", "-s", "in.pdb", "A12.OG", "A15.OD1", "-o"]);
        match cli.command {
            Commands::Pair(args) => {
                assert_eq!(args.donor, "A12.OG");
                assert_eq!(args.acceptor, "A15.OD1");
                assert!(args.eval.hbonds_only);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["hbe", "-q", "-v", "pair", "-s", "x", "A1.N", "A2.O"]);
        assert!(result.is_err());
    }
}
