//! Parity CLI, the command-line front end of the verification harness.
//!
//! `parity run` drives the reference butterfly and BRAM models through the
//! harness and prints a per-case report; `parity vectors` dumps the seeded
//! random vectors for reproduction; `parity faults` lists the defects the
//! reference models can inject.

#![warn(missing_docs)]

mod config;
mod logging;
mod run;
mod vectors;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Parity: a golden-model verification harness for clocked DSP and memory blocks.
#[derive(Parser, Debug)]
#[command(name = "parity", version, about = "Golden-model verification harness")]
pub struct Cli {
    /// Only log errors; a text report shrinks to its `Result:` line.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug-level logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `parity.toml` file or a directory containing one.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the verification suites against the reference models.
    Run(RunArgs),
    /// Print the seeded random butterfly vectors as JSON.
    Vectors(VectorsArgs),
    /// List injectable fault names.
    Faults,
}

/// Arguments for `parity run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Which suite to run.
    #[arg(short, long, value_enum, default_value_t = SuiteChoice::All)]
    pub suite: SuiteChoice,

    /// Seed for every randomized stream (decimal or `0x` hex).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// Number of random butterfly vectors.
    #[arg(long)]
    pub random_cases: Option<usize>,

    /// Only run cases whose name contains this substring.
    #[arg(long)]
    pub filter: Option<String>,

    /// Report format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Spread butterfly vectors across worker threads.
    #[arg(long)]
    pub parallel: bool,

    /// Inject a defect into the reference model (see `parity faults`).
    #[arg(long)]
    pub fault: Option<String>,
}

/// Arguments for `parity vectors`.
#[derive(Parser, Debug)]
pub struct VectorsArgs {
    /// Seed to generate from (decimal or `0x` hex).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// Number of vectors.
    #[arg(long)]
    pub count: Option<usize>,
}

/// Suite selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SuiteChoice {
    /// Butterfly vectors only.
    Butterfly,
    /// Memory scenarios only.
    Memory,
    /// Both suites.
    All,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// `[PASS]`/`[FAIL]` lines and a summary.
    Text,
    /// The full run summary as JSON.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Optional path to a config file or directory.
    pub config: Option<String>,
}

fn parse_seed(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid seed '{s}': {e}"))
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Vectors(ref args) => vectors::run(args, &global),
        Command::Faults => {
            run::list_faults();
            Ok(0)
        }
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_default() {
        let cli = Cli::parse_from(["parity", "run"]);
        match cli.command {
            Command::Run(ref args) => {
                assert_eq!(args.suite, SuiteChoice::All);
                assert_eq!(args.format, ReportFormat::Text);
                assert!(args.seed.is_none());
                assert!(args.fault.is_none());
                assert!(!args.parallel);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parse_run_with_args() {
        let cli = Cli::parse_from([
            "parity",
            "run",
            "--suite",
            "memory",
            "--seed",
            "0x5EED",
            "--random-cases",
            "10",
            "--filter",
            "fill",
            "--format",
            "json",
            "--parallel",
            "--fault",
            "late-read",
        ]);
        match cli.command {
            Command::Run(ref args) => {
                assert_eq!(args.suite, SuiteChoice::Memory);
                assert_eq!(args.seed, Some(0x5EED));
                assert_eq!(args.random_cases, Some(10));
                assert_eq!(args.filter.as_deref(), Some("fill"));
                assert_eq!(args.format, ReportFormat::Json);
                assert!(args.parallel);
                assert_eq!(args.fault.as_deref(), Some("late-read"));
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parse_vectors() {
        let cli = Cli::parse_from(["parity", "vectors", "--seed", "42", "--count", "3"]);
        match cli.command {
            Command::Vectors(ref args) => {
                assert_eq!(args.seed, Some(42));
                assert_eq!(args.count, Some(3));
            }
            _ => panic!("expected Vectors command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["parity", "--quiet", "--config", "hw/parity.toml", "faults"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("hw/parity.toml"));
        assert!(matches!(cli.command, Command::Faults));
    }

    #[test]
    fn seed_formats() {
        assert_eq!(parse_seed("123"), Ok(123));
        assert_eq!(parse_seed("0x5EED_0001"), Ok(0x5EED_0001));
        assert_eq!(parse_seed("1_000"), Ok(1000));
        assert!(parse_seed("seed").is_err());
    }

    #[test]
    fn bad_seed_is_a_parse_error() {
        assert!(Cli::try_parse_from(["parity", "run", "--seed", "nope"]).is_err());
    }
}
