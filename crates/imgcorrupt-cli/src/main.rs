//! imgcorrupt CLI - Command-line interface for reproducible image corruptions
//!
//! This binary lists the corruption catalog, corrupts image files and checks
//! the reproducibility contract of individual corruptions.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use imgcorrupt_cli::commands;

/// imgcorrupt - Reproducible severity-parameterized image corruptions
#[derive(Parser)]
#[command(name = "imgcorrupt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (otherwise RUST_LOG, defaulting to warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the corruption catalog or one of its subsets
    List {
        /// Subset to list (common, validation, all)
        #[arg(long)]
        subset: Option<String>,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Corrupt an image file
    Apply {
        /// Path to the input image
        #[arg(short, long)]
        input: String,

        /// Path to the output PNG
        #[arg(short, long)]
        output: String,

        /// Corruption name (e.g. gaussian_noise)
        #[arg(short, long)]
        corruption: Option<String>,

        /// Severity, 1 to 5
        #[arg(short, long)]
        severity: Option<u8>,

        /// Seed for the corruption's random draws
        #[arg(long, default_value_t = 0)]
        seed: u32,

        /// Augmenter configuration file (JSON), instead of -c/-s/--seed
        #[arg(long)]
        config: Option<String>,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that a corruption replays exactly and honors its seed contract
    Verify {
        /// Corruption name (e.g. fog)
        #[arg(short, long)]
        corruption: String,

        /// Severity, 1 to 5
        #[arg(short, long, default_value_t = 3)]
        severity: u8,

        /// Seed for the first two runs; the third uses seed + 1
        #[arg(long, default_value_t = 1)]
        seed: u32,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A second init (e.g. under a test harness) is harmless.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::List { subset, json } => commands::list::run(subset.as_deref(), json),
        Commands::Apply {
            input,
            output,
            corruption,
            severity,
            seed,
            config,
            json,
        } => commands::apply::mode_from_args(corruption, severity, seed, config)
            .and_then(|mode| commands::apply::run(&input, &output, &mode, json)),
        Commands::Verify {
            corruption,
            severity,
            seed,
            json,
        } => commands::verify::run(&corruption, severity, seed, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_apply() {
        let cli = Cli::try_parse_from([
            "imgcorrupt",
            "apply",
            "-i",
            "in.png",
            "-o",
            "out.png",
            "-c",
            "fog",
            "-s",
            "4",
            "--seed",
            "9",
        ])
        .unwrap();
        match cli.command {
            Commands::Apply {
                input,
                corruption,
                severity,
                seed,
                config,
                ..
            } => {
                assert_eq!(input, "in.png");
                assert_eq!(corruption.as_deref(), Some("fog"));
                assert_eq!(severity, Some(4));
                assert_eq!(seed, 9);
                assert!(config.is_none());
            }
            _ => panic!("Expected Apply command"),
        }
    }

    #[test]
    fn test_cli_parses_verify_defaults() {
        let cli = Cli::try_parse_from(["imgcorrupt", "verify", "-c", "snow"]).unwrap();
        match cli.command {
            Commands::Verify {
                corruption,
                severity,
                seed,
                json,
            } => {
                assert_eq!(corruption, "snow");
                assert_eq!(severity, 3);
                assert_eq!(seed, 1);
                assert!(!json);
            }
            _ => panic!("Expected Verify command"),
        }
    }

    #[test]
    fn test_cli_parses_list_with_verbose() {
        let cli = Cli::try_parse_from(["imgcorrupt", "list", "--subset", "common", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::List { subset, json } => {
                assert_eq!(subset.as_deref(), Some("common"));
                assert!(!json);
            }
            _ => panic!("Expected List command"),
        }
    }
}
