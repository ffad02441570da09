//! Verify command implementation
//!
//! Checks a corruption's reproducibility contract on the generated test card:
//! two equal calls must produce identical bytes, and changing the seed must
//! change the output exactly when the corruption is seed-dependent.

use anyhow::Result;
use colored::Colorize;
use imgcorrupt::{Corruption, Image};
use serde::Serialize;
use std::process::ExitCode;

use crate::io::{digest, encode_png, PngConfig};

/// Side length of the test card.
const CARD_SIZE: usize = 32;

/// Outcome of a verification run.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub corruption: &'static str,
    pub severity: u8,
    pub seed: u32,
    pub other_seed: u32,
    pub seed_dependent: bool,
    /// Digest of the first call.
    pub digest: String,
    /// Digest of the repeated call.
    pub repeat_digest: String,
    /// Digest with `other_seed`.
    pub other_seed_digest: String,
    pub reproducible: bool,
    pub seed_sensitive: bool,
    pub contract_holds: bool,
}

/// Run the three calls and compare digests.
pub fn check(corruption: &str, severity: u8, seed: u32) -> Result<VerifyReport> {
    let c = Corruption::from_name(corruption)?;
    let card = Image::test_card(CARD_SIZE, CARD_SIZE);
    let other_seed = seed.wrapping_add(1);
    let config = PngConfig::default();

    let hash = |s: u32| -> Result<String> {
        let out = c.apply(&card, severity, s)?;
        Ok(digest(&encode_png(&out, &config)?))
    };
    let first = hash(seed)?;
    let repeat = hash(seed)?;
    let other = hash(other_seed)?;

    let reproducible = first == repeat;
    let seed_sensitive = first != other;
    Ok(VerifyReport {
        corruption: c.name(),
        severity,
        seed,
        other_seed,
        seed_dependent: c.is_seed_dependent(),
        contract_holds: reproducible && seed_sensitive == c.is_seed_dependent(),
        digest: first,
        repeat_digest: repeat,
        other_seed_digest: other,
        reproducible,
        seed_sensitive,
    })
}

/// Run the verify command.
///
/// # Returns
/// Exit code: 0 if the contract holds, 1 otherwise
pub fn run(corruption: &str, severity: u8, seed: u32, json_output: bool) -> Result<ExitCode> {
    let report = check(corruption, severity, seed)?;
    let code = if report.contract_holds {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(code);
    }

    println!(
        "{} {} (severity {})",
        "Corruption:".cyan().bold(),
        report.corruption,
        report.severity
    );
    println!("  seed {:<10} {}", report.seed, report.digest);
    println!("  seed {:<10} {}", report.seed, report.repeat_digest);
    println!("  seed {:<10} {}", report.other_seed, report.other_seed_digest);
    println!(
        "{} {}",
        "Expected:".dimmed(),
        if report.seed_dependent {
            "seed-dependent"
        } else {
            "severity-only"
        }
    );

    if report.contract_holds {
        println!("\n{} Reproducibility contract holds", "PASSED".green().bold());
    } else {
        println!(
            "\n{} reproducible={} seed_sensitive={}",
            "FAILED".red().bold(),
            report.reproducible,
            report.seed_sensitive
        );
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_holds_for_seeded_and_severity_only() {
        let noise = check("gaussian_noise", 5, 1).unwrap();
        assert!(noise.reproducible);
        assert!(noise.seed_sensitive);
        assert!(noise.contract_holds);

        let blur = check("gaussian_blur", 2, 1).unwrap();
        assert!(!blur.seed_sensitive);
        assert_eq!(blur.digest, blur.other_seed_digest);
        assert!(blur.contract_holds);
    }

    #[test]
    fn test_bad_arguments() {
        assert!(check("sharpen", 1, 0).is_err());
        assert!(check("fog", 9, 0).is_err());
    }
}
