//! Apply command implementation
//!
//! Corrupts one image file, either with an explicit (corruption, severity,
//! seed) triple or through an augmenter configured from a JSON file.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use imgcorrupt::{corrupt, AugmenterConfig, Image};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

use crate::io::{load_image, write_png, PngConfig};

/// How the corruption is selected.
#[derive(Debug, Clone)]
pub enum ApplyMode {
    /// Call the catalog function directly.
    Direct {
        corruption: String,
        severity: u8,
        seed: u32,
    },
    /// Build an augmenter from a JSON `AugmenterConfig` file.
    Config { path: String },
}

/// Corrupt `image` according to `mode`.
pub fn corrupt_image(image: &Image, mode: &ApplyMode) -> Result<Image> {
    match mode {
        ApplyMode::Direct {
            corruption,
            severity,
            seed,
        } => Ok(corrupt(image, corruption, *severity, *seed)?),
        ApplyMode::Config { path } => {
            let config = load_config(Path::new(path))?;
            let mut augmenter = config.build()?;
            info!(augmenter = augmenter.name(), "built augmenter from config");
            Ok(augmenter.augment_image(image)?)
        }
    }
}

/// Read an augmenter configuration file.
pub fn load_config(path: &Path) -> Result<AugmenterConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Resolve CLI arguments into an apply mode.
pub fn mode_from_args(
    corruption: Option<String>,
    severity: Option<u8>,
    seed: u32,
    config: Option<String>,
) -> Result<ApplyMode> {
    match (config, corruption, severity) {
        (Some(path), None, None) => Ok(ApplyMode::Config { path }),
        (Some(_), _, _) => bail!("--config cannot be combined with --corruption or --severity"),
        (None, Some(corruption), Some(severity)) => Ok(ApplyMode::Direct {
            corruption,
            severity,
            seed,
        }),
        (None, _, _) => bail!("either --config or both --corruption and --severity are required"),
    }
}

/// Run the apply command.
pub fn run(input: &str, output: &str, mode: &ApplyMode, json_output: bool) -> Result<ExitCode> {
    let image = load_image(Path::new(input))?;
    let corrupted = corrupt_image(&image, mode)?;
    let digest = write_png(&corrupted, Path::new(output), &PngConfig::default())?;

    if json_output {
        let report = serde_json::json!({
            "input": input,
            "output": output,
            "shape": corrupted.shape(),
            "blake3": digest,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} {}", "Input:".cyan().bold(), input);
        println!("{} {}", "Output:".cyan().bold(), output);
        println!("{} {}", "BLAKE3:".dimmed(), digest);
        println!("{}", "Done".green().bold());
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_args() {
        assert!(matches!(
            mode_from_args(Some("fog".into()), Some(2), 0, None).unwrap(),
            ApplyMode::Direct { .. }
        ));
        assert!(matches!(
            mode_from_args(None, None, 0, Some("aug.json".into())).unwrap(),
            ApplyMode::Config { .. }
        ));
        assert!(mode_from_args(Some("fog".into()), None, 0, None).is_err());
        assert!(mode_from_args(Some("fog".into()), Some(1), 0, Some("a.json".into())).is_err());
    }

    #[test]
    fn test_direct_mode_matches_library() {
        let img = Image::test_card(8, 8);
        let mode = ApplyMode::Direct {
            corruption: "pixelate".to_string(),
            severity: 3,
            seed: 0,
        };
        let out = corrupt_image(&img, &mode).unwrap();
        assert_eq!(out, imgcorrupt::apply_pixelate(&img, 3, 0).unwrap());
    }
}
