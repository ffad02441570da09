//! List command implementation
//!
//! Prints the catalog, or one subset of it, with each entry's family and
//! whether its output depends on the seed.

use anyhow::Result;
use colored::Colorize;
use imgcorrupt::{Corruption, Subset};
use serde::Serialize;
use std::process::ExitCode;

/// One catalog entry as reported by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub name: &'static str,
    pub family: &'static str,
    pub seed_dependent: bool,
}

/// Collect the entries of a subset (the whole catalog when `None`).
pub fn entries(subset: Option<&str>) -> Result<Vec<ListEntry>> {
    let members = match subset {
        Some(name) => name.parse::<Subset>()?.corruptions(),
        None => Corruption::ALL.to_vec(),
    };
    Ok(members
        .into_iter()
        .map(|c| ListEntry {
            name: c.name(),
            family: c.family().as_str(),
            seed_dependent: c.is_seed_dependent(),
        })
        .collect())
}

/// Run the list command.
pub fn run(subset: Option<&str>, json_output: bool) -> Result<ExitCode> {
    let entries = entries(subset)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(ExitCode::SUCCESS);
    }

    let title = subset.unwrap_or("catalog");
    println!("{} {} ({})", "Subset:".cyan().bold(), title, entries.len());
    for entry in &entries {
        let seeding = if entry.seed_dependent {
            "seeded".yellow()
        } else {
            "severity-only".dimmed()
        };
        println!("  {:<20} {:<10} {}", entry.name, entry.family, seeding);
    }

    Ok(ExitCode::SUCCESS)
}
