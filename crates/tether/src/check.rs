// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether check` command implementation.
//!
//! Runs strict discovery on one plugin directory so manifest problems are
//! reported instead of skipped.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use tether_core::TetherError;
use tether_plugin::{PluginRecord, PluginRegistry, discover_plugin};

/// Validates the plugin in `dir` and returns its record.
pub async fn check_plugin(dir: &Path) -> Result<Arc<PluginRecord>, TetherError> {
    let registry = PluginRegistry::new();
    match discover_plugin(&registry, dir, true).await? {
        Some(record) => Ok(record),
        // Strict discovery reports a missing manifest as an error.
        None => Err(TetherError::Internal(format!(
            "no plugin discovered in {}",
            dir.display()
        ))),
    }
}

/// Run the `tether check` command.
pub async fn run_check(dir: &Path, plain: bool) -> Result<(), TetherError> {
    let record = check_plugin(dir).await?;
    let manifest = record.manifest();
    let use_color = !plain && std::io::stdout().is_terminal();

    println!();
    if use_color {
        use colored::Colorize;
        println!("  {} {} {}", "✓".green(), manifest.name.bold(), manifest.version);
    } else {
        println!("  [OK] {} {}", manifest.name, manifest.version);
    }
    println!("    Type:        {}", record.capability_type());
    println!("    Entry point: {}", record.entry_path().display());
    println!("    Author:      {}", manifest.author);
    if manifest.semver().is_none() {
        println!("    Note:        version is not valid semver");
    }
    if !manifest.instruct.is_empty() {
        println!("    Handles:     {}", manifest.instruct.join(", "));
    }
    if !manifest.match_patterns.is_empty() {
        println!("    Matches:     {}", manifest.match_patterns.join(", "));
    }
    println!();
    Ok(())
}
