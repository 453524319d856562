// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tether list` command implementation.
//!
//! Runs lenient discovery over the plugin roots and prints what was found,
//! including the directories that were skipped and why.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tether_config::model::TetherConfig;
use tether_core::{LogNotifier, TetherError};
use tether_plugin::{DiscoveryReport, FactoryLoader, PluginRecord, PluginRuntime};
use tracing::debug;

/// One discovered plugin, as printed by `tether list`.
#[derive(Debug, Serialize)]
pub struct PluginSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub capability_type: String,
    pub version: String,
    pub status: String,
    pub directory: PathBuf,
}

impl From<&PluginRecord> for PluginSummary {
    fn from(record: &PluginRecord) -> Self {
        Self {
            id: record.id().to_string(),
            name: record.name().to_string(),
            capability_type: record.capability_type().to_string(),
            version: record.manifest().version.clone(),
            status: record.status().to_string(),
            directory: record.directory().to_path_buf(),
        }
    }
}

/// A plugin directory that was passed over.
#[derive(Debug, Serialize)]
pub struct SkippedSummary {
    pub directory: PathBuf,
    pub reason: String,
}

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub plugins: Vec<PluginSummary>,
    pub skipped: Vec<SkippedSummary>,
}

impl From<&DiscoveryReport> for ListOutput {
    fn from(report: &DiscoveryReport) -> Self {
        let mut plugins: Vec<PluginSummary> =
            report.added.iter().map(|r| PluginSummary::from(r.as_ref())).collect();
        plugins.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Self {
            plugins,
            skipped: report
                .skipped
                .iter()
                .map(|s| SkippedSummary {
                    directory: s.directory.clone(),
                    reason: s.reason.clone(),
                })
                .collect(),
        }
    }
}

/// Discovers plugins under `dirs`, or the configured directories when empty.
pub async fn discover(config: &TetherConfig, dirs: &[PathBuf]) -> ListOutput {
    let runtime = PluginRuntime::from_config(
        &config.plugins,
        Arc::new(FactoryLoader::new()),
        Arc::new(LogNotifier),
    );
    let roots = if dirs.is_empty() {
        config.plugins.directories.as_slice()
    } else {
        dirs
    };
    debug!(roots = roots.len(), "listing plugins");
    let report = runtime.discover_all(roots).await;
    debug!(
        added = report.added.len(),
        skipped = report.skipped.len(),
        "plugin listing complete"
    );
    ListOutput::from(&report)
}

/// Run the `tether list` command.
pub async fn run_list(
    config: &TetherConfig,
    dirs: &[PathBuf],
    json: bool,
    plain: bool,
) -> Result<(), TetherError> {
    let output = discover(config, dirs).await;

    if json {
        let rendered = serde_json::to_string_pretty(&output)
            .map_err(|e| TetherError::Internal(format!("failed to render plugin list: {e}")))?;
        println!("{rendered}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_table(&output, use_color);
    }
    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn print_table(output: &ListOutput, use_color: bool) {
    println!();
    println!("  tether plugins");
    println!("  {}", "-".repeat(60));

    if output.plugins.is_empty() {
        println!("    (no plugins found)");
    }
    for plugin in &output.plugins {
        let status = if use_color {
            use colored::Colorize;
            plugin.status.green().to_string()
        } else {
            plugin.status.clone()
        };
        println!(
            "    {:<8}  {:<20}  {:<12}  {:<10}  {}",
            short_id(&plugin.id),
            plugin.name,
            plugin.capability_type,
            plugin.version,
            status
        );
    }

    for skipped in &output.skipped {
        let marker = if use_color {
            use colored::Colorize;
            "skipped".yellow().to_string()
        } else {
            "[SKIP]".to_string()
        };
        println!(
            "    {marker} {}: {}",
            skipped.directory.display(),
            skipped.reason
        );
    }
    println!();
}
