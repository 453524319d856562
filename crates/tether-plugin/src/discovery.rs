// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin discovery: turn plugin directories into registry records.
//!
//! A plugins root holds one subdirectory per plugin, each with a
//! `manifest.json`. Bulk discovery is lenient: a broken plugin is logged and
//! skipped. Single-plugin discovery can be strict, in which case a missing
//! manifest is an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tether_core::DiscoveryError;
use tracing::{debug, info, warn};

use crate::manifest::{MANIFEST_FILE, load_manifest};
use crate::record::PluginRecord;
use crate::registry::PluginRegistry;

/// A plugin directory that bulk discovery passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPlugin {
    pub directory: PathBuf,
    pub reason: String,
}

/// Outcome of scanning a plugins root.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Records added to the registry, in directory-name order.
    pub added: Vec<Arc<PluginRecord>>,
    /// Subdirectories that did not yield a record.
    pub skipped: Vec<SkippedPlugin>,
}

impl DiscoveryReport {
    /// Appends another report's results to this one.
    pub fn merge(&mut self, other: DiscoveryReport) {
        self.added.extend(other.added);
        self.skipped.extend(other.skipped);
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Discovers the plugin in `dir` and adds it to `registry`.
///
/// Returns `Ok(None)` when the directory has no manifest and `strict` is
/// false. A missing directory is an error in both modes.
pub async fn discover_plugin(
    registry: &PluginRegistry,
    dir: &Path,
    strict: bool,
) -> Result<Option<Arc<PluginRecord>>, DiscoveryError> {
    if !is_dir(dir).await {
        return Err(DiscoveryError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    let has_manifest = tokio::fs::try_exists(&manifest_path)
        .await
        .map_err(|source| DiscoveryError::Io {
            path: manifest_path.clone(),
            source,
        })?;
    if !has_manifest {
        if strict {
            return Err(DiscoveryError::ManifestNotFound { path: dir.to_path_buf() });
        }
        warn!(directory = %dir.display(), "no plugin manifest found, skipping");
        return Ok(None);
    }

    let manifest = load_manifest(&manifest_path).await?;
    if manifest.semver().is_none() {
        warn!(
            plugin = %manifest.name,
            version = %manifest.version,
            "plugin version is not valid semver"
        );
    }

    let record = PluginRecord::new(manifest, dir);
    if !is_file(record.entry_path()).await {
        return Err(DiscoveryError::EntryPointNotFound {
            plugin: record.name().to_string(),
            path: record.entry_path().to_path_buf(),
        });
    }

    let record = Arc::new(record);
    registry.add(record.clone()).await;
    info!(
        plugin = %record.name(),
        id = %record.id(),
        capability = %record.capability_type(),
        "plugin discovered"
    );
    Ok(Some(record))
}

/// Discovers every plugin directly under `root`.
///
/// Subdirectories are visited in name order. Plain files are ignored;
/// subdirectories that fail discovery are logged and reported as skipped.
pub async fn discover_dir(
    registry: &PluginRegistry,
    root: &Path,
) -> Result<DiscoveryReport, DiscoveryError> {
    let mut entries = tokio::fs::read_dir(root).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DiscoveryError::DirectoryNotFound {
                path: root.to_path_buf(),
            }
        } else {
            DiscoveryError::Io {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;

    let mut dirs = Vec::new();
    loop {
        let entry = entries.next_entry().await.map_err(|source| DiscoveryError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let Some(entry) = entry else { break };
        let path = entry.path();
        if is_dir(&path).await {
            dirs.push(path);
        } else {
            debug!(path = %path.display(), "ignoring non-directory entry");
        }
    }
    dirs.sort();

    let mut report = DiscoveryReport::default();
    for dir in dirs {
        match discover_plugin(registry, &dir, false).await {
            Ok(Some(record)) => report.added.push(record),
            Ok(None) => report.skipped.push(SkippedPlugin {
                directory: dir,
                reason: "no plugin manifest".to_string(),
            }),
            Err(e) => {
                warn!(directory = %dir.display(), error = %e, "skipping plugin");
                report.skipped.push(SkippedPlugin {
                    directory: dir,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        root = %root.display(),
        added = report.added.len(),
        skipped = report.skipped.len(),
        "plugin discovery complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use tether_core::{ManifestError, PluginStatus};
    use tether_test_utils::PluginFixture;
    use tracing_test::traced_test;

    use super::*;

    #[tokio::test]
    async fn discovers_valid_plugin() {
        let fixture = PluginFixture::new();
        let dir = fixture.plugin("node", Some("executor"));
        let registry = PluginRegistry::new();

        let record = discover_plugin(&registry, &dir, true).await.unwrap().unwrap();
        assert_eq!(record.status(), PluginStatus::Ready);
        assert_eq!(record.capability_type().as_str(), "executor");
        assert!(registry.get_by_id(&record.id()).await.is_some());
    }

    #[tokio::test]
    async fn missing_directory_is_error_in_both_modes() {
        let fixture = PluginFixture::new();
        let registry = PluginRegistry::new();
        let gone = fixture.root().join("gone");
        for strict in [true, false] {
            let err = discover_plugin(&registry, &gone, strict).await.unwrap_err();
            assert!(matches!(err, DiscoveryError::DirectoryNotFound { .. }));
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn missing_manifest_depends_on_strictness() {
        let fixture = PluginFixture::new();
        let dir = fixture.empty_dir("assets");
        let registry = PluginRegistry::new();

        let err = discover_plugin(&registry, &dir, true).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::ManifestNotFound { .. }));

        assert!(discover_plugin(&registry, &dir, false).await.unwrap().is_none());
        assert!(logs_contain("no plugin manifest found"));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn invalid_manifest_is_reported() {
        let fixture = PluginFixture::new();
        let dir = fixture.raw_plugin("broken", r#"{"name":"broken"}"#);
        let registry = PluginRegistry::new();

        let err = discover_plugin(&registry, &dir, false).await.unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::Manifest(ManifestError::MissingFields { .. })
        ));
    }

    #[tokio::test]
    async fn missing_entry_point_is_reported() {
        let fixture = PluginFixture::new();
        let dir = fixture.plugin("node", Some("executor"));
        std::fs::remove_file(dir.join("node.js")).unwrap();
        let registry = PluginRegistry::new();

        let err = discover_plugin(&registry, &dir, true).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::EntryPointNotFound { .. }));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    #[traced_test]
    async fn non_semver_version_is_warned() {
        let fixture = PluginFixture::new();
        let dir = fixture.plugin_with_version("node", Some("executor"), "latest");
        let registry = PluginRegistry::new();

        assert!(discover_plugin(&registry, &dir, true).await.unwrap().is_some());
        assert!(logs_contain("not valid semver"));
    }

    #[tokio::test]
    async fn bulk_discovery_skips_broken_plugins() {
        let fixture = PluginFixture::new();
        fixture.plugin("node", Some("executor"));
        fixture.empty_dir("no-manifest");
        fixture.raw_plugin("broken", "{ not json");
        fixture.file("README.md", "plugins live here");
        let registry = PluginRegistry::new();

        let report = discover_dir(&registry, fixture.root()).await.unwrap();
        assert_eq!(report.added.len(), 1);
        assert_eq!(report.added[0].name(), "node");
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(registry.len().await, 1);
        let executors = registry.get_by_type(&"executor".into()).await.unwrap();
        assert_eq!(executors[0].status(), PluginStatus::Ready);
    }

    #[tokio::test]
    async fn missing_root_is_directory_not_found() {
        let fixture = PluginFixture::new();
        let registry = PluginRegistry::new();
        let err = discover_dir(&registry, &fixture.root().join("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::DirectoryNotFound { .. }));
    }

    #[tokio::test]
    async fn reports_merge() {
        let fixture = PluginFixture::new();
        fixture.plugin("a", None);
        let registry = PluginRegistry::new();
        let mut report = discover_dir(&registry, fixture.root()).await.unwrap();

        let other = PluginFixture::new();
        other.empty_dir("x");
        report.merge(discover_dir(&registry, other.root()).await.unwrap());
        assert_eq!(report.added.len(), 1);
        assert_eq!(report.skipped.len(), 1);
    }
}
