// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temporary plugin directories for discovery tests.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// A temporary plugins root. Removed when dropped.
#[derive(Debug)]
pub struct PluginFixture {
    root: TempDir,
}

impl PluginFixture {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("create plugins root"),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// A valid plugin `name` with entry point `<name>.js`.
    pub fn plugin(&self, name: &str, capability: Option<&str>) -> PathBuf {
        self.plugin_with_version(name, capability, "0.1.0")
    }

    pub fn plugin_with_version(
        &self,
        name: &str,
        capability: Option<&str>,
        version: &str,
    ) -> PathBuf {
        let mut manifest = json!({
            "name": name,
            "main": format!("{name}.js"),
            "version": version,
            "description": format!("Fixture plugin {name}"),
            "author": "tests",
        });
        if let Some(capability) = capability {
            manifest["type"] = json!(capability);
        }
        self.plugin_with_manifest(name, manifest)
    }

    /// A plugin directory with the given manifest. The entry point named by
    /// `main` is created when present.
    pub fn plugin_with_manifest(&self, dir: &str, manifest: Value) -> PathBuf {
        let path = self.raw_plugin(dir, &manifest.to_string());
        if let Some(main) = manifest.get("main").and_then(Value::as_str) {
            let entry = path.join(main);
            if let Some(parent) = entry.parent() {
                fs::create_dir_all(parent).expect("create entry dir");
            }
            fs::write(&entry, "export default {}\n").expect("write entry point");
        }
        path
    }

    /// A plugin directory whose `manifest.json` holds `content` verbatim.
    pub fn raw_plugin(&self, dir: &str, content: &str) -> PathBuf {
        let path = self.empty_dir(dir);
        fs::write(path.join("manifest.json"), content).expect("write manifest");
        path
    }

    pub fn empty_dir(&self, dir: &str) -> PathBuf {
        let path = self.root().join(dir);
        fs::create_dir_all(&path).expect("create plugin dir");
        path
    }

    /// A plain file directly under the root.
    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, content).expect("write file");
        path
    }
}

impl Default for PluginFixture {
    fn default() -> Self {
        Self::new()
    }
}
