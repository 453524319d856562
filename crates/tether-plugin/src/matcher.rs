// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wildcard URL patterns from a manifest's `match` list.
//!
//! `*` matches any run of characters (including `/`); everything else is
//! literal. A pattern must match the whole URL.

use regex::Regex;
use tracing::warn;

/// Compiled `match` patterns of one plugin.
#[derive(Debug, Clone, Default)]
pub struct UrlPatterns {
    patterns: Vec<(String, Regex)>,
}

impl UrlPatterns {
    /// Compiles the given wildcard patterns. Patterns that fail to compile
    /// are logged and dropped.
    pub fn compile<S: AsRef<str>>(plugin: &str, patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern| {
                let pattern = pattern.as_ref();
                match wildcard_regex(pattern) {
                    Ok(regex) => Some((pattern.to_string(), regex)),
                    Err(e) => {
                        warn!(plugin, pattern, error = %e, "ignoring invalid match pattern");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// Returns true if any pattern matches `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.patterns.iter().any(|(_, regex)| regex.is_match(url))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The source patterns, in manifest order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(source, _)| source.as_str())
    }
}

fn wildcard_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$"))
}
