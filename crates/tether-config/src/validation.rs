// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::TetherConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration. Collects every error instead of
/// failing on the first.
pub fn validate_config(config: &TetherConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.runtime.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "runtime.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.runtime.log_level
            ),
        });
    }

    if config.plugins.hook_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "plugins.hook_timeout_secs must be greater than 0".to_string(),
        });
    }

    for (i, dir) in config.plugins.directories.iter().enumerate() {
        if dir.as_os_str().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("plugins.directories[{i}] must not be empty"),
            });
        }
    }

    if config.bridge.context_query_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "bridge.context_query_timeout_secs must be greater than 0".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
