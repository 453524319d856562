// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing notification sink (dialogs, toasts) used to surface failures.

/// Delivers messages to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);

    fn notify_error(&self, message: &str);
}

/// Notifier that writes to the tracing log, for headless hosts and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(notification = true, "{message}");
    }

    fn notify_error(&self, message: &str) {
        tracing::error!(notification = true, "{message}");
    }
}
