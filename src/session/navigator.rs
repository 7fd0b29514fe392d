// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Router and toast collaborators.

use async_trait::async_trait;

/// Client-side router.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// In-app navigation; resolves once the router has settled on `to`.
    async fn navigate(&self, to: &str);

    /// Full page load of `url`, discarding all client state.
    fn assign_location(&self, url: &str);
}

/// Transient user-facing notices ("toasts").
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Navigator that only logs; used by the CLI where there is no browser.
#[derive(Debug, Clone, Default)]
pub struct TracingNavigator;

#[async_trait]
impl Navigator for TracingNavigator {
    async fn navigate(&self, to: &str) {
        tracing::info!(to, "Navigate");
    }

    fn assign_location(&self, url: &str) {
        tracing::info!(url, "Open location");
    }
}

/// Notifier that logs notices as warnings.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(message, "Notice");
    }
}
