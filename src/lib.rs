// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Account portal: session, subscription and billing flows for the customer portal
//!
//! This crate provides the client side of the account portal: the session
//! gate that decides where a visitor may go, the trial and deletion
//! countdowns, and the login, billing and profile flows backed by the
//! portal's REST API.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use services::{BackendClient, BillingService, LoginFlow, ProfileService};
use session::{Navigator, Notifier, SessionGate};

/// Shared portal state: one session gate and the flows built on it.
pub struct Portal {
    pub config: Config,
    pub gate: Arc<SessionGate>,
    pub login: LoginFlow,
    pub billing: BillingService,
    pub profile: ProfileService,
}

impl Portal {
    /// Wire every flow to one backend client and one session gate.
    pub fn new(
        config: Config,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        initial_route: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let backend = Arc::new(BackendClient::new(&config)?);

        let gate = Arc::new(SessionGate::new(
            backend.clone(),
            navigator.clone(),
            notifier.clone(),
            config.route_policy(),
            initial_route,
        ));

        let login = LoginFlow::new(
            backend.clone(),
            gate.clone(),
            navigator.clone(),
            notifier.clone(),
        );
        let billing = BillingService::new(backend.clone(), gate.clone(), navigator, notifier);
        let profile = ProfileService::new(backend, gate.clone());

        Ok(Self {
            config,
            gate,
            login,
            billing,
            profile,
        })
    }
}
