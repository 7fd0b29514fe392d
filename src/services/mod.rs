// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend access and portal flows.

pub mod api;
pub mod backend;
pub mod billing;
pub mod expiration;
pub mod login;
pub mod profile;

pub use api::{AuthApi, BillingApi, LoginApi, ProfileApi};
pub use backend::BackendClient;
pub use billing::{BillingService, PlanChange};
pub use expiration::{
    account_deletion_remaining_days, account_expiry, countdown_banner, trial_status,
    AccountExpiry, CountdownBanner, TrialStatus,
};
pub use login::{LoginFlow, LoginOutcome};
pub use profile::ProfileService;
