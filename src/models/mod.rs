// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models exchanged with the billing backend.

pub mod account;
pub mod auth;
pub mod plan;
pub mod subscription;

pub use account::{Account, AccountEnvelope, License};
pub use plan::{find_plan, Plan, PlanList};
pub use subscription::{Subscription, SubscriptionEnvelope, SubscriptionStatus};
