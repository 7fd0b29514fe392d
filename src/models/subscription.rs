// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription model as returned by `GET /subscriptions`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Plan;
use crate::time_utils::backend_timestamp;

/// Billing state of a subscription.
///
/// The backend sends an empty string (or "unknown") when no subscription
/// exists; those decode to `None`, as does any status this client does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum SubscriptionStatus {
    #[default]
    None,
    Trial,
    Active,
    Canceled,
    PastDue,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::None => "",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::PastDue => "past_due",
        }
    }
}

impl From<Option<String>> for SubscriptionStatus {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::trim) {
            Some("trial") => SubscriptionStatus::Trial,
            Some("active") => SubscriptionStatus::Active,
            Some("canceled") => SubscriptionStatus::Canceled,
            Some("past_due") => SubscriptionStatus::PastDue,
            _ => SubscriptionStatus::None,
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Subscription record owned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub plan_id: String,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default, with = "backend_timestamp")]
    pub trial_start: Option<DateTime<Utc>>,
    /// End of the trial; meaningful for trials and canceled trials
    #[serde(default, with = "backend_timestamp")]
    pub trial_end: Option<DateTime<Utc>>,
    #[serde(default, with = "backend_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "backend_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// The paid plan, absent while on the trial
    #[serde(default)]
    pub plan: Option<Plan>,
}

impl Subscription {
    pub fn is_trial(&self) -> bool {
        self.status == SubscriptionStatus::Trial
    }

    /// Whether a paid plan is attached (upgrades happen in place).
    pub fn has_paid_plan(&self) -> bool {
        self.plan.is_some()
    }
}

/// Envelope of `GET /subscriptions`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionEnvelope {
    pub subscription: Subscription,
}
