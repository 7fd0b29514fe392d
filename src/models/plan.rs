//! Billing plan model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::backend_timestamp;

/// A purchasable plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Price in the smallest currency unit the backend uses
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub stripe_price_id: String,
    #[serde(default, with = "backend_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "backend_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Envelope of `GET /plans`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanList {
    #[serde(default)]
    pub plans: Vec<Plan>,
}

/// Find a plan by display name (e.g. "Team", "Business").
pub fn find_plan<'a>(plans: &'a [Plan], name: &str) -> Option<&'a Plan> {
    plans.iter().find(|p| p.name == name)
}
