// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription cache and plan upgrade / billing portal flows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{AppError, Result};
use crate::models::{Plan, Subscription};
use crate::services::api::BillingApi;
use crate::session::{Navigator, Notifier, SessionGate};

pub const CHECKOUT_FAILED: &str = "Failed to create checkout session";
pub const UPGRADE_FAILED: &str = "Failed to upgrade subscription - Please try again";
pub const CANCEL_FAILED: &str = "Failed to cancel subscription - Please try again";
pub const PORTAL_FAILED: &str = "Failed to open billing portal - Please try again";

/// What `choose_plan` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanChange {
    /// The plan is already the current one
    AlreadyCurrent,
    /// Paid subscription switched in place
    Upgraded,
    /// Sent to hosted checkout at this URL
    CheckoutStarted { url: String },
    /// Dropped because another upgrade is still in flight
    Ignored,
}

/// Holds the cached subscription of the signed-in account.
pub struct BillingService {
    api: Arc<dyn BillingApi>,
    gate: Arc<SessionGate>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    subscription: Mutex<Option<Subscription>>,
    upgrading: AtomicBool,
}

struct UpgradeGuard<'a>(&'a AtomicBool);

impl Drop for UpgradeGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BillingService {
    pub fn new(
        api: Arc<dyn BillingApi>,
        gate: Arc<SessionGate>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            gate,
            navigator,
            notifier,
            subscription: Mutex::new(None),
            upgrading: AtomicBool::new(false),
        }
    }

    /// Cached subscription, if loaded.
    pub fn subscription(&self) -> Option<Subscription> {
        self.cache().clone()
    }

    /// Whether an upgrade request is in flight.
    pub fn is_upgrading(&self) -> bool {
        self.upgrading.load(Ordering::Acquire)
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, Option<Subscription>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the subscription; only runs while the gate holds an account.
    ///
    /// A failed fetch clears the cache and is only logged.
    pub async fn refresh(&self) -> Option<Subscription> {
        if self.gate.account().is_none() {
            tracing::debug!("No account, skipping subscription fetch");
            *self.cache() = None;
            return None;
        }

        let fetched = match self.api.get_subscription().await {
            Ok(subscription) => {
                tracing::debug!(status = subscription.status.as_str(), "Subscription loaded");
                Some(subscription)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Subscription fetch failed");
                None
            }
        };

        *self.cache() = fetched.clone();
        fetched
    }

    /// List purchasable plans.
    pub async fn list_plans(&self) -> Result<Vec<Plan>> {
        if self.gate.account().is_none() {
            return Err(AppError::Unauthorized);
        }
        self.api.list_plans().await
    }

    /// Switch an existing paid subscription to `plan_id`, then refetch.
    ///
    /// Returns `Ok(false)` without contacting the backend when another
    /// upgrade is still in flight.
    pub async fn upgrade_subscription(&self, plan_id: &str) -> Result<bool> {
        if self.upgrading.swap(true, Ordering::AcqRel) {
            tracing::debug!(plan_id, "Upgrade already in flight, ignoring");
            return Ok(false);
        }
        let _upgrading = UpgradeGuard(&self.upgrading);

        if let Err(e) = self.api.upgrade_subscription(plan_id).await {
            tracing::warn!(plan_id, error = %e, "Subscription upgrade failed");
            self.notifier.notify(UPGRADE_FAILED);
            return Err(e);
        }

        tracing::info!(plan_id, "Subscription upgraded");
        self.refresh().await;
        Ok(true)
    }

    /// Cancel the subscription, then refetch.
    pub async fn cancel_subscription(&self) -> Result<()> {
        if let Err(e) = self.api.cancel_subscription().await {
            tracing::warn!(error = %e, "Subscription cancel failed");
            self.notifier.notify(CANCEL_FAILED);
            return Err(e);
        }

        tracing::info!("Subscription canceled");
        self.refresh().await;
        Ok(())
    }

    /// Act on a plan card: no-op for the current plan, in-place upgrade when
    /// a paid plan exists, hosted checkout otherwise.
    pub async fn choose_plan(&self, plan_id: &str) -> Result<PlanChange> {
        let current = self.subscription();

        if current.as_ref().is_some_and(|s| s.plan_id == plan_id) {
            return Ok(PlanChange::AlreadyCurrent);
        }

        if current.as_ref().is_some_and(Subscription::has_paid_plan) {
            let sent = self.upgrade_subscription(plan_id).await?;
            return Ok(if sent {
                PlanChange::Upgraded
            } else {
                PlanChange::Ignored
            });
        }

        match self.api.create_checkout_session(plan_id).await {
            Ok(url) => {
                tracing::info!(plan_id, "Redirecting to checkout");
                self.navigator.assign_location(&url);
                Ok(PlanChange::CheckoutStarted { url })
            }
            Err(e) => {
                tracing::error!(plan_id, error = %e, "Checkout session creation failed");
                self.notifier.notify(CHECKOUT_FAILED);
                Err(e)
            }
        }
    }

    /// Leave for the hosted billing portal.
    pub async fn open_customer_portal(&self) -> Result<String> {
        match self.api.customer_portal_url().await {
            Ok(url) => {
                self.navigator.assign_location(&url);
                Ok(url)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Billing portal URL request failed");
                self.notifier.notify(PORTAL_FAILED);
                Err(e)
            }
        }
    }
}
