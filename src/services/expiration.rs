// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trial and account-deletion countdowns.
//!
//! All counts use inclusive-day counting: a deadline that has not passed yet
//! reads as "whole days left + 1", so a trial ending later today still shows
//! one day. Once the deadline is reached the count is 0, never negative.

use chrono::{DateTime, Duration, Months, Utc};

use crate::models::{Account, Subscription};

/// Months between account creation and deletion of an unpaid account.
pub const ACCOUNT_EXPIRATION_MONTHS: u32 = 1;

/// Length of the free trial counted from account creation.
pub const TRIAL_EXPIRATION_DAYS: i64 = 14;

/// Trial countdown shown in the trial banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrialStatus {
    pub days_remaining: u32,
    pub is_expired: bool,
}

/// Countdowns derived from the account creation date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountExpiry {
    /// Days until an unpaid account is removed
    pub expired_days: u32,
    /// Days left in the trial started at sign-up
    pub trial_expired_days: u32,
}

/// Which countdown banner the account pages should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownBanner {
    DeletionScheduled { days_remaining: u32 },
    TrialEnding { days_remaining: u32 },
    TrialExpired,
}

/// Inclusive days from `now` until `deadline`, clamped at 0.
pub fn inclusive_days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let remaining = deadline - now;
    if remaining <= Duration::zero() {
        return 0;
    }

    let whole_days = remaining.num_days();
    u32::try_from(whole_days + 1).unwrap_or(u32::MAX)
}

/// Trial countdown for a subscription.
///
/// Only trials with a known end date count; everything else is `{0, false}`.
pub fn trial_status(subscription: &Subscription, now: DateTime<Utc>) -> TrialStatus {
    if !subscription.is_trial() {
        return TrialStatus::default();
    }

    let Some(trial_end) = subscription.trial_end else {
        return TrialStatus::default();
    };

    TrialStatus {
        days_remaining: inclusive_days_until(trial_end, now),
        is_expired: now >= trial_end,
    }
}

/// Days until a scheduled account deletion, 0 when none is scheduled.
pub fn account_deletion_remaining_days(account: &Account, now: DateTime<Utc>) -> u32 {
    account
        .scheduled_deletion_at
        .map(|deadline| inclusive_days_until(deadline, now))
        .unwrap_or(0)
}

/// Countdowns implied by the account's creation date alone.
///
/// Used when the subscription has not been loaded (or does not exist yet).
pub fn account_expiry(account: &Account, now: DateTime<Utc>) -> AccountExpiry {
    let Some(created_at) = account.created_at else {
        return AccountExpiry::default();
    };

    let expiration = created_at
        .checked_add_months(Months::new(ACCOUNT_EXPIRATION_MONTHS))
        .unwrap_or(created_at);
    let trial_expiration = created_at + Duration::days(TRIAL_EXPIRATION_DAYS);

    AccountExpiry {
        expired_days: inclusive_days_until(expiration, now),
        trial_expired_days: inclusive_days_until(trial_expiration, now),
    }
}

/// Pick the banner to display; a scheduled deletion outranks the trial.
pub fn countdown_banner(
    account: &Account,
    subscription: Option<&Subscription>,
    now: DateTime<Utc>,
) -> Option<CountdownBanner> {
    if account.scheduled_deletion_at.is_some() {
        return Some(CountdownBanner::DeletionScheduled {
            days_remaining: account_deletion_remaining_days(account, now),
        });
    }

    let subscription = subscription.filter(|s| s.is_trial() && s.trial_end.is_some())?;
    let status = trial_status(subscription, now);
    if status.is_expired {
        Some(CountdownBanner::TrialExpired)
    } else {
        Some(CountdownBanner::TrialEnding {
            days_remaining: status.days_remaining,
        })
    }
}

impl Subscription {
    /// Trial countdown against the current wall clock.
    pub fn trial_status(&self) -> TrialStatus {
        trial_status(self, Utc::now())
    }
}

impl Account {
    /// Days until scheduled deletion against the current wall clock.
    pub fn deletion_remaining_days(&self) -> u32 {
        account_deletion_remaining_days(self, Utc::now())
    }
}
