// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile maintenance: name changes and the two-step email change.

use std::sync::Arc;

use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::auth::{EmailChangeRequest, ProfileUpdate};
use crate::models::Account;
use crate::services::api::ProfileApi;
use crate::session::SessionGate;

/// Updates the signed-in account and keeps the gate's copy current.
pub struct ProfileService {
    api: Arc<dyn ProfileApi>,
    gate: Arc<SessionGate>,
}

impl ProfileService {
    pub fn new(api: Arc<dyn ProfileApi>, gate: Arc<SessionGate>) -> Self {
        Self { api, gate }
    }

    /// Change first and/or last name.
    pub async fn update_name(
        &self,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Account> {
        let update = ProfileUpdate {
            first_name: non_blank(first_name),
            last_name: non_blank(last_name),
        };
        if update.first_name.is_none() && update.last_name.is_none() {
            return Err(AppError::Validation("nothing to update".to_string()));
        }

        let account = self.api.update_me(&update).await?;
        self.gate.replace_account(account.clone());
        Ok(account)
    }

    /// Email a confirmation link to the new address.
    pub async fn request_email_change(&self, email: &str, confirmation: &str) -> Result<()> {
        let request = EmailChangeRequest {
            email: email.trim().to_string(),
            email_confirmation: confirmation.trim().to_string(),
        };
        request.validate()?;

        self.api.send_update_email_instructions(&request).await?;
        tracing::info!("Email change instructions sent");
        Ok(())
    }

    /// Apply the email change from the confirmation link's token.
    pub async fn confirm_email_change(&self, token: &str) -> Result<Account> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Validation("missing email change token".to_string()));
        }

        let account = self.api.update_me_email(token).await?;
        tracing::info!(account_id = %account.id, "Email changed");
        self.gate.replace_account(account.clone());
        Ok(account)
    }
}

fn non_blank(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
