// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request and response payloads of the authentication endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// `POST /auth/refreshToken`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    #[serde(default)]
    pub expires_at: String,
}

impl RefreshTokenResponse {
    /// A refresh only counts as a session when it reports an expiry.
    pub fn grants_session(&self) -> bool {
        !self.expires_at.trim().is_empty()
    }
}

/// Body of `POST /auth/magic/request`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct MagicLinkRequest {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
}

/// `POST /auth/magic/request`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkRequested {
    pub email: String,
    #[serde(default)]
    pub is_new: bool,
}

/// Body of `POST /auth/magic/authenticate`.
#[derive(Debug, Clone, Serialize)]
pub struct MagicLinkToken {
    pub token: String,
}

/// `POST /auth/magic/authenticate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkAuthentication {
    #[serde(default)]
    pub registration_token: String,
    #[serde(default)]
    pub expires_at: String,
    #[serde(default)]
    pub is_new_user: bool,
}

/// Body of `POST /auth/magic/register`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[validate(length(min = 1, message = "Invalid token"))]
    pub token: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
}

/// `POST /auth/magic/register`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkRegistration {
    #[serde(default)]
    pub has_organization: bool,
    #[serde(default)]
    pub expires_at: String,
}

/// `POST /auth/google/request`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthLink {
    pub auth_url: String,
}

/// Body of `POST /auth/google/authenticate`.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleCallback {
    pub code: String,
    pub state: String,
}

/// `POST /auth/google/authenticate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthentication {
    #[serde(default)]
    pub expires_at: String,
    #[serde(default)]
    pub registration_token: String,
    #[serde(default)]
    pub is_new_user: bool,
}

/// Body of `POST /auth/google/register`.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleRegistrationToken {
    pub token: String,
}

/// `POST /auth/google/register`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRegistration {
    #[serde(default)]
    pub expires_at: String,
}

/// Body of `PUT /users/me`; absent names are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Body of `POST /users/me/email/instructions`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailChangeRequest {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(must_match(other = "email", message = "Emails do not match"))]
    pub email_confirmation: String,
}

/// Generic `{code, message}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

/// `POST /stripe/createCheckoutSession` and `GET /stripe/customerPortalUrl`
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectUrl {
    pub url: String,
}

/// Body of plan-targeted billing calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSelection {
    pub plan_id: String,
}
