// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend API seams.
//!
//! The session gate and the login/billing flows talk to the backend only
//! through these traits, so tests can script responses without a network.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::auth::{
    EmailChangeRequest, GoogleAuthLink, GoogleAuthentication, GoogleRegistration,
    MagicLinkAuthentication, MagicLinkRegistration, MagicLinkRequested, ProfileUpdate,
    RefreshTokenResponse, RegistrationForm, StatusResponse,
};
use crate::models::{Account, Plan, Subscription};

/// Session endpoints used by the gate.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/refreshToken`
    async fn refresh_token(&self) -> Result<RefreshTokenResponse>;

    /// `GET /users/me`
    async fn get_me(&self) -> Result<Account>;

    /// `POST /auth/logout`
    async fn logout(&self) -> Result<()>;
}

/// Magic-link and Google OAuth login endpoints.
#[async_trait]
pub trait LoginApi: Send + Sync {
    async fn request_magic_link(&self, email: &str) -> Result<MagicLinkRequested>;

    async fn authenticate_magic_link(&self, token: &str) -> Result<MagicLinkAuthentication>;

    async fn register_magic_link(&self, form: &RegistrationForm) -> Result<MagicLinkRegistration>;

    async fn request_google_auth_link(&self) -> Result<GoogleAuthLink>;

    async fn authenticate_google(&self, code: &str, state: &str) -> Result<GoogleAuthentication>;

    async fn register_google(&self, token: &str) -> Result<GoogleRegistration>;
}

/// Subscription, plan and Stripe endpoints.
#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn get_subscription(&self) -> Result<Subscription>;

    async fn upgrade_subscription(&self, plan_id: &str) -> Result<StatusResponse>;

    async fn cancel_subscription(&self) -> Result<()>;

    async fn list_plans(&self) -> Result<Vec<Plan>>;

    /// Returns the hosted checkout URL.
    async fn create_checkout_session(&self, plan_id: &str) -> Result<String>;

    /// Returns the hosted billing portal URL.
    async fn customer_portal_url(&self) -> Result<String>;
}

/// Profile maintenance endpoints.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn update_me(&self, update: &ProfileUpdate) -> Result<Account>;

    async fn send_update_email_instructions(&self, request: &EmailChangeRequest) -> Result<()>;

    async fn update_me_email(&self, token: &str) -> Result<Account>;
}
