// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login flows: magic link, Google OAuth and the sign-up follow-up.
//!
//! Each flow talks to the backend through [`LoginApi`], moves the visitor with
//! the session gate, and reports failures as notices. Callbacks that consume a
//! one-time token run at most once per flow instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::auth::{MagicLinkRequest, MagicLinkRequested, RegistrationForm};
use crate::services::api::LoginApi;
use crate::session::{Navigator, Notifier, SessionGate};

pub const LOGIN_FAILED: &str = "Login failed - Please check your email";
pub const GOOGLE_LINK_FAILED: &str = "Failed to retrieve Url - Please try again";
pub const INVALID_TOKEN: &str = "Invalid token - Please try again";
pub const AUTHENTICATE_FAILED: &str = "Failed to authenticate - Please try again";
pub const REGISTER_FAILED: &str = "Failed to register - Please try again";
pub const SIGNUP_SUCCESS: &str = "Signup success - Next, create an organization";

/// Route shown after a magic link has been emailed.
pub const EMAIL_SENT_PATH: &str = "/login/emailSent";
/// Route collecting the new user's name.
pub const SIGNUP_FOLLOWUP_PATH: &str = "/signup/followup";

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Existing user; the session is authorized
    SignedIn,
    /// First login; finish with the registration token
    NeedsSignup { registration_token: String },
    /// Dropped because an equivalent request is already running or done
    Ignored,
}

/// Login page and auth callback flows.
pub struct LoginFlow {
    api: Arc<dyn LoginApi>,
    gate: Arc<SessionGate>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    request_pending: AtomicBool,
    callback_started: AtomicBool,
}

/// Clears the pending-request flag when a login request finishes.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LoginFlow {
    pub fn new(
        api: Arc<dyn LoginApi>,
        gate: Arc<SessionGate>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            gate,
            navigator,
            notifier,
            request_pending: AtomicBool::new(false),
            callback_started: AtomicBool::new(false),
        }
    }

    fn try_begin_request(&self) -> Option<PendingGuard<'_>> {
        if self.request_pending.swap(true, Ordering::AcqRel) {
            tracing::debug!("Login request already pending");
            return None;
        }
        Some(PendingGuard(&self.request_pending))
    }

    fn login_path(&self) -> String {
        self.gate.policy().login_path.clone()
    }

    fn home_path(&self) -> String {
        self.gate.policy().home_path.clone()
    }

    /// Email a magic link and move to the "check your inbox" page.
    ///
    /// Returns `Ok(None)` when another login request is still pending.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed address (no request is sent); the backend
    /// error otherwise, after showing a notice.
    pub async fn request_magic_link(&self, email: &str) -> Result<Option<MagicLinkRequested>> {
        let request = MagicLinkRequest {
            email: email.trim().to_string(),
        };
        request.validate()?;

        let Some(_pending) = self.try_begin_request() else {
            return Ok(None);
        };

        match self.api.request_magic_link(&request.email).await {
            Ok(sent) => {
                tracing::info!(is_new = sent.is_new, "Magic link sent");
                let to = format!("{}?email={}", EMAIL_SENT_PATH, urlencoding::encode(&sent.email));
                self.gate.navigate(&to).await;
                Ok(Some(sent))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Magic link request failed");
                self.notifier.notify(LOGIN_FAILED);
                Err(e)
            }
        }
    }

    /// Leave for Google's consent screen.
    ///
    /// Returns the authorization URL, or `Ok(None)` when a request is pending.
    pub async fn request_google_auth(&self) -> Result<Option<String>> {
        let Some(_pending) = self.try_begin_request() else {
            return Ok(None);
        };

        match self.api.request_google_auth_link().await {
            Ok(link) => {
                self.navigator.assign_location(&link.auth_url);
                Ok(Some(link.auth_url))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Google auth link request failed");
                self.notifier.notify(GOOGLE_LINK_FAILED);
                Err(e)
            }
        }
    }

    /// Handle the landing page of an emailed magic link.
    pub async fn authenticate_magic_link(&self, token: Option<&str>) -> Result<LoginOutcome> {
        if self.callback_started.swap(true, Ordering::AcqRel) {
            return Ok(LoginOutcome::Ignored);
        }

        let Some(token) = non_empty(token) else {
            return self.reject_callback("missing magic link token").await;
        };

        match self.api.authenticate_magic_link(token).await {
            Ok(auth) => {
                self.finish_login(auth.is_new_user, auth.registration_token)
                    .await
            }
            Err(e) => self.fail_callback(e).await,
        }
    }

    /// Handle Google's redirect back to `/auth/google/callback`.
    pub async fn google_callback(
        &self,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<LoginOutcome> {
        if self.callback_started.swap(true, Ordering::AcqRel) {
            return Ok(LoginOutcome::Ignored);
        }

        let (Some(code), Some(state)) = (non_empty(code), non_empty(state)) else {
            return self.reject_callback("missing OAuth code or state").await;
        };

        match self.api.authenticate_google(code, state).await {
            Ok(auth) => {
                self.finish_login(auth.is_new_user, auth.registration_token)
                    .await
            }
            Err(e) => self.fail_callback(e).await,
        }
    }

    /// Register a magic-link user with their name.
    pub async fn complete_signup(
        &self,
        token: Option<&str>,
        first_name: &str,
        last_name: &str,
    ) -> Result<()> {
        let Some(token) = non_empty(token) else {
            self.notifier.notify(INVALID_TOKEN);
            return Err(AppError::Validation("missing registration token".to_string()));
        };

        let form = RegistrationForm {
            token: token.to_string(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
        };
        form.validate()?;

        match self.api.register_magic_link(&form).await {
            Ok(_) => self.finish_signup().await,
            Err(e) => {
                tracing::warn!(error = %e, "Magic link registration failed");
                self.notifier.notify(REGISTER_FAILED);
                Err(e)
            }
        }
    }

    /// Register a Google user from the registration token of the callback.
    pub async fn complete_google_signup(&self, token: Option<&str>) -> Result<()> {
        let Some(token) = non_empty(token) else {
            self.notifier.notify(INVALID_TOKEN);
            return Err(AppError::Validation("missing registration token".to_string()));
        };

        match self.api.register_google(token).await {
            Ok(_) => self.finish_signup().await,
            Err(e) => {
                tracing::warn!(error = %e, "Google registration failed");
                self.notifier.notify(REGISTER_FAILED);
                Err(e)
            }
        }
    }

    async fn finish_login(
        &self,
        is_new_user: bool,
        registration_token: String,
    ) -> Result<LoginOutcome> {
        if is_new_user {
            tracing::info!("New user, continuing to sign-up");
            let to = format!(
                "{}?token={}",
                SIGNUP_FOLLOWUP_PATH,
                urlencoding::encode(&registration_token)
            );
            self.gate.navigate(&to).await;
            return Ok(LoginOutcome::NeedsSignup { registration_token });
        }

        self.gate.handle_authorized().await;
        self.gate.navigate(&self.home_path()).await;
        Ok(LoginOutcome::SignedIn)
    }

    async fn finish_signup(&self) -> Result<()> {
        tracing::info!("Registration complete");
        self.gate.handle_authorized().await;
        self.gate.navigate(&self.home_path()).await;
        self.notifier.notify(SIGNUP_SUCCESS);
        Ok(())
    }

    async fn reject_callback(&self, reason: &str) -> Result<LoginOutcome> {
        tracing::warn!(reason, "Rejecting auth callback");
        self.notifier.notify(INVALID_TOKEN);
        self.gate.navigate(&self.login_path()).await;
        Err(AppError::Validation(reason.to_string()))
    }

    async fn fail_callback(&self, err: AppError) -> Result<LoginOutcome> {
        tracing::warn!(error = %err, "Auth callback failed");
        self.notifier.notify(AUTHENTICATE_FAILED);
        self.gate.navigate(&self.login_path()).await;
        Err(err)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
