// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the billing backend's REST API.
//!
//! The backend keeps the session in HTTP-only cookies, so the client carries
//! a cookie jar across calls and echoes the `xsrf_token` cookie back in the
//! `X-XSRF-TOKEN` header. Non-2xx responses become [`AppError`]s built from
//! the backend's error body.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::auth::{
    EmailChangeRequest, GoogleAuthLink, GoogleAuthentication, GoogleCallback, GoogleRegistration,
    GoogleRegistrationToken, MagicLinkAuthentication, MagicLinkRegistration, MagicLinkRequest,
    MagicLinkRequested, MagicLinkToken, PlanSelection, ProfileUpdate, RedirectUrl,
    RefreshTokenResponse, RegistrationForm, StatusResponse,
};
use crate::models::{Account, AccountEnvelope, Plan, PlanList, Subscription, SubscriptionEnvelope};
use crate::services::api::{AuthApi, BillingApi, LoginApi, ProfileApi};

/// Cookie set by the backend at login, mirrored into [`XSRF_HEADER`].
const XSRF_COOKIE: &str = "xsrf_token";
const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Backend REST client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    api_url: Url,
    jar: Arc<Jar>,
}

impl BackendClient {
    /// Create a client for the API described by `config`.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let base_url = config.api_base_url();
        let api_url: Url = base_url
            .parse()
            .with_context(|| format!("invalid backend URL {}", config.backend_url))?;
        let jar = Arc::new(Jar::default());

        if let Some(cookie) = &config.session_cookie {
            for pair in cookie.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                jar.add_cookie_str(pair, &api_url);
            }
            tracing::debug!(
                origin = %api_url.origin().ascii_serialization(),
                "Seeded session cookie"
            );
        }

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .cookie_provider(jar.clone())
            .build()
            .context("failed building backend HTTP client")?;

        tracing::info!(base_url = %base_url, "Initialized backend client");

        Ok(Self {
            http,
            base_url,
            api_url,
            jar,
        })
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current value of the XSRF cookie, if the backend has set one.
    pub fn xsrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.api_url)?;
        let cookies = header.to_str().ok()?;

        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == XSRF_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
    }

    /// Request builder with the XSRF header attached when available.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match self.xsrf_token() {
            Some(token) => request.header(XSRF_HEADER, token),
            None => request,
        }
    }

    /// GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(AppError::from)?;

        Self::check_response_json(path, response).await
    }

    /// Request with an optional JSON body and a JSON response.
    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(AppError::from)?;
        Self::check_response_json(path, response).await
    }

    /// Request whose response body is ignored.
    async fn send_discard<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(AppError::from)?;
        Self::check_response(path, response).await?;
        Ok(())
    }

    /// Check response status and return error if not successful.
    async fn check_response(path: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = AppError::from_status(status.as_u16(), &body);

        if status.is_server_error() {
            tracing::warn!(path, status = status.as_u16(), error = %err, "Backend call failed");
        } else {
            tracing::debug!(path, status = status.as_u16(), error = %err, "Backend rejected call");
        }

        Err(err)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let response = Self::check_response(path, response).await?;
        let bytes = response.bytes().await.map_err(AppError::from)?;

        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Decode(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl AuthApi for BackendClient {
    async fn refresh_token(&self) -> Result<RefreshTokenResponse> {
        self.send_json::<(), _>(Method::POST, "/auth/refreshToken", None)
            .await
    }

    async fn get_me(&self) -> Result<Account> {
        let envelope: AccountEnvelope = self.get_json("/users/me").await?;
        Ok(envelope.user)
    }

    async fn logout(&self) -> Result<()> {
        self.send_discard::<()>(Method::POST, "/auth/logout", None)
            .await
    }
}

#[async_trait]
impl LoginApi for BackendClient {
    async fn request_magic_link(&self, email: &str) -> Result<MagicLinkRequested> {
        let body = MagicLinkRequest {
            email: email.to_string(),
        };
        self.send_json(Method::POST, "/auth/magic/request", Some(&body))
            .await
    }

    async fn authenticate_magic_link(&self, token: &str) -> Result<MagicLinkAuthentication> {
        let body = MagicLinkToken {
            token: token.to_string(),
        };
        self.send_json(Method::POST, "/auth/magic/authenticate", Some(&body))
            .await
    }

    async fn register_magic_link(&self, form: &RegistrationForm) -> Result<MagicLinkRegistration> {
        self.send_json(Method::POST, "/auth/magic/register", Some(form))
            .await
    }

    async fn request_google_auth_link(&self) -> Result<GoogleAuthLink> {
        self.send_json::<(), _>(Method::POST, "/auth/google/request", None)
            .await
    }

    async fn authenticate_google(&self, code: &str, state: &str) -> Result<GoogleAuthentication> {
        let body = GoogleCallback {
            code: code.to_string(),
            state: state.to_string(),
        };
        self.send_json(Method::POST, "/auth/google/authenticate", Some(&body))
            .await
    }

    async fn register_google(&self, token: &str) -> Result<GoogleRegistration> {
        let body = GoogleRegistrationToken {
            token: token.to_string(),
        };
        self.send_json(Method::POST, "/auth/google/register", Some(&body))
            .await
    }
}

#[async_trait]
impl BillingApi for BackendClient {
    async fn get_subscription(&self) -> Result<Subscription> {
        let envelope: SubscriptionEnvelope = self.get_json("/subscriptions").await?;
        Ok(envelope.subscription)
    }

    async fn upgrade_subscription(&self, plan_id: &str) -> Result<StatusResponse> {
        let body = PlanSelection {
            plan_id: plan_id.to_string(),
        };
        self.send_json(Method::POST, "/subscriptions/upgrade", Some(&body))
            .await
    }

    async fn cancel_subscription(&self) -> Result<()> {
        self.send_discard::<()>(Method::POST, "/subscriptions/cancel", None)
            .await
    }

    async fn list_plans(&self) -> Result<Vec<Plan>> {
        let list: PlanList = self.get_json("/plans").await?;
        Ok(list.plans)
    }

    async fn create_checkout_session(&self, plan_id: &str) -> Result<String> {
        let body = PlanSelection {
            plan_id: plan_id.to_string(),
        };
        let redirect: RedirectUrl = self
            .send_json(Method::POST, "/stripe/createCheckoutSession", Some(&body))
            .await?;
        Ok(redirect.url)
    }

    async fn customer_portal_url(&self) -> Result<String> {
        let redirect: RedirectUrl = self.get_json("/stripe/customerPortalUrl").await?;
        Ok(redirect.url)
    }
}

#[async_trait]
impl ProfileApi for BackendClient {
    async fn update_me(&self, update: &ProfileUpdate) -> Result<Account> {
        let envelope: AccountEnvelope = self
            .send_json(Method::PUT, "/users/me", Some(update))
            .await?;
        Ok(envelope.user)
    }

    async fn send_update_email_instructions(&self, request: &EmailChangeRequest) -> Result<()> {
        self.send_discard(Method::POST, "/users/me/email/instructions", Some(request))
            .await
    }

    async fn update_me_email(&self, token: &str) -> Result<Account> {
        let body = MagicLinkToken {
            token: token.to_string(),
        };
        let envelope: AccountEnvelope = self
            .send_json(Method::PUT, "/users/me/email", Some(&body))
            .await?;
        Ok(envelope.user)
    }
}
