// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use account_portal::error::{AppError, Result};
use account_portal::models::auth::{
    EmailChangeRequest, GoogleAuthLink, GoogleAuthentication, GoogleRegistration,
    MagicLinkAuthentication, MagicLinkRegistration, MagicLinkRequested, ProfileUpdate,
    RefreshTokenResponse, RegistrationForm, StatusResponse,
};
use account_portal::models::{Account, Plan, Subscription, SubscriptionStatus};
use account_portal::services::{AuthApi, BillingApi, LoginApi, ProfileApi};
use account_portal::session::{Navigator, Notifier, RoutePolicy, SessionGate};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap()
}

#[allow(dead_code)]
pub fn sample_account() -> Account {
    Account {
        id: "0b5f4c1e-user".to_string(),
        email: "rachel@example.com".to_string(),
        first_name: "Rachel".to_string(),
        last_name: "Bennett".to_string(),
        created_at: Some(fixed_now() - chrono::Duration::days(3)),
        updated_at: None,
        scheduled_deletion_at: None,
        license: None,
    }
}

#[allow(dead_code)]
pub fn plan(id: &str, name: &str, price: i64) -> Plan {
    Plan {
        id: id.to_string(),
        name: name.to_string(),
        price,
        stripe_price_id: format!("price_{id}"),
        created_at: None,
        updated_at: None,
    }
}

#[allow(dead_code)]
pub fn subscription(status: SubscriptionStatus, trial_end: Option<DateTime<Utc>>) -> Subscription {
    Subscription {
        id: "sub-1".to_string(),
        user_id: "0b5f4c1e-user".to_string(),
        plan_id: String::new(),
        status,
        trial_start: None,
        trial_end,
        created_at: None,
        updated_at: None,
        plan: None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Router and notice doubles
// ─────────────────────────────────────────────────────────────────────────────

/// Navigator that records every navigation, optionally taking time to settle.
#[derive(Default)]
pub struct RecordingNavigator {
    navigations: Mutex<Vec<String>>,
    locations: Mutex<Vec<String>>,
    settle_delay: Option<Duration>,
}

#[allow(dead_code)]
impl RecordingNavigator {
    pub fn with_settle_delay(delay: Duration) -> Self {
        Self {
            settle_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn locations(&self) -> Vec<String> {
        self.locations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, to: &str) {
        self.navigations.lock().unwrap().push(to.to_string());
        if let Some(delay) = self.settle_delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn assign_location(&self, url: &str) {
        self.locations.lock().unwrap().push(url.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted backend
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory backend with scripted answers and a call log.
#[derive(Default)]
pub struct ScriptedBackend {
    /// `None` makes the refresh call fail with 401
    pub refresh_expires_at: Mutex<Option<String>>,
    /// `None` makes `GET /users/me` fail with 401
    pub account: Mutex<Option<Account>>,
    /// While set, `GET /users/me` waits for `release_account`
    pub hold_account: AtomicBool,
    pub account_released: Notify,
    pub logout_fails: AtomicBool,

    pub subscription: Mutex<Option<Subscription>>,
    pub plans: Mutex<Vec<Plan>>,
    pub upgrade_fails: AtomicBool,
    pub checkout_fails: AtomicBool,

    pub login_fails: AtomicBool,
    pub new_user: AtomicBool,

    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn signed_in(account: Account) -> Self {
        let backend = Self::default();
        *backend.refresh_expires_at.lock().unwrap() = Some("1777887000".to_string());
        *backend.account.lock().unwrap() = Some(account);
        backend
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn release_account(&self) {
        self.hold_account.store(false, Ordering::SeqCst);
        self.account_released.notify_one();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == name || c.starts_with(&format!("{name}:")))
            .count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn fail_if(&self, flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(AppError::Backend {
                status: 500,
                title: "Internal Server Error".to_string(),
                detail: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AuthApi for ScriptedBackend {
    async fn refresh_token(&self) -> Result<RefreshTokenResponse> {
        self.record("refresh_token");
        // Give racing callers a chance to interleave.
        tokio::time::sleep(Duration::from_millis(5)).await;
        match self.refresh_expires_at.lock().unwrap().clone() {
            Some(expires_at) => Ok(RefreshTokenResponse { expires_at }),
            None => Err(AppError::Unauthorized),
        }
    }

    async fn get_me(&self) -> Result<Account> {
        self.record("get_me");
        if self.hold_account.load(Ordering::SeqCst) {
            self.account_released.notified().await;
        }
        self.account
            .lock()
            .unwrap()
            .clone()
            .ok_or(AppError::Unauthorized)
    }

    async fn logout(&self) -> Result<()> {
        self.record("logout");
        self.fail_if(&self.logout_fails)?;
        *self.refresh_expires_at.lock().unwrap() = None;
        Ok(())
    }
}

#[async_trait]
impl LoginApi for ScriptedBackend {
    async fn request_magic_link(&self, email: &str) -> Result<MagicLinkRequested> {
        self.record(format!("request_magic_link:{email}"));
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.fail_if(&self.login_fails)?;
        Ok(MagicLinkRequested {
            email: email.to_string(),
            is_new: self.new_user.load(Ordering::SeqCst),
        })
    }

    async fn authenticate_magic_link(&self, token: &str) -> Result<MagicLinkAuthentication> {
        self.record(format!("authenticate_magic_link:{token}"));
        self.fail_if(&self.login_fails)?;
        let is_new_user = self.new_user.load(Ordering::SeqCst);
        Ok(MagicLinkAuthentication {
            registration_token: if is_new_user { "reg-token".to_string() } else { String::new() },
            expires_at: if is_new_user { String::new() } else { "1777887000".to_string() },
            is_new_user,
        })
    }

    async fn register_magic_link(&self, form: &RegistrationForm) -> Result<MagicLinkRegistration> {
        self.record(format!("register_magic_link:{}", form.token));
        self.fail_if(&self.login_fails)?;
        Ok(MagicLinkRegistration {
            has_organization: false,
            expires_at: "1777887000".to_string(),
        })
    }

    async fn request_google_auth_link(&self) -> Result<GoogleAuthLink> {
        self.record("request_google_auth_link");
        self.fail_if(&self.login_fails)?;
        Ok(GoogleAuthLink {
            auth_url: "https://accounts.google.com/o/oauth2/auth?state=s1".to_string(),
        })
    }

    async fn authenticate_google(&self, code: &str, state: &str) -> Result<GoogleAuthentication> {
        self.record(format!("authenticate_google:{code}:{state}"));
        self.fail_if(&self.login_fails)?;
        let is_new_user = self.new_user.load(Ordering::SeqCst);
        Ok(GoogleAuthentication {
            expires_at: "1777887000".to_string(),
            registration_token: if is_new_user { "google-reg".to_string() } else { String::new() },
            is_new_user,
        })
    }

    async fn register_google(&self, token: &str) -> Result<GoogleRegistration> {
        self.record(format!("register_google:{token}"));
        self.fail_if(&self.login_fails)?;
        Ok(GoogleRegistration {
            expires_at: "1777887000".to_string(),
        })
    }
}

#[async_trait]
impl BillingApi for ScriptedBackend {
    async fn get_subscription(&self) -> Result<Subscription> {
        self.record("get_subscription");
        self.subscription
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::NotFound("subscription".to_string()))
    }

    async fn upgrade_subscription(&self, plan_id: &str) -> Result<StatusResponse> {
        self.record(format!("upgrade_subscription:{plan_id}"));
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.fail_if(&self.upgrade_fails)?;

        let plans = self.plans.lock().unwrap().clone();
        if let Some(sub) = self.subscription.lock().unwrap().as_mut() {
            sub.plan_id = plan_id.to_string();
            sub.plan = plans.into_iter().find(|p| p.id == plan_id);
        }
        Ok(StatusResponse {
            code: 200,
            message: "ok".to_string(),
        })
    }

    async fn cancel_subscription(&self) -> Result<()> {
        self.record("cancel_subscription");
        if let Some(sub) = self.subscription.lock().unwrap().as_mut() {
            sub.status = SubscriptionStatus::Canceled;
        }
        Ok(())
    }

    async fn list_plans(&self) -> Result<Vec<Plan>> {
        self.record("list_plans");
        Ok(self.plans.lock().unwrap().clone())
    }

    async fn create_checkout_session(&self, plan_id: &str) -> Result<String> {
        self.record(format!("create_checkout_session:{plan_id}"));
        self.fail_if(&self.checkout_fails)?;
        Ok(format!("https://checkout.stripe.com/c/pay/{plan_id}"))
    }

    async fn customer_portal_url(&self) -> Result<String> {
        self.record("customer_portal_url");
        Ok("https://billing.stripe.com/p/session/test".to_string())
    }
}

#[async_trait]
impl ProfileApi for ScriptedBackend {
    async fn update_me(&self, update: &ProfileUpdate) -> Result<Account> {
        self.record("update_me");
        let mut guard = self.account.lock().unwrap();
        let account = guard.as_mut().ok_or(AppError::Unauthorized)?;
        if let Some(first) = &update.first_name {
            account.first_name = first.clone();
        }
        if let Some(last) = &update.last_name {
            account.last_name = last.clone();
        }
        Ok(account.clone())
    }

    async fn send_update_email_instructions(&self, request: &EmailChangeRequest) -> Result<()> {
        self.record(format!("send_update_email_instructions:{}", request.email));
        Ok(())
    }

    async fn update_me_email(&self, token: &str) -> Result<Account> {
        self.record(format!("update_me_email:{token}"));
        let mut guard = self.account.lock().unwrap();
        let account = guard.as_mut().ok_or(AppError::Unauthorized)?;
        account.email = "new@example.com".to_string();
        Ok(account.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────────────────────────────────────

#[allow(dead_code)]
pub struct TestGate {
    pub gate: Arc<SessionGate>,
    pub backend: Arc<ScriptedBackend>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Build a gate over `backend` for a visitor on `route`.
#[allow(dead_code)]
pub fn test_gate(backend: ScriptedBackend, route: &str) -> TestGate {
    test_gate_with_navigator(backend, RecordingNavigator::default(), route)
}

#[allow(dead_code)]
pub fn test_gate_with_navigator(
    backend: ScriptedBackend,
    navigator: RecordingNavigator,
    route: &str,
) -> TestGate {
    let backend = Arc::new(backend);
    let navigator = Arc::new(navigator);
    let notifier = Arc::new(RecordingNotifier::default());

    let gate = Arc::new(SessionGate::new(
        backend.clone(),
        navigator.clone(),
        notifier.clone(),
        RoutePolicy::default(),
        route,
    ));

    TestGate {
        gate,
        backend,
        navigator,
        notifier,
    }
}

/// Let spawned tasks run until they block.
#[allow(dead_code)]
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}
