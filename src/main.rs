// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account portal command-line client
//!
//! Drives the portal flows against a live backend. Navigation and notices
//! are logged instead of shown in a browser.

use std::sync::Arc;

use account_portal::{
    config::Config,
    models::find_plan,
    services::{countdown_banner, CountdownBanner},
    session::{TracingNavigator, TracingNotifier},
    time_utils::format_utc_rfc3339,
    Portal,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "account-portal", about = "Account and billing portal client")]
struct Cli {
    /// Route the session starts on
    #[arg(long, global = true, default_value = "/")]
    route: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bootstrap the session and show account, subscription and countdowns
    Status,
    /// Request a magic link, or start Google sign-in with --google
    Login {
        #[arg(long, conflicts_with = "google", required_unless_present = "google")]
        email: Option<String>,
        #[arg(long)]
        google: bool,
    },
    /// Complete a magic-link login
    MagicLink {
        #[arg(long)]
        token: String,
    },
    /// Complete a Google login
    GoogleCallback {
        #[arg(long)]
        code: String,
        #[arg(long)]
        state: String,
    },
    /// Register a new magic-link user
    Signup {
        #[arg(long)]
        token: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// List plans
    Plans,
    /// Upgrade, or start checkout for, a plan (by id or name)
    ChoosePlan {
        #[arg(long)]
        plan: String,
    },
    /// Cancel the subscription
    Cancel,
    /// Print the billing portal URL
    BillingPortal,
    /// End the session
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing::info!(
        backend = %config.backend_url,
        page = %config.page_url(&cli.route),
        "Starting account portal"
    );

    let portal = Portal::new(
        config,
        Arc::new(TracingNavigator),
        Arc::new(TracingNotifier),
        cli.route.clone(),
    )?;

    portal.gate.bootstrap().await;

    match cli.command {
        Command::Status => print_status(&portal).await,
        Command::Login { email, google } => {
            if google {
                if let Some(url) = portal.login.request_google_auth().await? {
                    println!("{url}");
                }
            } else if let Some(email) = email {
                portal.login.request_magic_link(&email).await?;
                println!("Magic link sent to {email}");
            }
        }
        Command::MagicLink { token } => {
            let outcome = portal.login.authenticate_magic_link(Some(&token)).await?;
            println!("{outcome:?}");
        }
        Command::GoogleCallback { code, state } => {
            let outcome = portal
                .login
                .google_callback(Some(&code), Some(&state))
                .await?;
            println!("{outcome:?}");
        }
        Command::Signup {
            token,
            first_name,
            last_name,
        } => {
            portal
                .login
                .complete_signup(Some(&token), &first_name, &last_name)
                .await?;
            println!("Registered {first_name} {last_name}");
        }
        Command::Plans => {
            for plan in portal.billing.list_plans().await? {
                println!("{}\t{}\t{}", plan.id, plan.name, plan.price);
            }
        }
        Command::ChoosePlan { plan } => {
            portal.billing.refresh().await;
            let plans = portal.billing.list_plans().await?;
            let plan_id = find_plan(&plans, &plan)
                .map(|p| p.id.clone())
                .unwrap_or(plan);
            let change = portal.billing.choose_plan(&plan_id).await?;
            println!("{change:?}");
        }
        Command::Cancel => {
            portal.billing.refresh().await;
            portal.billing.cancel_subscription().await?;
            println!("Subscription canceled");
        }
        Command::BillingPortal => {
            println!("{}", portal.billing.open_customer_portal().await?);
        }
        Command::Logout => {
            portal.gate.handle_logout().await?;
            println!("Logged out");
        }
    }

    Ok(())
}

async fn print_status(portal: &Portal) {
    let now = Utc::now();
    let gate = &portal.gate;

    println!("authorized: {}", gate.is_authorized());
    println!("route:      {}", portal.config.page_url(&gate.current_route()));

    let Some(account) = gate.account() else {
        println!("account:    (signed out)");
        return;
    };

    println!("account:    {} <{}>", account.display_name(), account.email);
    if let Some(key) = account.license_key() {
        println!("license:    {key}");
    }

    let subscription = portal.billing.refresh().await;
    match &subscription {
        Some(sub) => println!("plan:       {} ({})", sub.plan_id, sub.status.as_str()),
        None => println!("plan:       (none)"),
    }

    match countdown_banner(&account, subscription.as_ref(), now) {
        Some(CountdownBanner::DeletionScheduled { days_remaining }) => {
            println!("notice:     account deletion in {days_remaining} day(s)");
            if let Some(at) = account.scheduled_deletion_at {
                println!("deletes at: {}", format_utc_rfc3339(at));
            }
        }
        Some(CountdownBanner::TrialEnding { days_remaining }) => {
            println!("notice:     trial ends in {days_remaining} day(s)");
            if let Some(at) = subscription.as_ref().and_then(|s| s.trial_end) {
                println!("trial end:  {}", format_utc_rfc3339(at));
            }
        }
        Some(CountdownBanner::TrialExpired) => println!("notice:     trial expired"),
        None => {}
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("account_portal=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
