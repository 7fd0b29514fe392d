// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account model as returned by `GET /users/me`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::backend_timestamp;

/// The signed-in user's account, as cached by the session gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// When the account was created
    #[serde(default, with = "backend_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "backend_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Set while a deletion is scheduled, cleared otherwise
    #[serde(default, with = "backend_timestamp")]
    pub scheduled_deletion_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub license: Option<License>,
}

impl Account {
    /// "First Last", or the email when no name has been registered yet.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// License key issued to the account, if any.
    pub fn license_key(&self) -> Option<&str> {
        self.license
            .as_ref()
            .map(|l| l.key.as_str())
            .filter(|k| !k.is_empty())
    }
}

/// License attached to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub key: String,
}

/// Envelope of `GET /users/me` and `PUT /users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountEnvelope {
    pub user: Account,
}
