// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the backend client and the portal flows.

use serde::Deserialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Backend error ({status}): {title}")]
    Backend {
        status: u16,
        title: String,
        detail: Option<String>,
    },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Malformed backend response: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error body rendered by the backend for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
}

impl AppError {
    /// Build an error from a non-2xx status and the raw response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        if status == 401 {
            return AppError::Unauthorized;
        }

        match serde_json::from_str::<BackendErrorBody>(body) {
            Ok(parsed) if !parsed.title.is_empty() => {
                if status == 404 {
                    return AppError::NotFound(parsed.title);
                }
                AppError::Backend {
                    status,
                    title: parsed.title,
                    detail: (!parsed.detail.is_empty()).then_some(parsed.detail),
                }
            }
            _ => AppError::Backend {
                status,
                title: format!("HTTP {}", status),
                detail: (!body.trim().is_empty()).then(|| body.trim().to_string()),
            },
        }
    }

    /// Whether the failure means the session is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            AppError::Unauthorized => true,
            AppError::Backend { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Whether the user may simply retry the same action.
    pub fn is_retriable(&self) -> bool {
        match self {
            AppError::Http(_) => true,
            AppError::Backend { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Http(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias for portal operations
pub type Result<T> = std::result::Result<T, AppError>;
