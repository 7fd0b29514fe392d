// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session gate and its router/notice collaborators.

pub mod gate;
pub mod navigator;
pub mod routes;

pub use gate::{AccountState, BootstrapState, SessionGate, SessionState};
pub use navigator::{Navigator, Notifier, TracingNavigator, TracingNotifier};
pub use routes::RoutePolicy;
