//! Hosted auth provider client
//!
//! flowdev delegates password auth, session issuance, and OAuth identity
//! linking to an external provider exposing a GoTrue-style HTTP API.
//! This module is the only place that talks to it.

mod client;
mod types;

pub use client::AuthClient;
pub use types::{AuthSession, AuthUser, Identity, ProviderError, SignUpOutcome};
