//! Auth provider API types
//!
//! Wire shapes for the subset of the provider's API flowdev uses.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// A linked external login method the provider keeps per user.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    /// Identity record id, used when unlinking
    pub identity_id: String,
    /// External provider name (e.g., "github", "email")
    pub provider: String,
}

/// A user as the auth provider reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    /// Provider user id (UUID string)
    pub id: String,
    pub email: Option<String>,
    /// Set once the user confirmed their email address
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Linked login methods; absent on some provider responses
    pub identities: Option<Vec<Identity>>,
}

impl AuthUser {
    /// Whether the provider holds an identity for the named external login.
    pub fn has_identity(&self, provider: &str) -> bool {
        self.identities
            .as_ref()
            .map(|identities| identities.iter().any(|i| i.provider == provider))
            .unwrap_or(false)
    }

    /// Find an identity by external provider name.
    pub fn identity(&self, provider: &str) -> Option<&Identity> {
        self.identities
            .as_ref()
            .and_then(|identities| identities.iter().find(|i| i.provider == provider))
    }
}

/// A provider-issued session (access + refresh token pair).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

/// Result of a sign-up call.
///
/// With email auto-confirmation enabled the provider answers with a full
/// session; otherwise it answers with the bare (unconfirmed) user.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    Session(AuthSession),
    User(AuthUser),
}

impl SignUpOutcome {
    pub fn user(&self) -> &AuthUser {
        match self {
            Self::Session(session) => &session.user,
            Self::User(user) => user,
        }
    }

    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            Self::Session(session) => Some(session),
            Self::User(_) => None,
        }
    }
}

/// An error response from the provider's API.
///
/// `message` is the provider's own wording; the sign-in/sign-up handlers
/// map it to user-facing text by substring.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub status: u16,
    pub message: String,
}
