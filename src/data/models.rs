//! Data models
//!
//! Rust structs representing database entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supplementary per-user profile row
///
/// `id` matches the auth provider's user identifier. The GitHub columns
/// cache connection state the provider also knows; readers tolerate drift
/// by OR-ing both sources.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    /// Provider user id (UUID string)
    pub id: String,
    pub updated_at: DateTime<Utc>,
    /// Where repository reports should be sent, when set
    pub report_email: Option<String>,
    /// Legacy token column; only ever read for the connection check and
    /// cleared on disconnect
    pub github_token_encrypted: Option<String>,
    /// Cached GitHub connection flag
    pub github_connected: bool,
}

impl UserProfile {
    /// Whether this row alone indicates a GitHub connection.
    pub fn indicates_github_connection(&self) -> bool {
        self.github_connected || self.github_token_encrypted.is_some()
    }
}

/// GitHub connection status as shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct GitHubConnectionStatus {
    pub is_connected: bool,
    /// Last profile write while connected; stands in for a connect time
    pub connected_at: Option<DateTime<Utc>>,
    pub last_validated: DateTime<Utc>,
}

/// Combine the provider identity list with the cached profile flags.
///
/// `has_identity` comes from the provider; the profile row may lag behind
/// it in either direction, so the two are OR-ed.
pub fn github_connection_status(
    has_identity: bool,
    profile: Option<&UserProfile>,
) -> GitHubConnectionStatus {
    let is_connected = has_identity
        || profile
            .map(UserProfile::indicates_github_connection)
            .unwrap_or(false);

    GitHubConnectionStatus {
        is_connected,
        connected_at: if is_connected {
            profile.map(|p| p.updated_at)
        } else {
            None
        },
        last_validated: Utc::now(),
    }
}
