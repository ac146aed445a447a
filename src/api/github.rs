//! GitHub OAuth callback and disconnect endpoints

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use serde::Deserialize;

use crate::AppState;
use crate::auth::{CurrentUser, PKCE_COOKIE, Session, create_session_token, session_cookie};
use crate::error::AppError;

/// Query parameters from the provider callback
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code
    pub code: Option<String>,
}

fn dashboard_redirect(kind: &str, message: &str) -> Redirect {
    Redirect::to(&format!("/dashboard?{kind}={}", urlencoding::encode(message)))
}

fn remove_pkce_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(PKCE_COOKIE, "");
    cookie.set_path("/");
    cookie
}

/// GET /api/auth/callback
///
/// Handles the redirect back from the provider-hosted OAuth flow.
///
/// # Steps
/// 1. Exchange the code (plus PKCE verifier) for a provider session
/// 2. Check the user's identity list for GitHub
/// 3. Cache the connection on the profile row
/// 4. Set the session cookie and redirect with a query-string status
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    let verifier = jar.get(PKCE_COOKIE).map(|cookie| cookie.value().to_owned());
    let jar = jar.remove(remove_pkce_cookie());

    let Some(code) = query.code else {
        return (jar, dashboard_redirect("error", "Authentication failed")).into_response();
    };

    let Some(verifier) = verifier else {
        tracing::warn!("OAuth callback without a PKCE verifier cookie");
        return (
            jar,
            dashboard_redirect("error", "Failed to authenticate with GitHub"),
        )
            .into_response();
    };

    let provider_session = match state
        .provider
        .exchange_code_for_session(&code, &verifier)
        .await
    {
        Ok(session) => session,
        Err(error) => {
            tracing::error!(%error, "Error exchanging code for session");
            return (
                jar,
                dashboard_redirect("error", "Failed to authenticate with GitHub"),
            )
                .into_response();
        }
    };

    // The identity list on the freshly fetched user is authoritative.
    let user = match state.provider.get_user(&provider_session.access_token).await {
        Ok(user) => user,
        Err(error) => {
            tracing::error!(%error, "Failed to fetch user after code exchange");
            return (jar, dashboard_redirect("error", "Authentication failed")).into_response();
        }
    };

    if !user.has_identity("github") {
        return (jar, dashboard_redirect("error", "Authentication failed")).into_response();
    }

    // Cache the connection on the profile row; on failure the identity
    // list still answers the connection question.
    if let Err(error) = state.db.upsert_github_connected(&user.id).await {
        tracing::error!(%error, "Failed to update GitHub connection status");
    }

    let session = Session::from_provider(&provider_session, state.config.auth.session_max_age);
    let jar = match create_session_token(&session, &state.config.auth.session_secret) {
        Ok(token) => jar.add(session_cookie(token, &state.config)),
        Err(error) => {
            tracing::error!(%error, "Failed to issue session after OAuth callback");
            jar
        }
    };

    (
        jar,
        dashboard_redirect("success", "GitHub connected successfully"),
    )
        .into_response()
}

/// POST /api/auth/github/disconnect
///
/// # Steps
/// 1. Best-effort unlink of the GitHub identity at the provider
/// 2. Clear the connection flag and legacy token on the profile row
pub async fn disconnect(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Response, AppError> {
    match state.provider.get_user(&session.access_token).await {
        Ok(user) => {
            if let Some(identity) = user.identity("github") {
                if let Err(error) = state
                    .provider
                    .unlink_identity(&session.access_token, &identity.identity_id)
                    .await
                {
                    tracing::error!(%error, "Failed to unlink GitHub identity at provider");
                }
            }
        }
        Err(error) => {
            tracing::error!(%error, "Failed to fetch identities before disconnect");
        }
    }

    if let Err(error) = state.db.set_github_connected(&session.user_id, false).await {
        tracing::error!(%error, "Failed to disconnect GitHub");
        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Failed to disconnect GitHub account" })),
        )
            .into_response());
    }

    Ok(Json(serde_json::json!({ "success": true })).into_response())
}

/// Explicit 405 for unsupported methods on the disconnect route.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
