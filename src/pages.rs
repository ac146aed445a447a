//! Server-rendered pages
//!
//! Landing page and dashboard. Auth form pages live with their handlers
//! in the `auth` module and share the layout here.

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::MaybeUser;
use crate::data::github_connection_status;

/// Create pages router
///
/// Routes:
/// - GET / - Landing page
/// - GET /dashboard - Dashboard (requires session)
pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing_page))
        .route("/dashboard", get(dashboard_page))
}

/// Minimal shared HTML shell.
pub(crate) fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - flow.dev</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 40rem; margin: 3rem auto; padding: 0 1rem; color: #222; }}
label {{ display: block; margin: 0.75rem 0; }}
input {{ display: block; width: 100%; padding: 0.5rem; margin-top: 0.25rem; }}
button {{ padding: 0.5rem 1rem; margin-top: 0.5rem; }}
.error {{ color: #b00020; }}
.success {{ color: #1b5e20; }}
.chip {{ padding: 0.15rem 0.6rem; border-radius: 1rem; font-size: 0.85rem; }}
.chip.on {{ background: #e8f5e9; color: #1b5e20; }}
.chip.off {{ background: #eee; color: #555; }}
.muted {{ color: #777; font-size: 0.9rem; }}
</style>
</head>
<body>
{body}
</body>
</html>"#
    ))
}

// =============================================================================
// Landing Page
// =============================================================================

/// GET /
async fn landing_page() -> Html<String> {
    layout(
        "Welcome",
        r#"<h1>flow.dev</h1>
        <p>Professional engineering tools for developers</p>
        <p>
            <a href="/auth/signup"><button type="button">Get Started</button></a>
            <a href="/auth/signin"><button type="button">Learn More</button></a>
        </p>
        <p class="muted">Coming Soon - Building the future of development workflows</p>"#,
    )
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    success: Option<String>,
    error: Option<String>,
}

/// GET /dashboard
///
/// # Steps
/// 1. Require a session; bounce to sign-up without one
/// 2. Fetch the provider identity list with the session's access token
/// 3. Read the profile row and combine both into the connection flag
/// 4. Render the page with a one-shot notification from the query string
async fn dashboard_page(
    State(state): State<AppState>,
    MaybeUser(session): MaybeUser,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let Some(session) = session else {
        return Redirect::to("/auth/signup").into_response();
    };

    // A stale provider token only loses the identity source; the profile
    // row flags still answer the connection question.
    let has_identity = match state.provider.get_user(&session.access_token).await {
        Ok(user) => user.has_identity("github"),
        Err(error) => {
            tracing::debug!(%error, "Could not fetch identities; using profile flags only");
            false
        }
    };

    let profile = match state.db.get_profile(&session.user_id).await {
        Ok(profile) => profile,
        Err(error) => {
            tracing::error!(%error, "Error fetching user profile");
            None
        }
    };

    let status = github_connection_status(has_identity, profile.as_ref());

    render_dashboard(&session.email, status.is_connected, &query).into_response()
}

fn render_dashboard(email: &str, github_connected: bool, query: &DashboardQuery) -> Html<String> {
    let notification = match (&query.success, &query.error) {
        (Some(message), _) => format!(
            r#"<p class="success" id="notification">{}</p>"#,
            html_escape::encode_text(message)
        ),
        (None, Some(message)) => format!(
            r#"<p class="error" id="notification">{}</p>"#,
            html_escape::encode_text(message)
        ),
        (None, None) => String::new(),
    };

    let connector = if github_connected {
        r#"<p>GitHub <span class="chip on">Connected</span></p>
        <button type="button" id="github-disconnect">Disconnect GitHub</button>
        <script>
        document.getElementById('github-disconnect').addEventListener('click', async () => {
            const response = await fetch('/api/auth/github/disconnect', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
            });
            if (response.ok) { window.location.reload(); }
        });
        </script>"#
            .to_string()
    } else {
        r#"<p>GitHub <span class="chip off">Not connected</span></p>
        <a href="/auth/github"><button type="button">Connect GitHub</button></a>
        <p class="muted">We'll request read-only access to your repositories</p>"#
            .to_string()
    };

    let email = html_escape::encode_text(email);

    layout(
        "Dashboard",
        &format!(
            r#"{notification}
        <h1>Welcome to Dashboard</h1>
        <p>You have successfully signed up!</p>
        <p class="muted">Logged in as:</p>
        <p><strong>{email}</strong></p>
        <h2>Integrations</h2>
        {connector}
        <p class="muted">Connect your GitHub account to analyze your repositories.<br>
        More features will be added in upcoming stories.</p>
        <form method="post" action="/auth/signout">
            <button type="submit">Sign Out</button>
        </form>
        <script>
        // One-shot notification: drop the query string after rendering it
        if (window.location.search) {{
            window.history.replaceState(null, '', window.location.pathname);
        }}
        </script>"#
        ),
    )
}
