//! Authentication
//!
//! Handles:
//! - Sign-up and sign-in pages backed by the hosted auth provider
//! - GitHub OAuth connect redirect (provider-hosted flow)
//! - Session cookies and authentication extractors

mod github;
mod middleware;
pub mod session;
mod signin;
mod signup;

use axum::{
    Router,
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;

use crate::AppState;

pub use middleware::{CurrentUser, MaybeUser};
pub use session::{Session, create_session_token, verify_session_token};

pub(crate) use github::PKCE_COOKIE;
pub(crate) use session::{remove_session_cookie, session_cookie};

/// Create authentication router
///
/// Routes:
/// - GET/POST /auth/signup - Sign-up page and form submission
/// - GET/POST /auth/signin - Sign-in page and form submission
/// - POST /auth/signout - Clear session
/// - GET /auth/github - Start the provider-hosted GitHub OAuth flow
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", get(signup::signup_page).post(signup::signup))
        .route("/auth/signin", get(signin::signin_page).post(signin::signin))
        .route("/auth/signout", post(signout))
        .route("/auth/github", get(github::connect_github))
}

/// POST /auth/signout
///
/// Clears the session cookie and redirects to sign-in.
async fn signout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(remove_session_cookie()),
        Redirect::to("/auth/signin"),
    )
}
