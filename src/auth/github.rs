//! GitHub OAuth connect redirect
//!
//! The OAuth dance itself is provider-hosted: flowdev only starts it with
//! a PKCE challenge and later receives a code on the callback route.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::middleware::MaybeUser;
use crate::AppState;

/// Cookie holding the PKCE code verifier between redirect and callback.
pub(crate) const PKCE_COOKIE: &str = "pkce_verifier";

fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 challenge for a PKCE code verifier.
pub(crate) fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// GET /auth/github
///
/// Redirects the signed-in user to the provider's GitHub authorize page.
///
/// # Steps
/// 1. Generate a PKCE code verifier and store it in a cookie
/// 2. Redirect to the provider authorize URL with the S256 challenge
pub async fn connect_github(
    State(state): State<AppState>,
    MaybeUser(session): MaybeUser,
    jar: CookieJar,
) -> Response {
    if session.is_none() {
        return Redirect::to("/auth/signin").into_response();
    }

    let verifier = generate_code_verifier();
    let challenge = code_challenge(&verifier);

    let mut cookie = Cookie::new(PKCE_COOKIE, verifier);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(state.config.should_use_secure_cookies());

    let authorize_url = state.provider.authorize_url(
        "github",
        &state.config.auth.github_scopes,
        &state.config.server.callback_url(),
        &challenge,
    );

    (jar.add(cookie), Redirect::to(&authorize_url)).into_response()
}
