//! Sign-up page and form handler

use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::session::{Session, create_session_token, session_cookie};
use crate::AppState;
use crate::error::AppError;
use crate::pages::layout;
use crate::validate;

pub const GENERIC_SIGNUP_ERROR: &str = "An error occurred during sign up. Please try again.";

/// Credentials submitted by the sign-up and sign-in forms.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

/// GET /auth/signup
pub async fn signup_page() -> Html<String> {
    render(None, "")
}

fn render(error: Option<&str>, email: &str) -> Html<String> {
    let banner = error
        .map(|message| format!(r#"<p class="error">{message}</p>"#))
        .unwrap_or_default();
    let email_value = html_escape::encode_double_quoted_attribute(email);

    layout(
        "Sign Up",
        &format!(
            r#"<h1>Sign Up</h1>
            <p>Create your account to get started</p>
            {banner}
            <form method="post" action="/auth/signup">
                <label>Email
                    <input type="email" name="email" value="{email_value}" placeholder="Enter your email" required>
                </label>
                <label>Password
                    <input type="password" name="password" placeholder="Enter your password" required>
                </label>
                <button type="submit">Sign Up</button>
            </form>
            <p>Already have an account? <a href="/auth/signin">Sign In</a></p>"#
        ),
    )
}

/// POST /auth/signup
///
/// # Steps
/// 1. Validate email and password server-side
/// 2. Register with the auth provider
/// 3. Map provider errors to user-facing messages
/// 4. Set the session cookie (when a session was issued) and redirect
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    // Server-side validation; the provider is not called on failure.
    if !validate::is_valid_email(&form.email) {
        return Ok(render(Some(validate::INVALID_EMAIL_MESSAGE), &form.email).into_response());
    }
    if !validate::is_valid_signup_password(&form.password) {
        return Ok(render(Some(validate::SHORT_PASSWORD_MESSAGE), &form.email).into_response());
    }

    let email_redirect_to = state.config.server.callback_url();
    let outcome = match state
        .provider
        .sign_up(&form.email, &form.password, &email_redirect_to)
        .await
    {
        Ok(outcome) => outcome,
        Err(AppError::Provider(error)) => {
            return Ok(render(Some(map_signup_error(&error.message)), &form.email).into_response());
        }
        Err(AppError::HttpClient(error)) => {
            tracing::error!(%error, "sign-up request to auth provider failed");
            return Ok(render(Some(GENERIC_SIGNUP_ERROR), &form.email).into_response());
        }
        Err(other) => return Err(other),
    };

    if outcome.user().confirmed_at.is_none() {
        // Email confirmation may still be pending; the user lands on the
        // dashboard either way and only gets a session once confirmed.
        tracing::debug!(
            user_id = %outcome.user().id,
            "sign-up completed with unconfirmed email"
        );
    }

    let jar = match outcome.session() {
        Some(provider_session) => {
            let session =
                Session::from_provider(provider_session, state.config.auth.session_max_age);
            let token = create_session_token(&session, &state.config.auth.session_secret)?;
            jar.add(session_cookie(token, &state.config))
        }
        None => jar,
    };

    Ok((jar, Redirect::to("/dashboard")).into_response())
}

/// Map provider sign-up error messages to user-friendly ones.
pub(crate) fn map_signup_error(message: &str) -> &'static str {
    if message.contains("User already registered") {
        "An account with this email already exists"
    } else if message.contains("Invalid email") {
        validate::INVALID_EMAIL_MESSAGE
    } else if message.contains("Password") {
        "Password does not meet requirements"
    } else {
        GENERIC_SIGNUP_ERROR
    }
}
