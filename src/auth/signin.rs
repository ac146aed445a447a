//! Sign-in page and form handler

use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::session::{Session, create_session_token, session_cookie};
use super::signup::CredentialsForm;
use crate::AppState;
use crate::error::AppError;
use crate::pages::layout;
use crate::validate;

pub const GENERIC_SIGNIN_ERROR: &str = "An error occurred during sign in. Please try again.";

/// GET /auth/signin
pub async fn signin_page() -> Html<String> {
    render(None, "")
}

fn render(error: Option<&str>, email: &str) -> Html<String> {
    let banner = error
        .map(|message| format!(r#"<p class="error">{message}</p>"#))
        .unwrap_or_default();
    let email_value = html_escape::encode_double_quoted_attribute(email);

    layout(
        "Sign In",
        &format!(
            r#"<h1>Sign In</h1>
            <p>Welcome back</p>
            {banner}
            <form method="post" action="/auth/signin">
                <label>Email
                    <input type="email" name="email" value="{email_value}" placeholder="Enter your email" required>
                </label>
                <label>Password
                    <input type="password" name="password" placeholder="Enter your password" required>
                </label>
                <button type="submit">Sign In</button>
            </form>
            <p>Don't have an account? <a href="/auth/signup">Sign Up</a></p>"#
        ),
    )
}

/// POST /auth/signin
///
/// # Steps
/// 1. Validate email and password server-side
/// 2. Exchange credentials with the auth provider
/// 3. Map provider errors to user-facing messages
/// 4. Set the session cookie and redirect to the dashboard
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    // Server-side validation; the provider is not called on failure.
    if !validate::is_valid_email(&form.email) {
        return Ok(render(Some(validate::INVALID_EMAIL_MESSAGE), &form.email).into_response());
    }
    if !validate::is_present_password(&form.password) {
        return Ok(render(Some(validate::MISSING_PASSWORD_MESSAGE), &form.email).into_response());
    }

    let provider_session = match state
        .provider
        .sign_in_with_password(&form.email, &form.password)
        .await
    {
        Ok(session) => session,
        Err(AppError::Provider(error)) => {
            return Ok(render(Some(map_signin_error(&error.message)), &form.email).into_response());
        }
        Err(AppError::HttpClient(error)) => {
            tracing::error!(%error, "sign-in request to auth provider failed");
            return Ok(render(Some(GENERIC_SIGNIN_ERROR), &form.email).into_response());
        }
        Err(other) => return Err(other),
    };

    let session = Session::from_provider(&provider_session, state.config.auth.session_max_age);
    let token = create_session_token(&session, &state.config.auth.session_secret)?;

    Ok((
        jar.add(session_cookie(token, &state.config)),
        Redirect::to("/dashboard"),
    )
        .into_response())
}

/// Map provider sign-in error messages to user-friendly ones.
///
/// Credential failures collapse to one generic message to avoid user
/// enumeration.
pub(crate) fn map_signin_error(message: &str) -> &'static str {
    if message.contains("Invalid login credentials")
        || message.contains("Email not confirmed")
        || message.contains("Invalid email")
        || message.contains("Wrong password")
    {
        "Invalid email or password"
    } else if message.contains("Too many requests") {
        "Too many sign-in attempts. Please try again later."
    } else if message.contains("Email rate limit exceeded") {
        "Too many attempts. Please try again later."
    } else {
        GENERIC_SIGNIN_ERROR
    }
}
