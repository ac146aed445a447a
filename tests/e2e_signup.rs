//! E2E tests for the sign-up flow

mod common;

use common::{TestServer, no_redirect_client};

#[tokio::test]
async fn test_signup_page_renders() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/auth/signup"))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("response body");
    assert!(body.contains("Sign Up"));
    assert!(body.contains("Create your account to get started"));
}

#[tokio::test]
async fn test_signup_rejects_invalid_email_without_calling_provider() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/auth/signup"))
        .form(&[("email", "invalid-email"), ("password", "password123")])
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("response body");
    assert!(body.contains("Please enter a valid email address"));
    assert_eq!(server.provider.state.lock().unwrap().signup_calls, 0);
}

#[tokio::test]
async fn test_signup_rejects_short_password_without_calling_provider() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/auth/signup"))
        .form(&[("email", "user@example.com"), ("password", "12345")])
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("response body");
    assert!(body.contains("Password must be at least 6 characters"));
    assert_eq!(server.provider.state.lock().unwrap().signup_calls, 0);
}

#[tokio::test]
async fn test_signup_success_sets_session_and_redirects_to_dashboard() {
    let server = TestServer::new().await;
    let client = no_redirect_client();

    let response = client
        .post(server.url("/auth/signup"))
        .form(&[("email", "new@example.com"), ("password", "password123")])
        .send()
        .await
        .expect("request succeeds");

    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header");
    assert_eq!(location, "/dashboard");

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie header");
    assert!(set_cookie.contains("session="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_signup_with_registered_email_shows_mapped_error() {
    let server = TestServer::new().await;
    server.seed_user("taken@example.com", "password123");

    let response = server
        .client
        .post(server.url("/auth/signup"))
        .form(&[("email", "taken@example.com"), ("password", "password123")])
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("response body");
    assert!(body.contains("An account with this email already exists"));
}
