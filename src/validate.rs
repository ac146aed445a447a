//! Credential validation
//!
//! The same rules run before every provider call; the provider performs its
//! own stricter checks, and those failures are mapped separately by the
//! sign-in/sign-up handlers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles");
}

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const SHORT_PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";
pub const MISSING_PASSWORD_MESSAGE: &str = "Password is required";

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_CHARS: usize = 6;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Sign-up password rule: at least [`MIN_PASSWORD_CHARS`] characters.
pub fn is_valid_signup_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}

/// Sign-in only requires that a password was submitted at all.
pub fn is_present_password(password: &str) -> bool {
    !password.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_email_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("test.user@example.co.uk"));
        assert!(is_valid_email("user+tag@example.org"));
        assert!(is_valid_email("user_name@example-domain.com"));
    }

    #[test]
    fn rejects_invalid_email_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user @example.com"));
        assert!(!is_valid_email("user@example .com"));
    }

    #[test]
    fn accepts_passwords_with_six_or_more_characters() {
        assert!(is_valid_signup_password("123456"));
        assert!(is_valid_signup_password("password"));
        assert!(is_valid_signup_password("verylongpassword123"));
        assert!(is_valid_signup_password("P@ssw0rd!"));
    }

    #[test]
    fn rejects_passwords_with_less_than_six_characters() {
        assert!(!is_valid_signup_password(""));
        assert!(!is_valid_signup_password("12345"));
        assert!(!is_valid_signup_password("pass"));
        assert!(!is_valid_signup_password("a"));
    }

    #[test]
    fn sign_in_only_requires_a_password() {
        assert!(is_present_password("x"));
        assert!(!is_present_password(""));
    }
}
