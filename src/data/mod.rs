//! Data layer module
//!
//! Handles the application-owned persistence: one SQLite table of
//! supplementary per-user profile fields. Users, passwords, sessions, and
//! identities all live at the auth provider and are never stored here.

mod database;
mod models;

pub use database::Database;
pub use models::*;
