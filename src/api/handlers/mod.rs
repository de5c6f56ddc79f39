//! API handlers for the auth routes and the health check.

pub mod auth;
pub mod health;
