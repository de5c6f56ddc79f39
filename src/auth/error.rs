//! Failures of the auth core.
//!
//! Only infrastructure problems are errors. A missing or wrong code, an absent
//! session or an insufficient tier are ordinary answers (`false` / `None`).

use axum::http::header::InvalidHeaderValue;
use std::time::Duration;

use super::tier::Tier;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("key-value backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("key-value backend did not answer within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("failed to encode session record: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("failed to generate random token: {0}")]
    Random(#[from] rand::Error),

    #[error("invalid session cookie: {0}")]
    Cookie(#[from] InvalidHeaderValue),

    #[error("tier {0:?} cannot be bound to a session")]
    SessionTier(Tier),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
