//! Authorization core: one-time access codes, sessions and tier checks.
//!
//! Flow Overview:
//! 1) A trusted service asks for an OTAC for a user (`issue_otac`).
//! 2) The user posts `{ user, code }`; a valid code is consumed and a session
//!    cookie is set with the tier resolved for that user.
//! 3) Protected routes ask `authenticated(required)`; a service bearer token
//!    bypasses sessions entirely.
//!
//! All state lives behind [`store::KeyValueStore`] so several instances can
//! share it.

pub mod code;
pub mod config;
pub mod error;
pub mod manager;
pub mod redis_store;
pub mod resolver;
pub mod session;
pub mod store;
pub mod tier;
pub mod types;
pub(crate) mod utils;

pub use config::AuthConfig;
pub use error::{Error, Result};
pub use manager::{Access, AuthorizationManager};
pub use redis_store::RedisStore;
pub use store::{KeyValueStore, MemoryStore};
pub use tier::Tier;
pub use types::{AuthorizationStatus, Credentials, OtacRequest, OtacResponse, UserIdentity};
