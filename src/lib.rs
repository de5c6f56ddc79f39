//! # Terra (backend service gate)
//!
//! `terra` decides, per incoming request, whether a caller may reach protected
//! operations and at what privilege tier.
//!
//! ## Login flow
//!
//! 1. A trusted service (bearer token) asks for a one-time access code (OTAC)
//!    for a user. The code is five letters and lives for five minutes.
//! 2. The user redeems the code. Redemption is an atomic compare-and-delete on
//!    the shared key-value backend, so a code is good for exactly one session.
//! 3. The session cookie (`_auth`) references a server-side record holding the
//!    user's tier. Every protected route compares that tier against its own
//!    requirement.
//!
//! All durable state lives in the key-value backend (Redis in production), so
//! any number of instances can serve the same users.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }
}
