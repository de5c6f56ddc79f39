//! One-time access codes (OTACs).
//!
//! Flow Overview:
//! 1) A trusted service issues a code for a user; any earlier code is replaced.
//! 2) The user redeems it once. Redemption is a compare-and-delete on the
//!    backend, so the same code cannot be redeemed twice, even concurrently.
//! 3) Unredeemed codes vanish with the backend TTL.
//!
//! Security boundaries: 52^5 codes is a small space. It is only adequate
//! because a code lives for minutes and dies on first use.

use rand::{rngs::OsRng, Rng};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{error::Result, store::KeyValueStore, types::UserIdentity};

pub const OTAC_LENGTH: usize = 5;
pub const DEFAULT_OTAC_TTL: Duration = Duration::from_secs(5 * 60);
const OTAC_ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub struct OtacStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl OtacStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate and store a fresh code for `user`, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the backend write fails.
    #[instrument(skip(self))]
    pub async fn issue(&self, user: &UserIdentity) -> Result<String> {
        let code = generate_code();
        self.store.set_ex(&otac_key(user), &code, self.ttl).await?;
        debug!("issued otac, expires in {}s", self.ttl.as_secs());
        Ok(code)
    }

    /// Check `code` against the stored one without consuming it.
    ///
    /// Missing, expired and mismatched codes are all `Ok(false)`.
    ///
    /// # Errors
    /// Returns an error if the backend read fails.
    #[instrument(skip(self, code))]
    pub async fn validate(&self, user: &UserIdentity, code: &str) -> Result<bool> {
        if !is_well_formed(code) {
            return Ok(false);
        }
        let stored = self.store.get(&otac_key(user)).await?;
        Ok(stored.as_deref() == Some(code))
    }

    /// Delete the code for `user`. Revoking a missing code is a no-op.
    ///
    /// # Errors
    /// Returns an error if the backend delete fails.
    #[instrument(skip(self))]
    pub async fn revoke(&self, user: &UserIdentity) -> Result<()> {
        self.store.delete(&otac_key(user)).await
    }

    /// Validate and revoke in one atomic step. `Ok(true)` at most once per code.
    ///
    /// # Errors
    /// Returns an error if the backend operation fails.
    #[instrument(skip(self, code))]
    pub async fn redeem(&self, user: &UserIdentity, code: &str) -> Result<bool> {
        if !is_well_formed(code) {
            return Ok(false);
        }
        self.store.compare_and_delete(&otac_key(user), code).await
    }
}

fn otac_key(user: &UserIdentity) -> String {
    format!("otac:{user}")
}

pub(crate) fn generate_code() -> String {
    let mut rng = OsRng;
    (0..OTAC_LENGTH)
        .map(|_| char::from(OTAC_ALPHABET[rng.gen_range(0..OTAC_ALPHABET.len())]))
        .collect()
}

fn is_well_formed(code: &str) -> bool {
    code.len() == OTAC_LENGTH && code.bytes().all(|b| b.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryStore;
    use anyhow::Result;

    fn otac_store() -> OtacStore {
        OtacStore::new(Arc::new(MemoryStore::new()), DEFAULT_OTAC_TTL)
    }

    #[test]
    fn generated_codes_are_five_ascii_letters() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), OTAC_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn generated_codes_use_both_cases() {
        let sample: String = (0..200).map(|_| generate_code()).collect();
        assert!(sample.chars().any(|c| c.is_ascii_lowercase()));
        assert!(sample.chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn otac_key_uses_normalized_identity() {
        assert_eq!(otac_key(&UserIdentity::new("Alice")), "otac:alice");
    }

    #[tokio::test]
    async fn issue_then_validate() -> Result<()> {
        let codes = otac_store();
        let alice = UserIdentity::new("alice");
        let code = codes.issue(&alice).await?;

        assert!(codes.validate(&alice, &code).await?);
        assert!(codes.validate(&UserIdentity::new("ALICE"), &code).await?);
        assert!(!codes.validate(&UserIdentity::new("bob"), &code).await?);
        Ok(())
    }

    #[tokio::test]
    async fn validate_is_case_sensitive() -> Result<()> {
        let codes = otac_store();
        let alice = UserIdentity::new("alice");
        let code = codes.issue(&alice).await?;

        let flipped: String = code
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect();
        assert!(!codes.validate(&alice, &flipped).await?);
        Ok(())
    }

    #[tokio::test]
    async fn validate_without_code_is_false() -> Result<()> {
        let codes = otac_store();
        assert!(!codes.validate(&UserIdentity::new("nobody"), "abcde").await?);
        assert!(!codes.validate(&UserIdentity::new("nobody"), "").await?);
        Ok(())
    }

    #[tokio::test]
    async fn reissue_replaces_previous_code() -> Result<()> {
        let codes = otac_store();
        let alice = UserIdentity::new("alice");
        let mut first = codes.issue(&alice).await?;
        let mut second = codes.issue(&alice).await?;
        // Two draws can collide; draw again until they differ.
        while first == second {
            first = second;
            second = codes.issue(&alice).await?;
        }

        assert!(!codes.validate(&alice, &first).await?);
        assert!(codes.validate(&alice, &second).await?);
        Ok(())
    }

    #[tokio::test]
    async fn revoke_removes_code_and_tolerates_missing() -> Result<()> {
        let codes = otac_store();
        let alice = UserIdentity::new("alice");
        codes.revoke(&alice).await?;

        let code = codes.issue(&alice).await?;
        codes.revoke(&alice).await?;
        assert!(!codes.validate(&alice, &code).await?);
        Ok(())
    }

    #[tokio::test]
    async fn redeem_succeeds_once() -> Result<()> {
        let codes = otac_store();
        let alice = UserIdentity::new("alice");
        let code = codes.issue(&alice).await?;

        if code != "zzzzz" {
            assert!(!codes.redeem(&alice, "zzzzz").await?);
        }
        assert!(codes.redeem(&alice, &code).await?);
        assert!(!codes.redeem(&alice, &code).await?);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn expired_code_cannot_be_redeemed() -> Result<()> {
        let codes = otac_store();
        let alice = UserIdentity::new("alice");
        let code = codes.issue(&alice).await?;

        tokio::time::advance(DEFAULT_OTAC_TTL + Duration::from_secs(1)).await;

        assert!(!codes.validate(&alice, &code).await?);
        assert!(!codes.redeem(&alice, &code).await?);
        Ok(())
    }
}
