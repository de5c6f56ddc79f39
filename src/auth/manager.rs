//! The authorization façade used by every protected route.
//!
//! Flow Overview:
//! 1) `issue_otac` hands a trusted service a code for a user.
//! 2) `redeem_login` consumes the code, resolves the tier and starts a session.
//! 3) `authenticated` / `present` answer per-request access questions.
//!
//! The manager keeps no mutable state of its own; share it behind an `Arc`.
//! Every answer about access is a plain boolean. `Err` means the backend could
//! not be asked, and callers must not read it as "unauthorized".

use axum::http::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    code::OtacStore,
    config::AuthConfig,
    error::Result,
    resolver::TierResolver,
    session::SessionStore,
    store::KeyValueStore,
    tier::Tier,
    types::{AuthorizationStatus, Credentials, UserIdentity},
    utils::{bearer_header, secrets_match, BearerHeader},
};

/// Combined outcome of `authenticated` and `present`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// A session exists but its tier is too low.
    Forbidden,
    /// No usable credential at all.
    Unauthorized,
}

pub struct AuthorizationManager {
    store: Arc<dyn KeyValueStore>,
    codes: OtacStore,
    sessions: SessionStore,
    resolver: TierResolver,
    config: AuthConfig,
}

impl AuthorizationManager {
    pub fn new(store: Arc<dyn KeyValueStore>, config: AuthConfig) -> Self {
        Self {
            codes: OtacStore::new(store.clone(), config.otac_ttl()),
            sessions: SessionStore::new(store.clone(), config.session_config()),
            resolver: TierResolver::new(config.admins()),
            store,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Issue a one-time access code, replacing any outstanding one.
    ///
    /// # Errors
    /// Returns an error if the backend write fails.
    pub async fn issue_otac(&self, user: &UserIdentity) -> Result<String> {
        self.codes.issue(user).await
    }

    /// Exchange credentials for a session.
    ///
    /// Returns the `Set-Cookie` value on success and `None` when the code is
    /// missing, expired, wrong or already used. A failed redemption has no
    /// side effects.
    ///
    /// # Errors
    /// Returns an error if the backend fails. If that happens after the code
    /// was consumed, the code stays consumed and the user must request a new
    /// one.
    #[instrument(skip(self))]
    pub async fn redeem_login(&self, credentials: &Credentials) -> Result<Option<HeaderValue>> {
        if !self
            .codes
            .redeem(&credentials.user, &credentials.code)
            .await?
        {
            debug!("otac rejected");
            return Ok(None);
        }

        let tier = self.resolver.resolve(&credentials.user);
        let cookie = self.sessions.create(tier).await?;

        info!("login for {} with tier {tier:?}", credentials.user);

        Ok(Some(cookie))
    }

    /// End the caller's session and return the expiring cookie.
    ///
    /// # Errors
    /// Returns an error if the backend delete fails.
    pub async fn logout(&self, headers: &HeaderMap) -> Result<HeaderValue> {
        self.sessions.destroy(headers).await
    }

    /// Whether the request may perform an operation requiring `required`.
    ///
    /// Any non-empty `Authorization` header decides on its own: it must be
    /// `Bearer <service token>` and grants access whatever `required` is. It
    /// never falls back to the session cookie.
    ///
    /// # Errors
    /// Returns an error if the session lookup fails.
    #[instrument(skip_all, fields(required = ?required))]
    pub async fn authenticated(&self, headers: &HeaderMap, required: Tier) -> Result<bool> {
        match bearer_header(headers) {
            BearerHeader::Token(token) => return Ok(self.service_token_matches(token)),
            BearerHeader::Malformed => return Ok(false),
            BearerHeader::Absent => {}
        }

        Ok(self
            .sessions
            .read(headers)
            .await?
            .is_some_and(|tier| tier.satisfies(required)))
    }

    /// Whether the request carries a live session, whatever its tier.
    ///
    /// # Errors
    /// Returns an error if the session lookup fails.
    pub async fn present(&self, headers: &HeaderMap) -> Result<bool> {
        Ok(self.sessions.read(headers).await?.is_some())
    }

    /// `authenticated` and `present` folded into the three outcomes routes act on.
    ///
    /// # Errors
    /// Returns an error if the session lookup fails.
    pub async fn access(&self, headers: &HeaderMap, required: Tier) -> Result<Access> {
        if self.authenticated(headers, required).await? {
            Ok(Access::Granted)
        } else if self.present(headers).await? {
            Ok(Access::Forbidden)
        } else {
            Ok(Access::Unauthorized)
        }
    }

    /// The caller's own view of its session.
    ///
    /// # Errors
    /// Returns an error if the session lookup fails.
    pub async fn status(&self, headers: &HeaderMap) -> Result<AuthorizationStatus> {
        let tier = self.sessions.read(headers).await?;
        Ok(AuthorizationStatus::from_session(tier))
    }

    /// Reachability of the shared backend.
    ///
    /// # Errors
    /// Returns the backend error.
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }

    fn service_token_matches(&self, token: &str) -> bool {
        let expected = self.config.service_token().expose_secret();
        !expected.is_empty() && secrets_match(token, expected)
    }
}
