//! Server-side sessions referenced by the `_auth` cookie.
//!
//! Flow Overview:
//! - `create` stores `{ tier }` under `session:<sha256(token)>` and hands back a
//!   `Set-Cookie` header carrying the raw token.
//! - `read` resolves the cookie to a tier. Missing cookies, unknown tokens and
//!   records that do not decode are all "no session".
//! - `destroy` deletes the record and returns a cookie that expires at once.
//!
//! Cookie attributes are fixed by [`SessionConfig`]; `SameSite=None` requires
//! `Secure`, so both are always set.

use axum::http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{
    error::{Error, Result},
    store::KeyValueStore,
    tier::Tier,
    utils::{extract_cookie, generate_session_token, hash_session_token},
};

pub const SESSION_COOKIE_NAME: &str = "_auth";
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Clone, Debug)]
pub struct SessionConfig {
    domain: Option<String>,
    ttl: Duration,
}

impl SessionConfig {
    /// Scope the cookie to the host of the frontend that calls this service.
    #[must_use]
    pub fn new(frontend_base_url: &str) -> Self {
        let domain = Url::parse(frontend_base_url)
            .ok()
            .and_then(|url| url.host_str().map(ToString::to_string));
        Self {
            domain,
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn cookie(&self, value: &str, max_age: u64) -> Result<HeaderValue> {
        let mut cookie = format!("{SESSION_COOKIE_NAME}={value}; Path=/");
        if let Some(domain) = &self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        cookie.push_str(&format!(
            "; Max-Age={max_age}; HttpOnly; Secure; SameSite=None"
        ));
        Ok(HeaderValue::from_str(&cookie)?)
    }
}

/// Stored session attributes.
#[derive(Serialize, Deserialize, Debug)]
struct SessionRecord {
    tier: Tier,
}

pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start a session bound to `tier` and return its `Set-Cookie` value.
    ///
    /// # Errors
    /// Returns an error for tiers that may not live in a session, or if the
    /// token cannot be generated or the backend write fails.
    #[instrument(skip(self))]
    pub async fn create(&self, tier: Tier) -> Result<HeaderValue> {
        if !tier.is_session_tier() {
            return Err(Error::SessionTier(tier));
        }

        let token = generate_session_token()?;
        let record = serde_json::to_string(&SessionRecord { tier })?;
        self.store
            .set_ex(&session_key(&token), &record, self.config.ttl)
            .await?;

        debug!("session created");

        self.config.cookie(&token, self.config.ttl.as_secs())
    }

    /// Tier of the session referenced by the request, if any.
    ///
    /// # Errors
    /// Returns an error only if the backend read fails.
    #[instrument(skip_all)]
    pub async fn read(&self, headers: &HeaderMap) -> Result<Option<Tier>> {
        let Some(token) = extract_cookie(headers, SESSION_COOKIE_NAME) else {
            return Ok(None);
        };
        let Some(raw) = self.store.get(&session_key(&token)).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(SessionRecord { tier }) if tier.is_session_tier() => Ok(Some(tier)),
            Ok(SessionRecord { tier }) => {
                warn!("ignoring session record with non-session tier {tier:?}");
                Ok(None)
            }
            Err(err) => {
                warn!("ignoring malformed session record: {err}");
                Ok(None)
            }
        }
    }

    /// End the session referenced by the request and return a cookie that
    /// expires immediately. Requests without a session still get the cookie.
    ///
    /// # Errors
    /// Returns an error if the backend delete fails.
    #[instrument(skip_all)]
    pub async fn destroy(&self, headers: &HeaderMap) -> Result<HeaderValue> {
        if let Some(token) = extract_cookie(headers, SESSION_COOKIE_NAME) {
            self.store.delete(&session_key(&token)).await?;
            debug!("session destroyed");
        }
        self.expired_cookie()
    }

    /// A cookie that clears `_auth` on the client.
    ///
    /// # Errors
    /// Returns an error if the configured domain is not a valid header value.
    pub fn expired_cookie(&self) -> Result<HeaderValue> {
        self.config.cookie("", 0)
    }
}

fn session_key(token: &str) -> String {
    format!("session:{}", hash_session_token(token))
}
