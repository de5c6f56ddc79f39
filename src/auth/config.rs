//! Auth configuration.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;

use super::{code::DEFAULT_OTAC_TTL, session::DEFAULT_SESSION_TTL, session::SessionConfig};

#[derive(Clone)]
pub struct AuthConfig {
    frontend_base_url: String,
    admins: Vec<String>,
    service_token: SecretString,
    otac_ttl: Duration,
    session_ttl: Duration,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            admins: Vec::new(),
            service_token: SecretString::default(),
            otac_ttl: DEFAULT_OTAC_TTL,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    #[must_use]
    pub fn with_admins(mut self, admins: Vec<String>) -> Self {
        self.admins = admins;
        self
    }

    /// An empty token disables the service bearer path.
    #[must_use]
    pub fn with_service_token(mut self, token: SecretString) -> Self {
        self.service_token = token;
        self
    }

    #[must_use]
    pub fn with_otac_ttl_seconds(mut self, seconds: u64) -> Self {
        self.otac_ttl = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn admins(&self) -> &[String] {
        &self.admins
    }

    pub(super) fn service_token(&self) -> &SecretString {
        &self.service_token
    }

    #[must_use]
    pub fn service_token_enabled(&self) -> bool {
        !self.service_token.expose_secret().is_empty()
    }

    #[must_use]
    pub fn otac_ttl(&self) -> Duration {
        self.otac_ttl
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(&self.frontend_base_url).with_ttl(self.session_ttl)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("frontend_base_url", &self.frontend_base_url)
            .field("admins", &self.admins)
            .field("service_token", &"***")
            .field("otac_ttl", &self.otac_ttl)
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}
