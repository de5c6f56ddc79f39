//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::tier::Tier;

/// Case-insensitive user identity, normalized to trimmed lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct UserIdentity(String);

impl UserIdentity {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for UserIdentity {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for UserIdentity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Credentials presented to redeem a one-time access code.
#[derive(ToSchema, Serialize, Deserialize, Clone)]
pub struct Credentials {
    #[schema(value_type = String)]
    pub user: UserIdentity,
    #[serde(alias = "otac")]
    pub code: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("code", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OtacRequest {
    #[schema(value_type = String)]
    pub user: UserIdentity,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OtacResponse {
    #[serde(rename = "otac")]
    pub code: String,
}

/// Caller-visible view of the current session.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationStatus {
    pub authorized: bool,
    #[schema(value_type = u8)]
    pub tier: Tier,
}

impl AuthorizationStatus {
    #[must_use]
    pub fn from_session(tier: Option<Tier>) -> Self {
        match tier {
            Some(tier) => Self {
                authorized: true,
                tier,
            },
            None => Self {
                authorized: false,
                tier: Tier::NotAuthorized,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn user_identity_is_trimmed_and_lowercased() {
        assert_eq!(UserIdentity::new("  Alice ").as_str(), "alice");
        assert_eq!(UserIdentity::from("ROOT"), UserIdentity::from("root"));
        assert!(UserIdentity::new("   ").is_empty());
    }

    #[test]
    fn credentials_accept_otac_alias() -> Result<()> {
        let creds: Credentials = serde_json::from_str(r#"{"user":"Bob","otac":"aBcDe"}"#)?;
        assert_eq!(creds.user.as_str(), "bob");
        assert_eq!(creds.code, "aBcDe");

        let creds: Credentials = serde_json::from_str(r#"{"user":"bob","code":"xYz"}"#)?;
        assert_eq!(creds.code, "xYz");
        Ok(())
    }

    #[test]
    fn otac_response_uses_otac_key() -> Result<()> {
        let value = serde_json::to_value(OtacResponse {
            code: "aBcDe".to_string(),
        })?;
        assert_eq!(value, serde_json::json!({ "otac": "aBcDe" }));
        Ok(())
    }

    #[test]
    fn credentials_debug_hides_code() {
        let creds = Credentials {
            user: UserIdentity::new("bob"),
            code: "secret".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("bob"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn status_without_session_is_not_authorized() -> Result<()> {
        let status = AuthorizationStatus::from_session(None);
        let value = serde_json::to_value(status)?;
        assert_eq!(
            value.get("authorized").and_then(serde_json::Value::as_bool),
            Some(false)
        );
        let tier = value
            .get("tier")
            .and_then(serde_json::Value::as_u64)
            .context("missing tier")?;
        assert_eq!(tier, 0);
        Ok(())
    }

    #[test]
    fn status_with_session_reports_tier() {
        let status = AuthorizationStatus::from_session(Some(Tier::Admin));
        assert!(status.authorized);
        assert_eq!(status.tier, Tier::Admin);
    }
}
