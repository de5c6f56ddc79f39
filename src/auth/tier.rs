//! Privilege tiers.

use serde::{Deserialize, Serialize};

/// Ordered privilege levels. A caller passes a check when its tier is
/// greater than or equal to the required one.
///
/// On the wire a tier is its integer value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Tier {
    NotAuthorized = 0,
    Player = 1,
    FactionLeader = 2,
    Admin = 3,
    /// Only reachable through the static service bearer token.
    Server = 4,
}

impl Tier {
    /// Whether `self` is high enough for an operation requiring `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }

    /// Tiers that may be stored in a session. `NotAuthorized` is only ever a
    /// status answer and `Server` is reserved for the bearer path.
    #[must_use]
    pub const fn is_session_tier(self) -> bool {
        matches!(self, Self::Player | Self::FactionLeader | Self::Admin)
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier as Self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid tier value: {0}")]
pub struct InvalidTier(pub u8);

impl TryFrom<u8> for Tier {
    type Error = InvalidTier;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NotAuthorized),
            1 => Ok(Self::Player),
            2 => Ok(Self::FactionLeader),
            3 => Ok(Self::Admin),
            4 => Ok(Self::Server),
            other => Err(InvalidTier(other)),
        }
    }
}
