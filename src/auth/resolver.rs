//! Tier resolution for freshly authenticated users.

use super::{tier::Tier, types::UserIdentity};

/// Maps a user identity to the tier its new session will carry.
///
/// The administrator list is a plain input; rebuilding the resolver is the
/// only way to change it.
#[derive(Clone, Debug, Default)]
pub struct TierResolver {
    admins: Vec<UserIdentity>,
}

impl TierResolver {
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let admins = admins
            .into_iter()
            .map(|admin| UserIdentity::new(admin.as_ref()))
            .filter(|admin| !admin.is_empty())
            .collect();
        Self { admins }
    }

    #[must_use]
    pub fn admins(&self) -> &[UserIdentity] {
        &self.admins
    }

    /// Never returns `Tier::Server` or `Tier::NotAuthorized`.
    #[must_use]
    pub fn resolve(&self, user: &UserIdentity) -> Tier {
        if self.is_admin(user) {
            Tier::Admin
        } else if self.is_faction_leader(user) {
            Tier::FactionLeader
        } else {
            Tier::Player
        }
    }

    fn is_admin(&self, user: &UserIdentity) -> bool {
        self.admins.iter().any(|admin| admin == user)
    }

    fn is_faction_leader(&self, _user: &UserIdentity) -> bool {
        // TODO: faction leadership needs a membership source (which table, which rule)
        // before any session can be granted FactionLeader.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_match_is_case_insensitive() {
        let resolver = TierResolver::new(["Root", " Operator "]);
        assert_eq!(resolver.resolve(&UserIdentity::new("root")), Tier::Admin);
        assert_eq!(resolver.resolve(&UserIdentity::new("ROOT")), Tier::Admin);
        assert_eq!(resolver.resolve(&UserIdentity::new("operator")), Tier::Admin);
    }

    #[test]
    fn everyone_else_is_a_player() {
        let resolver = TierResolver::new(["root"]);
        assert_eq!(resolver.resolve(&UserIdentity::new("alice")), Tier::Player);
        assert_eq!(resolver.resolve(&UserIdentity::new("rootx")), Tier::Player);
    }

    #[test]
    fn empty_admin_entries_are_ignored() {
        let resolver = TierResolver::new(["", "  "]);
        assert!(resolver.admins().is_empty());
        assert_eq!(resolver.resolve(&UserIdentity::new("")), Tier::Player);
    }

    #[test]
    fn resolver_never_yields_server_or_faction_leader() {
        let resolver = TierResolver::new(["root"]);
        for user in ["root", "alice", "server", "leader"] {
            let tier = resolver.resolve(&UserIdentity::new(user));
            assert_ne!(tier, Tier::Server);
            assert_ne!(tier, Tier::FactionLeader);
        }
    }
}
