//! Authorization policy for lifecycle operations.
//!
//! The access-control decision is an injected predicate so policy changes
//! never touch the engine. The shipped policy compares one configured email
//! address against the caller's identity.

use super::Identity;

/// Decides whether an identity may run lifecycle operations.
pub trait AdminPolicy: Send + Sync {
    /// True if `identity` is the administrator.
    fn is_administrator(&self, identity: &Identity) -> bool;
}

/// Single fixed administrator email. Not a role system.
pub struct FixedEmailAdmin {
    email: String,
}

impl FixedEmailAdmin {
    /// Create a policy that admits exactly `email`.
    pub fn new(email: impl Into<String>) -> Self {
        Self { email: email.into() }
    }
}

impl AdminPolicy for FixedEmailAdmin {
    fn is_administrator(&self, identity: &Identity) -> bool {
        identity.email == self.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_email_admin() {
        let policy = FixedEmailAdmin::new("commissioner@example.com");

        let admin = Identity::new("u1", "The Commissioner", "commissioner@example.com");
        let player = Identity::new("u2", "Some Player", "player@example.com");

        assert!(policy.is_administrator(&admin));
        assert!(!policy.is_administrator(&player));
    }
}
