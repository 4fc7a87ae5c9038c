use std::fmt;

/// Key the cooldown tracker is indexed by: one network address plus one
/// client-held session token.
///
/// The two parts are kept apart rather than joined into one string, so
/// `("1.2.3.4_a", "b")` and `("1.2.3.4", "a_b")` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    address: String,
    session: String,
}

impl IdentityKey {
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.address, self.session)
    }
}

/// Resolve raw request attributes into the cooldown identity.
///
/// Input is taken as-is; a malformed address or token just yields a different key.
pub fn resolve(network_address: &str, session_token: &str) -> IdentityKey {
    IdentityKey {
        address: network_address.to_string(),
        session: session_token.to_string(),
    }
}
