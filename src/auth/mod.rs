//! The `auth` module holds the stateless access controllers a broker can be
//! wired with.
//!
//! Controllers are consulted by the broker runtime only; nothing here is
//! persisted and the store never calls into them.

/// Decides whether a connection may log in and which topics it may use.
pub trait AuthController: Send + Sync {
    /// Whether the username/password pair is accepted.
    fn authenticate(&self, user: &[u8], password: &[u8]) -> bool;

    /// Whether `user` may publish (`write`) or subscribe to `topic`.
    fn acl(&self, user: &[u8], topic: &str, write: bool) -> bool;
}

/// Grants every connection and every topic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Allow;

impl AuthController for Allow {
    fn authenticate(&self, _user: &[u8], _password: &[u8]) -> bool {
        true
    }

    fn acl(&self, _user: &[u8], _topic: &str, _write: bool) -> bool {
        true
    }
}

/// Refuses every connection and every topic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disallow;

impl AuthController for Disallow {
    fn authenticate(&self, _user: &[u8], _password: &[u8]) -> bool {
        false
    }

    fn acl(&self, _user: &[u8], _topic: &str, _write: bool) -> bool {
        false
    }
}

#[cfg(test)]
mod tests;
