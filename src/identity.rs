use std::fmt;

/// Account credentials for the catalog service.
///
/// The secret is excluded from `Debug` output so identities can show up in
/// diagnostics without leaking it.
#[derive(Clone)]
pub struct Identity {
    username: String,
    secret: String,
}

impl Identity {
    /// Create an identity from an account name and its secret
    pub fn new(username: &str, secret: &str) -> Self {
        Self {
            username: username.to_string(),
            secret: secret.to_string(),
        }
    }

    /// The account name, as used in catalog resource paths
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The secret attached to outbound requests
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_return_the_pair() {
        let identity = Identity::new("alice", "hunter2");
        assert_eq!(identity.username(), "alice");
        assert_eq!(identity.secret(), "hunter2");
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let identity = Identity::new("alice", "hunter2");
        let rendered = format!("{:?}", identity);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
