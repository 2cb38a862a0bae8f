use std::fmt;

/// Authenticated identity on the code host, passed explicitly to every
/// remote operation.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
}

impl Session {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}
