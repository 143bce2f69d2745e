//! Authentication session against the Mambo cloud

use tokio::sync::RwLock;

/// Bearer token plus the credentials it was obtained with
///
/// The token is only replaced by a successful login; nothing invalidates it.
pub struct Session {
    email: String,
    password: String,
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new(email: impl Into<String>, password: impl Into<String>, token: Option<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            token: RwLock::new(token),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub(crate) async fn set_token(&self, token: String) {
        *self.token.write().await = Some(token);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
