use crate::app_config::AppConfig;

/// Caller identity handed to the backend clients at construction time.
///
/// Components never read credentials from ambient storage; whoever builds a
/// client decides which session it speaks for.
#[derive(Clone, Default)]
pub struct Session {
    pub auth_token: Option<String>,
    pub app_version: String,
}

impl Session {
    #[must_use]
    pub fn new(auth_token: Option<String>, app_version: impl Into<String>) -> Self {
        Self {
            auth_token,
            app_version: app_version.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.auth_token.clone(), config.app_version.clone())
    }

    /// Value for the `Authorization` header, if a token is present.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.auth_token.as_ref().map(|t| format!("Bearer {t}"))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[redacted]"))
            .field("app_version", &self.app_version)
            .finish()
    }
}
