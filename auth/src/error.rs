use thiserror::Error;

#[derive(Error, Debug)]
pub enum HybridAuthError {
    /// Login mode is allowed by the host but its provider is disabled
    #[error("Login modes configuration needs to be fixed: {login_mode} is allowed but not enabled")]
    LoginModeNotEnabled { login_mode: String },

    /// Login mode is allowed by the host but no provider is configured for it
    #[error("Login modes configuration needs to be fixed: {login_mode} is allowed but not configured")]
    LoginModeNotConfigured { login_mode: String },

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Configuration store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl HybridAuthError {
    /// True when the host allow-list and the provider settings disagree.
    /// Such errors must stop the login attempt.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            HybridAuthError::LoginModeNotEnabled { .. }
                | HybridAuthError::LoginModeNotConfigured { .. }
        )
    }

    /// Login mode the error is about, if any
    pub fn login_mode(&self) -> Option<&str> {
        match self {
            HybridAuthError::LoginModeNotEnabled { login_mode }
            | HybridAuthError::LoginModeNotConfigured { login_mode } => Some(login_mode),
            _ => None,
        }
    }
}
