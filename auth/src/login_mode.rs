use std::fmt;

/// Prefix shared by every login mode handled by this module
pub const LOGIN_MODE_PREFIX: &str = "hybridauth-";

/// A login mode of the form `hybridauth-<provider>`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoginMode(String);

impl LoginMode {
    /// Parse a login mode, returning `None` for modes handled elsewhere.
    /// The provider part may be empty: `hybridauth-` is still ours.
    pub fn parse(login_mode: &str) -> Option<Self> {
        if login_mode.starts_with(LOGIN_MODE_PREFIX) {
            Some(Self(login_mode.to_string()))
        } else {
            None
        }
    }

    pub fn for_provider(provider: &str) -> Self {
        Self(format!("{}{}", LOGIN_MODE_PREFIX, provider))
    }

    pub fn provider(&self) -> &str {
        &self.0[LOGIN_MODE_PREFIX.len()..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a login mode check that did not hit a configuration error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginModeSupport {
    /// Allowed by the host and enabled in the provider settings
    Supported,
    /// Missing, or not a hybridauth login mode
    Unrecognized,
    /// A hybridauth login mode the host does not allow
    NotAllowed,
}

impl LoginModeSupport {
    pub fn is_supported(self) -> bool {
        self == LoginModeSupport::Supported
    }
}
