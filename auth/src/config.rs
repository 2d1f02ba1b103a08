use crate::login_mode::LoginMode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Module name under which every setting of this crate is stored
pub const MODULE_NAME: &str = "combodo-hybridauth";

/// Path appended to the modules root URL to build the OAuth callback
pub const LANDING_PAGE: &str = "combodo-hybridauth/landing.php";

/// Profile given to synchronized users when nothing else is configured
pub const DEFAULT_PROFILE: &str = "Portal User";

/// Provider name -> provider settings, as stored under the `providers` key
pub type ProviderMap = BTreeMap<String, ProviderSettings>;

/// Settings of a single identity provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Whether the provider may be used to log in
    #[serde(default)]
    pub enabled: bool,

    /// Verbose logging for this provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    /// Create a user account on first login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synchronize_user: Option<bool>,

    /// Update existing user accounts on each login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_existing_users: Option<bool>,

    /// Create a contact on first login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synchronize_contact: Option<bool>,

    /// Profile given to users created through this provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    /// Organization given to contacts created through this provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_organization: Option<String>,

    /// Extra query parameters added to the provider's authorize URL.
    /// `Some(None)` is a key explicitly set to null.
    #[serde(
        default,
        deserialize_with = "present_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub authorize_url_parameters: Option<Option<BTreeMap<String, String>>>,

    /// Adapter handling the protocol for this provider, e.g. `Hybridauth\Provider\Google`.
    /// `Some(None)` is a key explicitly set to null.
    #[serde(
        default,
        deserialize_with = "present_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub adapter: Option<Option<String>>,

    /// Everything else (keys, scopes, endpoints) is passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderSettings {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }
}

/// Deserialize a key that is present, even when its value is null
fn present_key<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Module-wide settings. Boolean flags set here apply to every provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleSettings {
    #[serde(default)]
    pub providers: ProviderMap,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub synchronize_user: bool,

    #[serde(default)]
    pub refresh_existing_users: bool,

    #[serde(default)]
    pub synchronize_contact: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_organization: Option<String>,

    /// OAuth landing URL, only set on the effective configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
}

impl ModuleSettings {
    /// Settings of the provider behind `login_mode`, `None` when not configured
    pub fn provider_for(&self, login_mode: &str) -> Option<&ProviderSettings> {
        let login_mode = LoginMode::parse(login_mode)?;
        self.providers.get(login_mode.provider())
    }

    // module-wide flag first, then the provider's own value
    fn flag_for<F>(&self, global: bool, login_mode: &str, field: F) -> bool
    where
        F: FnOnce(&ProviderSettings) -> Option<bool>,
    {
        global || self.provider_for(login_mode).and_then(field).unwrap_or(false)
    }

    pub fn debug_for(&self, login_mode: &str) -> bool {
        self.flag_for(self.debug, login_mode, |p| p.debug)
    }

    pub fn user_synchro_for(&self, login_mode: &str) -> bool {
        self.flag_for(self.synchronize_user, login_mode, |p| p.synchronize_user)
    }

    pub fn user_refresh_for(&self, login_mode: &str) -> bool {
        self.flag_for(self.refresh_existing_users, login_mode, |p| {
            p.refresh_existing_users
        })
    }

    pub fn contact_synchro_for(&self, login_mode: &str) -> bool {
        self.flag_for(self.synchronize_contact, login_mode, |p| p.synchronize_contact)
    }

    /// Provider profile, else module profile, else [`DEFAULT_PROFILE`]
    pub fn synchro_profile_for(&self, login_mode: &str) -> String {
        self.provider_for(login_mode)
            .and_then(|p| non_empty(p.default_profile.as_deref()))
            .or_else(|| non_empty(self.default_profile.as_deref()))
            .unwrap_or(DEFAULT_PROFILE)
            .to_string()
    }

    /// Provider organization, else module organization
    pub fn default_org_for(&self, login_mode: &str) -> Option<String> {
        self.provider_for(login_mode)
            .and_then(|p| non_empty(p.default_organization.as_deref()))
            .or_else(|| non_empty(self.default_organization.as_deref()))
            .map(str::to_string)
    }

    pub fn summary_for(&self, login_mode: &str) -> EffectiveProviderSettings {
        let provider = self.provider_for(login_mode);

        EffectiveProviderSettings {
            login_mode: login_mode.to_string(),
            configured: provider.is_some(),
            enabled: provider.map(|p| p.enabled).unwrap_or(false),
            debug: self.debug_for(login_mode),
            synchronize_user: self.user_synchro_for(login_mode),
            refresh_existing_users: self.user_refresh_for(login_mode),
            synchronize_contact: self.contact_synchro_for(login_mode),
            default_profile: self.synchro_profile_for(login_mode),
            default_organization: self.default_org_for(login_mode),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Effective settings for one login mode, after falling back to module defaults
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveProviderSettings {
    pub login_mode: String,
    pub configured: bool,
    pub enabled: bool,
    pub debug: bool,
    pub synchronize_user: bool,
    pub refresh_existing_users: bool,
    pub synchronize_contact: bool,
    pub default_profile: String,
    pub default_organization: Option<String>,
}
