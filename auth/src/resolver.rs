use crate::config::{
    EffectiveProviderSettings, ModuleSettings, ProviderMap, ProviderSettings, LANDING_PAGE,
    MODULE_NAME,
};
use crate::consent::apply_consent_fix;
use crate::error::HybridAuthError;
use crate::login_mode::{LoginMode, LoginModeSupport};
use crate::store::{SettingsStore, UrlBuilder};
use crate::LOG_CHANNEL;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Answers login mode and provider questions from the host configuration.
///
/// Nothing is cached: every call reads the store again, once.
pub struct LoginModeConfigResolver<S, U> {
    store: S,
    url_builder: U,
}

impl<S: SettingsStore, U: UrlBuilder> LoginModeConfigResolver<S, U> {
    pub fn new(store: S, url_builder: U) -> Self {
        Self { store, url_builder }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read a module setting, `default` when unset or null
    pub fn setting<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, HybridAuthError> {
        match self.store.module_setting(MODULE_NAME, key)? {
            Some(value) if !value.is_null() => Ok(serde_json::from_value(value)?),
            _ => Ok(default),
        }
    }

    pub fn providers(&self) -> Result<ProviderMap, HybridAuthError> {
        self.setting("providers", ProviderMap::new())
    }

    /// All module settings in a single store read. Null values count as unset.
    pub fn module_settings(&self) -> Result<ModuleSettings, HybridAuthError> {
        let mut settings = self.store.module_settings(MODULE_NAME)?;
        settings.retain(|_, value| !value.is_null());
        Ok(serde_json::from_value(Value::Object(settings))?)
    }

    /// OAuth landing URL of the module
    pub fn callback_url(&self) -> String {
        let mut root = self.url_builder.modules_root_url();
        if !root.ends_with('/') {
            root.push('/');
        }
        format!("{}{}", root, LANDING_PAGE)
    }

    /// Module settings plus the callback URL, as handed to the auth library
    pub fn effective_config(&self) -> Result<ModuleSettings, HybridAuthError> {
        let mut config = self.module_settings()?;
        config.callback = Some(self.callback_url());
        Ok(config)
    }

    /// Effective configuration with the consent screen forced where needed
    pub fn config_with_consent_fix(&self) -> Result<ModuleSettings, HybridAuthError> {
        let mut config = self.effective_config()?;
        apply_consent_fix(&mut config.providers);
        Ok(config)
    }

    /// Save the provider settings and add or remove the login mode of
    /// `selected_provider` from the host allow-list.
    ///
    /// The two writes are not atomic: the provider settings are saved first.
    pub fn set_provider_config(
        &self,
        providers: &ProviderMap,
        selected_provider: &str,
        enabled: bool,
    ) -> Result<(), HybridAuthError> {
        tracing::info!(
            target: LOG_CHANNEL,
            provider_config = ?providers,
            selected_provider,
            enabled,
            "SetHybridConfig"
        );

        self.store
            .set_module_setting(MODULE_NAME, "providers", serde_json::to_value(providers)?)?;

        let login_mode = LoginMode::for_provider(selected_provider);
        let mut allowed = self.store.allowed_login_types()?;
        let position = allowed.iter().position(|mode| mode == login_mode.as_str());

        match (position, enabled) {
            (Some(index), false) => {
                allowed.remove(index);
                self.store.set_allowed_login_types(allowed)?;
            }
            (None, true) => {
                allowed.push(login_mode.to_string());
                self.store.set_allowed_login_types(allowed)?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Enable or disable one configured provider, keeping the others as they are
    pub fn set_provider_enabled(&self, provider: &str, enabled: bool) -> Result<(), HybridAuthError> {
        let mut providers = self.providers()?;
        let settings = providers
            .get_mut(provider)
            .ok_or_else(|| HybridAuthError::ProviderNotConfigured(provider.to_string()))?;
        settings.enabled = enabled;

        self.set_provider_config(&providers, provider, enabled)
    }

    /// Provider name -> enabled flag
    pub fn list_providers(&self) -> Result<BTreeMap<String, bool>, HybridAuthError> {
        Ok(self
            .providers()?
            .into_iter()
            .map(|(name, settings)| (name, settings.enabled))
            .collect())
    }

    /// Check whether `login_mode` may be used.
    ///
    /// Missing, foreign and not-allowed modes are plain refusals. A mode the
    /// host allows but whose provider is disabled or unknown is an error:
    /// the login must stop rather than fall back to another mode.
    pub fn is_login_mode_supported(
        &self,
        login_mode: Option<&str>,
    ) -> Result<LoginModeSupport, HybridAuthError> {
        let Some(login_mode) = login_mode.and_then(LoginMode::parse) else {
            return Ok(LoginModeSupport::Unrecognized);
        };

        let allowed = self.store.allowed_login_types()?;
        if !allowed.iter().any(|mode| mode == login_mode.as_str()) {
            tracing::warn!(
                target: LOG_CHANNEL,
                login_mode = %login_mode,
                "Login mode not allowed in host configuration"
            );
            return Ok(LoginModeSupport::NotAllowed);
        }

        match self.list_providers()?.get(login_mode.provider()) {
            Some(true) => Ok(LoginModeSupport::Supported),
            Some(false) => {
                tracing::error!(
                    target: LOG_CHANNEL,
                    login_mode = %login_mode,
                    "Allowed login mode forced without being properly enabled. Please check the combodo-hybridauth configuration."
                );
                Err(HybridAuthError::LoginModeNotEnabled {
                    login_mode: login_mode.to_string(),
                })
            }
            None => {
                tracing::error!(
                    target: LOG_CHANNEL,
                    login_mode = %login_mode,
                    "Allowed login mode forced without being configured. Please check the combodo-hybridauth configuration."
                );
                Err(HybridAuthError::LoginModeNotConfigured {
                    login_mode: login_mode.to_string(),
                })
            }
        }
    }

    /// Settings of the provider behind `login_mode`, `None` when not configured
    pub fn provider_conf(&self, login_mode: &str) -> Result<Option<ProviderSettings>, HybridAuthError> {
        let Some(login_mode) = LoginMode::parse(login_mode) else {
            return Ok(None);
        };
        Ok(self.providers()?.remove(login_mode.provider()))
    }

    pub fn is_debug_enabled(&self, login_mode: &str) -> Result<bool, HybridAuthError> {
        Ok(self.module_settings()?.debug_for(login_mode))
    }

    /// Same as [`Self::is_debug_enabled`], keyed by provider name
    pub fn is_provider_debug_enabled(&self, provider: &str) -> Result<bool, HybridAuthError> {
        self.is_debug_enabled(LoginMode::for_provider(provider).as_str())
    }

    pub fn is_user_synchro_enabled(&self, login_mode: &str) -> Result<bool, HybridAuthError> {
        Ok(self.module_settings()?.user_synchro_for(login_mode))
    }

    pub fn is_user_refresh_enabled(&self, login_mode: &str) -> Result<bool, HybridAuthError> {
        Ok(self.module_settings()?.user_refresh_for(login_mode))
    }

    pub fn is_contact_synchro_enabled(&self, login_mode: &str) -> Result<bool, HybridAuthError> {
        Ok(self.module_settings()?.contact_synchro_for(login_mode))
    }

    /// Profile for users created through `login_mode`
    pub fn synchro_profile(&self, login_mode: &str) -> Result<String, HybridAuthError> {
        Ok(self.module_settings()?.synchro_profile_for(login_mode))
    }

    /// Organization for contacts created through `login_mode`
    pub fn default_org(&self, login_mode: &str) -> Result<Option<String>, HybridAuthError> {
        Ok(self.module_settings()?.default_org_for(login_mode))
    }

    /// Everything the synchronization job needs to know about one login mode
    pub fn provider_summary(&self, login_mode: &str) -> Result<EffectiveProviderSettings, HybridAuthError> {
        Ok(self.module_settings()?.summary_for(login_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PROFILE;
    use crate::store::{MemoryStore, StaticUrlBuilder};
    use serde_json::json;

    fn resolver_with(
        settings: serde_json::Value,
        allowed: &[&str],
    ) -> LoginModeConfigResolver<MemoryStore, StaticUrlBuilder> {
        let store = MemoryStore::new();
        if let serde_json::Value::Object(settings) = settings {
            for (key, value) in settings {
                store.set_module_setting(MODULE_NAME, &key, value).unwrap();
            }
        }
        store
            .set_allowed_login_types(allowed.iter().map(|mode| mode.to_string()).collect())
            .unwrap();
        LoginModeConfigResolver::new(store, StaticUrlBuilder::new("https://itop.example.com/env-production"))
    }

    #[test]
    fn test_callback_url() {
        let resolver = resolver_with(json!({}), &[]);
        assert_eq!(
            resolver.callback_url(),
            "https://itop.example.com/env-production/combodo-hybridauth/landing.php"
        );
    }

    #[test]
    fn test_callback_url_keeps_host_root_as_is() {
        let resolver = LoginModeConfigResolver::new(
            MemoryStore::new(),
            StaticUrlBuilder::new("https://itop.example.com:443/env-production/"),
        );
        assert_eq!(
            resolver.callback_url(),
            "https://itop.example.com:443/env-production/combodo-hybridauth/landing.php"
        );

        let resolver = LoginModeConfigResolver::new(
            MemoryStore::new(),
            StaticUrlBuilder::new("/itop/env-production/"),
        );
        assert_eq!(
            resolver.callback_url(),
            "/itop/env-production/combodo-hybridauth/landing.php"
        );
        assert_eq!(
            resolver.effective_config().unwrap().callback.as_deref(),
            Some("/itop/env-production/combodo-hybridauth/landing.php")
        );
    }

    #[test]
    fn test_module_settings_ignore_null_values() {
        let resolver = resolver_with(
            json!({
                "debug": null,
                "default_profile": null,
                "synchronize_user": true,
                "providers": {"Google": {"enabled": true}},
            }),
            &[],
        );

        let settings = resolver.module_settings().unwrap();
        assert!(!settings.debug);
        assert!(settings.synchronize_user);
        assert!(settings.default_profile.is_none());
        assert_eq!(settings.providers.len(), 1);
    }

    #[test]
    fn test_effective_config() {
        let resolver = resolver_with(
            json!({
                "providers": {"Google": {"enabled": true}},
                "synchronize_contact": true,
            }),
            &[],
        );

        let config = resolver.effective_config().unwrap();
        assert!(config.synchronize_contact);
        assert!(config.providers["Google"].enabled);
        assert!(config.callback.unwrap().ends_with("/combodo-hybridauth/landing.php"));
    }

    #[test]
    fn test_setting_default_when_unset() {
        let resolver = resolver_with(json!({"debug": null}), &[]);
        assert!(!resolver.setting("debug", false).unwrap());
        assert_eq!(resolver.setting("missing", 42u32).unwrap(), 42);
    }

    #[test]
    fn test_setting_type_mismatch() {
        let resolver = resolver_with(json!({"providers": "not a map"}), &[]);
        assert!(matches!(
            resolver.providers(),
            Err(HybridAuthError::JsonError(_))
        ));
    }

    #[test]
    fn test_provider_conf() {
        let resolver = resolver_with(
            json!({"providers": {"Google": {"enabled": true, "default_profile": "Agent"}}}),
            &[],
        );

        let conf = resolver.provider_conf("hybridauth-Google").unwrap().unwrap();
        assert_eq!(conf.default_profile.as_deref(), Some("Agent"));
        assert!(resolver.provider_conf("hybridauth-GitHub").unwrap().is_none());
        assert!(resolver.provider_conf("Google").unwrap().is_none());
    }

    #[test]
    fn test_flags_global_overrides_provider() {
        let resolver = resolver_with(
            json!({
                "synchronize_user": true,
                "providers": {"Google": {"enabled": true, "synchronize_user": false}},
            }),
            &[],
        );

        assert!(resolver.is_user_synchro_enabled("hybridauth-Google").unwrap());
        assert!(resolver.is_user_synchro_enabled("hybridauth-Unknown").unwrap());
    }

    #[test]
    fn test_flags_from_provider() {
        let resolver = resolver_with(
            json!({
                "providers": {
                    "Google": {
                        "enabled": true,
                        "debug": true,
                        "refresh_existing_users": true,
                        "synchronize_contact": true,
                    },
                    "GitHub": {"enabled": true},
                },
            }),
            &[],
        );

        assert!(resolver.is_debug_enabled("hybridauth-Google").unwrap());
        assert!(resolver.is_provider_debug_enabled("Google").unwrap());
        assert!(resolver.is_user_refresh_enabled("hybridauth-Google").unwrap());
        assert!(resolver.is_contact_synchro_enabled("hybridauth-Google").unwrap());
        assert!(!resolver.is_user_synchro_enabled("hybridauth-Google").unwrap());

        assert!(!resolver.is_debug_enabled("hybridauth-GitHub").unwrap());
        assert!(!resolver.is_contact_synchro_enabled("hybridauth-Missing").unwrap());
    }

    #[test]
    fn test_synchro_profile_fallbacks() {
        let resolver = resolver_with(
            json!({
                "providers": {
                    "Google": {"enabled": true, "default_profile": "Configuration Manager"},
                    "GitHub": {"enabled": true, "default_profile": ""},
                },
            }),
            &[],
        );
        assert_eq!(
            resolver.synchro_profile("hybridauth-Google").unwrap(),
            "Configuration Manager"
        );
        assert_eq!(resolver.synchro_profile("hybridauth-GitHub").unwrap(), DEFAULT_PROFILE);

        let resolver = resolver_with(
            json!({
                "default_profile": "Support Agent",
                "providers": {"GitHub": {"enabled": true}},
            }),
            &[],
        );
        assert_eq!(resolver.synchro_profile("hybridauth-GitHub").unwrap(), "Support Agent");
        assert_eq!(resolver.synchro_profile("hybridauth-Missing").unwrap(), "Support Agent");
    }

    #[test]
    fn test_default_org_fallbacks() {
        let resolver = resolver_with(
            json!({
                "default_organization": "Demo",
                "providers": {
                    "Google": {"enabled": true, "default_organization": "IT Department"},
                    "GitHub": {"enabled": true},
                },
            }),
            &[],
        );
        assert_eq!(
            resolver.default_org("hybridauth-Google").unwrap().as_deref(),
            Some("IT Department")
        );
        assert_eq!(resolver.default_org("hybridauth-GitHub").unwrap().as_deref(), Some("Demo"));

        let resolver = resolver_with(json!({}), &[]);
        assert_eq!(resolver.default_org("hybridauth-GitHub").unwrap(), None);
    }

    #[test]
    fn test_list_providers() {
        let resolver = resolver_with(json!({}), &[]);
        assert!(resolver.list_providers().unwrap().is_empty());

        let resolver = resolver_with(
            json!({"providers": {"Google": {"enabled": true}, "GitHub": {}}}),
            &[],
        );
        let providers = resolver.list_providers().unwrap();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers["Google"], true);
        assert_eq!(providers["GitHub"], false);
    }

    #[test]
    fn test_provider_summary() {
        let resolver = resolver_with(
            json!({
                "synchronize_user": true,
                "providers": {"Google": {"enabled": true, "default_organization": "Demo"}},
            }),
            &[],
        );

        let summary = resolver.provider_summary("hybridauth-Google").unwrap();
        assert!(summary.configured);
        assert!(summary.enabled);
        assert!(summary.synchronize_user);
        assert!(!summary.synchronize_contact);
        assert_eq!(summary.default_profile, DEFAULT_PROFILE);
        assert_eq!(summary.default_organization.as_deref(), Some("Demo"));

        let summary = resolver.provider_summary("hybridauth-Missing").unwrap();
        assert!(!summary.configured);
        assert!(!summary.enabled);
    }

    #[test]
    fn test_set_provider_enabled_unknown_provider() {
        let resolver = resolver_with(json!({"providers": {"Google": {"enabled": false}}}), &[]);
        assert!(matches!(
            resolver.set_provider_enabled("GitHub", true),
            Err(HybridAuthError::ProviderNotConfigured(name)) if name == "GitHub"
        ));
        assert!(resolver.store().allowed_login_types().unwrap().is_empty());
    }
}
