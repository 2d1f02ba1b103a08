//! Consent screen fix for adapters whose identity provider remembers consent.
//!
//! Google and Microsoft Graph skip the consent screen while the user still
//! has a session on their side. Sending an empty `prompt` parameter makes
//! them show it again.

use crate::config::ProviderMap;
use std::collections::BTreeMap;

const ADAPTER_NAMESPACE: &str = "Hybridauth\\Provider\\";

/// Adapters that need the consent fix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdapterKind {
    Google,
    MicrosoftGraph,
}

impl AdapterKind {
    pub const ALL: [AdapterKind; 2] = [AdapterKind::Google, AdapterKind::MicrosoftGraph];

    pub fn name(self) -> &'static str {
        match self {
            AdapterKind::Google => "Google",
            AdapterKind::MicrosoftGraph => "MicrosoftGraph",
        }
    }

    /// Resolve an adapter class name such as `Hybridauth\Provider\Google`.
    /// Anything else is an unknown adapter.
    pub fn from_adapter(adapter: &str) -> Option<Self> {
        adapter
            .strip_prefix(ADAPTER_NAMESPACE)
            .and_then(Self::from_provider_name)
    }

    pub fn from_provider_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

fn needs_consent_fix(provider: &str, adapter: Option<Option<&str>>) -> bool {
    match adapter {
        // an adapter key, even null, wins over the provider name
        Some(adapter) => adapter.and_then(AdapterKind::from_adapter).is_some(),
        None => AdapterKind::from_provider_name(provider).is_some(),
    }
}

/// Add `prompt=""` to the authorize URL of every provider that needs it.
/// Providers that already have an `authorize_url_parameters` key, null
/// included, are left alone.
pub fn apply_consent_fix(providers: &mut ProviderMap) {
    for (name, settings) in providers.iter_mut() {
        if settings.authorize_url_parameters.is_some() {
            continue;
        }

        let adapter = settings.adapter.as_ref().map(|adapter| adapter.as_deref());
        if !needs_consent_fix(name, adapter) {
            continue;
        }

        let mut parameters = BTreeMap::new();
        parameters.insert("prompt".to_string(), String::new());
        settings.authorize_url_parameters = Some(Some(parameters));
    }
}
