//! Hybridauth login mode bridge
//!
//! Maps the host application's `combodo-hybridauth` module settings onto the
//! provider configuration expected by the OAuth/OpenID client library, and
//! decides which `hybridauth-<provider>` login modes may be used.
//!
//! The protocol work itself (redirects, token exchange, user info) is done by
//! the client library. This crate only reads and writes configuration.
//!
//! # Example
//!
//! ```
//! use hybridauth_bridge::{LoginModeConfigResolver, MemoryStore, StaticUrlBuilder};
//!
//! let resolver = LoginModeConfigResolver::new(
//!     MemoryStore::new(),
//!     StaticUrlBuilder::new("https://itop.example.com/env-production/"),
//! );
//! let support = resolver.is_login_mode_supported(Some("form")).unwrap();
//! assert!(!support.is_supported());
//! ```

pub mod config;
pub mod consent;
pub mod error;
pub mod login_mode;
pub mod resolver;
pub mod store;

/// Log target of every audit record emitted by this crate
pub const LOG_CHANNEL: &str = "hybridauth";

// Re-export commonly used types
pub use config::{EffectiveProviderSettings, ModuleSettings, ProviderMap, ProviderSettings};
pub use consent::{apply_consent_fix, AdapterKind};
pub use error::HybridAuthError;
pub use login_mode::{LoginMode, LoginModeSupport};
pub use resolver::LoginModeConfigResolver;
pub use store::{HostConfig, JsonFileStore, MemoryStore, SettingsStore, StaticUrlBuilder, UrlBuilder};
