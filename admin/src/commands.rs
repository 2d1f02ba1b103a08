use crate::cli::Commands;
use anyhow::{Context, Result};
use hybridauth_bridge::{
    LoginModeConfigResolver, LoginModeSupport, ProviderMap, SettingsStore, UrlBuilder,
};
use std::fs;

/// Text to print and whether the command succeeded
#[derive(Debug)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self { text, success: true }
    }
}

pub fn run<S: SettingsStore, U: UrlBuilder>(
    resolver: &LoginModeConfigResolver<S, U>,
    command: &Commands,
) -> Result<CommandOutput> {
    match command {
        Commands::List => list(resolver),
        Commands::Show { consent_fix } => {
            let config = if *consent_fix {
                resolver.config_with_consent_fix()?
            } else {
                resolver.effective_config()?
            };
            Ok(CommandOutput::ok(serde_json::to_string_pretty(&config)?))
        }
        Commands::Check { login_mode } => check(resolver, login_mode),
        Commands::Provider { login_mode } => {
            let summary = resolver.provider_summary(login_mode)?;
            Ok(CommandOutput::ok(serde_json::to_string_pretty(&summary)?))
        }
        Commands::Enable { provider } => {
            resolver.set_provider_enabled(provider, true)?;
            Ok(CommandOutput::ok(format!("{}: enabled", provider)))
        }
        Commands::Disable { provider } => {
            resolver.set_provider_enabled(provider, false)?;
            Ok(CommandOutput::ok(format!("{}: disabled", provider)))
        }
        Commands::SetProviders {
            file,
            selected,
            enabled,
        } => {
            let content = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let providers: ProviderMap = serde_json::from_str(&content)
                .with_context(|| format!("Invalid provider settings in {}", file.display()))?;

            resolver.set_provider_config(&providers, selected, *enabled)?;
            Ok(CommandOutput::ok(format!(
                "Saved {} provider(s), {}: {}",
                providers.len(),
                selected,
                if *enabled { "enabled" } else { "disabled" }
            )))
        }
    }
}

fn list<S: SettingsStore, U: UrlBuilder>(
    resolver: &LoginModeConfigResolver<S, U>,
) -> Result<CommandOutput> {
    let providers = resolver.list_providers()?;
    if providers.is_empty() {
        return Ok(CommandOutput::ok("No provider configured".to_string()));
    }

    let lines: Vec<String> = providers
        .iter()
        .map(|(name, enabled)| {
            format!("{:<24} {}", name, if *enabled { "enabled" } else { "disabled" })
        })
        .collect();
    Ok(CommandOutput::ok(lines.join("\n")))
}

fn check<S: SettingsStore, U: UrlBuilder>(
    resolver: &LoginModeConfigResolver<S, U>,
    login_mode: &str,
) -> Result<CommandOutput> {
    // configuration errors propagate and fail the command
    let support = resolver.is_login_mode_supported(Some(login_mode))?;
    let text = match support {
        LoginModeSupport::Supported => format!("{}: supported", login_mode),
        LoginModeSupport::Unrecognized => format!("{}: not a hybridauth login mode", login_mode),
        LoginModeSupport::NotAllowed => format!("{}: not allowed by the host configuration", login_mode),
    };

    Ok(CommandOutput {
        text,
        success: support.is_supported(),
    })
}
