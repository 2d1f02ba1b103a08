//! Command-line interface of hybridauth-admin

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and administer hybridauth providers and login modes
#[derive(Parser, Debug, Clone)]
#[command(name = "hybridauth-admin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the admin configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Host configuration file, overrides the configured store path
    #[arg(long, env = "HYBRIDAUTH_STORE")]
    pub store: Option<PathBuf>,

    /// Modules root URL, overrides the configured one
    #[arg(long)]
    pub root_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List configured providers and whether they are enabled
    List,

    /// Print the configuration handed to the auth library
    Show {
        /// Force the consent screen for providers that need it
        #[arg(long)]
        consent_fix: bool,
    },

    /// Check whether a login mode may be used
    Check {
        /// Login mode, e.g. hybridauth-Google
        login_mode: String,
    },

    /// Print the effective settings of a login mode
    Provider {
        login_mode: String,
    },

    /// Enable a configured provider and allow its login mode
    Enable {
        provider: String,
    },

    /// Disable a configured provider and remove its login mode
    Disable {
        provider: String,
    },

    /// Replace all provider settings from a JSON file
    SetProviders {
        /// JSON object mapping provider names to their settings
        file: PathBuf,

        /// Provider whose login mode is updated
        #[arg(long)]
        selected: String,

        /// Whether the selected provider's login mode is allowed
        #[arg(long, action = ArgAction::Set)]
        enabled: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
