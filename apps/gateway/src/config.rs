use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::gateway::{GatewayOptions, DEFAULT_PORTFOLIO_ORIGIN};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub portfolio_origin: String,
    pub session_file: PathBuf,
    pub enforce_ownership: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            supabase_url: require_env("SUPABASE_URL")?,
            supabase_anon_key: require_env("SUPABASE_ANON_KEY")?,
            portfolio_origin: std::env::var("PORTFOLIO_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_PORTFOLIO_ORIGIN.to_string()),
            session_file: std::env::var("SESSION_FILE")
                .unwrap_or_else(|_| ".portfolio-session.json".to_string())
                .into(),
            enforce_ownership: parse_flag(std::env::var("ENFORCE_OWNERSHIP").ok().as_deref())
                .context("ENFORCE_OWNERSHIP must be true or false")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn gateway_options(&self) -> GatewayOptions {
        GatewayOptions {
            portfolio_origin: self.portfolio_origin.clone(),
            enforce_ownership: self.enforce_ownership,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset means on.
fn parse_flag(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => anyhow::bail!("unrecognized flag value '{other}'"),
    }
}
