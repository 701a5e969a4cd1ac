use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_address: SocketAddr,

    /// Path to RocksDB database
    pub database_path: PathBuf,

    /// OAuth consumer key issued by the provider
    pub consumer_key: String,

    /// OAuth consumer secret issued by the provider
    pub consumer_secret: String,

    /// `oauth_callback` sent when requesting a token
    pub oauth_callback: String,

    /// Deadline for one provider round trip
    pub oauth_timeout: Duration,

    /// Deadline for one credential store operation
    pub store_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = lookup("BIND_ADDRESS")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .context("BIND_ADDRESS must be a socket address")?;

        let database_path = lookup("DATABASE_PATH")
            .unwrap_or_else(|| "./data/registration.db".to_string())
            .into();

        let consumer_key = required(&lookup, "TWITTER_CONSUMER_KEY")?;
        let consumer_secret = required(&lookup, "TWITTER_CONSUMER_SECRET")?;

        let oauth_callback = lookup("OAUTH_CALLBACK").unwrap_or_else(|| "oob".to_string());

        let oauth_timeout = seconds(&lookup, "OAUTH_TIMEOUT_SECONDS", 10)?;
        let store_timeout = seconds(&lookup, "STORE_TIMEOUT_SECONDS", 5)?;

        Ok(Config {
            bind_address,
            database_path,
            consumer_key,
            consumer_secret,
            oauth_callback,
            oauth_timeout,
            store_timeout,
        })
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => anyhow::bail!("{} environment variable required", name),
    }
}

fn seconds<F>(lookup: &F, name: &str, default: u64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = match lookup(name) {
        Some(value) => value
            .parse::<u64>()
            .with_context(|| format!("{} must be a whole number of seconds", name))?,
        None => default,
    };
    if secs == 0 {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(Duration::from_secs(secs))
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("database_path", &self.database_path)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("oauth_callback", &self.oauth_callback)
            .field("oauth_timeout", &self.oauth_timeout)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}
