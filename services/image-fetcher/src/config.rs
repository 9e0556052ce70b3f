//! Configuration types and loading
//!
//! Config precedence: env vars > config file > defaults.
//! The client secret and account password are read from `REDDIT_CLIENT_SECRET`
//! / `REDDIT_PASSWORD` or from files named in the config, never from the TOML
//! itself.

use common::Secret;
use reddit_client::{Credentials, DEFAULT_API_URL, DEFAULT_AUTH_URL, DEFAULT_USER_AGENT, Endpoints};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const CLIENT_ID_ENV: &str = "REDDIT_CLIENT_ID";
const USERNAME_ENV: &str = "REDDIT_USERNAME";
const CLIENT_SECRET_ENV: &str = "REDDIT_CLIENT_SECRET";
const PASSWORD_ENV: &str = "REDDIT_PASSWORD";

/// Resolved process configuration, built once at startup.
#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub reddit: RedditConfig,
    pub storage: StorageConfig,
    pub credentials: Credentials,
}

/// On-disk TOML layout; secrets are resolved separately.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerConfig,
    reddit: RedditConfig,
    storage: StorageConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_connections: 1000,
        }
    }
}

/// Upstream API settings and non-secret account identity
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub auth_url: String,
    pub api_url: String,
    pub client_id: String,
    pub username: String,
    pub client_secret_file: Option<PathBuf>,
    pub password_file: Option<PathBuf>,
    pub user_agent: String,
    /// Per-request timeout for outbound calls; unset means no timeout
    pub timeout_secs: Option<u64>,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            client_id: String::new(),
            username: String::new(),
            client_secret_file: None,
            password_file: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

/// Photo directory and archive settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub photo_dir: PathBuf,
    pub archive_name: String,
    pub download_concurrency: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            photo_dir: PathBuf::from("photos"),
            archive_name: "reddit_images.zip".to_string(),
            download_concurrency: 1,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut file: ConfigFile = toml::from_str(&contents)?;

        if let Ok(id) = std::env::var(CLIENT_ID_ENV) {
            file.reddit.client_id = id;
        }
        if let Ok(name) = std::env::var(USERNAME_ENV) {
            file.reddit.username = name;
        }

        validate(&file)?;

        let client_secret = resolve_secret(
            "client_secret",
            CLIENT_SECRET_ENV,
            "client_secret_file",
            file.reddit.client_secret_file.as_deref(),
        )?;
        let password = resolve_secret(
            "password",
            PASSWORD_ENV,
            "password_file",
            file.reddit.password_file.as_deref(),
        )?;

        let credentials = Credentials {
            client_id: file.reddit.client_id.clone(),
            client_secret,
            username: file.reddit.username.clone(),
            password,
        };

        Ok(Config {
            server: file.server,
            reddit: file.reddit,
            storage: file.storage,
            credentials,
        })
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("reddit-image-fetcher.toml")
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            auth_url: self.reddit.auth_url.clone(),
            api_url: self.reddit.api_url.clone(),
            user_agent: self.reddit.user_agent.clone(),
        }
    }
}

fn validate(file: &ConfigFile) -> common::Result<()> {
    for (key, value) in [
        ("auth_url", &file.reddit.auth_url),
        ("api_url", &file.reddit.api_url),
    ] {
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "{key} must start with http:// or https://, got: {value}"
            )));
        }
    }

    if file.reddit.client_id.trim().is_empty() {
        return Err(common::Error::Config(format!(
            "client_id is required (config or {CLIENT_ID_ENV})"
        )));
    }
    if file.reddit.username.trim().is_empty() {
        return Err(common::Error::Config(format!(
            "username is required (config or {USERNAME_ENV})"
        )));
    }
    if file.reddit.timeout_secs == Some(0) {
        return Err(common::Error::Config(
            "timeout_secs must be greater than 0 when set".into(),
        ));
    }
    if file.server.max_connections == 0 {
        return Err(common::Error::Config(
            "max_connections must be greater than 0".into(),
        ));
    }
    if file.storage.download_concurrency == 0 {
        return Err(common::Error::Config(
            "download_concurrency must be greater than 0".into(),
        ));
    }
    if file.storage.archive_name.trim().is_empty() {
        return Err(common::Error::Config("archive_name must not be empty".into()));
    }
    Ok(())
}

/// Env var wins over file; a blank value from either source is missing.
fn resolve_secret(
    name: &'static str,
    env: &'static str,
    file_key: &'static str,
    file: Option<&Path>,
) -> common::Result<Secret<String>> {
    if let Some(secret) = std::env::var(env).ok().and_then(|v| Secret::from_trimmed(&v)) {
        return Ok(secret);
    }
    if let Some(path) = file {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            common::Error::Config(format!("failed to read {file_key} {}: {e}", path.display()))
        })?;
        if let Some(secret) = Secret::from_trimmed(&raw) {
            return Ok(secret);
        }
    }
    Err(common::Error::MissingSecret {
        name,
        env,
        file_key,
    })
}
