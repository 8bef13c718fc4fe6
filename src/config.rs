use anyhow::bail;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Which ingest program is loading the configuration; selects built-in defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Tracks,
    Vehicles,
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tracks => write!(f, "tracks"),
            Self::Vehicles => write!(f, "vehicles"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub elasticsearch: EsConfig,
    pub ingest: IngestConfig,
    pub feed: FeedConfig,
}

/// On-disk layout of config.toml. Each program reads its own ingest section
/// so the two never resolve to the same index.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    elasticsearch: EsConfig,
    #[serde(default)]
    feed: FeedConfig,
    tracks: Option<IngestConfig>,
    vehicles: Option<IngestConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EsConfig {
    pub url: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Local clusters ship with self-signed certificates.
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    pub index_name: String,
    /// Requested poll interval in milliseconds
    pub frequency_ms: u64,
    /// Floor the poll interval is clamped to
    #[serde(default = "default_min_frequency_ms")]
    pub min_frequency_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.into(),
            api_key: String::new(),
        }
    }
}

const DEFAULT_FEED_URL: &str = "https://bustime.mta.info/api/siri/vehicle-monitoring.json";

fn default_username() -> String {
    "elastic".into()
}

fn default_password() -> String {
    "changeme".into()
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_min_frequency_ms() -> u64 {
    100
}

impl IngestConfig {
    /// Poll interval actually used by the loop: requests below the floor are
    /// clamped up to it rather than rejected.
    pub fn effective_interval(&self) -> Duration {
        if self.frequency_ms < self.min_frequency_ms {
            tracing::warn!(
                "Requested frequency {}ms is below the minimum, using {}ms",
                self.frequency_ms,
                self.min_frequency_ms
            );
            Duration::from_millis(self.min_frequency_ms)
        } else {
            Duration::from_millis(self.frequency_ms)
        }
    }
}

impl AppConfig {
    pub fn load(profile: Profile) -> anyhow::Result<Self> {
        // Step 1: Try loading .env file (silently ignore if not found)
        let _ = dotenvy::dotenv();

        // Step 2: Try loading TOML config as base
        let mut config = if Path::new("config.toml").exists() {
            let content = std::fs::read_to_string("config.toml")?;
            AppConfig::from_toml(&content, profile)?
        } else {
            AppConfig::defaults(profile)
        };

        // Step 3: Override with environment variables where present
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Builds the configuration for `profile` from a config.toml body. A
    /// missing `[tracks]`/`[vehicles]` section falls back to that program's
    /// built-in ingest defaults.
    pub fn from_toml(content: &str, profile: Profile) -> anyhow::Result<Self> {
        let file: FileConfig = toml::from_str(content)?;
        let section = match profile {
            Profile::Tracks => file.tracks,
            Profile::Vehicles => file.vehicles,
        };
        let ingest = match section {
            Some(ingest) => ingest,
            None => {
                tracing::info!(
                    "No [{profile}] section in config.toml, using built-in ingest defaults"
                );
                AppConfig::defaults(profile).ingest
            }
        };
        Ok(Self {
            elasticsearch: file.elasticsearch,
            ingest,
            feed: file.feed,
        })
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(url) = var("ELASTICSEARCH_URL") {
            self.elasticsearch.url = url;
        }
        if let Some(username) = var("ELASTICSEARCH_USERNAME") {
            self.elasticsearch.username = username;
        }
        if let Some(password) = var("ELASTICSEARCH_PASSWORD") {
            self.elasticsearch.password = password;
        }
        if let Some(val) = var("ELASTICSEARCH_ACCEPT_INVALID_CERTS") {
            self.elasticsearch.accept_invalid_certs = val.parse()?;
        }
        if let Some(index) = var("INGEST_INDEX") {
            self.ingest.index_name = index;
        }
        if let Some(val) = var("INGEST_FREQUENCY_MS") {
            self.ingest.frequency_ms = val.parse()?;
        }
        if let Some(val) = var("INGEST_MIN_FREQUENCY_MS") {
            self.ingest.min_frequency_ms = val.parse()?;
        }
        if let Some(url) = var("FEED_URL") {
            self.feed.url = url;
        }
        if let Some(key) = var("FEED_API_KEY") {
            self.feed.api_key = key;
        }
        Ok(())
    }

    /// Checks run after every override layer (including CLI flags) is applied.
    pub fn validate(&self, profile: Profile) -> anyhow::Result<()> {
        if let Err(e) = Url::parse(&self.elasticsearch.url) {
            bail!("Invalid Elasticsearch URL '{}': {e}", self.elasticsearch.url);
        }
        if self.ingest.index_name.is_empty() {
            bail!("Index name must not be empty");
        }
        if self.ingest.min_frequency_ms == 0 {
            bail!("min_frequency_ms must be greater than zero");
        }
        if profile == Profile::Vehicles {
            if let Err(e) = Url::parse(&self.feed.url) {
                bail!("Invalid feed URL '{}': {e}", self.feed.url);
            }
            if self.feed.api_key.is_empty() {
                tracing::warn!(
                    "No feed API key configured. Set FEED_API_KEY or pass --apikey"
                );
            }
        }
        Ok(())
    }

    pub fn defaults(profile: Profile) -> Self {
        let (index_name, frequency_ms) = match profile {
            Profile::Tracks => ("tracks", 1000),
            Profile::Vehicles => ("vehicles", 10_000),
        };
        Self {
            elasticsearch: EsConfig {
                url: "https://localhost:9200".into(),
                username: default_username(),
                password: default_password(),
                accept_invalid_certs: default_accept_invalid_certs(),
            },
            ingest: IngestConfig {
                index_name: index_name.into(),
                frequency_ms,
                min_frequency_ms: default_min_frequency_ms(),
            },
            feed: FeedConfig::default(),
        }
    }
}
