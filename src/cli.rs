use clap::{ArgAction, Args, Parser};

use crate::config::AppConfig;
use crate::prompt::RecreatePolicy;

/// Flags shared by both ingest programs. Anything left unset keeps the value
/// from config.toml, the environment, or the built-in default.
#[derive(Debug, Clone, Args)]
pub struct IngestArgs {
    /// Name of the Elasticsearch index
    #[arg(short, long)]
    pub index: Option<String>,

    /// Poll interval in milliseconds
    #[arg(short, long)]
    pub frequency: Option<u64>,

    /// URL of the Elasticsearch server
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// What to do when the index already exists
    #[arg(long, value_enum, default_value_t = RecreatePolicy::Ask)]
    pub recreate: RecreatePolicy,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl IngestArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(index) = &self.index {
            config.ingest.index_name = index.clone();
        }
        if let Some(frequency) = self.frequency {
            config.ingest.frequency_ms = frequency;
        }
        if let Some(host) = &self.host {
            config.elasticsearch.url = host.clone();
        }
    }
}

/// Index synthetic track waypoints into Elasticsearch.
#[derive(Debug, Parser)]
#[command(name = "load-tracks", version, disable_help_flag = true)]
pub struct TracksCli {
    #[command(flatten)]
    pub ingest: IngestArgs,
}

impl TracksCli {
    pub fn apply(&self, config: &mut AppConfig) {
        self.ingest.apply(config);
    }
}

/// Index live vehicle positions from a SIRI VehicleMonitoring feed into Elasticsearch.
#[derive(Debug, Parser)]
#[command(name = "load-vehicles", version, disable_help_flag = true)]
pub struct VehiclesCli {
    #[command(flatten)]
    pub ingest: IngestArgs,

    /// API key for the vehicle feed
    #[arg(short, long)]
    pub apikey: Option<String>,
}

impl VehiclesCli {
    pub fn apply(&self, config: &mut AppConfig) {
        self.ingest.apply(config);
        if let Some(key) = &self.apikey {
            config.feed.api_key = key.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;
    use clap::CommandFactory;

    #[test]
    fn cli_definitions_are_valid() {
        TracksCli::command().debug_assert();
        VehiclesCli::command().debug_assert();
    }

    #[test]
    fn short_h_is_host_not_help() {
        let cli = TracksCli::try_parse_from(["load-tracks", "-h", "http://es:9200"]).unwrap();
        assert_eq!(cli.ingest.host.as_deref(), Some("http://es:9200"));
    }

    #[test]
    fn short_flags_override_config() {
        let cli = VehiclesCli::try_parse_from([
            "load-vehicles",
            "-i",
            "buses",
            "-f",
            "5000",
            "-a",
            "secret",
            "--recreate",
            "no",
        ])
        .unwrap();
        assert_eq!(cli.ingest.recreate, RecreatePolicy::No);

        let mut config = AppConfig::defaults(Profile::Vehicles);
        cli.apply(&mut config);
        assert_eq!(config.ingest.index_name, "buses");
        assert_eq!(config.ingest.frequency_ms, 5000);
        assert_eq!(config.feed.api_key, "secret");
        assert_eq!(config.elasticsearch.url, "https://localhost:9200");
    }

    #[test]
    fn no_flags_leave_config_untouched() {
        let cli = TracksCli::try_parse_from(["load-tracks"]).unwrap();
        assert_eq!(cli.ingest.recreate, RecreatePolicy::Ask);

        let mut config = AppConfig::defaults(Profile::Tracks);
        cli.apply(&mut config);
        assert_eq!(config.ingest.index_name, "tracks");
        assert_eq!(config.ingest.frequency_ms, 1000);
    }

    #[test]
    fn tracks_program_has_no_apikey() {
        assert!(TracksCli::try_parse_from(["load-tracks", "--apikey", "k"]).is_err());
    }
}
