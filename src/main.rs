use clap::Parser;

use vehicle_ingest::app;
use vehicle_ingest::cli::VehiclesCli;
use vehicle_ingest::config::{AppConfig, Profile};
use vehicle_ingest::es::mapping::IndexSchema;
use vehicle_ingest::source::VehicleFeedSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = VehiclesCli::parse();
    app::init_tracing();

    tracing::info!("Starting load-vehicles...");

    // Load configuration (env vars override TOML, flags override both)
    let mut config = AppConfig::load(Profile::Vehicles)?;
    cli.apply(&mut config);
    config.validate(Profile::Vehicles)?;
    tracing::info!("Feed URL: {}", config.feed.url);

    let source = VehicleFeedSource::new(&config.feed)?;
    let decision = cli.ingest.recreate.decision();

    app::run(&config, source, IndexSchema::vehicles(), decision.as_ref()).await
}
