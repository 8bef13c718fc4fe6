//! Synthetic track loader.
//!
//! Provisions the tracks index and drives the ingest loop. Waypoint
//! generation is not implemented yet, so cycles currently write nothing.

use clap::Parser;

use vehicle_ingest::app;
use vehicle_ingest::cli::TracksCli;
use vehicle_ingest::config::{AppConfig, Profile};
use vehicle_ingest::es::mapping::IndexSchema;
use vehicle_ingest::source::SyntheticTrackSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = TracksCli::parse();
    app::init_tracing();

    tracing::info!("Starting load-tracks...");

    let mut config = AppConfig::load(Profile::Tracks)?;
    cli.apply(&mut config);
    config.validate(Profile::Tracks)?;

    let decision = cli.ingest.recreate.decision();
    app::run(
        &config,
        SyntheticTrackSource,
        IndexSchema::tracks(),
        decision.as_ref(),
    )
    .await
}
