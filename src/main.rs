use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use drone_fleet::config::Config;
use drone_fleet::engine::dispatch::run_dispatch_engine;
use drone_fleet::engine::queue::enqueue_request;
use drone_fleet::error::FleetError;
use drone_fleet::fleet::Fleet;
use drone_fleet::models::base::Base;
use drone_fleet::models::delivery::DeliveryStatus;
use drone_fleet::models::location::Location;
use drone_fleet::scenario::Scenario;

#[tokio::main]
async fn main() -> Result<(), FleetError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let location = Location::new(
        config.base_name.clone(),
        "",
        "",
        "",
        "",
        "",
        config.base_lat,
        config.base_lng,
    );
    if !location.has_valid_coordinates() {
        return Err(FleetError::Config(format!(
            "base coordinates ({}, {}) are out of range",
            config.base_lat, config.base_lng
        )));
    }
    let base = Base::new(config.base_name.clone(), location, config.base_capacity);

    let (fleet, request_rx) =
        Fleet::new(base, config.request_queue_size, config.event_buffer_size);
    let fleet = Arc::new(fleet);

    let scenario = Scenario::load(&config.scenario_path)?;
    let requests = scenario.seed(&fleet)?;
    let expected = requests.len();
    tracing::info!(
        scenario = %config.scenario_path,
        vehicles = fleet.vehicles().len(),
        requests = expected,
        "scenario loaded"
    );

    let mut events = fleet.delivery_events_tx.subscribe();
    let engine = tokio::spawn(run_dispatch_engine(fleet.clone(), request_rx));

    for request in requests {
        enqueue_request(&fleet, request).await?;
    }

    let mut seen = 0;
    while seen < expected {
        match events.recv().await {
            Ok(_) => seen += 1,
            Err(RecvError::Lagged(skipped)) => {
                seen += usize::try_from(skipped).unwrap_or(usize::MAX);
            }
            Err(RecvError::Closed) => break,
        }
    }
    engine.abort();

    let deliveries = fleet.deliveries();
    let completed = deliveries
        .iter()
        .filter(|delivery| delivery.status == DeliveryStatus::Completed)
        .count();
    tracing::info!(
        completed,
        failed = deliveries.len() - completed,
        "scenario finished"
    );

    let metrics = fleet.metrics.encode().map_err(FleetError::Internal)?;
    println!("{metrics}");

    Ok(())
}
