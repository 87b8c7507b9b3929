use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bus_server::bus_api::BusApiClient;
use bus_server::cache::CachedBusClient;
use bus_server::config::ServerConfig;
use bus_server::network::{NetworkSnapshot, NetworkStore};
use bus_server::web::{AppState, create_router};

/// How often to re-import preloaded routes (24 hours).
const ROUTE_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bus_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("Invalid configuration");

    let client = BusApiClient::new(config.bus_api.clone()).expect("Failed to create bus API client");
    let bus = CachedBusClient::new(client, &config.cache);

    let snapshot = config.snapshot_path.clone().map(|path| {
        let snapshot = NetworkSnapshot::new(path);
        match config.snapshot_max_age {
            Some(max_age) => snapshot.with_max_age(max_age),
            None => snapshot,
        }
    });
    let network = match snapshot.as_ref().and_then(NetworkSnapshot::load) {
        Some(store) => {
            info!(
                stations = store.station_count(),
                routes = store.route_count(),
                "Loaded network snapshot"
            );
            store
        }
        None => NetworkStore::new(),
    };

    let state = AppState::new(bus, network, config.planner.clone(), snapshot);

    for &route_id in &config.preload_routes {
        if let Err(e) = state.import_route(route_id).await {
            warn!(route_id, error = %e, "Failed to preload route");
        }
    }

    if !config.preload_routes.is_empty() {
        let refresh_state = state.clone();
        let routes = config.preload_routes.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(ROUTE_REFRESH_INTERVAL);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                for &route_id in &routes {
                    if let Err(e) = refresh_state.import_route(route_id).await {
                        error!(route_id, error = %e, "Failed to refresh route");
                    }
                }
            }
        });
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    info!(addr = %config.bind_addr, "Bus server listening");

    axum::serve(listener, app).await.expect("Server error");
}

