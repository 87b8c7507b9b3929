//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::bus_api::BusApiError;
use crate::cache::CachedBusClient;
use crate::network::{InsertSummary, NetworkSnapshot, NetworkStore};
use crate::normalize::{NormalizeError, RejectedStation, RouteImport};
use crate::planner::PlannerConfig;

/// Failure importing a route from the provider.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Upstream(#[from] BusApiError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// What an import did.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub summary: InsertSummary,
    pub route_number: String,
    pub stations: usize,
    pub edges: usize,
    pub rejected: Vec<RejectedStation>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Cached provider client
    pub bus: Arc<CachedBusClient>,

    /// Imported routes, stations and edges
    pub network: Arc<RwLock<NetworkStore>>,

    /// Planner configuration
    pub planner: Arc<PlannerConfig>,

    /// Where to persist the network after imports, if anywhere
    pub snapshot: Option<Arc<NetworkSnapshot>>,

    /// Serializes snapshot writes so an older copy never overwrites a newer one
    snapshot_writes: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        bus: CachedBusClient,
        network: NetworkStore,
        planner: PlannerConfig,
        snapshot: Option<NetworkSnapshot>,
    ) -> Self {
        Self {
            bus: Arc::new(bus),
            network: Arc::new(RwLock::new(network)),
            planner: Arc::new(planner),
            snapshot: snapshot.map(Arc::new),
            snapshot_writes: Arc::new(Mutex::new(())),
        }
    }

    /// Fetch a route from the provider and merge it into the network.
    ///
    /// Bypasses the response cache so periodic refreshes see current data.
    /// The snapshot is written from a copy after the network lock is
    /// released; a failed write is logged but does not fail the import.
    pub async fn import_route(&self, route_id: i64) -> Result<ImportOutcome, ImportError> {
        let raw = self.bus.client().route_and_positions(route_id).await?;
        let import = RouteImport::from_response(&raw, &self.planner.travel_time)?;

        let route_number = import.route.number.clone();
        let stations = import.stations.len();
        let edges = import.edges().len();
        let rejected = import.rejected.clone();

        let _write_turn = match &self.snapshot {
            Some(_) => Some(self.snapshot_writes.lock().await),
            None => None,
        };

        let (summary, copy) = {
            let mut network = self.network.write().await;
            let summary = network.insert_route(import);
            let copy = self.snapshot.is_some().then(|| network.clone());
            (summary, copy)
        };

        if let Some(snapshot) = &self.snapshot
            && let Some(store) = copy
        {
            save_snapshot(snapshot.clone(), store).await;
        }

        info!(
            route = %summary.route_id,
            stations_added = summary.stations_added,
            edges_total = summary.edges_total,
            "Route merged into network"
        );

        Ok(ImportOutcome {
            summary,
            route_number,
            stations,
            edges,
            rejected,
        })
    }
}

async fn save_snapshot(snapshot: Arc<NetworkSnapshot>, store: NetworkStore) {
    let path = snapshot.path().to_path_buf();
    match tokio::task::spawn_blocking(move || snapshot.save(&store)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(path = %path.display(), error = %e, "Failed to save snapshot"),
        Err(e) => warn!(path = %path.display(), error = %e, "Snapshot task failed"),
    }
}
