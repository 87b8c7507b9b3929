//! Planner configuration.

use crate::domain::TravelTimeModel;

/// Configuration parameters for route planning.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// How far from each endpoint to look for a station (metres).
    pub search_radius_m: f64,

    /// Extra margin around the two endpoints when loading stations
    /// (metres). Larger values allow detours at the cost of a bigger graph.
    pub bound_margin_m: f64,

    /// Maximum graph size handed to the shortest-path engine. Selection is
    /// O(V²), so this bounds the work per request.
    pub max_nodes: usize,

    /// Edge-weight model used when importing routes.
    pub travel_time: TravelTimeModel,
}

impl PlannerConfig {
    pub fn new(search_radius_m: f64, bound_margin_m: f64, max_nodes: usize) -> Self {
        Self {
            search_radius_m,
            bound_margin_m,
            max_nodes,
            travel_time: TravelTimeModel::default(),
        }
    }

    pub fn with_travel_time(mut self, model: TravelTimeModel) -> Self {
        self.travel_time = model;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            search_radius_m: 500.0,
            bound_margin_m: 1_000.0,
            max_nodes: 2_000,
            travel_time: TravelTimeModel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.search_radius_m, 500.0);
        assert_eq!(config.bound_margin_m, 1_000.0);
        assert_eq!(config.max_nodes, 2_000);
        assert_eq!(config.travel_time.negative_delta_fallback_secs, 150);
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig::new(300.0, 200.0, 50)
            .with_travel_time(TravelTimeModel::new().with_fallback_secs(59));

        assert_eq!(config.search_radius_m, 300.0);
        assert_eq!(config.bound_margin_m, 200.0);
        assert_eq!(config.max_nodes, 50);
        assert_eq!(config.travel_time.negative_delta_fallback_secs, 59);
    }
}
