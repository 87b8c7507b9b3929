//! Caching layer for upstream provider responses.
//!
//! Every upstream call made by the web layer goes through here. Entries live
//! for a short TTL; stop lists and route layouts change rarely but arrival
//! fields inside the same payloads change by the minute.
//!
//! Position queries are bucketed to a coordinate grid (about 10 m) so that
//! requests from nearly the same spot share an entry.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::bus_api::{BusApiClient, BusApiError, RawResponse};

/// Grid cells per degree for position keys (1e-4 degrees, about 11 m).
const POSITION_BUCKETS_PER_DEGREE: f64 = 10_000.0;

/// Cache key, one variant per upstream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKey {
    StationsByPosition {
        latitude_bucket: i64,
        longitude_bucket: i64,
        radius_m: u32,
    },
    Route(i64),
    Station(String),
}

impl RequestKey {
    pub fn stations_by_position(latitude: f64, longitude: f64, radius_m: u32) -> Self {
        RequestKey::StationsByPosition {
            latitude_bucket: position_bucket(latitude),
            longitude_bucket: position_bucket(longitude),
            radius_m,
        }
    }
}

fn position_bucket(degrees: f64) -> i64 {
    (degrees * POSITION_BUCKETS_PER_DEGREE).round() as i64
}

/// Configuration for the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Provider client with response caching.
pub struct CachedBusClient {
    client: BusApiClient,
    responses: MokaCache<RequestKey, Arc<RawResponse>>,
}

impl CachedBusClient {
    pub fn new(client: BusApiClient, config: &CacheConfig) -> Self {
        let responses = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { client, responses }
    }

    pub async fn stations_by_position(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    ) -> Result<Arc<RawResponse>, BusApiError> {
        let key = RequestKey::stations_by_position(latitude, longitude, radius_m);
        if let Some(cached) = self.responses.get(&key).await {
            return Ok(cached);
        }

        let resp = Arc::new(
            self.client
                .stations_by_position(latitude, longitude, radius_m)
                .await?,
        );
        self.responses.insert(key, resp.clone()).await;
        Ok(resp)
    }

    pub async fn route_and_positions(&self, route_id: i64) -> Result<Arc<RawResponse>, BusApiError> {
        let key = RequestKey::Route(route_id);
        if let Some(cached) = self.responses.get(&key).await {
            return Ok(cached);
        }

        let resp = Arc::new(self.client.route_and_positions(route_id).await?);
        self.responses.insert(key, resp.clone()).await;
        Ok(resp)
    }

    pub async fn station_by_uid(&self, ars_id: &str) -> Result<Arc<RawResponse>, BusApiError> {
        let key = RequestKey::Station(ars_id.to_string());
        if let Some(cached) = self.responses.get(&key).await {
            return Ok(cached);
        }

        let resp = Arc::new(self.client.station_by_uid(ars_id).await?);
        self.responses.insert(key, resp.clone()).await;
        Ok(resp)
    }

    /// Access the underlying client for operations that bypass cache.
    pub fn client(&self) -> &BusApiClient {
        &self.client
    }

    pub fn cache_entry_count(&self) -> u64 {
        self.responses.entry_count()
    }

    pub fn invalidate_cache(&self) {
        self.responses.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::routing::post;
    use serde_json::json;

    use crate::bus_api::BusApiConfig;

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_capacity, 1000);
    }

    #[test]
    fn nearby_positions_share_a_key() {
        let a = RequestKey::stations_by_position(37.342_01, 127.106_02, 300);
        let b = RequestKey::stations_by_position(37.342_04, 127.105_98, 300);
        assert_eq!(a, b);

        let far = RequestKey::stations_by_position(37.343, 127.106, 300);
        assert_ne!(a, far);

        let wider = RequestKey::stations_by_position(37.342_01, 127.106_02, 500);
        assert_ne!(a, wider);
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/getRouteAndPos.bms",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    axum::Json(json!({
                        "error": {"errorCode": "0000", "errorMessage": "성공"},
                        "resultList": [{"busRouteId": "100100118"}]
                    }))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client =
            BusApiClient::new(BusApiConfig::new().with_base_url(format!("http://{addr}"))).unwrap();
        let cached = CachedBusClient::new(client, &CacheConfig::default());

        let first = cached.route_and_positions(100100118).await.unwrap();
        let second = cached.route_and_positions(100100118).await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));

        cached.invalidate_cache();
        cached.route_and_positions(100100118).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
