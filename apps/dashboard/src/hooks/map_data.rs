use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

use crate::api::{GeoClient, GeoJsonSource};
use crate::models::MapData;
use crate::services::cache::DataCache;

pub type GeoCache = DataCache<GeoClient>;

/// Lazily loads one GeoJSON endpoint through the shared cache.
///
/// Nothing is fetched while `enabled` is false, and the snapshot then reads
/// as empty and idle. Once enabled, concurrent users of the same endpoint
/// share one request. Failures flag `is_error` and are not retried.
pub fn use_map_data(endpoint: &'static str, enabled: bool) -> Signal<MapData> {
    let cache = use_context::<Option<GeoCache>>();
    let mut state = use_signal(MapData::default);

    use_future(use_reactive!(|(endpoint, enabled)| {
        let cache = cache.clone();
        async move {
            state.set(pending_snapshot(enabled));
            if !enabled {
                return;
            }

            let Some(cache) = cache else {
                tracing::error!(endpoint, "data cache unavailable, API client failed to initialize");
                state.set(MapData::failed());
                return;
            };

            TimeoutFuture::new(0).await;

            let snapshot = resolve_map_data(&cache, endpoint).await;
            state.set(snapshot);
        }
    }));

    state
}

/// Snapshot published as soon as `enabled` changes, before any request.
fn pending_snapshot(enabled: bool) -> MapData {
    if enabled {
        MapData::loading()
    } else {
        MapData::default()
    }
}

/// One load of `endpoint` folded into a hook snapshot.
pub async fn resolve_map_data<S>(cache: &DataCache<S>, endpoint: &str) -> MapData
where
    S: GeoJsonSource + 'static,
{
    if cache.is_pending(endpoint) {
        tracing::debug!(endpoint, "joining in-flight request");
    }

    match cache.load(endpoint).await {
        Ok(data) => {
            tracing::info!(
                endpoint,
                features = data.features.len(),
                fetches = cache.fetch_count(),
                "layer data loaded"
            );
            MapData::loaded(data)
        }
        Err(err) => {
            tracing::error!(endpoint, kind = ?err.kind(), "failed to load layer data: {err}");
            MapData::failed()
        }
    }
}
