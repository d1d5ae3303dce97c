use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

use crate::state::{use_dashboard_actions, ApiHealth};
use crate::API_CLIENT;

/// Probes the API once per mount and records the result in dashboard state.
pub fn use_api_health() {
    let actions = use_dashboard_actions();

    use_future(move || async move {
        TimeoutFuture::new(0).await;

        let Some(client) = API_CLIENT.get().cloned() else {
            actions.set_api_health(ApiHealth::Offline);
            return;
        };

        match client.health().await {
            Ok(status) if status.is_ok() => {
                actions.set_api_health(ApiHealth::Online {
                    version: status.version,
                });
            }
            Ok(status) => {
                tracing::warn!(status = %status.status, "API reported unhealthy");
                actions.set_api_health(ApiHealth::Offline);
            }
            Err(err) => {
                tracing::warn!("API health probe failed: {err}");
                actions.set_api_health(ApiHealth::Offline);
            }
        }
    });
}
