#![allow(non_snake_case)]

mod api;
mod config;
mod hooks;
mod layers;
mod models;
mod services;
mod state;
mod ui;

use api::{ClientError, GeoClient};
use config::AppConfig;
use dioxus::prelude::*;
use dioxus_router::prelude::*;
use hooks::health::use_api_health;
use hooks::map_data::GeoCache;
use once_cell::sync::OnceCell;
use services::cache::DataCache;
use state::{DashboardActions, DashboardState};
use tracing::{error, info};
use ui::api_status::ApiStatusBadge;
use ui::layer_control::LayerControl;
use ui::map::MapContainer;

pub(crate) static APP_CONFIG: OnceCell<AppConfig> = OnceCell::new();
pub(crate) static API_CLIENT: OnceCell<GeoClient> = OnceCell::new();

fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::from_env();
    init_logging(&config);
    bootstrap_infrastructure(config);
    launch(App);
}

fn init_logging(config: &AppConfig) {
    static INIT: std::sync::Once = std::sync::Once::new();
    let level = config.profile.log_level();
    INIT.call_once(|| {
        let _ = dioxus_logger::init(level);
    });
}

fn bootstrap_infrastructure(config: AppConfig) {
    let _ = APP_CONFIG.set(config.clone());

    match GeoClient::new(config) {
        Ok(client) => {
            info!(base_url = client.base_url(), "GeoJSON client initialized");
            let _ = API_CLIENT.set(client);
        }
        Err(err) => {
            report_client_error("failed to initialize GeoJSON client", &err);
        }
    }
}

fn report_client_error(context: &str, err: &ClientError) {
    error!(%context, ?err, status = ?err.status(), "api bootstrap error");
}

#[component]
fn App() -> Element {
    use_context_provider(|| -> Option<GeoCache> {
        API_CLIENT.get().cloned().map(|client| {
            let interval = client.config().dedupe_interval;
            DataCache::new(client, interval)
        })
    });

    rsx! {
        Router::<Route> {}
    }
}

#[derive(Clone, Routable, Debug, PartialEq)]
enum Route {
    #[redirect("/", || Route::MapPage {})]
    #[route("/map")]
    MapPage {},
}

#[component]
fn MapPage() -> Element {
    let state = use_signal(DashboardState::default);
    use_context_provider(|| state);
    let actions = DashboardActions::new(state);

    use_api_health();

    let active = state.read().active;

    rsx! {
        main { class: "relative h-screen w-full overflow-hidden",
            MapContainer {}
            aside { class: "absolute left-4 top-4 z-10 w-64 rounded-xl bg-white/90 shadow-xl backdrop-blur-sm",
                header { class: "border-b border-gray-200 px-4 py-3",
                    h1 { class: "text-base font-bold text-gray-900", "Bolivia KPIs" }
                    p { class: "text-xs text-gray-500", "Capas de datos" }
                    ApiStatusBadge {}
                }
                LayerControl {
                    active,
                    on_toggle: move |domain| actions.toggle_layer(domain),
                }
            }
        }
    }
}
