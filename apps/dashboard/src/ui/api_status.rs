use dioxus::prelude::*;

use crate::state::{use_dashboard_state, ApiHealth};
use crate::APP_CONFIG;

fn badge(health: &ApiHealth) -> (&'static str, String) {
    match health {
        ApiHealth::Checking => ("bg-gray-300", "verificando…".to_string()),
        ApiHealth::Online { version: Some(version) } => {
            ("bg-emerald-500", format!("en línea · v{version}"))
        }
        ApiHealth::Online { version: None } => ("bg-emerald-500", "en línea".to_string()),
        ApiHealth::Offline => ("bg-red-500", "sin conexión".to_string()),
    }
}

/// API endpoint plus the result of the startup health probe.
#[component]
pub fn ApiStatusBadge() -> Element {
    let state = use_dashboard_state();
    let (dot, label) = badge(&state.read().api_health);
    let endpoint = APP_CONFIG
        .get()
        .map(|config| config.api_base_url.clone())
        .unwrap_or_else(|| "API no configurada".to_string());

    rsx! {
        div { class: "mt-2 space-y-0.5",
            div { class: "flex items-center gap-1.5 text-[11px] text-gray-600",
                span { class: "h-2 w-2 rounded-full {dot}" }
                span { "{label}" }
            }
            p { class: "truncate font-mono text-[10px] text-gray-400", title: "{endpoint}", "{endpoint}" }
        }
    }
}
