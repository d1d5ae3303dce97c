use dioxus::prelude::*;

use crate::layers::LoadPhase;
use crate::models::{ActiveLayers, Domain};
use crate::state::use_dashboard_state;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerMeta {
    pub domain: Domain,
    pub label: &'static str,
    /// Tailwind background class for the color swatch.
    pub swatch: &'static str,
    pub description: &'static str,
}

pub const LAYER_CATALOG: [LayerMeta; 6] = [
    LayerMeta {
        domain: Domain::Economy,
        label: "Economía",
        swatch: "bg-emerald-500",
        description: "Contratos, PIB, exportaciones",
    },
    LayerMeta {
        domain: Domain::Politics,
        label: "Política",
        swatch: "bg-blue-600",
        description: "Elecciones, conflictos, TIOC",
    },
    LayerMeta {
        domain: Domain::Environment,
        label: "Medio Ambiente",
        swatch: "bg-yellow-500",
        description: "Deforestación, incendios, minería",
    },
    LayerMeta {
        domain: Domain::Security,
        label: "Seguridad",
        swatch: "bg-red-600",
        description: "Crimen, decomisos, infraestructura",
    },
    LayerMeta {
        domain: Domain::Society,
        label: "Sociedad",
        swatch: "bg-purple-600",
        description: "IDH, censo, brecha de género",
    },
    LayerMeta {
        domain: Domain::Technology,
        label: "Tecnología",
        swatch: "bg-sky-500",
        description: "Internet, cobertura, I+D",
    },
];

/// Short status shown next to a row label, if any.
pub fn row_status(domain: Domain, phase: &LoadPhase) -> Option<&'static str> {
    if !domain.is_wired() {
        return Some("sin datos");
    }
    match phase {
        LoadPhase::Loading => Some("cargando…"),
        // Failed loads stay silent; the error is only logged.
        LoadPhase::Inactive | LoadPhase::Loaded(_) | LoadPhase::Failed => None,
    }
}

/// One toggle row per domain. Clicking the row or its checkbox flips the flag once.
#[component]
pub fn LayerControl(active: ActiveLayers, on_toggle: EventHandler<Domain>) -> Element {
    let state = use_dashboard_state();

    rsx! {
        div { class: "space-y-1 p-3",
            for meta in LAYER_CATALOG {
                LayerRow {
                    key: "{meta.domain.key()}",
                    meta,
                    checked: active.is_active(meta.domain),
                    status: row_status(meta.domain, state.read().phase(meta.domain)),
                    on_toggle,
                }
            }
        }
    }
}

#[component]
fn LayerRow(
    meta: LayerMeta,
    checked: bool,
    status: Option<&'static str>,
    on_toggle: EventHandler<Domain>,
) -> Element {
    let domain = meta.domain;
    let row_class = if checked {
        "flex cursor-pointer items-start gap-3 rounded-lg bg-gray-100 p-2"
    } else {
        "flex cursor-pointer items-start gap-3 rounded-lg p-2 hover:bg-gray-50"
    };

    rsx! {
        div { class: row_class, onclick: move |_| on_toggle.call(domain),
            input {
                r#type: "checkbox",
                class: "mt-1",
                checked,
                // The row's onclick toggles too. Keep the checkbox click from
                // bubbling so it only flips the flag through onchange.
                onclick: move |evt: MouseEvent| evt.stop_propagation(),
                onchange: move |_| on_toggle.call(domain),
            }
            span { class: "mt-1.5 h-3 w-3 shrink-0 rounded-full {meta.swatch}" }
            div { class: "min-w-0",
                div { class: "flex items-center gap-2",
                    span { class: "text-sm font-medium text-gray-800", "{meta.label}" }
                    if let Some(status) = status {
                        span { class: "text-[10px] uppercase tracking-wide text-gray-400", "{status}" }
                    }
                }
                p { class: "text-xs text-gray-500", "{meta.description}" }
            }
        }
    }
}
