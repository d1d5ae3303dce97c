use dioxus::prelude::*;

use crate::models::{tooltip_rows, TooltipInfo, TOOLTIP_OFFSET_PX};

/// Floating key/value card for the hovered feature.
#[component]
pub fn MapTooltip(info: TooltipInfo) -> Element {
    let rows = tooltip_rows(&info.feature);
    let left = info.x + TOOLTIP_OFFSET_PX;
    let top = info.y + TOOLTIP_OFFSET_PX;

    rsx! {
        div {
            class: "pointer-events-none absolute z-20 max-w-xs rounded-lg bg-white/95 px-3 py-2 text-xs shadow-lg",
            style: "left: {left}px; top: {top}px;",
            for (idx, row) in rows.into_iter().enumerate() {
                div { key: "{idx}", class: "flex gap-2",
                    span { class: "font-medium capitalize text-gray-500", "{row.label}:" }
                    span { class: "text-gray-800", "{row.value}" }
                }
            }
        }
    }
}
