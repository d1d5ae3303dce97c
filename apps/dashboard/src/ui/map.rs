use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::hooks::domain_layer::use_domain_layer;
use crate::layers::{compose_layers, HoverHandler};
use crate::models::Domain;
use crate::services::map_bridge::{MapBridge, MapMount};
use crate::state::{use_dashboard_actions, use_dashboard_state};
use crate::ui::tooltip::MapTooltip;
use crate::APP_CONFIG;

type BridgeSlot = Rc<RefCell<Option<MapBridge>>>;

/// Base map with the thematic overlay on top, sharing one camera.
#[component]
pub fn MapContainer() -> Element {
    // Fixed set and order of wired domains, so the hook order is stable.
    for domain in Domain::wired() {
        if let Some(source) = domain.source() {
            use_domain_layer(domain, source);
        }
    }

    let state = use_dashboard_state();
    let actions = use_dashboard_actions();

    let (basemap_id, overlay_id) = use_hook(|| {
        let suffix = Uuid::new_v4().simple().to_string();
        (format!("kpi-basemap-{suffix}"), format!("kpi-overlay-{suffix}"))
    });
    let bridge: BridgeSlot = use_hook(|| Rc::new(RefCell::new(None)));
    let on_hover = use_hook(|| HoverHandler::new(move |event| actions.hover(event)));

    let layer_inputs = use_memo(move || {
        let state = state.read();
        (state.active, state.layers.clone())
    });
    let camera = use_memo(move || state.read().view_state);

    use_effect({
        let bridge = Rc::clone(&bridge);
        let basemap_id = basemap_id.clone();
        let overlay_id = overlay_id.clone();
        move || {
            if bridge.borrow().is_some() {
                return;
            }
            let style_url = APP_CONFIG
                .get()
                .map(|config| config.map_style_url.clone())
                .unwrap_or_else(|| AppConfig::default().map_style_url);
            let mount = MapMount {
                basemap_container_id: &basemap_id,
                overlay_container_id: &overlay_id,
                style_url: &style_url,
                view_state: *camera.peek(),
            };
            match MapBridge::mount(mount, move |view| actions.set_view_state(view)) {
                Ok(mounted) => *bridge.borrow_mut() = Some(mounted),
                Err(err) => tracing::error!("failed to mount map view: {err}"),
            }
        }
    });

    use_effect({
        let bridge = Rc::clone(&bridge);
        move || {
            let (active, slots) = layer_inputs();
            let layers = compose_layers(&active, &slots, &on_hover);
            if let Some(mounted) = bridge.borrow().as_ref() {
                if let Err(err) = mounted.set_layers(layers) {
                    tracing::error!("failed to update overlay layers: {err}");
                }
            }
        }
    });

    use_effect({
        let bridge = Rc::clone(&bridge);
        move || {
            let view = camera();
            if let Some(mounted) = bridge.borrow().as_ref() {
                if let Err(err) = mounted.sync_camera(view) {
                    tracing::warn!("failed to sync camera: {err}");
                }
            }
        }
    });

    use_drop({
        let bridge = Rc::clone(&bridge);
        move || {
            bridge.borrow_mut().take();
        }
    });

    let tooltip = state.read().tooltip.clone();

    rsx! {
        div { class: "absolute inset-0",
            div { id: "{basemap_id}", class: "absolute inset-0" }
            div { id: "{overlay_id}", class: "absolute inset-0" }
            if let Some(info) = tooltip {
                MapTooltip { info }
            }
        }
    }
}
