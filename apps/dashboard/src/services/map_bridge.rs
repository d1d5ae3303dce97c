//! Glue to the MapLibre base map, the PMTiles protocol and the deck.gl
//! overlay. The JavaScript libraries are loaded as globals by `index.html`;
//! this module only creates, drives and tears down their instances.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;
use wasm_bindgen::prelude::*;

use crate::layers::LayerDescriptor;
use crate::models::ViewState;

#[wasm_bindgen(inline_js = "
function kpiView(v) {
    return {
        longitude: v.longitude,
        latitude: v.latitude,
        zoom: v.zoom,
        pitch: v.pitch ?? 0,
        bearing: v.bearing ?? 0,
    };
}

export function kpi_add_pmtiles_protocol() {
    const protocol = new pmtiles.Protocol();
    maplibregl.addProtocol('pmtiles', protocol.tile);
}

export function kpi_remove_pmtiles_protocol() {
    maplibregl.removeProtocol('pmtiles');
}

export function kpi_create_basemap(containerId, styleUrl, viewJson, onMove) {
    const view = JSON.parse(viewJson);
    const map = new maplibregl.Map({
        container: containerId,
        style: styleUrl,
        center: [view.longitude, view.latitude],
        zoom: view.zoom,
        pitch: view.pitch,
        bearing: view.bearing,
        attributionControl: true,
    });
    map.addControl(new maplibregl.NavigationControl(), 'top-right');
    map.addControl(new maplibregl.ScaleControl({ unit: 'metric' }), 'bottom-right');
    map.on('move', (event) => {
        if (!event.originalEvent) {
            return;
        }
        const center = map.getCenter();
        onMove(JSON.stringify(kpiView({
            longitude: center.lng,
            latitude: center.lat,
            zoom: map.getZoom(),
            pitch: map.getPitch(),
            bearing: map.getBearing(),
        })));
    });
    return map;
}

export function kpi_jump_basemap(map, viewJson) {
    const view = JSON.parse(viewJson);
    map.jumpTo({
        center: [view.longitude, view.latitude],
        zoom: view.zoom,
        pitch: view.pitch,
        bearing: view.bearing,
    });
}

export function kpi_remove_basemap(map) {
    map.remove();
}

export function kpi_create_overlay(parentId, viewJson, onViewState) {
    return new deck.Deck({
        parent: document.getElementById(parentId),
        views: new deck.MapView({ repeat: true }),
        viewState: JSON.parse(viewJson),
        controller: true,
        layers: [],
        onViewStateChange: ({ viewState }) => {
            onViewState(JSON.stringify(kpiView(viewState)));
        },
    });
}

export function kpi_set_overlay_view(overlay, viewJson) {
    overlay.setProps({ viewState: JSON.parse(viewJson) });
}

export function kpi_set_overlay_layers(overlay, layersJson, onHover) {
    const specs = JSON.parse(layersJson);
    const layers = specs.map((spec) => new deck.GeoJsonLayer({
        id: spec.id,
        data: spec.data,
        pickable: spec.pickable,
        stroked: spec.stroked,
        filled: spec.filled,
        lineWidthMinPixels: spec.lineWidthMinPixels,
        pointRadiusMinPixels: spec.pointRadiusMinPixels ?? 0,
        getFillColor: (_feature, { index }) => spec.fillColors[index] ?? [0, 0, 0, 0],
        getLineColor: spec.lineColor,
        onHover: (info) => onHover(spec.id, info.object ? info.index : -1, info.x, info.y),
    }));
    overlay.setProps({ layers });
}

export function kpi_finalize_overlay(overlay) {
    overlay.finalize();
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn kpi_add_pmtiles_protocol() -> Result<(), JsValue>;

    fn kpi_remove_pmtiles_protocol();

    #[wasm_bindgen(catch)]
    fn kpi_create_basemap(
        container_id: &str,
        style_url: &str,
        view_json: &str,
        on_move: &Closure<dyn FnMut(String)>,
    ) -> Result<JsValue, JsValue>;

    fn kpi_jump_basemap(map: &JsValue, view_json: &str);

    fn kpi_remove_basemap(map: &JsValue);

    #[wasm_bindgen(catch)]
    fn kpi_create_overlay(
        parent_id: &str,
        view_json: &str,
        on_view_state: &Closure<dyn FnMut(String)>,
    ) -> Result<JsValue, JsValue>;

    fn kpi_set_overlay_view(overlay: &JsValue, view_json: &str);

    #[wasm_bindgen(catch)]
    fn kpi_set_overlay_layers(
        overlay: &JsValue,
        layers_json: &str,
        on_hover: &Closure<dyn FnMut(String, i32, f64, f64)>,
    ) -> Result<(), JsValue>;

    fn kpi_finalize_overlay(overlay: &JsValue);
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("{stage} failed: {message}")]
    Js {
        stage: &'static str,
        message: String,
    },
    #[error("map container #{0} not found")]
    MissingContainer(String),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl BridgeError {
    fn js(stage: &'static str, value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::JSON::stringify(&value)
                    .ok()
                    .and_then(|text| text.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        Self::Js { stage, message }
    }
}

fn require_container(id: &str) -> Result<(), BridgeError> {
    let found = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(id))
        .is_some();
    if found {
        Ok(())
    } else {
        Err(BridgeError::MissingContainer(id.to_string()))
    }
}

/// Keeps the `pmtiles://` scheme registered for as long as it lives.
struct PmtilesProtocol;

impl PmtilesProtocol {
    fn register() -> Result<Self, BridgeError> {
        kpi_add_pmtiles_protocol().map_err(|err| BridgeError::js("pmtiles protocol", err))?;
        Ok(Self)
    }
}

impl Drop for PmtilesProtocol {
    fn drop(&mut self) {
        kpi_remove_pmtiles_protocol();
    }
}

pub struct MapMount<'a> {
    pub basemap_container_id: &'a str,
    pub overlay_container_id: &'a str,
    pub style_url: &'a str,
    pub view_state: ViewState,
}

/// Live base map plus overlay for one mounted map view. Dropping it removes
/// both instances and unregisters the tile protocol.
pub struct MapBridge {
    basemap: JsValue,
    overlay: JsValue,
    layers: Rc<RefCell<Vec<LayerDescriptor>>>,
    uploaded: RefCell<Vec<(&'static str, usize)>>,
    camera: Cell<ViewState>,
    on_hover: Closure<dyn FnMut(String, i32, f64, f64)>,
    _on_view_state: Closure<dyn FnMut(String)>,
    _on_basemap_move: Closure<dyn FnMut(String)>,
    _protocol: PmtilesProtocol,
}

impl MapBridge {
    /// `on_camera` receives every user-driven camera change, from either engine.
    pub fn mount(
        mount: MapMount<'_>,
        on_camera: impl Fn(ViewState) + 'static,
    ) -> Result<Self, BridgeError> {
        require_container(mount.basemap_container_id)?;
        require_container(mount.overlay_container_id)?;
        let protocol = PmtilesProtocol::register()?;
        let view_json = serde_json::to_string(&mount.view_state)?;

        let on_camera = Rc::new(on_camera);
        let overlay_camera = Rc::clone(&on_camera);
        let on_view_state = Closure::<dyn FnMut(String)>::new(move |json: String| {
            if let Some(view) = parse_view_state(&json) {
                overlay_camera(view);
            }
        });
        let basemap_camera = Rc::clone(&on_camera);
        let on_basemap_move = Closure::<dyn FnMut(String)>::new(move |json: String| {
            if let Some(view) = parse_view_state(&json) {
                basemap_camera(view);
            }
        });

        let basemap = kpi_create_basemap(
            mount.basemap_container_id,
            mount.style_url,
            &view_json,
            &on_basemap_move,
        )
        .map_err(|err| BridgeError::js("base map", err))?;

        let overlay = match kpi_create_overlay(mount.overlay_container_id, &view_json, &on_view_state)
        {
            Ok(overlay) => overlay,
            Err(err) => {
                kpi_remove_basemap(&basemap);
                return Err(BridgeError::js("overlay", err));
            }
        };

        let layers: Rc<RefCell<Vec<LayerDescriptor>>> = Rc::new(RefCell::new(Vec::new()));
        let hover_layers = Rc::clone(&layers);
        let on_hover = Closure::<dyn FnMut(String, i32, f64, f64)>::new(
            move |layer_id: String, index: i32, x: f64, y: f64| {
                let layers = hover_layers.borrow();
                if let Some(layer) = layers.iter().find(|layer| layer.id == layer_id) {
                    layer.dispatch_hover(usize::try_from(index).ok(), x, y);
                }
            },
        );

        tracing::info!(style = mount.style_url, "map view mounted");

        Ok(Self {
            basemap,
            overlay,
            layers,
            uploaded: RefCell::new(Vec::new()),
            camera: Cell::new(mount.view_state),
            on_hover,
            _on_view_state: on_view_state,
            _on_basemap_move: on_basemap_move,
            _protocol: protocol,
        })
    }

    /// Replaces the overlay's layer list. Unchanged lists are not re-sent.
    pub fn set_layers(&self, layers: Vec<LayerDescriptor>) -> Result<(), BridgeError> {
        let fingerprint: Vec<_> = layers.iter().map(LayerDescriptor::fingerprint).collect();
        if *self.uploaded.borrow() == fingerprint {
            *self.layers.borrow_mut() = layers;
            return Ok(());
        }

        let specs: Vec<_> = layers.iter().map(LayerDescriptor::overlay_spec).collect();
        let json = serde_json::to_string(&specs)?;
        kpi_set_overlay_layers(&self.overlay, &json, &self.on_hover)
            .map_err(|err| BridgeError::js("overlay layers", err))?;

        tracing::debug!(count = layers.len(), "overlay layers updated");
        *self.uploaded.borrow_mut() = fingerprint;
        *self.layers.borrow_mut() = layers;
        Ok(())
    }

    /// Pushes the shared camera into both engines.
    pub fn sync_camera(&self, view_state: ViewState) -> Result<(), BridgeError> {
        if self.camera.get() == view_state {
            return Ok(());
        }
        let json = serde_json::to_string(&view_state)?;
        kpi_set_overlay_view(&self.overlay, &json);
        kpi_jump_basemap(&self.basemap, &json);
        self.camera.set(view_state);
        Ok(())
    }
}

impl Drop for MapBridge {
    fn drop(&mut self) {
        kpi_finalize_overlay(&self.overlay);
        kpi_remove_basemap(&self.basemap);
        tracing::info!("map view torn down");
    }
}

fn parse_view_state(json: &str) -> Option<ViewState> {
    match serde_json::from_str(json) {
        Ok(view) => Some(view),
        Err(err) => {
            tracing::warn!("ignoring malformed camera update: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camera_payload() {
        let view = parse_view_state(
            r#"{"longitude":-68.1,"latitude":-16.5,"zoom":9.0,"pitch":30.0,"bearing":-12.5}"#,
        )
        .unwrap();
        assert_eq!(view.zoom, 9.0);
        assert_eq!(view.bearing, -12.5);
    }

    #[test]
    fn rejects_incomplete_camera_payload() {
        assert!(parse_view_state(r#"{"longitude":-68.1}"#).is_none());
    }
}
