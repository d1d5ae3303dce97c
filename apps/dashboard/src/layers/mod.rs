pub mod compose;
pub mod economy;
pub mod environment;
pub mod palette;
pub mod politics;

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use geojson::{Feature, FeatureCollection};
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::models::{Domain, Rgba};

pub use compose::{compose_layers, LayerSlots, LoadPhase};
pub use economy::economy_layer;
pub use environment::environment_layer;
pub use politics::politics_layer;

/// Pointer-hover report for one layer. `feature` is `None` when the pointer
/// left every feature of the layer.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverEvent {
    pub feature: Option<Feature>,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone)]
pub struct HoverHandler(Rc<dyn Fn(HoverEvent)>);

impl HoverHandler {
    pub fn new(handler: impl Fn(HoverEvent) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: HoverEvent) {
        (self.0)(event)
    }
}

impl PartialEq for HoverHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HoverHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HoverHandler")
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerStyle {
    pub line_color: Rgba,
    pub line_width_min_pixels: f64,
    pub point_radius_min_pixels: Option<f64>,
    pub pickable: bool,
    pub stroked: bool,
    pub filled: bool,
}

impl LayerStyle {
    /// Pickable, stroked and filled with a one pixel outline.
    pub const fn outlined(line_color: Rgba) -> Self {
        Self {
            line_color,
            line_width_min_pixels: 1.0,
            point_radius_min_pixels: None,
            pickable: true,
            stroked: true,
            filled: true,
        }
    }
}

/// Everything the overlay renderer needs to draw one thematic layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerDescriptor {
    pub id: &'static str,
    pub domain: Domain,
    pub data: Arc<FeatureCollection>,
    pub style: LayerStyle,
    /// One color per feature, same order as `data.features`.
    pub fill_colors: Vec<Rgba>,
    on_hover: HoverHandler,
}

impl LayerDescriptor {
    pub(crate) fn build(
        domain: Domain,
        data: Arc<FeatureCollection>,
        style: LayerStyle,
        on_hover: HoverHandler,
        fill: impl Fn(&Feature) -> Rgba,
    ) -> Self {
        let id = domain
            .source()
            .map_or(domain.key(), |source| source.layer_id);
        let fill_colors = data.features.iter().map(fill).collect();
        Self {
            id,
            domain,
            data,
            style,
            fill_colors,
            on_hover,
        }
    }

    /// Forwards a renderer hover report. A missing or out-of-range index
    /// clears the hover.
    pub fn dispatch_hover(&self, index: Option<usize>, x: f64, y: f64) {
        let feature = index.and_then(|idx| self.data.features.get(idx)).cloned();
        self.on_hover.call(HoverEvent { feature, x, y });
    }

    /// Identity used to skip re-uploading unchanged layers.
    pub fn fingerprint(&self) -> (&'static str, usize) {
        (self.id, Arc::as_ptr(&self.data) as usize)
    }

    pub fn overlay_spec(&self) -> OverlaySpec<'_> {
        OverlaySpec {
            id: self.id,
            data: &self.data,
            fill_colors: &self.fill_colors,
            line_color: self.style.line_color,
            line_width_min_pixels: self.style.line_width_min_pixels,
            point_radius_min_pixels: self.style.point_radius_min_pixels,
            pickable: self.style.pickable,
            stroked: self.style.stroked,
            filled: self.style.filled,
        }
    }
}

/// Wire shape handed to the overlay bridge.
#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySpec<'a> {
    pub id: &'static str,
    pub data: &'a FeatureCollection,
    pub fill_colors: &'a [Rgba],
    pub line_color: Rgba,
    pub line_width_min_pixels: f64,
    pub point_radius_min_pixels: Option<f64>,
    pub pickable: bool,
    pub stroked: bool,
    pub filled: bool,
}

/// Factory for `domain`, or `None` when the domain has no data source yet.
pub fn build_layer(
    domain: Domain,
    data: Arc<FeatureCollection>,
    on_hover: HoverHandler,
) -> Option<LayerDescriptor> {
    match domain {
        Domain::Economy => Some(economy_layer(data, on_hover)),
        Domain::Politics => Some(politics_layer(data, on_hover)),
        Domain::Environment => Some(environment_layer(data, on_hover)),
        Domain::Security | Domain::Society | Domain::Technology => None,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{collection, recording_handler};
    use super::*;
    use serde_json::json;

    #[test]
    fn dispatch_hover_resolves_feature_by_index() {
        let data = collection(vec![json!({ "party": "MAS" }), json!({ "party": "CC" })]);
        let (handler, seen) = recording_handler();
        let layer = politics_layer(data, handler);

        layer.dispatch_hover(Some(1), 40.0, 52.0);
        layer.dispatch_hover(None, 41.0, 53.0);
        layer.dispatch_hover(Some(9), 42.0, 54.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        let hovered = seen[0].feature.as_ref().unwrap();
        assert_eq!(
            hovered.properties.as_ref().unwrap().get("party"),
            Some(&json!("CC"))
        );
        assert_eq!((seen[0].x, seen[0].y), (40.0, 52.0));
        assert!(seen[1].feature.is_none());
        assert!(seen[2].feature.is_none());
    }

    #[test]
    fn unwired_domains_have_no_factory() {
        let data = collection(Vec::new());
        let (handler, _) = recording_handler();
        assert!(build_layer(Domain::Security, data.clone(), handler.clone()).is_none());
        assert!(build_layer(Domain::Society, data.clone(), handler.clone()).is_none());
        assert!(build_layer(Domain::Technology, data.clone(), handler.clone()).is_none());
        assert_eq!(
            build_layer(Domain::Environment, data, handler).map(|layer| layer.id),
            Some("environment-layer")
        );
    }

    #[test]
    fn overlay_spec_serializes_camel_case() {
        let data = collection(vec![json!({ "amount": 0 })]);
        let (handler, _) = recording_handler();
        let layer = economy_layer(data, handler);
        let value = serde_json::to_value(layer.overlay_spec()).unwrap();

        assert_eq!(value["id"], json!("economy-layer"));
        assert_eq!(value["fillColors"], json!([[255, 200, 0, 160]]));
        assert_eq!(value["lineColor"], json!([255, 255, 255, 120]));
        assert_eq!(value["pointRadiusMinPixels"], json!(5.0));
        assert_eq!(value["data"]["type"], json!("FeatureCollection"));
    }

    #[test]
    fn politics_spec_omits_point_radius() {
        let data = collection(vec![json!({ "party": "CC" })]);
        let (handler, _) = recording_handler();
        let value = serde_json::to_value(politics_layer(data, handler).overlay_spec()).unwrap();
        assert!(value.get("pointRadiusMinPixels").is_none());
    }
}
