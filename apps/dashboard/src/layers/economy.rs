use std::sync::Arc;

use geojson::FeatureCollection;

use super::palette::{economy_fill, ECONOMY_STROKE};
use super::{HoverHandler, LayerDescriptor, LayerStyle};
use crate::models::{numeric_property, Domain};

const POINT_RADIUS_MIN_PIXELS: f64 = 5.0;

/// Choropleth of public contracts, colored by `amount`.
pub fn economy_layer(data: Arc<FeatureCollection>, on_hover: HoverHandler) -> LayerDescriptor {
    let style = LayerStyle {
        point_radius_min_pixels: Some(POINT_RADIUS_MIN_PIXELS),
        ..LayerStyle::outlined(ECONOMY_STROKE)
    };

    LayerDescriptor::build(Domain::Economy, data, style, on_hover, |feature| {
        economy_fill(numeric_property(feature, "amount").unwrap_or(0.0))
    })
}
