use std::sync::Arc;

use geojson::FeatureCollection;

use super::palette::{politics_fill, POLITICS_STROKE};
use super::{HoverHandler, LayerDescriptor, LayerStyle};
use crate::models::{text_property, Domain};

/// Election results by department, one color per winning party.
pub fn politics_layer(data: Arc<FeatureCollection>, on_hover: HoverHandler) -> LayerDescriptor {
    LayerDescriptor::build(
        Domain::Politics,
        data,
        LayerStyle::outlined(POLITICS_STROKE),
        on_hover,
        |feature| politics_fill(text_property(feature, "party").unwrap_or_default()),
    )
}
