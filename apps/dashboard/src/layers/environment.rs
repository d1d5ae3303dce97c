use std::sync::Arc;

use geojson::FeatureCollection;

use super::palette::{environment_fill, ENVIRONMENT_STROKE};
use super::{HoverHandler, LayerDescriptor, LayerStyle};
use crate::models::{numeric_property, Domain};

/// Deforestation zones, colored by cleared `area_ha`.
pub fn environment_layer(data: Arc<FeatureCollection>, on_hover: HoverHandler) -> LayerDescriptor {
    LayerDescriptor::build(
        Domain::Environment,
        data,
        LayerStyle::outlined(ENVIRONMENT_STROKE),
        on_hover,
        |feature| environment_fill(numeric_property(feature, "area_ha").unwrap_or(0.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::test_support::{collection, recording_handler};
    use crate::models::Rgba;
    use serde_json::json;

    #[test]
    fn colors_follow_cleared_area() {
        let data = collection(vec![
            json!({ "area_ha": 0 }),
            json!({ "area_ha": 25_000 }),
            json!({ "area_ha": 100_000 }),
            json!({ "area_ha": null }),
        ]);
        let (handler, _) = recording_handler();
        let layer = environment_layer(data, handler);

        assert_eq!(layer.fill_colors.get(0).copied(), Some(Rgba::new(255, 255, 0, 160)));
        assert_eq!(layer.fill_colors.get(1).copied(), Some(Rgba::new(255, 128, 0, 160)));
        assert_eq!(layer.fill_colors.get(2).copied(), Some(Rgba::new(255, 0, 0, 160)));
        assert_eq!(layer.fill_colors.get(3).copied(), Some(Rgba::new(255, 255, 0, 160)));
        assert_eq!(layer.fill_colors.get(4).copied(), None);
    }

    #[test]
    fn outline_is_burnt_orange() {
        let (handler, _) = recording_handler();
        let layer = environment_layer(collection(Vec::new()), handler);
        assert_eq!(layer.style.line_color, Rgba::new(180, 80, 0, 200));
        assert_eq!(layer.style.point_radius_min_pixels, None);
    }
}
