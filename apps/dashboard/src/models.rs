use std::sync::Arc;

use geojson::{Feature, FeatureCollection, JsonObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Thematic domains offered by the layer control, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Economy,
    Politics,
    Environment,
    Security,
    Society,
    Technology,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Economy,
        Domain::Politics,
        Domain::Environment,
        Domain::Security,
        Domain::Society,
        Domain::Technology,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::Politics => "politics",
            Self::Environment => "environment",
            Self::Security => "security",
            Self::Society => "society",
            Self::Technology => "technology",
        }
    }

    /// Backing dataset, or `None` while the domain is not yet wired to the API.
    pub fn source(self) -> Option<DataSource> {
        match self {
            Self::Economy => Some(DataSource {
                endpoint: "/economy/contracts/geojson",
                layer_id: "economy-layer",
            }),
            Self::Politics => Some(DataSource {
                endpoint: "/politics/elections/geojson",
                layer_id: "politics-layer",
            }),
            Self::Environment => Some(DataSource {
                endpoint: "/environment/deforestation",
                layer_id: "environment-layer",
            }),
            Self::Security | Self::Society | Self::Technology => None,
        }
    }

    pub fn is_wired(self) -> bool {
        self.source().is_some()
    }

    pub fn wired() -> impl Iterator<Item = Domain> {
        Self::ALL.into_iter().filter(|domain| domain.is_wired())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataSource {
    pub endpoint: &'static str,
    pub layer_id: &'static str,
}

/// Visibility flag for every domain. All six are always present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveLayers {
    pub economy: bool,
    pub politics: bool,
    pub environment: bool,
    pub security: bool,
    pub society: bool,
    pub technology: bool,
}

impl ActiveLayers {
    pub fn is_active(&self, domain: Domain) -> bool {
        match domain {
            Domain::Economy => self.economy,
            Domain::Politics => self.politics,
            Domain::Environment => self.environment,
            Domain::Security => self.security,
            Domain::Society => self.society,
            Domain::Technology => self.technology,
        }
    }

    /// Copy of `self` with the flag for `domain` flipped.
    #[must_use]
    pub fn toggled(&self, domain: Domain) -> Self {
        let mut next = *self;
        let flag = match domain {
            Domain::Economy => &mut next.economy,
            Domain::Politics => &mut next.politics,
            Domain::Environment => &mut next.environment,
            Domain::Security => &mut next.security,
            Domain::Society => &mut next.society,
            Domain::Technology => &mut next.technology,
        };
        *flag = !*flag;
        next
    }

    pub fn active_domains(&self) -> impl Iterator<Item = Domain> + '_ {
        Domain::ALL
            .into_iter()
            .filter(move |domain| self.is_active(*domain))
    }
}

/// Camera shared by the base map and the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            longitude: -64.9,
            latitude: -16.5,
            zoom: 5.5,
            pitch: 0.0,
            bearing: 0.0,
        }
    }
}

/// Snapshot exposed by the map data hook.
#[derive(Clone, Debug, Default)]
pub struct MapData {
    pub data: Option<Arc<FeatureCollection>>,
    pub is_loading: bool,
    pub is_error: bool,
}

impl MapData {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn loaded(data: Arc<FeatureCollection>) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn failed() -> Self {
        Self {
            is_error: true,
            ..Self::default()
        }
    }
}

impl PartialEq for MapData {
    fn eq(&self, other: &Self) -> bool {
        let same_data = match (&self.data, &other.data) {
            (Some(left), Some(right)) => Arc::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        };
        same_data && self.is_loading == other.is_loading && self.is_error == other.is_error
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }
}

/// The feature under the pointer and where the pointer is, in CSS pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipInfo {
    pub feature: Feature,
    pub x: f64,
    pub y: f64,
}

pub const TOOLTIP_MAX_ROWS: usize = 8;
pub const TOOLTIP_OFFSET_PX: f64 = 12.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TooltipRow {
    pub label: String,
    pub value: String,
}

/// Key/value rows shown for a hovered feature.
///
/// Uses the property bag when there is one and the serialized feature
/// otherwise. Null and empty-string values are skipped before the row cap
/// is applied.
pub fn tooltip_rows(feature: &Feature) -> Vec<TooltipRow> {
    let fallback;
    let bag: &JsonObject = match feature.properties.as_ref() {
        Some(properties) => properties,
        None => {
            fallback = JsonObject::from(feature);
            &fallback
        }
    };

    bag.iter()
        .filter(|(_, value)| !is_blank(value))
        .take(TOOLTIP_MAX_ROWS)
        .map(|(key, value)| TooltipRow {
            label: key.replace('_', " "),
            value: display_value(value),
        })
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => format_number(number),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn format_number(number: &serde_json::Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => format!("{float:.0}"),
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

/// Numeric property lookup. Numeric strings are accepted; anything else is `None`.
pub fn numeric_property(feature: &Feature, key: &str) -> Option<f64> {
    match feature.properties.as_ref()?.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn text_property<'a>(feature: &'a Feature, key: &str) -> Option<&'a str> {
    feature.properties.as_ref()?.get(key)?.as_str()
}
