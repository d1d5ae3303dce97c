//! Fill and stroke colors for the thematic layers.
//!
//! Breakpoints are kept exactly as the dashboard has always drawn them, so
//! maps rendered before and after a change stay comparable.

use crate::models::Rgba;

pub const FILL_ALPHA: u8 = 160;
pub const PARTY_ALPHA: u8 = 180;
pub const MAX_INTENSITY: u8 = 255;

/// Contract amount that adds `ECONOMY_INTENSITY_PER_UNIT` to the blue channel.
pub const ECONOMY_AMOUNT_UNIT: f64 = 1_000_000.0;
pub const ECONOMY_INTENSITY_PER_UNIT: f64 = 50.0;
pub const ECONOMY_GREEN: u8 = 200;

/// Deforested area (hectares) at which the environment ramp saturates.
pub const ENVIRONMENT_SATURATION_HA: f64 = 50_000.0;

pub const PARTY_MAS: Rgba = Rgba::new(0, 122, 61, PARTY_ALPHA);
pub const PARTY_CC: Rgba = Rgba::new(13, 110, 253, PARTY_ALPHA);
pub const PARTY_CREEMOS: Rgba = Rgba::new(255, 193, 7, PARTY_ALPHA);
pub const PARTY_OTHER: Rgba = Rgba::new(150, 150, 150, FILL_ALPHA);

/// Substring checked against the lowercased party name, first match wins.
pub const PARTY_COLORS: [(&str, Rgba); 3] = [
    ("mas", PARTY_MAS),
    ("cc", PARTY_CC),
    ("creemos", PARTY_CREEMOS),
];

pub const ECONOMY_STROKE: Rgba = Rgba::new(255, 255, 255, 120);
pub const POLITICS_STROKE: Rgba = Rgba::new(255, 255, 255, 120);
pub const ENVIRONMENT_STROKE: Rgba = Rgba::new(180, 80, 0, 200);

/// `min(255, floor(value / unit * scale))`, never below zero.
pub fn scaled_intensity(value: f64, unit: f64, scale: f64) -> u8 {
    let raw = (value / unit * scale).floor();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else if raw >= f64::from(MAX_INTENSITY) {
        MAX_INTENSITY
    } else {
        raw as u8
    }
}

/// Orange-red for small contracts, shifting towards blue as `amount` grows.
pub fn economy_fill(amount: f64) -> Rgba {
    let intensity = scaled_intensity(amount, ECONOMY_AMOUNT_UNIT, ECONOMY_INTENSITY_PER_UNIT);
    Rgba::new(MAX_INTENSITY - intensity, ECONOMY_GREEN, intensity, FILL_ALPHA)
}

/// Yellow for small clearings, red once `area_ha` reaches saturation.
pub fn environment_fill(area_ha: f64) -> Rgba {
    let intensity = scaled_intensity(
        area_ha,
        ENVIRONMENT_SATURATION_HA,
        f64::from(MAX_INTENSITY),
    );
    Rgba::new(MAX_INTENSITY, MAX_INTENSITY - intensity, 0, FILL_ALPHA)
}

pub fn politics_fill(party: &str) -> Rgba {
    let party = party.to_lowercase();
    PARTY_COLORS
        .iter()
        .find(|(needle, _)| party.contains(needle))
        .map(|(_, color)| *color)
        .unwrap_or(PARTY_OTHER)
}
