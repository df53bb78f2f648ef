use palette::{Hsl, IntoColor, Srgb};
use serde::Serialize;

use crate::config::{ConfigError, StatusColors};
use crate::data::model::{Category, StarSize, Status};

/// An 8-bit sRGB colour carried in view payloads, independent of the
/// renderer's colour type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChartColor(pub [u8; 3]);

impl From<Srgb<u8>> for ChartColor {
    fn from(c: Srgb<u8>) -> Self {
        ChartColor([c.red, c.green, c.blue])
    }
}

impl ChartColor {
    pub const GRAY: ChartColor = ChartColor([160, 160, 160]);

    /// Parse a CSS colour name (`lightgray`) or a hex code (`#1F85DE`).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with('#') {
            return text.parse::<Srgb<u8>>().ok().map(ChartColor::from);
        }
        palette::named::from_str(&text.to_ascii_lowercase()).map(ChartColor::from)
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<ChartColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            ChartColor([
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ])
        })
        .collect()
}

/// Colour of a star size series: one generated hue per category.
pub fn star_size_color(size: StarSize) -> ChartColor {
    let palette = generate_palette(StarSize::ALL.len());
    StarSize::ALL
        .iter()
        .position(|&s| s == size)
        .and_then(|i| palette.get(i).copied())
        .unwrap_or(ChartColor::GRAY)
}

// ---------------------------------------------------------------------------
// StatusPalette: status → fixed colour
// ---------------------------------------------------------------------------

/// Fixed three-colour palette keyed by status value, so a status keeps its
/// colour whichever statuses happen to be present in a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusPalette {
    challenging: ChartColor,
    promising: ChartColor,
    extreme: ChartColor,
}

impl Default for StatusPalette {
    fn default() -> Self {
        Self {
            challenging: ChartColor([211, 211, 211]),
            promising: ChartColor([0x1F, 0x85, 0xDE]),
            extreme: ChartColor([0xDE, 0x25, 0x1F]),
        }
    }
}

impl StatusPalette {
    pub fn from_config(colors: &StatusColors) -> Result<Self, ConfigError> {
        let parse = |status: Status, value: &str| {
            ChartColor::parse(value).ok_or_else(|| ConfigError::Color {
                status: status.label(),
                value: value.to_string(),
            })
        };
        Ok(Self {
            challenging: parse(Status::Challenging, &colors.challenging)?,
            promising: parse(Status::Promising, &colors.promising)?,
            extreme: parse(Status::Extreme, &colors.extreme)?,
        })
    }

    pub fn color_for(&self, status: Status) -> ChartColor {
        match status {
            Status::Challenging => self.challenging,
            Status::Promising => self.promising,
            Status::Extreme => self.extreme,
        }
    }

    /// Legend entries in display order.
    pub fn legend_entries(&self) -> Vec<(&'static str, ChartColor)> {
        Status::ALL
            .iter()
            .map(|&s| (s.label(), self.color_for(s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_hex() {
        assert_eq!(ChartColor::parse("lightgray"), Some(ChartColor([211, 211, 211])));
        assert_eq!(ChartColor::parse("LightGray"), Some(ChartColor([211, 211, 211])));
        assert_eq!(ChartColor::parse("#1F85DE"), Some(ChartColor([0x1F, 0x85, 0xDE])));
        assert_eq!(ChartColor::parse("#zzzzzz"), None);
        assert_eq!(ChartColor::parse("nope"), None);
    }

    #[test]
    fn configured_palette_matches_default() {
        let palette = StatusPalette::from_config(&StatusColors::default()).expect("palette");
        assert_eq!(palette, StatusPalette::default());
    }

    #[test]
    fn status_colours_are_distinct() {
        let palette = StatusPalette::default();
        let colors: std::collections::HashSet<ChartColor> =
            Status::ALL.iter().map(|&s| palette.color_for(s)).collect();
        assert_eq!(colors.len(), 3);
    }

    #[test]
    fn star_sizes_get_distinct_colours() {
        let colors: std::collections::HashSet<ChartColor> =
            StarSize::ALL.iter().map(|&s| star_size_color(s)).collect();
        assert_eq!(colors.len(), StarSize::ALL.len());
        assert!(generate_palette(0).is_empty());
    }
}
