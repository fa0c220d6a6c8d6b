//! Device geometry and text layout constants (all in device units)

use crate::scene::ParagraphStyle;

pub const SCREEN_WIDTH: f64 = 1404.0;
pub const SCREEN_HEIGHT: f64 = 1872.0;
pub const SCREEN_DPI: f64 = 226.0;

/// Where both page sentinels resolve to.
pub const SENTINEL_Y: f64 = 100.0;

/// Offset from the text origin to the top of the first line.
pub const TEXT_TOP_Y: f64 = -88.0;

/// Character gap still treated as one highlighted passage.
pub const HIGHLIGHT_JOIN_TOLERANCE: u32 = 2;

/// Vertical advance for one paragraph of the given style.
pub fn line_height(style: ParagraphStyle) -> f64 {
    match style {
        // Tuned against the device's lined template: 71, not 70 or 72.
        ParagraphStyle::Plain => 71.0,
        ParagraphStyle::Bullet | ParagraphStyle::Bullet2 => 35.0,
        ParagraphStyle::Bold => 70.0,
        ParagraphStyle::Heading => 150.0,
        ParagraphStyle::Checkbox | ParagraphStyle::CheckboxChecked => 35.0,
        ParagraphStyle::Other(_) => line_height(ParagraphStyle::Plain),
    }
}
