//! Numeric primitives shared by the renderers.
//!
//! Scene coordinates are device units (226 dpi). Output coordinates are
//! points (72 dpi); the only way between the two is a [`Scaler`].

use std::fmt;

use glam::DVec2;

use crate::errors::ScaleError;
use crate::render::defaults::SCREEN_DPI;

/// Device units → output units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scaler {
    ratio: f64,
}

impl Scaler {
    /// The device's 226 dpi screen rendered at 72 points per inch.
    pub const DEVICE_TO_POINTS: Scaler = Scaler {
        ratio: 72.0 / SCREEN_DPI,
    };

    /// Output units per device unit. Must be finite and positive.
    pub fn new(ratio: f64) -> Result<Self, ScaleError> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ScaleError::InvalidRatio { ratio });
        }
        Ok(Scaler { ratio })
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    #[inline]
    pub fn len(&self, device: f64) -> f64 {
        device * self.ratio
    }

    #[inline]
    pub fn point(&self, device: DVec2) -> DVec2 {
        device * self.ratio
    }
}

impl Default for Scaler {
    fn default() -> Self {
        Scaler::DEVICE_TO_POINTS
    }
}

/// An sRGB color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Gray level, saturating at the channel bounds.
    pub fn gray(level: f64) -> Rgb {
        let v = channel(level);
        Rgb(v, v, v)
    }
}

/// Truncate toward zero into a channel value.
pub(crate) fn channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Axis-aligned extent in device units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoundingBox {
    pub const ZERO: BoundingBox = BoundingBox {
        x_min: 0.0,
        x_max: 0.0,
        y_min: 0.0,
        y_max: 0.0,
    };

    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, x: f64, y: f64) {
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
    }

    /// Expand to include another box
    pub fn expand_box(&mut self, other: &BoundingBox) {
        self.x_min = self.x_min.min(other.x_min);
        self.x_max = self.x_max.max(other.x_max);
        self.y_min = self.y_min.min(other.y_min);
        self.y_max = self.y_max.max(other.y_max);
    }

    pub fn translated(self, offset: DVec2) -> BoundingBox {
        BoundingBox {
            x_min: self.x_min + offset.x,
            x_max: self.x_max + offset.x,
            y_min: self.y_min + offset.y,
            y_max: self.y_max + offset.y,
        }
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.x_min <= other.x_min
            && self.x_max >= other.x_max
            && self.y_min <= other.y_min
            && self.y_max >= other.y_max
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Fixed three-decimal formatting used for every coordinate in SVG output.
pub fn fmt_coord(value: f64) -> String {
    // Avoid emitting "-0.000"
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0.000".to_string();
    }
    format!("{:.3}", value)
}

/// Format a number with trailing zeros trimmed, at most three decimals.
pub fn fmt_num(value: f64) -> String {
    let s = fmt_coord(value);
    let s = s.trim_end_matches('0');
    let s = s.trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaler_rejects_unusable_ratios() {
        for ratio in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -1.0] {
            assert!(
                matches!(Scaler::new(ratio), Err(ScaleError::InvalidRatio { .. })),
                "{ratio}"
            );
        }
        assert_eq!(Scaler::new(0.5).unwrap().ratio(), 0.5);
    }

    #[test]
    fn device_scaler_maps_screen_width_to_points() {
        let s = Scaler::DEVICE_TO_POINTS;
        assert!((s.len(226.0) - 72.0).abs() < 1e-9);
        let p = s.point(DVec2::new(226.0, 452.0));
        assert!(p.abs_diff_eq(DVec2::new(72.0, 144.0), 1e-9));
    }

    #[test]
    fn rgb_display_matches_css() {
        assert_eq!(Rgb(78, 105, 201).to_string(), "rgb(78, 105, 201)");
    }

    #[test]
    fn gray_saturates() {
        assert_eq!(Rgb::gray(-4.0), Rgb::BLACK);
        assert_eq!(Rgb::gray(300.0), Rgb::WHITE);
        assert_eq!(Rgb::gray(59.9), Rgb(59, 59, 59));
    }

    #[test]
    fn bbox_expand_and_translate() {
        let mut b = BoundingBox::ZERO;
        b.expand_point(-3.0, 4.0);
        assert_eq!(b, BoundingBox::new(-3.0, 0.0, 0.0, 4.0));
        let t = b.translated(DVec2::new(1.0, 1.0));
        assert_eq!(t, BoundingBox::new(-2.0, 1.0, 1.0, 5.0));
        let mut big = BoundingBox::new(-10.0, 10.0, -10.0, 10.0);
        assert!(big.contains_box(&t));
        big.expand_box(&BoundingBox::new(0.0, 20.0, 0.0, 0.0));
        assert_eq!(big.x_max, 20.0);
    }

    #[test]
    fn coordinates_have_three_decimals() {
        assert_eq!(fmt_coord(1.0), "1.000");
        assert_eq!(fmt_coord(-0.0001), "0.000");
        assert_eq!(fmt_coord(2.34567), "2.346");
        assert_eq!(fmt_num(0.3), "0.3");
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(0.0), "0");
    }
}
