//! Pen styles for rendering strokes
//!
//! Each tool family is its own type that knows how to:
//! - Report its static stroke settings (width, color, opacity, linecap)
//! - Restyle a segment from the pen state at its first point
//!
//! The per-family formulas are empirical fits to the device's output. They
//! expect the decoder's unit conversions: speed and width are 4x the device
//! value, pressure is on a 0-255 scale and direction is 255 per full turn.

use std::f64::consts::TAU;

use enum_dispatch::enum_dispatch;

use crate::errors::PenError;
use crate::scene::Point;
use crate::types::{Rgb, channel};

/// Segment length for pens that never restyle along a stroke.
pub const UNSEGMENTED: usize = 1000;

/// Tool codes as written by the device. The `*2` codes are later firmware
/// revisions of the same tool and alias the same family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tool {
    Paintbrush1,
    Pencil1,
    Ballpoint1,
    Marker1,
    Fineliner1,
    Highlighter1,
    Eraser,
    MechanicalPencil1,
    EraserArea,
    Paintbrush2,
    MechanicalPencil2,
    Pencil2,
    Ballpoint2,
    Marker2,
    Fineliner2,
    Highlighter2,
    Calligraphy,
    Shader,
}

impl TryFrom<u32> for Tool {
    type Error = PenError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Tool::Paintbrush1,
            1 => Tool::Pencil1,
            2 => Tool::Ballpoint1,
            3 => Tool::Marker1,
            4 => Tool::Fineliner1,
            5 => Tool::Highlighter1,
            6 => Tool::Eraser,
            7 => Tool::MechanicalPencil1,
            8 => Tool::EraserArea,
            12 => Tool::Paintbrush2,
            13 => Tool::MechanicalPencil2,
            14 => Tool::Pencil2,
            15 => Tool::Ballpoint2,
            16 => Tool::Marker2,
            17 => Tool::Fineliner2,
            18 => Tool::Highlighter2,
            21 => Tool::Calligraphy,
            23 => Tool::Shader,
            code => return Err(PenError::UnknownTool { code }),
        })
    }
}

impl Tool {
    pub fn is_highlighter(self) -> bool {
        matches!(self, Tool::Highlighter1 | Tool::Highlighter2)
    }
}

/// Device color codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PenColor {
    Black,
    Gray,
    White,
    Yellow,
    Green,
    Pink,
    Blue,
    Red,
    GrayOverlap,
    /// Used by every highlighter color on some firmware versions.
    Highlight,
    Green2,
    Cyan,
    Magenta,
    Yellow2,
}

impl PenColor {
    pub fn from_code(code: u32) -> Option<PenColor> {
        Some(match code {
            0 => PenColor::Black,
            1 => PenColor::Gray,
            2 => PenColor::White,
            3 => PenColor::Yellow,
            4 => PenColor::Green,
            5 => PenColor::Pink,
            6 => PenColor::Blue,
            7 => PenColor::Red,
            8 => PenColor::GrayOverlap,
            9 => PenColor::Highlight,
            10 => PenColor::Green2,
            11 => PenColor::Cyan,
            12 => PenColor::Magenta,
            13 => PenColor::Yellow2,
            _ => return None,
        })
    }

    pub fn rgb(self) -> Rgb {
        match self {
            PenColor::Black => Rgb(0, 0, 0),
            PenColor::Gray => Rgb(144, 144, 144),
            PenColor::White => Rgb(255, 255, 255),
            PenColor::Yellow => Rgb(251, 247, 25),
            PenColor::Green => Rgb(0, 255, 0),
            PenColor::Pink => Rgb(255, 192, 203),
            PenColor::Blue => Rgb(78, 105, 201),
            PenColor::Red => Rgb(179, 62, 57),
            PenColor::GrayOverlap => Rgb(125, 125, 125),
            PenColor::Highlight => Rgb(247, 232, 81),
            PenColor::Green2 => Rgb(161, 216, 125),
            PenColor::Cyan => Rgb(139, 208, 229),
            PenColor::Magenta => Rgb(183, 130, 205),
            PenColor::Yellow2 => Rgb(247, 232, 81),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

/// Static settings every pen family starts from.
#[derive(Clone, Debug, PartialEq)]
pub struct PenBase {
    pub name: &'static str,
    pub width: f64,
    pub color: Rgb,
    pub opacity: f64,
    pub linecap: LineCap,
    /// Points sharing one style before the next restyle.
    pub segment_length: usize,
}

impl PenBase {
    fn new(name: &'static str, width: f64, color: Rgb) -> Self {
        Self {
            name,
            width,
            color,
            opacity: 1.0,
            linecap: LineCap::Round,
            segment_length: UNSEGMENTED,
        }
    }

    fn segment_length(mut self, n: usize) -> Self {
        self.segment_length = n.max(1);
        self
    }

    fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    fn linecap(mut self, linecap: LineCap) -> Self {
        self.linecap = linecap;
        self
    }
}

/// Style applied to one segment of a stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentStyle {
    pub width: f64,
    pub color: Rgb,
    pub opacity: f64,
}

/// Convert the encoded pen direction to a tilt angle in radians.
pub fn direction_to_tilt(direction: f64) -> f64 {
    direction * TAU / 255.0
}

fn clamp01(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Common behavior for all pen families
#[enum_dispatch]
pub trait PenStyle {
    /// Static settings of this pen
    fn base(&self) -> &PenBase;

    fn segment_length(&self) -> usize {
        self.base().segment_length
    }

    fn width_at(&self, _point: &Point, _last_width: f64) -> f64 {
        self.base().width
    }

    fn color_at(&self, _point: &Point, _last_width: f64) -> Rgb {
        self.base().color
    }

    fn opacity_at(&self, _point: &Point, _last_width: f64) -> f64 {
        self.base().opacity
    }

    /// Everything a new segment starting at `point` needs.
    fn segment_style(&self, point: &Point, last_width: f64) -> SegmentStyle {
        SegmentStyle {
            width: self.width_at(point, last_width),
            color: self.color_at(point, last_width),
            opacity: clamp01(self.opacity_at(point, last_width)),
        }
    }
}

// ============================================================================
// Pen Families
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Fineliner(PenBase);

impl Fineliner {
    pub fn new(width: f64, color: Rgb) -> Self {
        Self(PenBase::new("Fineliner", width * 1.8, color))
    }
}

impl PenStyle for Fineliner {
    fn base(&self) -> &PenBase {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ballpoint(PenBase);

impl Ballpoint {
    pub fn new(width: f64, color: Rgb) -> Self {
        Self(PenBase::new("Ballpoint", width, color).segment_length(5))
    }
}

impl PenStyle for Ballpoint {
    fn base(&self) -> &PenBase {
        &self.0
    }

    fn width_at(&self, p: &Point, _last_width: f64) -> f64 {
        (0.5 + p.pressure / 255.0) + (p.width / 4.0) - 0.5 * ((p.speed / 4.0) / 50.0)
    }

    // Shading goes into the color rather than the opacity: overlapping
    // round caps would otherwise darken every joint.
    fn color_at(&self, p: &Point, _last_width: f64) -> Rgb {
        let intensity = (0.1 * -((p.speed / 4.0) / 35.0)) + (1.2 * p.pressure / 255.0) + 0.5;
        let intensity = clamp01(intensity);
        Rgb::gray(((intensity - 1.0).abs() * 255.0).trunc().min(60.0))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Marker(PenBase);

impl Marker {
    pub fn new(width: f64, color: Rgb) -> Self {
        Self(PenBase::new("Marker", width, color).segment_length(3))
    }
}

impl PenStyle for Marker {
    fn base(&self) -> &PenBase {
        &self.0
    }

    fn width_at(&self, p: &Point, last_width: f64) -> f64 {
        0.9 * ((p.width / 4.0) - 0.4 * direction_to_tilt(p.direction)) + (0.1 * last_width)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pencil(PenBase);

impl Pencil {
    pub fn new(width: f64, color: Rgb) -> Self {
        Self(PenBase::new("Pencil", width, color).segment_length(2))
    }
}

impl PenStyle for Pencil {
    fn base(&self) -> &PenBase {
        &self.0
    }

    fn width_at(&self, p: &Point, _last_width: f64) -> f64 {
        let base = self.0.width;
        let tilt = direction_to_tilt(p.direction).max(0.0);
        let width = 0.7
            * ((((0.8 * base) + (0.5 * p.pressure / 255.0)) * (p.width / 4.0))
                - (0.25 * tilt.powf(1.8))
                - (0.6 * (p.speed / 4.0) / 50.0));
        width.min(base * 10.0)
    }

    fn opacity_at(&self, p: &Point, _last_width: f64) -> f64 {
        let opacity = (0.1 * -((p.speed / 4.0) / 35.0)) + (p.pressure / 255.0);
        clamp01(opacity) - 0.1
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MechanicalPencil(PenBase);

impl MechanicalPencil {
    pub fn new(width: f64, color: Rgb) -> Self {
        Self(PenBase::new("Mechanical Pencil", width * width, color).opacity(0.7))
    }
}

impl PenStyle for MechanicalPencil {
    fn base(&self) -> &PenBase {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Brush(PenBase);

impl Brush {
    pub fn new(width: f64, color: Rgb) -> Self {
        Self(PenBase::new("Brush", width, color).segment_length(2))
    }
}

impl PenStyle for Brush {
    fn base(&self) -> &PenBase {
        &self.0
    }

    fn width_at(&self, p: &Point, _last_width: f64) -> f64 {
        0.7 * (((1.0 + (1.4 * p.pressure / 255.0)) * (p.width / 4.0))
            - (0.5 * direction_to_tilt(p.direction))
            - ((p.speed / 4.0) / 50.0))
    }

    fn color_at(&self, p: &Point, _last_width: f64) -> Rgb {
        let pressure = (p.pressure / 255.0).max(0.0);
        let intensity = (pressure.powf(1.5) - 0.2 * ((p.speed / 4.0) / 50.0)) * 1.5;
        let rev = (clamp01(intensity) - 1.0).abs();
        let Rgb(r, g, b) = self.0.color;
        Rgb(
            channel(rev * (255.0 - r as f64)),
            channel(rev * (255.0 - g as f64)),
            channel(rev * (255.0 - b as f64)),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Highlighter(PenBase);

impl Highlighter {
    pub const WIDTH: f64 = 15.0;

    pub fn new(color: Rgb) -> Self {
        Self(
            PenBase::new("Highlighter", Self::WIDTH, color)
                .linecap(LineCap::Square)
                .opacity(0.3),
        )
    }
}

impl PenStyle for Highlighter {
    fn base(&self) -> &PenBase {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shader(PenBase);

impl Shader {
    pub const WIDTH: f64 = 12.0;

    pub fn new(color: Rgb) -> Self {
        Self(PenBase::new("Shader", Self::WIDTH, color).opacity(0.1))
    }
}

impl PenStyle for Shader {
    fn base(&self) -> &PenBase {
        &self.0
    }
}

/// Erasing is drawn as a white overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct Eraser(PenBase);

impl Eraser {
    pub fn new(width: f64) -> Self {
        Self(PenBase::new("Eraser", width * 2.0, PenColor::White.rgb()).linecap(LineCap::Square))
    }
}

impl PenStyle for Eraser {
    fn base(&self) -> &PenBase {
        &self.0
    }
}

/// Area erasure leaves no visible ink.
#[derive(Clone, Debug, PartialEq)]
pub struct EraseArea(PenBase);

impl EraseArea {
    pub fn new(width: f64, color: Rgb) -> Self {
        Self(
            PenBase::new("Erase Area", width, color)
                .linecap(LineCap::Square)
                .opacity(0.0),
        )
    }
}

impl PenStyle for EraseArea {
    fn base(&self) -> &PenBase {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Calligraphy(PenBase);

impl Calligraphy {
    pub fn new(width: f64, color: Rgb) -> Self {
        Self(PenBase::new("Calligraphy", width, color).segment_length(2))
    }
}

impl PenStyle for Calligraphy {
    fn base(&self) -> &PenBase {
        &self.0
    }

    fn width_at(&self, p: &Point, last_width: f64) -> f64 {
        0.9 * (((1.0 + p.pressure / 255.0) * (p.width / 4.0))
            - 0.3 * direction_to_tilt(p.direction))
            + (0.1 * last_width)
    }
}

// ============================================================================
// Pen
// ============================================================================

/// A pen of any family, chosen once per stroke.
#[enum_dispatch(PenStyle)]
#[derive(Clone, Debug, PartialEq)]
pub enum Pen {
    Fineliner,
    Ballpoint,
    Marker,
    Pencil,
    MechanicalPencil,
    Brush,
    Highlighter,
    Shader,
    Eraser,
    EraseArea,
    Calligraphy,
}

impl Pen {
    /// Pick the pen family for a raw tool code.
    ///
    /// Unknown color codes draw in black; callers that want to report them
    /// check [`PenColor::from_code`] themselves.
    pub fn create(tool: u32, color: u32, thickness_scale: f64) -> Result<Pen, PenError> {
        let tool = Tool::try_from(tool)?;
        let rgb = PenColor::from_code(color).map_or(Rgb::BLACK, PenColor::rgb);
        Ok(Pen::for_tool(tool, rgb, thickness_scale))
    }

    pub fn for_tool(tool: Tool, color: Rgb, width: f64) -> Pen {
        match tool {
            Tool::Paintbrush1 | Tool::Paintbrush2 => Brush::new(width, color).into(),
            Tool::Calligraphy => Calligraphy::new(width, color).into(),
            Tool::Marker1 | Tool::Marker2 => Marker::new(width, color).into(),
            Tool::Ballpoint1 | Tool::Ballpoint2 => Ballpoint::new(width, color).into(),
            Tool::Fineliner1 | Tool::Fineliner2 => Fineliner::new(width, color).into(),
            Tool::Pencil1 | Tool::Pencil2 => Pencil::new(width, color).into(),
            Tool::MechanicalPencil1 | Tool::MechanicalPencil2 => {
                MechanicalPencil::new(width, color).into()
            }
            Tool::Highlighter1 | Tool::Highlighter2 => Highlighter::new(color).into(),
            Tool::Shader => Shader::new(color).into(),
            Tool::EraserArea => EraseArea::new(width, color).into(),
            Tool::Eraser => Eraser::new(width).into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.base().name
    }

    pub fn linecap(&self) -> LineCap {
        self.base().linecap
    }
}
