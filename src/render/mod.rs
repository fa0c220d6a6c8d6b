//! Rendering of scene trees
//!
//! This module is organized into submodules:
//! - `defaults`: Device geometry and text layout constants
//! - `context`: RenderContext shared by every walk over one tree
//! - `stroke`: Splitting strokes into styled segments
//! - `svg`: SVG generation
//! - `json`: JSON page export

pub mod context;
pub mod defaults;
pub mod json;
pub mod stroke;
pub mod svg;

pub use context::RenderContext;
pub use json::tree_to_json;
pub use stroke::{Segment, segments};
pub use svg::tree_to_svg;

use crate::errors::{RenderError, ScaleError};
use crate::scene::{Group, SceneItem};
use crate::types::{BoundingBox, Scaler};

use defaults::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Where a group goes when its anchor target has no known position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnresolvedAnchor {
    /// Vertical offset 0, i.e. the parent's origin.
    #[default]
    Origin,
    /// The position of the top-of-page sentinel.
    PageTop,
}

/// What to do with strokes drawn by a tool code we don't know.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingTool {
    /// Draw them as a fineliner in the stroke's own color and thickness.
    #[default]
    Fallback,
    Skip,
}

/// Options controlling rendering output
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderOptions {
    pub unresolved_anchor: UnresolvedAnchor,
    pub missing_tool: MissingTool,
    /// Device units to output units
    pub scaler: Scaler,
}

impl RenderOptions {
    pub fn unresolved_anchor(mut self, policy: UnresolvedAnchor) -> Self {
        self.unresolved_anchor = policy;
        self
    }

    pub fn missing_tool(mut self, policy: MissingTool) -> Self {
        self.missing_tool = policy;
        self
    }

    /// Output units per device unit, replacing the default 72/226.
    pub fn scale(mut self, ratio: f64) -> Result<Self, ScaleError> {
        self.scaler = Scaler::new(ratio)?;
        Ok(self)
    }
}

impl BoundingBox {
    /// One full device page, centred horizontally on the origin.
    pub fn page() -> BoundingBox {
        BoundingBox::new(
            -(SCREEN_WIDTH / 2.0).floor(),
            (SCREEN_WIDTH / 2.0).floor(),
            0.0,
            SCREEN_HEIGHT,
        )
    }
}

/// Extent of everything below `group`, in `group`'s coordinates, widened
/// from `default`.
///
/// Child groups are measured from a zero box and shifted by their own anchor
/// offset. Lines contribute their raw points.
pub fn bounding_box(
    group: &Group,
    ctx: &mut RenderContext<'_>,
    default: BoundingBox,
) -> Result<BoundingBox, RenderError> {
    let mut bounds = default;
    for child in group.children.values() {
        match child {
            SceneItem::Group(g) => {
                let offset = ctx.anchor_offset(g)?;
                let inner = bounding_box(g, ctx, BoundingBox::ZERO)?;
                bounds.expand_box(&inner.translated(offset));
            }
            SceneItem::Line(line) => {
                for p in &line.points {
                    bounds.expand_point(p.x, p.y);
                }
            }
            SceneItem::GlyphRange(_) | SceneItem::Unsupported { .. } => {}
        }
    }
    Ok(bounds)
}
