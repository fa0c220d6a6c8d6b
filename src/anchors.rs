//! Anchor resolution
//!
//! Groups may hang off a character of the root text. Their vertical position
//! comes from where that character's paragraph lands, so the text is laid out
//! once up front into an id → y map which every tree walk then consults.

use std::collections::{HashMap, HashSet};

use glam::{DVec2, dvec2};

use crate::errors::RenderError;
use crate::render::defaults::{SENTINEL_Y, TEXT_TOP_Y, line_height};
use crate::scene::{CrdtId, Group, Paragraph, SceneItem, Text};

/// Vertical position (device units) of every anchorable id.
pub type AnchorPositions = HashMap<CrdtId, f64>;

/// Lay out `text` and record the y position of each paragraph and character.
///
/// The page sentinels are always present. Each paragraph advances the cursor
/// by its line height before its ids are recorded.
pub fn resolve_anchors(text: Option<&Text>) -> AnchorPositions {
    let mut positions = AnchorPositions::new();
    positions.insert(CrdtId::PAGE_TOP, SENTINEL_Y);
    positions.insert(CrdtId::PAGE_BOTTOM, SENTINEL_Y);

    let Some(text) = text else {
        return positions;
    };

    for (paragraph, y) in layout_paragraphs(text) {
        positions.insert(paragraph.start_id, y);
        for run in &paragraph.runs {
            for id in &run.char_ids {
                positions.insert(*id, y);
            }
        }
    }

    positions
}

/// Paragraphs of `text` paired with the y position they are laid out at.
///
/// The cursor starts at the text origin shifted by [`TEXT_TOP_Y`], and each
/// paragraph advances it by its line height before being placed.
pub fn layout_paragraphs(text: &Text) -> impl Iterator<Item = (&Paragraph, f64)> + '_ {
    text.paragraphs
        .iter()
        .scan(text.pos_y + TEXT_TOP_Y, |y, paragraph| {
            *y += line_height(paragraph.style);
            Some((paragraph, *y))
        })
}

/// Result of looking up a group's anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnchorOffset {
    /// The group has no anchor and sits at its parent's origin.
    Unanchored,
    Resolved(DVec2),
    /// The target id has no known position.
    Unresolved { origin_x: f64, target: CrdtId },
}

impl AnchorOffset {
    /// Translation to apply, using `fallback_y` for unresolved targets.
    pub fn or_fallback(self, fallback_y: f64) -> DVec2 {
        match self {
            AnchorOffset::Unanchored => DVec2::ZERO,
            AnchorOffset::Resolved(offset) => offset,
            AnchorOffset::Unresolved { origin_x, .. } => dvec2(origin_x, fallback_y),
        }
    }
}

/// Look up where `group` is anchored.
///
/// The horizontal offset is the stored origin, unscaled. A group with an
/// anchor but no origin was built inconsistently and is rejected.
pub fn anchor_offset(
    group: &Group,
    positions: &AnchorPositions,
) -> Result<AnchorOffset, RenderError> {
    let Some(anchor) = &group.anchor else {
        return Ok(AnchorOffset::Unanchored);
    };
    let origin_x = anchor.origin_x.ok_or(RenderError::MissingAnchorOrigin {
        group: group.node_id,
        target: anchor.target,
    })?;
    Ok(match positions.get(&anchor.target) {
        Some(&y) => AnchorOffset::Resolved(dvec2(origin_x, y)),
        None => AnchorOffset::Unresolved {
            origin_x,
            target: anchor.target,
        },
    })
}

/// Every anchor target referenced anywhere below `group`, including itself.
pub fn collect_anchor_ids(group: &Group) -> HashSet<CrdtId> {
    fn walk(group: &Group, out: &mut HashSet<CrdtId>) {
        if let Some(anchor) = &group.anchor {
            out.insert(anchor.target);
        }
        for child in group.children.values() {
            if let SceneItem::Group(g) = child {
                walk(g, out);
            }
        }
    }
    let mut out = HashSet::new();
    walk(group, &mut out);
    out
}
