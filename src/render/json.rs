//! JSON page export
//!
//! A flattened view of the page: every stroke segment as a polyline in
//! absolute output coordinates, plus the non-empty text paragraphs. Values
//! are rounded to three decimals.

use std::io::Write;

use glam::DVec2;
use serde::Serialize;

use super::context::RenderContext;
use super::stroke::segments;
use super::{RenderOptions, bounding_box};
use crate::errors::{RenderError, Warning};
use crate::scene::{Group, SceneItem, SceneTree, Text};
use crate::types::BoundingBox;

const DECIMAL_PRECISION: i32 = 3;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
    pub page_number: u32,
    pub width: f64,
    pub height: f64,
    pub lines: Vec<PolyLine>,
    pub texts: Vec<TextElement>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PolyLine {
    /// CSS color, `rgb(r, g, b)`
    pub stroke: String,
    pub width: f64,
    pub opacity: f64,
    pub points: Vec<JsonPoint>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct JsonPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextElement {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

fn round(v: f64) -> f64 {
    let factor = 10f64.powi(DECIMAL_PRECISION);
    let r = (v * factor).round() / factor;
    // normalise -0.0
    if r == 0.0 { 0.0 } else { r }
}

impl JsonPoint {
    fn new(p: DVec2) -> Self {
        Self {
            x: round(p.x),
            y: round(p.y),
        }
    }
}

/// Build the page object for `tree` without serializing it.
pub fn build_page(
    tree: &SceneTree,
    page_number: u32,
    options: &RenderOptions,
) -> Result<(Page, Vec<Warning>), RenderError> {
    let mut ctx = RenderContext::new(tree, options);
    let scaler = options.scaler;

    let bounds = bounding_box(&tree.root, &mut ctx, BoundingBox::page())?;
    let mut page = Page {
        page_number,
        width: round(scaler.len(bounds.width() + 1.0)),
        height: round(scaler.len(bounds.height() + 1.0)),
        lines: Vec::new(),
        texts: Vec::new(),
    };

    if let Some(text) = &tree.root_text {
        collect_texts(text, &mut page.texts, &mut ctx);
    }
    collect_lines(&tree.root, DVec2::ZERO, &mut page.lines, &mut ctx)?;

    crate::log::debug!(
        lines = page.lines.len(),
        texts = page.texts.len(),
        "json page"
    );
    Ok((page, ctx.warnings))
}

/// Serialize `tree` as a JSON page object into `out`.
pub fn tree_to_json<W: Write>(
    tree: &SceneTree,
    page_number: u32,
    out: &mut W,
    options: &RenderOptions,
) -> Result<Vec<Warning>, RenderError> {
    let (page, warnings) = build_page(tree, page_number, options)?;
    serde_json::to_writer(&mut *out, &page)?;
    Ok(warnings)
}

fn collect_texts(text: &Text, out: &mut Vec<TextElement>, ctx: &mut RenderContext<'_>) {
    let scaler = ctx.options.scaler;
    out.extend(ctx.place_text(text).into_iter().map(|placed| TextElement {
        x: round(scaler.len(placed.x)),
        y: round(scaler.len(placed.y)),
        text: placed.content,
    }));
}

/// `origin` is the accumulated translation of `group`'s parent, device units.
fn collect_lines(
    group: &Group,
    origin: DVec2,
    out: &mut Vec<PolyLine>,
    ctx: &mut RenderContext<'_>,
) -> Result<(), RenderError> {
    let origin = origin + ctx.anchor_offset(group)?;
    let scaler = ctx.options.scaler;

    for (id, child) in &group.children {
        match child {
            SceneItem::Group(g) => collect_lines(g, origin, out, ctx)?,
            SceneItem::Line(line) => {
                let Some(pen) = ctx.pen_for(*id, line) else {
                    continue;
                };
                out.extend(segments(line, &pen).into_iter().map(|seg| PolyLine {
                    stroke: seg.style.color.to_string(),
                    width: round(scaler.len(seg.style.width)),
                    opacity: round(seg.style.opacity),
                    points: seg
                        .points
                        .iter()
                        .map(|p| JsonPoint::new(scaler.point(origin + *p)))
                        .collect(),
                }));
            }
            SceneItem::GlyphRange(_) => {}
            SceneItem::Unsupported { kind } => {
                ctx.warn(Warning::UnsupportedItem {
                    item: *id,
                    kind: kind.clone(),
                });
            }
        }
    }
    Ok(())
}
