//! Render handwriting scene trees to SVG, JSON and Markdown.
//!
//! A [`SceneTree`] is what a notebook page decodes to: nested groups of ink
//! strokes, a block of typed text, and highlights. Groups can be anchored to
//! characters of the text, so every output starts by laying the text out
//! (see [`anchors`]).
//!
//! The functions at the crate root render with default options and turn any
//! failure into a [`miette::Report`]. The module-level functions take options,
//! write into a caller-supplied sink and return the warnings gathered along
//! the way.

pub mod anchors;
pub mod errors;
pub mod log;
pub mod markdown;
pub mod pen;
pub mod render;
pub mod scene;
pub mod types;

pub use errors::{PenError, RenderError, ScaleError, Warning};
pub use markdown::{ExtractOptions, write_markdown};
pub use render::{MissingTool, RenderOptions, UnresolvedAnchor, tree_to_json, tree_to_svg};
pub use scene::{
    AnchorRef, CrdtId, GlyphRange, Group, Line, Paragraph, ParagraphStyle, Point, SceneItem,
    SceneTree, Text, TextRun,
};

/// Render a scene tree to SVG.
///
/// Warnings are logged and otherwise dropped; use [`render::tree_to_svg`] to
/// inspect them.
pub fn render_svg(tree: &SceneTree) -> Result<String, miette::Report> {
    let (svg, _warnings) = render::svg::tree_to_svg_string(tree, &RenderOptions::default())?;
    Ok(svg)
}

/// Render a scene tree as a JSON page object.
pub fn render_json(tree: &SceneTree, page_number: u32) -> Result<String, miette::Report> {
    let mut buf = Vec::new();
    tree_to_json(tree, page_number, &mut buf, &RenderOptions::default())?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Extract the text and highlights of a scene tree as Markdown.
pub fn render_markdown(tree: &SceneTree) -> Result<String, miette::Report> {
    let mut buf = Vec::new();
    write_markdown(tree, &mut buf, &ExtractOptions::default())?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
