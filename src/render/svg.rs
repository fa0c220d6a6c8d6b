//! SVG generation
//!
//! Output is written straight to the caller's sink. Groups become nested
//! `<g>` elements carrying their anchor translation, strokes become one
//! `<polyline>` per segment and text paragraphs become `<text>` elements.

use std::io::Write;

use glam::DVec2;

use super::context::RenderContext;
use super::stroke::segments;
use super::{RenderOptions, bounding_box};
use crate::errors::{RenderError, Warning};
use crate::pen::{Pen, Tool};
use crate::scene::{CrdtId, Group, Line, SceneItem, SceneTree, Text};
use crate::types::{BoundingBox, Scaler, fmt_coord, fmt_num};

const TEXT_STYLE: &str = r#"
		<style>
			text.heading {
				font: 14pt serif;
			}
			text.bold {
				font: 8pt sans-serif bold;
			}
			text, text.plain {
				font: 7pt sans-serif;
			}
		</style>
"#;

/// Render `tree` as an SVG document into `out`.
///
/// Returns the conditions that were worked around. Only a structurally
/// broken tree (an anchor without its origin) fails the render.
pub fn tree_to_svg<W: Write>(
    tree: &SceneTree,
    out: &mut W,
    options: &RenderOptions,
) -> Result<Vec<Warning>, RenderError> {
    let mut ctx = RenderContext::new(tree, options);
    let scaler = options.scaler;

    let bounds = bounding_box(&tree.root, &mut ctx, BoundingBox::page())?;
    crate::log::debug!(
        x_min = bounds.x_min,
        x_max = bounds.x_max,
        y_min = bounds.y_min,
        y_max = bounds.y_max,
        "page bounds"
    );

    write_header(out, &bounds, &scaler)?;
    writeln!(out, "\t<g id=\"p1\" style=\"display:inline\">")?;

    if let Some(text) = &tree.root_text {
        draw_text(text, out, &mut ctx)?;
    }

    draw_group(&tree.root, out, &mut ctx)?;

    writeln!(out, "\t</g>")?;
    writeln!(out, "</svg>")?;

    Ok(ctx.warnings)
}

fn write_header<W: Write>(
    out: &mut W,
    bounds: &BoundingBox,
    scaler: &Scaler,
) -> Result<(), RenderError> {
    let width = fmt_coord(scaler.len(bounds.width() + 1.0));
    let height = fmt_coord(scaler.len(bounds.height() + 1.0));
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" height="{height}" width="{width}""#
    )?;
    writeln!(
        out,
        r#" viewBox="{} {} {width} {height}">"#,
        fmt_coord(scaler.len(bounds.x_min)),
        fmt_coord(scaler.len(bounds.y_min)),
    )?;
    Ok(())
}

/// Draw the root text, one `<text>` per non-empty paragraph.
///
/// Paragraphs sit where the anchor layout put them, so anchored ink lines up
/// with the words.
fn draw_text<W: Write>(
    text: &Text,
    out: &mut W,
    ctx: &mut RenderContext<'_>,
) -> Result<(), RenderError> {
    let scaler = ctx.options.scaler;
    writeln!(out, "\t\t<g class=\"root-text\" style=\"display:inline\">")?;
    out.write_all(TEXT_STYLE.as_bytes())?;

    for placed in ctx.place_text(text) {
        writeln!(
            out,
            "\t\t\t<text x=\"{}\" y=\"{}\" class=\"{}\">{}</text>",
            fmt_coord(scaler.len(placed.x)),
            fmt_coord(scaler.len(placed.y)),
            placed.style.class_name(),
            html_escape::encode_text(&placed.content),
        )?;
    }

    writeln!(out, "\t\t</g>")?;
    Ok(())
}

/// XML id of a group element. Ids may not start with a digit or hold a colon.
fn element_id(id: CrdtId) -> String {
    format!("g{}-{}", id.0, id.1)
}

fn is_highlighter(item: &SceneItem) -> bool {
    match item {
        SceneItem::Line(line) => Tool::try_from(line.tool).is_ok_and(Tool::is_highlighter),
        _ => false,
    }
}

/// Draw `group` and everything below it.
///
/// Highlighter strokes of the group go first so that they sit under its ink.
/// Everything else keeps child order.
fn draw_group<W: Write>(
    group: &Group,
    out: &mut W,
    ctx: &mut RenderContext<'_>,
) -> Result<(), RenderError> {
    let offset = ctx.anchor_offset(group)?;
    let offset = ctx.options.scaler.point(offset);
    writeln!(
        out,
        "\t\t<g id=\"{}\" transform=\"translate({}, {})\">",
        element_id(group.node_id),
        fmt_coord(offset.x),
        fmt_coord(offset.y),
    )?;

    let (under, over): (Vec<_>, Vec<_>) =
        group.children.iter().partition(|(_, child)| is_highlighter(child));

    for (id, child) in under.into_iter().chain(over) {
        writeln!(out, "\t\t<!-- child {id} -->")?;
        match child {
            SceneItem::Group(g) => draw_group(g, out, ctx)?,
            SceneItem::Line(line) => {
                if let Some(pen) = ctx.pen_for(*id, line) {
                    draw_stroke(line, &pen, out, ctx.options)?;
                }
            }
            SceneItem::GlyphRange(_) => {
                crate::log::trace!(item = %id, "glyph range has no drawing");
            }
            SceneItem::Unsupported { kind } => {
                ctx.warn(Warning::UnsupportedItem {
                    item: *id,
                    kind: kind.clone(),
                });
            }
        }
    }

    writeln!(out, "\t\t</g>")?;
    Ok(())
}

fn draw_stroke<W: Write>(
    line: &Line,
    pen: &Pen,
    out: &mut W,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let scaler = options.scaler;
    crate::log::trace!(pen = pen.name(), points = line.points.len(), "stroke");

    for segment in segments(line, pen) {
        let points = segment
            .points
            .iter()
            .map(|p| format_point(scaler.point(*p)))
            .collect::<Vec<_>>()
            .join(" ");
        write!(
            out,
            "\t\t\t<polyline style=\"fill:none;stroke:{};stroke-width:{};opacity:{}\"",
            segment.style.color,
            fmt_coord(scaler.len(segment.style.width)),
            fmt_num(segment.style.opacity),
        )?;
        writeln!(
            out,
            " stroke-linecap=\"{}\" points=\"{}\" />",
            pen.linecap().as_str(),
            points,
        )?;
    }
    Ok(())
}

fn format_point(p: DVec2) -> String {
    format!("{},{}", fmt_coord(p.x), fmt_coord(p.y))
}

/// Render to an owned string.
pub fn tree_to_svg_string(
    tree: &SceneTree,
    options: &RenderOptions,
) -> Result<(String, Vec<Warning>), RenderError> {
    let mut buf = Vec::new();
    let warnings = tree_to_svg(tree, &mut buf, options)?;
    // Everything written above is built from `str`s
    let svg = String::from_utf8_lossy(&buf).into_owned();
    Ok((svg, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AnchorRef, Paragraph, ParagraphStyle, Point, TextRun};

    fn render(tree: &SceneTree) -> (String, Vec<Warning>) {
        tree_to_svg_string(tree, &RenderOptions::default()).unwrap()
    }

    fn six_point_pencil() -> Line {
        Line::new(
            1,
            0,
            2.0,
            (0..6).map(|i| Point::at(226.0 * i as f64, 0.0)).collect(),
        )
    }

    #[test]
    fn header_covers_the_page() {
        let (svg, warnings) = render(&SceneTree::new(Group::new(CrdtId(0, 1))));
        assert!(warnings.is_empty());
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg "));
        // (1404 + 1) * 72 / 226 and (1872 + 1) * 72 / 226
        assert!(svg.contains(r#"height="596.708" width="447.611""#), "{svg}");
        assert!(svg.contains(r#"viewBox="-223.646 0.000 447.611 596.708""#), "{svg}");
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn pencil_line_renders_three_joined_polylines() {
        let root = Group::new(CrdtId(0, 1)).with_child(CrdtId(0, 2), six_point_pencil());
        let (svg, _) = render(&SceneTree::new(root));
        let polylines: Vec<_> = svg.lines().filter(|l| l.contains("<polyline")).collect();
        assert_eq!(polylines.len(), 3);
        assert!(polylines[0].contains(r#"points="0.000,0.000 72.000,0.000""#));
        assert!(polylines[1].contains(r#"points="72.000,0.000 144.000,0.000 216.000,0.000""#));
        assert!(polylines[2].contains(r#"points="216.000,0.000 288.000,0.000 360.000,0.000""#));
        assert!(polylines[0].contains(r#"stroke-linecap="round""#));
    }

    #[test]
    fn empty_line_draws_nothing() {
        let root = Group::new(CrdtId(0, 1)).with_child(CrdtId(0, 2), Line::new(2, 0, 1.0, vec![]));
        let (svg, _) = render(&SceneTree::new(root));
        assert!(!svg.contains("<polyline"));
        assert!(svg.contains("<!-- child 0:2 -->"));
    }

    #[test]
    fn anchored_group_is_translated() {
        let text = Text::new(
            0.0,
            0.0,
            vec![Paragraph::new(
                ParagraphStyle::Plain,
                CrdtId(1, 1),
                vec![TextRun::sequential("hi", 1, 2)],
            )],
        );
        let child = Group::new(CrdtId(0, 3)).with_anchor(AnchorRef::new(CrdtId(1, 2), 226.0));
        let root = Group::new(CrdtId(0, 1)).with_child(CrdtId(0, 3), child);
        let (svg, _) = render(&SceneTree::new(root).with_text(text));
        // y = (-88 + 71) * 72 / 226
        assert!(
            svg.contains(r#"<g id="g0-3" transform="translate(72.000, -5.416)">"#),
            "{svg}"
        );
        assert!(svg.contains(r#"<g id="g0-1" transform="translate(0.000, 0.000)">"#));
    }

    #[test]
    fn text_paragraphs_are_escaped_and_classed() {
        let text = Text::new(
            0.0,
            0.0,
            vec![
                Paragraph::new(
                    ParagraphStyle::Heading,
                    CrdtId(1, 1),
                    vec![TextRun::sequential("a < b", 1, 2)],
                ),
                Paragraph::new(
                    ParagraphStyle::Plain,
                    CrdtId(1, 9),
                    vec![TextRun::sequential("   ", 1, 10)],
                ),
                Paragraph::new(
                    ParagraphStyle::Other(0),
                    CrdtId(1, 20),
                    vec![TextRun::sequential("odd", 1, 21)],
                ),
            ],
        );
        let (svg, warnings) = render(&SceneTree::new(Group::new(CrdtId(0, 1))).with_text(text));
        assert!(svg.contains(r#"class="heading">a &lt; b</text>"#), "{svg}");
        assert_eq!(svg.matches("<text ").count(), 2);
        assert!(svg.contains(r#"class="plain">odd</text>"#));
        assert_eq!(warnings, vec![Warning::UnknownParagraphStyle { code: 0 }]);
    }

    #[test]
    fn highlighters_are_drawn_under_ink() {
        let ink = Line::new(4, 0, 1.0, vec![Point::at(0.0, 0.0), Point::at(10.0, 0.0)]);
        let marker = Line::new(18, 3, 1.0, vec![Point::at(0.0, 0.0), Point::at(10.0, 0.0)]);
        let nested = Group::new(CrdtId(0, 4)).with_child(CrdtId(0, 5), marker.clone());
        let root = Group::new(CrdtId(0, 1))
            .with_child(CrdtId(0, 2), ink)
            .with_child(CrdtId(0, 3), marker)
            .with_child(CrdtId(0, 4), nested);
        let (svg, _) = render(&SceneTree::new(root));

        let order: Vec<&str> = svg
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with("<!-- child"))
            .collect();
        assert_eq!(
            order,
            vec![
                "<!-- child 0:3 -->",
                "<!-- child 0:2 -->",
                "<!-- child 0:4 -->",
                "<!-- child 0:5 -->",
            ]
        );
        let caps: Vec<bool> = svg
            .lines()
            .filter(|l| l.contains("<polyline"))
            .map(|l| l.contains(r#"stroke-linecap="square""#))
            .collect();
        assert_eq!(caps, vec![true, false, true]);
    }

    #[test]
    fn group_ids_are_valid_xml_ids() {
        assert_eq!(element_id(CrdtId(0, 11)), "g0-11");
        let root = Group::new(CrdtId(2, 7));
        let (svg, _) = render(&SceneTree::new(root));
        assert!(svg.contains(r#"<g id="g2-7" "#));
        assert!(!svg.contains(r#"id="2:7""#));
    }

    #[test]
    fn unsupported_items_are_skipped_with_a_warning() {
        let root = Group::new(CrdtId(0, 1)).with_child(
            CrdtId(0, 2),
            SceneItem::Unsupported {
                kind: "image".to_string(),
            },
        );
        let (svg, warnings) = render(&SceneTree::new(root));
        assert!(svg.contains("</svg>"));
        assert_eq!(
            warnings,
            vec![Warning::UnsupportedItem {
                item: CrdtId(0, 2),
                kind: "image".to_string()
            }]
        );
    }

    #[test]
    fn missing_origin_fails_the_render() {
        let mut anchor = AnchorRef::new(CrdtId(1, 1), 0.0);
        anchor.origin_x = None;
        let root = Group::new(CrdtId(0, 1))
            .with_child(CrdtId(0, 2), Group::new(CrdtId(0, 2)).with_anchor(anchor));
        let err = tree_to_svg_string(&SceneTree::new(root), &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::MissingAnchorOrigin { .. }));
    }
}
