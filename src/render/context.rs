//! Rendering context - state shared by every walk over one tree

use glam::DVec2;

use crate::anchors::{
    AnchorOffset, AnchorPositions, anchor_offset, layout_paragraphs, resolve_anchors,
};
use crate::errors::{RenderError, Warning, record_warning};
use crate::pen::{Fineliner, Pen, PenColor};
use crate::scene::{CrdtId, Group, Line, ParagraphStyle, SceneTree, Text};
use crate::types::Rgb;

use super::{MissingTool, RenderOptions, UnresolvedAnchor};

/// A paragraph ready to be drawn, in device units.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedText {
    pub style: ParagraphStyle,
    pub x: f64,
    pub y: f64,
    pub content: String,
}

/// Rendering context
pub struct RenderContext<'o> {
    /// Resolved anchor positions for the tree being rendered
    pub anchors: AnchorPositions,
    pub options: &'o RenderOptions,
    /// Conditions worked around so far, without duplicates
    pub warnings: Vec<Warning>,
}

impl<'o> RenderContext<'o> {
    pub fn new(tree: &SceneTree, options: &'o RenderOptions) -> Self {
        Self {
            anchors: resolve_anchors(tree.root_text.as_ref()),
            options,
            warnings: Vec::new(),
        }
    }

    /// Record a recoverable condition once.
    pub fn warn(&mut self, warning: Warning) {
        record_warning(&mut self.warnings, warning);
    }

    /// Non-empty paragraphs of `text` with their trimmed content and device
    /// position. Unknown styles are reported here.
    pub fn place_text(&mut self, text: &Text) -> Vec<PlacedText> {
        let mut placed = Vec::new();
        for (paragraph, y) in layout_paragraphs(text) {
            if let ParagraphStyle::Other(code) = paragraph.style {
                self.warn(Warning::UnknownParagraphStyle { code });
            }
            let content = paragraph.content();
            let content = content.trim();
            if content.is_empty() {
                continue;
            }
            placed.push(PlacedText {
                style: paragraph.style,
                x: text.pos_x,
                y,
                content: content.to_string(),
            });
        }
        placed
    }

    /// Translation of `group` relative to its parent, with the configured
    /// fallback for targets that have no position.
    pub fn anchor_offset(&mut self, group: &Group) -> Result<DVec2, RenderError> {
        let offset = anchor_offset(group, &self.anchors)?;
        crate::log::trace!(group = %group.node_id, ?offset, "group anchor");
        if let AnchorOffset::Unresolved { target, .. } = offset {
            self.warn(Warning::UnresolvedAnchor {
                group: group.node_id,
                target,
            });
        }
        let fallback_y = match self.options.unresolved_anchor {
            UnresolvedAnchor::Origin => 0.0,
            UnresolvedAnchor::PageTop => self
                .anchors
                .get(&CrdtId::PAGE_TOP)
                .copied()
                .unwrap_or(0.0),
        };
        Ok(offset.or_fallback(fallback_y))
    }

    /// The pen to draw `line` with, or `None` when it should be skipped.
    pub fn pen_for(&mut self, item: CrdtId, line: &Line) -> Option<Pen> {
        if PenColor::from_code(line.color).is_none() {
            self.warn(Warning::UnknownColor { code: line.color });
        }
        match Pen::create(line.tool, line.color, line.thickness_scale) {
            Ok(pen) => Some(pen),
            Err(_) => {
                self.warn(Warning::UnknownTool {
                    item,
                    code: line.tool,
                });
                match self.options.missing_tool {
                    MissingTool::Fallback => {
                        let color =
                            PenColor::from_code(line.color).map_or(Rgb::BLACK, PenColor::rgb);
                        Some(Fineliner::new(line.thickness_scale, color).into())
                    }
                    MissingTool::Skip => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::AnchorRef;
    use glam::dvec2;

    fn anchored_to_nowhere() -> Group {
        Group::new(CrdtId(0, 7)).with_anchor(AnchorRef::new(CrdtId(4, 4), 25.0))
    }

    #[test]
    fn unresolved_anchor_warns_once() {
        let tree = SceneTree::new(Group::new(CrdtId(0, 1)));
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&tree, &options);
        let group = anchored_to_nowhere();
        assert_eq!(ctx.anchor_offset(&group).unwrap(), dvec2(25.0, 0.0));
        assert_eq!(ctx.anchor_offset(&group).unwrap(), dvec2(25.0, 0.0));
        assert_eq!(
            ctx.warnings,
            vec![Warning::UnresolvedAnchor {
                group: CrdtId(0, 7),
                target: CrdtId(4, 4)
            }]
        );
    }

    #[test]
    fn page_top_fallback_uses_sentinel() {
        let tree = SceneTree::new(Group::new(CrdtId(0, 1)));
        let options = RenderOptions::default().unresolved_anchor(UnresolvedAnchor::PageTop);
        let mut ctx = RenderContext::new(&tree, &options);
        let offset = ctx.anchor_offset(&anchored_to_nowhere()).unwrap();
        assert_eq!(offset, dvec2(25.0, super::super::defaults::SENTINEL_Y));
    }

    #[test]
    fn unknown_tool_falls_back_or_skips() {
        let tree = SceneTree::new(Group::new(CrdtId(0, 1)));
        let line = Line::new(99, 6, 2.0, vec![]);

        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&tree, &options);
        let pen = ctx.pen_for(CrdtId(0, 2), &line).unwrap();
        assert_eq!(pen.name(), "Fineliner");
        assert_eq!(
            ctx.warnings,
            vec![Warning::UnknownTool {
                item: CrdtId(0, 2),
                code: 99
            }]
        );

        let options = RenderOptions::default().missing_tool(MissingTool::Skip);
        let mut ctx = RenderContext::new(&tree, &options);
        assert!(ctx.pen_for(CrdtId(0, 2), &line).is_none());
    }

    #[test]
    fn placed_text_skips_blank_paragraphs() {
        use crate::scene::{Paragraph, TextRun};

        let text = Text::new(
            10.0,
            100.0,
            vec![
                Paragraph::new(
                    ParagraphStyle::Bold,
                    CrdtId(1, 1),
                    vec![TextRun::sequential(" hi ", 1, 1)],
                ),
                Paragraph::new(ParagraphStyle::Plain, CrdtId(1, 9), vec![]),
                Paragraph::new(
                    ParagraphStyle::Other(9),
                    CrdtId(1, 20),
                    vec![TextRun::sequential("odd", 1, 20)],
                ),
            ],
        );
        let tree = SceneTree::new(Group::new(CrdtId(0, 1)));
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&tree, &options);
        let placed = ctx.place_text(&text);
        assert_eq!(
            placed,
            vec![
                PlacedText {
                    style: ParagraphStyle::Bold,
                    x: 10.0,
                    y: 82.0,
                    content: "hi".to_string(),
                },
                PlacedText {
                    style: ParagraphStyle::Other(9),
                    x: 10.0,
                    y: 224.0,
                    content: "odd".to_string(),
                },
            ]
        );
        assert_eq!(ctx.warnings, vec![Warning::UnknownParagraphStyle { code: 9 }]);
    }

    #[test]
    fn unknown_color_is_reported() {
        let tree = SceneTree::new(Group::new(CrdtId(0, 1)));
        let options = RenderOptions::default();
        let mut ctx = RenderContext::new(&tree, &options);
        let pen = ctx.pen_for(CrdtId(0, 2), &Line::new(4, 77, 1.0, vec![])).unwrap();
        assert_eq!(pen.name(), "Fineliner");
        assert_eq!(ctx.warnings, vec![Warning::UnknownColor { code: 77 }]);
    }
}
