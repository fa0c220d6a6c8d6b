//! Markdown extraction
//!
//! Turns the root text into one markdown line per paragraph and gathers the
//! page's highlights into quoted blocks. Anchor targets can be marked inline
//! as `<<part1,part2>>` so that annotations can be traced back to the words
//! they hang off.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::Write;

use crate::anchors::collect_anchor_ids;
use crate::errors::{RenderError, Warning, record_warning};
use crate::render::defaults::HIGHLIGHT_JOIN_TOLERANCE;
use crate::scene::{CrdtId, GlyphRange, ParagraphStyle, SceneTree, Text};

/// Options controlling markdown extraction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Mark characters that groups are anchored to
    pub annotate_anchors: bool,
    /// Append a `# Highlights` section when the page has any
    pub include_highlights: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            annotate_anchors: false,
            include_highlights: true,
        }
    }
}

impl ExtractOptions {
    pub fn annotate_anchors(mut self, yes: bool) -> Self {
        self.annotate_anchors = yes;
        self
    }

    pub fn include_highlights(mut self, yes: bool) -> Self {
        self.include_highlights = yes;
        self
    }
}

/// Result of [`extract_document`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extracted {
    /// One formatted line per paragraph, newline terminated
    pub body: String,
    /// Quoted highlight blocks, empty when there are none
    pub highlights: String,
    pub warnings: Vec<Warning>,
}

/// Paragraph contents paired with their style.
///
/// With `anchor_ids`, a `<<part1,part2>>` marker is written in front of
/// every character whose id is in the set.
pub fn extract_lines(
    text: &Text,
    anchor_ids: Option<&HashSet<CrdtId>>,
) -> Vec<(ParagraphStyle, String)> {
    text.paragraphs
        .iter()
        .map(|paragraph| {
            let content = match anchor_ids {
                None => paragraph.content(),
                Some(ids) => {
                    let mut out = String::new();
                    for (c, id) in paragraph.chars() {
                        if let Some(id) = id.filter(|id| ids.contains(id)) {
                            let _ = write!(out, "<<{},{}>>", id.0, id.1);
                        }
                        out.push(c);
                    }
                    out
                }
            };
            (paragraph.style, content)
        })
        .collect()
}

/// Prefix `content` as markdown for its paragraph style.
pub fn format_line(style: ParagraphStyle, content: &str) -> String {
    match style {
        ParagraphStyle::Plain => content.to_string(),
        ParagraphStyle::Bullet => format!("- {content}"),
        ParagraphStyle::Bullet2 => format!("  + {content}"),
        ParagraphStyle::Bold => format!("> {content}"),
        ParagraphStyle::Heading => format!("# {content}"),
        ParagraphStyle::Checkbox => format!("- [ ] {content}"),
        ParagraphStyle::CheckboxChecked => format!("- [x] {content}"),
        ParagraphStyle::Other(code) => format!("[unknown format {code}] {content}"),
    }
}

/// Split highlights into passages.
///
/// A range joins the previous passage when it starts at most
/// [`HIGHLIGHT_JOIN_TOLERANCE`] characters after the previous range ends,
/// which includes ranges overlapping it. Ranges without an offset always
/// start a new passage.
pub fn group_highlights<'a>(ranges: &[&'a GlyphRange]) -> Vec<Vec<&'a GlyphRange>> {
    let mut blocks: Vec<Vec<&GlyphRange>> = Vec::new();
    let mut prev_end: Option<u32> = None;

    for &range in ranges {
        let joins = match (prev_end, range.start) {
            (Some(end), Some(start)) => {
                i64::from(start) - i64::from(end) <= i64::from(HIGHLIGHT_JOIN_TOLERANCE)
            }
            _ => false,
        };
        match blocks.last_mut() {
            Some(block) if joins => block.push(range),
            _ => blocks.push(vec![range]),
        }
        prev_end = range.end();
    }

    blocks
}

/// Quote every highlight, one blank line between passages.
pub fn format_highlights(ranges: &[&GlyphRange]) -> String {
    let blocks = group_highlights(ranges);
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for range in block {
            if range.text.is_empty() {
                out.push_str(">\n");
            }
            for line in range.text.lines() {
                out.push_str("> ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}

/// Extract the body text and highlights of `tree`.
pub fn extract_document(tree: &SceneTree, options: &ExtractOptions) -> Extracted {
    let mut extracted = Extracted::default();

    if let Some(text) = &tree.root_text {
        let anchor_ids = options
            .annotate_anchors
            .then(|| collect_anchor_ids(&tree.root));
        for (style, content) in extract_lines(text, anchor_ids.as_ref()) {
            if let ParagraphStyle::Other(code) = style {
                record_warning(
                    &mut extracted.warnings,
                    Warning::UnknownParagraphStyle { code },
                );
            }
            extracted.body.push_str(&format_line(style, &content));
            extracted.body.push('\n');
        }
    }

    if options.include_highlights {
        let ranges = tree.glyph_ranges();
        crate::log::debug!(ranges = ranges.len(), "highlights");
        extracted.highlights = format_highlights(&ranges);
    }

    extracted
}

/// Write `tree` as markdown into `out`.
///
/// The highlights section is only written when there is something in it.
pub fn write_markdown<W: Write>(
    tree: &SceneTree,
    out: &mut W,
    options: &ExtractOptions,
) -> Result<Vec<Warning>, RenderError> {
    let extracted = extract_document(tree, options);
    out.write_all(extracted.body.as_bytes())?;
    if !extracted.highlights.is_empty() {
        out.write_all(b"\n# Highlights\n\n")?;
        out.write_all(extracted.highlights.as_bytes())?;
    }
    Ok(extracted.warnings)
}
