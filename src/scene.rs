//! In-memory scene tree, as produced by the `.rm` decoder.
//!
//! The tree is built once and only read afterwards. Groups own their children;
//! anchors point at other nodes by [`CrdtId`] and are resolved through a
//! separate position map (see [`crate::anchors`]), never through references
//! into the tree.

use std::fmt;

use indexmap::IndexMap;

/// Opaque identifier naming a tree node, a text character or an anchor target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CrdtId(pub u64, pub u64);

impl CrdtId {
    /// Sentinel anchor target for the logical top of the page.
    pub const PAGE_TOP: CrdtId = CrdtId(0, 281_474_976_710_654);
    /// Sentinel anchor target for the logical bottom of the page.
    pub const PAGE_BOTTOM: CrdtId = CrdtId(0, 281_474_976_710_655);

    pub const fn new(part1: u64, part2: u64) -> Self {
        CrdtId(part1, part2)
    }
}

impl fmt::Display for CrdtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

/// Reference from a group to a position in the text.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorRef {
    /// Character or paragraph the group hangs off.
    pub target: CrdtId,
    pub anchor_type: Option<u8>,
    pub threshold: Option<f64>,
    /// Horizontal origin in device units. Required whenever the anchor is set.
    pub origin_x: Option<f64>,
}

impl AnchorRef {
    pub fn new(target: CrdtId, origin_x: f64) -> Self {
        Self {
            target,
            anchor_type: None,
            threshold: None,
            origin_x: Some(origin_x),
        }
    }
}

/// A node of the scene tree holding further items.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub node_id: CrdtId,
    pub children: IndexMap<CrdtId, SceneItem>,
    pub label: Option<String>,
    pub visible: bool,
    pub anchor: Option<AnchorRef>,
}

impl Group {
    pub fn new(node_id: CrdtId) -> Self {
        Self {
            node_id,
            children: IndexMap::new(),
            label: None,
            visible: true,
            anchor: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_anchor(mut self, anchor: AnchorRef) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Insert a child under `id`, replacing any earlier child with that id.
    pub fn push(&mut self, id: CrdtId, item: impl Into<SceneItem>) -> &mut Self {
        self.children.insert(id, item.into());
        self
    }

    /// Builder form of [`Group::push`].
    pub fn with_child(mut self, id: CrdtId, item: impl Into<SceneItem>) -> Self {
        self.push(id, item);
        self
    }
}

/// Anything that can hang off a [`Group`].
#[derive(Clone, Debug, PartialEq)]
pub enum SceneItem {
    Group(Group),
    Line(Line),
    GlyphRange(GlyphRange),
    /// Item kinds the decoder knows about but nothing here draws.
    Unsupported { kind: String },
}

impl SceneItem {
    pub fn kind(&self) -> &str {
        match self {
            SceneItem::Group(_) => "group",
            SceneItem::Line(_) => "line",
            SceneItem::GlyphRange(_) => "glyph-range",
            SceneItem::Unsupported { kind } => kind,
        }
    }
}

impl From<Group> for SceneItem {
    fn from(g: Group) -> Self {
        SceneItem::Group(g)
    }
}

impl From<Line> for SceneItem {
    fn from(l: Line) -> Self {
        SceneItem::Line(l)
    }
}

impl From<GlyphRange> for SceneItem {
    fn from(g: GlyphRange) -> Self {
        SceneItem::GlyphRange(g)
    }
}

/// One sample along a stroke. Units are already converted by the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    /// Pen tilt, encoded so that 255 is a full turn.
    pub direction: f64,
    pub width: f64,
    pub pressure: f64,
}

impl Point {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

/// An ink stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// Raw tool code; see [`crate::pen::Tool`].
    pub tool: u32,
    /// Raw color code; see [`crate::pen::PenColor`].
    pub color: u32,
    pub thickness_scale: f64,
    /// Points in drawing order.
    pub points: Vec<Point>,
}

impl Line {
    pub fn new(tool: u32, color: u32, thickness_scale: f64, points: Vec<Point>) -> Self {
        Self {
            tool,
            color,
            thickness_scale,
            points,
        }
    }
}

/// A highlighted span of the underlying text.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphRange {
    /// Character offset into the text stream, when the device recorded one.
    pub start: Option<u32>,
    pub length: u32,
    pub text: String,
    pub color: u32,
}

impl GlyphRange {
    pub fn new(start: u32, length: u32, text: impl Into<String>) -> Self {
        Self {
            start: Some(start),
            length,
            text: text.into(),
            color: 0,
        }
    }

    /// Offset one past the last highlighted character.
    pub fn end(&self) -> Option<u32> {
        self.start.map(|s| s.saturating_add(self.length))
    }
}

/// Paragraph style as stored on the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParagraphStyle {
    Plain,
    Heading,
    Bold,
    Bullet,
    Bullet2,
    Checkbox,
    CheckboxChecked,
    /// Any code outside the known set, kept so it can be reported.
    Other(u32),
}

impl ParagraphStyle {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => ParagraphStyle::Plain,
            2 => ParagraphStyle::Heading,
            3 => ParagraphStyle::Bold,
            4 => ParagraphStyle::Bullet,
            5 => ParagraphStyle::Bullet2,
            6 => ParagraphStyle::Checkbox,
            7 => ParagraphStyle::CheckboxChecked,
            other => ParagraphStyle::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ParagraphStyle::Plain => 1,
            ParagraphStyle::Heading => 2,
            ParagraphStyle::Bold => 3,
            ParagraphStyle::Bullet => 4,
            ParagraphStyle::Bullet2 => 5,
            ParagraphStyle::Checkbox => 6,
            ParagraphStyle::CheckboxChecked => 7,
            ParagraphStyle::Other(code) => code,
        }
    }

    /// Lowercase name, used as the SVG class of rendered paragraphs.
    pub fn class_name(self) -> &'static str {
        match self {
            ParagraphStyle::Plain => "plain",
            ParagraphStyle::Heading => "heading",
            ParagraphStyle::Bold => "bold",
            ParagraphStyle::Bullet => "bullet",
            ParagraphStyle::Bullet2 => "bullet2",
            ParagraphStyle::Checkbox => "checkbox",
            ParagraphStyle::CheckboxChecked => "checkbox_checked",
            ParagraphStyle::Other(_) => "plain",
        }
    }
}

/// A run of characters with one id per character.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub char_ids: Vec<CrdtId>,
}

impl TextRun {
    pub fn new(text: impl Into<String>, char_ids: Vec<CrdtId>) -> Self {
        Self {
            text: text.into(),
            char_ids,
        }
    }

    /// Builds a run whose character ids are `(part1, first..)`, consecutive.
    pub fn sequential(text: impl Into<String>, part1: u64, first: u64) -> Self {
        let text = text.into();
        let char_ids = (0..text.chars().count() as u64)
            .map(|i| CrdtId(part1, first + i))
            .collect();
        Self { text, char_ids }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub start_id: CrdtId,
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle, start_id: CrdtId, runs: Vec<TextRun>) -> Self {
        Self {
            style,
            start_id,
            runs,
        }
    }

    /// Concatenated text of all runs.
    pub fn content(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Characters paired with their ids, in order. Characters past the end of
    /// a run's id list get no id.
    pub fn chars(&self) -> impl Iterator<Item = (char, Option<CrdtId>)> + '_ {
        self.runs.iter().flat_map(|run| {
            run.text
                .chars()
                .enumerate()
                .map(|(i, c)| (c, run.char_ids.get(i).copied()))
        })
    }
}

/// The page's root text block.
#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub pos_x: f64,
    pub pos_y: f64,
    pub width: f64,
    pub paragraphs: Vec<Paragraph>,
}

impl Text {
    pub fn new(pos_x: f64, pos_y: f64, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            pos_x,
            pos_y,
            width: 0.0,
            paragraphs,
        }
    }
}

/// One page: a root group plus an optional root text.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneTree {
    pub root: Group,
    pub root_text: Option<Text>,
}

impl SceneTree {
    pub fn new(root: Group) -> Self {
        Self {
            root,
            root_text: None,
        }
    }

    pub fn with_text(mut self, text: Text) -> Self {
        self.root_text = Some(text);
        self
    }

    /// Highlighted ranges in depth-first document order.
    pub fn glyph_ranges(&self) -> Vec<&GlyphRange> {
        fn walk<'a>(group: &'a Group, out: &mut Vec<&'a GlyphRange>) {
            for child in group.children.values() {
                match child {
                    SceneItem::Group(g) => walk(g, out),
                    SceneItem::GlyphRange(r) => out.push(r),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }
}
