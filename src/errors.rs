//! Error and warning types with diagnostics using miette
//!
//! Only [`RenderError`] aborts a conversion. Everything in [`Warning`] is
//! absorbed with a fallback and reported next to the successful output.

use miette::Diagnostic;
use thiserror::Error;

use crate::scene::CrdtId;

// ============================================================================
// Fatal Errors
// ============================================================================

/// Errors that abort a conversion
#[derive(Error, Diagnostic, Debug)]
pub enum RenderError {
    #[error("group {group} is anchored to {target} but has no anchor origin")]
    #[diagnostic(
        code(rmrender::render::missing_anchor_origin),
        help("the decoder must set the horizontal origin whenever a group has an anchor")
    )]
    MissingAnchorOrigin { group: CrdtId, target: CrdtId },

    #[error("failed to write output")]
    #[diagnostic(code(rmrender::render::io))]
    Io(#[from] std::io::Error),

    #[error("failed to serialize page")]
    #[diagnostic(code(rmrender::render::json))]
    Json(#[from] serde_json::Error),
}

/// Errors from pen construction
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum PenError {
    #[error("unknown pen tool code: {code}")]
    #[diagnostic(code(rmrender::pen::unknown_tool))]
    UnknownTool { code: u32 },
}

/// Errors from configuring a render
#[derive(Error, Diagnostic, Debug, Clone, Copy, PartialEq)]
pub enum ScaleError {
    #[error("invalid output scale {ratio}")]
    #[diagnostic(
        code(rmrender::options::invalid_scale),
        help("the scale must be a finite ratio greater than zero")
    )]
    InvalidRatio { ratio: f64 },
}

// ============================================================================
// Recoverable Conditions
// ============================================================================

/// Conditions that were worked around during a conversion
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("group {group} is anchored to unknown target {target}")]
    #[diagnostic(code(rmrender::anchor::unresolved), severity(Warning))]
    UnresolvedAnchor { group: CrdtId, target: CrdtId },

    #[error("unknown pen tool code {code} on stroke {item}")]
    #[diagnostic(code(rmrender::pen::unknown_tool), severity(Warning))]
    UnknownTool { item: CrdtId, code: u32 },

    #[error("unknown pen color code {code}, using black")]
    #[diagnostic(code(rmrender::pen::unknown_color), severity(Warning))]
    UnknownColor { code: u32 },

    #[error("unknown paragraph style code {code}")]
    #[diagnostic(code(rmrender::text::unknown_style), severity(Warning))]
    UnknownParagraphStyle { code: u32 },

    #[error("skipped unsupported {kind} item {item}")]
    #[diagnostic(code(rmrender::render::unsupported_item), severity(Warning))]
    UnsupportedItem { item: CrdtId, kind: String },
}

/// Append `warning` unless an equal one is already recorded.
pub(crate) fn record_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    if warnings.contains(&warning) {
        return;
    }
    crate::log::warn!("{}", warning);
    warnings.push(warning);
}
