//! Error types for rich-text operations.

use miette::Diagnostic;
use thiserror::Error;

use crate::types::StyleKind;

/// Errors returned by the public document operations.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RichTextError {
    /// A range or offset argument does not fit the document.
    #[error("invalid range {start}..{end} for document of length {len}")]
    #[diagnostic(
        code(weaver_richtext::invalid_range),
        help("ranges must satisfy start <= end <= document length")
    )]
    InvalidRange { start: usize, end: usize, len: usize },

    /// The reconciled tree does not spell the text the input reported.
    #[error("reconciled text diverged from input: expected {expected} chars, got {actual}")]
    #[diagnostic(code(weaver_richtext::diverged))]
    Diverged { expected: usize, actual: usize },

    /// Column splitting needs at least one column.
    #[error("column count must be at least 1")]
    #[diagnostic(code(weaver_richtext::invalid_column_count))]
    InvalidColumnCount,
}

impl RichTextError {
    /// Check `start <= end <= len`.
    pub(crate) fn check_range(start: usize, end: usize, len: usize) -> Result<(), Self> {
        if start > end || end > len {
            Err(RichTextError::InvalidRange { start, end, len })
        } else {
            Ok(())
        }
    }
}

/// Structural invariant violations found by the coherence checker.
///
/// Paths are child indices from the root, so `[0, 2]` is the third child of
/// the root's first child.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoherenceError {
    #[error("leaf at {path:?} spans {start}..{end} but holds {chars} chars")]
    LeafLength {
        path: Vec<usize>,
        start: usize,
        end: usize,
        chars: usize,
    },

    #[error("node at {path:?} starts at {found}, expected {expected}")]
    Gap {
        path: Vec<usize>,
        expected: usize,
        found: usize,
    },

    #[error(
        "tag at {path:?} spans {start}..{end} but its children span {child_start}..{child_end}"
    )]
    TagBounds {
        path: Vec<usize>,
        start: usize,
        end: usize,
        child_start: usize,
        child_end: usize,
    },

    #[error("tag at {path:?} has no children")]
    EmptyTag { path: Vec<usize> },

    #[error("empty leaf at {path:?} in a non-empty document")]
    EmptyLeaf { path: Vec<usize> },

    #[error("siblings at {path:?} and the next index are mergeable")]
    Mergeable { path: Vec<usize> },

    #[error("{kind} tag at {path:?} is nested inside another {kind} tag")]
    NestedDuplicate { path: Vec<usize>, kind: StyleKind },

    #[error("document reports length {reported} but its leaves hold {actual} chars")]
    Length { reported: usize, actual: usize },
}
