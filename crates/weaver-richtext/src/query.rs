//! Which styles cover a selection.

use crate::error::RichTextError;
use crate::tree::Document;
use crate::types::{Selection, StyleSet};

/// Styles that cover `start..end`.
///
/// For a non-empty range, a style covers it when every leaf overlapping the
/// range sits under a tag of that style; this drives "apply to selection"
/// highlighting. For a collapsed range the result is the styles text typed at
/// that offset would inherit: those of the leaf ending at the cursor, or of
/// the first leaf when the cursor is at 0.
pub fn tags_covering_range(
    doc: &Document,
    start: usize,
    end: usize,
) -> Result<StyleSet, RichTextError> {
    RichTextError::check_range(start, end, doc.len())?;

    if start == end {
        return Ok(styles_at_cursor(doc, start));
    }

    let mut covering = StyleSet::all();
    let mut touched = false;
    for (leaf, styles) in doc.leaves() {
        if leaf.start() >= end {
            break;
        }
        if leaf.end() > start {
            covering &= styles;
            touched = true;
        }
    }
    Ok(if touched { covering } else { StyleSet::empty() })
}

/// [`tags_covering_range`] over a [`Selection`].
pub fn tags_in_selection(doc: &Document, selection: Selection) -> Result<StyleSet, RichTextError> {
    tags_covering_range(doc, selection.start, selection.end)
}

/// Styles of the first leaf whose range includes `at` (inclusive both ends),
/// which is the leaf an insertion at `at` extends.
fn styles_at_cursor(doc: &Document, at: usize) -> StyleSet {
    doc.leaves()
        .find(|(leaf, _)| leaf.start() <= at && at <= leaf.end())
        .map(|(_, styles)| styles)
        .unwrap_or_default()
}
