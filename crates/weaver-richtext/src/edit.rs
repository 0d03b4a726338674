//! Style-preserving text edits.
//!
//! All three public edits are one splice: cut the tree at both ends of the
//! replaced range, drop the middle, and grow the leaf on the left of the cut
//! with the new text (or the leaf on the right when there is nothing to the
//! left). The merge pass then re-joins the halves of anything the cut split.

use crate::error::RichTextError;
use crate::tree::{Document, Node, split_three};

/// Insert `text` at `at`. The new text inherits the styling of the text to
/// its left, so typing at the end of bold text stays bold.
pub fn insert_text(doc: &Document, at: usize, text: &str) -> Result<Document, RichTextError> {
    splice(doc, at, at, text)
}

/// Delete `start..end`, removing tags left empty.
pub fn remove_range(doc: &Document, start: usize, end: usize) -> Result<Document, RichTextError> {
    splice(doc, start, end, "")
}

/// Replace `start..end` with `text`, which takes the styling at `start`.
pub fn update_range(
    doc: &Document,
    start: usize,
    end: usize,
    text: &str,
) -> Result<Document, RichTextError> {
    splice(doc, start, end, text)
}

fn splice(doc: &Document, start: usize, end: usize, text: &str) -> Result<Document, RichTextError> {
    RichTextError::check_range(start, end, doc.len())?;
    if start == end && text.is_empty() {
        return Ok(doc.clone());
    }

    let (mut before, _, mut after) = split_three(doc.children(), start, end);
    if !text.is_empty() && !append_to_last_leaf(&mut before, text) {
        if !prepend_to_first_leaf(&mut after, text) {
            before.push(Node::text(text));
        }
    }
    before.extend(after);
    Ok(Document::from_nodes(before))
}

fn append_to_last_leaf(nodes: &mut [Node], text: &str) -> bool {
    match nodes.last_mut() {
        Some(Node::Text(leaf)) => {
            let mut value = String::with_capacity(leaf.value.len() + text.len());
            value.push_str(&leaf.value);
            value.push_str(text);
            leaf.value = value.into();
            true
        }
        Some(Node::Tag(tag)) => append_to_last_leaf(&mut tag.children, text),
        None => false,
    }
}

fn prepend_to_first_leaf(nodes: &mut [Node], text: &str) -> bool {
    match nodes.first_mut() {
        Some(Node::Text(leaf)) => {
            let mut value = String::with_capacity(leaf.value.len() + text.len());
            value.push_str(text);
            value.push_str(&leaf.value);
            leaf.value = value.into();
            true
        }
        Some(Node::Tag(tag)) => prepend_to_first_leaf(&mut tag.children, text),
        None => false,
    }
}
