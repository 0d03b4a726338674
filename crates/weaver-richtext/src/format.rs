//! Toggling a style over a character range.

use crate::error::RichTextError;
use crate::query::tags_covering_range;
use crate::tree::{Document, Node, TagNode, split_three};
use crate::types::StyleKind;

/// Toggle `kind` over `start..end`.
///
/// If `kind` already covers the whole range it is removed from it, otherwise
/// it is added. Text outside the range keeps its styling. A collapsed range
/// leaves the document unchanged: pending styles at a cursor are the host's
/// concern (see [`crate::state::EditorState`]).
pub fn apply_style(
    doc: &Document,
    start: usize,
    end: usize,
    kind: StyleKind,
) -> Result<Document, RichTextError> {
    RichTextError::check_range(start, end, doc.len())?;
    if start == end {
        return Ok(doc.clone());
    }

    let nodes = if tags_covering_range(doc, start, end)?.has(kind) {
        tracing::trace!(%kind, start, end, "removing style");
        let (before, middle, after) = split_three(doc.children(), start, end);
        let mut nodes = before;
        nodes.extend(unwrap_kind(middle, kind));
        nodes.extend(after);
        nodes
    } else {
        tracing::trace!(%kind, start, end, "adding style");
        wrap_range(doc.children(), start, end, kind)
    };
    Ok(Document::from_nodes(nodes))
}

/// Remove every `kind` tag from the document.
pub fn strip_style(doc: &Document, kind: StyleKind) -> Document {
    Document::from_nodes(unwrap_kind(doc.children().to_vec(), kind))
}

/// Wrap `start..end` in a new `kind` tag, inserted at the deepest level whose
/// run of siblings covers the range so outer styling is not duplicated.
fn wrap_range(nodes: &[Node], start: usize, end: usize, kind: StyleKind) -> Vec<Node> {
    let container = nodes
        .iter()
        .position(|n| n.start() <= start && end <= n.end());
    if let Some(idx) = container {
        if let Node::Tag(tag) = &nodes[idx] {
            let mut out = nodes.to_vec();
            out[idx] = Node::Tag(TagNode {
                kind: tag.kind,
                children: wrap_range(&tag.children, start, end, kind),
                start: tag.start,
                end: tag.end,
            });
            return out;
        }
    }

    let (before, middle, after) = split_three(nodes, start, end);
    let mut out = before;
    out.push(Node::tag(kind, middle));
    out.extend(after);
    out
}

/// Replace every `kind` tag by its children, at any depth.
fn unwrap_kind(nodes: Vec<Node>, kind: StyleKind) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Tag(tag) if tag.kind == kind => out.extend(unwrap_kind(tag.children, kind)),
            Node::Tag(tag) => out.push(Node::tag(tag.kind, unwrap_kind(tag.children, kind))),
            text @ Node::Text(_) => out.push(text),
        }
    }
    out
}
