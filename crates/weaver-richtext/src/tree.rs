//! Styled text as a tree over a flat character buffer.
//!
//! A [`Document`] is an implicit root whose children are [`Node`]s. Leaves
//! ([`TextNode`]) hold the text; tags ([`TagNode`]) apply one [`StyleKind`]
//! to a run of children. Every node carries absolute `start..end` character
//! offsets into the document's raw text.
//!
//! Surgery in the other modules works on plain `Vec<Node>`s. Splitting keeps
//! absolute offsets valid; anything else may leave them stale, so every
//! operation finishes through [`Document::from_nodes`], which restores the
//! canonical form and re-derives all offsets in one left-to-right pass.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use smol_str::SmolStr;

use crate::types::{StyleKind, StyleSet};

/// A leaf holding a contiguous slice of the raw text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextNode {
    pub(crate) value: SmolStr,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl TextNode {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

/// One style applied to a contiguous run of children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagNode {
    pub(crate) kind: StyleKind,
    pub(crate) children: Vec<Node>,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl TagNode {
    pub fn kind(&self) -> StyleKind {
        self.kind
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Text(TextNode),
    Tag(TagNode),
}

impl Node {
    /// New leaf. Offsets are assigned when the document is finished.
    pub(crate) fn text(value: impl Into<SmolStr>) -> Self {
        Node::Text(TextNode {
            value: value.into(),
            start: 0,
            end: 0,
        })
    }

    /// New tag. Offsets are assigned when the document is finished.
    pub(crate) fn tag(kind: StyleKind, children: Vec<Node>) -> Self {
        Node::Tag(TagNode {
            kind,
            children,
            start: 0,
            end: 0,
        })
    }

    pub fn start(&self) -> usize {
        match self {
            Node::Text(t) => t.start,
            Node::Tag(t) => t.start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Node::Text(t) => t.end,
            Node::Tag(t) => t.end,
        }
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(t) => Some(t),
            Node::Tag(_) => None,
        }
    }

    pub fn as_tag(&self) -> Option<&TagNode> {
        match self {
            Node::Tag(t) => Some(t),
            Node::Text(_) => None,
        }
    }

    /// Split a node whose range strictly contains `at` into two halves,
    /// duplicating the tag wrapper onto both sides.
    fn split(&self, at: usize) -> (Node, Node) {
        debug_assert!(self.start() < at && at < self.end());
        match self {
            Node::Text(t) => {
                let byte = char_to_byte(&t.value, at - t.start);
                let left = TextNode {
                    value: SmolStr::from(&t.value[..byte]),
                    start: t.start,
                    end: at,
                };
                let right = TextNode {
                    value: SmolStr::from(&t.value[byte..]),
                    start: at,
                    end: t.end,
                };
                (Node::Text(left), Node::Text(right))
            }
            Node::Tag(t) => {
                let (left, right) = split_nodes(&t.children, at);
                (
                    Node::Tag(TagNode {
                        kind: t.kind,
                        children: left,
                        start: t.start,
                        end: at,
                    }),
                    Node::Tag(TagNode {
                        kind: t.kind,
                        children: right,
                        start: at,
                        end: t.end,
                    }),
                )
            }
        }
    }
}

/// Split a run of siblings at absolute offset `at`.
///
/// Nodes ending at or before `at` go left, nodes starting at or after it go
/// right, and a node straddling `at` is split along with every tag between it
/// and its leaf. Offsets of the results stay absolute and valid.
pub(crate) fn split_nodes(nodes: &[Node], at: usize) -> (Vec<Node>, Vec<Node>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for node in nodes {
        if node.end() <= at {
            left.push(node.clone());
        } else if node.start() >= at {
            right.push(node.clone());
        } else {
            let (l, r) = node.split(at);
            left.push(l);
            right.push(r);
        }
    }
    (left, right)
}

/// Split a run of siblings into the parts before `start`, inside
/// `start..end`, and after `end`.
pub(crate) fn split_three(
    nodes: &[Node],
    start: usize,
    end: usize,
) -> (Vec<Node>, Vec<Node>, Vec<Node>) {
    let (before, rest) = split_nodes(nodes, start);
    let (middle, after) = split_nodes(&rest, end);
    (before, middle, after)
}

/// Bring a run of siblings into canonical form.
///
/// Drops empty leaves and childless tags, unwraps tags whose kind is already
/// applied by an ancestor, and merges adjacent leaves and adjacent tags of the
/// same kind. Offsets are left stale.
pub(crate) fn normalize(nodes: Vec<Node>, ancestors: StyleSet) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(t) if t.value.is_empty() => {}
            Node::Text(t) => push_merged(&mut out, Node::Text(t), ancestors),
            Node::Tag(t) if ancestors.has(t.kind) => {
                for child in normalize(t.children, ancestors) {
                    push_merged(&mut out, child, ancestors);
                }
            }
            Node::Tag(t) => {
                let children = normalize(t.children, ancestors.with(t.kind));
                if !children.is_empty() {
                    push_merged(&mut out, Node::tag(t.kind, children), ancestors);
                }
            }
        }
    }
    out
}

/// Push an already-normalized node, merging it into the last sibling when
/// the two are mergeable.
fn push_merged(out: &mut Vec<Node>, node: Node, ancestors: StyleSet) {
    let node = match out.pop() {
        Some(prev) => match merge(prev, node, ancestors) {
            Ok(merged) => merged,
            Err((prev, node)) => {
                out.push(prev);
                node
            }
        },
        None => node,
    };
    out.push(node);
}

fn merge(prev: Node, next: Node, ancestors: StyleSet) -> Result<Node, (Node, Node)> {
    match (prev, next) {
        (Node::Text(a), Node::Text(b)) => {
            let mut value = String::with_capacity(a.value.len() + b.value.len());
            value.push_str(&a.value);
            value.push_str(&b.value);
            Ok(Node::text(value))
        }
        (Node::Tag(mut a), Node::Tag(b)) if a.kind == b.kind => {
            let inner = ancestors.with(a.kind);
            for child in b.children {
                push_merged(&mut a.children, child, inner);
            }
            Ok(Node::Tag(a))
        }
        (prev, next) => Err((prev, next)),
    }
}

/// Assign absolute offsets to a run of siblings starting at `start`.
/// Returns the end offset of the run.
pub(crate) fn reindex(nodes: &mut [Node], start: usize) -> usize {
    let mut offset = start;
    for node in nodes {
        match node {
            Node::Text(t) => {
                t.start = offset;
                offset += t.value.chars().count();
                t.end = offset;
            }
            Node::Tag(t) => {
                t.start = offset;
                offset = reindex(&mut t.children, offset);
                t.end = offset;
            }
        }
    }
    offset
}

/// Byte index of the `idx`-th char, or the string length past the end.
pub(crate) fn char_to_byte(s: &str, idx: usize) -> usize {
    s.char_indices().nth(idx).map_or(s.len(), |(b, _)| b)
}

/// An immutable styled document.
///
/// Cloning is a pointer copy: children are shared behind an `Arc`, so hosts
/// can keep old documents around (e.g. for undo) for free.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    children: Arc<[Node]>,
    len: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// The empty document: one empty leaf.
    pub fn empty() -> Self {
        Self {
            children: Arc::from(vec![Node::text("")]),
            len: 0,
        }
    }

    /// Build a canonical document from arbitrary (possibly stale-offset)
    /// nodes.
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut children = normalize(nodes, StyleSet::empty());
        if children.is_empty() {
            return Self::empty();
        }
        let len = reindex(&mut children, 0);
        let doc = Self {
            children: Arc::from(children),
            len,
        };
        crate::coherence::debug_assert_coherent(&doc);
        doc
    }

    /// Unchecked constructor for coherence-checker tests.
    #[cfg(test)]
    pub(crate) fn from_raw_parts(children: Vec<Node>, len: usize) -> Self {
        Self {
            children: Arc::from(children),
            len,
        }
    }

    /// Length of the raw text in chars.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Children of the implicit root.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Concatenation of every leaf value in document order.
    pub fn raw_text(&self) -> String {
        crate::markup::raw_text(self)
    }

    /// Leaves in document order, each with the set of styles applied by its
    /// ancestors.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            stack: vec![(self.children.iter(), StyleSet::empty())],
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.children.iter())
    }
}

/// Depth-first leaf iterator, see [`Document::leaves`].
pub struct Leaves<'a> {
    stack: Vec<(std::slice::Iter<'a, Node>, StyleSet)>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = (&'a TextNode, StyleSet);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (iter, styles) = self.stack.last_mut()?;
            let styles = *styles;
            match iter.next() {
                Some(Node::Text(t)) => return Some((t, styles)),
                Some(Node::Tag(t)) => {
                    self.stack.push((t.children.iter(), styles.with(t.kind)));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
