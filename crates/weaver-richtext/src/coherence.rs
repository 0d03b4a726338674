//! Structural invariant checks.
//!
//! A coherent document has leaves that partition `0..len` in order, tags whose
//! bounds match their children, and is in canonical form: no empty leaves
//! (other than the lone leaf of an empty document), no childless tags, no
//! tag nested under another of the same kind, and no adjacent mergeable
//! siblings.

use crate::error::CoherenceError;
use crate::tree::{Document, Node};
use crate::types::StyleSet;

/// Validate every structural invariant of `doc`.
pub fn check_coherence(doc: &Document) -> Result<(), CoherenceError> {
    if let [Node::Text(leaf)] = doc.children() {
        if leaf.value().is_empty() && leaf.start() == 0 && leaf.end() == 0 && doc.is_empty() {
            return Ok(());
        }
    }

    let mut path = Vec::new();
    let end = check_nodes(doc.children(), 0, StyleSet::empty(), &mut path)?;
    if end != doc.len() {
        return Err(CoherenceError::Length {
            reported: doc.len(),
            actual: end,
        });
    }
    Ok(())
}

/// Panic on an incoherent document in debug builds; nothing in release.
#[inline]
pub fn debug_assert_coherent(doc: &Document) {
    if cfg!(debug_assertions) {
        if let Err(err) = check_coherence(doc) {
            panic!("incoherent document: {err}");
        }
    }
}

fn check_nodes(
    nodes: &[Node],
    start: usize,
    ancestors: StyleSet,
    path: &mut Vec<usize>,
) -> Result<usize, CoherenceError> {
    let mut expected = start;
    let mut prev: Option<&Node> = None;
    for (idx, node) in nodes.iter().enumerate() {
        path.push(idx);

        if node.start() != expected {
            return Err(CoherenceError::Gap {
                path: path.clone(),
                expected,
                found: node.start(),
            });
        }

        let mergeable = match (prev, node) {
            (Some(Node::Text(_)), Node::Text(_)) => true,
            (Some(Node::Tag(a)), Node::Tag(b)) => a.kind() == b.kind(),
            _ => false,
        };
        if mergeable {
            let mut at = path.clone();
            if let Some(last) = at.last_mut() {
                *last -= 1;
            }
            return Err(CoherenceError::Mergeable { path: at });
        }

        match node {
            Node::Text(leaf) => {
                let chars = leaf.value().chars().count();
                if leaf.end() - leaf.start() != chars {
                    return Err(CoherenceError::LeafLength {
                        path: path.clone(),
                        start: leaf.start(),
                        end: leaf.end(),
                        chars,
                    });
                }
                if chars == 0 {
                    return Err(CoherenceError::EmptyLeaf { path: path.clone() });
                }
            }
            Node::Tag(tag) => {
                if ancestors.has(tag.kind()) {
                    return Err(CoherenceError::NestedDuplicate {
                        path: path.clone(),
                        kind: tag.kind(),
                    });
                }
                let Some(first) = tag.children().first() else {
                    return Err(CoherenceError::EmptyTag { path: path.clone() });
                };
                let child_start = first.start();
                let child_end = check_nodes(
                    tag.children(),
                    tag.start(),
                    ancestors.with(tag.kind()),
                    path,
                )?;
                if child_start != tag.start() || child_end != tag.end() {
                    return Err(CoherenceError::TagBounds {
                        path: path.clone(),
                        start: tag.start(),
                        end: tag.end(),
                        child_start,
                        child_end,
                    });
                }
            }
        }

        expected = node.end();
        prev = Some(node);
        path.pop();
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;
    use crate::tree::{TagNode, TextNode};
    use crate::types::StyleKind;

    fn leaf(value: &str, start: usize, end: usize) -> Node {
        Node::Text(TextNode {
            value: value.into(),
            start,
            end,
        })
    }

    fn tag(kind: StyleKind, children: Vec<Node>, start: usize, end: usize) -> Node {
        Node::Tag(TagNode {
            kind,
            children,
            start,
            end,
        })
    }

    #[test]
    fn test_parsed_documents_are_coherent() {
        for markup in ["", "abc", "<b>a<i>b</i>c</b>d", "<+1>x</+1><-1>y</-1>"] {
            assert_eq!(check_coherence(&parse(markup)), Ok(()), "{markup}");
        }
    }

    #[test]
    fn test_leaf_length_mismatch() {
        let doc = Document::from_raw_parts(vec![leaf("abc", 0, 2)], 2);
        assert!(matches!(
            check_coherence(&doc),
            Err(CoherenceError::LeafLength { chars: 3, .. })
        ));
    }

    #[test]
    fn test_gap_between_leaves() {
        let doc = Document::from_raw_parts(
            vec![leaf("a", 0, 1), tag(StyleKind::Bold, vec![leaf("b", 2, 3)], 2, 3)],
            3,
        );
        assert_eq!(
            check_coherence(&doc),
            Err(CoherenceError::Gap {
                path: vec![1],
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn test_tag_bounds_mismatch() {
        let doc = Document::from_raw_parts(
            vec![tag(StyleKind::Bold, vec![leaf("ab", 0, 2)], 0, 3)],
            3,
        );
        assert!(matches!(
            check_coherence(&doc),
            Err(CoherenceError::TagBounds { child_end: 2, .. })
        ));
    }

    #[test]
    fn test_adjacent_leaves_are_mergeable() {
        let doc = Document::from_raw_parts(vec![leaf("a", 0, 1), leaf("b", 1, 2)], 2);
        assert_eq!(
            check_coherence(&doc),
            Err(CoherenceError::Mergeable { path: vec![0] })
        );
    }

    #[test]
    fn test_adjacent_same_kind_tags_are_mergeable() {
        let doc = Document::from_raw_parts(
            vec![
                tag(StyleKind::Italic, vec![leaf("a", 0, 1)], 0, 1),
                tag(StyleKind::Italic, vec![leaf("b", 1, 2)], 1, 2),
            ],
            2,
        );
        assert!(matches!(
            check_coherence(&doc),
            Err(CoherenceError::Mergeable { .. })
        ));
    }

    #[test]
    fn test_nested_duplicate() {
        let doc = Document::from_raw_parts(
            vec![tag(
                StyleKind::Bold,
                vec![tag(StyleKind::Bold, vec![leaf("a", 0, 1)], 0, 1)],
                0,
                1,
            )],
            1,
        );
        assert_eq!(
            check_coherence(&doc),
            Err(CoherenceError::NestedDuplicate {
                path: vec![0, 0],
                kind: StyleKind::Bold
            })
        );
    }

    #[test]
    fn test_empty_tag_and_leaf() {
        let doc = Document::from_raw_parts(
            vec![leaf("a", 0, 1), tag(StyleKind::Bold, vec![], 1, 1)],
            1,
        );
        assert_eq!(
            check_coherence(&doc),
            Err(CoherenceError::EmptyTag { path: vec![1] })
        );

        let doc = Document::from_raw_parts(
            vec![tag(StyleKind::Bold, vec![leaf("", 0, 0)], 0, 0)],
            0,
        );
        assert_eq!(
            check_coherence(&doc),
            Err(CoherenceError::EmptyLeaf { path: vec![0, 0] })
        );
    }

    #[test]
    fn test_reported_length() {
        let doc = Document::from_raw_parts(vec![leaf("ab", 0, 2)], 5);
        assert_eq!(
            check_coherence(&doc),
            Err(CoherenceError::Length {
                reported: 5,
                actual: 2
            })
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "incoherent document")]
    fn test_debug_assert_panics() {
        let doc = Document::from_raw_parts(vec![leaf("a", 0, 1), leaf("b", 1, 2)], 2);
        debug_assert_coherent(&doc);
    }
}
