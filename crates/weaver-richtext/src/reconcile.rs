//! Inferring an edit from the text an uncontrolled input hands back.
//!
//! Text inputs report only the resulting string after each change. Given the
//! document and selection as they were just before the change, the edit is
//! recovered from the length delta and the selection shape, then replayed on
//! the tree with the style-preserving helpers from [`crate::edit`].

use crate::edit::update_range;
use crate::error::RichTextError;
use crate::tree::{Document, Node};
use crate::types::Selection;

/// Description of an inferred edit, in offsets of the previous text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditInfo {
    /// Character offset where the edit occurred
    pub edit_char_pos: usize,
    /// Number of characters deleted
    pub deleted_len: usize,
    /// Number of characters inserted
    pub inserted_len: usize,
}

impl EditInfo {
    /// Range of the inserted text in the new document.
    pub fn inserted_range(&self) -> std::ops::Range<usize> {
        self.edit_char_pos..self.edit_char_pos + self.inserted_len
    }
}

/// Result of [`reconcile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciled {
    pub document: Document,
    pub selection: Selection,
    /// The splice that was applied, `None` when the tree structure was left
    /// alone.
    pub edit: Option<EditInfo>,
    /// Leaf contents had to be overwritten to match the input.
    pub content_overridden: bool,
}

/// One `update_range` call.
struct Splice {
    start: usize,
    end: usize,
    text: String,
}

struct Plan {
    splices: Vec<Splice>,
    selection: Selection,
    edit: Option<EditInfo>,
}

/// Apply the change that turned the text of `previous` into `new_raw`.
///
/// `selection` is the selection immediately before the change and must fit
/// `previous`. Events that repeat the current text return the inputs
/// unchanged.
pub fn reconcile(
    previous: &Document,
    selection: Selection,
    new_raw: &str,
) -> Result<Reconciled, RichTextError> {
    let old: Vec<char> = previous.raw_text().chars().collect();
    RichTextError::check_range(selection.start, selection.end, old.len())?;
    let new: Vec<char> = new_raw.chars().collect();

    if old == new {
        return Ok(Reconciled {
            document: previous.clone(),
            selection,
            edit: None,
            content_overridden: false,
        });
    }

    let plan = match positional_plan(&old, &new, selection) {
        Some(plan) => plan,
        None => {
            tracing::warn!(
                start = selection.start,
                end = selection.end,
                old_len = old.len(),
                new_len = new.len(),
                "selection does not explain the change, diffing instead"
            );
            diff_plan(&old, &new)
        }
    };
    tracing::debug!(edit = ?plan.edit, selection = ?plan.selection, "inferred edit");

    let mut document = previous.clone();
    for splice in &plan.splices {
        document = update_range(&document, splice.start, splice.end, &splice.text)?;
    }

    let mut content_overridden = false;
    if document.len() != new.len() {
        tracing::error!(
            expected = new.len(),
            actual = document.len(),
            "reconciled document length diverged from input"
        );
        return Err(RichTextError::Diverged {
            expected: new.len(),
            actual: document.len(),
        });
    }
    if document.raw_text() != new_raw {
        tracing::warn!("reconciled text differs from input, overriding leaf contents");
        document = override_content(&document, &new);
        content_overridden = true;
    }

    Ok(Reconciled {
        document,
        selection: plan.selection.clamp(new.len()),
        edit: plan.edit,
        content_overridden,
    })
}

/// Infer the edit from the selection and the length delta. Returns `None`
/// when that would touch offsets outside the previous text.
fn positional_plan(old: &[char], new: &[char], selection: Selection) -> Option<Plan> {
    let delta = new.len() as isize - old.len() as isize;
    let Selection { start, end } = selection;

    if start != end {
        // Typing or pasting over a selected range.
        if delta >= 0 {
            let inserted = end + delta as usize;
            return Some(Plan {
                splices: vec![Splice {
                    start,
                    end,
                    text: collect(&new[start..inserted]),
                }],
                selection,
                edit: Some(EditInfo {
                    edit_char_pos: start,
                    deleted_len: end - start,
                    inserted_len: inserted - start,
                }),
            });
        }

        let cut = end.checked_sub(delta.unsigned_abs())?;
        let mut splices = vec![Splice {
            start: cut,
            end,
            text: String::new(),
        }];
        if cut > start {
            splices.push(Splice {
                start,
                end: cut,
                text: collect(&new[start..cut]),
            });
        }
        let edit_char_pos = start.min(cut);
        return Some(Plan {
            splices,
            selection,
            edit: Some(EditInfo {
                edit_char_pos,
                deleted_len: end - edit_char_pos,
                inserted_len: cut.saturating_sub(start),
            }),
        });
    }

    let cursor = start;
    if delta > 0 {
        let inserted = cursor + delta as usize;
        Some(Plan {
            splices: vec![Splice {
                start: cursor,
                end: cursor,
                text: collect(&new[cursor..inserted]),
            }],
            selection: Selection::collapsed(inserted),
            edit: Some(EditInfo {
                edit_char_pos: cursor,
                deleted_len: 0,
                inserted_len: delta as usize,
            }),
        })
    } else if delta < 0 {
        let cut = cursor.checked_sub(delta.unsigned_abs())?;
        Some(Plan {
            splices: vec![Splice {
                start: cut,
                end: cursor,
                text: String::new(),
            }],
            selection: Selection::collapsed(cut),
            edit: Some(EditInfo {
                edit_char_pos: cut,
                deleted_len: cursor - cut,
                inserted_len: 0,
            }),
        })
    } else {
        // Same length: something just before the cursor was swapped out
        // (autocorrect, or keystrokes racing the previous update).
        let mut changed = 0;
        while changed < cursor && new[cursor - changed - 1] != old[cursor - changed - 1] {
            changed += 1;
        }
        if changed == 0 {
            return Some(Plan {
                splices: Vec::new(),
                selection,
                edit: None,
            });
        }
        let from = cursor - changed;
        Some(Plan {
            splices: vec![Splice {
                start: from,
                end: cursor,
                text: collect(&new[from..cursor]),
            }],
            selection: Selection::collapsed(from),
            edit: Some(EditInfo {
                edit_char_pos: from,
                deleted_len: changed,
                inserted_len: changed,
            }),
        })
    }
}

/// Locate the edit by common prefix and suffix.
fn diff_plan(old: &[char], new: &[char]) -> Plan {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    let old_end = old.len() - suffix;
    let new_end = new.len() - suffix;
    Plan {
        splices: vec![Splice {
            start: prefix,
            end: old_end,
            text: collect(&new[prefix..new_end]),
        }],
        selection: Selection::collapsed(new_end),
        edit: Some(EditInfo {
            edit_char_pos: prefix,
            deleted_len: old_end - prefix,
            inserted_len: new_end - prefix,
        }),
    }
}

/// Rewrite every leaf's characters from `text`, keeping the structure.
/// `text` must have the document's length.
fn override_content(doc: &Document, text: &[char]) -> Document {
    fn rewrite(nodes: &[Node], text: &[char]) -> Vec<Node> {
        nodes
            .iter()
            .map(|node| match node {
                Node::Text(leaf) => Node::text(collect(&text[leaf.start()..leaf.end()])),
                Node::Tag(tag) => Node::tag(tag.kind(), rewrite(tag.children(), text)),
            })
            .collect()
    }
    Document::from_nodes(rewrite(doc.children(), text))
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}
