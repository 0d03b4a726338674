//! Host-side editor state.
//!
//! [`EditorState`] threads a document, selection and pending styles through
//! the pure operations of this crate. It is what a text-input wrapper holds:
//! feed it the input's change and selection events, and it keeps the styled
//! tree in step with the text the input displays.

use serde::{Deserialize, Serialize};

use crate::coherence::check_coherence;
use crate::config::EditorConfig;
use crate::error::RichTextError;
use crate::format::apply_style;
use crate::markup::{parse, serialize};
use crate::query::{tags_covering_range, tags_in_selection};
use crate::reconcile::reconcile;
use crate::tree::Document;
use crate::types::{Selection, StyleKind, StyleSet};

/// A document state that can be returned to by undo.
#[derive(Clone, Debug)]
struct Snapshot {
    document: Document,
    selection: Selection,
}

/// Editor events, in the shape a host records and replays them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditorAction {
    /// The input now displays `text`.
    ChangeText { text: String },
    /// The input's selection moved.
    SelectionChange { start: usize, end: usize },
    /// A toolbar style button was pressed.
    ApplyStyle { kind: StyleKind },
    Undo,
    Redo,
}

/// Document, selection and pending styles for one editable field.
#[derive(Clone, Debug)]
pub struct EditorState {
    document: Document,
    selection: Selection,
    active_styles: StyleSet,
    config: EditorConfig,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorState {
    /// An empty field.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(Document::empty(), config)
    }

    /// A field showing stored markup, cursor at the end.
    pub fn from_markup(markup: &str, config: EditorConfig) -> Self {
        Self::with_document(parse(markup), config)
    }

    pub fn with_document(document: Document, config: EditorConfig) -> Self {
        let mut state = Self {
            selection: Selection::collapsed(document.len()),
            document,
            active_styles: StyleSet::empty(),
            config,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };
        state.refresh_active_styles();
        state.check();
        state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Styles that apply to text typed at the cursor, or that cover the
    /// whole selection.
    pub fn active_styles(&self) -> StyleSet {
        self.active_styles
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Serialized document, for persistence.
    pub fn markup(&self) -> String {
        serialize(&self.document)
    }

    pub fn raw_text(&self) -> String {
        self.document.raw_text()
    }

    /// Handle the input reporting `new_raw` as its full text.
    ///
    /// Text typed at a collapsed cursor is re-styled to exactly the active
    /// styles, so toggling a style with nothing selected affects what is
    /// typed next.
    pub fn on_change_text(&mut self, new_raw: &str) -> Result<(), RichTextError> {
        let reconciled = reconcile(&self.document, self.selection, new_raw)?;
        if reconciled.document == self.document {
            self.selection = reconciled.selection;
            return Ok(());
        }

        let mut document = reconciled.document;
        if let Some(edit) = reconciled.edit {
            let typed = self.selection.is_collapsed()
                && edit.deleted_len == 0
                && edit.inserted_len > 0
                && !reconciled.content_overridden;
            if typed {
                let range = edit.inserted_range();
                document = restyle(&document, range.start, range.end, self.active_styles)?;
            }
        }

        self.push_history();
        self.document = document;
        self.selection = reconciled.selection;
        self.refresh_active_styles();
        self.check();
        Ok(())
    }

    /// Handle the input's selection moving to `selection`.
    pub fn on_selection_change(&mut self, selection: Selection) -> Result<(), RichTextError> {
        self.active_styles = tags_in_selection(&self.document, selection)?;
        self.selection = selection;
        Ok(())
    }

    /// Toggle `kind` over the selection. With a collapsed selection only the
    /// pending styles change.
    pub fn on_apply_style(&mut self, kind: StyleKind) -> Result<(), RichTextError> {
        if self.selection.is_collapsed() {
            self.active_styles.toggle(kind.flag());
            return Ok(());
        }

        let Selection { start, end } = self.selection;
        let document = apply_style(&self.document, start, end, kind)?;
        self.push_history();
        self.document = document;
        self.refresh_active_styles();
        self.check();
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Restore the state before the last change. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        let current = self.restore(snapshot);
        self.redo_stack.push(current);
        true
    }

    /// Re-apply the last undone change. Returns false when there is nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = self.restore(snapshot);
        self.undo_stack.push(current);
        true
    }

    /// Clear all undo/redo history.
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            selection: self.selection,
        }
    }

    /// Swap in `snapshot`, returning the state it replaced.
    fn restore(&mut self, snapshot: Snapshot) -> Snapshot {
        let current = self.snapshot();
        self.document = snapshot.document;
        self.selection = snapshot.selection.clamp(self.document.len());
        self.refresh_active_styles();
        current
    }

    fn push_history(&mut self) {
        if self.config.history_limit == 0 {
            return;
        }
        // New edits invalidate the redo branch.
        self.redo_stack.clear();
        self.undo_stack.push(self.snapshot());
        while self.undo_stack.len() > self.config.history_limit {
            self.undo_stack.remove(0);
        }
    }

    fn refresh_active_styles(&mut self) {
        self.active_styles = tags_in_selection(&self.document, self.selection).unwrap_or_default();
    }

    fn check(&self) {
        if !self.config.check_coherence {
            return;
        }
        if let Err(err) = check_coherence(&self.document) {
            tracing::error!(error = %err, markup = %self.markup(), "editor document is incoherent");
        }
    }
}

/// Apply or remove styles over `start..end` until exactly `styles` cover it.
fn restyle(
    doc: &Document,
    start: usize,
    end: usize,
    styles: StyleSet,
) -> Result<Document, RichTextError> {
    let mut doc = doc.clone();
    for kind in StyleKind::ALL {
        if tags_covering_range(&doc, start, end)?.has(kind) != styles.has(kind) {
            doc = apply_style(&doc, start, end, kind)?;
        }
    }
    Ok(doc)
}

/// Run one recorded action. Returns whether the document or selection
/// changed.
pub fn execute_action(
    state: &mut EditorState,
    action: &EditorAction,
) -> Result<bool, RichTextError> {
    let before = (state.document.clone(), state.selection, state.active_styles);
    match action {
        EditorAction::ChangeText { text } => state.on_change_text(text)?,
        EditorAction::SelectionChange { start, end } => {
            state.on_selection_change(Selection::new(*start, *end))?
        }
        EditorAction::ApplyStyle { kind } => state.on_apply_style(*kind)?,
        EditorAction::Undo => return Ok(state.undo()),
        EditorAction::Redo => return Ok(state.redo()),
    }
    Ok(before != (state.document.clone(), state.selection, state.active_styles))
}
