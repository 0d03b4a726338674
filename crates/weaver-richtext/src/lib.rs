//! weaver-richtext: inline styling for plain single-buffer text inputs.
//!
//! This crate provides:
//! - `Document` - styled text as a tree over a flat character buffer
//! - `parse` / `serialize` - the `<b>…</b>` inline markup codec
//! - `apply_style`, `tags_covering_range` - toggling and querying styles
//! - `reconcile` - replaying an uncontrolled input's new text onto the tree
//! - `EditorState` - the host-side state those calls are threaded through
//!
//! Every operation except those on `EditorState` is a pure function from
//! documents to documents. Offsets are counted in chars.

pub mod coherence;
pub mod columns;
pub mod config;
pub mod edit;
pub mod error;
pub mod format;
pub mod markup;
pub mod query;
pub mod reconcile;
pub mod state;
pub mod tree;
pub mod types;

pub use coherence::{check_coherence, debug_assert_coherent};
pub use columns::split_into_columns;
pub use config::EditorConfig;
pub use edit::{insert_text, remove_range, update_range};
pub use error::{CoherenceError, RichTextError};
pub use format::{apply_style, strip_style};
pub use markup::{MarkupSink, MarkupWriter, parse, raw_text, serialize, walk};
pub use query::{tags_covering_range, tags_in_selection};
pub use reconcile::{EditInfo, Reconciled, reconcile};
pub use smol_str::SmolStr;
pub use state::{EditorAction, EditorState, execute_action};
pub use tree::{Document, Node, TagNode, TextNode};
pub use types::{Selection, StyleKind, StyleSet};
