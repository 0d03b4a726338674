//! Editor configuration.

use serde::{Deserialize, Serialize};

/// Settings for an [`EditorState`](crate::state::EditorState).
///
/// Every field has a default, so a partial (or empty) JSON object is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Run the coherence checker after every mutation and log violations.
    pub check_coherence: bool,
    /// Maximum number of undo steps kept. `0` disables history.
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            check_coherence: cfg!(debug_assertions),
            history_limit: 100,
        }
    }
}
