//! Splitting a document into evenly filled columns.

use crate::edit::remove_range;
use crate::error::RichTextError;
use crate::tree::{Document, split_nodes};

/// Split `doc` into `columns` documents holding roughly the same number of
/// space-separated words, keeping styling across the cuts.
///
/// Each column takes `ceil(words / columns)` words; spaces at the start of a
/// column are dropped. Trailing columns may be empty. A single column returns
/// the document as is.
pub fn split_into_columns(doc: &Document, columns: usize) -> Result<Vec<Document>, RichTextError> {
    match columns {
        0 => return Err(RichTextError::InvalidColumnCount),
        1 => return Ok(vec![doc.clone()]),
        _ => {}
    }

    let raw = doc.raw_text();
    let words: Vec<&str> = raw.split(' ').collect();
    let per_column = words.len().div_ceil(columns);

    let mut out = Vec::with_capacity(columns);
    let mut rest = doc.clone();
    for column in 0..columns {
        let first = (column * per_column).min(words.len());
        let last = ((column + 1) * per_column).min(words.len());
        let cut = words[first..last]
            .join(" ")
            .chars()
            .count()
            .min(rest.len());

        let (left, right) = split_nodes(rest.children(), cut);
        out.push(Document::from_nodes(left));
        rest = Document::from_nodes(right);

        let spaces = rest.raw_text().chars().take_while(|c| *c == ' ').count();
        if spaces > 0 {
            rest = remove_range(&rest, 0, spaces)?;
        }
    }
    tracing::trace!(columns, words = words.len(), "split into columns");
    Ok(out)
}
