//! Core value types: selection, style kinds, and style sets.
//!
//! These are plain values with no knowledge of the tree; every other module
//! builds on them.

use std::fmt;
use std::ops::Range;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Text selection in character offsets, `start <= end`.
///
/// A collapsed selection (`start == end`) is a cursor.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a new selection. Bounds are taken as given; operations that
    /// receive a selection validate it against the document.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Check if the selection is collapsed (cursor only).
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Get the selection length.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if empty (same as is_collapsed).
    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Check if an offset is within the selection (end exclusive).
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Convert to a `Range<usize>`.
    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Clamp both bounds into `0..=len`.
    pub fn clamp(self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }
}

impl From<Range<usize>> for Selection {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// One inline style. The set is closed: the markup codec, the query and the
/// formatting engine all match on it exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StyleKind {
    #[serde(rename = "b")]
    Bold,
    #[serde(rename = "i")]
    Italic,
    #[serde(rename = "u")]
    Underline,
    #[serde(rename = "+1")]
    SizeUp,
    #[serde(rename = "-1")]
    SizeDown,
}

impl StyleKind {
    /// Every kind, in declaration order.
    pub const ALL: [StyleKind; 5] = [
        StyleKind::Bold,
        StyleKind::Italic,
        StyleKind::Underline,
        StyleKind::SizeUp,
        StyleKind::SizeDown,
    ];

    /// Name used between the angle brackets in markup.
    pub fn tag_name(self) -> &'static str {
        match self {
            StyleKind::Bold => "b",
            StyleKind::Italic => "i",
            StyleKind::Underline => "u",
            StyleKind::SizeUp => "+1",
            StyleKind::SizeDown => "-1",
        }
    }

    /// Inverse of [`StyleKind::tag_name`]. Unknown names yield `None`.
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "b" => Some(StyleKind::Bold),
            "i" => Some(StyleKind::Italic),
            "u" => Some(StyleKind::Underline),
            "+1" => Some(StyleKind::SizeUp),
            "-1" => Some(StyleKind::SizeDown),
            _ => None,
        }
    }

    /// The flag for this kind in a [`StyleSet`].
    pub fn flag(self) -> StyleSet {
        match self {
            StyleKind::Bold => StyleSet::BOLD,
            StyleKind::Italic => StyleSet::ITALIC,
            StyleKind::Underline => StyleSet::UNDERLINE,
            StyleKind::SizeUp => StyleSet::SIZE_UP,
            StyleKind::SizeDown => StyleSet::SIZE_DOWN,
        }
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

bitflags! {
    /// A set of [`StyleKind`]s.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct StyleSet: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const SIZE_UP = 1 << 3;
        const SIZE_DOWN = 1 << 4;
    }
}

impl StyleSet {
    pub fn has(&self, kind: StyleKind) -> bool {
        self.contains(kind.flag())
    }

    pub fn with(self, kind: StyleKind) -> Self {
        self | kind.flag()
    }

    /// Iterate the kinds in the set, in declaration order.
    pub fn kinds(self) -> impl Iterator<Item = StyleKind> {
        StyleKind::ALL.into_iter().filter(move |k| self.has(*k))
    }
}

impl From<StyleKind> for StyleSet {
    fn from(kind: StyleKind) -> Self {
        kind.flag()
    }
}

impl FromIterator<StyleKind> for StyleSet {
    fn from_iter<I: IntoIterator<Item = StyleKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(StyleSet::empty(), |set, kind| set.with(kind))
    }
}
