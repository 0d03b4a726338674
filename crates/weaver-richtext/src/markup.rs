//! Inline markup codec.
//!
//! The persisted form is literal text with well-nested `<kind>…</kind>` spans
//! (see [`StyleKind::tag_name`]). Parsing is fail-soft: anything that is not a
//! recognised tag, a close tag with no matching open, and an open tag that is
//! never closed all come back as literal text.

use std::fmt::{self, Write};

use crate::tree::{Document, Node};
use crate::types::StyleKind;

/// Receives a document walk. Serialising and raw-text extraction are both
/// just sinks.
pub trait MarkupSink {
    type Error;

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error>;
    fn open(&mut self, kind: StyleKind) -> Result<(), Self::Error>;
    fn close(&mut self, kind: StyleKind) -> Result<(), Self::Error>;
}

/// Walk `doc` in order, reporting leaves and tag boundaries to `sink`.
pub fn walk<S: MarkupSink>(doc: &Document, sink: &mut S) -> Result<(), S::Error> {
    walk_nodes(doc.children(), sink)
}

fn walk_nodes<S: MarkupSink>(nodes: &[Node], sink: &mut S) -> Result<(), S::Error> {
    for node in nodes {
        match node {
            Node::Text(t) => sink.write_text(t.value())?,
            Node::Tag(t) => {
                sink.open(t.kind())?;
                walk_nodes(t.children(), sink)?;
                sink.close(t.kind())?;
            }
        }
    }
    Ok(())
}

/// Writes markup into any `fmt::Write`.
pub struct MarkupWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkupWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MarkupSink for MarkupWriter<W> {
    type Error = fmt::Error;

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error> {
        self.writer.write_str(text)
    }

    fn open(&mut self, kind: StyleKind) -> Result<(), Self::Error> {
        write!(self.writer, "<{}>", kind.tag_name())
    }

    fn close(&mut self, kind: StyleKind) -> Result<(), Self::Error> {
        write!(self.writer, "</{}>", kind.tag_name())
    }
}

/// Collects leaf text only.
struct RawText(String);

impl MarkupSink for RawText {
    type Error = std::convert::Infallible;

    fn write_text(&mut self, text: &str) -> Result<(), Self::Error> {
        self.0.push_str(text);
        Ok(())
    }

    fn open(&mut self, _: StyleKind) -> Result<(), Self::Error> {
        Ok(())
    }

    fn close(&mut self, _: StyleKind) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Serialise a document to markup.
pub fn serialize(doc: &Document) -> String {
    let mut out = MarkupWriter::new(String::new());
    // Writing into a String cannot fail.
    let _ = walk(doc, &mut out);
    out.into_inner()
}

/// Concatenation of all leaf values in document order.
pub fn raw_text(doc: &Document) -> String {
    let mut out = RawText(String::with_capacity(doc.len()));
    match walk(doc, &mut out) {
        Ok(()) => out.0,
        Err(never) => match never {},
    }
}

/// One open tag on the parse stack.
struct Frame {
    kind: StyleKind,
    children: Vec<Node>,
}

impl Frame {
    /// Give up on this tag: its open tag and content become plain children
    /// of `parent`.
    fn degrade(self, parent: &mut Vec<Node>) {
        tracing::trace!(kind = %self.kind, "unterminated tag kept as text");
        parent.push(Node::text(format!("<{}>", self.kind.tag_name())));
        parent.extend(self.children);
    }
}

enum Token<'a> {
    Open(StyleKind),
    Close(StyleKind),
    Text(&'a str),
}

/// Split markup into tag and text tokens. Unknown tags are text.
fn tokenize(markup: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;
    while let Some(rel) = markup[pos..].find('<') {
        let lt = pos + rel;
        let tag = markup[lt + 1..]
            .find(['<', '>'])
            .filter(|&len| markup.as_bytes()[lt + 1 + len] == b'>')
            .and_then(|len| {
                let name = &markup[lt + 1..lt + 1 + len];
                let token = match name.strip_prefix('/') {
                    Some(close) => StyleKind::from_tag_name(close).map(Token::Close),
                    None => StyleKind::from_tag_name(name).map(Token::Open),
                };
                token.map(|t| (t, lt + len + 2))
            });
        match tag {
            Some((token, after)) => {
                if text_start < lt {
                    tokens.push(Token::Text(&markup[text_start..lt]));
                }
                tokens.push(token);
                text_start = after;
                pos = after;
            }
            None => {
                tracing::trace!(offset = lt, "unrecognised tag kept as text");
                pos = lt + 1;
            }
        }
    }
    if text_start < markup.len() {
        tokens.push(Token::Text(&markup[text_start..]));
    }
    tokens
}

/// Parse markup into a canonical document. Never fails.
pub fn parse(markup: &str) -> Document {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    fn current<'a>(root: &'a mut Vec<Node>, stack: &'a mut [Frame]) -> &'a mut Vec<Node> {
        match stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => root,
        }
    }

    for token in tokenize(markup) {
        match token {
            Token::Text(text) => current(&mut root, &mut stack).push(Node::text(text)),
            Token::Open(kind) => stack.push(Frame {
                kind,
                children: Vec::new(),
            }),
            Token::Close(kind) => {
                let Some(idx) = stack.iter().rposition(|f| f.kind == kind) else {
                    tracing::trace!(%kind, "close tag without open kept as text");
                    current(&mut root, &mut stack).push(Node::text(format!("</{}>", kind)));
                    continue;
                };
                // Tags opened inside the match were never closed.
                while stack.len() > idx + 1 {
                    if let Some(frame) = stack.pop() {
                        frame.degrade(current(&mut root, &mut stack));
                    }
                }
                if let Some(frame) = stack.pop() {
                    current(&mut root, &mut stack).push(Node::tag(frame.kind, frame.children));
                }
            }
        }
    }

    while let Some(frame) = stack.pop() {
        frame.degrade(current(&mut root, &mut stack));
    }

    Document::from_nodes(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let doc = parse("abc");
        assert_eq!(raw_text(&doc), "abc");
        assert_eq!(serialize(&doc), "abc");
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_single_tag() {
        let doc = parse("<b>abc</b>");
        insta::assert_snapshot!(serialize(&doc), @"<b>abc</b>");
        assert_eq!(raw_text(&doc), "abc");
    }

    #[test]
    fn test_nested_tags() {
        let doc = parse("x<b>a<i>b</i>c</b><+1>big</+1><-1>small</-1>");
        insta::assert_snapshot!(serialize(&doc), @"x<b>a<i>b</i>c</b><+1>big</+1><-1>small</-1>");
        assert_eq!(raw_text(&doc), "xabcbigsmall");
    }

    #[test]
    fn test_empty_markup() {
        let doc = parse("");
        assert_eq!(doc, Document::empty());
        assert_eq!(serialize(&doc), "");
    }

    #[test]
    fn test_parse_canonicalizes() {
        assert_eq!(serialize(&parse("<b>a</b><b>b</b>")), "<b>ab</b>");
        assert_eq!(serialize(&parse("<b><b>a</b></b>")), "<b>a</b>");
        assert_eq!(serialize(&parse("a<i></i>b")), "ab");
    }

    #[test]
    fn test_unknown_tags_are_text() {
        let doc = parse("<strong>a</strong>");
        assert_eq!(raw_text(&doc), "<strong>a</strong>");
        assert_eq!(serialize(&doc), "<strong>a</strong>");
    }

    #[test]
    fn test_stray_angle_brackets_are_text() {
        assert_eq!(raw_text(&parse("a < b")), "a < b");
        assert_eq!(raw_text(&parse("a <<b>c</b>")), "a <c");
        assert_eq!(raw_text(&parse("1 > 0 <")), "1 > 0 <");
    }

    #[test]
    fn test_unmatched_close_is_text() {
        let doc = parse("a</b>c");
        assert_eq!(raw_text(&doc), "a</b>c");
    }

    #[test]
    fn test_unterminated_open_is_text() {
        let doc = parse("<b>abc");
        assert_eq!(raw_text(&doc), "<b>abc");
        assert!(doc.children().iter().all(|n| n.as_text().is_some()));

        // Only the unterminated tag degrades; closed ones keep their style.
        let doc = parse("<i>x</i><b>y");
        assert_eq!(serialize(&doc), "<i>x</i><b>y");
        assert!(doc.children()[0].as_tag().is_some());
    }

    #[test]
    fn test_outer_close_degrades_inner_tag() {
        let doc = parse("<i>x<b>y</i>");
        assert_eq!(raw_text(&doc), "x<b>y");
        assert_eq!(serialize(&doc), "<i>x<b>y</i>");
        let italic = doc.children()[0].as_tag().unwrap();
        assert_eq!(italic.kind(), StyleKind::Italic);
        assert!(italic.children().iter().all(|n| n.as_text().is_some()));
    }

    #[test]
    fn test_overlapping_close_keeps_inner_text() {
        let doc = parse("<b>a<i>b</b>c</i>");
        assert_eq!(raw_text(&doc), "a<i>bc</i>");
        insta::assert_snapshot!(serialize(&doc), @"<b>a<i>b</b>c</i>");
    }

    #[test]
    fn test_skipped_empty_tag_is_not_lost() {
        let doc = parse("<b><i></b>");
        assert_eq!(raw_text(&doc), "<i>");
        assert_eq!(serialize(&doc), "<b><i></b>");
    }

    #[test]
    fn test_malformed_markup_reaches_fixed_point() {
        for markup in [
            "<i><b></i><i>",
            "<b><i></b>",
            "<i>x<b>y</i>",
            "<b>a<i>b</b>c</i>",
            "</u><u>a<b>b</u>c",
            "<+1><-1>x</+1></-1>",
            "<<b>b>x</b>",
            "<b>x</b></b><b>",
        ] {
            let once = serialize(&parse(markup));
            let doc = parse(&once);
            assert_eq!(serialize(&doc), once, "{markup}");
            assert_eq!(raw_text(&doc), raw_text(&parse(markup)), "{markup}");
        }
    }

    #[test]
    fn test_round_trip_of_serialized() {
        for markup in [
            "",
            "plain",
            "<u>under</u> and <b>bold <i>both</i></b>",
            "<+1><b>a</b>b</+1><-1>c</-1>",
        ] {
            let once = serialize(&parse(markup));
            assert_eq!(serialize(&parse(&once)), once);
            assert_eq!(parse(&once), parse(markup));
        }
    }
}
