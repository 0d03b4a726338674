use weaver_richtext::{
    Document, EditorConfig, EditorState, Selection, StyleKind, apply_style, check_coherence,
    parse, reconcile, serialize, tags_covering_range,
};

const SAMPLES: &[&str] = &[
    "",
    "abc",
    "<b>abc</b>",
    "a<b>b<i>c</i></b>d",
    "<u>ab</u><i>cd</i>",
    "x<+1>y<-1>z</-1></+1>",
    "<b>héllo</b> wörld",
];

fn assert_sound(doc: &Document, context: &str) {
    if let Err(err) = check_coherence(doc) {
        panic!("{context}: {err} in {}", serialize(doc));
    }
    let markup = serialize(doc);
    assert_eq!(parse(&markup), *doc, "{context}: round trip of {markup}");
}

#[test]
fn scenario_plain_text() {
    let doc = parse("abc");
    assert_eq!(doc.raw_text(), "abc");
    assert_eq!(serialize(&doc), "abc");
}

#[test]
fn scenario_single_tag() {
    insta::assert_snapshot!(serialize(&parse("<b>abc</b>")), @"<b>abc</b>");
}

#[test]
fn scenario_insertion() {
    let mut state = EditorState::from_markup("<b>abc</b>", EditorConfig::default());
    state.on_selection_change(Selection::collapsed(3)).unwrap();
    state.on_change_text("abcd").unwrap();
    insta::assert_snapshot!(state.markup(), @"<b>abcd</b>");
}

#[test]
fn scenario_deletion() {
    let mut state = EditorState::from_markup("<b>abc</b>", EditorConfig::default());
    state.on_selection_change(Selection::collapsed(3)).unwrap();
    state.on_change_text("ab").unwrap();
    assert_eq!(state.markup(), "<b>ab</b>");
    assert_eq!(state.selection(), Selection::collapsed(2));
    state.on_change_text("").unwrap();
    assert_eq!(state.markup(), "");
    assert_eq!(*state.document(), Document::empty());
}

#[test]
fn scenario_range_apply() {
    let doc = apply_style(&parse("<b>abc</b>"), 1, 2, StyleKind::Italic).unwrap();
    insta::assert_snapshot!(serialize(&doc), @"<b>a<i>b</i>c</b>");
    let tags = tags_covering_range(&doc, 1, 2).unwrap();
    assert!(tags.has(StyleKind::Bold));
    assert!(tags.has(StyleKind::Italic));
}

#[test]
fn scenario_replace_in_range() {
    let mut state = EditorState::from_markup("<b>abc</b>", EditorConfig::default());
    state.on_selection_change(Selection::new(1, 2)).unwrap();
    state.on_change_text("aTAGc").unwrap();
    insta::assert_snapshot!(state.markup(), @"<b>aTAGc</b>");
}

#[test]
fn reconcile_is_idempotent() {
    for markup in SAMPLES {
        let doc = parse(markup);
        let raw = doc.raw_text();
        let len = doc.len();
        for selection in [
            Selection::collapsed(0),
            Selection::collapsed(len),
            Selection::new(0, len),
        ] {
            let result = reconcile(&doc, selection, &raw).unwrap();
            assert_eq!(result.document, doc);
            assert_eq!(result.selection, selection);
        }
    }
}

#[test]
fn every_style_over_every_range() {
    for markup in SAMPLES {
        let doc = parse(markup);
        let raw = doc.raw_text();
        for start in 0..=doc.len() {
            for end in start..=doc.len() {
                for kind in StyleKind::ALL {
                    let context = format!("{kind} over {start}..{end} of {markup}");
                    let styled = apply_style(&doc, start, end, kind).unwrap();
                    assert_sound(&styled, &context);
                    assert_eq!(styled.raw_text(), raw, "{context}");
                    if start < end {
                        let covered = tags_covering_range(&styled, start, end).unwrap().has(kind);
                        let before = tags_covering_range(&doc, start, end).unwrap().has(kind);
                        assert_eq!(covered, !before, "{context}");
                    }
                }
            }
        }
    }
}

#[test]
fn every_single_char_edit() {
    for markup in SAMPLES {
        let doc = parse(markup);
        let chars: Vec<char> = doc.raw_text().chars().collect();
        for cursor in 0..=chars.len() {
            // Typing a char at the cursor.
            let mut typed = chars.clone();
            typed.insert(cursor, 'Z');
            let typed: String = typed.into_iter().collect();
            let result = reconcile(&doc, Selection::collapsed(cursor), &typed).unwrap();
            assert_sound(&result.document, &format!("type at {cursor} in {markup}"));
            assert_eq!(result.document.raw_text(), typed);
            assert_eq!(result.selection, Selection::collapsed(cursor + 1));

            // Backspace at the cursor.
            if cursor > 0 {
                let mut erased = chars.clone();
                erased.remove(cursor - 1);
                let erased: String = erased.into_iter().collect();
                let result = reconcile(&doc, Selection::collapsed(cursor), &erased).unwrap();
                assert_sound(&result.document, &format!("backspace at {cursor} in {markup}"));
                assert_eq!(result.document.raw_text(), erased);
                assert_eq!(result.selection, Selection::collapsed(cursor - 1));
            }
        }
    }
}

#[test]
fn every_selection_replacement() {
    for markup in SAMPLES {
        let doc = parse(markup);
        let chars: Vec<char> = doc.raw_text().chars().collect();
        for start in 0..chars.len() {
            for end in start + 1..=chars.len() {
                for replacement in ["", "Q", "QRST"] {
                    let mut text: String = chars[..start].iter().collect();
                    text.push_str(replacement);
                    text.extend(&chars[end..]);
                    let context =
                        format!("replace {start}..{end} with {replacement:?} in {markup}");
                    let result = reconcile(&doc, Selection::new(start, end), &text).unwrap();
                    assert_sound(&result.document, &context);
                    assert_eq!(result.document.raw_text(), text, "{context}");
                    assert!(result.selection.end <= result.document.len(), "{context}");
                }
            }
        }
    }
}

#[test]
fn malformed_markup_is_kept_and_stable() {
    const PIECES: &[&str] = &["<b>", "</b>", "<i>", "</i>", "x"];
    let mut inputs = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..4 {
        frontier = frontier
            .iter()
            .flat_map(|prefix| PIECES.iter().map(move |piece| format!("{prefix}{piece}")))
            .collect();
        inputs.extend(frontier.iter().cloned());
    }

    for markup in &inputs {
        let doc = parse(markup);
        assert_sound(&doc, markup);
        let once = serialize(&doc);
        assert_eq!(serialize(&parse(&once)), once, "{markup}");
        // Only matched open/close pairs are consumed, 7 bytes each.
        let consumed = markup.len() - doc.raw_text().len();
        assert_eq!(consumed % 7, 0, "{markup} became {:?}", doc.raw_text());
    }
}
