//! Property tests for parser losslessness and span consistency

use proptest::prelude::*;
use scriptpatch_syntax::{parse, Document};

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,8}".prop_filter("keywords need their own grammar", |s| {
        s != "val" && s != "import"
    })
}

fn string_literal() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:._-]{0,12}".prop_map(|s| format!("\"{}\"", s))
}

fn call() -> impl Strategy<Value = String> {
    (ident(), proptest::collection::vec(string_literal(), 0..3)).prop_map(|(name, args)| {
        format!("{}({})", name, args.join(", "))
    })
}

fn statement() -> impl Strategy<Value = String> {
    prop_oneof![
        call(),
        (ident(), string_literal()).prop_map(|(l, r)| format!("{} = {}", l, r)),
        ident(),
    ]
}

fn block() -> impl Strategy<Value = String> {
    (ident(), proptest::collection::vec(statement(), 0..4)).prop_map(|(name, stmts)| {
        let mut body = String::new();
        for s in &stmts {
            body.push_str("\n    ");
            body.push_str(s);
        }
        format!("{} {{{}\n}}", name, body)
    })
}

fn script() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof![block(), statement()], 0..5)
        .prop_map(|items| items.join("\n"))
}

fn assert_spans_consistent(doc: &Document) {
    let text = doc.full_text();
    for node in doc.descendants(doc.root()) {
        let span = doc.span(node).expect("attached node has a span");
        assert_eq!(doc.text(node), text[span.start..span.end]);
    }
}

proptest! {
    #[test]
    fn parse_is_lossless(text in script()) {
        let doc = parse(&text).unwrap();
        prop_assert_eq!(doc.full_text(), text);
    }

    #[test]
    fn spans_match_node_text(text in script()) {
        let doc = parse(&text).unwrap();
        assert_spans_consistent(&doc);
    }
}
