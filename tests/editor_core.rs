//! End-to-end properties of the editor core, exercised through the
//! public API the shell consumes.

use padcore::models::{BookmarkSet, Document, EolMode, Selection};
use padcore::search::{
    find_and_select, find_next, replace_all, FindOutcome, FindInFilesService, ScanMessage,
    ScanOptions, SearchError, SearchQuery,
};
use padcore::services::{read_document, write_document};
use padcore::symbols::list_symbols;
use padcore::syntax::{Highlighter, LanguageId};
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

fn query(pattern: &str) -> SearchQuery {
    SearchQuery {
        case_sensitive: true,
        ..SearchQuery::literal(pattern)
    }
}

#[test]
fn offset_conversions_are_mutually_inverse() {
    let doc = Document::from_text("fn main() {\n    täst\n}\n", EolMode::Lf);
    for offset in 0..=doc.len_chars() {
        let (l, c) = doc.offset_to_line_col(offset).unwrap();
        assert_eq!(doc.line_col_to_offset(l, c).unwrap(), offset);
    }
    for line in 0..doc.len_lines() {
        let len = doc.line_text(line).unwrap().chars().count();
        for col in 0..=len {
            let off = doc.line_col_to_offset(line, col).unwrap();
            assert_eq!(doc.offset_to_line_col(off).unwrap(), (line, col));
        }
    }
}

#[test]
fn save_load_roundtrip_preserves_eol_and_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");

    let mut doc = Document::from_text("alpha\r\nbeta\r\n", EolMode::Crlf);
    write_document(&path, &doc).unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"alpha\r\nbeta\r\n");

    let loaded = read_document(&path).unwrap();
    assert_eq!(loaded.eol, EolMode::Crlf);
    doc.load_text(&loaded.content, loaded.eol);
    assert_eq!(doc.text(), "alpha\r\nbeta\r\n");
    assert!(!doc.is_modified());
}

#[test]
fn bookmark_cycle_matches_expected_order() {
    let mut marks = BookmarkSet::new();
    for line in [2, 5, 9] {
        marks.toggle(line);
    }
    assert_eq!(marks.next(9), Some(2));
    assert_eq!(marks.previous(2), Some(9));
    assert_eq!(marks.next(5), Some(9));
    // previous(next(L)) 回到环上的前驱
    assert_eq!(marks.previous(marks.next(9).unwrap()), Some(9));
}

#[test]
fn search_wraps_from_second_foo_to_first() {
    let mut doc = Document::from_text("foo bar foo", EolMode::Lf);
    let (line, col) = doc.offset_to_line_col(8).unwrap();
    doc.set_cursor(line, col);
    doc.set_selection(Some(Selection::new((0, 8), (0, 11))));

    match find_next(&doc, &query("foo")).unwrap() {
        FindOutcome::Found(m) => assert_eq!((m.start_line, m.start_col), (0, 0)),
        FindOutcome::NoMatch => panic!("expected wrap-around match"),
    }
}

#[test]
fn whole_word_skips_substring_matches() {
    let doc = Document::from_text("concatenate cat", EolMode::Lf);
    let q = SearchQuery {
        whole_word: true,
        ..query("cat")
    };
    match find_next(&doc, &q).unwrap() {
        FindOutcome::Found(m) => {
            assert_eq!(doc.line_col_to_offset(m.start_line, m.start_col).unwrap(), 12);
        }
        FindOutcome::NoMatch => panic!("expected whole-word match"),
    }
}

#[test]
fn regex_replace_all_expands_backrefs() {
    let mut doc = Document::from_text("a1 a2 a3", EolMode::Lf);
    let q = SearchQuery {
        case_sensitive: true,
        ..SearchQuery::regex(r"a(\d)")
    };
    let n = replace_all(&mut doc, &q, "x$1").unwrap();
    assert_eq!(n, 3);
    assert_eq!(doc.content(), "x1 x2 x3");
    assert!(doc.is_modified());
}

#[test]
fn malformed_regex_surfaces_invalid_pattern() {
    let mut doc = Document::from_text("text", EolMode::Lf);
    doc.set_cursor(0, 1);
    let q = SearchQuery::regex("(");
    match find_and_select(&mut doc, &q) {
        Err(SearchError::InvalidPattern(msg)) => assert!(!msg.is_empty()),
        other => panic!("expected InvalidPattern, got {:?}", other),
    }
    assert_eq!(doc.cursor(), (0, 1));
    assert!(!doc.is_modified());
}

#[test]
fn find_in_files_fixture() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.py"), "TODO: fix").unwrap();
    fs::write(dir.path().join("b.txt"), "todo: FIX").unwrap();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let service = FindInFilesService::new(rt.handle().clone());
    let (tx, rx) = mpsc::channel();
    service
        .scan(
            ScanOptions {
                root: dir.path().to_path_buf(),
                masks: "*.py".into(),
                pattern: "TODO".into(),
                case_sensitive: true,
                whole_word: false,
                is_regex: false,
                recursive: true,
            },
            tx,
        )
        .unwrap();

    let mut results = Vec::new();
    loop {
        match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            ScanMessage::FileMatches { mut matches, .. } => results.append(&mut matches),
            ScanMessage::Complete { .. } => break,
            ScanMessage::Cancelled { .. } => panic!("unexpected cancel"),
        }
    }
    assert_eq!(results.len(), 1);
    assert!(results[0].path.ends_with(Path::new("a.py")));
    assert_eq!(results[0].line, 1);
}

#[test]
fn highlighting_is_idempotent_and_language_scoped() {
    let hl = Highlighter::new(Some(LanguageId::Python));
    let line = "def greet(name):  # say hello";
    let first = hl.highlight_line(0, line);
    let second = hl.highlight_line(0, line);
    assert_eq!(first, second);
    assert!(!first.is_empty());

    let plain = Highlighter::new(None);
    assert!(plain.highlight_line(0, line).is_empty());
}

#[test]
fn symbol_outline_tracks_buffer_edits() {
    let mut doc = Document::from_text("def one():\n    pass\n", EolMode::Lf);
    let syms = list_symbols(&doc.content(), Some(LanguageId::Python));
    assert_eq!(syms.len(), 1);

    doc.insert(doc.len_chars(), "\ndef two():\n    pass\n").unwrap();
    let syms = list_symbols(&doc.content(), Some(LanguageId::Python));
    let labels: Vec<_> = syms.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["def one", "def two"]);
}
