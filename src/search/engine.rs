//! Buffer search and replace.
//!
//! Stateless per invocation: every call works from the document's
//! current text, cursor and selection. Wrap-around is unconditional.

use super::query::{Result, SearchDirection, SearchQuery, SearchScope};
use crate::models::{Document, Selection};

/// Match coordinates, always re-derived from flat offsets through the
/// document's line index. Never cached across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOutcome {
    Found(SearchMatch),
    NoMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub replaced: bool,
    pub next: FindOutcome,
}

/// Scope snapshot: text to match against plus its char offset in the
/// document, so selection-scoped matches still report absolute
/// coordinates.
struct Scope {
    text: String,
    start_char: usize,
}

fn resolve_scope(doc: &Document, query: &SearchQuery) -> Scope {
    if query.scope == SearchScope::Selection && doc.has_selection() {
        if let Some(sel) = doc.selection() {
            let start = doc.pos_to_char(sel.start());
            let end = doc.pos_to_char(sel.end());
            return Scope {
                text: doc.rope().slice(start..end).to_string(),
                start_char: start,
            };
        }
    }
    Scope {
        text: doc.content(),
        start_char: 0,
    }
}

/// Char offset the search starts from: selection start when a
/// selection is active, else the cursor.
fn current_char(doc: &Document) -> usize {
    match doc.selection() {
        Some(sel) if !sel.is_empty() => doc.pos_to_char(sel.start()),
        _ => doc.pos_to_char(doc.cursor()),
    }
}

fn match_at(doc: &Document, start_char: usize, end_char: usize) -> SearchMatch {
    let rope = doc.rope();
    let start_line = rope.char_to_line(start_char);
    let end_line = rope.char_to_line(end_char);
    SearchMatch {
        start_line,
        start_col: start_char - rope.line_to_char(start_line),
        end_line,
        end_col: end_char - rope.line_to_char(end_line),
    }
}

/// Locate the next/previous match. Returns `NoMatch` when the scope has
/// none; `InvalidPattern` only when the regex fails to compile. Document
/// state is never touched.
pub fn find_next(doc: &Document, query: &SearchQuery) -> Result<FindOutcome> {
    let regex = query.compile()?;
    let scope = resolve_scope(doc, query);

    // byte-span matches converted to char offsets incrementally
    let mut matches: Vec<(usize, usize)> = Vec::new();
    let mut last_byte = 0usize;
    let mut last_char = 0usize;
    for m in regex.find_iter(&scope.text) {
        last_char += scope.text[last_byte..m.start()].chars().count();
        let start = last_char;
        let len = scope.text[m.start()..m.end()].chars().count();
        matches.push((start, start + len));
        last_byte = m.start();
    }
    if matches.is_empty() {
        return Ok(FindOutcome::NoMatch);
    }

    let cursor_rel = current_char(doc).saturating_sub(scope.start_char);
    let picked = match query.direction {
        SearchDirection::Forward => {
            let from = if doc.has_selection() {
                cursor_rel + 1
            } else {
                cursor_rel
            };
            matches
                .iter()
                .find(|(s, _)| *s >= from)
                .or_else(|| matches.first())
        }
        SearchDirection::Backward => matches
            .iter()
            .rev()
            .find(|(s, _)| *s < cursor_rel)
            .or_else(|| matches.last()),
    };

    let (s, e) = *picked.expect("non-empty match list");
    Ok(FindOutcome::Found(match_at(
        doc,
        scope.start_char + s,
        scope.start_char + e,
    )))
}

/// `find_next`, then move the document's selection and cursor onto the
/// match when one is found.
pub fn find_and_select(doc: &mut Document, query: &SearchQuery) -> Result<FindOutcome> {
    let outcome = find_next(doc, query)?;
    if let FindOutcome::Found(m) = outcome {
        doc.set_selection(Some(Selection::new(
            (m.start_line, m.start_col),
            (m.end_line, m.end_col),
        )));
        doc.set_cursor(m.end_line, m.end_col);
    }
    Ok(outcome)
}

/// Replace the currently selected match (back-reference expansion only
/// for regex queries), then find-next forward.
pub fn replace_one(
    doc: &mut Document,
    query: &SearchQuery,
    replacement: &str,
) -> Result<ReplaceOutcome> {
    let regex = query.compile()?;
    let mut replaced = false;

    if let Some(sel) = doc.selection().copied() {
        if !sel.is_empty() {
            let start = doc.pos_to_char(sel.start());
            let end = doc.pos_to_char(sel.end());
            let selected = doc.rope().slice(start..end).to_string();
            let rendered = if query.is_regex {
                regex.replace(&selected, replacement).into_owned()
            } else {
                replacement.to_string()
            };
            doc.replace_range(start..end, &rendered)
                .expect("selection range within bounds");
            doc.clear_selection();
            let caret = doc
                .offset_to_line_col(start + rendered.chars().count())
                .expect("caret within bounds");
            doc.set_cursor(caret.0, caret.1);
            replaced = true;
        }
    }

    let forward = SearchQuery {
        direction: SearchDirection::Forward,
        ..query.clone()
    };
    let next = find_and_select(doc, &forward)?;
    Ok(ReplaceOutcome { replaced, next })
}

/// Substitute every match in the scope in one pass, written back as a
/// single buffer edit. Returns the number of replacements.
pub fn replace_all(doc: &mut Document, query: &SearchQuery, replacement: &str) -> Result<usize> {
    let regex = query.compile()?;
    let scope = resolve_scope(doc, query);
    let count = regex.find_iter(&scope.text).count();
    if count == 0 {
        return Ok(0);
    }
    let new_text = if query.is_regex {
        regex.replace_all(&scope.text, replacement).into_owned()
    } else {
        regex
            .replace_all(&scope.text, regex::NoExpand(replacement))
            .into_owned()
    };
    let start = scope.start_char;
    let end = start + scope.text.chars().count();
    doc.replace_range(start..end, &new_text)
        .expect("scope range within bounds");
    Ok(count)
}
