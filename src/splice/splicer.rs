//! Splicing rendered payloads into host statements.

use tracing::debug;

use crate::splice::balance::check;

/// Marks the injection point in a host statement.
pub const INJECTION_MARKER: &str = "$$";

/// SQL line-comment marker.
pub const LINE_COMMENT: &str = "--";

/// What surrounds the injection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionContext {
    /// The marker is followed by `'`; the payload is inserted unmodified.
    String,
    /// Anything else; the payload loses its leading quote-closer.
    NonString,
}

/// A host statement with the payload spliced in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spliced {
    pub sql: String,
    pub context: InjectionContext,
    /// True if a closing parenthesis was added to restore balance.
    pub repaired: bool,
}

/// Splices `payload` into every injection marker of `host`.
///
/// Returns `None` if `host` has no marker. The result is not guaranteed
/// balanced; callers re-check [`effective_text`].
#[must_use]
pub fn splice(host: &str, payload: &str) -> Option<Spliced> {
    let first = host.find(INJECTION_MARKER)?;
    let after = &host[first + INJECTION_MARKER.len()..];
    let context = if after.starts_with('\'') {
        InjectionContext::String
    } else {
        InjectionContext::NonString
    };

    let inserted = match context {
        InjectionContext::String => payload,
        InjectionContext::NonString => drop_first_char(payload),
    };
    let mut sql = strip_trailing_comments(&host.replace(INJECTION_MARKER, inserted));

    let mut repaired = false;
    if let Err(imbalance) = check(effective_text(&sql)) {
        let at = sql.find(LINE_COMMENT).unwrap_or(sql.len());
        debug!(%imbalance, position = at, "adding a closing parenthesis");
        sql.insert(at, ')');
        sql = strip_trailing_comments(&sql);
        repaired = true;
    }

    Some(Spliced {
        sql,
        context,
        repaired,
    })
}

/// Splices `payload` into `host`, returning only the statement text.
#[must_use]
pub fn insert(host: &str, payload: &str) -> Option<String> {
    splice(host, payload).map(|s| s.sql)
}

/// Removes every `--` that is followed by nothing but whitespace, together
/// with what follows it. Comments with content after them are kept.
#[must_use]
pub fn strip_trailing_comments(text: &str) -> String {
    let positions: Vec<usize> = text.match_indices(LINE_COMMENT).map(|(i, _)| i).collect();
    let mut out = text.to_string();
    for pos in positions.into_iter().rev() {
        if out[pos + LINE_COMMENT.len()..].trim().is_empty() {
            out.truncate(pos);
        }
    }
    out
}

/// The part of `text` before its first line comment.
#[must_use]
pub fn effective_text(text: &str) -> &str {
    text.find(LINE_COMMENT).map_or(text, |pos| &text[..pos])
}

fn drop_first_char(text: &str) -> &str {
    let mut chars = text.chars();
    chars.next();
    chars.as_str()
}
