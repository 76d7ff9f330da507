//! Escape-aware bracket and quote balance checking.

use thiserror::Error;

/// Message reported for balanced text.
pub const BALANCED: &str = "balanced";

const QUOTES: [char; 3] = ['\'', '"', '`'];

/// Why a text failed the balance check. Positions are character indices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Imbalance {
    #[error("statement is missing")]
    Missing,

    #[error("position {position}: unexpected closing symbol '{symbol}'")]
    UnexpectedClose { position: usize, symbol: char },

    #[error("position {position}: mismatched symbols '{open}' and '{close}'")]
    Mismatched {
        position: usize,
        open: char,
        close: char,
    },

    #[error("{}", describe_unclosed(.brackets, .quotes))]
    Unclosed { brackets: Vec<char>, quotes: Vec<char> },
}

fn describe_unclosed(brackets: &[char], quotes: &[char]) -> String {
    let mut parts = Vec::new();
    if !brackets.is_empty() {
        parts.push(format!("unclosed brackets: {brackets:?}"));
    }
    if !quotes.is_empty() {
        parts.push(format!("unclosed quotes: {quotes:?}"));
    }
    parts.join("; ")
}

fn closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Checks that every bracket and quote in `text` is closed in order.
///
/// A character right after a backslash is skipped. Inside an open quote only
/// the same quote character closes it; brackets and other quotes are inert.
///
/// # Errors
///
/// Returns the first closing-bracket error, or the symbols left open at the end.
pub fn check(text: &str) -> Result<(), Imbalance> {
    let mut brackets: Vec<char> = Vec::new();
    let mut quotes: Vec<char> = Vec::new();
    let mut prev = None;

    for (position, c) in text.chars().enumerate() {
        let escaped = prev == Some('\\');
        prev = Some(c);
        if escaped {
            continue;
        }

        if let Some(&open) = quotes.last() {
            if c == open {
                quotes.pop();
            }
            continue;
        }

        match c {
            _ if QUOTES.contains(&c) => quotes.push(c),
            '(' | '[' | '{' => brackets.push(c),
            ')' | ']' | '}' => {
                let Some(open) = brackets.pop() else {
                    return Err(Imbalance::UnexpectedClose {
                        position,
                        symbol: c,
                    });
                };
                if closer(open) != c {
                    return Err(Imbalance::Mismatched {
                        position,
                        open,
                        close: c,
                    });
                }
            }
            _ => {}
        }
    }

    if brackets.is_empty() && quotes.is_empty() {
        Ok(())
    } else {
        Err(Imbalance::Unclosed { brackets, quotes })
    }
}

/// Like [`check`], failing immediately when there is no text.
///
/// # Errors
///
/// Returns [`Imbalance::Missing`] for `None`, otherwise as [`check`].
pub fn check_optional(text: Option<&str>) -> Result<(), Imbalance> {
    text.map_or(Err(Imbalance::Missing), check)
}

/// `(ok, message)` form of [`check`]; the message is `"balanced"` on success.
#[must_use]
pub fn report(text: &str) -> (bool, String) {
    match check(text) {
        Ok(()) => (true, BALANCED.to_string()),
        Err(e) => (false, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_text() {
        assert_eq!(check("SELECT (a[1]) FROM t WHERE {x} = 'y'"), Ok(()));
        assert_eq!(report("f(\"a\")"), (true, "balanced".to_string()));
        assert_eq!(check(""), Ok(()));
    }

    #[test]
    fn test_escaped_quote_is_ignored() {
        assert_eq!(check(r"a\'b"), Ok(()));
        assert_eq!(check(r"'a\'b'"), Ok(()));
    }

    #[test]
    fn test_unclosed_quote_reported() {
        let err = check("a'b").unwrap_err();
        assert_eq!(
            err,
            Imbalance::Unclosed {
                brackets: vec![],
                quotes: vec!['\'']
            }
        );
        assert_eq!(err.to_string(), "unclosed quotes: ['\\'']");
    }

    #[test]
    fn test_quotes_nest_inertly() {
        assert_eq!(check(r#"'he said "(" ok'"#), Ok(()));
        assert!(check(r#""a'b"#).is_err());
    }

    #[test]
    fn test_unexpected_close_fails_at_position() {
        assert_eq!(
            check("a)b(").unwrap_err(),
            Imbalance::UnexpectedClose {
                position: 1,
                symbol: ')'
            }
        );
    }

    #[test]
    fn test_mismatched_pair() {
        let err = check("(]").unwrap_err();
        assert_eq!(
            err,
            Imbalance::Mismatched {
                position: 1,
                open: '(',
                close: ']'
            }
        );
        assert_eq!(err.to_string(), "position 1: mismatched symbols '(' and ']'");
    }

    #[test]
    fn test_unclosed_brackets_and_quotes() {
        let (ok, message) = report("((\"");
        assert!(!ok);
        assert_eq!(
            message,
            "unclosed brackets: ['(', '(']; unclosed quotes: ['\"']"
        );
    }

    #[test]
    fn test_positions_count_characters() {
        assert_eq!(
            check("é)").unwrap_err(),
            Imbalance::UnexpectedClose {
                position: 1,
                symbol: ')'
            }
        );
    }

    #[test]
    fn test_missing_text() {
        assert_eq!(check_optional(None), Err(Imbalance::Missing));
        assert_eq!(check_optional(Some("()")), Ok(()));
    }
}
