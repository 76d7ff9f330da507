//! Pest parser integration for payload template placeholders.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::error::{Result, SynthError};
use crate::parser::ast::{Placeholder, PlaceholderKind};

#[derive(Parser)]
#[grammar = "parser/placeholder.pest"]
struct TemplateParser;

/// Parses a template into its placeholders, in left-to-right text order.
///
/// # Errors
///
/// Returns a `ParseError` if the grammar rejects the input.
pub fn parse_placeholders(template: &str) -> Result<Vec<Placeholder>> {
    let pairs = TemplateParser::parse(Rule::template, template).map_err(|e| {
        let (line, col) = match e.line_col {
            pest::error::LineColLocation::Pos((l, c))
            | pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        SynthError::ParseError {
            line,
            col,
            message: e.variant.message().to_string(),
        }
    })?;

    let mut placeholders = Vec::new();
    for pair in pairs {
        if pair.as_rule() != Rule::template {
            continue;
        }
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::placeholder {
                placeholders.push(build_placeholder(inner));
            }
        }
    }
    Ok(placeholders)
}

fn build_placeholder(pair: Pair<Rule>) -> Placeholder {
    let span = pair.as_span();
    let range = span.start()..span.end();
    let raw = pair.as_str();
    let content = raw[1..raw.len() - 1].to_string();

    let kind = pair
        .into_inner()
        .next()
        .and_then(build_kind)
        .unwrap_or(PlaceholderKind::Unknown { content });
    Placeholder::new(kind, range)
}

fn build_kind(body: Pair<Rule>) -> Option<PlaceholderKind> {
    let rule = body.as_rule();
    let ids = body
        .into_inner()
        .filter(|p| p.as_rule() == Rule::number)
        .map(|p| p.as_str().parse::<u32>().ok())
        .collect::<Option<Vec<u32>>>()?;

    match (rule, ids.as_slice()) {
        (Rule::table_ref, &[table_id]) => Some(PlaceholderKind::Table { table_id }),
        (Rule::column_ref, &[table_id, column_id]) => Some(PlaceholderKind::Column {
            table_id,
            column_id,
        }),
        (Rule::sample_ref, &[table_id, column_id]) => Some(PlaceholderKind::Sample {
            table_id,
            column_id,
        }),
        // other_ref, or ids too large for u32
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_kinds_in_order() {
        let t = "SELECT $column_t1_2$ FROM $table_1$ WHERE x=$sample_t1_2$ AND $sysInfo$";
        let ps = parse_placeholders(t).unwrap();
        assert_eq!(ps.len(), 4);
        assert_eq!(
            ps[0].kind,
            PlaceholderKind::Column {
                table_id: 1,
                column_id: 2
            }
        );
        assert_eq!(ps[1].kind, PlaceholderKind::Table { table_id: 1 });
        assert_eq!(
            ps[2].kind,
            PlaceholderKind::Sample {
                table_id: 1,
                column_id: 2
            }
        );
        assert_eq!(
            ps[3].kind,
            PlaceholderKind::Unknown {
                content: "sysInfo".into()
            }
        );
        assert_eq!(ps[1].text(t), "$table_1$");
    }

    #[test]
    fn test_spans_cover_markers() {
        let t = "a$table_12$b";
        let ps = parse_placeholders(t).unwrap();
        assert_eq!(ps[0].span, 1..11);
        assert_eq!(ps[0].kind, PlaceholderKind::Table { table_id: 12 });
    }

    #[test]
    fn test_prefix_match_keeps_ids() {
        let ps = parse_placeholders("$table_3x$ $column_t2_5_name$").unwrap();
        assert_eq!(ps[0].kind, PlaceholderKind::Table { table_id: 3 });
        assert_eq!(ps[1].column_ref(), Some((2, 5)));
    }

    #[test]
    fn test_malformed_markers_are_unknown_or_text() {
        let ps = parse_placeholders("$column_t1$ $table_x$ $$ $ $a b$").unwrap();
        let kinds: Vec<_> = ps.iter().map(Placeholder::kind_name).collect();
        assert_eq!(kinds, vec!["unknown", "unknown"]);
    }

    #[test]
    fn test_non_ascii_word_is_unknown() {
        let t = "' AND $列$=1 AND $tablé$ --";
        let ps = parse_placeholders(t).unwrap();
        let kinds: Vec<_> = ps.iter().map(Placeholder::kind_name).collect();
        assert_eq!(kinds, vec!["unknown", "unknown"]);
        assert_eq!(&t[ps[0].span.clone()], "$列$");
        assert_eq!(&t[ps[1].span.clone()], "$tablé$");
    }

    #[test]
    fn test_empty_template() {
        assert!(parse_placeholders("").unwrap().is_empty());
        assert!(parse_placeholders("' OR 1=1 --").unwrap().is_empty());
    }

    #[test]
    fn test_shared_sigil_is_not_reused() {
        // "$a$b$" holds one marker; the middle sigil closes the first.
        let ps = parse_placeholders("$a$b$").unwrap();
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].span, 0..3);
    }

    #[test]
    fn test_huge_id_falls_back_to_unknown() {
        let ps = parse_placeholders("$table_99999999999$").unwrap();
        assert_eq!(ps[0].kind_name(), "unknown");
    }
}
