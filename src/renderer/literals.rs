//! Free-form literal generators (`$int$`, `$float$`, `$hex$`, `$time$`,
//! `$character$`, `$date$`).

use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::renderer::format::quote_string;
use crate::types::{ExpectedType, LiteralKind};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// How textual literals are spliced into the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralStyle {
    /// Every literal raw; the template supplies any quotes.
    Bare,
    /// Time, date and character literals single-quoted.
    Quoted,
}

/// Draws one fresh value for a literal generator.
pub fn generate<R: Rng + ?Sized>(kind: LiteralKind, rng: &mut R) -> String {
    match kind {
        LiteralKind::Integer => rng.gen_range(0..=100_u32).to_string(),
        LiteralKind::Float => format!("{:.2}", rng.gen_range(0.0..=10.0_f64)),
        LiteralKind::Hex => format!("{:#x}", rng.gen_range(0..=0xFFFF_FFFF_u32)),
        LiteralKind::Time => format!(
            "{:02}:{:02}:{:02}",
            rng.gen_range(0..24_u32),
            rng.gen_range(0..60_u32),
            rng.gen_range(0..60_u32)
        ),
        LiteralKind::Character => {
            let letter = LETTERS.choose(rng).copied().unwrap_or(b'a');
            char::from(letter).to_string()
        }
        LiteralKind::Date => random_date(rng),
    }
}

/// A date in `[2000-01-01, 2025-12-31]` as `YYYY-MM-DD`.
fn random_date<R: Rng + ?Sized>(rng: &mut R) -> String {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
    let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default();
    let span = (end - start).num_days();
    let day = start + Duration::days(rng.gen_range(0..=span));
    day.format("%Y-%m-%d").to_string()
}

/// Result of running every literal generator over a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralResolution {
    pub text: String,
    /// One entry per replaced marker, in resolution order.
    pub resolved: Vec<LiteralKind>,
}

/// Replaces every literal-generator marker with a fresh value.
///
/// Generators run in [`LiteralKind::ALL`] order; within one generator markers
/// are replaced left to right.
pub fn resolve_literals<R: Rng + ?Sized>(
    template: &str,
    style: LiteralStyle,
    rng: &mut R,
) -> LiteralResolution {
    let mut text = template.to_string();
    let mut resolved = Vec::new();
    for kind in LiteralKind::ALL {
        let marker = kind.marker();
        if !text.contains(marker) {
            continue;
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text.as_str();
        while let Some(pos) = rest.find(marker) {
            out.push_str(&rest[..pos]);
            let value = generate(kind, rng);
            if style == LiteralStyle::Quoted && kind.is_textual() {
                out.push_str(&quote_string(&value));
            } else {
                out.push_str(&value);
            }
            resolved.push(kind);
            rest = &rest[pos + marker.len()..];
        }
        out.push_str(rest);
        text = out;
    }
    LiteralResolution { text, resolved }
}

/// Removes, for each resolved generator, the first expected-type tag naming it.
pub fn consume_literal_tags(expected: &mut Vec<ExpectedType>, resolved: &[LiteralKind]) {
    for kind in resolved {
        if let Some(pos) = expected.iter().position(|t| t.tag() == kind.tag()) {
            expected.remove(pos);
        }
    }
}
