//! Monetary amount normalization.
//!
//! Statements print amounts with thousands separators whose meaning
//! depends on the issuer's locale. [`DecimalConvention`] selects how `.`
//! and `,` are read; [`clean_amount`] is the lenient entry point that
//! falls back to `0.0`.

use extracto_statement_models::DecimalConvention;

/// Parses `raw` into an amount, or `0.0` if it is empty or not numeric.
#[must_use]
pub fn clean_amount(raw: &str, convention: DecimalConvention) -> f64 {
    parse_amount(raw, convention).unwrap_or(0.0)
}

/// Parses `raw` into an amount.
///
/// Accepts a leading `$`, a leading or trailing `-`, and accounting-style
/// parentheses for negatives. A lone dash is a printed zero. Returns
/// `None` when anything other than digits and separators remains.
#[must_use]
pub fn parse_amount(raw: &str, convention: DecimalConvention) -> Option<f64> {
    let (negative, body) = split_sign(raw)?;

    let normalized = match convention {
        DecimalConvention::StripAll => body.replace(['.', ','], ""),
        DecimalConvention::Comma => body.replace(',', ""),
        DecimalConvention::Dot => body.replace('.', "").replace(',', "."),
        DecimalConvention::Auto => match decimal_separator(&body) {
            Some(sep) => body
                .chars()
                .filter_map(|c| match c {
                    c if c == sep => Some('.'),
                    '.' | ',' => None,
                    c => Some(c),
                })
                .collect(),
            None => body.replace(['.', ','], ""),
        },
    };

    let value = normalized.parse::<f64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Whether `token` reads as an amount (digits with optional separators
/// and sign, or a lone dash for zero).
#[must_use]
pub fn looks_monetary(token: &str) -> bool {
    split_sign(token).is_some()
}

/// Strips sign markers and currency noise. Returns the sign and the
/// remaining digits-and-separators body, or `None` if the body is not
/// numeric.
fn split_sign(raw: &str) -> Option<(bool, String)> {
    let mut s = raw.trim();
    if is_dash(s) {
        return Some((false, "0".to_owned()));
    }
    let mut negative = false;

    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_suffix('-') {
        negative = !negative;
        s = rest.trim_end();
    }
    s = s.strip_prefix('$').unwrap_or(s);

    let body: String = s.chars().filter(|c| !c.is_whitespace()).collect();

    let valid = body.chars().any(|c| c.is_ascii_digit())
        && body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',');

    valid.then_some((negative, body))
}

/// Whether `s` is a single dash, which statements print for a zero amount.
fn is_dash(s: &str) -> bool {
    matches!(s, "-" | "\u{2013}" | "\u{2014}")
}

/// Guesses which separator in `body` is the decimal point.
///
/// With both kinds present, the rightmost one is decimal. With a single
/// kind, it groups thousands when it repeats or is followed by exactly
/// three digits, and is decimal otherwise.
fn decimal_separator(body: &str) -> Option<char> {
    let last_dot = body.rfind('.');
    let last_comma = body.rfind(',');

    match (last_dot, last_comma) {
        (Some(d), Some(c)) => Some(if d > c { '.' } else { ',' }),
        (Some(pos), None) | (None, Some(pos)) => {
            let sep = if last_dot.is_some() { '.' } else { ',' };
            let repeats = body.matches(sep).count() > 1;
            let digits_after = body.len() - pos - 1;
            if repeats || digits_after == 3 {
                None
            } else {
                Some(sep)
            }
        }
        (None, None) => None,
    }
}
