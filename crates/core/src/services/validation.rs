//! RUT and email validation.
//!
//! Pure functions; no I/O. Malformed input yields `false`, never an error.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum length of an email address.
pub const MAX_EMAIL_LENGTH: usize = 254;

#[allow(clippy::expect_used)] // literal pattern
static NATIONAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{7,8}-[\dkK]$").expect("valid national id pattern"));

#[allow(clippy::expect_used)] // literal pattern
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("valid email pattern")
});

/// Modulo-11 check character for the numeric body of a RUT.
fn check_character(body: &str) -> Option<char> {
    let mut sum = 0u32;
    for (i, c) in body.chars().rev().enumerate() {
        let digit = c.to_digit(10)?;
        // weights cycle 2,3,4,5,6,7
        let weight = (i as u32 % 6) + 2;
        sum += digit * weight;
    }

    match 11 - (sum % 11) {
        11 => Some('0'),
        10 => Some('K'),
        n => char::from_digit(n, 10),
    }
}

/// Validate a Chilean RUT such as `12.345.678-5` or `12345678-5`.
#[must_use]
pub fn validate_national_id(id: &str) -> bool {
    let cleaned: String = id.trim().chars().filter(|c| *c != '.').collect();
    if !NATIONAL_ID_RE.is_match(&cleaned) {
        return false;
    }

    let Some((body, check)) = cleaned.split_once('-') else {
        return false;
    };

    match (check_character(body), check.chars().next()) {
        (Some(expected), Some(given)) => expected.eq_ignore_ascii_case(&given),
        _ => false,
    }
}

/// Syntactic email check.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.len() <= MAX_EMAIL_LENGTH && EMAIL_RE.is_match(email)
}

/// Format a RUT for display: `123456789` becomes `12.345.678-9`.
///
/// Never rejects input. Anything shorter than two significant characters is
/// returned unchanged.
#[must_use]
pub fn format_national_id(raw: &str) -> String {
    let cleaned: Vec<char> = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'k' || *c == 'K')
        .collect();

    if cleaned.len() < 2 {
        return raw.to_string();
    }

    let (body, check) = cleaned.split_at(cleaned.len() - 1);
    let mut grouped = String::with_capacity(body.len() + body.len() / 3 + 2);
    for (i, c) in body.iter().enumerate() {
        if i > 0 && (body.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    format!("{grouped}-{}", check[0].to_ascii_uppercase())
}
