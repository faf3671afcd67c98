//! Phone number normalization.

use regex::Regex;
use std::sync::LazyLock;

/// Country prefix prepended to the local number on submission.
pub const DEFAULT_COUNTRY_PREFIX: &str = "+359";

/// Local number length in digits.
const LOCAL_DIGITS: usize = 9;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{3}-\d{3}$").expect("valid regex"));

/// Normalize raw input into `DDD-DDD-DDD`.
///
/// Non-digits are stripped, a single leading `0` is dropped and the rest is
/// truncated to nine digits before grouping by three. Partial input yields
/// a partial grouping (`"89835"` becomes `"898-35"`).
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = digits.strip_prefix('0').unwrap_or(&digits);

    let digits: Vec<char> = digits.chars().take(LOCAL_DIGITS).collect();
    digits
        .chunks(3)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// Whether `value` is a complete local number.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value)
}

/// Join the country prefix and the local number the way the API expects.
pub fn with_country_prefix(prefix: &str, phone: &str) -> String {
    format!("{} {}", prefix, phone)
}
