//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// International phone number regex (E.164 format, at least 8 digits)
static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{7,14}$").expect("E.164 pattern is valid")
});

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Characters users type between digit groups
fn is_phone_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | '.' | '(' | ')')
}

/// Normalize user input to E.164 (`+` followed by the full international number)
///
/// Accepts spaces, dashes, dots and parentheses, a `00` international
/// prefix, and numbers entered without the leading `+`. Any other
/// character rejects the input. Returns `None` when the result is not a
/// plausible E.164 number.
pub fn normalize_to_e164(raw: &str) -> Option<String> {
    let mut stripped = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        match c {
            '0'..='9' => stripped.push(c),
            // A '+' is only meaningful as the very first character
            '+' if stripped.is_empty() => stripped.push(c),
            c if is_phone_separator(c) => {}
            _ => return None,
        }
    }

    let candidate = if stripped.starts_with('+') {
        stripped
    } else if let Some(rest) = stripped.strip_prefix("00") {
        format!("+{}", rest)
    } else {
        format!("+{}", stripped)
    };

    if E164_REGEX.is_match(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Mask a phone number for display and logs (e.g., +15****0000)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(normalize_phone_number("555-123-0000"), "5551230000");
        assert_eq!(normalize_phone_number("+1 (555) 123 0000"), "+15551230000");
        assert_eq!(normalize_phone_number("+961.70.000.000"), "+96170000000");
    }

    #[test]
    fn test_normalize_to_e164() {
        assert_eq!(normalize_to_e164("+15551230000").as_deref(), Some("+15551230000"));
        assert_eq!(normalize_to_e164(" +1 (555) 123-0000 ").as_deref(), Some("+15551230000"));
        assert_eq!(normalize_to_e164("0096170000000").as_deref(), Some("+96170000000"));
        assert_eq!(normalize_to_e164("96170000000").as_deref(), Some("+96170000000"));
    }

    #[test]
    fn test_normalize_to_e164_rejects_invalid() {
        assert_eq!(normalize_to_e164(""), None);
        assert_eq!(normalize_to_e164("abc"), None);
        assert_eq!(normalize_to_e164("+0123456789"), None); // Invalid country code
        assert_eq!(normalize_to_e164("+1234"), None); // Too short
        assert_eq!(normalize_to_e164("+1234567890123456"), None); // Too long
        assert_eq!(normalize_to_e164("+1555+1230000"), None);
        assert_eq!(normalize_to_e164("++15551230000"), None);
    }

    #[test]
    fn test_normalize_to_e164_rejects_stray_characters() {
        assert_eq!(normalize_to_e164("+1555abc1230000"), None);
        assert_eq!(normalize_to_e164("+1 555 123 0000 ext 7"), None);
        assert_eq!(normalize_to_e164("+1/555/123/0000"), None);
        assert_eq!(normalize_to_e164("+1555\u{ff11}230000"), None); // Fullwidth digit
    }

    #[test]
    fn test_mask_phone_number() {
        assert_eq!(mask_phone_number("+15551230000"), "+15****0000");
        assert_eq!(mask_phone_number("+96170000000"), "+96****0000");
        assert_eq!(mask_phone_number("12345"), "****");
    }
}
