//! Common validation utilities

/// Longest subject id accepted (matches the `VARCHAR(255)` key columns)
pub const MAX_SUBJECT_ID_LENGTH: usize = 255;

/// A subject id is non-blank, bounded, and free of control characters
pub fn is_valid_subject_id(subject_id: &str) -> bool {
    let trimmed = subject_id.trim();
    !trimmed.is_empty()
        && trimmed.len() == subject_id.len()
        && subject_id.len() <= MAX_SUBJECT_ID_LENGTH
        && !subject_id.chars().any(char::is_control)
}
