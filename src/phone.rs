//! Phone number normalization.

use crate::error::AppError;

/// Minimum digit count for a dialable number.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Normalize a phone number to `+` followed by its digits.
///
/// Accepts any punctuation/formatting (`(650) 555-0199`, `650.555.0199`,
/// `+1 650 555 0199`); everything except ASCII digits is discarded.
/// Idempotent: normalizing an already-normalized number returns it unchanged.
pub fn normalize_phone(raw: &str) -> Result<String, AppError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < MIN_PHONE_DIGITS {
        return Err(AppError::BadRequest(format!(
            "Phone number must contain at least {} digits",
            MIN_PHONE_DIGITS
        )));
    }

    Ok(format!("+{}", digits))
}
