use crate::errors::AppError;

pub const DEFAULT_CURRENCY: &str = "INR";
pub const MAX_AMOUNT_MINOR: i64 = 10_000_000_000;
pub const MAX_NOTE_CHARS: usize = 500;

/// Upper-cases a three-letter ISO-4217 style code; `None` gives the default.
pub fn normalize_currency(currency: Option<&str>) -> Result<String, AppError> {
    let code = currency.map(str::trim).unwrap_or(DEFAULT_CURRENCY);
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::Validation(format!(
            "currency must be a three-letter code, got '{code}'"
        )));
    }
    Ok(code.to_ascii_uppercase())
}

pub fn validate_amount(amount_minor: i64) -> Result<i64, AppError> {
    if !(1..=MAX_AMOUNT_MINOR).contains(&amount_minor) {
        return Err(AppError::Validation(format!(
            "amount_minor must be between 1 and {MAX_AMOUNT_MINOR}"
        )));
    }
    Ok(amount_minor)
}

/// Trims the note; blank notes become `None`.
pub fn normalize_note(note: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if note.chars().count() > MAX_NOTE_CHARS {
        return Err(AppError::Validation(format!(
            "note must be at most {MAX_NOTE_CHARS} characters"
        )));
    }
    Ok(Some(note.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_defaults_and_uppercases() {
        assert_eq!(normalize_currency(None).unwrap(), "INR");
        assert_eq!(normalize_currency(Some(" usd ")).unwrap(), "USD");
    }

    #[test]
    fn test_currency_rejects_bad_codes() {
        for bad in ["", "US", "EURO", "U$D", "₹₹₹"] {
            assert!(normalize_currency(Some(bad)).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn test_amount_bounds() {
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(-500).is_err());
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(MAX_AMOUNT_MINOR).is_ok());
        assert!(validate_amount(MAX_AMOUNT_MINOR + 1).is_err());
    }

    #[test]
    fn test_note_normalization() {
        assert_eq!(normalize_note(None).unwrap(), None);
        assert_eq!(normalize_note(Some("   ")).unwrap(), None);
        assert_eq!(
            normalize_note(Some(" For the looms ")).unwrap().as_deref(),
            Some("For the looms")
        );
        assert!(normalize_note(Some(&"x".repeat(MAX_NOTE_CHARS + 1))).is_err());
    }
}
