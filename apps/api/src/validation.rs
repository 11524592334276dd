//! Field validation shared by the listing and portfolio endpoints.

use crate::errors::AppError;

/// Trims `value` and requires 1..=`max_chars` characters.
pub fn required_text(field: &str, value: &str, max_chars: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    bounded(field, value, max_chars)
}

/// Trims `value` and allows up to `max_chars` characters, including none.
pub fn bounded_text(field: &str, value: &str, max_chars: usize) -> Result<String, AppError> {
    bounded(field, value.trim(), max_chars)
}

/// Like `bounded_text`, but blank input becomes `None`.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<Option<String>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => bounded(field, v, max_chars).map(Some),
        None => Ok(None),
    }
}

fn bounded(field: &str, value: &str, max_chars: usize) -> Result<String, AppError> {
    if value.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}

/// Clamps list pagination to `1..=max` rows and a non-negative offset.
pub fn page(limit: Option<i64>, offset: Option<i64>, default: i64, max: i64) -> (i64, i64) {
    (
        limit.unwrap_or(default).clamp(1, max),
        offset.unwrap_or(0).max(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("title", "  Bidri vase ", 20).unwrap(), "Bidri vase");
        assert!(required_text("title", "   ", 20).is_err());
        assert!(required_text("title", "abcdef", 5).is_err());
    }

    #[test]
    fn test_bounded_text_allows_empty() {
        assert_eq!(bounded_text("bio", "  ", 10).unwrap(), "");
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("location", None, 10).unwrap(), None);
        assert_eq!(optional_text("location", Some(" "), 10).unwrap(), None);
        assert_eq!(
            optional_text("location", Some(" Bhuj "), 10).unwrap().as_deref(),
            Some("Bhuj")
        );
        assert!(optional_text("location", Some("Channapatna"), 5).is_err());
    }

    #[test]
    fn test_page_clamps() {
        assert_eq!(page(None, None, 20, 100), (20, 0));
        assert_eq!(page(Some(500), Some(-3), 20, 100), (100, 0));
        assert_eq!(page(Some(0), Some(40), 20, 100), (1, 40));
    }
}
