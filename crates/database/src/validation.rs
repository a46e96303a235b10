//! Input validation for stored text fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// Value contains characters that are not allowed.
    InvalidCharacters(String),
    /// Year outside the range stored timestamps can represent.
    YearOutOfRange { field: String, year: i32 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::InvalidCharacters(field) => {
                write!(f, "{} contains control characters", field)
            }
            ValidationError::YearOutOfRange { field, year } => write!(
                f,
                "{} year {} is outside {}..={}",
                field, year, MIN_TIMESTAMP_YEAR, MAX_TIMESTAMP_YEAR
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for display names.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 64;

/// Maximum allowed length for book titles.
pub const MAX_TITLE_LENGTH: usize = 256;

/// Maximum allowed length for message text.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Earliest year a stored timestamp may carry.
pub const MIN_TIMESTAMP_YEAR: i32 = 0;

/// Latest year a stored timestamp may carry.
///
/// Timestamps are stored as fixed-width RFC 3339 text; later years gain a
/// sign and an extra digit.
pub const MAX_TIMESTAMP_YEAR: i32 = 9999;

/// Check a single-line field: trimmed, non-empty, bounded, no control characters.
fn validate_line(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }

    if value.chars().any(char::is_control) {
        return Err(ValidationError::InvalidCharacters(field.to_string()));
    }

    Ok(())
}

/// Validate a user's display name.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    validate_line("display name", name, MAX_DISPLAY_NAME_LENGTH)
}

/// Validate a book title.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    validate_line("title", title, MAX_TITLE_LENGTH)
}

/// Validate message text.
///
/// Unlike names and titles, message text may span several lines.
pub fn validate_message_text(text: &str) -> Result<(), ValidationError> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty("message".to_string()));
    }

    let actual = trimmed.chars().count();
    if actual > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "message".to_string(),
            max: MAX_MESSAGE_LENGTH,
            actual,
        });
    }

    Ok(())
}

/// Validate the year of a timestamp before it is stored.
pub fn validate_timestamp_year(field: &str, year: i32) -> Result<(), ValidationError> {
    if !(MIN_TIMESTAMP_YEAR..=MAX_TIMESTAMP_YEAR).contains(&year) {
        return Err(ValidationError::YearOutOfRange {
            field: field.to_string(),
            year,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Alice").is_ok());
        assert!(validate_display_name("  Bob  ").is_ok()); // trimmed

        assert!(matches!(
            validate_display_name("   "),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            validate_display_name(&"a".repeat(65)),
            Err(ValidationError::TooLong { .. })
        ));
        assert!(matches!(
            validate_display_name("Al\nice"),
            Err(ValidationError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Introduction to Algorithms, 3rd ed.").is_ok());
        assert!(matches!(validate_title(""), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_title(&"x".repeat(300)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_message_text() {
        assert!(validate_message_text("Hi!\nIs the book still available?").is_ok());
        assert!(matches!(
            validate_message_text("\n\t "),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            validate_message_text(&"x".repeat(MAX_MESSAGE_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 64 two-byte characters fit the display name limit.
        assert!(validate_display_name(&"é".repeat(64)).is_ok());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::Empty("title".to_string());
        assert_eq!(err.to_string(), "title cannot be empty");

        let err = ValidationError::TooLong {
            field: "message".to_string(),
            max: 4000,
            actual: 4001,
        };
        assert_eq!(err.to_string(), "message is too long (4001 chars, max 4000)");
    }

    #[test]
    fn test_validate_timestamp_year() {
        assert!(validate_timestamp_year("timestamp", 2024).is_ok());
        assert!(validate_timestamp_year("timestamp", 0).is_ok());
        assert!(validate_timestamp_year("timestamp", 9999).is_ok());

        let err = validate_timestamp_year("timestamp", 10000).unwrap_err();
        assert_eq!(err.to_string(), "timestamp year 10000 is outside 0..=9999");
        assert!(matches!(
            validate_timestamp_year("timestamp", -1),
            Err(ValidationError::YearOutOfRange { year: -1, .. })
        ));
    }
}
