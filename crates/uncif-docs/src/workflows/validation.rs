use super::fees::FeeInputError;

/// Form input rejected before any side effect takes place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: String },
    #[error("{field} must be a whole number (found '{value}')")]
    InvalidNumber { field: String, value: String },
    #[error("{field} must be a date in YYYY-MM-DD format (found '{value}')")]
    InvalidDate { field: String, value: String },
    #[error("{field} must be one of {allowed} (found '{value}')")]
    InvalidChoice {
        field: String,
        value: String,
        allowed: String,
    },
    #[error("{field} must be a valid email address")]
    InvalidEmail { field: String },
    #[error("donation amount must be greater than zero")]
    InvalidAmount,
    #[error("page count must be between {min} and {max} (found {found})")]
    PageCountOutOfRange { min: u32, max: u32, found: u32 },
    #[error("{field} must be at most {max} characters (found {found})")]
    TooLong {
        field: String,
        max: usize,
        found: usize,
    },
    #[error("document runs to {pages} pages; at most {max} can be exported")]
    TooManyPages { pages: usize, max: usize },
    #[error("{width}x{height} px image is too large to export; shorten the document or choose pdf")]
    ImageTooLarge { width: u32, height: u32 },
    #[error(transparent)]
    Fee(#[from] FeeInputError),
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }
}

/// Trimmed value of a required text input.
pub(crate) fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::missing(field))
    } else {
        Ok(trimmed)
    }
}

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub(crate) fn email(field: &str, value: &str) -> Result<(), ValidationError> {
    let value = required(field, value)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail {
            field: field.to_string(),
        })
    }
}
