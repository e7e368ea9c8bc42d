//! Text field normalization shared by the services.

use super::ServiceError;

/// Longest accepted customer name, in characters.
pub const MAX_NAME_CHARS: usize = 100;
/// Longest accepted address text, in characters.
pub const MAX_ADDRESS_CHARS: usize = 500;
/// Longest accepted order notes, in characters.
pub const MAX_NOTES_CHARS: usize = 1000;

/// Trim a required field, rejecting blank or over-long values.
pub fn required_text(value: &str, field: &str, max_chars: usize) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    check_length(trimmed, field, max_chars)?;
    Ok(trimmed.to_owned())
}

/// Trim an optional field; blank becomes `None`.
pub fn optional_text(
    value: Option<&str>,
    field: &str,
    max_chars: usize,
) -> Result<Option<String>, ServiceError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_length(trimmed, field, max_chars)?;
            Ok(Some(trimmed.to_owned()))
        }
    }
}

fn check_length(value: &str, field: &str, max_chars: usize) -> Result<(), ServiceError> {
    if value.chars().count() > max_chars {
        return Err(ServiceError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}
