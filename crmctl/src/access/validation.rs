//! Field checks applied before anything reaches storage.

use lettre::Address;

use crate::errors::{Error, Result};

pub const NAME_MAX: usize = 20;
pub const PHONE_MAX: usize = 20;
pub const CATEGORY_NAME_MAX: usize = 30;
pub const USERNAME_MAX: usize = 150;
pub const ACCOUNT_NAME_MAX: usize = 150;

/// Trimmed, non-empty and at most `max` characters
pub fn bounded(field: &str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(Error::validation(format!("{field} must be at most {max} characters")));
    }
    Ok(value.to_string())
}

pub fn optional_bounded(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>> {
    value.map(|v| bounded(field, v, max)).transpose()
}

/// Like [`bounded`] but an empty value is allowed
pub fn at_most(field: &str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.chars().count() > max {
        return Err(Error::validation(format!("{field} must be at most {max} characters")));
    }
    Ok(value.to_string())
}

pub fn email(value: &str) -> Result<String> {
    let value = value.trim();
    value
        .parse::<Address>()
        .map_err(|_| Error::validation(format!("'{value}' is not a valid email address")))?;
    Ok(value.to_string())
}

pub fn optional_email(value: Option<&str>) -> Result<Option<String>> {
    value.map(email).transpose()
}

pub fn age(value: i32) -> Result<i32> {
    if value < 0 {
        return Err(Error::validation("age must not be negative"));
    }
    Ok(value)
}

pub fn password(value: &str, min_length: usize, max_length: usize) -> Result<()> {
    let length = value.chars().count();
    if length < min_length || length > max_length {
        return Err(Error::validation(format!(
            "Password must be between {min_length} and {max_length} characters"
        )));
    }
    Ok(())
}
