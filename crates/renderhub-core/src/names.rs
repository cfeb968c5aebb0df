//! Record name validation.
//!
//! Record names double as storage keys (blob names, file names), so they
//! must be non-empty and must not escape their container.

use crate::error::{Result, StoreError};

/// Maximum length accepted for a record name.
pub const MAX_NAME_LEN: usize = 255;

/// Validates that `name` can be used as a storage key.
///
/// # Example
///
/// ```
/// use renderhub_core::names::validate_name;
///
/// assert!(validate_name("west-us-env").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("a/b").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::invalid_name(name, "record name cannot be empty"));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(StoreError::invalid_name(
            name,
            format!("record name exceeds {} bytes", MAX_NAME_LEN),
        ));
    }

    if name == "." || name == ".." {
        return Err(StoreError::invalid_name(name, "reserved path component"));
    }

    if name.contains(['/', '\\']) {
        return Err(StoreError::invalid_name(name, "contains a path separator"));
    }

    if name.chars().any(char::is_control) {
        return Err(StoreError::invalid_name(name, "contains control characters"));
    }

    Ok(())
}
