use crate::error::ApiError;
use regex::Regex;
use lazy_static::lazy_static;

lazy_static! {
    // Alphanumerics and hyphens in any position, at most 39 characters.
    static ref LOGIN_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9-]{1,39}$"
    ).unwrap();

    static ref REPO_NAME_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9._-]{1,100}$"
    ).unwrap();
}

/// Checks a user or organization login.
pub fn validate_login(field: &str, value: &str) -> Result<(), ApiError> {
    if LOGIN_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::rejected(format!("Invalid GitHub {}: '{}'", field, value)))
    }
}

pub fn validate_repo_name(value: &str) -> Result<(), ApiError> {
    if REPO_NAME_REGEX.is_match(value) && value != "." && value != ".." {
        Ok(())
    } else {
        Err(ApiError::rejected(format!("Invalid repository name: '{}'", value)))
    }
}
