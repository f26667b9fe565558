use super::ApiError;

pub fn validate_record_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid record ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

/// Required free-text field: trims and rejects empty input.
pub fn validate_required_text<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    // Just enough structure to catch obvious typos; deliverability is the
    // operator's problem.
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ApiError::validation(format!(
            "Invalid email address: {}",
            trimmed
        )));
    }

    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_record_id() {
        assert!(validate_record_id(1).is_ok());
        assert!(validate_record_id(12345).is_ok());
        assert!(validate_record_id(0).is_err());
        assert!(validate_record_id(-1).is_err());
    }

    #[test]
    fn test_validate_required_text() {
        assert_eq!(validate_required_text("SC-01", "SC code").unwrap(), "SC-01");
        assert_eq!(
            validate_required_text("  padded  ", "SC code").unwrap(),
            "padded"
        );
        assert!(validate_required_text("", "SC code").is_err());
        assert!(validate_required_text("   ", "SC code").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ops@example.com").is_ok());
        assert_eq!(validate_email(" ops@example.com ").unwrap(), "ops@example.com");
        assert!(validate_email("").is_err());
        assert!(validate_email("nodomain@").is_err());
        assert!(validate_email("@nolocal.com").is_err());
        assert!(validate_email("missing-at.example.com").is_err());
        assert!(validate_email("tld@less").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }
}
