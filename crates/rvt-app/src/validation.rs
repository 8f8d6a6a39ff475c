use rvt_client::models::Confidence;

use crate::error::ValidationError;

/// Upper bound the service's password hashing accepts
pub const MAX_PASSWORD_LEN: usize = 72;

/// Lower bound enforced when creating an account
pub const MIN_PASSWORD_LEN: usize = 6;

/// Checks run before a login call
///
/// # Examples
/// ```
/// use rvt_app::validation::validate_login;
///
/// assert!(validate_login("a@x.com", "secret").is_ok());
/// assert!(validate_login("a@x.com", &"x".repeat(73)).is_err());
/// ```
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::Empty("Email"));
    }
    if password.is_empty() {
        return Err(ValidationError::Empty("Password"));
    }
    if password.chars().count() > MAX_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooLong {
            max: MAX_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Checks run before a register call
pub fn validate_register(
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), ValidationError> {
    validate_login(email, password)?;

    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Parse a typed confidence; blank input means the default rating
pub fn parse_confidence(raw: Option<&str>) -> Result<Option<Confidence>, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    let value: u8 = raw
        .parse()
        .map_err(|_| ValidationError::ConfidenceNotANumber)?;
    Ok(Some(Confidence::new(value)?))
}
