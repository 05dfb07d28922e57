//! Client-side form validation.
//!
//! These checks mirror the constraints the backend enforces so that obviously
//! invalid forms are rejected before a round trip. The backend remains the
//! authority; passing here does not guarantee acceptance.

use crate::models::{ChangePasswordRequest, CheckoutRequest, RegisterRequest};

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum length of an email address (RFC 5321).
pub const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum shipping address length.
pub const MAX_SHIPPING_ADDRESS_LENGTH: usize = 500;
/// Maximum order note length.
pub const MAX_NOTE_LENGTH: usize = 1000;

/// A form field failed validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{0} is required")]
    Required(&'static str),
    /// A field is longer than allowed.
    #[error("{field} must not exceed {max} characters")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
    /// Password shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,
    /// Email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(&'static str),
    /// Quantity must be at least one.
    #[error("quantity must be positive")]
    NonPositiveQuantity,
}

/// Check the basic shape of an email address.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`] when the address is empty, too
/// long, lacks an `@`, or has an empty local part or domain.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail("email cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail("email is too long"));
    }
    let (local, domain) = email
        .split_once('@')
        .ok_or(ValidationError::InvalidEmail("email must contain an @ symbol"))?;
    if local.is_empty() {
        return Err(ValidationError::InvalidEmail("email local part cannot be empty"));
    }
    if domain.is_empty() {
        return Err(ValidationError::InvalidEmail("email domain cannot be empty"));
    }
    Ok(())
}

/// Validate a registration form.
///
/// # Errors
///
/// Returns the first failing constraint.
pub fn validate_registration(form: &RegisterRequest) -> Result<(), ValidationError> {
    require("username", &form.username)?;
    require("name", &form.name)?;
    validate_email(&form.email)?;
    validate_new_password(&form.password, &form.confirm_password)
}

/// Validate a checkout form.
///
/// # Errors
///
/// Returns the first failing constraint.
pub fn validate_checkout(form: &CheckoutRequest) -> Result<(), ValidationError> {
    require("shipping address", &form.shipping_address)?;
    max_length(
        "shipping address",
        &form.shipping_address,
        MAX_SHIPPING_ADDRESS_LENGTH,
    )?;
    require("payment method", &form.payment_method)?;
    if let Some(note) = &form.note {
        max_length("note", note, MAX_NOTE_LENGTH)?;
    }
    Ok(())
}

/// Validate a password change form.
///
/// # Errors
///
/// Returns the first failing constraint.
pub fn validate_password_change(form: &ChangePasswordRequest) -> Result<(), ValidationError> {
    require("current password", &form.current_password)?;
    validate_new_password(&form.new_password, &form.confirm_password)
}

/// Validate a cart quantity.
///
/// # Errors
///
/// Returns [`ValidationError::NonPositiveQuantity`] for zero.
pub const fn validate_quantity(quantity: u32) -> Result<(), ValidationError> {
    if quantity == 0 {
        return Err(ValidationError::NonPositiveQuantity);
    }
    Ok(())
}

/// Validate an order cancellation reason.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] for a blank reason.
pub fn validate_cancel_reason(reason: &str) -> Result<(), ValidationError> {
    require("cancellation reason", reason)
}

fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

fn max_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            email: "alice@gearhub.test".to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
            name: "Alice".to_string(),
            phone: String::new(),
            shipping_address: String::new(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert_eq!(validate_registration(&registration()), Ok(()));
    }

    #[test]
    fn test_registration_password_rules() {
        let mut form = registration();
        form.password = "abc".to_string();
        form.confirm_password = "abc".to_string();
        assert_eq!(
            validate_registration(&form),
            Err(ValidationError::PasswordTooShort)
        );

        let mut form = registration();
        form.confirm_password = "hunter23".to_string();
        assert_eq!(
            validate_registration(&form),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("a@b.c").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-symbol").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(250))).is_err());
    }

    #[test]
    fn test_checkout_limits() {
        let mut form = CheckoutRequest {
            shipping_address: "12 Nguyen Hue".to_string(),
            payment_method: "COD".to_string(),
            voucher_id: None,
            note: None,
        };
        assert_eq!(validate_checkout(&form), Ok(()));

        form.note = Some("x".repeat(MAX_NOTE_LENGTH + 1));
        assert_eq!(
            validate_checkout(&form),
            Err(ValidationError::TooLong {
                field: "note",
                max: MAX_NOTE_LENGTH
            })
        );

        form.note = None;
        form.payment_method = "  ".to_string();
        assert_eq!(
            validate_checkout(&form),
            Err(ValidationError::Required("payment method"))
        );
    }

    #[test]
    fn test_quantity_and_reason() {
        assert!(validate_quantity(1).is_ok());
        assert_eq!(
            validate_quantity(0),
            Err(ValidationError::NonPositiveQuantity)
        );
        assert!(validate_cancel_reason("changed my mind").is_ok());
        assert!(validate_cancel_reason("   ").is_err());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ValidationError::Required("name").to_string(),
            "name is required"
        );
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "password must be at least 6 characters"
        );
    }
}
