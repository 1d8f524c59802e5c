// Validation utilities module
// Custom validation functions for registration fields

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use validator::ValidationError;

static DIGITS: OnceLock<Regex> = OnceLock::new();
static CYRILLIC_NAME: OnceLock<Regex> = OnceLock::new();
static LATIN_NAME: OnceLock<Regex> = OnceLock::new();
static PHONE: OnceLock<Regex> = OnceLock::new();
static USERNAME: OnceLock<Regex> = OnceLock::new();
static PASSWORD_CHARSET: OnceLock<Regex> = OnceLock::new();

const UIN_LENGTH: usize = 10;
const NAME_PART_MIN: usize = 3;
const PHONE_MIN: usize = 10;
const ADDRESS_MIN: usize = 10;
const USERNAME_MIN: usize = 5;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 24;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("validation pattern is a valid regex"))
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// UIN: exactly 10 digits
pub fn validate_uin(uin: &str) -> Result<(), ValidationError> {
    if uin.chars().count() != UIN_LENGTH {
        return Err(invalid("uin_length", "UIN must be 10 characters long"));
    }
    if !regex(&DIGITS, r"^[0-9]+$").is_match(uin) {
        return Err(invalid("uin_format", "UIN can only contain numbers"));
    }
    Ok(())
}

fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(invalid("name_full_required", "Please enter full name (first and last name)"));
    }
    if parts.iter().any(|part| part.chars().count() < NAME_PART_MIN) {
        return Err(invalid(
            "name_part_length",
            "Each part of your name must be at least 3 characters",
        ));
    }
    Ok(())
}

/// Legal name in Cyrillic script, first and last name
pub fn validate_name_cyrillic(name: &str) -> Result<(), ValidationError> {
    if !regex(&CYRILLIC_NAME, r"^[\x{0400}-\x{04FF}\s-]+$").is_match(name) {
        return Err(invalid("name_cyrillic_format", "Please use only Cyrillic characters"));
    }
    validate_full_name(name)
}

/// Legal name in Latin script, first and last name
pub fn validate_name_latin(name: &str) -> Result<(), ValidationError> {
    if !regex(&LATIN_NAME, r"^[A-Za-z\s-]+$").is_match(name) {
        return Err(invalid("name_latin_format", "Please use only Latin characters"));
    }
    validate_full_name(name)
}

pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if phone.chars().count() < PHONE_MIN {
        return Err(invalid("phone_length", "Phone number must be at least 10 characters long"));
    }
    if !regex(&PHONE, r"^\+?[0-9\s-]+$").is_match(phone) {
        return Err(invalid(
            "phone_format",
            "Phone number can only contain numbers, spaces, + and -",
        ));
    }
    Ok(())
}

pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.chars().count() < ADDRESS_MIN {
        return Err(invalid("address_length", "Address must be at least 10 characters long"));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().count() < USERNAME_MIN {
        return Err(invalid("username_length", "Username must be at least 5 characters long"));
    }
    if !regex(&USERNAME, r"^[a-zA-Z_-]+$").is_match(username) {
        return Err(invalid(
            "username_format",
            "Username can only contain Latin letters, _ and -",
        ));
    }
    Ok(())
}

/// Password policy for user-submitted passwords
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if length < PASSWORD_MIN {
        return Err(invalid("password_length", "Password must be at least 6 characters"));
    }
    if length > PASSWORD_MAX {
        return Err(invalid("password_max_length", "Password must be at most 24 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(invalid("password_letter", "Password must contain at least one letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid("password_number", "Password must contain at least one number"));
    }
    let charset = regex(
        &PASSWORD_CHARSET,
        r#"^[a-zA-Z0-9!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]+$"#,
    );
    if !charset.is_match(password) {
        return Err(invalid(
            "password_format",
            "Password can only contain Latin letters, numbers, and special characters",
        ));
    }
    Ok(())
}
