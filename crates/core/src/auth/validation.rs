//! Input rules for the register and login endpoints.

use serde::Deserialize;
use validator::ValidateEmail;

use crate::serde::deserialize_optional_string;
use crate::validation::ValidationErrors;

use super::normalize_email;

/// Maximum length of names and email addresses.
pub const MAX_FIELD_CHARS: usize = 255;

/// Minimum password length.
pub const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    /// Passwords are taken verbatim, never trimmed.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Validated registration input. The email is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validated login input. The email is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Message used when a registration email already belongs to someone.
pub const EMAIL_TAKEN: &str = "The email has already been taken.";

fn required(field: &str, value: Option<String>, errors: &mut ValidationErrors) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
    }
}

fn max_chars(field: &str, value: &str, errors: &mut ValidationErrors) -> bool {
    if value.chars().count() > MAX_FIELD_CHARS {
        errors.add(
            field,
            format!("The {field} field must not be greater than {MAX_FIELD_CHARS} characters."),
        );
        return false;
    }
    true
}

fn email(value: Option<String>, errors: &mut ValidationErrors) -> Option<String> {
    let value = required("email", value, errors)?;
    if !value.validate_email() {
        errors.add("email", "The email field must be a valid email address.");
        return None;
    }
    max_chars("email", &value, errors).then(|| normalize_email(&value))
}

pub fn validate_registration(request: RegisterRequest) -> Result<Registration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required("name", request.name, &mut errors)
        .filter(|name| max_chars("name", name, &mut errors));

    let email = email(request.email, &mut errors);

    let password = required("password", request.password, &mut errors).filter(|password| {
        if password.chars().count() < MIN_PASSWORD_CHARS {
            errors.add(
                "password",
                format!("The password field must be at least {MIN_PASSWORD_CHARS} characters."),
            );
            return false;
        }
        true
    });

    match (name, email, password) {
        (Some(name), Some(email), Some(password)) if errors.is_empty() => Ok(Registration {
            name,
            email,
            password,
        }),
        _ => Err(errors),
    }
}

pub fn validate_login(request: LoginRequest) -> Result<Credentials, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = email(request.email, &mut errors);
    let password = required("password", request.password, &mut errors);

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(Credentials { email, password }),
        _ => Err(errors),
    }
}
