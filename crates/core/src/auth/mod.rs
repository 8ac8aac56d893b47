mod error;
mod functions;
mod traits;
mod types;
mod validation;

pub use error::AuthError;
pub use functions::{
    calculate_expiry, generate_token, is_token_expired, issue_token, normalize_email,
    TOKEN_LENGTH,
};
pub use traits::{Result, TokenRepository};
pub use types::{AccessToken, TokenValue};
pub use validation::{
    validate_login, validate_registration, Credentials, LoginRequest, RegisterRequest,
    Registration, EMAIL_TAKEN, MAX_FIELD_CHARS, MIN_PASSWORD_CHARS,
};
