use thiserror::Error;

/// Client-side form failures. These never reach the network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please fill in required fields")]
    MissingRequiredFields { fields: Vec<&'static str> },

    #[error("Please fill in all required fields")]
    MissingAccountFields { fields: Vec<&'static str> },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// A backend call that did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("backend timed out")]
    Timeout,

    #[error("backend returned status {status}")]
    Status { status: u16 },

    #[error("invalid backend response: {0}")]
    Decode(String),
}

/// Registration or sign-in rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// The server answered with a message meant for the user.
    #[error("{message}")]
    Rejected { message: String },

    #[error("auth server unreachable: {0}")]
    Unavailable(String),
}

impl AuthError {
    pub const DEFAULT_REJECTION: &'static str = "Failed to create account";

    pub fn rejected(message: Option<String>) -> Self {
        AuthError::Rejected {
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_REJECTION.to_string()),
        }
    }
}
