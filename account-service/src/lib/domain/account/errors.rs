use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for display name validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Name is required")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for plaintext password input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordInputError {
    #[error("Password is required")]
    Empty,

    #[error("Password should be at least {min} characters")]
    TooShort { min: usize },

    #[error("Passwords do not match")]
    Mismatch,
}

/// Error for reset token parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResetTokenError {
    #[error("Reset token is required")]
    Empty,

    #[error("Reset token must be {expected} alphanumeric characters")]
    InvalidFormat { expected: usize },
}

/// Error raised when constructing a command from raw request fields
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("All fields are required")]
    MissingFields,

    #[error(transparent)]
    Name(#[from] NameError),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Password(#[from] PasswordInputError),

    #[error(transparent)]
    ResetToken(#[from] ResetTokenError),

    #[error(transparent)]
    UserId(#[from] UserIdError),
}

/// Error for reset mail delivery
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    #[error("Failed to reach mail provider: {0}")]
    RequestFailed(String),

    #[error("Mail provider rejected the message with status {0}")]
    Rejected(u16),
}

/// Top-level error for all account operations
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Input validation, checked before any I/O
    #[error("{0}")]
    Validation(#[from] CommandError),

    // Domain-level errors
    #[error("Email already taken")]
    EmailAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No active session")]
    NoSession,

    #[error("Invalid session")]
    InvalidSession,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("No account registered for {0}")]
    EmailNotFound(String),

    #[error("Reset email could not be sent: {0}")]
    MailDelivery(#[from] MailerError),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        AccountError::Unknown(err.to_string())
    }
}

impl From<NameError> for AccountError {
    fn from(err: NameError) -> Self {
        AccountError::Validation(err.into())
    }
}

impl From<EmailError> for AccountError {
    fn from(err: EmailError) -> Self {
        AccountError::Validation(err.into())
    }
}

impl From<UserIdError> for AccountError {
    fn from(err: UserIdError) -> Self {
        AccountError::Validation(err.into())
    }
}
