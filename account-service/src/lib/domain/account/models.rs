use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::account::errors::CommandError;
use crate::account::errors::EmailError;
use crate::account::errors::NameError;
use crate::account::errors::PasswordInputError;
use crate::account::errors::ResetTokenError;
use crate::account::errors::UserIdError;

/// User aggregate entity.
///
/// Holds the credential material. Never leaves the service boundary as is:
/// callers get a [`UserProfile`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: Name,
    pub email: EmailAddress,
    pub password_hash: String,
    pub pending_reset: Option<PendingReset>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Password-excluded projection of this user.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }

    /// Whether `candidate` is the pending reset token and is still within `ttl`.
    pub fn reset_token_matches(&self, candidate: &str, now: DateTime<Utc>, ttl: Duration) -> bool {
        match &self.pending_reset {
            Some(reset) => reset.token.matches(candidate) && !reset.is_expired(now, ttl),
            None => false,
        }
    }
}

/// Read-path projection of a user. Carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: Name,
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
}

/// Reset token persisted on a user between reset request and completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReset {
    pub token: ResetToken,
    /// None for tokens stored without an issue time; those never validate.
    pub requested_at: Option<DateTime<Utc>>,
}

impl PendingReset {
    pub fn new(token: ResetToken, requested_at: DateTime<Utc>) -> Self {
        Self {
            token,
            requested_at: Some(requested_at),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match self.requested_at {
            Some(requested_at) => requested_at + ttl < now,
            None => true,
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s.trim())
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Trimmed, non-empty, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    const MAX_LENGTH: usize = 100;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `Empty` - Name is blank
    /// * `TooLong` - Name longer than 100 characters
    pub fn new(name: String) -> Result<Self, NameError> {
        let name = name.trim();
        let length = name.chars().count();

        if length == 0 {
            Err(NameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Stored trimmed and lowercased, so lookups and the uniqueness constraint
/// treat `A@X.com` and `a@x.com` as the same login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `Empty` - Email is blank
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = Self::normalize(&email);
        if email.is_empty() {
            return Err(EmailError::Empty);
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Canonical form used for storage and lookup.
    pub fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password as submitted by the user.
///
/// Kept verbatim (no trimming). Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Minimum length enforced when a password is chosen through a reset.
    pub const MIN_RESET_LENGTH: usize = 6;

    /// # Errors
    /// * `Empty` - Password is empty
    pub fn new(password: String) -> Result<Self, PasswordInputError> {
        if password.is_empty() {
            Err(PasswordInputError::Empty)
        } else {
            Ok(Self(password))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Single-use password reset token: 20 characters drawn uniformly from `[A-Za-z0-9]`.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetToken(String);

impl ResetToken {
    pub const LENGTH: usize = 20;

    /// Draw a fresh token from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let token = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::LENGTH)
            .map(char::from)
            .collect();

        Self(token)
    }

    /// Parse a stored token.
    ///
    /// # Errors
    /// * `Empty` - Token is empty
    /// * `InvalidFormat` - Wrong length or non-alphanumeric characters
    pub fn parse(token: String) -> Result<Self, ResetTokenError> {
        if token.is_empty() {
            return Err(ResetTokenError::Empty);
        }
        if token.len() != Self::LENGTH || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ResetTokenError::InvalidFormat {
                expected: Self::LENGTH,
            });
        }
        Ok(Self(token))
    }

    /// Exact comparison against a submitted token.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetToken(**redacted**)")
    }
}

/// Command to register a new user
#[derive(Debug)]
pub struct SignupCommand {
    pub name: Name,
    pub email: EmailAddress,
    pub password: Password,
}

impl SignupCommand {
    /// Validate raw signup fields.
    ///
    /// # Errors
    /// * `MissingFields` - Any field is blank
    /// * `Name` / `Email` - Field fails its format check
    pub fn new(name: String, email: String, password: String) -> Result<Self, CommandError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(CommandError::MissingFields);
        }

        Ok(Self {
            name: Name::new(name)?,
            email: EmailAddress::new(email)?,
            password: Password::new(password)?,
        })
    }
}

/// Command to sign in with email and password
///
/// The email is only normalized here. A malformed address simply matches no
/// account, so it fails like any other wrong credential.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: Password,
}

impl LoginCommand {
    /// # Errors
    /// * `MissingFields` - Email or password is blank
    pub fn new(email: String, password: String) -> Result<Self, CommandError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(CommandError::MissingFields);
        }

        Ok(Self {
            email: EmailAddress::normalize(&email),
            password: Password::new(password)?,
        })
    }
}

/// Command to start a password reset
#[derive(Debug)]
pub struct RequestResetCommand {
    pub email: EmailAddress,
}

impl RequestResetCommand {
    /// # Errors
    /// * `Email` - Email is blank or malformed
    pub fn new(email: String) -> Result<Self, CommandError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
        })
    }
}

/// Command to finish a password reset with the emailed token
#[derive(Debug)]
pub struct CompleteResetCommand {
    pub user_id: UserId,
    pub token: String,
    pub password: Password,
}

impl CompleteResetCommand {
    /// Validate raw reset fields.
    ///
    /// Checks run in a fixed order: confirmation mismatch, blank fields,
    /// password length, user id format.
    ///
    /// # Errors
    /// * `Password(Mismatch)` - Password and confirmation differ
    /// * `MissingFields` - Any field is blank
    /// * `Password(TooShort)` - Password shorter than 6 characters
    /// * `UserId` - User id is not a UUID
    pub fn new(
        password: String,
        confirm_password: String,
        token: String,
        user_id: String,
    ) -> Result<Self, CommandError> {
        if password != confirm_password {
            return Err(PasswordInputError::Mismatch.into());
        }
        if password.is_empty() || token.is_empty() || user_id.trim().is_empty() {
            return Err(CommandError::MissingFields);
        }
        if password.chars().count() < Password::MIN_RESET_LENGTH {
            return Err(PasswordInputError::TooShort {
                min: Password::MIN_RESET_LENGTH,
            }
            .into());
        }

        Ok(Self {
            user_id: UserId::from_string(&user_id)?,
            token,
            password: Password::new(password)?,
        })
    }
}
