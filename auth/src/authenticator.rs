use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SessionClaims;
use crate::jwt::SessionSubject;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and session tokens.
///
/// Owns the signing secret and the fixed session validity. Built once at
/// startup and shared read-only afterwards.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    session_validity: Duration,
}

/// Result of successful authentication.
#[derive(Debug)]
pub struct AuthenticationResult {
    /// Signed session token
    pub session_token: String,
    /// Claims encoded in the token
    pub claims: SessionClaims,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Default lifetime of a session token.
    pub const DEFAULT_SESSION_VALIDITY_HOURS: i64 = 48;

    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for session token signing
    /// * `session_validity` - Lifetime of every issued session token
    /// * `password_hasher` - Hasher configured with the deployment's cost
    pub fn new(jwt_secret: &[u8], session_validity: Duration, password_hasher: PasswordHasher) -> Self {
        Self {
            password_hasher,
            jwt_handler: JwtHandler::new(jwt_secret),
            session_validity,
        }
    }

    pub fn session_validity(&self) -> Duration {
        self.session_validity
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash is malformed
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &SessionSubject,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_session(subject)?)
    }

    /// Issue a session token starting now.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_session(&self, subject: &SessionSubject) -> Result<AuthenticationResult, JwtError> {
        self.issue_session_at(subject, Utc::now())
    }

    /// Issue a session token whose validity window starts at `issued_at`.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_session_at(
        &self,
        subject: &SessionSubject,
        issued_at: DateTime<Utc>,
    ) -> Result<AuthenticationResult, JwtError> {
        let claims = SessionClaims::new(subject, issued_at, self.session_validity);
        let session_token = self.jwt_handler.encode(&claims)?;

        Ok(AuthenticationResult {
            session_token,
            claims,
        })
    }

    /// Validate a session token and decode its claims.
    ///
    /// # Errors
    /// * `InvalidSignature` - Token was not signed with this secret or was altered
    /// * `TokenExpired` - Validity window has passed
    /// * `Malformed` - Token cannot be parsed
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
