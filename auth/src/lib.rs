//! Authentication utilities library
//!
//! Credential primitives for the account service, free of any I/O:
//! - Password hashing (Argon2id, fixed configurable cost)
//! - Session token issuance and validation (HS256 JWT, fixed validity window)
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! assert!(!hasher.verify("not_my_password", &hash).unwrap());
//! ```
//!
//! ## Session Flow
//! ```
//! use auth::{Authenticator, PasswordHasher, SessionSubject};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     Duration::days(2),
//!     PasswordHasher::new(),
//! );
//!
//! // Signup: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue a session token
//! let subject = SessionSubject::new("user123", "Alice", "alice@example.com");
//! let result = auth.authenticate("password123", &hash, &subject).unwrap();
//!
//! // Later requests: validate the token
//! let claims = auth.validate_session(&result.session_token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SessionClaims;
pub use jwt::SessionSubject;
pub use password::HashingCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
