use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity a session token is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSubject {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl SessionSubject {
    pub fn new(id: impl ToString, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Claim set carried by a session token.
///
/// `sub` holds the user identifier. `iat` and `exp` are Unix timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    /// Build claims for `subject`, valid for `validity` starting at `issued_at`.
    pub fn new(subject: &SessionSubject, issued_at: DateTime<Utc>, validity: Duration) -> Self {
        let expiration = issued_at + validity;

        Self {
            sub: subject.id.clone(),
            name: subject.name.clone(),
            email: subject.email.clone(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// The identity the token was issued for.
    pub fn subject(&self) -> SessionSubject {
        SessionSubject {
            id: self.sub.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Check if the claims are past their expiration at `current_timestamp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
