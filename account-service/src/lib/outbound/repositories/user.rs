use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::Name;
use crate::domain::account::models::PendingReset;
use crate::domain::account::models::ResetToken;
use crate::domain::account::models::User;
use crate::domain::account::models::UserId;
use crate::domain::account::models::UserProfile;
use crate::domain::account::ports::UserRepository;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    password_reset_token: Option<String>,
    password_reset_requested_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = AccountError;

    fn try_from(r: UserRecord) -> Result<Self, Self::Error> {
        // An empty column is the cleared state
        let pending_reset = match r.password_reset_token.filter(|t| !t.is_empty()) {
            Some(token) => Some(PendingReset {
                token: ResetToken::parse(token)
                    .map_err(|e| AccountError::DatabaseError(format!("Stored reset token: {}", e)))?,
                requested_at: r.password_reset_requested_at,
            }),
            None => None,
        };

        Ok(User {
            id: UserId(r.id),
            name: Name::new(r.name)?,
            email: EmailAddress::new(r.email)?,
            password_hash: r.password_hash,
            pending_reset,
            created_at: r.created_at,
        })
    }
}

#[derive(FromRow)]
struct ProfileRecord {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRecord> for UserProfile {
    type Error = AccountError;

    fn try_from(r: ProfileRecord) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: UserId(r.id),
            name: Name::new(r.name)?,
            email: EmailAddress::new(r.email)?,
            created_at: r.created_at,
        })
    }
}

fn map_write_error(e: sqlx::Error, user: &User) -> AccountError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
            return AccountError::EmailAlreadyExists(user.email.as_str().to_string());
        }
    }
    AccountError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, AccountError> {
        let (reset_token, reset_requested_at) = match &user.pending_reset {
            Some(reset) => (Some(reset.token.as_str()), reset.requested_at),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, password_reset_token, password_reset_requested_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(reset_token)
        .bind(reset_requested_at)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user))?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        let row = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, password_reset_token, password_reset_requested_at, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError> {
        let row = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, password_reset_token, password_reset_requested_at, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_profile_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, AccountError> {
        let row = sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT id, name, email, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn set_reset_token(
        &self,
        id: &UserId,
        reset: &PendingReset,
    ) -> Result<(), AccountError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_reset_token = $2, password_reset_requested_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(reset.token.as_str())
        .bind(reset.requested_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn consume_reset_token(
        &self,
        id: &UserId,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, AccountError> {
        // Compare-and-clear in a single statement; a second use matches no row
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $3, password_reset_token = NULL, password_reset_requested_at = NULL
            WHERE id = $1 AND password_reset_token = $2
            "#,
        )
        .bind(id.0)
        .bind(token)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}
