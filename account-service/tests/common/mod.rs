#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::account::errors::AccountError;
use account_service::domain::account::errors::MailerError;
use account_service::domain::account::models::PendingReset;
use account_service::domain::account::models::User;
use account_service::domain::account::models::UserId;
use account_service::domain::account::models::UserProfile;
use account_service::domain::account::ports::MailReceipt;
use account_service::domain::account::ports::ResetMailer;
use account_service::domain::account::ports::ResetPasswordMail;
use account_service::domain::account::ports::UserRepository;
use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::session::CookieSettings;
use account_service::outbound::repositories::user::PostgresUserRepository;
use async_trait::async_trait;
use auth::Authenticator;
use auth::HashingCost;
use auth::PasswordHasher;
use chrono::DateTime;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use chrono::Utc;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Authenticator with a cheap hashing cost
pub fn test_authenticator() -> Arc<Authenticator> {
    let password_hasher = PasswordHasher::with_cost(HashingCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("Failed to create password hasher");

    Arc::new(Authenticator::new(
        JWT_SECRET,
        chrono::Duration::days(2),
        password_hasher,
    ))
}

/// Test application that spawns a real server over in-memory collaborators
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub repository: Arc<InMemoryUserRepository>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    /// Spawn the application with a mail provider that accepts every message
    pub async fn spawn() -> Self {
        Self::spawn_with_mail_status(200).await
    }

    /// Spawn the application with a mail provider answering `status`
    pub async fn spawn_with_mail_status(status: u16) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::default());
        let mailer = Arc::new(RecordingMailer::answering(status));

        let authenticator = test_authenticator();
        let session_validity = authenticator.session_validity();

        let account_service = Arc::new(AccountService::new(
            Arc::clone(&repository),
            Arc::clone(&mailer),
            Arc::clone(&authenticator),
            chrono::Duration::minutes(60),
        ));

        let router = create_router(
            account_service,
            authenticator,
            CookieSettings::new(false, session_validity),
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            repository,
            mailer,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token and no cookies
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new()
            .get(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make GET request from a client with no cookies
    pub fn get_anonymous(&self, path: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new().get(format!("{}{}", self.address, path))
    }
}

/// Throwaway Postgres database with migrations applied
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    postgres_url: String,
}

impl TestDb {
    /// Create a database with a unique name on the server named by
    /// `DATABASE_URL`. Returns `None` when the variable is unset so the
    /// Postgres-backed tests skip on machines without a database.
    pub async fn connect() -> Option<Self> {
        let Ok(postgres_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres test");
            return None;
        };

        let db_name = format!(
            "test_account_service_{}",
            uuid::Uuid::new_v4().to_string().replace('-', "_")
        );

        let mut conn = PgConnection::connect(&postgres_url)
            .await
            .expect("Failed to connect to Postgres");

        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = postgres_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pool,
            db_name,
            postgres_url,
        })
    }

    pub fn repository(&self) -> PostgresUserRepository {
        PostgresUserRepository::new(self.pool.clone())
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        // Database cleanup happens asynchronously
        let db_name = self.db_name.clone();
        let postgres_url = self.postgres_url.clone();
        tokio::spawn(async move {
            if let Ok(mut conn) = PgConnection::connect(&postgres_url).await {
                let _ = conn
                    .execute(
                        format!(
                            r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                            db_name
                        )
                        .as_str(),
                    )
                    .await;

                let _ = conn
                    .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, db_name).as_str())
                    .await;
            }
        });
    }
}

/// In-memory credential store with the same uniqueness and
/// compare-and-clear guarantees as the Postgres adapter
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn find(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|user| user.email.as_str() == email)
            .cloned()
    }

    pub fn pending_reset_token(&self, email: &str) -> Option<String> {
        self.find(email)
            .and_then(|user| user.pending_reset)
            .map(|reset| reset.token.as_str().to_string())
    }

    pub fn backdate_reset_request(&self, email: &str, requested_at: DateTime<Utc>) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.values_mut().find(|user| user.email.as_str() == email) {
            if let Some(reset) = user.pending_reset.as_mut() {
                reset.requested_at = Some(requested_at);
            }
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, AccountError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|existing| existing.email == user.email) {
            return Err(AccountError::EmailAlreadyExists(user.email.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        Ok(self.find(email))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_profile_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, AccountError> {
        Ok(self.users.lock().unwrap().get(id).map(User::profile))
    }

    async fn set_reset_token(
        &self,
        id: &UserId,
        reset: &PendingReset,
    ) -> Result<(), AccountError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(id) {
            Some(user) => {
                user.pending_reset = Some(reset.clone());
                Ok(())
            }
            None => Err(AccountError::NotFound(id.to_string())),
        }
    }

    async fn consume_reset_token(
        &self,
        id: &UserId,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, AccountError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(id) {
            Some(user)
                if user
                    .pending_reset
                    .as_ref()
                    .is_some_and(|reset| reset.token.matches(token)) =>
            {
                user.password_hash = password_hash.to_string();
                user.pending_reset = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Mail provider stand-in that records every dispatch attempt
pub struct RecordingMailer {
    status: u16,
    sent: Mutex<Vec<ResetPasswordMail>>,
}

impl RecordingMailer {
    pub fn answering(status: u16) -> Self {
        Self {
            status,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_token(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|mail| mail.token.as_str().to_string())
    }

    pub fn last_user_id(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|mail| mail.user_id.to_string())
    }
}

#[async_trait]
impl ResetMailer for RecordingMailer {
    async fn send_reset_password_mail(
        &self,
        mail: &ResetPasswordMail,
    ) -> Result<MailReceipt, MailerError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(MailReceipt {
            status: self.status,
        })
    }
}
