use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::SessionSubject;
use chrono::Duration;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::errors::MailerError;
use crate::account::models::CompleteResetCommand;
use crate::account::models::LoginCommand;
use crate::account::models::PendingReset;
use crate::account::models::RequestResetCommand;
use crate::account::models::ResetToken;
use crate::account::models::SignupCommand;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::models::UserProfile;
use crate::account::ports::AccountServicePort;
use crate::account::ports::ResetMailer;
use crate::account::ports::ResetPasswordMail;
use crate::account::ports::SessionCookiePort;
use crate::account::ports::UserRepository;

/// Domain service implementation for account operations.
///
/// Stateless between requests: session state lives in the client-held token,
/// and the only shared pieces are the read-only authenticator and the
/// repository's connection pool.
pub struct AccountService<UR, RM>
where
    UR: UserRepository,
    RM: ResetMailer,
{
    repository: Arc<UR>,
    mailer: Arc<RM>,
    authenticator: Arc<Authenticator>,
    reset_token_ttl: Duration,
}

impl<UR, RM> AccountService<UR, RM>
where
    UR: UserRepository,
    RM: ResetMailer,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `mailer` - Reset email delivery implementation
    /// * `authenticator` - Password hasher and session token issuer
    /// * `reset_token_ttl` - How long a mailed reset token stays usable
    pub fn new(
        repository: Arc<UR>,
        mailer: Arc<RM>,
        authenticator: Arc<Authenticator>,
        reset_token_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            mailer,
            authenticator,
            reset_token_ttl,
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, AccountError> {
        self.authenticator
            .hash_password(password)
            .map_err(|e| AccountError::Unknown(format!("Password hashing failed: {}", e)))
    }

    /// Verify a session token and load the profile it points at.
    ///
    /// Every failure collapses to `InvalidSession`.
    async fn resolve_session(&self, token: &str) -> Result<UserProfile, AccountError> {
        let claims = self.authenticator.validate_session(token).map_err(|e| {
            tracing::warn!(error = %e, "Session token rejected");
            AccountError::InvalidSession
        })?;

        let user_id = UserId::from_string(&claims.sub).map_err(|e| {
            tracing::warn!(error = %e, "Session token carries a malformed subject");
            AccountError::InvalidSession
        })?;

        match self.repository.find_profile_by_id(&user_id).await {
            Ok(Some(profile)) => {
                tracing::debug!(user_id = %user_id, "Session resolved");
                Ok(profile)
            }
            Ok(None) => {
                tracing::warn!(user_id = %user_id, "Session refers to a missing user");
                Err(AccountError::InvalidSession)
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Session lookup failed");
                Err(AccountError::InvalidSession)
            }
        }
    }
}

#[async_trait]
impl<UR, RM> AccountServicePort for AccountService<UR, RM>
where
    UR: UserRepository,
    RM: ResetMailer,
{
    async fn signup(&self, command: SignupCommand) -> Result<UserProfile, AccountError> {
        // Fast path only; the unique constraint in the store is what guarantees it
        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            tracing::warn!(email = %command.email, "Signup with registered email");
            return Err(AccountError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self.hash_password(command.password.expose())?;

        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            pending_reset: None,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, email = %created_user.email, "User signed up");

        Ok(created_user.profile())
    }

    async fn login(
        &self,
        command: LoginCommand,
        session: &mut dyn SessionCookiePort,
    ) -> Result<String, AccountError> {
        let user = match self.repository.find_by_email(&command.email).await? {
            Some(user) => user,
            None => {
                tracing::warn!(email = %command.email, "Login with unknown email");
                return Err(AccountError::InvalidCredentials);
            }
        };

        let subject = SessionSubject::new(user.id, user.name.as_str(), user.email.as_str());

        let result = self
            .authenticator
            .authenticate(command.password.expose(), &user.password_hash, &subject)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::warn!(user_id = %user.id, "Login with wrong password");
                    AccountError::InvalidCredentials
                }
                AuthenticationError::PasswordError(err) => {
                    AccountError::Unknown(format!("Password verification failed: {}", err))
                }
                AuthenticationError::JwtError(err) => {
                    AccountError::Unknown(format!("Token generation failed: {}", err))
                }
            })?;

        session.set(&result.session_token);
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(result.session_token)
    }

    async fn get_current_user(
        &self,
        token: Option<&str>,
        id: Option<&UserId>,
    ) -> Result<UserProfile, AccountError> {
        if let Some(id) = id {
            return match self.repository.find_profile_by_id(id).await {
                Ok(Some(profile)) => Ok(profile),
                Ok(None) => {
                    tracing::warn!(user_id = %id, "Lookup of a missing user");
                    Err(AccountError::InvalidSession)
                }
                Err(e) => {
                    tracing::error!(user_id = %id, error = %e, "User lookup failed");
                    Err(AccountError::InvalidSession)
                }
            };
        }

        match token {
            Some(token) if !token.is_empty() => self.resolve_session(token).await,
            _ => Err(AccountError::InvalidSession),
        }
    }

    async fn logout(&self, session: &mut dyn SessionCookiePort) {
        session.clear();
        session.revalidate_views();
        tracing::info!("Session cookie cleared");
    }

    async fn fetch_current_user_from_cookie(
        &self,
        session: &dyn SessionCookiePort,
    ) -> Result<UserProfile, AccountError> {
        let token = session
            .get()
            .filter(|token| !token.is_empty())
            .ok_or(AccountError::NoSession)?;

        self.resolve_session(&token).await
    }

    async fn has_active_session(&self, session: &dyn SessionCookiePort) -> bool {
        self.fetch_current_user_from_cookie(session).await.is_ok()
    }

    async fn request_password_reset(
        &self,
        command: RequestResetCommand,
    ) -> Result<(), AccountError> {
        let user = self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .ok_or_else(|| {
                tracing::warn!(email = %command.email, "Password reset for unknown email");
                AccountError::EmailNotFound(command.email.to_string())
            })?;

        let token = ResetToken::generate();
        let mail = ResetPasswordMail {
            recipient: user.email.clone(),
            user_id: user.id,
            token: token.clone(),
        };

        let receipt = self
            .mailer
            .send_reset_password_mail(&mail)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Reset mail dispatch failed");
                AccountError::from(e)
            })?;

        // Persist only once the provider confirmed delivery
        if !receipt.is_delivered() {
            tracing::error!(
                user_id = %user.id,
                status = receipt.status,
                "Reset mail not accepted by provider"
            );
            return Err(MailerError::Rejected(receipt.status).into());
        }

        let reset = PendingReset::new(token, Utc::now());
        self.repository.set_reset_token(&user.id, &reset).await?;
        tracing::info!(user_id = %user.id, "Password reset requested");

        Ok(())
    }

    async fn complete_password_reset(
        &self,
        command: CompleteResetCommand,
    ) -> Result<(), AccountError> {
        let user = self
            .repository
            .find_by_id(&command.user_id)
            .await?
            .ok_or(AccountError::NotFound(command.user_id.to_string()))?;

        if !user.reset_token_matches(&command.token, Utc::now(), self.reset_token_ttl) {
            tracing::warn!(user_id = %user.id, "Password reset with invalid or expired token");
            return Err(AccountError::InvalidResetToken);
        }

        let password_hash = self.hash_password(command.password.expose())?;

        let consumed = self
            .repository
            .consume_reset_token(&user.id, &command.token, &password_hash)
            .await?;

        if !consumed {
            tracing::warn!(user_id = %user.id, "Reset token consumed by a concurrent request");
            return Err(AccountError::InvalidResetToken);
        }

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }
}
