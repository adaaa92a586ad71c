use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::errors::MailerError;
use crate::account::models::CompleteResetCommand;
use crate::account::models::EmailAddress;
use crate::account::models::LoginCommand;
use crate::account::models::PendingReset;
use crate::account::models::RequestResetCommand;
use crate::account::models::ResetToken;
use crate::account::models::SignupCommand;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::models::UserProfile;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new user. Does not start a session.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn signup(&self, command: SignupCommand) -> Result<UserProfile, AccountError>;

    /// Check credentials, issue a session token and store it in the session cookie.
    ///
    /// # Returns
    /// The issued session token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    async fn login(
        &self,
        command: LoginCommand,
        session: &mut dyn SessionCookiePort,
    ) -> Result<String, AccountError>;

    /// Resolve a user profile either by explicit id or from a session token.
    ///
    /// # Errors
    /// * `NotFound` - Explicit id does not resolve
    /// * `InvalidSession` - Token missing, invalid, expired, or its user is gone
    async fn get_current_user(
        &self,
        token: Option<&str>,
        id: Option<&UserId>,
    ) -> Result<UserProfile, AccountError>;

    /// Clear the session cookie and signal dependent views to revalidate.
    async fn logout(&self, session: &mut dyn SessionCookiePort);

    /// Resolve the user behind the session cookie.
    ///
    /// # Errors
    /// * `NoSession` - No session cookie present
    /// * `InvalidSession` - Cookie does not verify or its user is gone
    async fn fetch_current_user_from_cookie(
        &self,
        session: &dyn SessionCookiePort,
    ) -> Result<UserProfile, AccountError>;

    /// Whether the session cookie holds a usable session.
    async fn has_active_session(&self, session: &dyn SessionCookiePort) -> bool;

    /// Generate a reset token, mail it, and persist it once the mail is accepted.
    ///
    /// # Errors
    /// * `EmailNotFound` - No user with this email
    /// * `MailDelivery` - Mail provider did not confirm delivery; user unchanged
    async fn request_password_reset(&self, command: RequestResetCommand)
        -> Result<(), AccountError>;

    /// Replace the password using a pending reset token and clear the token.
    ///
    /// # Errors
    /// * `NotFound` - User id does not resolve
    /// * `InvalidResetToken` - Token does not match, is expired, or was already used
    async fn complete_password_reset(
        &self,
        command: CompleteResetCommand,
    ) -> Result<(), AccountError>;
}

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, AccountError>;

    /// Retrieve a user, credentials included, by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError>;

    /// Retrieve a user, credentials included, by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError>;

    /// Retrieve the password-excluded projection of a user.
    async fn find_profile_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, AccountError>;

    /// Store a pending reset on an existing user. Touches only the reset columns.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn set_reset_token(&self, id: &UserId, reset: &PendingReset)
        -> Result<(), AccountError>;

    /// Replace the password hash and clear the pending reset in one write,
    /// only if the stored token still equals `token`.
    ///
    /// # Returns
    /// `false` when no row matched (token already consumed or replaced)
    async fn consume_reset_token(
        &self,
        id: &UserId,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, AccountError>;
}

/// Password reset email handed to the mail collaborator.
#[derive(Debug, Clone)]
pub struct ResetPasswordMail {
    pub recipient: EmailAddress,
    pub user_id: UserId,
    pub token: ResetToken,
}

/// Provider answer for a dispatched mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailReceipt {
    pub status: u16,
}

impl MailReceipt {
    /// Only an explicit 200 counts as delivered.
    pub fn is_delivered(&self) -> bool {
        self.status == 200
    }
}

/// Outbound email delivery for password resets.
#[async_trait]
pub trait ResetMailer: Send + Sync + 'static {
    /// # Errors
    /// * `RequestFailed` - Provider could not be reached
    async fn send_reset_password_mail(
        &self,
        mail: &ResetPasswordMail,
    ) -> Result<MailReceipt, MailerError>;
}

/// Client-held session token storage, one instance per request.
///
/// An absent cookie is a normal state meaning "no active session".
pub trait SessionCookiePort: Send + Sync {
    /// Raw session token, if the client sent one.
    fn get(&self) -> Option<String>;

    /// Store the token with the session cookie attributes.
    fn set(&mut self, token: &str);

    /// Overwrite the cookie with an empty, immediately expiring value.
    fn clear(&mut self);

    /// Ask the client to drop cached representations derived from the session.
    fn revalidate_views(&mut self);
}
