use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Url;
use thiserror::Error;

use crate::account::errors::MailerError;
use crate::account::ports::MailReceipt;
use crate::account::ports::ResetMailer;
use crate::account::ports::ResetPasswordMail;
use crate::config::MailerConfig;
use crate::outbound::mailer::messages::OutgoingMail;

#[derive(Debug, Error)]
pub enum HttpMailerError {
    #[error("Invalid reset page url: {0}")]
    InvalidResetUrl(String),

    #[error("Failed to build http client: {0}")]
    ClientBuild(String),

    #[error("Failed to send mail request: {0}")]
    Transport(String),
}

impl From<HttpMailerError> for MailerError {
    fn from(err: HttpMailerError) -> Self {
        MailerError::RequestFailed(err.to_string())
    }
}

/// Reset mailer backed by a transactional mail provider's HTTP API.
///
/// Any HTTP answer is reported back as a [`MailReceipt`]; only a failure to
/// get an answer at all is an error.
pub struct HttpResetMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    sender: String,
    reset_url: Url,
}

impl HttpResetMailer {
    pub fn new(config: &MailerConfig) -> Result<Self, HttpMailerError> {
        let reset_url = Url::parse(&config.reset_url)
            .map_err(|e| HttpMailerError::InvalidResetUrl(format!("{}: {}", config.reset_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HttpMailerError::ClientBuild(e.to_string()))?;

        tracing::info!(
            endpoint = %config.endpoint,
            sender = %config.sender,
            "Reset mailer initialized"
        );

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
            reset_url,
        })
    }

    /// Reset page link carrying the token and the user id as query parameters.
    pub fn reset_link(&self, mail: &ResetPasswordMail) -> Url {
        let mut link = self.reset_url.clone();
        link.query_pairs_mut()
            .append_pair("token", mail.token.as_str())
            .append_pair("user", &mail.user_id.to_string());
        link
    }
}

#[async_trait]
impl ResetMailer for HttpResetMailer {
    async fn send_reset_password_mail(
        &self,
        mail: &ResetPasswordMail,
    ) -> Result<MailReceipt, MailerError> {
        let link = self.reset_link(mail);
        let message =
            OutgoingMail::reset_password(&self.sender, mail.recipient.as_str(), link.as_str());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| HttpMailerError::Transport(e.to_string()))?;

        let receipt = MailReceipt {
            status: response.status().as_u16(),
        };
        tracing::debug!(
            user_id = %mail.user_id,
            status = receipt.status,
            "Reset mail handed to provider"
        );

        Ok(receipt)
    }
}
