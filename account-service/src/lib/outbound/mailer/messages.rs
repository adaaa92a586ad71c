use serde::Serialize;

/// JSON body accepted by the transactional mail provider.
#[derive(Debug, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingMail {
    pub fn reset_password(from: &str, to: &str, link: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: "Reset your password".to_string(),
            text: format!(
                "We received a request to reset your password.\n\nOpen this link to choose a new one:\n{}\n\nIf you did not ask for a reset you can ignore this email.",
                link
            ),
            html: format!(
                "<p>We received a request to reset your password.</p><p><a href=\"{}\">Choose a new password</a></p><p>If you did not ask for a reset you can ignore this email.</p>",
                link
            ),
        }
    }
}
