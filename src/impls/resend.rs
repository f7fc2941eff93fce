use reqwest::Client;
use serde::Serialize;

use crate::core::ports::notifier::{Email, Mailer};
use crate::error::Error;

const EMAILS_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

pub struct Resend {
    client: Client,
    api_key: String,
    from: String,
}

impl Resend {
    pub fn new(client: Client, api_key: String, from: String) -> Self {
        Self { client, api_key, from }
    }
}

impl Mailer for Resend {
    async fn send(&self, email: &Email) -> Result<(), Error> {
        let response = self
            .client
            .post(EMAILS_URL)
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::NotificationError(format!("resend returned {}: {}", status, text)));
        }
        Ok(())
    }
}
