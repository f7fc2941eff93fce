use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::ports::notifier::{ChatInvite, ChatInviter};
use crate::error::Error;

const INVITE_URL: &str = "https://slack.com/api/admin.users.invite";

#[derive(Debug, Serialize)]
struct InviteRequest<'a> {
    team_id: &'a str,
    email: &'a str,
    real_name: &'a str,
    resend: bool,
}

#[derive(Debug, Deserialize)]
struct InviteResponse {
    ok: bool,
    error: Option<String>,
}

pub struct Slack {
    client: Client,
    token: String,
    team_id: String,
}

impl Slack {
    pub fn new(client: Client, token: String, team_id: String) -> Self {
        Self { client, token, team_id }
    }
}

impl ChatInviter for Slack {
    async fn invite(&self, invite: &ChatInvite) -> Result<(), Error> {
        let response = self
            .client
            .post(INVITE_URL)
            .bearer_auth(&self.token)
            .json(&InviteRequest {
                team_id: &self.team_id,
                email: &invite.email,
                real_name: &invite.real_name,
                resend: true,
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::NotificationError(format!("slack returned {}", status)));
        }
        let body: InviteResponse = response.json().await?;
        if !body.ok {
            return Err(Error::NotificationError(body.error.unwrap_or_else(|| "unknown slack error".into())));
        }
        Ok(())
    }
}
