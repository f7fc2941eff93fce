use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::core::models::project::{Repository, Team, TeamRole};
use crate::core::ports::code_host::CodeHost;
use crate::error::Error;

const API: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct GitHub {
    client: Client,
    token: String,
    org: String,
}

impl GitHub {
    pub fn new(client: Client, token: String, org: String) -> Self {
        Self { client, token, org }
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", "clubhouse")
    }

    async fn error_message(response: Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(ErrorBody { message: Some(message) }) => message,
            _ => status.to_string(),
        }
    }
}

impl CodeHost for GitHub {
    async fn find_team(&self, slug: &str) -> Result<Option<Team>, Error> {
        let url = format!("{}/orgs/{}/teams/{}", API, self.org, slug);
        let response = self.authorize(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::CodeHostError(format!("failed to look up team: {}", Self::error_message(response).await)));
        }
        Ok(Some(response.json().await?))
    }

    async fn create_team(&self, name: &str, description: &str) -> Result<Team, Error> {
        let url = format!("{}/orgs/{}/teams", API, self.org);
        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({ "name": name, "description": description, "privacy": "closed" }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::CodeHostError(format!("failed to create team: {}", Self::error_message(response).await)));
        }
        Ok(response.json().await?)
    }

    async fn add_team_member(&self, team_slug: &str, username: &str, role: TeamRole) -> Result<bool, Error> {
        let url = format!("{}/orgs/{}/teams/{}/memberships/{}", API, self.org, team_slug, username);
        let response = self.authorize(self.client.put(&url)).json(&json!({ "role": role })).send().await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Error::CodeHostError(Self::error_message(response).await)),
        }
    }

    async fn create_repository(&self, name: &str, description: &str) -> Result<Repository, Error> {
        let url = format!("{}/orgs/{}/repos", API, self.org);
        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({
                "name": name,
                "description": description,
                "private": true,
                "auto_init": true,
                "has_issues": true,
                "has_projects": true,
                "has_wiki": false,
            }))
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(Repository::Created);
        }
        let message = Self::error_message(response).await;
        if message.contains("already exists") {
            return Ok(Repository::AlreadyExists);
        }
        Err(Error::CodeHostError(format!("failed to create repo: {}", message)))
    }

    async fn grant_team_push(&self, team_slug: &str, repo: &str) -> Result<(), Error> {
        let url = format!("{}/orgs/{}/teams/{}/repos/{}/{}", API, self.org, team_slug, self.org, repo);
        let response = self.authorize(self.client.put(&url)).json(&json!({ "permission": "push" })).send().await?;
        if !response.status().is_success() {
            return Err(Error::CodeHostError(format!("failed to add team to repo: {}", Self::error_message(response).await)));
        }
        Ok(())
    }

    async fn protect_main_branch(&self, repo: &str, lead_username: &str) -> Result<(), Error> {
        let url = format!("{}/repos/{}/{}/branches/main/protection", API, self.org, repo);
        let response = self
            .authorize(self.client.put(&url))
            .json(&json!({
                "required_status_checks": null,
                "enforce_admins": false,
                "required_pull_request_reviews": {
                    "dismissal_restrictions": {},
                    "dismiss_stale_reviews": true,
                    "require_code_owner_reviews": false,
                    "required_approving_review_count": 1,
                    "require_last_push_approval": false,
                },
                "restrictions": { "users": [lead_username], "teams": [], "apps": [] },
                "required_linear_history": false,
                "allow_force_pushes": false,
                "allow_deletions": false,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::CodeHostError(Self::error_message(response).await));
        }
        Ok(())
    }
}
