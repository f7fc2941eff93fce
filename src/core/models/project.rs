use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An accepted project that has started but has no repository yet.
#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub semester_code: String,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProvisioningMember {
    pub user_id: Uuid,
    pub is_lead: bool,
    pub github_username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Maintainer,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repository {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProvisioningResult {
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProvisioningResult {
    pub fn provisioned(project: String, team: String, repo: String, created: bool) -> Self {
        Self {
            project,
            team: Some(team),
            repo: Some(repo),
            created: Some(created),
            success: true,
            error: None,
        }
    }

    pub fn failed(project: String, error: impl Into<String>) -> Self {
        Self {
            project,
            team: None,
            repo: None,
            created: None,
            success: false,
            error: Some(error.into()),
        }
    }
}
