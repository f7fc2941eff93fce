use std::fmt::{self, Display};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "application_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    ClubAdmission,
    Board,
    Project,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationStatus::Pending => write!(f, "pending"),
            ApplicationStatus::Accepted => write!(f, "accepted"),
            ApplicationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// The verdict a reviewer applies. Only the two terminal statuses are decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn is_accepted(self) -> bool {
        self == Decision::Accepted
    }
}

impl From<Decision> for ApplicationStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Accepted => ApplicationStatus::Accepted,
            Decision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "project_member_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    Lead,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "class_member_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClassRole {
    Teacher,
    Student,
}

#[derive(Debug, Clone, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub application_type: ApplicationType,
    pub status: Option<ApplicationStatus>,
    pub project_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub board_position: Option<String>,
    pub project_role: Option<ProjectRole>,
    pub class_role: Option<ClassRole>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Unset status is treated as pending.
    pub fn current_status(&self) -> ApplicationStatus {
        self.status.unwrap_or(ApplicationStatus::Pending)
    }

    pub fn review(&self) -> Review {
        Review {
            status: self.status,
            reviewed_by: self.reviewed_by,
            reviewed_at: self.reviewed_at,
        }
    }
}

/// The three review columns, written together on decision and restored together on rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub status: Option<ApplicationStatus>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Review {
    /// `at` is cut to microseconds so the value read back from Postgres compares equal.
    pub fn decided(decision: Decision, reviewer_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(decision.into()),
            reviewed_by: Some(reviewer_id),
            reviewed_at: Some(at.trunc_subsecs(6)),
        }
    }
}
