use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::models::{
    application::{Application, Review},
    membership::{ClassEnrollmentInsert, ProjectMemberInsert},
    project::{Project, ProvisioningMember},
    user::{Profile, Role},
};
use crate::error::Error;

pub trait ApplicationCommon {
    async fn get(&mut self, id: Uuid) -> Result<Option<Application>, Error>;
    /// Replace the review columns only if they still hold `expected`.
    /// Returns false when the row is missing or was changed by someone else.
    async fn update_review(&mut self, id: Uuid, expected: &Review, review: &Review) -> Result<bool, Error>;
}

pub trait ProfileCommon {
    async fn get(&mut self, id: Uuid) -> Result<Option<Profile>, Error>;
}

pub trait RoleCommon {
    async fn get(&mut self, user_id: Uuid) -> Result<Option<Role>, Error>;
    async fn update(&mut self, user_id: Uuid, role: Role) -> Result<(), Error>;
}

pub trait ProjectMemberCommon {
    async fn exists(&mut self, project_id: Uuid, user_id: Uuid) -> Result<bool, Error>;
    async fn insert(&mut self, member: ProjectMemberInsert) -> Result<(), Error>;
    async fn delete(&mut self, project_id: Uuid, user_id: Uuid) -> Result<(), Error>;
    /// Members of the project who have a GitHub username on their profile.
    async fn with_github_username(&mut self, project_id: Uuid) -> Result<Vec<ProvisioningMember>, Error>;
}

pub trait ClassEnrollmentCommon {
    async fn exists(&mut self, class_id: Uuid, user_id: Uuid) -> Result<bool, Error>;
    async fn insert(&mut self, enrollment: ClassEnrollmentInsert) -> Result<(), Error>;
    async fn delete(&mut self, class_id: Uuid, user_id: Uuid) -> Result<(), Error>;
}

pub trait ProjectCommon {
    async fn ready_for_provisioning(&mut self, today: NaiveDate) -> Result<Vec<Project>, Error>;
    async fn set_repository_url(&mut self, id: Uuid, url: &str) -> Result<(), Error>;
}

pub trait Store: ApplicationCommon + ProfileCommon + RoleCommon + ProjectMemberCommon + ClassEnrollmentCommon + ProjectCommon {}

impl<T> Store for T where T: ApplicationCommon + ProfileCommon + RoleCommon + ProjectMemberCommon + ClassEnrollmentCommon + ProjectCommon {}

/// Hands out a store per request.
pub trait Manager {
    type Store: Store;
    async fn store(&self) -> Result<Self::Store, Error>;
}
