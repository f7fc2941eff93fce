//! In-memory store, notifiers and code host for tests.
//!
//! The store can be told to fail or stall on any operation, which is how the
//! rollback paths of the decision workflow are exercised.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::models::{
    application::{Application, ClassRole, Review},
    membership::{ClassEnrollmentInsert, ProjectMemberInsert},
    project::{Project, ProvisioningMember, Repository, Team, TeamRole},
    user::{Profile, Role},
};
use crate::core::ports::code_host::CodeHost;
use crate::core::ports::notifier::{ChatInvite, ChatInviter, Email, Mailer};
use crate::core::ports::repository::{ApplicationCommon, ClassEnrollmentCommon, Manager, ProfileCommon, ProjectCommon, ProjectMemberCommon, RoleCommon};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetApplication,
    UpdateApplication,
    GetProfile,
    GetRole,
    UpdateRole,
    ProjectMemberExists,
    InsertProjectMember,
    DeleteProjectMember,
    ClassEnrollmentExists,
    InsertClassEnrollment,
    DeleteClassEnrollment,
    ReadyForProvisioning,
    SetRepositoryUrl,
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Always,
    OnCall(usize),
}

#[derive(Debug, Default)]
struct State {
    applications: HashMap<Uuid, Application>,
    profiles: HashMap<Uuid, Profile>,
    roles: HashMap<Uuid, Role>,
    project_members: Vec<ProjectMemberInsert>,
    class_enrollments: Vec<ClassEnrollmentInsert>,
    projects: Vec<(Project, Option<String>)>,
    github_members: HashMap<Uuid, Vec<ProvisioningMember>>,
    failures: HashMap<Operation, Failure>,
    delays: HashMap<Operation, Duration>,
    calls: HashMap<Operation, usize>,
    writes: usize,
}

/// Clones share the same state, so a test can hand one to the code under test and
/// inspect another.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn fail_on(&self, op: Operation) {
        self.state().failures.insert(op, Failure::Always);
    }

    /// Fail only the `n`th call (1-based) of `op`.
    pub fn fail_on_call(&self, op: Operation, n: usize) {
        self.state().failures.insert(op, Failure::OnCall(n));
    }

    pub fn delay_on(&self, op: Operation, delay: Duration) {
        self.state().delays.insert(op, delay);
    }

    pub fn seed_application(&self, application: Application) {
        self.state().applications.insert(application.id, application);
    }

    pub fn seed_profile(&self, profile: Profile) {
        self.state().profiles.insert(profile.id, profile);
    }

    pub fn seed_role(&self, user_id: Uuid, role: Role) {
        self.state().roles.insert(user_id, role);
    }

    pub fn seed_class_enrollment(&self, class_id: Uuid, user_id: Uuid, role: ClassRole) {
        self.state().class_enrollments.push(ClassEnrollmentInsert { class_id, user_id, role });
    }

    pub fn seed_project(&self, project: Project) {
        self.state().projects.push((project, None));
    }

    pub fn seed_github_member(&self, project_id: Uuid, user_id: Uuid, username: &str, is_lead: bool) {
        self.state().github_members.entry(project_id).or_default().push(ProvisioningMember {
            user_id,
            is_lead,
            github_username: username.to_owned(),
        });
    }

    pub fn application(&self, id: Uuid) -> Option<Application> {
        self.state().applications.get(&id).cloned()
    }

    pub fn role(&self, user_id: Uuid) -> Option<Role> {
        self.state().roles.get(&user_id).copied()
    }

    pub fn project_members(&self) -> Vec<ProjectMemberInsert> {
        self.state().project_members.clone()
    }

    pub fn class_enrollments(&self) -> Vec<ClassEnrollmentInsert> {
        self.state().class_enrollments.clone()
    }

    pub fn repository_url(&self, project_id: Uuid) -> Option<String> {
        self.state().projects.iter().find(|(p, _)| p.id == project_id).and_then(|(_, url)| url.clone())
    }

    /// Number of successful mutating calls.
    pub fn writes(&self) -> usize {
        self.state().writes
    }

    /// Count the call, then stall and/or fail it as configured.
    async fn enter(&self, op: Operation) -> Result<(), Error> {
        let (delay, fail) = {
            let mut state = self.state();
            let calls = state.calls.entry(op).or_default();
            *calls += 1;
            let n = *calls;
            let fail = match state.failures.get(&op) {
                Some(Failure::Always) => true,
                Some(Failure::OnCall(k)) => *k == n,
                None => false,
            };
            (state.delays.get(&op).copied(), fail)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(Error::ServerError(format!("injected failure on {:?}", op)));
        }
        Ok(())
    }

    fn wrote(&self) {
        self.state().writes += 1;
    }
}

impl ApplicationCommon for MemoryStore {
    async fn get(&mut self, id: Uuid) -> Result<Option<Application>, Error> {
        self.enter(Operation::GetApplication).await?;
        Ok(self.application(id))
    }

    async fn update_review(&mut self, id: Uuid, expected: &Review, review: &Review) -> Result<bool, Error> {
        self.enter(Operation::UpdateApplication).await?;
        let mut state = self.state();
        let application = match state.applications.get_mut(&id) {
            Some(application) if application.review() == *expected => application,
            _ => return Ok(false),
        };
        application.status = review.status;
        application.reviewed_by = review.reviewed_by;
        application.reviewed_at = review.reviewed_at;
        state.writes += 1;
        Ok(true)
    }
}

impl ProfileCommon for MemoryStore {
    async fn get(&mut self, id: Uuid) -> Result<Option<Profile>, Error> {
        self.enter(Operation::GetProfile).await?;
        Ok(self.state().profiles.get(&id).cloned())
    }
}

impl RoleCommon for MemoryStore {
    async fn get(&mut self, user_id: Uuid) -> Result<Option<Role>, Error> {
        self.enter(Operation::GetRole).await?;
        Ok(self.role(user_id))
    }

    async fn update(&mut self, user_id: Uuid, role: Role) -> Result<(), Error> {
        self.enter(Operation::UpdateRole).await?;
        self.state().roles.insert(user_id, role);
        self.wrote();
        Ok(())
    }
}

impl ProjectMemberCommon for MemoryStore {
    async fn exists(&mut self, project_id: Uuid, user_id: Uuid) -> Result<bool, Error> {
        self.enter(Operation::ProjectMemberExists).await?;
        Ok(self.state().project_members.iter().any(|m| m.project_id == project_id && m.user_id == user_id))
    }

    async fn insert(&mut self, member: ProjectMemberInsert) -> Result<(), Error> {
        self.enter(Operation::InsertProjectMember).await?;
        let mut state = self.state();
        if state.project_members.iter().any(|m| m.project_id == member.project_id && m.user_id == member.user_id) {
            return Err(Error::ServerError("duplicate project member".into()));
        }
        state.project_members.push(member);
        state.writes += 1;
        Ok(())
    }

    async fn delete(&mut self, project_id: Uuid, user_id: Uuid) -> Result<(), Error> {
        self.enter(Operation::DeleteProjectMember).await?;
        self.state().project_members.retain(|m| !(m.project_id == project_id && m.user_id == user_id));
        self.wrote();
        Ok(())
    }

    async fn with_github_username(&mut self, project_id: Uuid) -> Result<Vec<ProvisioningMember>, Error> {
        Ok(self.state().github_members.get(&project_id).cloned().unwrap_or_default())
    }
}

impl ClassEnrollmentCommon for MemoryStore {
    async fn exists(&mut self, class_id: Uuid, user_id: Uuid) -> Result<bool, Error> {
        self.enter(Operation::ClassEnrollmentExists).await?;
        Ok(self.state().class_enrollments.iter().any(|e| e.class_id == class_id && e.user_id == user_id))
    }

    async fn insert(&mut self, enrollment: ClassEnrollmentInsert) -> Result<(), Error> {
        self.enter(Operation::InsertClassEnrollment).await?;
        let mut state = self.state();
        if state.class_enrollments.iter().any(|e| e.class_id == enrollment.class_id && e.user_id == enrollment.user_id) {
            return Err(Error::ServerError("duplicate class enrollment".into()));
        }
        state.class_enrollments.push(enrollment);
        state.writes += 1;
        Ok(())
    }

    async fn delete(&mut self, class_id: Uuid, user_id: Uuid) -> Result<(), Error> {
        self.enter(Operation::DeleteClassEnrollment).await?;
        self.state().class_enrollments.retain(|e| !(e.class_id == class_id && e.user_id == user_id));
        self.wrote();
        Ok(())
    }
}

impl ProjectCommon for MemoryStore {
    async fn ready_for_provisioning(&mut self, today: NaiveDate) -> Result<Vec<Project>, Error> {
        self.enter(Operation::ReadyForProvisioning).await?;
        Ok(self
            .state()
            .projects
            .iter()
            .filter(|(p, url)| url.is_none() && p.start_date <= today)
            .map(|(p, _)| p.clone())
            .collect())
    }

    async fn set_repository_url(&mut self, id: Uuid, url: &str) -> Result<(), Error> {
        self.enter(Operation::SetRepositoryUrl).await?;
        let mut state = self.state();
        if let Some((_, slot)) = state.projects.iter_mut().find(|(p, _)| p.id == id) {
            *slot = Some(url.to_owned());
        }
        state.writes += 1;
        Ok(())
    }
}

impl Manager for MemoryStore {
    type Store = MemoryStore;

    async fn store(&self) -> Result<Self::Store, Error> {
        Ok(self.clone())
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingChat {
    invites: Arc<Mutex<Vec<ChatInvite>>>,
    fail: bool,
    hang: bool,
}

impl RecordingChat {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Records the invite and then never answers.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }

    pub fn invites(&self) -> Vec<ChatInvite> {
        self.invites.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl ChatInviter for RecordingChat {
    async fn invite(&self, invite: &ChatInvite) -> Result<(), Error> {
        self.invites.lock().unwrap_or_else(|p| p.into_inner()).push(invite.clone());
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(Error::NotificationError("already_in_team".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<Email>>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), Error> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner()).push(email.clone());
        if self.fail {
            return Err(Error::NotificationError("email provider returned 500".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Host {
    teams: HashMap<String, Team>,
    repositories: HashSet<String>,
    created_teams: Vec<String>,
    memberships: Vec<(String, TeamRole)>,
    pushes: Vec<(String, String)>,
    failing_pushes: HashSet<String>,
    fail_protection: bool,
}

#[derive(Debug, Default, Clone)]
pub struct FakeCodeHost {
    host: Arc<Mutex<Host>>,
}

impl FakeCodeHost {
    fn host(&self) -> MutexGuard<'_, Host> {
        self.host.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn existing_team(&self, slug: &str, name: &str) {
        self.host().teams.insert(
            slug.to_owned(),
            Team {
                name: name.to_owned(),
                slug: slug.to_owned(),
            },
        );
    }

    pub fn existing_repository(&self, name: &str) {
        self.host().repositories.insert(name.to_owned());
    }

    pub fn fail_push_for(&self, repo: &str) {
        self.host().failing_pushes.insert(repo.to_owned());
    }

    pub fn fail_protection(&self) {
        self.host().fail_protection = true;
    }

    pub fn created_teams(&self) -> Vec<String> {
        self.host().created_teams.clone()
    }

    pub fn memberships(&self) -> Vec<(String, TeamRole)> {
        self.host().memberships.clone()
    }

    pub fn pushes(&self) -> Vec<(String, String)> {
        self.host().pushes.clone()
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_owned()
}

impl CodeHost for FakeCodeHost {
    async fn find_team(&self, slug: &str) -> Result<Option<Team>, Error> {
        Ok(self.host().teams.get(slug).cloned())
    }

    async fn create_team(&self, name: &str, _description: &str) -> Result<Team, Error> {
        let team = Team {
            name: name.to_owned(),
            slug: slugify(name),
        };
        let mut host = self.host();
        host.created_teams.push(name.to_owned());
        host.teams.insert(team.slug.clone(), team.clone());
        Ok(team)
    }

    async fn add_team_member(&self, _team_slug: &str, username: &str, role: TeamRole) -> Result<bool, Error> {
        self.host().memberships.push((username.to_owned(), role));
        Ok(true)
    }

    async fn create_repository(&self, name: &str, _description: &str) -> Result<Repository, Error> {
        if self.host().repositories.insert(name.to_owned()) {
            Ok(Repository::Created)
        } else {
            Ok(Repository::AlreadyExists)
        }
    }

    async fn grant_team_push(&self, team_slug: &str, repo: &str) -> Result<(), Error> {
        let mut host = self.host();
        if host.failing_pushes.contains(repo) {
            return Err(Error::CodeHostError(format!("failed to add team to repo {}", repo)));
        }
        host.pushes.push((team_slug.to_owned(), repo.to_owned()));
        Ok(())
    }

    async fn protect_main_branch(&self, _repo: &str, _lead_username: &str) -> Result<(), Error> {
        if self.host().fail_protection {
            return Err(Error::CodeHostError("branch protection requires a paid plan".into()));
        }
        Ok(())
    }
}

pub mod fixtures {
    use super::*;
    use crate::core::models::application::{ApplicationStatus, ApplicationType};

    pub const REVIEWER: Uuid = Uuid::from_u128(0x0b0a_7d00_0000_0000_0000_0000_0000_0001);

    pub fn application(application_type: ApplicationType) -> Application {
        Application {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            full_name: "Ada Applicant".into(),
            application_type,
            status: Some(ApplicationStatus::Pending),
            project_id: Some(Uuid::new_v4()),
            class_id: Some(Uuid::new_v4()),
            board_position: None,
            project_role: None,
            class_role: None,
            reviewed_by: None,
            reviewed_at: None,
        }
    }

    pub fn profile(user_id: Uuid) -> Profile {
        Profile {
            id: user_id,
            email: "ada@example.org".into(),
            full_name: Some("Ada Lovelace".into()),
        }
    }

    pub fn project(name: &str, semester_code: &str, start_date: NaiveDate) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            semester_code: semester_code.to_owned(),
            start_date,
        }
    }
}
