//! Ledger of the mutations a decision has applied, and the reverse-order unwind over it.

use std::fmt::{self, Display};

use uuid::Uuid;

use crate::core::models::{
    application::{Application, Review},
    user::Role,
};
use crate::core::ports::repository::{ApplicationCommon, ClassEnrollmentCommon, ProjectMemberCommon, RoleCommon, Store};
use crate::error::Error;

/// A forward step of the decision workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    UpdateApplication,
    UpgradeRole,
    AddProjectMember,
    EnrollClass,
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::UpdateApplication => write!(f, "update application status"),
            Step::UpgradeRole => write!(f, "upgrade role"),
            Step::AddProjectMember => write!(f, "add to project"),
            Step::EnrollClass => write!(f, "enroll in class"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedStep {
    ApplicationUpdated { decided: Review },
    RoleUpgraded { previous: Role },
    ProjectMemberAdded { project_id: Uuid },
    ClassEnrolled { class_id: Uuid },
}

impl AppliedStep {
    fn step(&self) -> Step {
        match self {
            AppliedStep::ApplicationUpdated { .. } => Step::UpdateApplication,
            AppliedStep::RoleUpgraded { .. } => Step::UpgradeRole,
            AppliedStep::ProjectMemberAdded { .. } => Step::AddProjectMember,
            AppliedStep::ClassEnrolled { .. } => Step::EnrollClass,
        }
    }
}

#[derive(Debug)]
pub struct Saga {
    application_id: Uuid,
    user_id: Uuid,
    snapshot: Review,
    applied: Vec<AppliedStep>,
}

impl Saga {
    pub fn new(application: &Application) -> Self {
        Self {
            application_id: application.id,
            user_id: application.user_id,
            snapshot: application.review(),
            applied: Vec::new(),
        }
    }

    pub fn record(&mut self, step: AppliedStep) {
        self.applied.push(step);
    }

    pub fn applied(&self) -> &[AppliedStep] {
        &self.applied
    }

    pub fn upgraded_role(&self) -> bool {
        self.applied.iter().any(|s| matches!(s, AppliedStep::RoleUpgraded { .. }))
    }

    /// Undo every recorded step, newest first. A failing compensation is logged and
    /// the unwind carries on. Returns the number of compensations that failed.
    pub async fn compensate<D>(self, db: &mut D) -> usize
    where
        D: Store,
    {
        let mut failed = 0;
        for applied in self.applied.iter().rev() {
            if let Err(e) = self.undo(db, applied).await {
                failed += 1;
                log::error!("application {}: failed to compensate '{}': {}", self.application_id, applied.step(), e);
            }
        }
        if failed == 0 {
            log::warn!("application {}: rolled back {} step(s)", self.application_id, self.applied.len());
        }
        failed
    }

    async fn undo<D>(&self, db: &mut D, applied: &AppliedStep) -> Result<(), Error>
    where
        D: Store,
    {
        match applied {
            AppliedStep::ClassEnrolled { class_id } => ClassEnrollmentCommon::delete(db, *class_id, self.user_id).await,
            AppliedStep::ProjectMemberAdded { project_id } => ProjectMemberCommon::delete(db, *project_id, self.user_id).await,
            AppliedStep::RoleUpgraded { previous } => RoleCommon::update(db, self.user_id, *previous).await,
            AppliedStep::ApplicationUpdated { decided } => {
                if !ApplicationCommon::update_review(db, self.application_id, decided, &self.snapshot).await? {
                    log::warn!("application {}: review changed after this decision, leaving it in place", self.application_id);
                }
                Ok(())
            }
        }
    }
}
