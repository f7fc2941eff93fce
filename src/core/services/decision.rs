use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::core::lock::DecisionLocks;
use crate::core::models::{
    application::{Application, ApplicationStatus, ApplicationType, ClassRole, Decision, ProjectRole, Review},
    membership::{ClassEnrollmentInsert, ProjectMemberInsert},
    user::{Profile, Role},
};
use crate::core::ports::notifier::{ChatInviter, Mailer};
use crate::core::ports::repository::{ApplicationCommon, ClassEnrollmentCommon, ProfileCommon, ProjectMemberCommon, RoleCommon, Store};
use crate::core::saga::{AppliedStep, Saga, Step};
use crate::core::services::notification::{Notice, NotificationDispatcher};
use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub application_id: Uuid,
    #[serde(rename = "status")]
    pub decision: Decision,
    pub reviewer_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub upgraded_role: bool,
}

/// A decision whose changes have all landed and which has not been announced yet.
#[derive(Debug)]
pub struct Decided {
    application: Application,
    profile: Profile,
    decision: Decision,
    upgraded_role: bool,
}

pub struct DecisionProcessor<C, M> {
    dispatcher: NotificationDispatcher<C, M>,
    locks: DecisionLocks,
    step_timeout: Duration,
}

impl<C, M> DecisionProcessor<C, M>
where
    C: ChatInviter,
    M: Mailer,
{
    pub fn new(dispatcher: NotificationDispatcher<C, M>, step_timeout: Duration) -> Self {
        Self {
            dispatcher,
            locks: DecisionLocks::new(),
            step_timeout,
        }
    }

    /// Apply a reviewer's decision to an application, then announce it.
    ///
    /// Durable changes are made in dependency order (application, role, memberships).
    /// If any of them fails, the ones already made are undone newest first and the
    /// failure is returned. Notifications go out only after every change has landed,
    /// and their failures never reach the caller.
    pub async fn process<D>(&self, db: &mut D, request: DecisionRequest) -> Result<DecisionOutcome, Error>
    where
        D: Store,
    {
        let decided = self.decide(db, request).await?;
        Ok(self.announce(&decided).await)
    }

    /// The durable half of [`process`](Self::process). The per-application lock is
    /// held only for this part.
    pub async fn decide<D>(&self, db: &mut D, request: DecisionRequest) -> Result<Decided, Error>
    where
        D: Store,
    {
        let _guard = self.locks.acquire(request.application_id).await;

        let application = ApplicationCommon::get(db, request.application_id)
            .await?
            .ok_or(Error::ApplicationNotFound(request.application_id))?;
        let status = application.current_status();
        if status != ApplicationStatus::Pending {
            return Err(Error::InvalidTransition { id: application.id, status });
        }
        let profile = ProfileCommon::get(db, application.user_id)
            .await?
            .ok_or(Error::ProfileNotFound(application.user_id))?;
        let current_role = RoleCommon::get(db, application.user_id).await?;

        let mut saga = Saga::new(&application);
        if let Err(e) = self.apply(db, &application, &request, current_role, &mut saga).await {
            if saga.applied().is_empty() {
                log::warn!("application {}: {}, nothing to roll back", application.id, e);
            } else {
                log::error!("application {}: {}, rolling back", application.id, e);
                saga.compensate(db).await;
            }
            return Err(e);
        }
        let upgraded_role = saga.upgraded_role();
        log::info!(
            "application {} {} for user {} by {} (role upgraded: {})",
            application.id,
            ApplicationStatus::from(request.decision),
            profile.id,
            request.reviewer_id,
            upgraded_role
        );

        Ok(Decided {
            application,
            profile,
            decision: request.decision,
            upgraded_role,
        })
    }

    /// Send the chat invite and the decision email for a committed decision.
    pub async fn announce(&self, decided: &Decided) -> DecisionOutcome {
        let user_name = decided.profile.full_name.as_deref().unwrap_or(&decided.application.full_name);
        self.dispatcher
            .dispatch(&Notice {
                application: &decided.application,
                decision: decided.decision,
                email: &decided.profile.email,
                user_name,
            })
            .await;
        DecisionOutcome {
            upgraded_role: decided.upgraded_role,
        }
    }

    async fn apply<D>(&self, db: &mut D, application: &Application, request: &DecisionRequest, current_role: Option<Role>, saga: &mut Saga) -> Result<(), Error>
    where
        D: Store,
    {
        let id = application.id;
        let expected = application.review();
        let decided = Review::decided(request.decision, request.reviewer_id, Utc::now());
        self.run(
            Step::UpdateApplication,
            saga,
            Some(AppliedStep::ApplicationUpdated { decided: decided.clone() }),
            claim(db, id, &expected, &decided),
        )
        .await?;

        if !request.decision.is_accepted() {
            return Ok(());
        }
        let user_id = application.user_id;

        if matches!(application.application_type, ApplicationType::Project | ApplicationType::Class) && current_role == Some(Role::Prospect) {
            self.run(
                Step::UpgradeRole,
                saga,
                Some(AppliedStep::RoleUpgraded { previous: Role::Prospect }),
                RoleCommon::update(db, user_id, Role::Member),
            )
            .await?;
        }

        if let (ApplicationType::Project, Some(project_id)) = (application.application_type, application.project_id) {
            let exists = self.run(Step::AddProjectMember, saga, None, ProjectMemberCommon::exists(db, project_id, user_id)).await?;
            if !exists {
                let member = ProjectMemberInsert {
                    project_id,
                    user_id,
                    role: application.project_role.unwrap_or(ProjectRole::Member),
                };
                self.run(
                    Step::AddProjectMember,
                    saga,
                    Some(AppliedStep::ProjectMemberAdded { project_id }),
                    ProjectMemberCommon::insert(db, member),
                )
                .await?;
            }
        }

        if let (ApplicationType::Class, Some(class_id)) = (application.application_type, application.class_id) {
            let exists = self.run(Step::EnrollClass, saga, None, ClassEnrollmentCommon::exists(db, class_id, user_id)).await?;
            if !exists {
                let enrollment = ClassEnrollmentInsert {
                    class_id,
                    user_id,
                    role: application.class_role.unwrap_or(ClassRole::Student),
                };
                self.run(
                    Step::EnrollClass,
                    saga,
                    Some(AppliedStep::ClassEnrolled { class_id }),
                    ClassEnrollmentCommon::insert(db, enrollment),
                )
                .await?;
            }
        }

        Ok(())
    }

    /// Run one forward step under the step timeout. A step that completes is recorded
    /// in the saga. A step that times out is recorded too, since its write may have
    /// landed; every compensation is safe to run against a write that did not.
    async fn run<T, F>(&self, step: Step, saga: &mut Saga, applied: Option<AppliedStep>, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        match tokio::time::timeout(self.step_timeout, fut).await {
            Ok(Ok(v)) => {
                if let Some(applied) = applied {
                    saga.record(applied);
                }
                Ok(v)
            }
            Ok(Err(e @ (Error::InvalidTransition { .. } | Error::ApplicationNotFound(_)))) => Err(e),
            Ok(Err(e)) => Err(Error::StepFailed { step, source: Box::new(e) }),
            Err(_) => {
                if let Some(applied) = applied {
                    saga.record(applied);
                }
                Err(Error::StepTimeout(step))
            }
        }
    }
}

/// Write the decision only if the application still holds the review it was loaded with.
async fn claim<D>(db: &mut D, id: Uuid, expected: &Review, decided: &Review) -> Result<(), Error>
where
    D: Store,
{
    if ApplicationCommon::update_review(db, id, expected, decided).await? {
        return Ok(());
    }
    match ApplicationCommon::get(db, id).await? {
        Some(current) => Err(Error::InvalidTransition {
            id,
            status: current.current_status(),
        }),
        None => Err(Error::ApplicationNotFound(id)),
    }
}
