use chrono::NaiveDate;
use sqlx::pool::PoolConnection;
use sqlx::{query, query_as, query_scalar, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::core::models::{
    application::{Application, Review},
    membership::{ClassEnrollmentInsert, ProjectMemberInsert},
    project::{Project, ProvisioningMember},
    user::{Profile, Role},
};
use crate::core::ports::repository::{ApplicationCommon, ClassEnrollmentCommon, Manager, ProfileCommon, ProjectCommon, ProjectMemberCommon, RoleCommon};
use crate::error::Error;

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E> ApplicationCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn get(&mut self, id: Uuid) -> Result<Option<Application>, Error> {
        let application = query_as(
            "
        SELECT
            id,
            user_id,
            full_name,
            application_type,
            status,
            project_id,
            class_id,
            board_position,
            project_role,
            class_role,
            reviewed_by,
            reviewed_at
        FROM applications
        WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut self.executor)
        .await?;
        Ok(application)
    }

    async fn update_review(&mut self, id: Uuid, expected: &Review, review: &Review) -> Result<bool, Error> {
        let result = query(
            "
        UPDATE applications
        SET status = $1, reviewed_by = $2, reviewed_at = $3
        WHERE id = $4
            AND status IS NOT DISTINCT FROM $5
            AND reviewed_by IS NOT DISTINCT FROM $6
            AND reviewed_at IS NOT DISTINCT FROM $7",
        )
        .bind(review.status)
        .bind(review.reviewed_by)
        .bind(review.reviewed_at)
        .bind(id)
        .bind(expected.status)
        .bind(expected.reviewed_by)
        .bind(expected.reviewed_at)
        .execute(&mut self.executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

impl<E> ProfileCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn get(&mut self, id: Uuid) -> Result<Option<Profile>, Error> {
        let profile = query_as("SELECT id, email, full_name FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(profile)
    }
}

impl<E> RoleCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn get(&mut self, user_id: Uuid) -> Result<Option<Role>, Error> {
        let role = query_scalar("SELECT role FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(role)
    }

    async fn update(&mut self, user_id: Uuid, role: Role) -> Result<(), Error> {
        query("UPDATE user_roles SET role = $1 WHERE user_id = $2")
            .bind(role)
            .bind(user_id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }
}

impl<E> ProjectMemberCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn exists(&mut self, project_id: Uuid, user_id: Uuid) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT 1 FROM project_members WHERE project_id = $1 AND user_id = $2)")
            .bind(project_id)
            .bind(user_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn insert(&mut self, member: ProjectMemberInsert) -> Result<(), Error> {
        query("INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(member.project_id)
            .bind(member.user_id)
            .bind(member.role)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn delete(&mut self, project_id: Uuid, user_id: Uuid) -> Result<(), Error> {
        query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn with_github_username(&mut self, project_id: Uuid) -> Result<Vec<ProvisioningMember>, Error> {
        let members = query_as(
            "
        SELECT
            pm.user_id AS user_id,
            pm.role = 'lead' AS is_lead,
            p.github_username AS github_username
        FROM project_members AS pm
        JOIN profiles AS p ON p.id = pm.user_id
        WHERE pm.project_id = $1
            AND p.github_username IS NOT NULL",
        )
        .bind(project_id)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(members)
    }
}

impl<E> ClassEnrollmentCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn exists(&mut self, class_id: Uuid, user_id: Uuid) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT 1 FROM class_enrollments WHERE class_id = $1 AND user_id = $2)")
            .bind(class_id)
            .bind(user_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn insert(&mut self, enrollment: ClassEnrollmentInsert) -> Result<(), Error> {
        query("INSERT INTO class_enrollments (class_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(enrollment.class_id)
            .bind(enrollment.user_id)
            .bind(enrollment.role)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }

    async fn delete(&mut self, class_id: Uuid, user_id: Uuid) -> Result<(), Error> {
        query("DELETE FROM class_enrollments WHERE class_id = $1 AND user_id = $2")
            .bind(class_id)
            .bind(user_id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }
}

impl<E> ProjectCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn ready_for_provisioning(&mut self, today: NaiveDate) -> Result<Vec<Project>, Error> {
        let projects = query_as(
            "
        SELECT id, name, semester_code, start_date
        FROM projects
        WHERE status = 'accepted'
            AND start_date <= $1
            AND repository_url IS NULL
        ORDER BY start_date, name",
        )
        .bind(today)
        .fetch_all(&mut self.executor)
        .await?;
        Ok(projects)
    }

    async fn set_repository_url(&mut self, id: Uuid, url: &str) -> Result<(), Error> {
        query("UPDATE projects SET repository_url = $1 WHERE id = $2")
            .bind(url)
            .bind(id)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }
}

/// Checks a connection out of the pool for each request.
#[derive(Clone)]
pub struct PgManager {
    pool: PgPool,
}

impl PgManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Manager for PgManager {
    type Store = PgSqlx<PoolConnection<Postgres>>;

    async fn store(&self) -> Result<Self::Store, Error> {
        Ok(PgSqlx::new(self.pool.acquire().await?))
    }
}
