use uuid::Uuid;

use super::application::{ClassRole, ProjectRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMemberInsert {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: ProjectRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEnrollmentInsert {
    pub class_id: Uuid,
    pub user_id: Uuid,
    pub role: ClassRole,
}
