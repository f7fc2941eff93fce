use crate::core::models::project::{Repository, Team, TeamRole};
use crate::error::Error;

pub trait CodeHost {
    async fn find_team(&self, slug: &str) -> Result<Option<Team>, Error>;
    async fn create_team(&self, name: &str, description: &str) -> Result<Team, Error>;
    /// Returns `false` when the user is unknown to the host.
    async fn add_team_member(&self, team_slug: &str, username: &str, role: TeamRole) -> Result<bool, Error>;
    async fn create_repository(&self, name: &str, description: &str) -> Result<Repository, Error>;
    async fn grant_team_push(&self, team_slug: &str, repo: &str) -> Result<(), Error>;
    async fn protect_main_branch(&self, repo: &str, lead_username: &str) -> Result<(), Error>;
}
