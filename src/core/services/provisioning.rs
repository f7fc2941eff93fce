use chrono::NaiveDate;
use serde::Serialize;

use crate::core::models::project::{Project, ProvisioningResult, Repository, TeamRole};
use crate::core::ports::code_host::CodeHost;
use crate::core::ports::repository::{ProjectCommon, ProjectMemberCommon, Store};
use crate::error::Error;

#[derive(Debug, Serialize)]
pub struct ProvisioningReport {
    pub message: String,
    pub processed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<ProvisioningResult>,
}

/// Lowercase `{name}-{semester}` with everything outside `[a-z0-9-]` replaced by `-`.
pub fn team_slug(name: &str, semester_code: &str) -> String {
    format!("{}-{}", name, semester_code)
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' { c } else { '-' })
        .collect()
}

/// Lowercase name with whitespace runs collapsed to `-`, suffixed with the semester.
pub fn repository_name(name: &str, semester_code: &str) -> String {
    let name = name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-");
    format!("{}-{}", name, semester_code.to_lowercase())
}

pub struct Provisioner<H> {
    host: H,
}

impl<H> Provisioner<H>
where
    H: CodeHost,
{
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Bring every started, accepted project without a repository up to its
    /// desired state on the code host. Projects are handled one at a time and a
    /// failure on one is recorded in its result without stopping the others.
    pub async fn run<D>(&self, db: &mut D, today: NaiveDate) -> Result<ProvisioningReport, Error>
    where
        D: Store,
    {
        let projects = ProjectCommon::ready_for_provisioning(db, today).await?;
        if projects.is_empty() {
            return Ok(ProvisioningReport {
                message: "No projects ready for automation".into(),
                processed: 0,
                results: Vec::new(),
            });
        }

        let mut results = Vec::with_capacity(projects.len());
        for project in projects {
            let result = match self.provision(db, &project).await {
                Ok(result) => result,
                Err(e) => {
                    log::error!("project {}: provisioning failed: {}", project.name, e);
                    ProvisioningResult::failed(project.name.clone(), e.to_string())
                }
            };
            if result.success {
                log::info!("project {} (started {}): provisioned {:?}", project.name, project.start_date, result.repo);
            }
            results.push(result);
        }
        Ok(ProvisioningReport {
            message: "Processed projects".into(),
            processed: results.len(),
            results,
        })
    }

    async fn provision<D>(&self, db: &mut D, project: &Project) -> Result<ProvisioningResult, Error>
    where
        D: Store,
    {
        let slug = team_slug(&project.name, &project.semester_code);
        let existing_team = self.host.find_team(&slug).await?;

        let members = ProjectMemberCommon::with_github_username(db, project.id).await?;
        if members.is_empty() {
            return Ok(ProvisioningResult::failed(project.name.clone(), "No members with GitHub usernames"));
        }
        let lead = match members.iter().find(|m| m.is_lead) {
            Some(lead) => lead.github_username.clone(),
            None => return Ok(ProvisioningResult::failed(project.name.clone(), "No team lead with GitHub username")),
        };

        let team_existed = existing_team.is_some();
        let team = match existing_team {
            Some(team) => team,
            None => {
                let name = format!("{} ({})", project.name, project.semester_code);
                let description = format!("Project team for {} - {}", project.name, project.semester_code);
                self.host.create_team(&name, &description).await?
            }
        };

        for member in &members {
            let role = if member.is_lead { TeamRole::Maintainer } else { TeamRole::Member };
            match self.host.add_team_member(&team.slug, &member.github_username, role).await {
                Ok(true) => {}
                Ok(false) => log::warn!("project {}: github user {} (user {}) not found", project.name, member.github_username, member.user_id),
                Err(e) => log::error!("project {}: failed to add {} to team {}: {}", project.name, member.github_username, team.name, e),
            }
        }

        let repo = repository_name(&project.name, &project.semester_code);
        let description = format!("{} - {}", project.name, project.semester_code);
        let repository = self.host.create_repository(&repo, &description).await?;

        self.host.grant_team_push(&team.slug, &repo).await?;

        if let Err(e) = self.host.protect_main_branch(&repo, &lead).await {
            log::warn!("project {}: failed to protect main branch, continuing: {}", project.name, e);
        }

        ProjectCommon::set_repository_url(db, project.id, &repo).await?;

        let created = !team_existed && repository == Repository::Created;
        Ok(ProvisioningResult::provisioned(project.name.clone(), team.name, repo, created))
    }
}
