use actix_web::web::{Data, Json};
use chrono::Utc;

use crate::core::ports::code_host::CodeHost;
use crate::core::ports::repository::Manager;
use crate::core::services::provisioning::{Provisioner, ProvisioningReport};
use crate::error::Error;

pub async fn process_project_automation<G, H>(manager: Data<G>, provisioner: Data<Provisioner<H>>) -> Result<Json<ProvisioningReport>, Error>
where
    G: Manager,
    H: CodeHost,
{
    let mut db = manager.store().await?;
    let report = provisioner.run(&mut db, Utc::now().date_naive()).await?;
    log::info!("project automation processed {} project(s)", report.processed);
    Ok(Json(report))
}
