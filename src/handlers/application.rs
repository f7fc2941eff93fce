use actix_web::web::{Data, Json};

use crate::core::ports::notifier::{ChatInviter, Mailer};
use crate::core::ports::repository::Manager;
use crate::core::services::decision::{DecisionProcessor, DecisionRequest};
use crate::error::Error;
use crate::response::DecisionResponse;

pub async fn process_application_update<G, C, M>(
    manager: Data<G>,
    processor: Data<DecisionProcessor<C, M>>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, Error>
where
    G: Manager,
    C: ChatInviter,
    M: Mailer,
{
    let decided = {
        let mut db = manager.store().await?;
        processor.decide(&mut db, body).await?
    };
    let outcome = processor.announce(&decided).await;
    Ok(Json(DecisionResponse::processed(outcome.upgraded_role)))
}
