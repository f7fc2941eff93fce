pub mod application;
pub mod project;

use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::web::{self, JsonConfig, ServiceConfig};
use actix_web::HttpResponse;

use crate::core::ports::code_host::CodeHost;
use crate::core::ports::notifier::{ChatInviter, Mailer};
use crate::core::ports::repository::Manager;
use crate::error::Error;

pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

/// Malformed bodies get the same `{ "error": ... }` shape as every other failure.
pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| Error::BadRequest(err.to_string()).into())
}

pub fn cors() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Headers", "authorization, x-client-info, apikey, content-type"))
}

pub fn routes<G, C, M, H>(cfg: &mut ServiceConfig)
where
    G: Manager + 'static,
    C: ChatInviter + 'static,
    M: Mailer + 'static,
    H: CodeHost + 'static,
{
    cfg.service(
        web::resource("process-application-update")
            .route(web::post().to(application::process_application_update::<G, C, M>))
            .route(web::method(Method::OPTIONS).to(preflight)),
    )
    .service(
        web::resource("process-project-automation")
            .route(web::post().to(project::process_project_automation::<G, H>))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}
