extern crate actix_web;
extern crate chrono;
extern crate dotenv;
extern crate env_logger;
extern crate serde;
extern crate serde_json;
extern crate sqlx;
extern crate thiserror;
extern crate tokio;

mod config;
mod core;
mod database;
mod error;
mod handlers;
mod impls;
pub mod response;

use std::io;
use std::str::FromStr;

use actix_web::web::Data;
use actix_web::HttpServer;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::config::Config;
use crate::core::services::decision::DecisionProcessor;
use crate::core::services::notification::NotificationDispatcher;
use crate::core::services::provisioning::Provisioner;
use crate::database::postgres::PgManager;
use crate::impls::github::GitHub;
use crate::impls::resend::Resend;
use crate::impls::slack::Slack;

#[actix_web::main]
async fn main() -> Result<(), io::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let mut options = PgConnectOptions::from_str(&config.database.url).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    if let Some(password) = &config.database.password {
        options = options.password(password);
    }
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
    log::info!("connected to database");

    let client = reqwest::Client::builder()
        .timeout(config.notification_timeout)
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let dispatcher = NotificationDispatcher::new(
        Slack::new(client.clone(), config.slack.bot_token.clone(), config.slack.team_id.clone()),
        Resend::new(client.clone(), config.email.api_key.clone(), config.email.from.clone()),
        config.email.letterhead.clone(),
    )
    .with_timeout(config.notification_timeout);
    let processor = Data::new(DecisionProcessor::new(dispatcher, config.step_timeout));
    let provisioner = Data::new(Provisioner::new(GitHub::new(client, config.github.token.clone(), config.github.org.clone())));
    let manager = Data::new(PgManager::new(pool));

    log::info!("listening on {}:{}", config.bind_address, config.port);
    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(handlers::cors())
            .app_data(handlers::json_config())
            .app_data(manager.clone())
            .app_data(processor.clone())
            .app_data(provisioner.clone())
            .configure(handlers::routes::<PgManager, Slack, Resend, GitHub>)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}
