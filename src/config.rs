use std::str::FromStr;
use std::time::Duration;

use crate::core::email::Letterhead;
use crate::error::Error;

pub static DATABASE_URL: &str = "DATABASE_URL";
pub static DATABASE_PASSWORD: &str = "DATABASE_PASSWORD";
pub static DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub static SLACK_BOT_TOKEN: &str = "SLACK_BOT_TOKEN";
pub static SLACK_TEAM_ID: &str = "SLACK_TEAM_ID";
pub static RESEND_API_KEY: &str = "RESEND_API_KEY";
pub static EMAIL_FROM: &str = "EMAIL_FROM";
pub static CLUB_NAME: &str = "CLUB_NAME";
pub static PORTAL_URL: &str = "PORTAL_URL";
pub static GITHUB_ORG_PAT: &str = "GITHUB_ORG_PAT";
pub static GITHUB_ORG: &str = "GITHUB_ORG";
pub static DECISION_STEP_TIMEOUT_SECS: &str = "DECISION_STEP_TIMEOUT_SECS";
pub static NOTIFICATION_TIMEOUT_SECS: &str = "NOTIFICATION_TIMEOUT_SECS";
pub static BIND_ADDRESS: &str = "BIND_ADDRESS";
pub static PORT: &str = "PORT";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub password: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub team_id: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub from: String,
    pub letterhead: Letterhead,
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub org: String,
}

/// Everything the service reads from its environment, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub slack: SlackConfig,
    pub email: EmailConfig,
    pub github: GitHubConfig,
    pub step_timeout: Duration,
    pub notification_timeout: Duration,
    pub bind_address: String,
    pub port: u16,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| Error::ConfigError(format!("environment variable {} not been set", key)));
        let optional = |key: &str, default: &str| lookup(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_owned());

        Ok(Self {
            database: DatabaseConfig {
                url: required(DATABASE_URL)?,
                password: lookup(DATABASE_PASSWORD).filter(|v| !v.is_empty()),
                max_connections: parse(DATABASE_MAX_CONNECTIONS, &optional(DATABASE_MAX_CONNECTIONS, "5"))?,
            },
            slack: SlackConfig {
                bot_token: required(SLACK_BOT_TOKEN)?,
                team_id: required(SLACK_TEAM_ID)?,
            },
            email: EmailConfig {
                api_key: required(RESEND_API_KEY)?,
                from: optional(EMAIL_FROM, "Claude Builder Club <noreply@claudemsu.org>"),
                letterhead: Letterhead {
                    club_name: optional(CLUB_NAME, "Claude Builder Club"),
                    portal_url: optional(PORTAL_URL, "https://members.claudemsu.dev"),
                },
            },
            github: GitHubConfig {
                token: required(GITHUB_ORG_PAT)?,
                org: optional(GITHUB_ORG, "Claude-Builder-Club-MSU"),
            },
            step_timeout: Duration::from_secs(parse(DECISION_STEP_TIMEOUT_SECS, &optional(DECISION_STEP_TIMEOUT_SECS, "10"))?),
            notification_timeout: Duration::from_secs(parse(NOTIFICATION_TIMEOUT_SECS, &optional(NOTIFICATION_TIMEOUT_SECS, "10"))?),
            bind_address: optional(BIND_ADDRESS, "0.0.0.0"),
            port: parse(PORT, &optional(PORT, "8000"))?,
        })
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value.parse().map_err(|_| Error::ConfigError(format!("invalid value for {}: {}", key, value)))
}
