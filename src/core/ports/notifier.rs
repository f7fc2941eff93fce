use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInvite {
    pub email: String,
    pub real_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

pub trait ChatInviter {
    async fn invite(&self, invite: &ChatInvite) -> Result<(), Error>;
}

pub trait Mailer {
    async fn send(&self, email: &Email) -> Result<(), Error>;
}
