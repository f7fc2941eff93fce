use std::time::Duration;

use tokio::time::timeout;

use crate::core::email::{self, Letterhead};
use crate::core::models::application::{Application, Decision};
use crate::core::ports::notifier::{ChatInvite, ChatInviter, Email, Mailer};

/// Who to tell about a committed decision, and what was decided.
#[derive(Debug)]
pub struct Notice<'a> {
    pub application: &'a Application,
    pub decision: Decision,
    pub email: &'a str,
    pub user_name: &'a str,
}

/// Which side effects went through. Only used for logging and tests, it never
/// changes the result of a decision.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub invited: bool,
    pub emailed: bool,
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct NotificationDispatcher<C, M> {
    chat: C,
    mailer: M,
    letterhead: Letterhead,
    timeout: Duration,
}

impl<C, M> NotificationDispatcher<C, M>
where
    C: ChatInviter,
    M: Mailer,
{
    pub fn new(chat: C, mailer: M, letterhead: Letterhead) -> Self {
        Self {
            chat,
            mailer,
            letterhead,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Upper bound on each of the invite and the email.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn dispatch(&self, notice: &Notice<'_>) -> Delivery {
        let (invited, emailed) = tokio::join!(self.invite(notice), self.email(notice));
        Delivery { invited, emailed }
    }

    async fn invite(&self, notice: &Notice<'_>) -> bool {
        if !notice.decision.is_accepted() {
            return false;
        }
        let invite = ChatInvite {
            email: notice.email.to_owned(),
            real_name: notice.user_name.to_owned(),
        };
        match timeout(self.timeout, self.chat.invite(&invite)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                log::warn!("application {}: slack invitation failed: {}", notice.application.id, e);
                false
            }
            Err(_) => {
                log::warn!("application {}: slack invitation timed out", notice.application.id);
                false
            }
        }
    }

    async fn email(&self, notice: &Notice<'_>) -> bool {
        let application = notice.application;
        let position = application.board_position.as_deref();
        let email = Email {
            to: notice.email.to_owned(),
            subject: email::subject(&self.letterhead, application.application_type, position, notice.decision),
            html: email::html(&self.letterhead, application.application_type, position, notice.user_name, notice.decision),
        };
        match timeout(self.timeout, self.mailer.send(&email)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                log::warn!("application {}: decision email failed: {}", application.id, e);
                false
            }
            Err(_) => {
                log::warn!("application {}: decision email timed out", application.id);
                false
            }
        }
    }
}
