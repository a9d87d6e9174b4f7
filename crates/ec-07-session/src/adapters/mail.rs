//! In-memory mail transport: an outbox of sent messages and an inbox fed by
//! the test or operator.

use crate::ports::{InboundMail, MailFilter, MailTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A message handed to [`MailTransport::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct InMemoryMailTransport {
    outbox: Mutex<Vec<SentMail>>,
    inbox: Mutex<Vec<InboundMail>>,
    fail_sends: AtomicBool,
}

impl InMemoryMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for the next `receive`.
    pub fn deliver(&self, mail: InboundMail) {
        self.inbox.lock().push(mail);
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.outbox.lock().clone()
    }

    /// Messages sent to one recipient, oldest first.
    pub fn sent_to(&self, recipient: &str) -> Vec<SentMail> {
        self.outbox
            .lock()
            .iter()
            .filter(|mail| mail.recipient == recipient)
            .cloned()
            .collect()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MailTransport for InMemoryMailTransport {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), String> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(format!("cannot reach mail server for {}", recipient));
        }
        self.outbox.lock().push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn receive(&self, filter: &MailFilter) -> Result<Vec<InboundMail>, String> {
        Ok(self
            .inbox
            .lock()
            .iter()
            .filter(|mail| filter.matches(mail))
            .cloned()
            .collect())
    }
}
