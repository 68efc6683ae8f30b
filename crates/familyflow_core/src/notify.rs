//! Outbound chat notifications.
//!
//! Delivery is fire-and-forget: every caller goes through [`send_best_effort`],
//! which logs and swallows failures.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError {
    pub message: String,
}

impl NotifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification failed: {}", self.message)
    }
}

impl Error for NotifyError {}

/// Sends text into a conversation.
pub trait Notifier {
    fn send(&self, conversation_id: &str, text: &str) -> Result<(), NotifyError>;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn send(&self, conversation_id: &str, text: &str) -> Result<(), NotifyError> {
        (**self).send(conversation_id, text)
    }
}

/// Notifier for deployments without an outbound channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn send(&self, _conversation_id: &str, _text: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Sends and reports whether delivery succeeded. Never fails.
pub fn send_best_effort(notifier: &dyn Notifier, conversation_id: &str, text: &str) -> bool {
    match notifier.send(conversation_id, text) {
        Ok(()) => {
            info!(
                "event=notify module=notify status=ok conversation_id={} text_chars={}",
                conversation_id,
                text.chars().count()
            );
            true
        }
        Err(err) => {
            warn!(
                "event=notify module=notify status=error conversation_id={} error={}",
                conversation_id, err
            );
            false
        }
    }
}
