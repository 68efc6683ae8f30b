//! Contextual classification of messages the extractor could not match.
//!
//! # Responsibility
//! - Define the classification-service contract consumed by the engine.
//! - Provide a prompt-driven service over any text-completion backend.
//! - Wrap services so every failure degrades to category `null`.
//!
//! # Invariants
//! - Classification never decides an assignee.
//! - Nothing malformed leaves this module; callers only see validated
//!   `ClassificationResult`s.

pub mod prompt;
pub mod response;
pub mod semantic;

use crate::model::classification::ClassificationResult;
use crate::model::message::Message;
use chrono::NaiveDate;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Everything a classifier may look at for one message.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRequest<'a> {
    pub text: &'a str,
    /// Oldest first.
    pub history: &'a [Message],
    pub active_topics: &'a [String],
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// The underlying service call failed.
    Service(String),
    /// The service answered, but not with a usable classification.
    Malformed(String),
}

impl Display for ClassificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(message) => write!(f, "classification service failed: {message}"),
            Self::Malformed(message) => {
                write!(f, "malformed classification response: {message}")
            }
        }
    }
}

impl Error for ClassificationError {}

/// Classification service contract.
pub trait ClassificationService {
    fn classify(
        &self,
        request: &ClassificationRequest<'_>,
    ) -> Result<ClassificationResult, ClassificationError>;
}

impl<T: ClassificationService + ?Sized> ClassificationService for &T {
    fn classify(
        &self,
        request: &ClassificationRequest<'_>,
    ) -> Result<ClassificationResult, ClassificationError> {
        (**self).classify(request)
    }
}

/// Raw text completion (e.g. a hosted language model in JSON mode).
///
/// Calls are blocking and may be slow; callers hold no locks across them.
pub trait CompletionBackend {
    fn complete(&self, prompt: &str) -> Result<String, String>;
}

impl<T: CompletionBackend + ?Sized> CompletionBackend for &T {
    fn complete(&self, prompt: &str) -> Result<String, String> {
        (**self).complete(prompt)
    }
}

/// Classification service that renders a prompt and validates the reply.
pub struct PromptedClassificationService<B: CompletionBackend> {
    backend: B,
}

impl<B: CompletionBackend> PromptedClassificationService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B: CompletionBackend> ClassificationService for PromptedClassificationService<B> {
    fn classify(
        &self,
        request: &ClassificationRequest<'_>,
    ) -> Result<ClassificationResult, ClassificationError> {
        let prompt = prompt::build_prompt(request);
        let raw = self
            .backend
            .complete(&prompt)
            .map_err(ClassificationError::Service)?;
        debug!(
            "event=classify_raw module=classify status=ok response_chars={}",
            raw.chars().count()
        );
        response::parse_classification(&raw)
    }
}
