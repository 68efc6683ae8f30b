//! Fail-safe boundary around a classification service.

use super::{ClassificationRequest, ClassificationService};
use crate::model::classification::ClassificationResult;
use log::{info, warn};
use std::time::Instant;

/// Contextual fallback classifier.
///
/// Every service failure or malformed reply becomes category `null`, so the
/// caller's state-mutating path never sees an error from here.
pub struct SemanticClassifier<S: ClassificationService> {
    service: S,
}

impl<S: ClassificationService> SemanticClassifier<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn classify(&self, request: &ClassificationRequest<'_>) -> ClassificationResult {
        let started_at = Instant::now();
        match self.service.classify(request) {
            Ok(mut result) => {
                if let Some(topic) = result.topic.take() {
                    result.topic = Some(snap_to_active_topic(topic, request.active_topics));
                }
                info!(
                    "event=classify module=classify status=ok category={} topic={} duration_ms={}",
                    result.category.as_str(),
                    result.topic.as_deref().unwrap_or("-"),
                    started_at.elapsed().as_millis()
                );
                result
            }
            Err(err) => {
                warn!(
                    "event=classify module=classify status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                ClassificationResult::null()
            }
        }
    }
}

/// Restores the stored spelling of an active topic when the service returned
/// it with stray surrounding whitespace. Other strings are kept as-is.
fn snap_to_active_topic(topic: String, active_topics: &[String]) -> String {
    let trimmed = topic.trim();
    active_topics
        .iter()
        .find(|active| active.trim() == trimmed)
        .cloned()
        .unwrap_or(topic)
}
