//! Topic normalization between classification and persistence.
//!
//! # Invariants
//! - Extractor results always get the generic topic; free-form topics are
//!   only trusted from the classifier, which has seen the active-topic list.
//! - Classifier topics are taken verbatim; deduplication is the classifier's
//!   responsibility and is not re-checked here.
//! - Every `task`/`idea` leaves with a topic.

use crate::config::EngineConfig;
use crate::model::classification::{Category, ClassificationResult, ClassificationSource};
use chrono::NaiveDate;

/// Classification with its persisted topic decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClassification {
    pub source: ClassificationSource,
    pub category: Category,
    /// `Some` for `task`/`idea`, `None` otherwise.
    pub topic: Option<String>,
    pub summary: Option<String>,
    pub due_date: Option<NaiveDate>,
}

pub struct TopicResolver {
    generic_topic: String,
    idea_topic: String,
}

impl TopicResolver {
    pub fn new(generic_topic: impl Into<String>, idea_topic: impl Into<String>) -> Self {
        Self {
            generic_topic: generic_topic.into(),
            idea_topic: idea_topic.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.generic_topic.clone(), config.idea_topic.clone())
    }

    pub fn resolve(
        &self,
        source: ClassificationSource,
        result: ClassificationResult,
    ) -> ResolvedClassification {
        let topic = match (source, result.category) {
            (_, Category::Accept | Category::Null) => None,
            (ClassificationSource::Extractor, _) => Some(self.generic_topic.clone()),
            (ClassificationSource::Classifier, Category::Task) => {
                Some(result.topic.unwrap_or_else(|| self.generic_topic.clone()))
            }
            (ClassificationSource::Classifier, Category::Idea) => {
                Some(result.topic.unwrap_or_else(|| self.idea_topic.clone()))
            }
        };

        ResolvedClassification {
            source,
            category: result.category,
            topic,
            summary: result.summary,
            due_date: result.due_date,
        }
    }
}
