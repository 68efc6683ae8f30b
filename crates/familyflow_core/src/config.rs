//! Engine configuration.
//!
//! # Responsibility
//! - Hold the vocabulary and topic policy shared by extractor, resolver,
//!   assignment and board.
//! - Load overrides from JSON and validate them once at startup.
//!
//! # Invariants
//! - A validated config has non-blank topics and verbs.
//! - `generic_topic` is always claimable.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_HISTORY_LIMIT: u32 = 5;
pub const MAX_HISTORY_LIMIT: u32 = 50;
pub const DEFAULT_GENERIC_TOPIC: &str = "一般";
pub const DEFAULT_IDEA_TOPIC: &str = "アイデア";

const DEFAULT_ASSIGNABLE_TOPICS: &[&str] = &["一般", "買い物", "家事", "雑多なタスク", "未分類"];
const DEFAULT_TARGET_VERBS: &[&str] = &[
    "買う", "購入", "行く", "予約", "申込む", "調べる", "払う", "頼む", "お願い",
];

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid engine config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid engine config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Process-scoped engine settings, created once and passed to components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of prior messages fed to the semantic classifier.
    pub history_limit: u32,
    /// Topic for extractor-produced tasks and classifier tasks without one.
    pub generic_topic: String,
    /// Topic for ideas the classifier left untopiced.
    pub idea_topic: String,
    /// Topics eligible for the implicit "I'll do it" claim.
    pub assignable_topics: Vec<String>,
    /// Dictionary forms that mark a command in the linguistic fast path.
    pub target_verbs: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            generic_topic: DEFAULT_GENERIC_TOPIC.to_string(),
            idea_topic: DEFAULT_IDEA_TOPIC.to_string(),
            assignable_topics: to_strings(DEFAULT_ASSIGNABLE_TOPICS),
            target_verbs: to_strings(DEFAULT_TARGET_VERBS),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON object; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 || self.history_limit > MAX_HISTORY_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "history_limit must be within 1..={MAX_HISTORY_LIMIT}, got {}",
                self.history_limit
            )));
        }
        if self.generic_topic.trim().is_empty() {
            return Err(ConfigError::Invalid("generic_topic must not be blank".into()));
        }
        if self.idea_topic.trim().is_empty() {
            return Err(ConfigError::Invalid("idea_topic must not be blank".into()));
        }
        ensure_non_blank_list("assignable_topics", &self.assignable_topics)?;
        ensure_non_blank_list("target_verbs", &self.target_verbs)?;
        if !self.is_assignable(&self.generic_topic) {
            return Err(ConfigError::Invalid(format!(
                "generic_topic `{}` must be listed in assignable_topics",
                self.generic_topic
            )));
        }
        Ok(())
    }

    pub fn is_assignable(&self, topic: &str) -> bool {
        self.assignable_topics.iter().any(|value| value == topic)
    }

    /// Everyday topics shown in the routine lane: the claimable set plus the
    /// idea bucket.
    pub fn is_routine(&self, topic: &str) -> bool {
        self.is_assignable(topic) || self.idea_topic == topic
    }
}

fn ensure_non_blank_list(field: &str, values: &[String]) -> Result<(), ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must not be empty")));
    }
    if values.iter().any(|value| value.trim().is_empty()) {
        return Err(ConfigError::Invalid(format!(
            "{field} must not contain blank entries"
        )));
    }
    Ok(())
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
