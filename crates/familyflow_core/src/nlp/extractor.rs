//! Deterministic command extractor ("object + command verb").
//!
//! # Responsibility
//! - Recognize short household commands without any conversation context.
//!
//! # Invariants
//! - Output depends only on the text (and the parser, which is deterministic).
//! - A sentence ending in a question mark never yields a task.
//! - Results carry no topic, due date or assignee.

use crate::config::EngineConfig;
use crate::model::classification::ClassificationResult;
use crate::nlp::token::{children, LinguisticParser, Token};
use log::debug;

const QUESTION_MARKS: &[&str] = &["?", "？"];

/// Particle joining object and verb in the canonical summary (`卵を買う`).
const OBJECT_PARTICLE: &str = "を";

/// A recognized command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Surface form of the object.
    pub object: String,
    /// Dictionary form of the command verb.
    pub verb: String,
}

impl Extraction {
    /// Canonical imperative summary, object first.
    pub fn summary(&self) -> String {
        format!("{}{}{}", self.object, OBJECT_PARTICLE, self.verb)
    }

    pub fn into_classification(self) -> ClassificationResult {
        ClassificationResult::task(self.summary())
    }
}

/// Context-free fast path over a linguistic parser.
pub struct LinguisticExtractor<P: LinguisticParser> {
    parser: P,
    target_verbs: Vec<String>,
}

impl<P: LinguisticParser> LinguisticExtractor<P> {
    pub fn new(parser: P, target_verbs: Vec<String>) -> Self {
        Self {
            parser,
            target_verbs,
        }
    }

    pub fn from_config(parser: P, config: &EngineConfig) -> Self {
        Self::new(parser, config.target_verbs.clone())
    }

    /// Returns the command in `text`, or `None` to fall through to the
    /// contextual classifier. `None` is not an error.
    pub fn extract(&self, text: &str) -> Option<Extraction> {
        let tokens = self.parser.tokenize(text);
        self.extract_from_tokens(&tokens)
    }

    pub fn extract_from_tokens(&self, tokens: &[Token]) -> Option<Extraction> {
        for (index, token) in tokens.iter().enumerate() {
            if !self.is_target_verb(&token.lemma) {
                continue;
            }

            let Some(object) = find_object(tokens, index) else {
                continue;
            };

            if is_interrogative(tokens) {
                debug!(
                    "event=extract module=nlp status=skip reason=interrogative verb={}",
                    token.lemma
                );
                return None;
            }

            return Some(Extraction {
                object: object.to_string(),
                verb: token.lemma.clone(),
            });
        }
        None
    }

    fn is_target_verb(&self, lemma: &str) -> bool {
        self.target_verbs.iter().any(|verb| verb == lemma)
    }
}

/// Grammatical object first, then the noun right before the verb (particle
/// dropped in casual speech, e.g. `卵買って`).
fn find_object(tokens: &[Token], verb_index: usize) -> Option<&str> {
    let grammatical = children(tokens, verb_index)
        .find(|child| child.dep.can_carry_object() && child.pos.is_nominal())
        .map(|child| child.surface.as_str());
    if grammatical.is_some() {
        return grammatical;
    }

    verb_index
        .checked_sub(1)
        .and_then(|previous| tokens.get(previous))
        .filter(|previous| previous.pos.is_nominal())
        .map(|previous| previous.surface.as_str())
}

fn is_interrogative(tokens: &[Token]) -> bool {
    tokens
        .last()
        .is_some_and(|last| QUESTION_MARKS.contains(&last.surface.as_str()))
}
