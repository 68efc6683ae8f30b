//! Per-message classification and action pipeline.
//!
//! # Responsibility
//! - Run one inbound chat message through extractor, classifier fallback and
//!   topic resolution, then create a record or claim the latest task.
//! - Send the confirmation reply and log it.
//!
//! # Invariants
//! - Each message is an independent unit of work; the dispatcher keeps no
//!   mutable state between messages.
//! - The classifier is consulted only when the extractor misses, and no store
//!   write is in flight while it runs.
//! - Failures on this passive path never surface to the chat: a failed
//!   classification or insert means no record and no reply.

use crate::classify::semantic::SemanticClassifier;
use crate::classify::{ClassificationRequest, ClassificationService};
use crate::config::EngineConfig;
use crate::context::ContextAssembler;
use crate::model::classification::{Category, ClassificationSource};
use crate::model::message::{Message, MessageRole};
use crate::model::task::{now_epoch_ms, Task, TaskId, TaskKind};
use crate::nlp::extractor::LinguisticExtractor;
use crate::nlp::token::LinguisticParser;
use crate::notify::{send_best_effort, Notifier};
use crate::repo::message_repo::MessageRepository;
use crate::repo::task_repo::TaskRepository;
use crate::service::assignment::{AssignmentStateMachine, ClaimOutcome};
use crate::service::reply;
use crate::topic::{ResolvedClassification, TopicResolver};
use chrono::{DateTime, Local, NaiveDate};
use log::{info, warn};

/// Speaker recorded for the bot's own replies in the message log.
pub const BOT_SPEAKER: &str = "familyflow";

/// One chat message as delivered by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub group_id: String,
    /// Identity of the sender; becomes the assignee on a claim.
    pub speaker: String,
    pub text: String,
    /// Unix epoch milliseconds.
    pub received_at: i64,
}

impl InboundMessage {
    pub fn new(
        group_id: impl Into<String>,
        speaker: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            speaker: speaker.into(),
            text: text.into(),
            received_at: now_epoch_ms(),
        }
    }

    /// Local calendar date the message was received on.
    pub fn local_date(&self) -> NaiveDate {
        DateTime::from_timestamp_millis(self.received_at)
            .map(|utc| utc.with_timezone(&Local).date_naive())
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// What the dispatcher did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A task or idea was stored.
    Created {
        task: Task,
        source: ClassificationSource,
        replied: bool,
    },
    Claimed {
        task_id: TaskId,
        content: String,
        assignee: String,
        replied: bool,
    },
    /// Claim refused for a project topic; intentionally silent.
    PolicyLocked { task_id: TaskId, topic: String },
    /// Claim gesture with nothing pending; silent.
    NothingToClaim,
    /// Category `null` (including degraded classifier failures).
    Ignored,
    /// A store write failed; the effect was dropped silently.
    Dropped,
}

/// Process-scoped collaborators, created once at startup.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub tasks: &'a dyn TaskRepository,
    pub messages: &'a dyn MessageRepository,
    pub classifier: &'a dyn ClassificationService,
    pub parser: &'a dyn LinguisticParser,
    pub notifier: &'a dyn Notifier,
}

pub struct MessageDispatcher<'a> {
    tasks: &'a dyn TaskRepository,
    messages: &'a dyn MessageRepository,
    notifier: &'a dyn Notifier,
    extractor: LinguisticExtractor<&'a dyn LinguisticParser>,
    classifier: SemanticClassifier<&'a dyn ClassificationService>,
    context: ContextAssembler<&'a dyn TaskRepository, &'a dyn MessageRepository>,
    resolver: TopicResolver,
    assignment: AssignmentStateMachine<&'a dyn TaskRepository, &'a dyn Notifier>,
}

impl<'a> MessageDispatcher<'a> {
    pub fn new(collaborators: Collaborators<'a>, config: &EngineConfig) -> Self {
        let Collaborators {
            tasks,
            messages,
            classifier,
            parser,
            notifier,
        } = collaborators;

        Self {
            tasks,
            messages,
            notifier,
            extractor: LinguisticExtractor::from_config(parser, config),
            classifier: SemanticClassifier::new(classifier),
            context: ContextAssembler::new(tasks, messages, config.history_limit),
            resolver: TopicResolver::from_config(config),
            assignment: AssignmentStateMachine::from_config(tasks, notifier, config),
        }
    }

    /// Handles one inbound message end to end.
    pub fn handle(&self, inbound: &InboundMessage) -> DispatchOutcome {
        info!(
            "event=dispatch module=dispatch status=start group_id={} text_chars={}",
            inbound.group_id,
            inbound.text.chars().count()
        );

        // History is read before logging so it excludes the message itself.
        let history = self.context.recent_history(&inbound.group_id);
        self.log_message(
            Message::new(
                inbound.group_id.as_str(),
                inbound.speaker.as_str(),
                inbound.text.as_str(),
                MessageRole::Human,
            )
            .with_timestamp(inbound.received_at),
        );

        let resolved = self.classify(inbound, &history);
        let outcome = match resolved.category {
            Category::Task | Category::Idea => self.create(inbound, resolved),
            Category::Accept => self.claim(inbound),
            Category::Null => DispatchOutcome::Ignored,
        };

        info!(
            "event=dispatch module=dispatch status=ok group_id={} outcome={}",
            inbound.group_id,
            outcome_label(&outcome)
        );
        outcome
    }

    fn classify(&self, inbound: &InboundMessage, history: &[Message]) -> ResolvedClassification {
        if let Some(extraction) = self.extractor.extract(&inbound.text) {
            info!(
                "event=classify module=dispatch status=ok source=extractor verb={}",
                extraction.verb
            );
            return self.resolver.resolve(
                ClassificationSource::Extractor,
                extraction.into_classification(),
            );
        }

        let active_topics = self.context.active_topics(&inbound.group_id);
        let request = ClassificationRequest {
            text: &inbound.text,
            history,
            active_topics: &active_topics,
            today: inbound.local_date(),
        };
        let result = self.classifier.classify(&request);
        self.resolver
            .resolve(ClassificationSource::Classifier, result)
    }

    fn create(&self, inbound: &InboundMessage, resolved: ResolvedClassification) -> DispatchOutcome {
        let (Some(kind), Some(topic), Some(summary)) = (
            resolved.category.task_kind(),
            resolved.topic,
            resolved.summary,
        ) else {
            warn!(
                "event=task_create module=dispatch status=skip reason=incomplete_classification group_id={}",
                inbound.group_id
            );
            return DispatchOutcome::Ignored;
        };

        let mut task = Task::new(inbound.group_id.as_str(), kind, topic, summary);
        task.due_date = resolved.due_date;

        if let Err(err) = self.tasks.insert_task(&task) {
            warn!(
                "event=task_create module=dispatch status=error group_id={} error={}",
                inbound.group_id, err
            );
            return DispatchOutcome::Dropped;
        }
        info!(
            "event=task_create module=dispatch status=ok group_id={} task_id={} kind={} topic={} source={}",
            task.group_id,
            task.id,
            task.kind.as_str(),
            task.topic,
            resolved.source.as_str()
        );

        let text = match task.kind {
            TaskKind::Task => reply::task_registered(&task.content, &task.topic),
            TaskKind::Idea => reply::idea_noted(&task.content, &task.topic),
        };
        let replied = self.reply(inbound, &text);
        DispatchOutcome::Created {
            task,
            source: resolved.source,
            replied,
        }
    }

    fn claim(&self, inbound: &InboundMessage) -> DispatchOutcome {
        match self
            .assignment
            .claim_latest(&inbound.group_id, &inbound.speaker)
        {
            Ok(ClaimOutcome::Claimed {
                task_id,
                content,
                assignee,
            }) => {
                let replied = self.reply(inbound, &reply::claim_confirmed(&assignee, &content));
                DispatchOutcome::Claimed {
                    task_id,
                    content,
                    assignee,
                    replied,
                }
            }
            Ok(ClaimOutcome::PolicyLocked { task_id, topic }) => {
                DispatchOutcome::PolicyLocked { task_id, topic }
            }
            Ok(ClaimOutcome::NothingToClaim) => DispatchOutcome::NothingToClaim,
            Err(err) => {
                warn!(
                    "event=task_claim module=dispatch status=error group_id={} error={}",
                    inbound.group_id, err
                );
                DispatchOutcome::Dropped
            }
        }
    }

    fn reply(&self, inbound: &InboundMessage, text: &str) -> bool {
        let delivered = send_best_effort(self.notifier, &inbound.group_id, text);
        if delivered {
            // Never stamped earlier than the message it answers.
            let sent_at = now_epoch_ms().max(inbound.received_at);
            self.log_message(
                Message::new(
                    inbound.group_id.as_str(),
                    BOT_SPEAKER,
                    text,
                    MessageRole::System,
                )
                .with_timestamp(sent_at),
            );
        }
        delivered
    }

    fn log_message(&self, message: Message) {
        if let Err(err) = self.messages.append_message(&message) {
            warn!(
                "event=message_append module=dispatch status=error group_id={} role={} error={}",
                message.group_id,
                message.role.as_str(),
                err
            );
        }
    }
}

fn outcome_label(outcome: &DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Created { .. } => "created",
        DispatchOutcome::Claimed { .. } => "claimed",
        DispatchOutcome::PolicyLocked { .. } => "policy_locked",
        DispatchOutcome::NothingToClaim => "nothing_to_claim",
        DispatchOutcome::Ignored => "ignored",
        DispatchOutcome::Dropped => "dropped",
    }
}
