#![allow(dead_code)]

use familyflow_core::repo::task_repo::{AssigneeGuard, ClaimWrite, TaskListQuery};
use familyflow_core::{
    ClassificationError, ClassificationRequest, ClassificationResult, ClassificationService,
    CompletionBackend, DependencyRole, Notifier, NotifyError, PartOfSpeech, RepoError, RepoResult,
    Task, TaskId, TaskRepository, TaskStatus, Token,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub fn token(surface: &str, lemma: &str, upos: &str, dep: &str, head: usize) -> Token {
    Token::new(
        surface,
        lemma,
        PartOfSpeech::from_upos(upos),
        DependencyRole::from_label(dep),
        head,
    )
}

/// Parser that answers from canned parses; unknown text yields no tokens.
#[derive(Default)]
pub struct FixtureParser {
    parses: HashMap<String, Vec<Token>>,
    calls: Cell<usize>,
}

impl FixtureParser {
    /// Parses for the sentences the tests send.
    pub fn family_chat() -> Self {
        let mut parser = Self::default();
        parser.insert(
            "卵を買って",
            vec![
                token("卵", "卵", "NOUN", "obj", 2),
                token("を", "を", "ADP", "case", 0),
                token("買っ", "買う", "VERB", "ROOT", 2),
                token("て", "て", "SCONJ", "mark", 2),
            ],
        );
        parser.insert(
            "京都の宿を予約して",
            vec![
                token("京都", "京都", "PROPN", "nmod", 2),
                token("の", "の", "ADP", "case", 0),
                token("宿", "宿", "NOUN", "obj", 4),
                token("を", "を", "ADP", "case", 2),
                token("予約", "予約", "VERB", "ROOT", 4),
                token("し", "する", "AUX", "aux", 4),
                token("て", "て", "SCONJ", "mark", 4),
            ],
        );
        parser.insert(
            "卵買った？",
            vec![
                token("卵", "卵", "NOUN", "obj", 1),
                token("買っ", "買う", "VERB", "ROOT", 1),
                token("た", "た", "AUX", "aux", 1),
                token("？", "？", "PUNCT", "punct", 1),
            ],
        );
        parser.insert(
            "牛乳買った?",
            vec![
                token("牛乳", "牛乳", "NOUN", "obj", 1),
                token("買っ", "買う", "VERB", "ROOT", 1),
                token("た", "た", "AUX", "aux", 1),
                token("?", "?", "PUNCT", "punct", 1),
            ],
        );
        parser
    }

    pub fn insert(&mut self, text: &str, tokens: Vec<Token>) {
        self.parses.insert(text.to_string(), tokens);
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl familyflow_core::LinguisticParser for FixtureParser {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.calls.set(self.calls.get() + 1);
        self.parses.get(text).cloned().unwrap_or_default()
    }
}

/// Classification service with a fixed answer that records what it was shown.
pub struct ScriptedClassifier {
    answer: Result<ClassificationResult, ClassificationError>,
    calls: Cell<usize>,
    seen_topics: RefCell<Vec<Vec<String>>>,
    seen_history: RefCell<Vec<Vec<String>>>,
}

impl ScriptedClassifier {
    pub fn answering(result: ClassificationResult) -> Self {
        Self::new(Ok(result))
    }

    pub fn failing() -> Self {
        Self::new(Err(ClassificationError::Service("timeout".to_string())))
    }

    fn new(answer: Result<ClassificationResult, ClassificationError>) -> Self {
        Self {
            answer,
            calls: Cell::new(0),
            seen_topics: RefCell::new(Vec::new()),
            seen_history: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_topics(&self) -> Option<Vec<String>> {
        self.seen_topics.borrow().last().cloned()
    }

    pub fn last_history(&self) -> Option<Vec<String>> {
        self.seen_history.borrow().last().cloned()
    }
}

impl ClassificationService for ScriptedClassifier {
    fn classify(
        &self,
        request: &ClassificationRequest<'_>,
    ) -> Result<ClassificationResult, ClassificationError> {
        self.calls.set(self.calls.get() + 1);
        self.seen_topics
            .borrow_mut()
            .push(request.active_topics.to_vec());
        self.seen_history.borrow_mut().push(
            request
                .history
                .iter()
                .map(|message| message.content.clone())
                .collect(),
        );
        self.answer.clone()
    }
}

/// Completion backend returning one canned reply.
pub struct ScriptedBackend {
    reply: Result<String, String>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedBackend {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.borrow().last().cloned()
    }
}

impl CompletionBackend for ScriptedBackend {
    fn complete(&self, prompt: &str) -> Result<String, String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.reply.clone()
    }
}

/// Notifier that records every delivery, or refuses all of them.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<(String, String)>>,
    broken: bool,
}

impl RecordingNotifier {
    pub fn broken() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            broken: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, conversation_id: &str, text: &str) -> Result<(), NotifyError> {
        if self.broken {
            return Err(NotifyError::new("channel closed"));
        }
        self.sent
            .borrow_mut()
            .push((conversation_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Task store wrapper that counts writes and can refuse inserts or reads.
pub struct CountingTaskRepository<R: TaskRepository> {
    inner: R,
    writes: Cell<usize>,
    fail_inserts: bool,
    fail_reads: bool,
}

impl<R: TaskRepository> CountingTaskRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            writes: Cell::new(0),
            fail_inserts: false,
            fail_reads: false,
        }
    }

    pub fn failing_inserts(inner: R) -> Self {
        Self {
            fail_inserts: true,
            ..Self::new(inner)
        }
    }

    /// Writes go through; every `get_task` fails.
    pub fn failing_reads(inner: R) -> Self {
        Self {
            fail_reads: true,
            ..Self::new(inner)
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    fn count(&self) {
        self.writes.set(self.writes.get() + 1);
    }
}

impl<R: TaskRepository> TaskRepository for CountingTaskRepository<R> {
    fn insert_task(&self, task: &Task) -> RepoResult<TaskId> {
        self.count();
        if self.fail_inserts {
            return Err(RepoError::InvalidData("disk full".to_string()));
        }
        self.inner.insert_task(task)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        if self.fail_reads {
            return Err(RepoError::InvalidData("database is locked".to_string()));
        }
        self.inner.get_task(id)
    }

    fn update_status(
        &self,
        id: TaskId,
        expected: TaskStatus,
        next: TaskStatus,
    ) -> RepoResult<Option<Task>> {
        self.count();
        self.inner.update_status(id, expected, next)
    }

    fn update_assignee(
        &self,
        id: TaskId,
        guard: AssigneeGuard<'_>,
        next: Option<&str>,
    ) -> RepoResult<Option<Task>> {
        self.count();
        self.inner.update_assignee(id, guard, next)
    }

    fn claim_latest(
        &self,
        group_id: &str,
        assignee: &str,
        eligible_topics: &[String],
    ) -> RepoResult<ClaimWrite> {
        self.count();
        self.inner.claim_latest(group_id, assignee, eligible_topics)
    }

    fn delete_task(&self, id: TaskId, removable: &[TaskStatus]) -> RepoResult<bool> {
        self.count();
        self.inner.delete_task(id, removable)
    }

    fn list_pending(&self, group_id: &str) -> RepoResult<Vec<Task>> {
        self.inner.list_pending(group_id)
    }

    fn list_distinct_topics(&self, group_id: &str) -> RepoResult<Vec<String>> {
        self.inner.list_distinct_topics(group_id)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.inner.list_tasks(query)
    }
}
