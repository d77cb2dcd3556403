//! Session controller: the advance/retreat/finish protocol.
//!
//! A [`Session`] owns all mutable state for one user's walk through the
//! questionnaire: the answer store, the navigation stack of snapshots, the
//! answers table, and the current position. Each `advance`/`retreat` runs
//! to completion as one atomic step; a transition either fully commits or
//! leaves the session exactly as it was.

use crate::answers::{AnswerStore, AnswersTable};
use crate::conclusion::{CatalogGate, ConclusionError};
use crate::questions::{self, Hook, Question, QuestionId, UiEvent};
use crate::rules::{self, NextTarget, RuleError};
use crate::validation::{self, RawInput, ValidationError};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tot_catalog::{CatalogClient, CatalogError, ConclusionCatalog, ConclusionKey};
use uuid::Uuid;

/// Errors from session operations.
///
/// A validation failure is the only routine, user-correctable condition
/// and is reported through [`Advance::Rejected`]; everything here is a
/// configuration or timing defect that must halt forward progress.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown question id '{0}'")]
    NotFound(QuestionId),

    #[error("broken rule at question '{question}': {source}")]
    BrokenRule {
        question: QuestionId,
        #[source]
        source: RuleError,
    },

    #[error(transparent)]
    Conclusion(#[from] ConclusionError),

    #[error("catalog fetch failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("session has not been started")]
    NotInProgress,

    #[error("session is already finished")]
    AlreadyFinished,
}

/// Where the conclusion catalog comes from at bootstrap.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Url(String),
    Path(PathBuf),
}

/// Configuration for creating a session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Catalog location fetched during [`Session::bootstrap`]. Without
    /// one the session starts behind an unready gate and a catalog must
    /// be installed before any path can finish.
    pub catalog: Option<CatalogSource>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog = Some(CatalogSource::Url(url.into()));
        self
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog = Some(CatalogSource::Path(path.into()));
        self
    }
}

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    AtQuestion(QuestionId),
    Finished,
}

/// Outcome of a successful `advance()` call.
#[derive(Debug)]
pub enum Advance {
    /// Input rejected; nothing changed. Surface the message inline.
    Rejected(ValidationError),
    /// Moved on to another question.
    Question(&'static Question),
    /// Traversal complete.
    Finished(Conclusion),
}

/// A resolved terminal determination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conclusion {
    pub key: ConclusionKey,
    pub title: String,
    pub body: String,
    /// Final-state snapshot for the export collaborator, present only
    /// when the catalog record is flagged PDF-eligible.
    pub export: Option<ExportSnapshot>,
}

/// Everything the PDF collaborator needs to build the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSnapshot {
    pub answers: AnswerStore,
    pub table: AnswersTable,
}

/// Stack of store snapshots, one per committed forward transition.
///
/// Height equals the number of committed transitions since the last
/// `start()`; popping restores the exact store content at that point,
/// including the current question id.
#[derive(Debug, Clone, Default)]
pub struct NavigationStack {
    snapshots: Vec<AnswerStore>,
}

impl NavigationStack {
    fn push(&mut self, snapshot: AnswerStore) {
        self.snapshots.push(snapshot);
    }

    fn pop(&mut self) -> Option<AnswerStore> {
        self.snapshots.pop()
    }

    pub fn height(&self) -> usize {
        self.snapshots.len()
    }

    fn clear(&mut self) {
        self.snapshots.clear();
    }
}

/// A single user's questionnaire session.
///
/// All mutable state lives here; `start()` produces a fresh walk without
/// touching any other session, so concurrent or tested sessions never
/// cross-contaminate.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    state: SessionState,
    store: AnswerStore,
    stack: NavigationStack,
    table: AnswersTable,
    catalog: CatalogGate,
    events: Vec<UiEvent>,
}

impl Session {
    /// Create a session behind the given catalog gate, not yet started.
    pub fn new(catalog: CatalogGate) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::NotStarted,
            store: AnswerStore::new(),
            stack: NavigationStack::default(),
            table: AnswersTable::new(),
            catalog,
            events: Vec::new(),
        }
    }

    /// Create a session with an already-loaded catalog.
    pub fn with_catalog(catalog: ConclusionCatalog) -> Self {
        Self::new(CatalogGate::ready(catalog))
    }

    /// Fetch the catalog, then start a fresh session at the first
    /// question.
    ///
    /// Sessions built this way can never hit `CatalogNotReady`: the fetch
    /// resolves before the first question is even presented.
    pub async fn bootstrap(config: SessionConfig) -> Result<Self, SessionError> {
        let gate = CatalogGate::empty();
        if let Some(source) = config.catalog {
            let client = CatalogClient::new();
            let catalog = match source {
                CatalogSource::Url(url) => client.fetch(&url).await?,
                CatalogSource::Path(path) => client.load(&path).await?,
            };
            gate.install(catalog);
        }
        let mut session = Self::new(gate);
        session.start()?;
        Ok(session)
    }

    /// Reset to the first question, clearing all answers, the stack, and
    /// the answers table.
    pub fn start(&mut self) -> Result<&'static Question, SessionError> {
        let first = questions::get(questions::FIRST_QUESTION)
            .ok_or(SessionError::NotFound(questions::FIRST_QUESTION))?;

        self.store = AnswerStore::new();
        self.stack.clear();
        self.table.clear();
        self.events.clear();
        self.store.set_question_id(first.id);
        self.state = SessionState::AtQuestion(first.id);
        self.run_hook(first.pre);
        Ok(first)
    }

    /// Validate and commit the pending input, then move to the rule's
    /// target.
    ///
    /// On a validation failure the session is untouched and the message is
    /// returned through [`Advance::Rejected`]. Configuration defects
    /// (broken rules, unknown conclusions, an unready catalog) roll the
    /// store back and surface as errors.
    pub fn advance(&mut self, input: &RawInput) -> Result<Advance, SessionError> {
        let id = match self.state {
            SessionState::AtQuestion(id) => id,
            SessionState::NotStarted => return Err(SessionError::NotInProgress),
            SessionState::Finished => return Err(SessionError::AlreadyFinished),
        };
        let question = questions::get(id).ok_or(SessionError::NotFound(id))?;

        let committed = match validation::validate(question, input, &self.store) {
            Ok(committed) => committed,
            Err(failure) => return Ok(Advance::Rejected(failure)),
        };

        // Snapshot before the commit so retreat() is an exact round trip.
        let snapshot = self.store.clone();

        if let Some(committed) = &committed {
            self.store.set(question.variable, committed.value.clone());
            for (variable, value) in &committed.extra {
                self.store.set(variable, value.clone());
            }
        }

        let target = match rules::next(id, &self.store) {
            Ok(target) => target,
            Err(source) => {
                self.store = snapshot;
                return Err(SessionError::BrokenRule { question: id, source });
            }
        };

        match target {
            NextTarget::Question(next_id) => {
                let Some(next) = questions::get(next_id) else {
                    self.store = snapshot;
                    return Err(SessionError::NotFound(next_id));
                };

                self.commit_row(question, &committed, snapshot);
                self.store.set_question_id(next_id);
                self.state = SessionState::AtQuestion(next_id);
                self.run_hook(next.pre);
                Ok(Advance::Question(next))
            }
            NextTarget::Finish(key) => {
                let record = match self.catalog.resolve(&key) {
                    Ok(record) => record.clone(),
                    Err(failure) => {
                        self.store = snapshot;
                        return Err(failure.into());
                    }
                };

                self.commit_row(question, &committed, snapshot);
                self.store.set_conclusion(key.clone());
                self.state = SessionState::Finished;

                let export = record.generate_pdf.then(|| ExportSnapshot {
                    answers: self.store.clone(),
                    table: self.table.clone(),
                });
                Ok(Advance::Finished(Conclusion {
                    key,
                    title: record.title,
                    body: record.body,
                    export,
                }))
            }
        }
    }

    /// Step back one committed transition.
    ///
    /// Restores the store (and with it the question id) from the top
    /// snapshot and strips the matching answers-table row. At the first
    /// question this is an `Ok` no-op; from the finished state it returns
    /// to the final question.
    pub fn retreat(&mut self) -> Result<Option<&'static Question>, SessionError> {
        let leaving = match self.state {
            SessionState::NotStarted => return Err(SessionError::NotInProgress),
            SessionState::AtQuestion(id) => questions::get(id),
            SessionState::Finished => None,
        };

        let Some(snapshot) = self.stack.pop() else {
            // The first question is never left.
            return Ok(None);
        };

        if let Some(leaving) = leaving {
            self.run_hook(leaving.post);
        }

        self.store = snapshot;
        let id = self.store.question_id();
        let question = questions::get(id).ok_or(SessionError::NotFound(id))?;
        self.table.remove_last_for(question.variable);
        self.state = SessionState::AtQuestion(id);
        self.run_hook(question.pre);
        Ok(Some(question))
    }

    fn commit_row(
        &mut self,
        question: &'static Question,
        committed: &Option<validation::Committed>,
        snapshot: AnswerStore,
    ) {
        self.run_hook(question.post);
        self.stack.push(snapshot);
        if let Some(committed) = committed {
            let display = match question.answer_display {
                Some(format) => format(&self.store),
                None => committed.value.to_string(),
            };
            self.table.append(question.variable, question.prompt, display);
        }
    }

    fn run_hook(&mut self, hook: Option<Hook>) {
        if let Some(hook) = hook {
            hook(&mut self.events);
        }
    }

    /// Drain UI events queued by entry/exit hooks since the last call.
    pub fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    /// The question the session is currently at, if any.
    pub fn current_question(&self) -> Option<&'static Question> {
        match self.state {
            SessionState::AtQuestion(id) => questions::get(id),
            _ => None,
        }
    }

    /// The committed answer for the current question, for pre-filling the
    /// input control.
    pub fn current_answer(&self) -> Option<&crate::answers::AnswerValue> {
        let question = self.current_question()?;
        self.store.get(question.variable)
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.store
    }

    pub fn table(&self) -> &AnswersTable {
        &self.table
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    /// The terminal key, present only once finished.
    pub fn conclusion_key(&self) -> Option<&ConclusionKey> {
        self.store.conclusion()
    }

    /// Handle to the catalog gate, e.g. for installing a catalog fetched
    /// in the background.
    pub fn catalog(&self) -> &CatalogGate {
        &self.catalog
    }
}
