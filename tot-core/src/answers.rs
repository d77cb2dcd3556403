//! Answer storage for an in-progress questionnaire session.
//!
//! The [`AnswerStore`] is the single mutable record of what the user has
//! said so far; the [`AnswersTable`] is the ordered, display-oriented
//! mirror of it that the rendering collaborator shows beside the
//! questionnaire. Both are mutated only through the session's
//! advance/retreat protocol.

use crate::questions::{self, QuestionId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tot_catalog::ConclusionKey;

/// A typed answer value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// A four-digit year.
    Year(i32),
    /// A selected radio option.
    Choice(String),
    /// Free text.
    Text(String),
}

impl AnswerValue {
    pub fn as_year(&self) -> Option<i32> {
        match self {
            AnswerValue::Year(y) => Some(*y),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnswerValue::Choice(s) | AnswerValue::Text(s) => Some(s),
            AnswerValue::Year(_) => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Year(y) => write!(f, "{y}"),
            AnswerValue::Choice(s) | AnswerValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Mutable mapping from variable name to answer value for one session.
///
/// Alongside the ordinary variables it carries two distinguished fields:
/// the current `question_id` and the terminal `conclusion` key, which a
/// rule sets only when the traversal completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerStore {
    values: BTreeMap<&'static str, AnswerValue>,
    question_id: QuestionId,
    conclusion: Option<ConclusionKey>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            question_id: questions::FIRST_QUESTION,
            conclusion: None,
        }
    }

    pub fn get(&self, variable: &str) -> Option<&AnswerValue> {
        self.values.get(variable)
    }

    pub fn set(&mut self, variable: &'static str, value: AnswerValue) {
        self.values.insert(variable, value);
    }

    pub fn remove(&mut self, variable: &str) -> Option<AnswerValue> {
        self.values.remove(variable)
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.values.contains_key(variable)
    }

    /// Current position in the question graph.
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    pub fn set_question_id(&mut self, id: QuestionId) {
        self.question_id = id;
    }

    /// The terminal marker, set only when a rule resolves to finish.
    pub fn conclusion(&self) -> Option<&ConclusionKey> {
        self.conclusion.as_ref()
    }

    pub fn set_conclusion(&mut self, key: ConclusionKey) {
        self.conclusion = Some(key);
    }

    /// Number of answered variables (the pseudo-variables do not count).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AnswerValue)> + '_ {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

impl Default for AnswerStore {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of the running answers table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRow {
    pub variable: &'static str,
    pub question: &'static str,
    /// The displayed form of the answer, which may differ from the stored
    /// value (e.g. a clamped year shown alongside what the user typed).
    pub answer: String,
}

/// Ordered record of displayed answers, mirroring forward progress.
///
/// Rows are appended when an answer commits and removed most-recent-first
/// when the user navigates backward.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswersTable {
    rows: Vec<AnswerRow>,
}

impl AnswersTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, variable: &'static str, question: &'static str, answer: String) {
        self.rows.push(AnswerRow {
            variable,
            question,
            answer,
        });
    }

    /// Remove the most recent row if it belongs to `variable`.
    ///
    /// Questions whose optional input was left blank never appended a row,
    /// so backward navigation must not strip some other question's entry.
    pub fn remove_last_for(&mut self, variable: &str) -> Option<AnswerRow> {
        if self.rows.last()?.variable == variable {
            self.rows.pop()
        } else {
            None
        }
    }

    pub fn rows(&self) -> &[AnswerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
