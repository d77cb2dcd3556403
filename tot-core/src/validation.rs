//! Input validation for pending answers.
//!
//! Validation is purely advisory: it inspects the pending input and the
//! committed answers and either produces the value to store or a message
//! for the rendering collaborator to surface inline. It never mutates the
//! store itself.
//!
//! Policy, in priority order:
//! 1. A question's own validator is authoritative (it may consult earlier
//!    answers for cross-field checks).
//! 2. Year inputs must parse as a four-digit year.
//! 3. Free text must meet the question's minimum length.
//! 4. Radio inputs are never rejected; no selection is simply "no answer".

use crate::answers::{AnswerStore, AnswerValue};
use crate::questions::{InputKind, Question};
use thiserror::Error;

/// Calendar bounds for year inputs.
pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 9999;

/// A user-correctable rejection of pending input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid four-digit year.")]
    InvalidDate,

    #[error("Answer is too short, it must be at least {min_chars} characters")]
    TooShort { min_chars: usize },

    /// Message produced by a question's own validator.
    #[error("{0}")]
    Rule(String),
}

/// Pending input as delivered by the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// A selected radio option.
    Choice(String),
    /// Typed text; year inputs arrive as text.
    Text(String),
    /// Nothing selected or typed.
    Empty,
}

impl RawInput {
    pub fn choice(value: impl Into<String>) -> Self {
        RawInput::Choice(value.into())
    }

    pub fn text(value: impl Into<String>) -> Self {
        RawInput::Text(value.into())
    }

    fn as_text(&self) -> &str {
        match self {
            RawInput::Choice(s) | RawInput::Text(s) => s,
            RawInput::Empty => "",
        }
    }
}

/// A validated answer, ready to commit atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    /// The value stored under the question's variable.
    pub value: AnswerValue,
    /// Companion variables stored alongside, e.g. the year the user
    /// actually typed when the stored value was clamped.
    pub extra: Vec<(&'static str, AnswerValue)>,
}

impl Committed {
    pub fn value(value: AnswerValue) -> Self {
        Self {
            value,
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, variable: &'static str, value: AnswerValue) -> Self {
        self.extra.push((variable, value));
        self
    }
}

/// Parse a year string, enforcing the calendar range.
pub fn parse_year(input: &str) -> Result<i32, ValidationError> {
    let year: i32 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidDate)?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::InvalidDate);
    }
    Ok(year)
}

/// Validate pending input against a question.
///
/// Returns the value to commit, `Ok(None)` when an optional input was left
/// blank (nothing to commit, but the session still advances), or the
/// failure to surface inline.
pub fn validate(
    question: &Question,
    input: &RawInput,
    store: &AnswerStore,
) -> Result<Option<Committed>, ValidationError> {
    if let Some(custom) = question.validate {
        return custom(input.as_text(), store).map(Some);
    }

    match question.input {
        InputKind::Radio => Ok(match input {
            RawInput::Choice(value) => Some(Committed::value(AnswerValue::Choice(value.clone()))),
            _ => None,
        }),
        InputKind::Year => {
            let year = parse_year(input.as_text())?;
            Ok(Some(Committed::value(AnswerValue::Year(year))))
        }
        InputKind::YearOrEmpty => {
            if input.as_text().trim().is_empty() {
                Ok(None)
            } else {
                let year = parse_year(input.as_text())?;
                Ok(Some(Committed::value(AnswerValue::Year(year))))
            }
        }
        InputKind::Text { min_chars } => {
            let text = input.as_text().trim();
            if text.len() < min_chars {
                Err(ValidationError::TooShort { min_chars })
            } else {
                Ok(Some(Committed::value(AnswerValue::Text(text.to_string()))))
            }
        }
    }
}

// ============================================================================
// Question-specific validators
// ============================================================================

/// Publication cannot precede creation.
pub(crate) fn validate_pub_year(
    input: &str,
    store: &AnswerStore,
) -> Result<Committed, ValidationError> {
    let year = parse_year(input)?;
    if let Some(creation) = store.get("creation_year").and_then(AnswerValue::as_year) {
        if year < creation {
            return Err(ValidationError::Rule(
                "The publication year cannot be earlier than the creation year.".into(),
            ));
        }
    }
    Ok(Committed::value(AnswerValue::Year(year)))
}

/// Publication under the grant cannot precede creation or first publication.
pub(crate) fn validate_grant_pub_year(
    input: &str,
    store: &AnswerStore,
) -> Result<Committed, ValidationError> {
    let year = parse_year(input)?;
    if let Some(creation) = store.get("creation_year").and_then(AnswerValue::as_year) {
        if year < creation {
            return Err(ValidationError::Rule(
                "Year of publication under grant cannot be earlier than year of creation.".into(),
            ));
        }
    }
    if let Some(first_pub) = store.get("pub_year").and_then(AnswerValue::as_year) {
        if year < first_pub {
            return Err(ValidationError::Rule(
                "Year of publication under grant cannot be earlier than year of initial publication."
                    .into(),
            ));
        }
    }
    Ok(Committed::value(AnswerValue::Year(year)))
}

/// An agreement year earlier than the creation year is clamped up to the
/// creation year rather than rejected; the typed year is kept under
/// `user_inputted_k_year` so the answers table can show both.
pub(crate) fn validate_k_year(
    input: &str,
    store: &AnswerStore,
) -> Result<Committed, ValidationError> {
    let typed = parse_year(input)?;
    let effective = match store.get("creation_year").and_then(AnswerValue::as_year) {
        Some(creation) if typed < creation => creation,
        _ => typed,
    };
    Ok(Committed::value(AnswerValue::Year(effective))
        .with_extra("user_inputted_k_year", AnswerValue::Year(typed)))
}
