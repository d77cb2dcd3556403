//! The question catalog: every node of the questionnaire graph.
//!
//! Questions are static data. Each node names the store variable it
//! writes, the kind of input it expects, and optionally a custom
//! validator, entry/exit hooks, and a display formatter for the answers
//! table. The registry is immutable after construction.

use crate::answers::AnswerStore;
use crate::validation::{self, Committed, ValidationError};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Identifier of a question node.
pub type QuestionId = &'static str;

/// The session starts here.
pub const FIRST_QUESTION: QuestionId = "s1q1a";

/// The final node of the graph; its rule can only finish.
pub const LAST_QUESTION: QuestionId = "s2q2fii";

const YES_NO: &[&str] = &["yes", "no"];
const YES_NO_MAYBE: &[&str] = &["yes", "no", "maybe"];
const YES_NO_DONT_KNOW: &[&str] = &["yes", "no", "don't know"];

/// The kind of input control a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// One of an enumerated set of options.
    Radio,
    /// A required four-digit year.
    Year,
    /// A year that may be left blank.
    YearOrEmpty,
    /// Free text with a minimum trimmed length.
    Text { min_chars: usize },
}

/// UI side effects requested by entry/exit hooks.
///
/// The core owns no markup; hooks queue these for the rendering
/// collaborator to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    DisablePrevious,
    EnablePrevious,
    ShowAnswersHint,
    RemoveAnswersHint,
}

/// Entry/exit hook: pushes UI events for the rendering collaborator.
pub type Hook = fn(&mut Vec<UiEvent>);

/// Node-specific validator; returns the value to commit.
pub type ValidateFn = fn(&str, &AnswerStore) -> Result<Committed, ValidationError>;

/// Formats the committed answer for the answers table.
pub type DisplayFn = fn(&AnswerStore) -> String;

/// One node of the questionnaire graph.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: QuestionId,
    /// Ordinal section this question opens or closes, if any.
    pub section: Option<u8>,
    pub prompt: &'static str,
    pub explanation: &'static str,
    /// The store variable this question writes.
    pub variable: &'static str,
    pub input: InputKind,
    /// Allowed options for radio input.
    pub values: &'static [&'static str],
    pub validate: Option<ValidateFn>,
    pub pre: Option<Hook>,
    pub post: Option<Hook>,
    pub answer_display: Option<DisplayFn>,
}

impl Question {
    fn new(id: QuestionId, variable: &'static str, input: InputKind, prompt: &'static str) -> Self {
        Self {
            id,
            section: None,
            prompt,
            explanation: "",
            variable,
            input,
            values: &[],
            validate: None,
            pre: None,
            post: None,
            answer_display: None,
        }
    }

    /// A yes/no radio question.
    pub fn radio(id: QuestionId, variable: &'static str, prompt: &'static str) -> Self {
        let mut q = Self::new(id, variable, InputKind::Radio, prompt);
        q.values = YES_NO;
        q
    }

    /// A required year question.
    pub fn year(id: QuestionId, variable: &'static str, prompt: &'static str) -> Self {
        Self::new(id, variable, InputKind::Year, prompt)
    }

    /// A year question that may be left blank.
    pub fn year_or_empty(id: QuestionId, variable: &'static str, prompt: &'static str) -> Self {
        Self::new(id, variable, InputKind::YearOrEmpty, prompt)
    }

    /// A free-text question with a minimum length.
    pub fn text(
        id: QuestionId,
        variable: &'static str,
        prompt: &'static str,
        min_chars: usize,
    ) -> Self {
        Self::new(id, variable, InputKind::Text { min_chars }, prompt)
    }

    pub fn with_section(mut self, section: u8) -> Self {
        self.section = Some(section);
        self
    }

    pub fn with_explanation(mut self, explanation: &'static str) -> Self {
        self.explanation = explanation;
        self
    }

    pub fn with_values(mut self, values: &'static [&'static str]) -> Self {
        self.values = values;
        self
    }

    pub fn with_validate(mut self, validate: ValidateFn) -> Self {
        self.validate = Some(validate);
        self
    }

    pub fn with_pre(mut self, pre: Hook) -> Self {
        self.pre = Some(pre);
        self
    }

    pub fn with_post(mut self, post: Hook) -> Self {
        self.post = Some(post);
        self
    }

    pub fn with_display(mut self, display: DisplayFn) -> Self {
        self.answer_display = Some(display);
        self
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable question catalog, keyed by id.
static QUESTIONS: LazyLock<HashMap<QuestionId, Question>> = LazyLock::new(build_registry);

/// Look up a question by id.
pub fn get(id: &str) -> Option<&'static Question> {
    QUESTIONS.get(id)
}

/// Iterate over every question in the catalog.
pub fn all() -> impl Iterator<Item = &'static Question> {
    QUESTIONS.values()
}

fn build_registry() -> HashMap<QuestionId, Question> {
    let mut questions = HashMap::new();
    let mut add = |q: Question| {
        questions.insert(q.id, q);
    };

    // ------------------------------------------------------------------
    // Section one: the work and the transfer
    // ------------------------------------------------------------------

    add(Question::year("s1q1a", "creation_year", "When was the work created?")
        .with_section(1)
        .with_explanation(
            "The year in which a work was created can affect its copyright status and its \
             treatment under U.S. copyright law. Most importantly, the tool is concerned with \
             whether a work was made before or after January 1, 1978, when the most recent \
             overhaul of U.S. copyright went into effect.",
        )
        .with_pre(|events| {
            events.push(UiEvent::DisablePrevious);
            events.push(UiEvent::ShowAnswersHint);
        })
        .with_post(|events| {
            events.push(UiEvent::RemoveAnswersHint);
        }));

    add(
        Question::radio("s1q1b", "work_published", "Has the work been published?")
            .with_explanation(
                "Whether a work has been published can affect its copyright status and factor \
                 into the timing of a termination right. Note that \"publication\" has a \
                 particular meaning in U.S. copyright law.",
            )
            .with_pre(|events| {
                events.push(UiEvent::EnablePrevious);
            }),
    );

    add(
        Question::year("s1q1bi", "pub_year", "When was the work first published?")
            .with_explanation(
                "When a work was published can affect its copyright status and factor into the \
                 timing of a termination right.",
            )
            .with_validate(validation::validate_pub_year),
    );

    add(Question::year(
        "s1q1bii",
        "grant_pub_year",
        "When was the work first published under the grant?",
    )
    .with_section(1)
    .with_explanation(
        "When a work was first published under the grant (which may be different than the date \
         the work was published for the first time) can factor into the timing of a termination \
         right.",
    )
    .with_validate(validation::validate_grant_pub_year));

    add(Question::radio(
        "s1q1bi2",
        "copyright_notice",
        "Published works from 1989 and earlier usually display a copyright notice. Did the work \
         have a copyright notice?",
    )
    .with_values(YES_NO_MAYBE)
    .with_explanation(
        "For U.S. works published in certain years, U.S. law required that they feature a \
         \"copyright notice\" in order to receive federal copyright protection. Whether or not \
         the published version featured a copyright notice can affect the copyright status of \
         these works.",
    ));

    add(Question::radio(
        "s1q1c",
        "work_registered",
        "Has the work been registered with the United States Copyright Office?",
    )
    .with_explanation(
        "Before 1989, registration was one of the ways authors could secure federal copyright \
         in their work. Whether a work was registered can affect copyright status and the \
         timing of termination right.",
    ));

    add(Question::year(
        "s1q1ci",
        "reg_year",
        "When was the work registered with the United States Copyright Office?",
    )
    .with_explanation(
        "Before 1989, registration was one of the ways authors could secure federal copyright \
         in their work. When a work was registered can affect copyright status and the timing \
         of termination right.",
    ));

    add(
        Question::year("s1q1d", "k_year", "What is the year of the agreement or transfer?")
            .with_explanation(
                "When a transfer took place determines the particular set of termination rules \
                 that will be applicable. The timing of a transfer is also needed to know when a \
                 work's copyright transfer may be eligible for termination.",
            )
            .with_validate(validation::validate_k_year)
            .with_display(|store| {
                let effective = store
                    .get("k_year")
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let typed = store
                    .get("user_inputted_k_year")
                    .map(ToString::to_string)
                    .unwrap_or_default();
                format!("Effective: {effective}, User entered: {typed}")
            }),
    );

    add(Question::radio(
        "s1q1f",
        "pub_right",
        "Did the agreement or transfer include the right of publication?",
    )
    .with_section(1)
    .with_values(YES_NO_MAYBE)
    .with_explanation(
        "If a transfer from 1978 or later includes the right of publication, there is a \
         different set of rules for determining when the transfer is eligible for termination.",
    ));

    // ------------------------------------------------------------------
    // Section two: who made the grant, and how
    // ------------------------------------------------------------------

    add(Question::radio(
        "s2q2a",
        "last_will",
        "Is the agreement or transfer in question part of a last will and testament?",
    )
    .with_section(2));

    add(Question::radio(
        "s2q2bi",
        "any_authors_alive",
        "Are any of the authors or artists still alive?",
    )
    .with_explanation("The copyright term for many works is based on the life of the author."));

    add(Question::year(
        "s2q2bi2",
        "death",
        "What is the year the last surviving author or artist died?",
    )
    .with_explanation("The copyright term for many works is based on the life of the author."));

    add(Question::radio(
        "s2q2c",
        "within_scope_of_employment",
        "Was the work created within the scope of the author's employment?",
    ));

    add(Question::radio(
        "s2q2ci",
        "express_agreement",
        "Was there an express agreement between the author and the author's employer to not \
         treat the work as a work for hire?",
    ));

    add(Question::radio(
        "s2q2d",
        "special_order",
        "Was the work created in response to a special order or commission by some other person \
         or company?",
    ));

    add(Question::radio(
        "s2q2di",
        "signed_written_agreement",
        "Was there a signed written agreement regarding the special order or commission which \
         explicitly refers to the work as a work for hire?",
    ));

    add(Question::radio(
        "s2q2dia",
        "created_as_part_of_motion_picture",
        "Was the work created for use as a contribution to a collective work, a part of a \
         motion picture or other audiovisual work, a translation, a supplementary work, a \
         compilation, an instructional text, a test or answer material for a test, or as an \
         atlas?",
    )
    .with_values(YES_NO_DONT_KNOW));

    add(Question::radio(
        "s2q2e",
        "renego",
        "Has the original transfer since been renegotiated or altered?",
    )
    .with_values(YES_NO_DONT_KNOW));

    add(Question::radio(
        "s2q2f",
        "authors_entered_agreement",
        "Did one or more of the authors enter into the agreement or transfer?",
    ));

    add(Question::radio(
        "s2q2fii",
        "agreement_by_family_or_executor",
        "Was the agreement or transfer made by a member of the author's immediate family, or by \
         the executors?",
    )
    .with_section(2));

    questions
}
