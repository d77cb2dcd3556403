//! Copyright termination-of-transfer questionnaire engine.
//!
//! This crate implements the branching legal questionnaire that determines
//! eligibility and timing for terminating a copyright transfer:
//! - the directed graph of questions and the rule table that picks the
//!   next node from the committed answers
//! - validation of pending input, including cross-field year checks
//! - reversible navigation: a stack of answer-store snapshots makes every
//!   forward step undoable
//! - resolution of terminal markers against the external conclusion
//!   catalog, behind an explicit readiness gate
//!
//! Rendering, PDF generation, and the catalog document itself are external
//! collaborators; the core exposes only questions, validation messages,
//! the answers table, and typed conclusions.
//!
//! # Quick start
//!
//! ```ignore
//! use tot_core::{RawInput, Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::new()
//!         .with_catalog_url("https://example.org/assets/results.json");
//!     let mut session = Session::bootstrap(config).await?;
//!
//!     let question = session.current_question().unwrap();
//!     println!("{}", question.prompt);
//!
//!     match session.advance(&RawInput::text("1984"))? {
//!         tot_core::Advance::Question(next) => println!("{}", next.prompt),
//!         tot_core::Advance::Rejected(message) => println!("{message}"),
//!         tot_core::Advance::Finished(conclusion) => println!("{}", conclusion.title),
//!     }
//!     Ok(())
//! }
//! ```

pub mod answers;
pub mod conclusion;
pub mod questions;
pub mod rules;
pub mod session;
pub mod testing;
pub mod validation;

// Primary public API
pub use answers::{AnswerRow, AnswerStore, AnswerValue, AnswersTable};
pub use conclusion::{CatalogGate, ConclusionError};
pub use questions::{InputKind, Question, QuestionId, UiEvent};
pub use rules::{NextTarget, Rule, RuleError};
pub use session::{
    Advance, CatalogSource, Conclusion, ExportSnapshot, NavigationStack, Session, SessionConfig,
    SessionError, SessionState,
};
pub use validation::{RawInput, ValidationError};

// Re-export the catalog data model for convenience
pub use tot_catalog::{CatalogClient, CatalogError, ConclusionCatalog, ConclusionKey, ConclusionRecord};
