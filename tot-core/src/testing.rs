//! Testing utilities for the questionnaire engine.
//!
//! This module provides tools for integration testing:
//! - `sample_catalog` builds a complete in-memory conclusion catalog, so
//!   tests never fetch anything
//! - `ScriptedSession` walks a session through a scripted list of answers
//!   with assertion helpers

use crate::questions::QuestionId;
use crate::session::{Advance, Conclusion, Session};
use crate::validation::RawInput;
use tot_catalog::{ConclusionCatalog, ConclusionKey, ConclusionRecord};

/// Build a catalog containing every conclusion the rule table can emit.
///
/// The bodies are abbreviated from the production document; tests care
/// about coverage and the `generate_pdf` flags, not the prose.
pub fn sample_catalog() -> ConclusionCatalog {
    let mut catalog = ConclusionCatalog::new();
    let mut put = |category: &str, subkey: &str, title: &str, body: &str, generate_pdf: bool| {
        catalog.insert(
            ConclusionKey::new(category, subkey),
            ConclusionRecord {
                title: title.into(),
                body: body.into(),
                generate_pdf,
            },
        );
    };

    put(
        "expired",
        "pre_cutoff",
        "This work is likely in the public domain",
        "Works published this long ago have exhausted their copyright term, so there is no \
         subsisting transfer to terminate.",
        false,
    );
    put(
        "expired",
        "no_notice",
        "This work may be in the public domain",
        "Works published without a copyright notice in the years that required one may have \
         forfeited federal copyright protection.",
        false,
    );
    put(
        "no_right",
        "will",
        "Transfers by will cannot be terminated",
        "The termination provisions do not reach transfers made as part of a last will and \
         testament.",
        false,
    );
    put(
        "no_right",
        "work_for_hire",
        "Works made for hire have no termination right",
        "When a work is made for hire, the hiring party is considered the author and the \
         termination provisions do not apply.",
        false,
    );
    put(
        "no_right",
        "not_by_author",
        "Only the author's own grants can be terminated",
        "A transfer made by someone other than the author (or, for older grants, the author's \
         statutory heirs) is not eligible for termination.",
        false,
    );
    put(
        "no_right",
        "common_law",
        "No federal copyright subsisted at the time of the grant",
        "Before 1978, unpublished and unregistered works were protected only by common-law \
         copyright, which the termination provisions do not reach.",
        false,
    );
    put(
        "uncertain",
        "work_for_hire",
        "This may be a work made for hire",
        "Whether the commissioned work falls into one of the enumerated categories decides \
         whether any termination right exists; consult the signed agreement.",
        false,
    );
    put(
        "uncertain",
        "renegotiated",
        "A renegotiated transfer may supersede the original",
        "If the original transfer has been renegotiated or altered, the later agreement may be \
         the one that matters for termination timing.",
        false,
    );
    put(
        "s203",
        "no_pub_right",
        "You may have a termination right under Section 203",
        "For grants made in 1978 or later, termination may be effected during a five-year \
         window opening 35 years after the date of the grant.",
        true,
    );
    put(
        "s203",
        "pub_right",
        "You may have a termination right under Section 203",
        "Because the grant covers the right of publication, the window opens at the earlier of \
         35 years after publication under the grant or 40 years after the grant.",
        true,
    );
    put(
        "s203",
        "maybe_pub_right",
        "You may have a termination right under Section 203",
        "Whether the grant includes the right of publication changes when the five-year window \
         opens; both timelines are worth computing.",
        true,
    );
    put(
        "s304",
        "general",
        "You may have a termination right under Section 304",
        "For grants made before 1978 of a subsisting copyright, termination may be effected \
         during a five-year window opening 56 years after copyright was secured.",
        true,
    );

    catalog
}

/// Walks a session through a scripted list of answers.
///
/// Every helper panics on configuration defects, so a scenario test reads
/// as a straight line of answers ending in a conclusion.
pub struct ScriptedSession {
    pub session: Session,
}

impl ScriptedSession {
    /// A started session backed by [`sample_catalog`].
    pub fn new() -> Self {
        let mut session = Session::with_catalog(sample_catalog());
        session.start().expect("session starts at the first question");
        Self { session }
    }

    /// The id of the question the session is currently at.
    pub fn at(&self) -> QuestionId {
        self.session
            .current_question()
            .expect("session is at a question")
            .id
    }

    /// Advance with arbitrary input, propagating the outcome.
    pub fn step(&mut self, input: RawInput) -> Advance {
        self.session.advance(&input).expect("no configuration defects")
    }

    /// Answer a year question and expect to land on another question.
    pub fn year(&mut self, value: i32) -> &mut Self {
        let at = self.at();
        let outcome = self.step(RawInput::text(value.to_string()));
        match outcome {
            Advance::Question(_) => self,
            other => panic!("answering {value} at {at} got {other:?}"),
        }
    }

    /// Answer a radio question and expect to land on another question.
    pub fn choose(&mut self, value: &str) -> &mut Self {
        let at = self.at();
        let outcome = self.step(RawInput::choice(value));
        match outcome {
            Advance::Question(_) => self,
            other => panic!("choosing {value:?} at {at} got {other:?}"),
        }
    }

    /// Answer and expect the traversal to finish.
    pub fn conclude(&mut self, input: RawInput) -> Conclusion {
        match self.step(input) {
            Advance::Finished(conclusion) => conclusion,
            other => panic!("expected a conclusion, got {other:?}"),
        }
    }

    /// Assert the current question id.
    pub fn expect_at(&mut self, id: QuestionId) -> &mut Self {
        assert_eq!(self.at(), id);
        self
    }
}

impl Default for ScriptedSession {
    fn default() -> Self {
        Self::new()
    }
}
