//! The rule table: which question comes next.
//!
//! Every question id maps to a [`Rule`], either a constant successor or a
//! pure function of the committed answers that resolves to another
//! question or to a terminal conclusion key. Rules never mutate the store;
//! the session commits the conclusion a terminal rule selects.
//!
//! A rule that consults a variable no path could have answered is a
//! configuration defect, not a runtime condition: it surfaces as
//! [`RuleError::Unanswered`] and the session refuses to advance.

use crate::answers::{AnswerStore, AnswerValue};
use crate::questions::{self, QuestionId};
use std::collections::HashMap;
use thiserror::Error;
use tot_catalog::ConclusionKey;

/// Most recent year whose pre-1978 publications have exhausted the 95-year
/// term and fallen into the public domain.
// TODO: derive this from the current year instead of bumping it annually.
pub const PUBLIC_DOMAIN_CUTOFF: i32 = 1930;

/// First year governed by the 1976 Copyright Act.
pub const ACT_1976_YEAR: i32 = 1978;

/// Last year published works required a copyright notice.
pub const NOTICE_LAST_YEAR: i32 = 1989;

/// A rule could not produce a next target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule consulted unanswered variable '{0}'")]
    Unanswered(&'static str),

    #[error("no rule for question '{0}'")]
    Missing(QuestionId),
}

/// Where a rule sends the session next.
#[derive(Debug, Clone, PartialEq)]
pub enum NextTarget {
    Question(QuestionId),
    /// Traversal is complete; the key selects the conclusion record.
    Finish(ConclusionKey),
}

/// A transition out of a question.
#[derive(Clone)]
pub enum Rule {
    /// Unconditional successor.
    Constant(QuestionId),
    /// Successor computed from the committed answers.
    Computed(fn(&AnswerStore) -> Result<NextTarget, RuleError>),
}

/// Resolve the next target for `current` given the committed answers.
pub fn next(current: QuestionId, store: &AnswerStore) -> Result<NextTarget, RuleError> {
    match RULES.get(current) {
        None => Err(RuleError::Missing(current)),
        Some(Rule::Constant(id)) => Ok(NextTarget::Question(*id)),
        Some(Rule::Computed(rule)) => rule(store),
    }
}

/// Cross-check the question registry against the rule table.
///
/// Reports every defect at once: questions without rules, rules for
/// unknown questions, and constant targets that name no question.
pub fn verify() -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    for question in questions::all() {
        if !RULES.contains_key(question.id) {
            problems.push(format!("question '{}' has no rule", question.id));
        }
    }
    for (id, rule) in RULES.iter() {
        if questions::get(id).is_none() {
            problems.push(format!("rule keyed by unknown question '{id}'"));
        }
        if let Rule::Constant(target) = rule {
            if questions::get(target).is_none() {
                problems.push(format!("rule for '{id}' targets unknown question '{target}'"));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

fn year(store: &AnswerStore, variable: &'static str) -> Result<i32, RuleError> {
    store
        .get(variable)
        .and_then(AnswerValue::as_year)
        .ok_or(RuleError::Unanswered(variable))
}

fn choice<'a>(store: &'a AnswerStore, variable: &'static str) -> Result<&'a str, RuleError> {
    store
        .get(variable)
        .and_then(AnswerValue::as_str)
        .ok_or(RuleError::Unanswered(variable))
}

fn goto(id: QuestionId) -> Result<NextTarget, RuleError> {
    Ok(NextTarget::Question(id))
}

fn finish(category: &str, subkey: &str) -> Result<NextTarget, RuleError> {
    Ok(NextTarget::Finish(ConclusionKey::new(category, subkey)))
}

/// Shared terminal rule: picks the statute track once we know the grant
/// was made by someone entitled to terminate it.
fn termination_track(store: &AnswerStore) -> Result<NextTarget, RuleError> {
    if year(store, "k_year")? >= ACT_1976_YEAR {
        // Section 203 governs grants executed in 1978 or later.
        match choice(store, "pub_right")? {
            "yes" => finish("s203", "pub_right"),
            "maybe" => finish("s203", "maybe_pub_right"),
            _ => finish("s203", "no_pub_right"),
        }
    } else {
        // Section 304 reaches only grants of a subsisting federal
        // copyright; unpublished, unregistered works had none.
        let published = choice(store, "work_published")? == "yes";
        let registered = choice(store, "work_registered")? == "yes";
        if published || registered {
            finish("s304", "general")
        } else {
            finish("no_right", "common_law")
        }
    }
}

lazy_static::lazy_static! {
    /// Transition table, keyed by question id.
    static ref RULES: HashMap<QuestionId, Rule> = build_rules();
}

fn build_rules() -> HashMap<QuestionId, Rule> {
    let mut rules: HashMap<QuestionId, Rule> = HashMap::new();

    rules.insert("s1q1a", Rule::Constant("s1q1b"));

    rules.insert(
        "s1q1b",
        Rule::Computed(|store| {
            if choice(store, "work_published")? == "yes" {
                goto("s1q1bi")
            } else {
                goto("s1q1c")
            }
        }),
    );

    rules.insert(
        "s1q1bi",
        Rule::Computed(|store| {
            let pub_year = year(store, "pub_year")?;
            if pub_year < PUBLIC_DOMAIN_CUTOFF {
                finish("expired", "pre_cutoff")
            } else if pub_year <= NOTICE_LAST_YEAR {
                goto("s1q1bi2")
            } else {
                goto("s1q1c")
            }
        }),
    );

    rules.insert(
        "s1q1bi2",
        Rule::Computed(|store| {
            if choice(store, "copyright_notice")? == "no" {
                finish("expired", "no_notice")
            } else {
                goto("s1q1c")
            }
        }),
    );

    rules.insert(
        "s1q1c",
        Rule::Computed(|store| {
            if choice(store, "work_registered")? == "yes" {
                goto("s1q1ci")
            } else {
                goto("s1q1d")
            }
        }),
    );

    rules.insert("s1q1ci", Rule::Constant("s1q1d"));

    rules.insert(
        "s1q1d",
        Rule::Computed(|store| {
            // Only 1978-or-later grants turn on the right of publication.
            if year(store, "k_year")? >= ACT_1976_YEAR {
                goto("s1q1f")
            } else {
                goto("s2q2a")
            }
        }),
    );

    rules.insert(
        "s1q1f",
        Rule::Computed(|store| {
            let right = choice(store, "pub_right")?;
            if (right == "yes" || right == "maybe") && choice(store, "work_published")? == "yes" {
                goto("s1q1bii")
            } else {
                goto("s2q2a")
            }
        }),
    );

    rules.insert("s1q1bii", Rule::Constant("s2q2a"));

    rules.insert(
        "s2q2a",
        Rule::Computed(|store| {
            if choice(store, "last_will")? == "yes" {
                finish("no_right", "will")
            } else {
                goto("s2q2bi")
            }
        }),
    );

    rules.insert(
        "s2q2bi",
        Rule::Computed(|store| {
            if choice(store, "any_authors_alive")? == "yes" {
                goto("s2q2c")
            } else {
                goto("s2q2bi2")
            }
        }),
    );

    rules.insert("s2q2bi2", Rule::Constant("s2q2c"));

    rules.insert(
        "s2q2c",
        Rule::Computed(|store| {
            if choice(store, "within_scope_of_employment")? == "yes" {
                goto("s2q2ci")
            } else {
                goto("s2q2d")
            }
        }),
    );

    rules.insert(
        "s2q2ci",
        Rule::Computed(|store| {
            if choice(store, "express_agreement")? == "yes" {
                goto("s2q2d")
            } else {
                finish("no_right", "work_for_hire")
            }
        }),
    );

    rules.insert(
        "s2q2d",
        Rule::Computed(|store| {
            if choice(store, "special_order")? == "yes" {
                goto("s2q2di")
            } else {
                goto("s2q2e")
            }
        }),
    );

    rules.insert(
        "s2q2di",
        Rule::Computed(|store| {
            if choice(store, "signed_written_agreement")? == "yes" {
                goto("s2q2dia")
            } else {
                goto("s2q2e")
            }
        }),
    );

    rules.insert(
        "s2q2dia",
        Rule::Computed(|store| {
            match choice(store, "created_as_part_of_motion_picture")? {
                "yes" => finish("no_right", "work_for_hire"),
                "don't know" => finish("uncertain", "work_for_hire"),
                _ => goto("s2q2e"),
            }
        }),
    );

    rules.insert(
        "s2q2e",
        Rule::Computed(|store| {
            if choice(store, "renego")? == "yes" {
                finish("uncertain", "renegotiated")
            } else {
                goto("s2q2f")
            }
        }),
    );

    rules.insert(
        "s2q2f",
        Rule::Computed(|store| {
            if choice(store, "authors_entered_agreement")? == "yes" {
                termination_track(store)
            } else {
                goto("s2q2fii")
            }
        }),
    );

    rules.insert(
        "s2q2fii",
        Rule::Computed(|store| {
            if choice(store, "agreement_by_family_or_executor")? == "yes" {
                // Pre-1978 grants by family or executors are terminable
                // under section 304; section 203 requires the author's own
                // grant.
                if year(store, "k_year")? < ACT_1976_YEAR {
                    termination_track(store)
                } else {
                    finish("no_right", "not_by_author")
                }
            } else {
                finish("no_right", "not_by_author")
            }
        }),
    );

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: &[(&'static str, AnswerValue)]) -> AnswerStore {
        let mut store = AnswerStore::new();
        for (variable, value) in entries {
            store.set(variable, value.clone());
        }
        store
    }

    #[test]
    fn test_tables_verify() {
        if let Err(problems) = verify() {
            panic!("configuration defects: {problems:?}");
        }
    }

    #[test]
    fn test_constant_rule() {
        let store = AnswerStore::new();
        assert_eq!(next("s1q1a", &store), Ok(NextTarget::Question("s1q1b")));
    }

    #[test]
    fn test_missing_rule_is_an_error() {
        let store = AnswerStore::new();
        assert_eq!(next("s9q9z", &store), Err(RuleError::Missing("s9q9z")));
    }

    #[test]
    fn test_unanswered_variable_is_an_error() {
        let store = AnswerStore::new();
        assert_eq!(
            next("s1q1b", &store),
            Err(RuleError::Unanswered("work_published"))
        );
    }

    #[test]
    fn test_publication_branches() {
        let published = store_with(&[("work_published", AnswerValue::Choice("yes".into()))]);
        assert_eq!(next("s1q1b", &published), Ok(NextTarget::Question("s1q1bi")));

        let unpublished = store_with(&[("work_published", AnswerValue::Choice("no".into()))]);
        assert_eq!(next("s1q1b", &unpublished), Ok(NextTarget::Question("s1q1c")));
    }

    #[test]
    fn test_early_publication_expires_the_copyright() {
        let store = store_with(&[("pub_year", AnswerValue::Year(1925))]);
        assert_eq!(
            next("s1q1bi", &store),
            Ok(NextTarget::Finish(ConclusionKey::new("expired", "pre_cutoff")))
        );
    }

    #[test]
    fn test_notice_era_publication_asks_about_notice() {
        let store = store_with(&[("pub_year", AnswerValue::Year(1960))]);
        assert_eq!(next("s1q1bi", &store), Ok(NextTarget::Question("s1q1bi2")));

        let modern = store_with(&[("pub_year", AnswerValue::Year(1995))]);
        assert_eq!(next("s1q1bi", &modern), Ok(NextTarget::Question("s1q1c")));
    }

    #[test]
    fn test_grant_year_selects_the_statute_question() {
        let modern = store_with(&[("k_year", AnswerValue::Year(1978))]);
        assert_eq!(next("s1q1d", &modern), Ok(NextTarget::Question("s1q1f")));

        let old = store_with(&[("k_year", AnswerValue::Year(1977))]);
        assert_eq!(next("s1q1d", &old), Ok(NextTarget::Question("s2q2a")));
    }

    #[test]
    fn test_grant_publication_asked_only_for_published_works_with_the_right() {
        let store = store_with(&[
            ("pub_right", AnswerValue::Choice("yes".into())),
            ("work_published", AnswerValue::Choice("yes".into())),
        ]);
        assert_eq!(next("s1q1f", &store), Ok(NextTarget::Question("s1q1bii")));

        let unpublished = store_with(&[
            ("pub_right", AnswerValue::Choice("yes".into())),
            ("work_published", AnswerValue::Choice("no".into())),
        ]);
        assert_eq!(next("s1q1f", &unpublished), Ok(NextTarget::Question("s2q2a")));

        let no_right = store_with(&[
            ("pub_right", AnswerValue::Choice("no".into())),
            ("work_published", AnswerValue::Choice("yes".into())),
        ]);
        assert_eq!(next("s1q1f", &no_right), Ok(NextTarget::Question("s2q2a")));
    }

    #[test]
    fn test_termination_track_section_203() {
        for (right, subkey) in [
            ("no", "no_pub_right"),
            ("yes", "pub_right"),
            ("maybe", "maybe_pub_right"),
        ] {
            let store = store_with(&[
                ("k_year", AnswerValue::Year(1990)),
                ("pub_right", AnswerValue::Choice(right.into())),
                ("authors_entered_agreement", AnswerValue::Choice("yes".into())),
            ]);
            assert_eq!(
                next("s2q2f", &store),
                Ok(NextTarget::Finish(ConclusionKey::new("s203", subkey))),
                "pub_right={right}"
            );
        }
    }

    #[test]
    fn test_termination_track_section_304_needs_federal_copyright() {
        let registered = store_with(&[
            ("k_year", AnswerValue::Year(1960)),
            ("work_published", AnswerValue::Choice("no".into())),
            ("work_registered", AnswerValue::Choice("yes".into())),
            ("authors_entered_agreement", AnswerValue::Choice("yes".into())),
        ]);
        assert_eq!(
            next("s2q2f", &registered),
            Ok(NextTarget::Finish(ConclusionKey::new("s304", "general")))
        );

        let common_law = store_with(&[
            ("k_year", AnswerValue::Year(1960)),
            ("work_published", AnswerValue::Choice("no".into())),
            ("work_registered", AnswerValue::Choice("no".into())),
            ("authors_entered_agreement", AnswerValue::Choice("yes".into())),
        ]);
        assert_eq!(
            next("s2q2f", &common_law),
            Ok(NextTarget::Finish(ConclusionKey::new("no_right", "common_law")))
        );
    }

    #[test]
    fn test_family_grants_terminable_only_before_1978() {
        let pre_1978 = store_with(&[
            ("k_year", AnswerValue::Year(1970)),
            ("work_published", AnswerValue::Choice("yes".into())),
            ("work_registered", AnswerValue::Choice("no".into())),
            ("agreement_by_family_or_executor", AnswerValue::Choice("yes".into())),
        ]);
        assert_eq!(
            next("s2q2fii", &pre_1978),
            Ok(NextTarget::Finish(ConclusionKey::new("s304", "general")))
        );

        let post_1978 = store_with(&[
            ("k_year", AnswerValue::Year(1990)),
            ("agreement_by_family_or_executor", AnswerValue::Choice("yes".into())),
        ]);
        assert_eq!(
            next("s2q2fii", &post_1978),
            Ok(NextTarget::Finish(ConclusionKey::new("no_right", "not_by_author")))
        );

        let stranger = store_with(&[
            ("agreement_by_family_or_executor", AnswerValue::Choice("no".into())),
        ]);
        assert_eq!(
            next("s2q2fii", &stranger),
            Ok(NextTarget::Finish(ConclusionKey::new("no_right", "not_by_author")))
        );
    }

    #[test]
    fn test_work_for_hire_branches() {
        let no_express = store_with(&[("express_agreement", AnswerValue::Choice("no".into()))]);
        assert_eq!(
            next("s2q2ci", &no_express),
            Ok(NextTarget::Finish(ConclusionKey::new("no_right", "work_for_hire")))
        );

        let commissioned = store_with(&[(
            "created_as_part_of_motion_picture",
            AnswerValue::Choice("don't know".into()),
        )]);
        assert_eq!(
            next("s2q2dia", &commissioned),
            Ok(NextTarget::Finish(ConclusionKey::new("uncertain", "work_for_hire")))
        );
    }
}
