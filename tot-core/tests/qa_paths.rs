//! QA tests for full questionnaire traversals.
//!
//! These tests verify the rule table end to end:
//! - deterministic scenarios reach the expected conclusion key
//! - an exhaustive walk over every radio option (and representative
//!   years) always terminates, visits the whole catalog of questions,
//!   and never emits a conclusion the catalog lacks

use std::collections::{BTreeSet, HashSet};
use tot_core::testing::ScriptedSession;
use tot_core::{Advance, InputKind, Question, QuestionId, RawInput, Session};

// =============================================================================
// DETERMINISTIC SCENARIOS
// =============================================================================

#[test]
fn test_unpublished_post_1978_grant_without_publication_right() {
    // Created after Jan 1 1978, never published, author's own grant with
    // no right of publication: the straight section 203 case.
    let mut script = ScriptedSession::new();
    script
        .year(1984)
        .expect_at("s1q1b")
        .choose("no")
        .expect_at("s1q1c")
        .choose("no")
        .expect_at("s1q1d")
        .year(2014)
        .expect_at("s1q1f")
        .choose("no")
        .expect_at("s2q2a")
        .choose("no")
        .expect_at("s2q2bi")
        .choose("yes")
        .expect_at("s2q2c")
        .choose("no")
        .expect_at("s2q2d")
        .choose("no")
        .expect_at("s2q2e")
        .choose("no")
        .expect_at("s2q2f");

    let conclusion = script.conclude(RawInput::choice("yes"));
    assert_eq!(conclusion.key.to_string(), "s203.no_pub_right");
    assert!(conclusion.title.contains("Section 203"));

    let export = conclusion.export.expect("section 203 conclusions export a PDF");
    assert_eq!(export.table.len(), script.session.table().len());
    assert_eq!(&export.answers, script.session.answers());
}

#[test]
fn test_pre_1978_registered_grant_reaches_section_304() {
    let mut script = ScriptedSession::new();
    script
        .year(1950)
        .choose("yes")
        .expect_at("s1q1bi")
        .year(1960)
        .expect_at("s1q1bi2")
        .choose("yes")
        .expect_at("s1q1c")
        .choose("yes")
        .expect_at("s1q1ci")
        .year(1961)
        .expect_at("s1q1d")
        .year(1970)
        // Pre-1978 grants skip the right-of-publication question.
        .expect_at("s2q2a")
        .choose("no")
        .expect_at("s2q2bi")
        .choose("no")
        .expect_at("s2q2bi2")
        .year(1980)
        .expect_at("s2q2c")
        .choose("no")
        .expect_at("s2q2d")
        .choose("no")
        .expect_at("s2q2e")
        .choose("no")
        .expect_at("s2q2f");

    let conclusion = script.conclude(RawInput::choice("yes"));
    assert_eq!(conclusion.key.to_string(), "s304.general");
    assert!(conclusion.export.is_some());
}

#[test]
fn test_publication_right_asks_for_publication_under_the_grant() {
    let mut script = ScriptedSession::new();
    script
        .year(1980)
        .choose("yes")
        .expect_at("s1q1bi")
        .year(1995)
        // Post-notice-era publications skip the notice question.
        .expect_at("s1q1c")
        .choose("no")
        .expect_at("s1q1d")
        .year(1996)
        .expect_at("s1q1f")
        .choose("yes")
        .expect_at("s1q1bii")
        .year(1996)
        .expect_at("s2q2a")
        .choose("no")
        .choose("yes")
        .expect_at("s2q2c")
        .choose("no")
        .choose("no")
        .choose("no")
        .expect_at("s2q2f");

    let conclusion = script.conclude(RawInput::choice("yes"));
    assert_eq!(conclusion.key.to_string(), "s203.pub_right");
}

#[test]
fn test_early_publication_ends_the_questionnaire_immediately() {
    let mut script = ScriptedSession::new();
    script.year(1920).choose("yes").expect_at("s1q1bi");

    let conclusion = script.conclude(RawInput::text("1925"));
    assert_eq!(conclusion.key.to_string(), "expired.pre_cutoff");
    assert!(conclusion.export.is_none());
}

#[test]
fn test_notice_era_publication_without_notice() {
    let mut script = ScriptedSession::new();
    script
        .year(1950)
        .choose("yes")
        .year(1960)
        .expect_at("s1q1bi2");

    let conclusion = script.conclude(RawInput::choice("no"));
    assert_eq!(conclusion.key.to_string(), "expired.no_notice");
}

#[test]
fn test_employment_without_express_agreement_is_work_for_hire() {
    let mut script = ScriptedSession::new();
    script
        .year(1984)
        .choose("no")
        .choose("no")
        .year(2000)
        .choose("no")
        .expect_at("s2q2a")
        .choose("no")
        .choose("yes")
        .expect_at("s2q2c")
        .choose("yes")
        .expect_at("s2q2ci");

    let conclusion = script.conclude(RawInput::choice("no"));
    assert_eq!(conclusion.key.to_string(), "no_right.work_for_hire");
    assert!(conclusion.export.is_none());
}

#[test]
fn test_transfer_in_a_will_has_no_termination_right() {
    let mut script = ScriptedSession::new();
    script
        .year(1984)
        .choose("no")
        .choose("no")
        .year(2000)
        .choose("no")
        .expect_at("s2q2a");

    let conclusion = script.conclude(RawInput::choice("yes"));
    assert_eq!(conclusion.key.to_string(), "no_right.will");
}

// =============================================================================
// EXHAUSTIVE TRAVERSAL
// =============================================================================

/// Representative years per variable: enough to exercise every threshold
/// in the rule table and the validators.
fn candidate_years(variable: &str) -> &'static [i32] {
    match variable {
        "creation_year" => &[1920, 1950, 1980],
        "pub_year" => &[1925, 1960, 1995],
        "k_year" => &[1960, 2000],
        "grant_pub_year" => &[1996],
        _ => &[1985],
    }
}

fn candidate_inputs(question: &Question) -> Vec<RawInput> {
    match question.input {
        InputKind::Radio => question
            .values
            .iter()
            .map(|value| RawInput::choice(*value))
            .collect(),
        _ => candidate_years(question.variable)
            .iter()
            .map(|year| RawInput::text(year.to_string()))
            .collect(),
    }
}

fn explore(
    session: &Session,
    depth: usize,
    visited: &mut HashSet<QuestionId>,
    terminals: &mut BTreeSet<String>,
    paths: &mut usize,
) {
    assert!(depth < 40, "traversal exceeded the longest possible path");
    let question = session.current_question().expect("exploring at a question");
    visited.insert(question.id);

    for input in candidate_inputs(question) {
        let mut branch = session.clone();
        match branch.advance(&input).expect("no configuration defects") {
            // A year candidate outside this path's constraints; skip it.
            Advance::Rejected(_) => continue,
            Advance::Question(_) => explore(&branch, depth + 1, visited, terminals, paths),
            Advance::Finished(conclusion) => {
                terminals.insert(conclusion.key.to_string());
                *paths += 1;
            }
        }
    }
}

#[test]
fn test_every_path_terminates_in_a_cataloged_conclusion() {
    tot_core::rules::verify().expect("registry and rule table are consistent");

    let script = ScriptedSession::new();
    let mut visited = HashSet::new();
    let mut terminals = BTreeSet::new();
    let mut paths = 0usize;
    explore(&script.session, 0, &mut visited, &mut terminals, &mut paths);

    assert!(paths > 0);
    assert_eq!(
        visited.len(),
        20,
        "every question is reachable; missing: {:?}",
        tot_core::questions::all()
            .map(|q| q.id)
            .filter(|id| !visited.contains(id))
            .collect::<Vec<_>>()
    );

    let expected: BTreeSet<String> = [
        "expired.no_notice",
        "expired.pre_cutoff",
        "no_right.common_law",
        "no_right.not_by_author",
        "no_right.will",
        "no_right.work_for_hire",
        "s203.maybe_pub_right",
        "s203.no_pub_right",
        "s203.pub_right",
        "s304.general",
        "uncertain.renegotiated",
        "uncertain.work_for_hire",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(terminals, expected);
}
