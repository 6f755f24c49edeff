//! End-to-end interview scenarios over the built-in water catalogue.
//!
//! These tests drive whole sessions through the public API:
//! 1. Start a session for a context
//! 2. Record answers in plan order (and out of it)
//! 3. Verify field mapping, classification, navigation, and completion

use drysight::config::EngineSettings;
use drysight::domain::catalogue::{
    builtin, AnswerValue, CatalogueError, EntitlementTier, FieldValue, MappingRule, Question,
    QuestionCatalogue, QuestionKind, SessionContext, Transform,
};
use drysight::domain::foundation::{FieldKey, QuestionId, SessionStatus, Tier};
use drysight::domain::interview::{
    Advance, ContaminationCategory, InterviewError, InterviewSession, SeverityClass,
};

// =============================================================================
// Helpers
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn settings() -> EngineSettings {
    EngineSettings::default()
}

fn water_session() -> InterviewSession {
    init_tracing();
    let context = SessionContext::new("water", "CA", EntitlementTier::Pro);
    InterviewSession::start(context, builtin::water_damage(), &settings())
        .expect("built-in catalogue applies to water jobs")
}

fn qid(id: &str) -> QuestionId {
    QuestionId::new(id)
}

fn key(k: &str) -> FieldKey {
    FieldKey::new(k)
}

fn answer(session: &mut InterviewSession, id: &str, value: AnswerValue) -> Advance {
    session
        .record_answer(builtin::water_damage(), &qid(id), value)
        .unwrap_or_else(|e| panic!("answer to {id} rejected: {e}"))
}

// =============================================================================
// Classification escalation
// =============================================================================

#[test]
fn grey_water_past_threshold_escalates_to_category_three() {
    let mut session = water_session();
    answer(&mut session, "water.source", AnswerValue::Selection("grey".into()));

    let base = session.classification().expect("source answer present");
    assert_eq!(base.category, ContaminationCategory::Grey);
    assert!(!base.escalated_by_time);

    answer(&mut session, "water.hours_since_incident", AnswerValue::Hours(60.0));

    let escalated = session.classification().unwrap();
    assert_eq!(escalated.category, ContaminationCategory::Black);
    assert_eq!(escalated.category.value(), 3);
    assert!(escalated.escalated_by_time);
}

#[test]
fn escalation_never_downgrades_below_base() {
    let mut session = water_session();
    answer(&mut session, "water.source", AnswerValue::Selection("black".into()));
    answer(&mut session, "water.hours_since_incident", AnswerValue::Hours(1.0));

    let classification = session.classification().unwrap();
    assert_eq!(classification.category, ContaminationCategory::Black);
}

#[test]
fn specialty_materials_force_severity_class_four() {
    let mut session = water_session();
    answer(&mut session, "water.source", AnswerValue::Selection("clean".into()));
    answer(&mut session, "water.affected_area_percent", AnswerValue::Number(2.0));
    assert_eq!(
        session.classification().unwrap().severity_class,
        Some(SeverityClass::Minimal)
    );

    answer(
        &mut session,
        "water.materials_affected",
        AnswerValue::Selections(vec!["plaster".into()]),
    );
    assert_eq!(
        session.classification().unwrap().severity_class,
        Some(SeverityClass::Specialty)
    );
}

// =============================================================================
// Partial multi-field population
// =============================================================================

#[test]
fn multi_field_rule_populates_only_satisfiable_parts() {
    // One Direct part and one Transformed part whose upstream question
    // is not yet answered. Only the Direct part may fire, and the
    // transformed target must be absent, not null.
    let catalogue = QuestionCatalogue::new(
        "test-1",
        vec![
            Question::new(
                "job.crew_lead",
                Tier::ESSENTIAL,
                "Crew lead name?",
                QuestionKind::FreeText,
            )
            .with_mapping(MappingRule::Direct {
                target: key("crew.lead"),
            }),
            Question::new(
                "job.shift",
                Tier::ESSENTIAL,
                "Shift?",
                QuestionKind::SingleSelect {
                    options: vec!["day".into(), "night".into()],
                },
            )
            .with_mapping(MappingRule::MultiField {
                parts: vec![
                    MappingRule::Direct {
                        target: key("crew.shift"),
                    },
                    MappingRule::Transformed {
                        target: key("crew.summary"),
                        transform: Transform::CombineLookup {
                            other: qid("job.crew_lead"),
                            table: Default::default(),
                            default: Some(FieldValue::Text("unstaffed".into())),
                        },
                    },
                ],
            }),
        ],
    )
    .unwrap();

    let context = SessionContext::new("water", "CA", EntitlementTier::Basic);
    let mut session = InterviewSession::start(context, &catalogue, &settings()).unwrap();

    session
        .record_answer(&catalogue, &qid("job.shift"), AnswerValue::Selection("day".into()))
        .unwrap();

    assert!(session.field_map().get(&key("crew.shift")).is_some());
    assert!(session.field_map().get(&key("crew.summary")).is_none());

    // Once the upstream answer arrives, re-answering fires both parts.
    session
        .record_answer(&catalogue, &qid("job.crew_lead"), AnswerValue::Text("R. Ortiz".into()))
        .unwrap();
    session
        .record_answer(&catalogue, &qid("job.shift"), AnswerValue::Selection("day".into()))
        .unwrap();
    assert_eq!(
        session.field_map().get(&key("crew.summary")).map(|e| &e.value),
        Some(&FieldValue::Text("unstaffed".into()))
    );
}

// =============================================================================
// Completion gate
// =============================================================================

#[test]
fn completion_requires_essential_tier_only() {
    let mut session = water_session();

    answer(&mut session, "water.source", AnswerValue::Selection("clean".into()));
    answer(&mut session, "water.hours_since_incident", AnswerValue::Hours(4.0));
    answer(&mut session, "water.affected_area_percent", AnswerValue::Number(12.0));
    answer(&mut session, "water.standing_water", AnswerValue::Boolean(false));

    // Tier 2 and 3 questions are still unanswered.
    assert!(session.answer(&qid("water.materials_affected")).is_none());

    session.complete().unwrap();
    assert_eq!(session.status(), SessionStatus::Completed);
}

#[test]
fn completion_fails_while_an_essential_question_is_unanswered() {
    let mut session = water_session();
    answer(&mut session, "water.source", AnswerValue::Selection("clean".into()));

    match session.complete() {
        Err(InterviewError::Incomplete { missing }) => {
            assert!(missing.contains(&qid("water.hours_since_incident")));
            assert!(!missing.contains(&qid("water.source")));
        }
        other => panic!("expected Incomplete, got {other:?}"),
    }
    assert_eq!(session.status(), SessionStatus::Active);
}

// =============================================================================
// Retraction on visibility change
// =============================================================================

#[test]
fn hiding_a_dependent_retracts_its_field_contributions() {
    let mut session = water_session();
    answer(
        &mut session,
        "water.materials_affected",
        AnswerValue::Selections(vec!["hardwood".into(), "carpet".into()]),
    );
    answer(&mut session, "water.source", AnswerValue::Selection("grey".into()));
    answer(&mut session, "water.hardwood_cupping", AnswerValue::Boolean(true));
    assert!(session.field_map().get(&key("drying.method")).is_some());

    // Dropping hardwood from the selection hides the cupping question
    // and must remove its contributions without orphaned entries.
    answer(
        &mut session,
        "water.materials_affected",
        AnswerValue::Selections(vec!["carpet".into()]),
    );
    assert!(!session.is_visible(&qid("water.hardwood_cupping")));
    assert!(session.field_map().get(&key("drying.method")).is_none());

    // Restoring the selection reveals it again and its retained answer
    // contributes once more.
    answer(
        &mut session,
        "water.materials_affected",
        AnswerValue::Selections(vec!["hardwood".into()]),
    );
    assert!(session.is_visible(&qid("water.hardwood_cupping")));
    assert!(session.field_map().get(&key("drying.method")).is_some());
}

// =============================================================================
// Conflict audit
// =============================================================================

#[test]
fn overwritten_count_equals_contributors_minus_one() {
    let catalogue = QuestionCatalogue::new(
        "test-2",
        vec![
            Question::new(
                "est.rough",
                Tier::ESSENTIAL,
                "Rough estimate?",
                QuestionKind::NumericRange {
                    min: 0.0,
                    max: 1e6,
                    unit: None,
                },
            )
            .with_mapping(MappingRule::Direct {
                target: key("estimate.total"),
            }),
            Question::new(
                "est.detailed",
                Tier::new(2),
                "Detailed estimate?",
                QuestionKind::NumericRange {
                    min: 0.0,
                    max: 1e6,
                    unit: None,
                },
            )
            .with_mapping(MappingRule::Direct {
                target: key("estimate.total"),
            }),
        ],
    )
    .unwrap();

    let context = SessionContext::new("water", "CA", EntitlementTier::Basic);
    let mut session = InterviewSession::start(context, &catalogue, &settings()).unwrap();

    session
        .record_answer(&catalogue, &qid("est.rough"), AnswerValue::Number(1000.0))
        .unwrap();
    session
        .record_answer(&catalogue, &qid("est.detailed"), AnswerValue::Number(1250.0))
        .unwrap();

    let entry = session.field_map().get(&key("estimate.total")).unwrap();
    assert_eq!(entry.value, FieldValue::Number(1250.0));
    assert_eq!(entry.source_question_ids().len(), 2);

    let report = session.quality_report();
    assert_eq!(report.overwritten_fields, vec![key("estimate.total")]);
    assert_eq!(report.total_superseded_writes, 1);
}

// =============================================================================
// Catalogue load rejection
// =============================================================================

#[test]
fn visibility_reference_to_a_later_question_is_rejected_at_load() {
    use drysight::domain::catalogue::Condition;

    let result = QuestionCatalogue::new(
        "test-3",
        vec![
            Question::new("a", Tier::ESSENTIAL, "A?", QuestionKind::Boolean).with_visibility(
                Condition::Equals {
                    question: qid("b"),
                    value: AnswerValue::Boolean(true),
                },
            ),
            Question::new("b", Tier::ESSENTIAL, "B?", QuestionKind::Boolean).with_visibility(
                Condition::Equals {
                    question: qid("a"),
                    value: AnswerValue::Boolean(true),
                },
            ),
        ],
    );

    assert!(matches!(
        result,
        Err(CatalogueError::ForwardVisibilityReference { .. })
    ));
}

// =============================================================================
// Navigation
// =============================================================================

#[test]
fn jump_lands_on_first_unanswered_question_of_the_tier() {
    let mut session = water_session();
    answer(&mut session, "water.source", AnswerValue::Selection("clean".into()));
    answer(&mut session, "water.hours_since_incident", AnswerValue::Hours(4.0));
    answer(&mut session, "water.affected_area_percent", AnswerValue::Number(12.0));
    answer(&mut session, "water.standing_water", AnswerValue::Boolean(true));

    let landed = session.jump(Tier::new(2)).unwrap();
    assert_eq!(landed, Some(qid("water.materials_affected")));
    assert_eq!(session.current_question(), Some(&qid("water.materials_affected")));
}

#[test]
fn back_and_resubmit_is_a_field_map_noop() {
    let mut session = water_session();
    answer(&mut session, "water.source", AnswerValue::Selection("grey".into()));
    answer(&mut session, "water.hours_since_incident", AnswerValue::Hours(10.0));

    let before_fields = session.export().fields;
    let before_progress = session.progress();

    let previous = session.back().unwrap();
    assert_eq!(previous, Some(qid("water.hours_since_incident")));
    answer(&mut session, "water.hours_since_incident", AnswerValue::Hours(10.0));

    assert_eq!(session.export().fields, before_fields);
    assert_eq!(session.progress(), before_progress);
}
