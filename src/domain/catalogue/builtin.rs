//! Built-in water-damage catalogue.
//!
//! The default question set shipped with the engine, organized in three
//! tiers: essential scoping (tier 1), affected-materials detail (tier 2),
//! and advanced/entitlement-gated content (tier 3). Loaded lazily and
//! validated once; callers and tests can rely on it without running their
//! own loader.

use once_cell::sync::Lazy;

use crate::domain::foundation::{FieldKey, QuestionId, Tier};

use super::{
    Applicability, AnswerValue, ClassificationRole, Condition, EntitlementTier, FieldValue,
    MappingRule, Question, QuestionCatalogue, QuestionKind, Transform,
};

static WATER_DAMAGE: Lazy<QuestionCatalogue> = Lazy::new(|| {
    QuestionCatalogue::new("water-2024.1", water_damage_questions())
        .expect("built-in water-damage catalogue must validate")
});

/// Returns the built-in water-damage catalogue.
pub fn water_damage() -> &'static QuestionCatalogue {
    &WATER_DAMAGE
}

fn water_damage_questions() -> Vec<Question> {
    vec![
        // ── Tier 1: essential scoping ──────────────────────────────
        Question::new(
            "water.source",
            Tier::ESSENTIAL,
            "What was the source of the water intrusion?",
            QuestionKind::SingleSelect {
                options: vec!["clean".into(), "grey".into(), "black".into()],
            },
        )
        .with_applicability(Applicability::JobTypeIn {
            job_types: vec!["water".into()],
        })
        .with_classification_role(ClassificationRole::ContaminationSource)
        .with_mapping(MappingRule::Direct {
            target: FieldKey::new("water.source"),
        })
        .with_mapping(MappingRule::Transformed {
            target: FieldKey::new("water.category_label"),
            transform: Transform::Lookup {
                table: [
                    ("clean".to_string(), FieldValue::Text("Category 1".into())),
                    ("grey".to_string(), FieldValue::Text("Category 2".into())),
                    ("black".to_string(), FieldValue::Text("Category 3".into())),
                ]
                .into_iter()
                .collect(),
                default: None,
            },
        })
        .with_mapping(MappingRule::Static {
            target: FieldKey::new("response.priority"),
            when: AnswerValue::Selection("black".into()),
            assign: FieldValue::Text("emergency".into()),
        })
        .with_citation("IICRC S500 10.4.1"),
        Question::new(
            "water.hours_since_incident",
            Tier::ESSENTIAL,
            "How many hours have elapsed since the incident?",
            QuestionKind::DurationHours,
        )
        .with_applicability(Applicability::JobTypeIn {
            job_types: vec!["water".into()],
        })
        .with_classification_role(ClassificationRole::HoursSinceIncident)
        .with_mapping(MappingRule::Direct {
            target: FieldKey::new("incident.hours_elapsed"),
        })
        .with_citation("IICRC S500 10.4.3"),
        Question::new(
            "water.affected_area_percent",
            Tier::ESSENTIAL,
            "What percentage of the structure is affected?",
            QuestionKind::NumericRange {
                min: 0.0,
                max: 100.0,
                unit: Some("%".into()),
            },
        )
        .with_classification_role(ClassificationRole::AffectedAreaPercent)
        .with_mapping(MappingRule::Direct {
            target: FieldKey::new("area.percent_affected"),
        })
        .with_mapping(MappingRule::Transformed {
            target: FieldKey::new("area.size_class"),
            transform: Transform::BucketNumber {
                bounds: vec![5.0, 40.0],
                labels: vec!["minimal".into(), "moderate".into(), "extensive".into()],
            },
        }),
        Question::new(
            "water.standing_water",
            Tier::ESSENTIAL,
            "Is standing water present?",
            QuestionKind::Boolean,
        )
        .with_mapping(MappingRule::Direct {
            target: FieldKey::new("water.standing_present"),
        })
        .with_mapping(MappingRule::Static {
            target: FieldKey::new("extraction.required"),
            when: AnswerValue::Boolean(true),
            assign: FieldValue::Boolean(true),
        }),
        // ── Tier 2: affected-materials detail ──────────────────────
        Question::new(
            "water.materials_affected",
            Tier::new(2),
            "Which materials are affected?",
            QuestionKind::MultiSelect {
                options: vec![
                    "carpet".into(),
                    "drywall".into(),
                    "hardwood".into(),
                    "plaster".into(),
                    "insulation".into(),
                ],
            },
        )
        .with_classification_role(ClassificationRole::MaterialsAffected)
        .with_mapping(MappingRule::MultiField {
            parts: vec![
                MappingRule::Direct {
                    target: FieldKey::new("materials.list"),
                },
                MappingRule::Transformed {
                    target: FieldKey::new("materials.count"),
                    transform: Transform::CountSelections,
                },
            ],
        }),
        Question::new(
            "water.hardwood_cupping",
            Tier::new(2),
            "Is the hardwood flooring cupping or buckling?",
            QuestionKind::Boolean,
        )
        .with_visibility(Condition::Includes {
            question: QuestionId::new("water.materials_affected"),
            choice: "hardwood".into(),
        })
        .with_mapping(MappingRule::Transformed {
            target: FieldKey::new("drying.method"),
            transform: Transform::CombineLookup {
                other: QuestionId::new("water.source"),
                table: [
                    ("true|clean".to_string(), FieldValue::Text("panel drying".into())),
                    ("true|grey".to_string(), FieldValue::Text("remove and replace".into())),
                    ("true|black".to_string(), FieldValue::Text("remove and replace".into())),
                    ("false|clean".to_string(), FieldValue::Text("top-down drying".into())),
                ]
                .into_iter()
                .collect(),
                default: Some(FieldValue::Text("assess on site".into())),
            },
        }),
        Question::new(
            "water.odor_present",
            Tier::new(2),
            "Is there a noticeable odor?",
            QuestionKind::Boolean,
        )
        .with_visibility(Condition::Equals {
            question: QuestionId::new("water.standing_water"),
            value: AnswerValue::Boolean(true),
        })
        .with_mapping(MappingRule::Static {
            target: FieldKey::new("iaq.review_flag"),
            when: AnswerValue::Boolean(true),
            assign: FieldValue::Boolean(true),
        }),
        // ── Tier 3: advanced / entitlement-gated ───────────────────
        Question::new(
            "water.dehumidifier_count",
            Tier::new(3),
            "How many dehumidifiers are staged on site?",
            QuestionKind::NumericRange {
                min: 0.0,
                max: 50.0,
                unit: None,
            },
        )
        .with_visibility(Condition::AtLeast {
            question: QuestionId::new("water.affected_area_percent"),
            threshold: 10.0,
        })
        .with_mapping(MappingRule::Direct {
            target: FieldKey::new("equipment.dehumidifiers"),
        }),
        Question::new(
            "water.pre_existing_damage",
            Tier::new(3),
            "Describe any pre-existing damage observed.",
            QuestionKind::FreeText,
        )
        .with_applicability(Applicability::MinEntitlement {
            tier: EntitlementTier::Pro,
        })
        .with_mapping(MappingRule::Direct {
            target: FieldKey::new("notes.pre_existing"),
        }),
    ]
}
