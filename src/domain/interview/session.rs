//! InterviewSession aggregate - owns session progression.
//!
//! The session is exclusively owned by the single operator driving it;
//! every operation is a synchronous, pure computation over in-memory
//! state with no locking and no I/O. The caller persists the session
//! between calls and serializes requests per session.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineSettings;
use crate::domain::catalogue::{
    AnswerLookup, AnswerValue, FieldValue, QuestionCatalogue, SessionContext,
};
use crate::domain::foundation::{
    FieldKey, Percentage, QuestionId, SessionId, SessionStatus, StateMachine, Tier, Timestamp,
};
use crate::domain::generation::{GenerationError, InterviewPlan, QuestionGenerator};
use crate::domain::mapping::{FieldMap, MappingEngine, QualityReport};

use super::classification::{derive_classification, Classification};
use super::errors::InterviewError;

/// One recorded submission. History is append-only for audit; the
/// latest submission per question is the effective answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: QuestionId,
    pub value: AnswerValue,
    pub recorded_at: Timestamp,
}

/// What the flow engine hands back after an answer is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The next visible unanswered question to present.
    Next(QuestionId),
    /// No visible unanswered questions remain.
    Complete,
}

/// Snapshot of the session's outputs for the external report pipeline.
///
/// Values only; every field key is guaranteed to come from the loaded
/// catalogue's target-field universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExport {
    pub catalogue_version: String,
    pub fields: std::collections::BTreeMap<FieldKey, FieldValue>,
    pub classification: Option<Classification>,
}

/// Effective answer view: answers of currently visible questions only.
/// A hidden question keeps its answer in history but stops contributing
/// to conditions, transforms, and classification.
struct EffectiveAnswers<'a> {
    answers: &'a HashMap<QuestionId, AnswerValue>,
    hidden: &'a HashSet<QuestionId>,
}

impl AnswerLookup for EffectiveAnswers<'_> {
    fn answer_value(&self, id: &QuestionId) -> Option<&AnswerValue> {
        if self.hidden.contains(id) {
            None
        } else {
            self.answers.get(id)
        }
    }
}

/// The interview session aggregate root.
///
/// The plan is computed once at start and never reordered; only the
/// visibility of individual questions changes as answers accumulate.
#[derive(Debug, Clone)]
pub struct InterviewSession {
    id: SessionId,
    context: SessionContext,
    plan: InterviewPlan,
    settings: EngineSettings,
    /// Latest answer per question, including hidden questions.
    answers: HashMap<QuestionId, AnswerValue>,
    history: Vec<AnswerRecord>,
    /// Questions whose visibility condition currently evaluates false.
    hidden: HashSet<QuestionId>,
    /// Referenced question -> questions whose visibility reads it.
    visibility_dependents: HashMap<QuestionId, Vec<QuestionId>>,
    /// Referenced question -> questions whose transforms consume it.
    mapping_dependents: HashMap<QuestionId, Vec<QuestionId>>,
    field_map: FieldMap,
    classification: Option<Classification>,
    status: SessionStatus,
    current: Option<QuestionId>,
    progress: Percentage,
    started_at: Timestamp,
    updated_at: Timestamp,
}

impl InterviewSession {
    /// Starts a session: generates the plan, settles initial visibility
    /// against the empty answer set, and positions the cursor on the
    /// first visible question.
    pub fn start(
        context: SessionContext,
        catalogue: &QuestionCatalogue,
        settings: &EngineSettings,
    ) -> Result<Self, GenerationError> {
        let plan = QuestionGenerator::generate(catalogue, &context, settings)?;

        let mut visibility_dependents: HashMap<QuestionId, Vec<QuestionId>> = HashMap::new();
        let mut mapping_dependents: HashMap<QuestionId, Vec<QuestionId>> = HashMap::new();
        for id in plan.ordered_questions() {
            let Some(question) = catalogue.get(id) else {
                continue;
            };
            for referenced in question.visibility_references() {
                visibility_dependents
                    .entry(referenced.clone())
                    .or_default()
                    .push(id.clone());
            }
            for rule in &question.mappings {
                for referenced in rule.referenced_questions() {
                    mapping_dependents
                        .entry(referenced.clone())
                        .or_default()
                        .push(id.clone());
                }
            }
        }

        let now = Timestamp::now();
        let mut session = Self {
            id: SessionId::new(),
            context,
            plan,
            settings: settings.clone(),
            answers: HashMap::new(),
            history: Vec::new(),
            hidden: HashSet::new(),
            visibility_dependents,
            mapping_dependents,
            field_map: FieldMap::new(),
            classification: None,
            status: SessionStatus::Active,
            current: None,
            progress: Percentage::ZERO,
            started_at: now,
            updated_at: now,
        };
        session.settle_initial_visibility(catalogue);
        session.recompute_progress();
        session.advance();
        debug!(
            session = %session.id,
            questions = session.plan.ordered_questions().len(),
            "session started"
        );
        Ok(session)
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn plan(&self) -> &InterviewPlan {
        &self.plan
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Question the cursor currently points at, if any remain.
    pub fn current_question(&self) -> Option<&QuestionId> {
        self.current.as_ref()
    }

    /// Answered-visible over total-visible, recomputed after every
    /// answer because visibility can shrink or grow the denominator.
    pub fn progress(&self) -> Percentage {
        self.progress
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    /// Latest answer for a question, hidden or not.
    pub fn answer(&self, id: &QuestionId) -> Option<&AnswerValue> {
        self.answers.get(id)
    }

    /// Append-only submission history, oldest first.
    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    pub fn is_visible(&self, id: &QuestionId) -> bool {
        self.plan.contains(id) && !self.hidden.contains(id)
    }

    /// Plan questions currently visible, in plan order.
    pub fn visible_questions(&self) -> Vec<&QuestionId> {
        self.plan
            .ordered_questions()
            .iter()
            .filter(|id| !self.hidden.contains(*id))
            .collect()
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    // ───────────────────────────────────────────────────────────────
    // Operations
    // ───────────────────────────────────────────────────────────────

    /// Records an answer and cascades its effects: field mapping,
    /// dependent visibility, progress, and classification.
    ///
    /// Re-answering a question supersedes the prior answer; the history
    /// keeps every submission. Validation fails closed, so a malformed
    /// value is never stored.
    pub fn record_answer(
        &mut self,
        catalogue: &QuestionCatalogue,
        question_id: &QuestionId,
        value: AnswerValue,
    ) -> Result<Advance, InterviewError> {
        self.require_active()?;
        if !self.plan.contains(question_id) {
            return Err(InterviewError::UnknownQuestion {
                question: question_id.clone(),
            });
        }
        let question = catalogue
            .get(question_id)
            .ok_or_else(|| InterviewError::UnknownQuestion {
                question: question_id.clone(),
            })?;
        if self.hidden.contains(question_id) {
            return Err(InterviewError::QuestionNotVisible {
                question: question_id.clone(),
            });
        }
        question
            .kind
            .validate(&value)
            .map_err(|source| InterviewError::TypeMismatch {
                question: question_id.clone(),
                source,
            })?;

        let recorded_at = Timestamp::now();
        self.answers.insert(question_id.clone(), value.clone());
        self.history.push(AnswerRecord {
            question: question_id.clone(),
            value,
            recorded_at,
        });
        self.updated_at = recorded_at;

        let flipped = self.reevaluate_visibility(catalogue, question_id);
        self.refresh_mappings(catalogue, question_id, &flipped);
        self.recompute_progress();
        if self.touches_classification(catalogue, question_id, &flipped) {
            self.recompute_classification(catalogue);
        }
        debug!(
            session = %self.id,
            question = %question_id,
            flipped = flipped.len(),
            progress = self.progress.value(),
            "answer recorded"
        );
        Ok(self.advance())
    }

    /// Moves the cursor to the previous visible question in plan order.
    ///
    /// Answers ahead of the new cursor are untouched, so navigating
    /// back and forward without changing anything leaves the field map
    /// alone. Returns the question now under the cursor, or `None` when
    /// already at the start.
    pub fn back(&mut self) -> Result<Option<QuestionId>, InterviewError> {
        self.require_active()?;
        let ordered = self.plan.ordered_questions();
        let end = self
            .current
            .as_ref()
            .and_then(|c| self.plan.position(c))
            .unwrap_or(ordered.len());
        let previous = ordered[..end]
            .iter()
            .rev()
            .find(|id| !self.hidden.contains(*id))
            .cloned();
        if let Some(id) = &previous {
            self.current = Some(id.clone());
        }
        Ok(previous)
    }

    /// Moves the cursor to the first visible unanswered question of
    /// `tier`, falling through to later tiers when that tier is fully
    /// answered. Fails with `OutOfOrder` while any visible question of
    /// an earlier tier is unanswered.
    pub fn jump(&mut self, tier: Tier) -> Result<Option<QuestionId>, InterviewError> {
        self.require_active()?;
        let missing: Vec<QuestionId> = self
            .plan
            .tiers()
            .iter()
            .filter(|breakdown| breakdown.tier < tier)
            .flat_map(|breakdown| breakdown.question_ids.iter())
            .filter(|id| !self.hidden.contains(*id) && !self.answers.contains_key(*id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(InterviewError::OutOfOrder { tier, missing });
        }

        let target = self
            .plan
            .tiers()
            .iter()
            .filter(|breakdown| breakdown.tier >= tier)
            .flat_map(|breakdown| breakdown.question_ids.iter())
            .find(|id| !self.hidden.contains(*id) && !self.answers.contains_key(*id))
            .cloned();
        self.current = target.clone();
        Ok(target)
    }

    /// Transitions `Active -> Completed`. Fails with `Incomplete` while
    /// any visible essential (tier 1) question is unanswered.
    pub fn complete(&mut self) -> Result<(), InterviewError> {
        self.require_active()?;
        let missing: Vec<QuestionId> = self
            .plan
            .tiers()
            .iter()
            .filter(|breakdown| breakdown.tier.is_essential())
            .flat_map(|breakdown| breakdown.question_ids.iter())
            .filter(|id| !self.hidden.contains(*id) && !self.answers.contains_key(*id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(InterviewError::Incomplete { missing });
        }
        self.transition(SessionStatus::Completed)
    }

    /// Transitions `Active -> Abandoned`. The field map and history are
    /// retained for whatever the caller wants to salvage.
    pub fn abandon(&mut self) -> Result<(), InterviewError> {
        self.require_active()?;
        self.transition(SessionStatus::Abandoned)
    }

    /// Snapshot of the outputs at any checkpoint, partial or final.
    pub fn export(&self) -> SessionExport {
        SessionExport {
            catalogue_version: self.plan.catalogue_version().to_string(),
            fields: self.field_map.export(),
            classification: self.classification,
        }
    }

    /// Quality aggregate over the current field map, using the
    /// configured low-confidence threshold.
    pub fn quality_report(&self) -> QualityReport {
        QualityReport::from_field_map(&self.field_map, self.settings.low_confidence_threshold)
    }

    // ───────────────────────────────────────────────────────────────
    // Internals
    // ───────────────────────────────────────────────────────────────

    fn require_active(&self) -> Result<(), InterviewError> {
        if self.status.is_mutable() {
            Ok(())
        } else {
            Err(InterviewError::SessionNotActive {
                status: self.status,
            })
        }
    }

    fn transition(&mut self, target: SessionStatus) -> Result<(), InterviewError> {
        match self.status.transition_to(target) {
            Ok(next) => {
                self.status = next;
                self.updated_at = Timestamp::now();
                self.current = None;
                Ok(())
            }
            Err(_) => Err(InterviewError::SessionNotActive {
                status: self.status,
            }),
        }
    }

    /// Evaluates every visibility condition against the empty answer
    /// set. Conditions may reference only earlier questions, so one
    /// forward pass in plan order settles.
    fn settle_initial_visibility(&mut self, catalogue: &QuestionCatalogue) {
        for id in self.plan.ordered_questions().to_vec() {
            let Some(question) = catalogue.get(&id) else {
                continue;
            };
            if let Some(condition) = &question.visibility {
                let visible = condition.evaluate(&EffectiveAnswers {
                    answers: &self.answers,
                    hidden: &self.hidden,
                });
                if !visible {
                    self.hidden.insert(id);
                }
            }
        }
    }

    /// Re-evaluates visibility for the transitive visibility dependents
    /// of `seed`, in plan order. Lazy: untouched questions are never
    /// re-checked. Returns the questions whose visibility flipped.
    fn reevaluate_visibility(
        &mut self,
        catalogue: &QuestionCatalogue,
        seed: &QuestionId,
    ) -> Vec<QuestionId> {
        let mut affected: BTreeSet<QuestionId> = BTreeSet::new();
        let mut frontier = vec![seed.clone()];
        while let Some(id) = frontier.pop() {
            if let Some(dependents) = self.visibility_dependents.get(&id) {
                for dependent in dependents {
                    if affected.insert(dependent.clone()) {
                        frontier.push(dependent.clone());
                    }
                }
            }
        }

        let mut ordered: Vec<QuestionId> = affected.into_iter().collect();
        ordered.sort_by_key(|id| self.plan.position(id).unwrap_or(usize::MAX));

        let mut flipped = Vec::new();
        for id in ordered {
            let Some(question) = catalogue.get(&id) else {
                continue;
            };
            let visible = match &question.visibility {
                None => true,
                Some(condition) => condition.evaluate(&EffectiveAnswers {
                    answers: &self.answers,
                    hidden: &self.hidden,
                }),
            };
            let was_hidden = self.hidden.contains(&id);
            if visible && was_hidden {
                self.hidden.remove(&id);
                flipped.push(id);
            } else if !visible && !was_hidden {
                self.hidden.insert(id.clone());
                flipped.push(id);
            }
        }
        flipped
    }

    /// Re-derives field contributions for every question whose output
    /// could have changed: the answered question itself, answered
    /// questions whose transforms consume a changed answer, and
    /// questions whose visibility just flipped. Each is retracted and,
    /// if visible with a retained answer, re-applied, so a question
    /// that became invisible loses its contributions entirely and one
    /// that became visible again contributes from its retained answer.
    fn refresh_mappings(
        &mut self,
        catalogue: &QuestionCatalogue,
        answered: &QuestionId,
        flipped: &[QuestionId],
    ) {
        let mut refresh: BTreeSet<QuestionId> = BTreeSet::new();
        refresh.insert(answered.clone());
        for changed in std::iter::once(answered).chain(flipped.iter()) {
            if let Some(dependents) = self.mapping_dependents.get(changed) {
                for dependent in dependents {
                    if self.answers.contains_key(dependent) {
                        refresh.insert(dependent.clone());
                    }
                }
            }
        }
        for id in flipped {
            refresh.insert(id.clone());
        }

        let mut ordered: Vec<QuestionId> = refresh.into_iter().collect();
        ordered.sort_by_key(|id| self.plan.position(id).unwrap_or(usize::MAX));

        for id in ordered {
            self.field_map.retract_question(&id);
            if self.hidden.contains(&id) {
                continue;
            }
            let Some(answer) = self.answers.get(&id) else {
                continue;
            };
            let Some(question) = catalogue.get(&id) else {
                continue;
            };
            let effective = EffectiveAnswers {
                answers: &self.answers,
                hidden: &self.hidden,
            };
            MappingEngine::apply(question, answer, &effective, &mut self.field_map);
        }
    }

    fn recompute_progress(&mut self) {
        let visible_total = self
            .plan
            .ordered_questions()
            .iter()
            .filter(|id| !self.hidden.contains(*id))
            .count();
        let visible_answered = self
            .plan
            .ordered_questions()
            .iter()
            .filter(|id| !self.hidden.contains(*id) && self.answers.contains_key(*id))
            .count();
        self.progress = Percentage::from_ratio(visible_answered, visible_total);
    }

    fn touches_classification(
        &self,
        catalogue: &QuestionCatalogue,
        answered: &QuestionId,
        flipped: &[QuestionId],
    ) -> bool {
        std::iter::once(answered)
            .chain(flipped.iter())
            .any(|id| {
                catalogue
                    .get(id)
                    .is_some_and(|q| q.classification_role.is_some())
            })
    }

    fn recompute_classification(&mut self, catalogue: &QuestionCatalogue) {
        let effective = EffectiveAnswers {
            answers: &self.answers,
            hidden: &self.hidden,
        };
        let questions = self
            .plan
            .ordered_questions()
            .iter()
            .filter_map(|id| catalogue.get(id));
        self.classification =
            derive_classification(questions, &effective, self.settings.escalation_hours);
    }

    /// Positions the cursor on the first visible unanswered question.
    fn advance(&mut self) -> Advance {
        let next = self
            .plan
            .ordered_questions()
            .iter()
            .find(|id| !self.hidden.contains(*id) && !self.answers.contains_key(*id))
            .cloned();
        match next {
            Some(id) => {
                self.current = Some(id.clone());
                Advance::Next(id)
            }
            None => {
                self.current = None;
                Advance::Complete
            }
        }
    }
}
