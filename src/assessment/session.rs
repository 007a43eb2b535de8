// src/assessment/session.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::archetype::{Archetype, ScoreVector};
use super::question::{OptionId, Question, QuestionId, select_next_question};
use crate::config::{DEFAULT_CONFIDENCE_GAP, DEFAULT_MAX_QUESTIONS};

/// Stopping-rule parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Answer count that always ends the assessment.
    pub max_questions: usize,
    /// Leader-minus-runner-up percentage gap that ends it early.
    pub confidence_gap: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
            confidence_gap: DEFAULT_CONFIDENCE_GAP,
        }
    }
}

/// Final, frozen outcome of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub primary: Archetype,
    pub percentages: BTreeMap<Archetype, i64>,
    pub scores: ScoreVector,
    pub answered_order: Vec<QuestionId>,
    pub answers: BTreeMap<QuestionId, OptionId>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    InProgress { current: QuestionId },
    Finished(AssessmentResult),
}

/// Why an answer was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    AlreadyFinished,
    NotCurrentQuestion,
    UnknownOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Answer applied; this question is now current.
    Next(QuestionId),
    /// Answer applied and the stopping rule fired.
    Finished,
    /// Nothing changed.
    Ignored(IgnoreReason),
}

/// One user's attempt at the assessment.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    pool: Vec<Question>,
    answered_order: Vec<QuestionId>,
    answers: BTreeMap<QuestionId, OptionId>,
    scores: ScoreVector,
    settings: EngineSettings,
    state: SessionState,
}

impl AssessmentSession {
    /// Starts a session over `pool`. Questions without options are dropped
    /// since they can never be answered. An empty pool yields a session that
    /// is already finished.
    pub fn new(mut pool: Vec<Question>, settings: EngineSettings) -> Self {
        pool.retain(|q| {
            if q.options.is_empty() {
                tracing::warn!("Skipping question {} with no options", q.id);
                false
            } else {
                true
            }
        });

        let first = select_next_question(&pool).map(|q| q.id);

        let mut session = Self {
            pool,
            answered_order: Vec::new(),
            answers: BTreeMap::new(),
            scores: ScoreVector::zero(),
            settings,
            state: SessionState::InProgress { current: 0 },
        };

        match first {
            Some(id) => session.state = SessionState::InProgress { current: id },
            None => session.finish(),
        }

        session
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of answered questions.
    pub fn progress(&self) -> usize {
        self.answered_order.len()
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished(_))
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::InProgress { current } => self.question(current),
            SessionState::Finished(_) => None,
        }
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        match &self.state {
            SessionState::Finished(result) => Some(result),
            SessionState::InProgress { .. } => None,
        }
    }

    pub fn scores(&self) -> ScoreVector {
        self.scores
    }

    pub fn answered_order(&self) -> &[QuestionId] {
        &self.answered_order
    }

    pub fn answers(&self) -> &BTreeMap<QuestionId, OptionId> {
        &self.answers
    }

    fn question(&self, id: QuestionId) -> Option<&Question> {
        self.pool.iter().find(|q| q.id == id)
    }

    /// Applies one answer to the current question.
    ///
    /// Answers for a finished session, for a question that is not current, or
    /// naming an option the current question lacks leave the session untouched.
    pub fn record_answer(&mut self, question_id: QuestionId, option_id: OptionId) -> AnswerOutcome {
        let current = match self.state {
            SessionState::InProgress { current } => current,
            SessionState::Finished(_) => return AnswerOutcome::Ignored(IgnoreReason::AlreadyFinished),
        };
        if question_id != current {
            return AnswerOutcome::Ignored(IgnoreReason::NotCurrentQuestion);
        }

        let contribution = match self.question(current).and_then(|q| q.option(option_id)) {
            Some(option) => option.scores,
            None => return AnswerOutcome::Ignored(IgnoreReason::UnknownOption),
        };

        self.answered_order.push(question_id);
        self.answers.insert(question_id, option_id);
        self.scores += contribution;

        let next = select_next_question(
            self.pool
                .iter()
                .filter(|q| !self.answered_order.contains(&q.id)),
        )
        .map(|q| q.id);

        match next {
            Some(id) if !self.should_stop() => {
                self.state = SessionState::InProgress { current: id };
                AnswerOutcome::Next(id)
            }
            _ => {
                self.finish();
                AnswerOutcome::Finished
            }
        }
    }

    fn should_stop(&self) -> bool {
        self.progress() >= self.settings.max_questions
            || self.scores.confidence_gap() >= self.settings.confidence_gap
    }

    /// Ends the session and returns its result.
    ///
    /// A finished session returns the result it already holds; nothing is
    /// recomputed. An in-progress session is finished from its current state.
    pub fn finalize(&mut self) -> &AssessmentResult {
        if !self.is_finished() {
            self.finish();
        }
        match &self.state {
            SessionState::Finished(result) => result,
            SessionState::InProgress { .. } => unreachable!("finish always leaves the session finished"),
        }
    }

    fn finish(&mut self) {
        let result = AssessmentResult {
            primary: self.scores.primary(),
            percentages: self.scores.percentages(),
            scores: self.scores,
            answered_order: self.answered_order.clone(),
            answers: self.answers.clone(),
            finished_at: Utc::now(),
        };
        tracing::debug!(
            "Assessment finished after {} answers, primary {}",
            result.answered_order.len(),
            result.primary
        );
        self.state = SessionState::Finished(result);
    }
}
