// src/models/assessment.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::assessment::{
    Archetype, AssessmentResult, AssessmentSession, IgnoreReason, OptionId, QuestionId,
};
use crate::models::question::PublicQuestion;

/// Payload handed to the result store once an assessment is finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRecord {
    /// Question ids in the order they were presented.
    pub answered_order: Vec<QuestionId>,
    pub answers: BTreeMap<QuestionId, OptionId>,
    pub archetype: Archetype,
    /// Raw scores in archetype declaration order.
    pub score_vector: [i64; Archetype::COUNT],
    pub finished_at: DateTime<Utc>,
}

impl From<&AssessmentResult> for AssessmentRecord {
    fn from(result: &AssessmentResult) -> Self {
        Self {
            answered_order: result.answered_order.clone(),
            answers: result.answers.clone(),
            archetype: result.primary,
            score_vector: result.scores.as_array(),
            finished_at: result.finished_at,
        }
    }
}

/// Stored alongside the assessment row as `routing_metadata`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RoutingMetadata {
    pub answered_order: Vec<QuestionId>,
    pub finished_at: DateTime<Utc>,
}

/// Represents the 'gita_assessments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredAssessment {
    pub id: i64,
    pub user_id: String,
    pub archetype: String,
    pub score_vector: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

/// DTO for answering the current question.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: QuestionId,
    pub option_id: OptionId,
}

/// What the client sees of a live session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    /// Number of answered questions.
    pub progress: usize,
    pub max_questions: usize,
    pub finished: bool,
    pub current_question: Option<PublicQuestion>,
    pub result: Option<AssessmentResult>,
}

impl SessionView {
    pub fn new(session_id: Uuid, session: &AssessmentSession) -> Self {
        Self {
            session_id,
            progress: session.progress(),
            max_questions: session.settings().max_questions.min(session.pool_size()),
            finished: session.is_finished(),
            current_question: session.current_question().map(PublicQuestion::from),
            result: session.result().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    /// False when the answer was ignored and nothing changed.
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_reason: Option<IgnoreReason>,
    #[serde(flatten)]
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub saved: bool,
    pub result: AssessmentResult,
}
