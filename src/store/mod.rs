// src/store/mod.rs

//! Seams to the outside world: where questions come from, where finished
//! assessments go, and the guidance content read after an assessment.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    assessment::{Archetype, Question, QuestionId, ScoreVector},
    error::AppError,
    models::{
        assessment::{AssessmentRecord, StoredAssessment},
        guidance::{ArchetypeProfile, ProblemArea, SelectedProblemArea},
    },
};

/// A question to be added to the bank.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub content: String,
    pub options: Vec<NewOption>,
}

#[derive(Debug, Clone)]
pub struct NewOption {
    pub label: String,
    pub scores: ScoreVector,
}

/// Question Bank Provider.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Every question with its options. Order carries no meaning for selection.
    async fn load_pool(&self) -> Result<Vec<Question>, AppError>;

    async fn create_question(&self, question: NewQuestion) -> Result<QuestionId, AppError>;

    /// Returns false when no such question exists.
    async fn delete_question(&self, id: QuestionId) -> Result<bool, AppError>;
}

/// Result Sink.
///
/// Implementations keep at most one current archetype per user, so repeating
/// a save for the same user is safe.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn save(&self, user_id: &str, record: &AssessmentRecord) -> Result<(), AppError>;

    async fn latest_for_user(&self, user_id: &str) -> Result<Option<StoredAssessment>, AppError>;
}

/// Archetype profiles and problem areas.
#[async_trait]
pub trait GuidanceStore: Send + Sync {
    /// All known profiles in archetype declaration order.
    async fn archetype_profiles(&self) -> Result<Vec<ArchetypeProfile>, AppError>;

    async fn archetype_profile(&self, archetype: Archetype) -> Result<Option<ArchetypeProfile>, AppError>;

    /// The catalog users choose from, ordered by label.
    async fn problem_areas(&self) -> Result<Vec<ProblemArea>, AppError>;

    /// The user's current selection, ordered by label.
    async fn problem_areas_for_user(&self, user_id: &str) -> Result<Vec<SelectedProblemArea>, AppError>;

    /// Replaces the user's selection with `ids`, which must be distinct.
    /// Fails with `BadRequest` and changes nothing if any id is not in the catalog.
    async fn replace_problem_areas(
        &self,
        user_id: &str,
        ids: &[String],
        notes: Option<&str>,
    ) -> Result<(), AppError>;
}
