// src/store/memory.rs

//! Process-local stores for tests and running without a database.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{AssessmentStore, GuidanceStore, NewQuestion, QuestionBank};
use crate::{
    assessment::{AnswerOption, Archetype, Question, QuestionId},
    error::AppError,
    models::{
        assessment::{AssessmentRecord, StoredAssessment},
        guidance::{ArchetypeProfile, ProblemArea, SelectedProblemArea},
    },
};

#[derive(Default)]
pub struct InMemoryQuestionBank {
    questions: Mutex<Vec<Question>>,
    next_id: AtomicI64,
}

impl InMemoryQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the bank with ready-made questions, ids included.
    pub fn with_questions(questions: Vec<Question>) -> Self {
        let max_id = questions
            .iter()
            .flat_map(|q| std::iter::once(q.id).chain(q.options.iter().map(|o| o.id)))
            .max()
            .unwrap_or(0);
        Self {
            questions: Mutex::new(questions),
            next_id: AtomicI64::new(max_id),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl QuestionBank for InMemoryQuestionBank {
    async fn load_pool(&self) -> Result<Vec<Question>, AppError> {
        Ok(self.questions.lock().await.clone())
    }

    async fn create_question(&self, question: NewQuestion) -> Result<QuestionId, AppError> {
        let id = self.allocate_id();
        let options = question
            .options
            .into_iter()
            .map(|o| AnswerOption {
                id: self.allocate_id(),
                label: o.label,
                scores: o.scores,
            })
            .collect();

        self.questions.lock().await.push(Question {
            id,
            content: question.content,
            options,
        });
        Ok(id)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<bool, AppError> {
        let mut questions = self.questions.lock().await;
        let before = questions.len();
        questions.retain(|q| q.id != id);
        Ok(questions.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryAssessmentStore {
    records: Mutex<Vec<StoredAssessment>>,
}

impl InMemoryAssessmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, oldest first.
    pub async fn saved(&self) -> Vec<StoredAssessment> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl AssessmentStore for InMemoryAssessmentStore {
    async fn save(&self, user_id: &str, record: &AssessmentRecord) -> Result<(), AppError> {
        let mut records = self.records.lock().await;
        let id = records.len() as i64 + 1;
        records.push(StoredAssessment {
            id,
            user_id: user_id.to_string(),
            archetype: record.archetype.to_string(),
            score_vector: record.score_vector.to_vec(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn latest_for_user(&self, user_id: &str) -> Result<Option<StoredAssessment>, AppError> {
        let records = self.records.lock().await;
        Ok(records.iter().rev().find(|r| r.user_id == user_id).cloned())
    }
}

#[derive(Debug, Clone)]
struct Selection {
    user_id: String,
    problem_area_id: String,
    notes: Option<String>,
    created_at: chrono::DateTime<Utc>,
}

/// Fixed profiles and catalog; user selections live in memory.
#[derive(Default)]
pub struct InMemoryGuidanceStore {
    profiles: Vec<ArchetypeProfile>,
    problem_areas: Vec<ProblemArea>,
    selections: Mutex<Vec<Selection>>,
}

impl InMemoryGuidanceStore {
    pub fn new(mut profiles: Vec<ArchetypeProfile>, mut problem_areas: Vec<ProblemArea>) -> Self {
        profiles.sort_by_key(|p| p.archetype);
        problem_areas.sort_by(|a, b| a.label.cmp(&b.label));
        Self {
            profiles,
            problem_areas,
            selections: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GuidanceStore for InMemoryGuidanceStore {
    async fn archetype_profiles(&self) -> Result<Vec<ArchetypeProfile>, AppError> {
        Ok(self.profiles.clone())
    }

    async fn archetype_profile(&self, archetype: Archetype) -> Result<Option<ArchetypeProfile>, AppError> {
        Ok(self.profiles.iter().find(|p| p.archetype == archetype).cloned())
    }

    async fn problem_areas(&self) -> Result<Vec<ProblemArea>, AppError> {
        Ok(self.problem_areas.clone())
    }

    async fn problem_areas_for_user(&self, user_id: &str) -> Result<Vec<SelectedProblemArea>, AppError> {
        let selections = self.selections.lock().await;
        // Catalog order is label order
        let selected = self
            .problem_areas
            .iter()
            .filter_map(|area| {
                let selection = selections
                    .iter()
                    .find(|s| s.user_id == user_id && s.problem_area_id == area.id)?;
                Some(SelectedProblemArea {
                    id: area.id.clone(),
                    label: area.label.clone(),
                    description: area.description.clone(),
                    notes: selection.notes.clone(),
                    created_at: selection.created_at,
                })
            })
            .collect();
        Ok(selected)
    }

    async fn replace_problem_areas(
        &self,
        user_id: &str,
        ids: &[String],
        notes: Option<&str>,
    ) -> Result<(), AppError> {
        if let Some(unknown) = ids
            .iter()
            .find(|id| !self.problem_areas.iter().any(|area| &area.id == *id))
        {
            tracing::debug!("Unknown problem area {:?}", unknown);
            return Err(AppError::BadRequest("Unknown problem area".to_string()));
        }

        let mut selections = self.selections.lock().await;
        selections.retain(|s| s.user_id != user_id);
        let now = Utc::now();
        selections.extend(ids.iter().map(|id| Selection {
            user_id: user_id.to_string(),
            problem_area_id: id.clone(),
            notes: notes.map(str::to_string),
            created_at: now,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{Archetype, ScoreVector};
    use crate::store::NewOption;

    #[tokio::test]
    async fn test_created_questions_get_fresh_ids() {
        let bank = InMemoryQuestionBank::with_questions(vec![Question {
            id: 5,
            content: "Seeded".to_string(),
            options: vec![AnswerOption {
                id: 9,
                label: "Only".to_string(),
                scores: ScoreVector::zero(),
            }],
        }]);

        let id = bank
            .create_question(NewQuestion {
                content: "New".to_string(),
                options: vec![NewOption {
                    label: "A".to_string(),
                    scores: ScoreVector::new([1, 0, 0, 0, 0, 0, 0]),
                }],
            })
            .await
            .unwrap();

        assert_eq!(id, 10);
        let pool = bank.load_pool().await.unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[1].options[0].id, 11);

        assert!(bank.delete_question(5).await.unwrap());
        assert!(!bank.delete_question(5).await.unwrap());
    }

    #[tokio::test]
    async fn test_latest_is_most_recent_for_user() {
        let store = InMemoryAssessmentStore::new();
        let mut record = AssessmentRecord {
            answered_order: vec![1],
            answers: [(1, 10)].into_iter().collect(),
            archetype: Archetype::Karna,
            score_vector: [0, 2, 0, 0, 0, 0, 0],
            finished_at: Utc::now(),
        };

        store.save("user-a", &record).await.unwrap();
        record.archetype = Archetype::Bhishma;
        store.save("user-a", &record).await.unwrap();
        store.save("user-b", &record).await.unwrap();

        let latest = store.latest_for_user("user-a").await.unwrap().unwrap();
        assert_eq!(latest.archetype, "Bhishma");
        assert!(store.latest_for_user("user-c").await.unwrap().is_none());
    }

    fn area(id: &str, label: &str) -> ProblemArea {
        ProblemArea {
            id: id.to_string(),
            label: label.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_replacing_problem_areas_drops_the_old_selection() {
        let store = InMemoryGuidanceStore::new(
            Vec::new(),
            vec![area("grief", "Grief"), area("anger", "Anger"), area("career", "Career")],
        );

        store
            .replace_problem_areas("user-a", &["grief".to_string(), "anger".to_string()], Some("Since spring"))
            .await
            .unwrap();
        store
            .replace_problem_areas("user-b", &["career".to_string()], None)
            .await
            .unwrap();
        store
            .replace_problem_areas("user-a", &["career".to_string()], None)
            .await
            .unwrap();

        let selected = store.problem_areas_for_user("user-a").await.unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "career");
        assert_eq!(selected[0].notes, None);
        assert_eq!(store.problem_areas_for_user("user-b").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_problem_area_changes_nothing() {
        let store = InMemoryGuidanceStore::new(Vec::new(), vec![area("anger", "Anger")]);
        store
            .replace_problem_areas("user-a", &["anger".to_string()], None)
            .await
            .unwrap();

        let result = store
            .replace_problem_areas("user-a", &["anger".to_string(), "boredom".to_string()], None)
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(store.problem_areas_for_user("user-a").await.unwrap()[0].id, "anger");
    }

    #[tokio::test]
    async fn test_profiles_come_back_in_declaration_order() {
        let store = InMemoryGuidanceStore::new(
            vec![
                ArchetypeProfile::new(Archetype::Duryodhana, "The ambitious rival."),
                ArchetypeProfile::new(Archetype::Karna, "The loyal outsider."),
            ],
            Vec::new(),
        );

        let profiles = store.archetype_profiles().await.unwrap();
        assert_eq!(profiles[0].archetype, Archetype::Karna);
        assert!(store.archetype_profile(Archetype::Krishna).await.unwrap().is_none());
    }
}
