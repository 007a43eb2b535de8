// src/store/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};

use super::{AssessmentStore, GuidanceStore, NewQuestion, QuestionBank};
use crate::{
    assessment::{Archetype, Question, QuestionId, ScoreVector},
    error::AppError,
    models::{
        assessment::{AssessmentRecord, RoutingMetadata, StoredAssessment},
        guidance::{ArchetypeProfile, ArchetypeProfileRow, ProblemArea, SelectedProblemArea},
        question::{OptionRow, QuestionRow},
    },
};

/// Score columns are `INTEGER`; anything outside `i32` is rejected, not truncated.
fn option_columns(scores: &ScoreVector) -> Result<[i32; Archetype::COUNT], AppError> {
    let mut columns = [0; Archetype::COUNT];
    for (archetype, value) in scores.iter() {
        columns[archetype.index()] = i32::try_from(value).map_err(|_| {
            AppError::BadRequest(format!("Score {} for {} is out of range", value, archetype))
        })?;
    }
    Ok(columns)
}

#[derive(Clone)]
pub struct PgQuestionBank {
    pool: PgPool,
}

impl PgQuestionBank {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionBank for PgQuestionBank {
    async fn load_pool(&self) -> Result<Vec<Question>, AppError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, content
            FROM gita_questions
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load questions: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // Dynamic IN clause over the loaded question ids
        let mut query_builder = QueryBuilder::<Postgres>::new(
            "SELECT
                id, question_id, label,
                score_arjuna, score_karna, score_krishna, score_draupadi,
                score_bhishma, score_yudhishthira, score_duryodhana
            FROM gita_question_options WHERE question_id IN (",
        );

        let mut separated = query_builder.separated(",");
        for row in &rows {
            separated.push_bind(row.id);
        }
        separated.push_unseparated(") ORDER BY id ASC");

        let option_rows: Vec<OptionRow> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load question options: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;

        let mut grouped: HashMap<i64, Vec<OptionRow>> = HashMap::new();
        for option in option_rows {
            grouped.entry(option.question_id).or_default().push(option);
        }

        let questions = rows
            .into_iter()
            .map(|row| Question {
                options: grouped
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(OptionRow::into_option)
                    .collect(),
                id: row.id,
                content: row.content,
            })
            .collect();

        Ok(questions)
    }

    async fn create_question(&self, question: NewQuestion) -> Result<QuestionId, AppError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO gita_questions (content) VALUES ($1) RETURNING id",
        )
        .bind(&question.content)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        for option in &question.options {
            let [arjuna, karna, krishna, draupadi, bhishma, yudhishthira, duryodhana] =
                option_columns(&option.scores)?;
            sqlx::query(
                r#"
                INSERT INTO gita_question_options (
                    question_id, label,
                    score_arjuna, score_karna, score_krishna, score_draupadi,
                    score_bhishma, score_yudhishthira, score_duryodhana
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(id)
            .bind(&option.label)
            .bind(arjuna)
            .bind(karna)
            .bind(krishna)
            .bind(draupadi)
            .bind(bhishma)
            .bind(yudhishthira)
            .bind(duryodhana)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert option for question {}: {:?}", id, e);
                AppError::InternalServerError(e.to_string())
            })?;
        }

        tx.commit().await?;

        Ok(id)
    }

    async fn delete_question(&self, id: QuestionId) -> Result<bool, AppError> {
        // Options are removed by ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM gita_questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
pub struct PgAssessmentStore {
    pool: PgPool,
}

impl PgAssessmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssessmentStore for PgAssessmentStore {
    /// Inserts the assessment and points the user's current archetype at it,
    /// both in one transaction.
    async fn save(&self, user_id: &str, record: &AssessmentRecord) -> Result<(), AppError> {
        let metadata = RoutingMetadata {
            answered_order: record.answered_order.clone(),
            finished_at: record.finished_at,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO gita_assessments (user_id, answers, archetype, score_vector, routing_metadata)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(Json(&record.answers))
        .bind(record.archetype.as_str())
        .bind(record.score_vector.to_vec())
        .bind(Json(&metadata))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert assessment: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_archetypes (user_id, archetype_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET
                archetype_id = EXCLUDED.archetype_id,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(user_id)
        .bind(record.archetype.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert user archetype: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        tx.commit().await?;

        tracing::info!("Saved {} assessment for user {}", record.archetype, user_id);
        Ok(())
    }

    async fn latest_for_user(&self, user_id: &str) -> Result<Option<StoredAssessment>, AppError> {
        let latest = sqlx::query_as::<_, StoredAssessment>(
            r#"
            SELECT id, user_id, archetype, score_vector, created_at
            FROM gita_assessments
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(latest)
    }
}

const PROFILE_COLUMNS: &str = "id, summary, strengths, shadows, childhood_drivers, cognitive_biases, \
    stress_pattern, relationship_pattern, leadership_style, growth_plan, verse_refs";

#[derive(Clone)]
pub struct PgGuidanceStore {
    pool: PgPool,
}

impl PgGuidanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuidanceStore for PgGuidanceStore {
    async fn archetype_profiles(&self) -> Result<Vec<ArchetypeProfile>, AppError> {
        let rows = sqlx::query_as::<_, ArchetypeProfileRow>(&format!(
            "SELECT {} FROM gita_archetypes",
            PROFILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut profiles: Vec<ArchetypeProfile> = rows
            .into_iter()
            .filter_map(ArchetypeProfileRow::into_profile)
            .collect();
        profiles.sort_by_key(|p| p.archetype);

        Ok(profiles)
    }

    async fn archetype_profile(&self, archetype: Archetype) -> Result<Option<ArchetypeProfile>, AppError> {
        let row = sqlx::query_as::<_, ArchetypeProfileRow>(&format!(
            "SELECT {} FROM gita_archetypes WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(archetype.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(ArchetypeProfileRow::into_profile))
    }

    async fn problem_areas(&self) -> Result<Vec<ProblemArea>, AppError> {
        let areas = sqlx::query_as::<_, ProblemArea>(
            "SELECT id, label, description FROM gita_problem_areas ORDER BY label ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(areas)
    }

    async fn problem_areas_for_user(&self, user_id: &str) -> Result<Vec<SelectedProblemArea>, AppError> {
        let selected = sqlx::query_as::<_, SelectedProblemArea>(
            r#"
            SELECT p.id, p.label, p.description, u.notes, u.created_at
            FROM user_problem_areas u
            JOIN gita_problem_areas p ON p.id = u.problem_area_id
            WHERE u.user_id = $1
            ORDER BY p.label ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(selected)
    }

    /// Clears the old selection and inserts the new one in one transaction.
    async fn replace_problem_areas(
        &self,
        user_id: &str,
        ids: &[String],
        notes: Option<&str>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if !ids.is_empty() {
            // Dynamic IN clause to check every id against the catalog
            let mut query_builder =
                QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM gita_problem_areas WHERE id IN (");
            let mut separated = query_builder.separated(",");
            for id in ids {
                separated.push_bind(id.clone());
            }
            separated.push_unseparated(")");

            let known: i64 = query_builder
                .build_query_scalar()
                .fetch_one(&mut *tx)
                .await?;
            if known != ids.len() as i64 {
                return Err(AppError::BadRequest("Unknown problem area".to_string()));
            }
        }

        sqlx::query("DELETE FROM user_problem_areas WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if !ids.is_empty() {
            let notes = notes.map(str::to_string);
            let mut query_builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO user_problem_areas (user_id, problem_area_id, notes) ",
            );
            query_builder.push_values(ids, |mut row, id| {
                row.push_bind(user_id.to_string())
                    .push_bind(id.clone())
                    .push_bind(notes.clone());
            });

            query_builder.build().execute(&mut *tx).await.map_err(|e| {
                tracing::error!("Failed to save problem areas for user {}: {:?}", user_id, e);
                AppError::InternalServerError(e.to_string())
            })?;
        }

        tx.commit().await?;

        tracing::info!("User {} selected {} problem areas", user_id, ids.len());
        Ok(())
    }
}
