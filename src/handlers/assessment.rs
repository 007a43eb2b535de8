// src/handlers/assessment.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    assessment::{AnswerOutcome, AssessmentSession},
    error::AppError,
    models::assessment::{AnswerRequest, AnswerResponse, AssessmentRecord, SessionView, SubmitResponse},
    state::AppState,
    utils::jwt::Claims,
};

fn session_not_found() -> AppError {
    AppError::NotFound("Assessment session not found".to_string())
}

/// Starts a new assessment.
///
/// Loads the question bank, picks the opening question and returns the
/// session view with its id. Anyone may take the assessment; logging in is
/// only needed to submit.
pub async fn start_assessment(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pool = state.bank.load_pool().await?;
    let session = AssessmentSession::new(pool, state.engine_settings());

    let id = Uuid::new_v4();
    let view = SessionView::new(id, &session);
    state.sessions.insert(id, session).await;

    tracing::info!("Started assessment {} over {} questions", id, view.max_questions);

    Ok((StatusCode::CREATED, Json(view)))
}

/// Returns progress, the current question and, once finished, the result.
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = state
        .sessions
        .with_session(id, |entry| SessionView::new(id, &entry.session))
        .await
        .ok_or_else(session_not_found)?;

    Ok(Json(view))
}

/// Records the answer to the current question.
///
/// An answer that does not fit (stale question, unknown option, finished
/// session) changes nothing and comes back with `accepted: false` so the
/// client can re-render the current question.
pub async fn answer_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state
        .sessions
        .with_session(id, |entry| {
            let outcome = entry.session.record_answer(req.question_id, req.option_id);
            let ignored_reason = match outcome {
                AnswerOutcome::Ignored(reason) => {
                    tracing::warn!(
                        "Ignored answer {} -> {} for session {}: {:?}",
                        req.question_id,
                        req.option_id,
                        id,
                        reason
                    );
                    Some(reason)
                }
                AnswerOutcome::Next(_) | AnswerOutcome::Finished => None,
            };

            AnswerResponse {
                accepted: ignored_reason.is_none(),
                ignored_reason,
                session: SessionView::new(id, &entry.session),
            }
        })
        .await
        .ok_or_else(session_not_found)?;

    Ok(Json(response))
}

/// Finalizes the assessment and hands the result to the store.
///
/// * Finalizing is idempotent: the cached result is returned on every call.
/// * If saving fails the result stays cached and the client may retry.
/// * Once saved, later calls by the same user return the result without
///   saving again. A session saved for one user cannot be claimed by another.
pub async fn submit_assessment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (result, submitted_by) = state
        .sessions
        .with_session(id, |entry| {
            (entry.session.finalize().clone(), entry.submitted_by.clone())
        })
        .await
        .ok_or_else(session_not_found)?;

    match submitted_by {
        Some(owner) if owner == claims.sub => {}
        Some(owner) => {
            tracing::warn!(
                "User {} tried to submit assessment {} already saved for {}",
                claims.sub,
                id,
                owner
            );
            return Err(AppError::Conflict(
                "Assessment was already submitted by another user".to_string(),
            ));
        }
        None => {
            let record = AssessmentRecord::from(&result);
            state.store.save(&claims.sub, &record).await.map_err(|e| {
                tracing::error!("Failed to hand off assessment {}: {:?}", id, e);
                AppError::Unavailable("Result could not be saved. Please retry.".to_string())
            })?;

            state
                .sessions
                .with_session(id, |entry| {
                    entry.submitted_by.get_or_insert_with(|| claims.sub.clone());
                })
                .await;
        }
    }

    Ok(Json(SubmitResponse {
        saved: true,
        result,
    }))
}

/// The caller's most recent stored assessment.
pub async fn get_my_assessment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let latest = state
        .store
        .latest_for_user(&claims.sub)
        .await?
        .ok_or(AppError::NotFound("No assessment yet".to_string()))?;

    Ok(Json(latest))
}
