// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::CreateQuestionRequest,
    state::AppState,
    store::{NewOption, NewQuestion},
    utils::html::clean_html,
};

/// Lists the whole question bank, scores included.
/// Admin only.
pub async fn list_questions(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let questions = state.bank.load_pool().await?;
    Ok(Json(questions))
}

/// Adds a question and its scored options to the bank.
/// Admin only.
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let question = NewQuestion {
        content: clean_html(&payload.content),
        options: payload
            .options
            .iter()
            .map(|o| NewOption {
                label: clean_html(&o.label),
                scores: o.score_vector(),
            })
            .collect(),
    };

    let id = state.bank.create_question(question).await?;
    tracing::info!("Created question {}", id);

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Deletes a question and its options.
/// Admin only.
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.bank.delete_question(id).await? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    tracing::info!("Deleted question {}", id);
    Ok(StatusCode::NO_CONTENT)
}
