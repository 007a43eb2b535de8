// src/handlers/guidance.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    assessment::Archetype,
    error::AppError,
    models::guidance::SaveProblemAreasRequest,
    state::AppState,
    utils::{html::clean_html, jwt::Claims},
};

/// Lists every archetype profile.
pub async fn list_archetypes(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let profiles = state.guidance.archetype_profiles().await?;
    Ok(Json(profiles))
}

/// One archetype's profile. The id is the archetype label, e.g. `Arjuna`.
pub async fn get_archetype(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound("Archetype not found".to_string());

    let archetype: Archetype = id.parse().map_err(|_| not_found())?;
    let profile = state
        .guidance
        .archetype_profile(archetype)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(profile))
}

/// The problem-area catalog shown after an assessment.
pub async fn list_problem_areas(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let areas = state.guidance.problem_areas().await?;
    Ok(Json(areas))
}

/// The caller's chosen problem areas.
pub async fn get_my_problem_areas(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let selected = state.guidance.problem_areas_for_user(&claims.sub).await?;
    Ok(Json(selected))
}

/// Replaces the caller's problem areas and returns the new selection.
pub async fn save_my_problem_areas(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SaveProblemAreasRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let ids = payload.unique_ids();
    let notes = payload.trimmed_notes().map(clean_html);

    state
        .guidance
        .replace_problem_areas(&claims.sub, &ids, notes.as_deref())
        .await?;

    let selected = state.guidance.problem_areas_for_user(&claims.sub).await?;
    Ok(Json(selected))
}
