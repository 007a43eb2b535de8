// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, assessment, guidance},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (assessment, guidance, me, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let assessment_routes = Router::new()
        .route("/", post(assessment::start_assessment))
        .route("/{id}", get(assessment::get_assessment))
        .route("/{id}/answer", post(assessment::answer_question))
        // Submitting needs to know who the result belongs to
        .merge(
            Router::new()
                .route("/{id}/submit", post(assessment::submit_assessment))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let guidance_routes = Router::new()
        .route("/api/archetypes", get(guidance::list_archetypes))
        .route("/api/archetypes/{id}", get(guidance::get_archetype))
        .route("/api/problem-areas", get(guidance::list_problem_areas));

    let me_routes = Router::new()
        .route("/assessment", get(assessment::get_my_assessment))
        .route(
            "/problem-areas",
            get(guidance::get_my_problem_areas).put(guidance::save_my_problem_areas),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route(
            "/questions",
            get(admin::list_questions).post(admin::create_question),
        )
        .route("/questions/{id}", delete(admin::delete_question))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/assessment", assessment_routes)
        .merge(guidance_routes)
        .nest("/api/me", me_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
