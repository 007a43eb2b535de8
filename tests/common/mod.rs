// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use gita_assessment::{
    assessment::{AnswerOption, Archetype, Question, ScoreVector},
    config::Config,
    models::guidance::{ArchetypeProfile, ProblemArea},
    routes,
    state::AppState,
    store::{
        AssessmentStore,
        memory::{InMemoryAssessmentStore, InMemoryGuidanceStore, InMemoryQuestionBank},
    },
    utils::jwt::sign_jwt,
};
use serde_json::Value;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

/// Builds a question whose options get ids `id * 10 + index`.
pub fn question(id: i64, options: &[[i64; 7]]) -> Question {
    Question {
        id,
        content: format!("Question {}", id),
        options: options
            .iter()
            .enumerate()
            .map(|(i, scores)| AnswerOption {
                id: id * 10 + i as i64,
                label: format!("Option {}", i),
                scores: ScoreVector::new(*scores),
            })
            .collect(),
    }
}

/// Three interchangeable questions. Taking option 0 then option 1 leaves
/// Arjuna at 50% and Karna at 30%, which ends the assessment after two answers.
pub fn three_question_bank() -> Vec<Question> {
    let first = [3, 2, 1, 0, 0, 0, 0];
    let second = [2, 1, 1, 0, 0, 0, 0];
    (1..=3).map(|id| question(id, &[first, second])).collect()
}

/// Two profiles and three problem areas.
pub fn guidance() -> InMemoryGuidanceStore {
    let mut arjuna = ArchetypeProfile::new(Archetype::Arjuna, "The conflicted warrior.");
    arjuna.strengths = vec!["Skill under pressure".to_string()];
    arjuna.verse_refs = vec!["2.47".to_string()];
    let area = |id: &str, label: &str| ProblemArea {
        id: id.to_string(),
        label: label.to_string(),
        description: Some(format!("About {}", label.to_lowercase())),
    };
    InMemoryGuidanceStore::new(
        vec![arjuna, ArchetypeProfile::new(Archetype::Karna, "The loyal outsider.")],
        vec![area("grief", "Grief"), area("anxiety", "Anxiety"), area("anger", "Anger")],
    )
}

pub fn app_with_store(questions: Vec<Question>, store: Arc<dyn AssessmentStore>) -> Router {
    let state = AppState::new(
        Arc::new(InMemoryQuestionBank::with_questions(questions)),
        store,
        Arc::new(guidance()),
        Config::for_tests(JWT_SECRET),
    );
    routes::create_router(state)
}

pub fn app(questions: Vec<Question>) -> (Router, Arc<InMemoryAssessmentStore>) {
    let store = Arc::new(InMemoryAssessmentStore::new());
    (app_with_store(questions, store.clone()), store)
}

pub fn token(user_id: &str, role: &str) -> String {
    sign_jwt(user_id, role, JWT_SECRET, 600).expect("Failed to sign test token")
}

pub fn request(method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

/// Sends one request and returns the status with the JSON body (Null if none).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
