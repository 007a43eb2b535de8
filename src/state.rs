// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::assessment::EngineSettings;
use crate::config::Config;
use crate::sessions::SessionStore;
use crate::store::{AssessmentStore, GuidanceStore, QuestionBank};

#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<dyn QuestionBank>,
    pub store: Arc<dyn AssessmentStore>,
    pub guidance: Arc<dyn GuidanceStore>,
    pub sessions: SessionStore,
    pub config: Config,
}

impl AppState {
    pub fn new(
        bank: Arc<dyn QuestionBank>,
        store: Arc<dyn AssessmentStore>,
        guidance: Arc<dyn GuidanceStore>,
        config: Config,
    ) -> Self {
        Self {
            bank,
            store,
            guidance,
            sessions: SessionStore::new(config.session_ttl),
            config,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            max_questions: self.config.max_questions,
            confidence_gap: self.config.confidence_gap,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
