// src/assessment/mod.rs

//! Adaptive assessment engine.
//!
//! Keeps a running score per archetype, asks the most discriminating
//! remaining question next, and stops once one archetype leads clearly or
//! the question budget is spent. Pure and synchronous; storage and transport
//! live elsewhere.

pub mod archetype;
pub mod question;
pub mod session;

pub use archetype::{Archetype, ScoreVector, UnknownArchetype, percent_of};
pub use question::{AnswerOption, OptionId, Question, QuestionId, select_next_question};
pub use session::{
    AnswerOutcome, AssessmentResult, AssessmentSession, EngineSettings, IgnoreReason, SessionState,
};
