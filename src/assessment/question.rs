// src/assessment/question.rs

use serde::Serialize;

use super::archetype::{Archetype, ScoreVector};

pub type QuestionId = i64;
pub type OptionId = i64;

/// A selectable answer and what it adds to each archetype.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub label: String,
    pub scores: ScoreVector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub content: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn option(&self, id: OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// How well this question separates archetypes.
    ///
    /// For each archetype, the population variance of the option scores
    /// (divided by the option count), summed over all archetypes.
    pub fn discrimination(&self) -> f64 {
        let n = self.options.len();
        if n == 0 {
            return 0.0;
        }
        let n = n as f64;

        Archetype::ALL
            .into_iter()
            .map(|archetype| {
                let mean = self
                    .options
                    .iter()
                    .map(|o| o.scores[archetype] as f64)
                    .sum::<f64>()
                    / n;
                self.options
                    .iter()
                    .map(|o| (o.scores[archetype] as f64 - mean).powi(2))
                    .sum::<f64>()
                    / n
            })
            .sum()
    }
}

/// Picks the candidate with the strictly greatest discrimination score.
///
/// Ties keep the first candidate in iteration order. Returns `None` for an
/// empty input.
pub fn select_next_question<'a, I>(remaining: I) -> Option<&'a Question>
where
    I: IntoIterator<Item = &'a Question>,
{
    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;

    for candidate in remaining {
        let score = candidate.discrimination();
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }

    best
}
