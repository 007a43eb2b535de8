// src/models/question.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::assessment::{AnswerOption, Archetype, OptionId, Question, QuestionId, ScoreVector};

/// Represents the 'gita_questions' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,

    /// The text shown to the user.
    pub content: String,
}

/// Represents the 'gita_question_options' table in the database.
/// Score columns are nullable; a missing score counts as zero.
#[derive(Debug, Clone, FromRow)]
pub struct OptionRow {
    pub id: i64,
    pub question_id: i64,
    pub label: String,
    pub score_arjuna: Option<i32>,
    pub score_karna: Option<i32>,
    pub score_krishna: Option<i32>,
    pub score_draupadi: Option<i32>,
    pub score_bhishma: Option<i32>,
    pub score_yudhishthira: Option<i32>,
    pub score_duryodhana: Option<i32>,
}

impl OptionRow {
    pub fn scores(&self) -> ScoreVector {
        let columns = [
            self.score_arjuna,
            self.score_karna,
            self.score_krishna,
            self.score_draupadi,
            self.score_bhishma,
            self.score_yudhishthira,
            self.score_duryodhana,
        ];
        ScoreVector::new(columns.map(|v| i64::from(v.unwrap_or(0))))
    }

    pub fn into_option(self) -> AnswerOption {
        AnswerOption {
            id: self.id,
            scores: self.scores(),
            label: self.label,
        }
    }
}

/// DTO for sending an option to the client (excludes scores).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicOption {
    pub id: OptionId,
    pub label: String,
}

/// DTO for sending a question to the client (excludes scores).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicQuestion {
    pub id: QuestionId,
    pub content: String,
    pub options: Vec<PublicOption>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            content: q.content.clone(),
            options: q
                .options
                .iter()
                .map(|o| PublicOption {
                    id: o.id,
                    label: o.label.clone(),
                })
                .collect(),
        }
    }
}

/// DTO for one option of a new question.
/// Archetypes left out of `scores` contribute zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOptionRequest {
    pub label: String,
    #[serde(default)]
    pub scores: BTreeMap<Archetype, i32>,
}

impl CreateOptionRequest {
    pub fn score_vector(&self) -> ScoreVector {
        ScoreVector::new(Archetype::ALL.map(|a| i64::from(self.scores.get(&a).copied().unwrap_or(0))))
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<CreateOptionRequest>,
}

fn validate_options(options: &[CreateOptionRequest]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    if options.len() > 10 {
        return Err(validator::ValidationError::new("too_many_options"));
    }
    for opt in options {
        if opt.label.trim().is_empty() {
            return Err(validator::ValidationError::new("option_label_empty"));
        }
        if opt.label.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(label: &str) -> CreateOptionRequest {
        CreateOptionRequest {
            label: label.to_string(),
            scores: BTreeMap::new(),
        }
    }

    #[test]
    fn test_missing_scores_read_as_zero() {
        let row = OptionRow {
            id: 1,
            question_id: 1,
            label: "Stand and fight".to_string(),
            score_arjuna: Some(3),
            score_karna: None,
            score_krishna: Some(1),
            score_draupadi: None,
            score_bhishma: None,
            score_yudhishthira: None,
            score_duryodhana: Some(2),
        };

        assert_eq!(row.scores().as_array(), [3, 0, 1, 0, 0, 0, 2]);
    }

    #[test]
    fn test_public_question_hides_scores() {
        let q = Question {
            id: 4,
            content: "When duty and desire collide...".to_string(),
            options: vec![AnswerOption {
                id: 40,
                label: "I follow duty".to_string(),
                scores: ScoreVector::new([0, 0, 0, 0, 5, 0, 0]),
            }],
        };

        let json = serde_json::to_value(PublicQuestion::from(&q)).unwrap();
        assert_eq!(json["options"][0]["label"], "I follow duty");
        assert!(json["options"][0].get("scores").is_none());
    }

    #[test]
    fn test_create_request_scores_by_label() {
        let req: CreateOptionRequest = serde_json::from_value(serde_json::json!({
            "label": "Seek counsel",
            "scores": { "Krishna": 4, "Yudhishthira": 1 }
        }))
        .unwrap();

        assert_eq!(req.score_vector().as_array(), [0, 0, 4, 0, 0, 1, 0]);
    }

    #[test]
    fn test_create_request_validation() {
        let ok = CreateQuestionRequest {
            content: "How do you face loss?".to_string(),
            options: vec![option("Endure"), option("Retaliate")],
        };
        assert!(ok.validate().is_ok());

        let no_options = CreateQuestionRequest {
            content: "How do you face loss?".to_string(),
            options: vec![],
        };
        assert!(no_options.validate().is_err());

        let blank_label = CreateQuestionRequest {
            content: "How do you face loss?".to_string(),
            options: vec![option("  ")],
        };
        assert!(blank_label.validate().is_err());
    }

    #[test]
    fn test_rejected_options_are_reported_on_the_field() {
        let too_many = CreateQuestionRequest {
            content: "Which counsel do you trust?".to_string(),
            options: (0..11).map(|i| option(&format!("Option {}", i))).collect(),
        };

        let errors = too_many.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let options = field_errors.get("options").expect("options error");
        assert_eq!(options[0].code, "too_many_options");
        assert!(options[0].params.contains_key("value"));
    }
}
