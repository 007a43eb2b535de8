// src/models/guidance.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use validator::Validate;

use crate::assessment::Archetype;

/// What a user reads about their archetype.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchetypeProfile {
    #[serde(rename = "id")]
    pub archetype: Archetype,
    pub summary: String,
    pub strengths: Vec<String>,
    pub shadows: Vec<String>,
    pub childhood_drivers: Vec<String>,
    pub cognitive_biases: Vec<String>,
    pub stress_pattern: Option<String>,
    pub relationship_pattern: Option<String>,
    pub leadership_style: Option<String>,
    /// Seven-day micro-habit plan.
    pub growth_plan: Vec<String>,
    pub verse_refs: Vec<String>,
}

impl ArchetypeProfile {
    /// A profile with only a summary; list sections start empty.
    pub fn new(archetype: Archetype, summary: &str) -> Self {
        Self {
            archetype,
            summary: summary.to_string(),
            strengths: Vec::new(),
            shadows: Vec::new(),
            childhood_drivers: Vec::new(),
            cognitive_biases: Vec::new(),
            stress_pattern: None,
            relationship_pattern: None,
            leadership_style: None,
            growth_plan: Vec::new(),
            verse_refs: Vec::new(),
        }
    }
}

/// Represents the 'gita_archetypes' table in the database.
#[derive(Debug, FromRow)]
pub struct ArchetypeProfileRow {
    pub id: String,
    pub summary: String,
    pub strengths: Json<Vec<String>>,
    pub shadows: Json<Vec<String>>,
    pub childhood_drivers: Json<Vec<String>>,
    pub cognitive_biases: Json<Vec<String>>,
    pub stress_pattern: Option<String>,
    pub relationship_pattern: Option<String>,
    pub leadership_style: Option<String>,
    pub growth_plan: Json<Vec<String>>,
    pub verse_refs: Json<Vec<String>>,
}

impl ArchetypeProfileRow {
    /// `None` for rows whose id is not one of the seven archetypes.
    pub fn into_profile(self) -> Option<ArchetypeProfile> {
        let archetype = match self.id.parse::<Archetype>() {
            Ok(archetype) => archetype,
            Err(e) => {
                tracing::warn!("Skipping archetype profile: {}", e);
                return None;
            }
        };

        Some(ArchetypeProfile {
            archetype,
            summary: self.summary,
            strengths: self.strengths.0,
            shadows: self.shadows.0,
            childhood_drivers: self.childhood_drivers.0,
            cognitive_biases: self.cognitive_biases.0,
            stress_pattern: self.stress_pattern,
            relationship_pattern: self.relationship_pattern,
            leadership_style: self.leadership_style,
            growth_plan: self.growth_plan.0,
            verse_refs: self.verse_refs.0,
        })
    }
}

/// Represents the 'gita_problem_areas' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ProblemArea {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
}

/// One of the caller's chosen problem areas.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct SelectedProblemArea {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// DTO for replacing the caller's problem areas. An empty list clears them.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveProblemAreasRequest {
    #[validate(length(max = 20))]
    pub problem_area_ids: Vec<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl SaveProblemAreasRequest {
    /// Ids in request order with repeats removed.
    pub fn unique_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.problem_area_ids.len());
        for id in &self.problem_area_ids {
            let id = id.trim();
            if !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }

    /// Notes with surrounding whitespace removed; blank notes become `None`.
    pub fn trimmed_notes(&self) -> Option<&str> {
        self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}
