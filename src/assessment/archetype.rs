// src/assessment/archetype.rs

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Index};
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

/// The seven archetypes of the framework.
///
/// Declaration order is significant: it is the order of the persisted score
/// vector and the tie-break order when two archetypes share the top score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    Arjuna,
    Karna,
    Krishna,
    Draupadi,
    Bhishma,
    Yudhishthira,
    Duryodhana,
}

impl Archetype {
    pub const COUNT: usize = 7;

    pub const ALL: [Archetype; Archetype::COUNT] = [
        Archetype::Arjuna,
        Archetype::Karna,
        Archetype::Krishna,
        Archetype::Draupadi,
        Archetype::Bhishma,
        Archetype::Yudhishthira,
        Archetype::Duryodhana,
    ];

    /// Position in declaration order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Arjuna => "Arjuna",
            Archetype::Karna => "Karna",
            Archetype::Krishna => "Krishna",
            Archetype::Draupadi => "Draupadi",
            Archetype::Bhishma => "Bhishma",
            Archetype::Yudhishthira => "Yudhishthira",
            Archetype::Duryodhana => "Duryodhana",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownArchetype(pub String);

impl fmt::Display for UnknownArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown archetype '{}'", self.0)
    }
}

impl std::error::Error for UnknownArchetype {}

impl FromStr for Archetype {
    type Err = UnknownArchetype;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Archetype::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownArchetype(s.to_string()))
    }
}

/// Rounds `100 * score / total` to a whole percent, half away from zero.
/// A zero total is treated as 1 so an empty vector reads as all zeros.
pub fn percent_of(score: i64, total: i64) -> i64 {
    let denominator = if total == 0 { 1 } else { total };
    (100.0 * score as f64 / denominator as f64).round() as i64
}

/// One integer score per archetype.
///
/// Backed by a fixed array indexed by [`Archetype::index`], so every archetype
/// always has a value. Only grows through addition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScoreVector([i64; Archetype::COUNT]);

impl ScoreVector {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn new(values: [i64; Archetype::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, archetype: Archetype) -> i64 {
        self.0[archetype.index()]
    }

    /// Raw values in declaration order, as persisted.
    pub fn as_array(&self) -> [i64; Archetype::COUNT] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Archetype, i64)> + '_ {
        Archetype::ALL.into_iter().map(|a| (a, self.get(a)))
    }

    pub fn total(&self) -> i64 {
        self.0.iter().sum()
    }

    /// Archetypes by score, highest first. Equal scores keep declaration order.
    pub fn ranked(&self) -> Vec<(Archetype, i64)> {
        let mut ranked: Vec<(Archetype, i64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The archetype holding the maximum score, first in declaration order on ties.
    pub fn primary(&self) -> Archetype {
        let mut best = Archetype::Arjuna;
        let mut best_score = i64::MIN;
        for (archetype, score) in self.iter() {
            if score > best_score {
                best = archetype;
                best_score = score;
            }
        }
        best
    }

    pub fn percentages(&self) -> BTreeMap<Archetype, i64> {
        let total = self.total();
        self.iter().map(|(a, s)| (a, percent_of(s, total))).collect()
    }

    /// Percent of the leader minus percent of the runner-up.
    pub fn confidence_gap(&self) -> i64 {
        let total = self.total();
        let ranked = self.ranked();
        percent_of(ranked[0].1, total) - percent_of(ranked[1].1, total)
    }
}

impl Index<Archetype> for ScoreVector {
    type Output = i64;

    fn index(&self, archetype: Archetype) -> &i64 {
        &self.0[archetype.index()]
    }
}

impl AddAssign for ScoreVector {
    fn add_assign(&mut self, rhs: ScoreVector) {
        for (acc, value) in self.0.iter_mut().zip(rhs.0) {
            *acc += value;
        }
    }
}

impl Add for ScoreVector {
    type Output = ScoreVector;

    fn add(mut self, rhs: ScoreVector) -> ScoreVector {
        self += rhs;
        self
    }
}

/// Serialized as `{ "Arjuna": 3, "Karna": 0, ... }` in declaration order.
impl Serialize for ScoreVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Archetype::COUNT))?;
        for (archetype, score) in self.iter() {
            map.serialize_entry(archetype.as_str(), &score)?;
        }
        map.end()
    }
}
