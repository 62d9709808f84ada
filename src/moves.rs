//! The fixed vocabulary of legal moves.

use color_eyre::{eyre::eyre, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Grid effect of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Stay,
}

impl Direction {
    /// `(dx, dy)` with y growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Stay => (0, 0),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (dx, dy) = self.delta();
        write!(f, "{:?}(dx={}, dy={})", self, dx, dy)
    }
}

/// Legal action identifiers and their effects.
///
/// Invariant: never empty, keys are unique, non-empty and carry no surrounding
/// whitespace (model answers are trimmed before lookup). Insertion order is kept so
/// that prompts and random picks are reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveVocabulary {
    moves: Vec<(String, Direction)>,
}

impl MoveVocabulary {
    /// Build from `(identifier, effect)` pairs.
    ///
    /// # Arguments
    /// * `moves` - identifiers and their grid effects, in prompt order
    ///
    /// # Returns
    /// The vocabulary, or an error for an empty list, a duplicate key, or a key that is
    /// empty or padded with whitespace.
    pub fn new<I, S>(moves: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Direction)>,
        S: Into<String>,
    {
        let mut out: Vec<(String, Direction)> = Vec::new();
        for (key, dir) in moves {
            let key = key.into();
            if key.is_empty() {
                return Err(eyre!("move identifier must not be empty"));
            }
            if key.trim() != key {
                return Err(eyre!("move identifier {key:?} has surrounding whitespace"));
            }
            if out.iter().any(|(k, _)| *k == key) {
                return Err(eyre!("duplicate move identifier: {key}"));
            }
            out.push((key, dir));
        }
        if out.is_empty() {
            return Err(eyre!("move vocabulary must not be empty"));
        }
        Ok(Self { moves: out })
    }

    /// `UP`, `DOWN`, `LEFT`, `RIGHT`.
    pub fn cardinal() -> Self {
        Self {
            moves: vec![
                ("UP".to_string(), Direction::Up),
                ("DOWN".to_string(), Direction::Down),
                ("LEFT".to_string(), Direction::Left),
                ("RIGHT".to_string(), Direction::Right),
            ],
        }
    }

    /// Parse a JSON object such as `{"UP": "up", "WAIT": "stay"}`.
    /// Object keys are ordered alphabetically.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: BTreeMap<String, Direction> = serde_json::from_str(json)?;
        Self::new(parsed)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Always false for a constructed vocabulary.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, key: &str) -> bool {
        self.moves.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<Direction> {
        self.moves.iter().find(|(k, _)| k == key).map(|(_, d)| *d)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.moves.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.moves.iter().map(|(k, d)| (k.as_str(), *d))
    }

    /// Uniformly random key.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> &str {
        let idx = rng.gen_range(0..self.moves.len());
        &self.moves[idx].0
    }
}

impl Default for MoveVocabulary {
    fn default() -> Self {
        Self::cardinal()
    }
}
