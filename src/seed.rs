// 🌱 Seed Roster - Initial characters for a session
//
// The store is rebuilt from a seed on every start. The seed comes either from
// the built-in roster or from a JSON/CSV file supplied on the command line.

use crate::character::{Character, MAX_RATING, MIN_RATING};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("character at position {0} has an empty id")]
    EmptyId(usize),

    #[error("duplicate character id '{0}'")]
    DuplicateId(String),

    #[error("character '{id}' has rating {rating}, expected 1-5")]
    RatingOutOfRange { id: String, rating: u8 },

    #[error("unsupported seed file extension '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
}

/// The built-in roster: eight characters, all starting in the pool
pub fn default_roster() -> Vec<Character> {
    vec![
        Character::new("1", "Арагорн", "Король Гондора, следопыт", 5, "👑"),
        Character::new("2", "Гэндальф", "Серый маг, мудрец", 5, "🧙‍♂️"),
        Character::new("3", "Леголас", "Эльф-лучник из Лихолесья", 4, "🏹"),
        Character::new("4", "Гимли", "Гном-воин с топором", 4, "⚔️"),
        Character::new("5", "Боромир", "Воин Гондора", 3, "🛡️"),
        Character::new("6", "Фродо", "Хоббит-хранитель кольца", 4, "💍"),
        Character::new("7", "Сэм", "Верный друг Фродо", 5, "🌱"),
        Character::new("8", "Мерри", "Хоббит из Шира", 3, "🍃"),
    ]
}

/// Check ids are present and unique and ratings are in range
pub fn validate_seed(characters: &[Character]) -> Result<(), SeedError> {
    let mut seen = HashSet::new();

    for (i, c) in characters.iter().enumerate() {
        if c.id.trim().is_empty() {
            return Err(SeedError::EmptyId(i));
        }
        if !seen.insert(c.id.as_str()) {
            return Err(SeedError::DuplicateId(c.id.clone()));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&c.rating) {
            return Err(SeedError::RatingOutOfRange {
                id: c.id.clone(),
                rating: c.rating,
            });
        }
    }

    Ok(())
}

/// Load and validate a seed file (.json array or .csv with a header row)
pub fn load_seed(path: &Path) -> Result<Vec<Character>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let characters = match extension.as_str() {
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => return Err(SeedError::UnsupportedFormat(other.to_string()).into()),
    };

    validate_seed(&characters)
        .with_context(|| format!("Invalid seed file {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        count = characters.len(),
        "loaded seed roster"
    );

    Ok(characters)
}

fn load_json(path: &Path) -> Result<Vec<Character>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let characters = serde_json::from_str(&content).context("Failed to parse seed JSON")?;
    Ok(characters)
}

fn load_csv(path: &Path) -> Result<Vec<Character>> {
    let mut rdr = csv::Reader::from_path(path).context("Failed to open seed CSV")?;

    let mut characters = Vec::new();
    for result in rdr.deserialize() {
        let character: Character = result.context("Failed to deserialize character")?;
        characters.push(character);
    }

    Ok(characters)
}
