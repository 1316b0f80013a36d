// 🧙 Character Entity - A card that gets ranked
//
// Identity is the `id` (stable for the session). Everything else is a value
// fixed at seed time, except `tier`, which the store stamps on every move.

use crate::tier::Tier;
use serde::{Deserialize, Serialize};

/// Lowest and highest valid star rating
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Stable identity - NEVER changes
    pub id: String,

    /// Display name (e.g., "Арагорн")
    pub name: String,

    /// One-line description shown under the name
    pub description: String,

    /// Star rating, 1-5
    pub rating: u8,

    /// Current tier; None while the character sits in the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,

    /// Avatar glyph (usually a single emoji)
    pub avatar: String,
}

impl Character {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        rating: u8,
        avatar: impl Into<String>,
    ) -> Self {
        Character {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            rating,
            tier: None,
            avatar: avatar.into(),
        }
    }

    pub fn is_ranked(&self) -> bool {
        self.tier.is_some()
    }

    /// Five-slot star bar, e.g. "★★★☆☆" for a rating of 3
    pub fn stars(&self) -> String {
        let filled = self.rating.min(MAX_RATING) as usize;
        let mut bar = "★".repeat(filled);
        bar.push_str(&"☆".repeat(MAX_RATING as usize - filled));
        bar
    }
}
