// 🏅 Tier Labels - Fixed rank buckets
//
// S is the highest rank, D the lowest. The derived `Ord` follows declaration
// order, so iterating a `BTreeMap<Tier, _>` walks tiers from best to worst.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// TIER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
}

impl Tier {
    /// All tiers, highest rank first
    pub const ALL: [Tier; 5] = [Tier::S, Tier::A, Tier::B, Tier::C, Tier::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
        }
    }

    /// Zero-based rank (S = 0)
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Tier at a zero-based rank, if any
    pub fn from_rank(rank: usize) -> Option<Tier> {
        Tier::ALL.get(rank).copied()
    }

    /// Display color name shared by the terminal and web front ends
    pub fn color_name(&self) -> &'static str {
        match self {
            Tier::S => "red",
            Tier::A => "orange",
            Tier::B => "yellow",
            Tier::C => "green",
            Tier::D => "blue",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tier label '{0}' (expected one of S, A, B, C, D)")]
pub struct TierParseError(pub String);

impl FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Tier::S),
            "A" => Ok(Tier::A),
            "B" => Ok(Tier::B),
            "C" => Ok(Tier::C),
            "D" => Ok(Tier::D),
            _ => Err(TierParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Tier {
    type Error = TierParseError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}
