// Tier List - Core Library
// Exposes the tier store for use in the TUI, the web server, and tests

pub mod tier;
pub mod character;
pub mod seed;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use tier::{Tier, TierParseError};
pub use character::{Character, MAX_RATING, MIN_RATING};
pub use seed::{default_roster, load_seed, validate_seed, SeedError};
pub use store::{
    DragSession, InvariantViolation, Location, Snapshot, TierRow, TierStore,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
