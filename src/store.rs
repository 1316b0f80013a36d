// 🗂️ Tier Assignment Store - Pool + tier rows + drag session
//
// Every character lives in exactly one place: the pool, or exactly one tier
// row. Characters are never created or destroyed after construction, only
// relocated. All operations are total: stale ids and drops without an active
// drag are silent no-ops.

use crate::character::Character;
use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

// ============================================================================
// LOCATION + DRAG SESSION
// ============================================================================

/// Where a character currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Pool,
    Tier(Tier),
}

/// The character currently being moved, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSession {
    subject: Option<String>,
}

impl DragSession {
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.subject.is_some()
    }

    fn begin(&mut self, id: &str) {
        self.subject = Some(id.to_string());
    }

    fn take(&mut self) -> Option<String> {
        self.subject.take()
    }
}

// ============================================================================
// SNAPSHOT (read-only view for rendering)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRow {
    pub tier: Tier,
    pub characters: Vec<Character>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pool: Vec<Character>,
    /// All five tiers, highest rank first (empty rows included)
    pub tiers: Vec<TierRow>,
    pub dragging: Option<String>,
}

impl Snapshot {
    pub fn tier(&self, tier: Tier) -> &[Character] {
        self.tiers
            .iter()
            .find(|row| row.tier == tier)
            .map(|row| row.characters.as_slice())
            .unwrap_or(&[])
    }

    pub fn ranked_count(&self) -> usize {
        self.tiers.iter().map(|row| row.characters.len()).sum()
    }
}

// ============================================================================
// INVARIANT CHECK
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("character '{0}' appears more than once")]
    Duplicated(String),

    #[error("character '{0}' is missing from the store")]
    Missing(String),

    #[error("character '{0}' appeared that was never seeded")]
    Unknown(String),

    #[error("character '{id}' is in {location:?} but labelled {label:?}")]
    LabelMismatch {
        id: String,
        location: Location,
        label: Option<Tier>,
    },
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct TierStore {
    pool: Vec<Character>,
    tiers: BTreeMap<Tier, Vec<Character>>,
    drag: DragSession,
    /// Ids of the seed, used to check nothing gets lost or invented
    roster: Vec<String>,
}

impl TierStore {
    /// Build a store from a seed. Characters already labelled go straight to
    /// their tier; the rest go to the pool. Seed order is preserved.
    ///
    /// The seed is expected to have unique ids (see `seed::validate_seed`).
    pub fn new(seed: Vec<Character>) -> Self {
        let mut tiers: BTreeMap<Tier, Vec<Character>> =
            Tier::ALL.iter().map(|t| (*t, Vec::new())).collect();
        let mut pool = Vec::new();
        let roster = seed.iter().map(|c| c.id.clone()).collect();

        for character in seed {
            match character.tier {
                Some(tier) => tiers.entry(tier).or_default().push(character),
                None => pool.push(character),
            }
        }

        TierStore {
            pool,
            tiers,
            drag: DragSession::default(),
            roster,
        }
    }

    // ------------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------------

    /// Start dragging a character. Overwrites any earlier subject.
    /// Unknown ids are ignored.
    pub fn begin_drag(&mut self, id: &str) -> bool {
        if self.locate(id).is_none() {
            tracing::debug!(id, "begin_drag ignored: unknown character");
            return false;
        }

        if let Some(previous) = self.drag.subject() {
            if previous != id {
                tracing::debug!(previous, id, "drag subject replaced");
            }
        }

        self.drag.begin(id);
        tracing::debug!(id, "drag started");
        true
    }

    /// Drop the drag subject at the tail of `tier` and end the drag.
    /// No-op when nothing is being dragged. Returns true whenever the
    /// session was cleared, even if the subject no longer exists.
    pub fn drop_into(&mut self, tier: Tier) -> bool {
        let Some(id) = self.drag.take() else {
            tracing::debug!(%tier, "drop ignored: no active drag");
            return false;
        };

        // The session was cleared above, so a stale subject still counts as a change
        let Some(mut character) = self.take_character(&id) else {
            tracing::debug!(id = %id, %tier, "drop ended a stale drag");
            return true;
        };

        character.tier = Some(tier);
        self.tiers.entry(tier).or_default().push(character);
        tracing::debug!(id = %id, %tier, "character dropped");
        self.debug_check();
        true
    }

    /// End the drag without moving anything
    pub fn cancel_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(id) => {
                tracing::debug!(id = %id, "drag cancelled");
                true
            }
            None => false,
        }
    }

    /// Send a ranked character back to the end of the pool.
    /// No-op if it is not in any tier.
    pub fn remove_from_tier(&mut self, id: &str) -> bool {
        let Some(mut character) = self.take_from_tiers(id) else {
            tracing::debug!(id, "remove ignored: character not in any tier");
            return false;
        };

        character.tier = None;
        self.pool.push(character);
        tracing::debug!(id, "character returned to pool");
        self.debug_check();
        true
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn pool(&self) -> &[Character] {
        &self.pool
    }

    pub fn tier(&self, tier: Tier) -> &[Character] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dragging(&self) -> Option<&str> {
        self.drag.subject()
    }

    pub fn drag_session(&self) -> &DragSession {
        &self.drag
    }

    /// Total number of characters (pool + all tiers)
    pub fn len(&self) -> usize {
        self.pool.len() + self.tiers.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn locate(&self, id: &str) -> Option<Location> {
        if self.pool.iter().any(|c| c.id == id) {
            return Some(Location::Pool);
        }

        self.tiers
            .iter()
            .find(|(_, row)| row.iter().any(|c| c.id == id))
            .map(|(tier, _)| Location::Tier(*tier))
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.pool
            .iter()
            .chain(self.tiers.values().flatten())
            .find(|c| c.id == id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pool: self.pool.clone(),
            tiers: Tier::ALL
                .iter()
                .map(|tier| TierRow {
                    tier: *tier,
                    characters: self.tier(*tier).to_vec(),
                })
                .collect(),
            dragging: self.drag.subject().map(str::to_string),
        }
    }

    /// Verify every seeded character is present exactly once and that its
    /// tier label matches the row it sits in
    pub fn check_invariant(&self) -> Result<(), InvariantViolation> {
        let roster: HashSet<&str> = self.roster.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();

        let placed = self
            .pool
            .iter()
            .map(|c| (Location::Pool, c))
            .chain(
                self.tiers
                    .iter()
                    .flat_map(|(tier, row)| row.iter().map(move |c| (Location::Tier(*tier), c))),
            );

        for (location, c) in placed {
            if !roster.contains(c.id.as_str()) {
                return Err(InvariantViolation::Unknown(c.id.clone()));
            }
            if !seen.insert(c.id.as_str()) {
                return Err(InvariantViolation::Duplicated(c.id.clone()));
            }

            let expected = match location {
                Location::Pool => None,
                Location::Tier(tier) => Some(tier),
            };
            if c.tier != expected {
                return Err(InvariantViolation::LabelMismatch {
                    id: c.id.clone(),
                    location,
                    label: c.tier,
                });
            }
        }

        match self.roster.iter().find(|id| !seen.contains(id.as_str())) {
            Some(id) => Err(InvariantViolation::Missing(id.clone())),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Remove a character from wherever it is (pool first, then every tier)
    fn take_character(&mut self, id: &str) -> Option<Character> {
        if let Some(pos) = self.pool.iter().position(|c| c.id == id) {
            return Some(self.pool.remove(pos));
        }
        self.take_from_tiers(id)
    }

    fn take_from_tiers(&mut self, id: &str) -> Option<Character> {
        self.tiers.values_mut().find_map(|row| {
            row.iter()
                .position(|c| c.id == id)
                .map(|pos| row.remove(pos))
        })
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions) {
            if let Err(violation) = self.check_invariant() {
                tracing::warn!(%violation, "tier store invariant violated");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(id: &str) -> Character {
        Character::new(id, id.to_uppercase(), "test character", 3, "🙂")
    }

    fn ids(characters: &[Character]) -> Vec<&str> {
        characters.iter().map(|c| c.id.as_str()).collect()
    }

    fn store_ab() -> TierStore {
        TierStore::new(vec![character("a"), character("b")])
    }

    #[test]
    fn test_new_store_puts_unlabelled_in_pool() {
        let store = store_ab();

        assert_eq!(ids(store.pool()), vec!["a", "b"]);
        for tier in Tier::ALL {
            assert!(store.tier(tier).is_empty());
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.dragging(), None);
        assert!(store.check_invariant().is_ok());
    }

    #[test]
    fn test_new_store_honours_seed_labels() {
        let mut ranked = character("r");
        ranked.tier = Some(Tier::B);
        let store = TierStore::new(vec![character("p"), ranked]);

        assert_eq!(ids(store.pool()), vec!["p"]);
        assert_eq!(ids(store.tier(Tier::B)), vec!["r"]);
        assert_eq!(store.locate("r"), Some(Location::Tier(Tier::B)));
        assert!(store.check_invariant().is_ok());
    }

    #[test]
    fn test_drag_and_drop_scenario() {
        let mut store = store_ab();

        assert!(store.begin_drag("a"));
        assert!(store.drop_into(Tier::S));
        assert_eq!(ids(store.pool()), vec!["b"]);
        assert_eq!(ids(store.tier(Tier::S)), vec!["a"]);
        assert_eq!(store.character("a").unwrap().tier, Some(Tier::S));
        assert_eq!(store.dragging(), None);

        store.begin_drag("b");
        store.drop_into(Tier::S);
        assert!(store.pool().is_empty());
        assert_eq!(ids(store.tier(Tier::S)), vec!["a", "b"]);

        assert!(store.remove_from_tier("a"));
        assert_eq!(ids(store.pool()), vec!["a"]);
        assert_eq!(ids(store.tier(Tier::S)), vec!["b"]);
        assert_eq!(store.character("a").unwrap().tier, None);

        assert!(store.check_invariant().is_ok());
    }

    #[test]
    fn test_drop_without_drag_is_noop() {
        let mut store = store_ab();
        let before = store.snapshot();

        assert!(!store.drop_into(Tier::A));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_drop_moves_between_tiers() {
        let mut store = store_ab();
        store.begin_drag("a");
        store.drop_into(Tier::D);

        store.begin_drag("a");
        store.drop_into(Tier::A);

        assert!(store.tier(Tier::D).is_empty());
        assert_eq!(ids(store.tier(Tier::A)), vec!["a"]);
        assert_eq!(store.locate("a"), Some(Location::Tier(Tier::A)));
        assert_eq!(store.character("a").unwrap().tier, Some(Tier::A));
    }

    #[test]
    fn test_drop_into_same_tier_moves_to_tail() {
        let mut store = TierStore::new(vec![character("a"), character("b"), character("c")]);
        for id in ["a", "b", "c"] {
            store.begin_drag(id);
            store.drop_into(Tier::C);
        }
        assert_eq!(ids(store.tier(Tier::C)), vec!["a", "b", "c"]);

        store.begin_drag("a");
        assert!(store.drop_into(Tier::C));

        assert_eq!(ids(store.tier(Tier::C)), vec!["b", "c", "a"]);
        assert_eq!(store.len(), 3);
        assert!(store.check_invariant().is_ok());
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut store = store_ab();
        store.begin_drag("b");
        store.drop_into(Tier::B);

        assert!(store.remove_from_tier("b"));
        let after_first = store.snapshot();

        assert!(!store.remove_from_tier("b"));
        assert_eq!(store.snapshot(), after_first);
        assert_eq!(ids(store.pool()), vec!["a", "b"]);
    }

    #[test]
    fn test_begin_drag_last_writer_wins() {
        let mut store = store_ab();

        store.begin_drag("a");
        store.begin_drag("b");
        assert_eq!(store.dragging(), Some("b"));

        store.drop_into(Tier::S);
        assert_eq!(ids(store.tier(Tier::S)), vec!["b"]);
        assert_eq!(ids(store.pool()), vec!["a"]);
    }

    #[test]
    fn test_begin_drag_unknown_id_keeps_session() {
        let mut store = store_ab();

        store.begin_drag("a");
        assert!(!store.begin_drag("ghost"));
        assert_eq!(store.dragging(), Some("a"));

        let mut idle = store_ab();
        assert!(!idle.begin_drag("ghost"));
        assert!(!idle.drag_session().is_active());
    }

    #[test]
    fn test_cancel_drag() {
        let mut store = store_ab();
        assert!(!store.cancel_drag());

        store.begin_drag("a");
        let before = store.snapshot();
        assert!(store.cancel_drag());

        assert_eq!(store.dragging(), None);
        assert_eq!(store.pool(), before.pool.as_slice());
        assert!(!store.drop_into(Tier::S));
        assert!(store.tier(Tier::S).is_empty());
    }

    #[test]
    fn test_drop_with_stale_subject_clears_session() {
        let mut store = store_ab();
        store.drag.begin("ghost");
        let pool_before = store.pool().to_vec();

        assert!(store.drop_into(Tier::S));
        assert_eq!(store.dragging(), None);
        assert!(store.tier(Tier::S).is_empty());
        assert_eq!(store.pool(), pool_before.as_slice());
        assert!(!store.drop_into(Tier::S));
    }

    #[test]
    fn test_remove_unknown_or_pooled_is_noop() {
        let mut store = store_ab();
        let before = store.snapshot();

        assert!(!store.remove_from_tier("a"));
        assert!(!store.remove_from_tier("missing"));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_snapshot_lists_all_tiers_in_rank_order() {
        let mut store = store_ab();
        store.begin_drag("a");
        store.drop_into(Tier::D);
        store.begin_drag("b");

        let snapshot = store.snapshot();
        let order: Vec<Tier> = snapshot.tiers.iter().map(|row| row.tier).collect();

        assert_eq!(order, Tier::ALL.to_vec());
        assert_eq!(ids(snapshot.tier(Tier::D)), vec!["a"]);
        assert_eq!(snapshot.ranked_count(), 1);
        assert_eq!(snapshot.dragging.as_deref(), Some("b"));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut store = store_ab();
        store.begin_drag("a");
        store.drop_into(Tier::S);

        let json = serde_json::to_value(store.snapshot()).unwrap();

        assert_eq!(json["pool"][0]["id"], "b");
        assert_eq!(json["tiers"][0]["tier"], "S");
        assert_eq!(json["tiers"][0]["characters"][0]["tier"], "S");
        assert_eq!(json["tiers"].as_array().unwrap().len(), 5);
        assert!(json["dragging"].is_null());
    }

    #[test]
    fn test_check_invariant_detects_violations() {
        let mut store = store_ab();
        store.pool.push(character("a"));
        assert_eq!(
            store.check_invariant(),
            Err(InvariantViolation::Duplicated("a".to_string()))
        );

        let mut store = store_ab();
        store.pool.pop();
        assert_eq!(
            store.check_invariant(),
            Err(InvariantViolation::Missing("b".to_string()))
        );

        let mut store = store_ab();
        store.pool[0].tier = Some(Tier::A);
        assert!(matches!(
            store.check_invariant(),
            Err(InvariantViolation::LabelMismatch { .. })
        ));

        let mut store = store_ab();
        store.pool.push(character("z"));
        assert_eq!(
            store.check_invariant(),
            Err(InvariantViolation::Unknown("z".to_string()))
        );
    }
}
