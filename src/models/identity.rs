use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::heuristics::surname_of;
use crate::models::RosterSnapshot;

/// Key that absorbs chair cues with no resolvable person
pub const PLACEHOLDER: &str = "__UNKNOWN_CHAIR__";

/// Display name for the placeholder key
pub const PLACEHOLDER_NAME: &str = "Unknown Chair";

/// Two active roster entries that share a surname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurnameCollision {
    pub surname: String,
    /// The name that was kept
    pub kept: String,
    /// The name that lost the tie-break
    pub shadowed: String,
}

/// Surname token -> display name for a single document
#[derive(Debug, Clone)]
pub struct IdentityMap {
    names: HashMap<String, String>,
    collisions: Vec<SurnameCollision>,
}

impl Default for IdentityMap {
    fn default() -> Self {
        let mut names = HashMap::new();
        names.insert(PLACEHOLDER.to_string(), PLACEHOLDER_NAME.to_string());
        Self {
            names,
            collisions: Vec::new(),
        }
    }
}

impl IdentityMap {
    /// Seed from the active roster slice.
    ///
    /// Surnames are not unique: when two people in the slice share one, the
    /// first in roster order keeps the surname and the other is recorded as a
    /// collision.
    pub fn from_snapshot(snapshot: &RosterSnapshot<'_>) -> Self {
        let mut map = Self::default();

        for name in snapshot.names() {
            let Some(surname) = surname_of(name) else {
                continue;
            };
            match map.names.entry(surname) {
                Entry::Vacant(slot) => {
                    slot.insert(name.to_string());
                }
                Entry::Occupied(slot) => {
                    if slot.get() != name {
                        map.collisions.push(SurnameCollision {
                            surname: slot.key().clone(),
                            kept: slot.get().clone(),
                            shadowed: name.to_string(),
                        });
                    }
                }
            }
        }

        if !map.collisions.is_empty() {
            debug!(
                "{} surname collisions on {} (first roster entry kept)",
                map.collisions.len(),
                snapshot.date()
            );
        }

        map
    }

    pub fn contains(&self, surname: &str) -> bool {
        self.names.contains_key(surname)
    }

    pub fn resolve(&self, surname: &str) -> Option<&str> {
        self.names.get(surname).map(String::as_str)
    }

    /// Add a best-effort name unless the surname is already known
    pub fn insert_if_absent(&mut self, surname: impl Into<String>, display: impl Into<String>) {
        self.names.entry(surname.into()).or_insert_with(|| display.into());
    }

    pub fn collisions(&self) -> &[SurnameCollision] {
        &self.collisions
    }
}
