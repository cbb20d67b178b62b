use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

pub const STATE_UNKNOWN: &str = "unknown";
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// Current state string of every entity the hub knows about
///
/// Templates read from here; the hub writes after each update.
#[derive(Debug, Default)]
pub struct StateStore {
    inner: RwLock<HashMap<String, String>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity_id: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity_id)
            .cloned()
    }

    pub fn set(&self, entity_id: &str, state: String) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entity_id.to_string(), state);
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(entity_id)
    }

    /// Sorted copy of all states
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn extend<I>(&self, states: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(states);
    }
}
