//! Registry mapping published action ids back to the command that produced them.

use super::ActionCommand;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

pub const DEFAULT_ACTION_CAPACITY: usize = 4096;

/// What the registry knows about one published action
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredAction {
    pub id: String,
    pub plugin_id: String,
    pub result_title: String,
    pub command: ActionCommand,
}

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<String, RegisteredAction>,
    order: VecDeque<String>,
}

/// Bounded action registry. Once full, registering evicts the oldest entry,
/// so ids from long-gone result lists eventually stop resolving.
#[derive(Debug)]
pub struct ActionRegistry {
    entries: Mutex<Entries>,
    capacity: usize,
}

impl ActionRegistry {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Record a command and return the id the UI will send back.
    pub fn register(
        &self,
        plugin_id: impl Into<String>,
        result_title: impl Into<String>,
        command: ActionCommand,
    ) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let action = RegisteredAction {
            id: id.clone(),
            plugin_id: plugin_id.into(),
            result_title: result_title.into(),
            command,
        };

        let mut entries = self.lock();
        entries.order.push_back(id.clone());
        entries.by_id.insert(id.clone(), action);
        while entries.order.len() > self.capacity {
            if let Some(evicted) = entries.order.pop_front() {
                trace!("Evicting action {evicted}");
                entries.by_id.remove(&evicted);
            }
        }
        id
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<RegisteredAction> {
        self.lock().by_id.get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().by_id.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ACTION_CAPACITY)
    }
}
