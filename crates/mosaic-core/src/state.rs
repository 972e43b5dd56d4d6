//! Component state storage and the queue of pending functional updates.
//!
//! [`StateHandle`] is owned by a tree coordinator. Each layout pass takes a
//! [`StateScope`] snapshot, resolves state for the components it visits
//! (applying any queued updates first) and, if the pass wins, hands the
//! scope back through [`StateHandle::commit`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::collections::{Map, Set};
use crate::component::ComponentSpec;

pub type StateValue = Arc<dyn Any + Send + Sync>;

type UpdateFn = Arc<dyn Fn(&StateValue) -> Option<StateValue> + Send + Sync>;

/// A `previous -> next` transition on one component's state.
#[derive(Clone)]
pub struct StateUpdate {
    apply: UpdateFn,
}

impl StateUpdate {
    pub fn new<T, F>(update: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> T + Send + Sync + 'static,
    {
        Self {
            apply: Arc::new(move |previous: &StateValue| {
                previous
                    .downcast_ref::<T>()
                    .map(|value| Arc::new(update(value)) as StateValue)
            }),
        }
    }

    /// Returns `None` when the stored state is not of the type this update
    /// was written for.
    pub fn apply(&self, previous: &StateValue) -> Option<StateValue> {
        (self.apply)(previous)
    }
}

impl fmt::Debug for StateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateUpdate")
    }
}

#[derive(Clone, Debug)]
struct PendingUpdate {
    sequence: u64,
    update: StateUpdate,
}

#[derive(Default)]
pub struct StateHandle {
    committed: Map<Arc<str>, StateValue>,
    pending: IndexMap<Arc<str>, Vec<PendingUpdate>>,
    next_sequence: u64,
}

impl StateHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `update` for the component at `global_key` and returns its
    /// sequence number.
    pub fn enqueue(&mut self, global_key: &str, update: StateUpdate) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending
            .entry(Arc::from(global_key))
            .or_default()
            .push(PendingUpdate { sequence, update });
        sequence
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub fn committed(&self, global_key: &str) -> Option<&StateValue> {
        self.committed.get(global_key)
    }

    pub fn snapshot(&self) -> StateScope {
        let mut pending = Map::default();
        for (key, updates) in &self.pending {
            pending.insert(Arc::clone(key), updates.clone());
        }
        StateScope {
            committed: self.committed.clone(),
            pending,
            resolved: Map::default(),
            updated: Set::default(),
            consumed: Set::default(),
            horizon: self.next_sequence,
        }
    }

    /// Adopts the states resolved by a winning pass and drops every update
    /// its snapshot saw, including those for components the pass never
    /// reached. Updates enqueued after the snapshot stay pending.
    pub fn commit(&mut self, scope: &StateScope) {
        self.committed = scope.resolved.clone();
        self.pending.retain(|global_key, updates| {
            let orphaned = updates
                .iter()
                .filter(|pending| {
                    pending.sequence < scope.horizon && !scope.consumed.contains(&pending.sequence)
                })
                .count();
            if orphaned > 0 {
                log::debug!("dropping {orphaned} state updates for unresolved {global_key}");
            }
            updates.retain(|pending| pending.sequence >= scope.horizon);
            !updates.is_empty()
        });
    }
}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("committed", &self.committed.len())
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Per-pass view of component state.
pub struct StateScope {
    committed: Map<Arc<str>, StateValue>,
    pending: Map<Arc<str>, Vec<PendingUpdate>>,
    resolved: Map<Arc<str>, StateValue>,
    updated: Set<Arc<str>>,
    consumed: Set<u64>,
    /// Sequences below this were queued when the snapshot was taken.
    horizon: u64,
}

impl StateScope {
    pub fn empty() -> Self {
        StateHandle::default().snapshot()
    }

    /// Returns the state of the component at `global_key` for this pass,
    /// creating initial state on first sight and applying pending updates.
    /// Repeated calls for one key return the same value.
    pub fn resolve(&mut self, global_key: &str, spec: &dyn ComponentSpec) -> Option<StateValue> {
        if let Some(value) = self.resolved.get(global_key) {
            return Some(Arc::clone(value));
        }
        let updates = self.pending.get(global_key);
        let base = self
            .committed
            .get(global_key)
            .cloned()
            .or_else(|| spec.create_initial_state());
        let Some(mut value) = base else {
            if let Some(updates) = updates {
                log::warn!("dropping state updates for stateless component at {global_key}");
                self.consumed.extend(updates.iter().map(|pending| pending.sequence));
            }
            return None;
        };
        if let Some(updates) = updates {
            for pending in updates {
                match pending.update.apply(&value) {
                    Some(next) => value = next,
                    None => log::warn!("state update type mismatch at {global_key}"),
                }
                self.consumed.insert(pending.sequence);
            }
            self.updated.insert(Arc::from(global_key));
        }
        self.resolved.insert(Arc::from(global_key), Arc::clone(&value));
        Some(value)
    }

    /// Whether queued updates were applied to `global_key` in this pass.
    pub fn was_updated(&self, global_key: &str) -> bool {
        self.updated.contains(global_key)
    }

    pub fn state(&self, global_key: &str) -> Option<&StateValue> {
        self.resolved.get(global_key)
    }

    pub fn consumed_count(&self) -> usize {
        self.consumed.len()
    }
}

impl fmt::Debug for StateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateScope")
            .field("resolved", &self.resolved.len())
            .field("updated", &self.updated.len())
            .field("consumed", &self.consumed.len())
            .finish()
    }
}
