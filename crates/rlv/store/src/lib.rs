//! Restriction store
//!
//! Maps each canonical behavior to the set of restriction instances
//! currently installed for it. Membership is by value equality on
//! `(behavior, sender, args)`, so re-issuing an identical restriction is
//! a mutation no-op, but the change notification still fires, because
//! notification targets observe commands, not set mutations.
//!
//! All mutation and enumeration is guarded by one lock; enumeration
//! returns owned snapshots so callers never observe a store mutated
//! mid-iteration. Listeners are snapshotted before dispatch and invoked
//! after the lock is released; a listener must not reenter command
//! processing.

use rlv_types::{ObjectId, Restriction, RlvBehavior};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// A restriction set change, delivered to subscribed listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestrictionChange {
    /// `=n`: the restriction was issued (it may have already been present)
    Added(Restriction),
    /// `=y`: the restriction was revoked (it may not have been present)
    Removed(Restriction),
}

impl RestrictionChange {
    pub fn restriction(&self) -> &Restriction {
        match self {
            Self::Added(r) | Self::Removed(r) => r,
        }
    }

    /// Wire suffix used in notification strings
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Added(_) => "=n",
            Self::Removed(_) => "=y",
        }
    }
}

/// Observer of restriction set changes.
///
/// Dispatch is fire-and-forget: listener panics are not propagated to
/// the mutating caller, and a listener must not call back into the
/// engine's command entry point.
pub trait RestrictionListener: Send + Sync {
    fn on_change(&self, change: &RestrictionChange);
}

/// The restriction store
#[derive(Default)]
pub struct RestrictionStore {
    by_behavior: Mutex<HashMap<RlvBehavior, HashSet<Restriction>>>,
    listeners: Mutex<Vec<Arc<dyn RestrictionListener>>>,
}

impl RestrictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change listener
    pub fn subscribe(&self, listener: Arc<dyn RestrictionListener>) {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        listeners.push(listener);
    }

    /// Install a restriction. Returns whether the set actually changed;
    /// the `Added` notification fires either way.
    pub fn add(&self, restriction: Restriction) -> bool {
        let inserted = {
            let mut map = self.lock_map();
            map.entry(restriction.behavior().clone())
                .or_default()
                .insert(restriction.clone())
        };
        debug!(
            behavior = %restriction.behavior(),
            sender = %restriction.sender(),
            duplicate = !inserted,
            "restriction added"
        );
        self.notify(&RestrictionChange::Added(restriction));
        inserted
    }

    /// Remove a restriction by value. Returns whether the set actually
    /// changed; the `Removed` notification fires either way.
    pub fn remove(&self, restriction: &Restriction) -> bool {
        let removed = {
            let mut map = self.lock_map();
            match map.get_mut(restriction.behavior()) {
                Some(set) => {
                    let removed = set.remove(restriction);
                    if set.is_empty() {
                        map.remove(restriction.behavior());
                    }
                    removed
                }
                None => false,
            }
        };
        debug!(
            behavior = %restriction.behavior(),
            sender = %restriction.sender(),
            present = removed,
            "restriction removed"
        );
        self.notify(&RestrictionChange::Removed(restriction.clone()));
        removed
    }

    /// Remove every restriction issued by `sender` whose display name
    /// contains `filter` (case-insensitive; no filter removes all of the
    /// sender's restrictions). Each removal notifies individually.
    /// Returns the removed restrictions.
    pub fn clear(&self, sender: ObjectId, filter: Option<&str>) -> Vec<Restriction> {
        let filter = filter.map(|f| f.to_ascii_lowercase());
        let removed: Vec<Restriction> = {
            let mut map = self.lock_map();
            let mut removed = Vec::new();
            map.retain(|_, set| {
                set.retain(|r| {
                    let matches = r.sender() == sender
                        && filter
                            .as_deref()
                            .map(|f| r.original_behavior().contains(f))
                            .unwrap_or(true);
                    if matches {
                        removed.push(r.clone());
                    }
                    !matches
                });
                !set.is_empty()
            });
            removed
        };
        debug!(sender = %sender, count = removed.len(), "cleared restrictions");
        for restriction in &removed {
            self.notify(&RestrictionChange::Removed(restriction.clone()));
        }
        removed
    }

    /// All restrictions for an exact canonical behavior (empty when none)
    pub fn get(&self, behavior: &RlvBehavior) -> Vec<Restriction> {
        let map = self.lock_map();
        map.get(behavior)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether any restriction of this behavior is installed
    pub fn contains(&self, behavior: &RlvBehavior) -> bool {
        let map = self.lock_map();
        map.contains_key(behavior)
    }

    /// Whether an argument-less (unconditional) restriction of this
    /// behavior is installed
    pub fn contains_unconditional(&self, behavior: &RlvBehavior) -> bool {
        let map = self.lock_map();
        map.get(behavior)
            .map(|set| set.iter().any(|r| r.args().is_empty()))
            .unwrap_or(false)
    }

    /// Case-insensitive substring search against the display name, with
    /// an optional sender filter (backs `getstatus` / `getstatusall`).
    pub fn find(&self, name_part: &str, sender: Option<ObjectId>) -> Vec<Restriction> {
        let part = name_part.to_ascii_lowercase();
        let map = self.lock_map();
        let mut found: Vec<Restriction> = map
            .values()
            .flatten()
            .filter(|r| {
                r.original_behavior().contains(&part)
                    && sender.map(|s| r.sender() == s).unwrap_or(true)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.status_text().cmp(&b.status_text()));
        found
    }

    /// Snapshot of every installed restriction
    pub fn all(&self) -> Vec<Restriction> {
        let map = self.lock_map();
        map.values().flatten().cloned().collect()
    }

    /// Total number of installed restrictions
    pub fn len(&self) -> usize {
        let map = self.lock_map();
        map.values().map(|set| set.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_map(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<RlvBehavior, HashSet<Restriction>>> {
        self.by_behavior
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn notify(&self, change: &RestrictionChange) {
        // Snapshot subscribers first so a listener registering another
        // listener cannot invalidate the iteration.
        let listeners: Vec<Arc<dyn RestrictionListener>> = {
            let listeners = self
                .listeners
                .lock()
                .unwrap_or_else(|poison| poison.into_inner());
            listeners.clone()
        };
        for listener in listeners {
            if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_change(change)
            }))
            .is_err()
            {
                warn!("restriction listener panicked; change dropped for that listener");
            }
        }
    }
}

impl std::fmt::Debug for RestrictionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestrictionStore")
            .field("restrictions", &self.len())
            .finish()
    }
}
