//! Locked-folder engine
//!
//! Derives, from the restriction store and a fresh inventory map, which
//! folders currently have attach or detach locks on them. A folder gets
//! an entry when at least one governing restriction applies to it,
//! directly or via recursive propagation from an ancestor's `*allthis`
//! variant. The map is derived state: adding a governing restriction
//! applies incrementally, removing one rebuilds the whole map, because
//! removal must recompute what other restrictions still cover the same
//! folders.

use rlv_inventory::InventoryMap;
use rlv_store::RestrictionStore;
use rlv_types::{FolderId, FolderLockFamily, Restriction, RestrictionArg, RlvBehavior};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Lock state of one folder: the originating restrictions, bucketed.
///
/// Exceptions sit alongside restrictions instead of removing them; any
/// present exception wins over any number of restrictions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockedFolder {
    pub attach_restrictions: Vec<Restriction>,
    pub detach_restrictions: Vec<Restriction>,
    pub attach_exceptions: Vec<Restriction>,
    pub detach_exceptions: Vec<Restriction>,
}

impl LockedFolder {
    pub fn can_attach(&self) -> bool {
        !self.attach_exceptions.is_empty() || self.attach_restrictions.is_empty()
    }

    pub fn can_detach(&self) -> bool {
        !self.detach_exceptions.is_empty() || self.detach_restrictions.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        !self.attach_restrictions.is_empty() || !self.detach_restrictions.is_empty()
    }
}

/// The derived folder-id → lock-state map
#[derive(Debug, Clone, Default)]
pub struct LockedFolderMap {
    folders: HashMap<FolderId, LockedFolder>,
}

impl LockedFolderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full rebuild from the current restriction set and inventory.
    pub fn rebuild(store: &RestrictionStore, inventory: &InventoryMap) -> Self {
        let mut map = Self::new();
        for behavior in [
            RlvBehavior::DetachThis,
            RlvBehavior::DetachAllThis,
            RlvBehavior::AttachThis,
            RlvBehavior::AttachAllThis,
            RlvBehavior::DetachThisExcept,
            RlvBehavior::DetachAllThisExcept,
            RlvBehavior::AttachThisExcept,
            RlvBehavior::AttachAllThisExcept,
        ] {
            for restriction in store.get(&behavior) {
                map.apply(&restriction, inventory);
            }
        }
        debug!(locked = map.folders.len(), "locked folder map rebuilt");
        map
    }

    /// Apply one governing restriction (the incremental add path).
    ///
    /// Restrictions whose behavior is outside the folder-lock families
    /// are ignored. A restriction whose target cannot be resolved
    /// against the current inventory locks nothing.
    pub fn apply(&mut self, restriction: &Restriction, inventory: &InventoryMap) {
        let Some(family) = restriction.behavior().folder_lock_family() else {
            return;
        };
        for folder in resolve_targets(restriction, family, inventory) {
            self.add_locked(folder, restriction, family, inventory);
        }
    }

    fn add_locked(
        &mut self,
        folder: FolderId,
        restriction: &Restriction,
        family: FolderLockFamily,
        inventory: &InventoryMap,
    ) {
        self.record(folder, restriction, family);
        if family.recursive {
            for descendant in inventory.descendant_folders(folder) {
                self.record(descendant, restriction, family);
            }
        }
    }

    fn record(
        &mut self,
        folder: FolderId,
        restriction: &Restriction,
        family: FolderLockFamily,
    ) {
        let entry = self.folders.entry(folder).or_default();
        let bucket = match (family.attach, family.exception) {
            (true, false) => &mut entry.attach_restrictions,
            (false, false) => &mut entry.detach_restrictions,
            (true, true) => &mut entry.attach_exceptions,
            (false, true) => &mut entry.detach_exceptions,
        };
        if !bucket.contains(restriction) {
            trace!(folder = %folder, restriction = %restriction, "folder locked");
            bucket.push(restriction.clone());
        }
    }

    pub fn get(&self, folder: FolderId) -> Option<&LockedFolder> {
        self.folders.get(&folder)
    }

    /// True when no governing restriction blocks attaching to `folder`
    pub fn can_attach(&self, folder: FolderId) -> bool {
        self.folders.get(&folder).map(|f| f.can_attach()).unwrap_or(true)
    }

    /// True when no governing restriction blocks detaching from `folder`
    pub fn can_detach(&self, folder: FolderId) -> bool {
        self.folders.get(&folder).map(|f| f.can_detach()).unwrap_or(true)
    }

    pub fn is_locked(&self, folder: FolderId) -> bool {
        self.folders.get(&folder).map(|f| f.is_locked()).unwrap_or(false)
    }

    pub fn locked_count(&self) -> usize {
        self.folders.values().filter(|f| f.is_locked()).count()
    }
}

/// Resolve which folders a governing restriction targets:
/// no argument → the folder owning the sender's own item, widened for
/// the `*allthis` variants to its topmost ancestor below the shared
/// root so the whole ancestor chain locks; a layer or point argument →
/// every folder owning an item currently worn/attached there; an id
/// argument → the folder owning that item; a path argument → path
/// lookup with private-folder skipping disabled.
fn resolve_targets(
    restriction: &Restriction,
    family: FolderLockFamily,
    inventory: &InventoryMap,
) -> Vec<FolderId> {
    match restriction.args().first() {
        None => inventory
            .folder_of_attached_prim(restriction.sender())
            .map(|folder| {
                if family.recursive {
                    vec![topmost_below_root(folder, inventory)]
                } else {
                    vec![folder]
                }
            })
            .unwrap_or_default(),
        Some(RestrictionArg::Wearable(layer)) => {
            inventory.folders_containing(None, None, Some(*layer), false)
        }
        Some(RestrictionArg::Attachment(point)) => {
            inventory.folders_containing(None, Some(*point), None, false)
        }
        Some(RestrictionArg::Id(id)) => inventory
            .folders_containing(Some(rlv_types::ItemId::from_uuid(*id)), None, None, false),
        Some(RestrictionArg::Text(path)) => inventory
            .folder_from_path(path, false)
            .map(|f| vec![f])
            .unwrap_or_default(),
        Some(_) => Vec::new(),
    }
}

/// Highest ancestor of `folder` that is not the shared root itself;
/// `folder` when it already sits directly under the root.
fn topmost_below_root(folder: FolderId, inventory: &InventoryMap) -> FolderId {
    let root = inventory.root();
    let mut current = folder;
    while let Some(node) = inventory.folder(current) {
        match node.parent {
            Some(parent) if Some(parent) != root => current = parent,
            _ => break,
        }
    }
    current
}
