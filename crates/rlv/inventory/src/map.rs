//! The derived inventory index
//!
//! Built by one full walk over a provider snapshot, O(folders + items).
//! Never mutated in place: each snapshot produces a fresh map.

use crate::naming;
use crate::snapshot::{FolderSnapshot, ItemSnapshot};
use rlv_types::{AttachmentPoint, FolderId, ItemId, ObjectId, WearableType};
use std::collections::HashMap;
use tracing::trace;

/// One folder in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct FolderNode {
    pub id: FolderId,
    pub name: String,
    /// Parent folder id; `None` for the root
    pub parent: Option<FolderId>,
    /// Child folders in snapshot order
    pub folders: Vec<FolderId>,
    /// Directly contained items in snapshot order
    pub items: Vec<ItemId>,
}

/// One item in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct ItemNode {
    pub id: ItemId,
    pub name: String,
    /// Owning folder id
    pub folder: FolderId,
    pub worn_on: Option<WearableType>,
    pub attached_to: Option<AttachmentPoint>,
    pub attached_prim: Option<ObjectId>,
}

impl ItemNode {
    pub fn is_on_avatar(&self) -> bool {
        self.worn_on.is_some() || self.attached_to.is_some()
    }
}

/// Id-addressed index over one inventory snapshot
#[derive(Debug, Clone, Default)]
pub struct InventoryMap {
    folders: HashMap<FolderId, FolderNode>,
    items: HashMap<ItemId, ItemNode>,
    root: Option<FolderId>,
}

impl InventoryMap {
    /// Build the index from a snapshot with one full tree walk
    pub fn build(snapshot: &FolderSnapshot) -> Self {
        let mut map = Self::default();
        map.root = Some(snapshot.id);
        map.ingest(snapshot, None);
        trace!(
            folders = map.folders.len(),
            items = map.items.len(),
            "inventory map built"
        );
        map
    }

    fn ingest(&mut self, snapshot: &FolderSnapshot, parent: Option<FolderId>) {
        let node = FolderNode {
            id: snapshot.id,
            name: snapshot.name.clone(),
            parent,
            folders: snapshot.folders.iter().map(|f| f.id).collect(),
            items: snapshot.items.iter().map(|i| i.id).collect(),
        };
        self.folders.insert(node.id, node);

        for item in &snapshot.items {
            self.items.insert(item.id, item_node(item, snapshot.id));
        }
        for child in &snapshot.folders {
            self.ingest(child, Some(snapshot.id));
        }
    }

    /// Root folder id; `None` only for an unbuilt map
    pub fn root(&self) -> Option<FolderId> {
        self.root
    }

    pub fn folder(&self, id: FolderId) -> Option<&FolderNode> {
        self.folders.get(&id)
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemNode> {
        self.items.get(&id)
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// All items, iteration order unspecified
    pub fn items(&self) -> impl Iterator<Item = &ItemNode> {
        self.items.values()
    }

    /// Child folder nodes of a folder, snapshot order
    pub fn child_folders(&self, id: FolderId) -> Vec<&FolderNode> {
        self.folders
            .get(&id)
            .map(|f| f.folders.iter().filter_map(|c| self.folders.get(c)).collect())
            .unwrap_or_default()
    }

    /// Items directly in a folder, snapshot order
    pub fn items_in(&self, id: FolderId) -> Vec<&ItemNode> {
        self.folders
            .get(&id)
            .map(|f| f.items.iter().filter_map(|i| self.items.get(i)).collect())
            .unwrap_or_default()
    }

    /// Every folder strictly below `id`, depth-first
    pub fn descendant_folders(&self, id: FolderId) -> Vec<FolderId> {
        let mut found = Vec::new();
        let mut stack: Vec<FolderId> = self
            .folders
            .get(&id)
            .map(|f| f.folders.clone())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            if let Some(node) = self.folders.get(&next) {
                stack.extend(node.folders.iter().copied());
            }
            found.push(next);
        }
        found
    }

    /// Whether `candidate` is `folder` or one of its descendants
    pub fn is_in_subtree(&self, folder: FolderId, candidate: FolderId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == folder {
                return true;
            }
            current = self.folders.get(&id).and_then(|f| f.parent);
        }
        false
    }

    /// Resolve a `/`-separated path to a folder.
    ///
    /// Greedy longest-match per step, not full backtracking: among the
    /// current folder's children, the candidate consuming the longest
    /// prefix of the remaining path wins (child names are matched with
    /// their `~`/`+` marker stripped; an exact, unstripped match beats a
    /// stripped match of equal length; remaining ties keep the first
    /// occurrence). Ambiguous trees may therefore resolve to an
    /// unintuitive but deterministic folder. Matching is
    /// case-insensitive; `skip_private` excludes `.`-prefixed children.
    pub fn folder_from_path(&self, path: &str, skip_private: bool) -> Option<FolderId> {
        let mut current = self.root?;
        let mut remaining = path.trim_matches('/');
        if remaining.is_empty() {
            return Some(current);
        }

        while !remaining.is_empty() {
            // (folder, consumed chars, exact) of the best candidate so far
            let mut best: Option<(FolderId, usize, bool)> = None;
            for child in self.child_folders(current) {
                if skip_private && naming::is_private(&child.name) {
                    continue;
                }
                let candidates = [
                    (child.name.as_str(), true),
                    (naming::stripped(&child.name), false),
                ];
                for (candidate, exact) in candidates {
                    if let Some(consumed) = prefix_match_len(remaining, candidate) {
                        let better = match best {
                            None => true,
                            Some((_, best_len, best_exact)) => {
                                consumed > best_len || (consumed == best_len && exact && !best_exact)
                            }
                        };
                        if better {
                            best = Some((child.id, consumed, exact));
                        }
                    }
                }
            }

            let (next, consumed, _) = best?;
            current = next;
            remaining = remaining[consumed..].trim_start_matches('/');
        }

        Some(current)
    }

    /// Folders containing a target. Exactly one criterion is honored, in
    /// priority order item > attachment point > wearable layer. Reverse
    /// lookups by point/layer only see items currently on the avatar;
    /// attachments with no owning folder in the snapshot are external
    /// and excluded by construction. `first_only` keeps legacy
    /// single-result semantics.
    pub fn folders_containing(
        &self,
        item: Option<ItemId>,
        point: Option<AttachmentPoint>,
        layer: Option<WearableType>,
        first_only: bool,
    ) -> Vec<FolderId> {
        if let Some(item) = item {
            return self
                .items
                .get(&item)
                .map(|node| vec![node.folder])
                .unwrap_or_default();
        }

        let matches: Box<dyn Fn(&ItemNode) -> bool> = if let Some(point) = point {
            Box::new(move |node: &ItemNode| node.attached_to == Some(point))
        } else if let Some(layer) = layer {
            Box::new(move |node: &ItemNode| node.worn_on == Some(layer))
        } else {
            return Vec::new();
        };

        let mut found: Vec<FolderId> = Vec::new();
        // Deterministic order: walk the tree, not the hash map
        let mut stack = self.root.map(|r| vec![r]).unwrap_or_default();
        while let Some(folder) = stack.pop() {
            for item in self.items_in(folder) {
                if matches(item) && !found.contains(&item.folder) {
                    found.push(item.folder);
                    if first_only {
                        return found;
                    }
                }
            }
            if let Some(node) = self.folders.get(&folder) {
                stack.extend(node.folders.iter().rev().copied());
            }
        }
        found
    }

    /// The folder owning the item whose attached prim is `prim`; this is
    /// how a command sender (an in-world object) maps back to inventory.
    pub fn folder_of_attached_prim(&self, prim: ObjectId) -> Option<FolderId> {
        self.items
            .values()
            .find(|node| node.attached_prim == Some(prim))
            .map(|node| node.folder)
    }

    /// `/`-joined names from below the root down to the folder. The root
    /// itself is excluded; the root resolves to the empty string.
    pub fn path_to_folder(&self, id: FolderId) -> Option<String> {
        if Some(id) == self.root {
            return Some(String::new());
        }
        let mut segments = Vec::new();
        let mut current = self.folders.get(&id)?;
        loop {
            if Some(current.id) == self.root {
                break;
            }
            segments.push(current.name.clone());
            current = self.folders.get(&current.parent?)?;
        }
        segments.reverse();
        Some(segments.join("/"))
    }
}

fn item_node(item: &ItemSnapshot, folder: FolderId) -> ItemNode {
    ItemNode {
        id: item.id,
        name: item.name.clone(),
        folder,
        worn_on: item.worn_on,
        attached_to: item.attached_to,
        attached_prim: item.attached_prim,
    }
}

/// Length of `candidate` when `remaining` starts with it
/// case-insensitively and the match ends on a segment boundary
fn prefix_match_len(remaining: &str, candidate: &str) -> Option<usize> {
    if candidate.is_empty() || remaining.len() < candidate.len() {
        return None;
    }
    if !remaining[..candidate.len()].eq_ignore_ascii_case(candidate) {
        return None;
    }
    let rest = &remaining[candidate.len()..];
    if rest.is_empty() || rest.starts_with('/') {
        Some(candidate.len())
    } else {
        None
    }
}
