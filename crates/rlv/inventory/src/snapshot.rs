//! Provider-facing snapshot types
//!
//! The wire format an inventory provider hands the engine: an owned
//! folder tree plus per-item worn/attached state. Snapshots are consumed
//! whole; the engine re-queries the provider rather than caching across
//! commands.

use rlv_types::{AttachmentPoint, FolderId, ItemId, ObjectId, WearableType};
use serde::{Deserialize, Serialize};

/// One folder in a provider snapshot, owning its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderSnapshot {
    pub id: FolderId,
    pub name: String,
    #[serde(default)]
    pub folders: Vec<FolderSnapshot>,
    #[serde(default)]
    pub items: Vec<ItemSnapshot>,
}

impl FolderSnapshot {
    pub fn new(id: FolderId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            folders: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn with_folder(mut self, folder: FolderSnapshot) -> Self {
        self.folders.push(folder);
        self
    }

    pub fn with_item(mut self, item: ItemSnapshot) -> Self {
        self.items.push(item);
        self
    }
}

/// One item in a provider snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub name: String,
    /// Clothing layer the item is currently worn on, if any
    #[serde(default)]
    pub worn_on: Option<WearableType>,
    /// Attachment point the item is currently attached at, if any
    #[serde(default)]
    pub attached_to: Option<AttachmentPoint>,
    /// In-world prim id while attached, if any
    #[serde(default)]
    pub attached_prim: Option<ObjectId>,
}

impl ItemSnapshot {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            worn_on: None,
            attached_to: None,
            attached_prim: None,
        }
    }

    pub fn worn(mut self, layer: WearableType) -> Self {
        self.worn_on = Some(layer);
        self
    }

    pub fn attached(mut self, point: AttachmentPoint, prim: ObjectId) -> Self {
        self.attached_to = Some(point);
        self.attached_prim = Some(prim);
        self
    }

    /// Whether the item is currently on the avatar in any form
    pub fn is_on_avatar(&self) -> bool {
        self.worn_on.is_some() || self.attached_to.is_some()
    }
}
