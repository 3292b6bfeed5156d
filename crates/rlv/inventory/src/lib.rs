//! Inventory indexing for the RLV engine
//!
//! The engine does not own inventory: an external provider supplies a
//! folder-tree snapshot per operation, and this crate builds a derived,
//! id-addressed index over it. Nodes live in one arena keyed by id, with
//! parent ids and child id lists instead of pointers, so ancestor walks
//! are O(depth) without reference cycles.
//!
//! Folder and item names carry protocol semantics: a leading `.` hides
//! the node from recursive traversal and default path resolution, `~`
//! and `+` are prefixes stripped for matching (`+` also switches attach
//! semantics to "add"), and a parenthesized trailing token encodes a
//! default attachment point.

pub mod map;
pub mod naming;
pub mod snapshot;

pub use map::{FolderNode, InventoryMap, ItemNode};
pub use snapshot::{FolderSnapshot, ItemSnapshot};
