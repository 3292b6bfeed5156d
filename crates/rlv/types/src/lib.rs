//! Core value types for the RLV protocol engine
//!
//! Everything here is a plain value: behavior names and their
//! classification tables, typed restriction arguments, the immutable
//! `Restriction` record, attachment-point and wearable-layer
//! enumerations, and the strongly-typed ids shared by the other crates.

pub mod arg;
pub mod attachment;
pub mod behavior;
pub mod error;
pub mod ids;
pub mod restriction;
pub mod wearable;

pub use arg::RestrictionArg;
pub use attachment::AttachmentPoint;
pub use behavior::{BehaviorName, FolderLockFamily, RlvBehavior};
pub use error::{RlvError, RlvResult};
pub use ids::{FolderId, ItemId, ObjectId};
pub use restriction::Restriction;
pub use wearable::WearableType;
