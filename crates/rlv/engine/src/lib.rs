//! Top-level protocol engine
//!
//! Owns the restriction store and the derived locked-folder map, and
//! orchestrates everything the lower crates provide: inbound lines enter
//! through [`RlvEngine::process_message`], which tokenizes, routes past
//! the blacklist, and dispatches to the restriction, force-action, or
//! query handlers. Side effects and replies leave through the
//! collaborator traits in [`traits`]; the engine itself never performs
//! I/O and never suspends except at those calls.

pub mod collect;
pub mod engine;
pub mod options;
pub mod traits;

mod force;
mod notify;
mod query;

pub use collect::{
    collect_items_to_attach, collect_items_to_detach, AttachmentRequest, DetachGate,
};
pub use engine::RlvEngine;
pub use options::{EngineOptions, EngineOptionsBuilder};
pub use traits::{
    ActionHandler, CameraParam, GroupTarget, InventoryProvider, ReplyTransport, TpDestination,
    WorldProvider,
};
