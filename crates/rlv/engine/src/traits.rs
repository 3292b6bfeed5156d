//! Collaborator interfaces at the engine boundary
//!
//! Async here is a signature convention: commands run synchronously to
//! completion, and these calls are the only suspension points. The host
//! may perform real I/O behind them. The inventory provider is
//! re-queried for every command that needs the folder tree; the engine
//! never caches a snapshot across commands.

use crate::collect::AttachmentRequest;
use async_trait::async_trait;
use rlv_inventory::{FolderSnapshot, ItemSnapshot};
use rlv_types::{ItemId, ObjectId, RlvResult};
use uuid::Uuid;

/// Supplies the live inventory state.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    /// The shared folder subtree, or `None` when the agent has none
    async fn try_get_shared_folder(&self) -> RlvResult<Option<FolderSnapshot>>;

    /// Every item currently worn or attached, shared or not
    async fn try_get_current_outfit(&self) -> RlvResult<Vec<ItemSnapshot>>;
}

/// Camera parameter read back by the `getcam_*` query family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraParam {
    FovMin,
    FovMax,
    Fov,
    AvDistMin,
    AvDistMax,
}

/// Read-only world state the query handlers consult.
#[async_trait]
pub trait WorldProvider: Send + Sync {
    async fn object_exists(&self, object: ObjectId) -> RlvResult<bool>;

    async fn is_sitting(&self) -> RlvResult<bool>;

    /// The object currently sat on, when sitting
    async fn sit_object(&self) -> RlvResult<Option<ObjectId>>;

    async fn active_group(&self) -> RlvResult<String>;

    async fn camera_param(&self, param: CameraParam) -> RlvResult<f32>;

    async fn height_offset(&self) -> RlvResult<f32>;

    async fn env_setting(&self, key: &str) -> RlvResult<Option<String>>;

    async fn debug_setting(&self, key: &str) -> RlvResult<Option<String>>;
}

/// Outbound channel back to the message transport.
#[async_trait]
pub trait ReplyTransport: Send + Sync {
    async fn send_reply(&self, channel: i32, text: &str) -> RlvResult<()>;
}

/// Destination of a forced teleport
#[derive(Debug, Clone, PartialEq)]
pub struct TpDestination {
    /// Target region; `None` teleports within the current region
    pub region: Option<String>,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Target of a forced group change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupTarget {
    Id(Uuid),
    Name(String),
}

/// Side effects the host performs on the agent on the engine's behalf.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn attach(&self, requests: Vec<AttachmentRequest>) -> RlvResult<()>;

    async fn detach(&self, items: Vec<ItemId>) -> RlvResult<()>;

    async fn rem_outfit(&self, items: Vec<ItemId>) -> RlvResult<()>;

    async fn sit(&self, object: ObjectId) -> RlvResult<()>;

    async fn unsit(&self) -> RlvResult<()>;

    async fn sit_ground(&self) -> RlvResult<()>;

    async fn set_rot(&self, radians: f32) -> RlvResult<()>;

    async fn adjust_height(&self, distance: f32, factor: f32, delta: f32) -> RlvResult<()>;

    async fn set_cam_fov(&self, fov: f32) -> RlvResult<()>;

    async fn tp_to(&self, destination: TpDestination) -> RlvResult<()>;

    async fn set_group(&self, group: GroupTarget) -> RlvResult<()>;

    async fn set_env(&self, key: &str, value: &str) -> RlvResult<()>;

    async fn set_debug(&self, key: &str, value: &str) -> RlvResult<()>;
}
