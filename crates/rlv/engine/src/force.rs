//! Force-command processing
//!
//! `@<behavior>[:option]=force` actions: forced attach/detach over the
//! shared folder tree, sit/stand, teleport, rotation, camera, group, and
//! the env/debug setting families. Collection happens against a fresh
//! inventory snapshot under the lock map; the side effect is then handed
//! to the [`ActionHandler`](crate::traits::ActionHandler).

use crate::collect::{self, AttachmentRequest, DetachGate};
use crate::engine::RlvEngine;
use crate::traits::{GroupTarget, TpDestination};
use rlv_inventory::InventoryMap;
use rlv_parser::RlvMessage;
use rlv_types::{
    AttachmentPoint, BehaviorName, FolderId, ItemId, ObjectId, RlvBehavior, RlvError, RlvResult,
    WearableType,
};
use tracing::debug;
use uuid::Uuid;

impl RlvEngine {
    pub(crate) async fn handle_force(
        &self,
        message: &RlvMessage,
        name: &BehaviorName,
        option: &str,
    ) -> RlvResult<()> {
        use RlvBehavior as B;
        match &name.canonical {
            B::Attach => self.force_attach_path(option, true, false).await,
            B::AttachOver => self.force_attach_path(option, false, false).await,
            B::AttachAll => self.force_attach_path(option, true, true).await,
            B::AttachAllOver => self.force_attach_path(option, false, true).await,
            B::AttachThis => self.force_attach_this(message.sender, option, true, false).await,
            B::AttachThisOver => {
                self.force_attach_this(message.sender, option, false, false).await
            }
            B::AttachAllThis => self.force_attach_this(message.sender, option, true, true).await,
            B::AttachAllThisOver => {
                self.force_attach_this(message.sender, option, false, true).await
            }
            B::Detach => self.force_detach(message.sender, option).await,
            B::DetachAll => self.force_detach_all(option).await,
            B::DetachThis => self.force_detach_this(message.sender, option, false).await,
            B::DetachAllThis => self.force_detach_this(message.sender, option, true).await,
            B::DetachMe => self.force_detach_me(message.sender).await,
            B::RemAttach => self.force_rem_attach(option).await,
            B::RemOutfit => self.force_rem_outfit(option).await,
            B::Sit => self.force_sit(option).await,
            B::Unsit => self.force_unsit().await,
            B::SitGround => self.force_sit_ground().await,
            B::TpTo => self.force_tp_to(option).await,
            B::SetRot => self.force_set_rot(option).await,
            B::AdjustHeight => self.force_adjust_height(option).await,
            B::SetCamFov => self.force_set_cam_fov(option).await,
            B::SetGroup => self.force_set_group(option).await,
            B::SetEnvSetting(key) => self.force_set_setting(&B::SetEnv, key, option).await,
            B::SetDebugSetting(key) => self.force_set_setting(&B::SetDebug, key, option).await,
            other => Err(RlvError::parse(format!("'{other}' is not a force command"))),
        }
    }

    // ===== attach =====

    async fn force_attach_path(&self, path: &str, replace: bool, recursive: bool) -> RlvResult<()> {
        let inventory = self.shared_inventory().await?;
        let folder = if path.is_empty() {
            None
        } else {
            inventory.folder_from_path(path, true)
        };
        let Some(folder) = folder else {
            // resolution failure still emits the (empty) attach event so
            // consumers see a deterministic "nothing to do"
            self.actions.attach(Vec::new()).await?;
            return Err(RlvError::resolution(path));
        };
        self.attach_folders(&inventory, &[folder], replace, recursive)
            .await
    }

    async fn force_attach_this(
        &self,
        sender: ObjectId,
        option: &str,
        replace: bool,
        recursive: bool,
    ) -> RlvResult<()> {
        let inventory = self.shared_inventory().await?;
        let folders = resolve_this_folders(&inventory, sender, option);
        if folders.is_empty() {
            self.actions.attach(Vec::new()).await?;
            return Err(RlvError::resolution(option));
        }
        self.attach_folders(&inventory, &folders, replace, recursive)
            .await
    }

    async fn attach_folders(
        &self,
        inventory: &InventoryMap,
        folders: &[FolderId],
        replace: bool,
        recursive: bool,
    ) -> RlvResult<()> {
        let requests: Vec<AttachmentRequest> = {
            let locks = self.lock_locks();
            let perms = self.permissions(&locks);
            let mut requests = Vec::new();
            for &folder in folders {
                for request in
                    collect::collect_items_to_attach(inventory, folder, replace, recursive)
                {
                    let owning = inventory.item(request.item_id).map(|i| i.folder);
                    if perms.can_attach(owning, true, Some(request.attachment_point), None)
                        && !requests.contains(&request)
                    {
                        requests.push(request);
                    }
                }
            }
            requests
        };
        debug!(count = requests.len(), "attach requests collected");
        self.actions.attach(requests).await
    }

    // ===== detach =====

    /// `@detach=force` detaches the sender's own object; a point option
    /// detaches that point; anything else is a folder path.
    async fn force_detach(&self, sender: ObjectId, option: &str) -> RlvResult<()> {
        let inventory = self.shared_inventory().await?;
        if option.is_empty() {
            return self.detach_sender_item(&inventory, sender).await;
        }
        let gate = self.detach_gate(true);
        if let Some(point) = AttachmentPoint::from_name(option) {
            return self.detach_point(&inventory, point, gate).await;
        }
        let Some(folder) = inventory.folder_from_path(option, true) else {
            return Err(RlvError::resolution(option));
        };
        self.detach_folders(&inventory, &[folder], false, gate).await
    }

    async fn force_detach_all(&self, option: &str) -> RlvResult<()> {
        let inventory = self.shared_inventory().await?;
        // hard-force family: the locked-folder map is deliberately not
        // consulted; plain detach restrictions and nostrip still hold
        let gate = self.detach_gate(false);
        let Some(folder) = inventory.folder_from_path(option, true) else {
            return Err(RlvError::resolution(option));
        };
        self.detach_folders(&inventory, &[folder], true, gate).await
    }

    async fn force_detach_this(
        &self,
        sender: ObjectId,
        option: &str,
        recursive: bool,
    ) -> RlvResult<()> {
        let inventory = self.shared_inventory().await?;
        let gate = self.detach_gate(!recursive);
        let folders = resolve_this_folders(&inventory, sender, option);
        if folders.is_empty() {
            return Err(RlvError::resolution(option));
        }
        self.detach_folders(&inventory, &folders, recursive, gate).await
    }

    async fn force_detach_me(&self, sender: ObjectId) -> RlvResult<()> {
        let inventory = self.shared_inventory().await?;
        self.detach_sender_item(&inventory, sender).await
    }

    async fn detach_sender_item(
        &self,
        inventory: &InventoryMap,
        sender: ObjectId,
    ) -> RlvResult<()> {
        let Some(item) = inventory.items().find(|i| i.attached_prim == Some(sender)) else {
            return Err(RlvError::resolution("sender attachment"));
        };
        let items: Vec<ItemId> = {
            let locks = self.lock_locks();
            let perms = self.permissions(&locks);
            let gate = self.detach_gate(true);
            if collect::can_rem_attach_item(inventory, item, &perms, gate) {
                vec![item.id]
            } else {
                Vec::new()
            }
        };
        self.actions.detach(items).await
    }

    async fn force_rem_attach(&self, option: &str) -> RlvResult<()> {
        let inventory = self.shared_inventory().await?;
        let gate = self.detach_gate(true);
        if option.is_empty() {
            let items: Vec<ItemId> = {
                let locks = self.lock_locks();
                let perms = self.permissions(&locks);
                inventory
                    .items()
                    .filter(|i| i.attached_to.is_some())
                    .filter(|i| collect::can_rem_attach_item(&inventory, i, &perms, gate))
                    .map(|i| i.id)
                    .collect()
            };
            return self.actions.detach(items).await;
        }
        let Some(point) = AttachmentPoint::from_name(option) else {
            return Err(RlvError::parse(format!("unknown attachment point '{option}'")));
        };
        self.detach_point(&inventory, point, gate).await
    }

    async fn force_rem_outfit(&self, option: &str) -> RlvResult<()> {
        let inventory = self.shared_inventory().await?;
        let layer = if option.is_empty() {
            None
        } else {
            Some(
                WearableType::from_name(option)
                    .ok_or_else(|| RlvError::parse(format!("unknown layer '{option}'")))?,
            )
        };
        let items: Vec<ItemId> = {
            let locks = self.lock_locks();
            let perms = self.permissions(&locks);
            let gate = self.detach_gate(true);
            inventory
                .items()
                .filter(|i| i.worn_on.is_some())
                .filter(|i| layer.map(|l| i.worn_on == Some(l)).unwrap_or(true))
                .filter(|i| collect::can_rem_attach_item(&inventory, i, &perms, gate))
                .map(|i| i.id)
                .collect()
        };
        self.actions.rem_outfit(items).await
    }

    async fn detach_point(
        &self,
        inventory: &InventoryMap,
        point: AttachmentPoint,
        gate: DetachGate,
    ) -> RlvResult<()> {
        let items: Vec<ItemId> = {
            let locks = self.lock_locks();
            let perms = self.permissions(&locks);
            inventory
                .items()
                .filter(|i| i.attached_to == Some(point))
                .filter(|i| collect::can_rem_attach_item(inventory, i, &perms, gate))
                .map(|i| i.id)
                .collect()
        };
        self.actions.detach(items).await
    }

    async fn detach_folders(
        &self,
        inventory: &InventoryMap,
        folders: &[FolderId],
        recursive: bool,
        gate: DetachGate,
    ) -> RlvResult<()> {
        let items: Vec<ItemId> = {
            let locks = self.lock_locks();
            let perms = self.permissions(&locks);
            let mut items = Vec::new();
            for &folder in folders {
                for item in
                    collect::collect_items_to_detach(inventory, folder, recursive, &perms, gate)
                {
                    if !items.contains(&item) {
                        items.push(item);
                    }
                }
            }
            items
        };
        debug!(count = items.len(), "detach items collected");
        self.actions.detach(items).await
    }

    fn detach_gate(&self, consult_locks: bool) -> DetachGate {
        DetachGate {
            enforce_nostrip: self.options.enforce_nostrip,
            consult_locks,
        }
    }

    // ===== movement, camera, group, settings =====

    async fn force_sit(&self, option: &str) -> RlvResult<()> {
        let object: ObjectId = option
            .parse()
            .map_err(|_| RlvError::parse(format!("'{option}' is not an object id")))?;
        let allowed = {
            let locks = self.lock_locks();
            self.permissions(&locks).can_sit()
        };
        if !allowed {
            return Err(RlvError::PermissionDenied {
                behavior: "sit".into(),
            });
        }
        if !self.world.object_exists(object).await? {
            return Err(RlvError::resolution(option));
        }
        self.actions.sit(object).await
    }

    async fn force_unsit(&self) -> RlvResult<()> {
        let allowed = {
            let locks = self.lock_locks();
            self.permissions(&locks).can_unsit()
        };
        if !allowed {
            return Err(RlvError::PermissionDenied {
                behavior: "unsit".into(),
            });
        }
        // standing already: nothing to do
        if !self.world.is_sitting().await? {
            return Ok(());
        }
        self.actions.unsit().await
    }

    async fn force_sit_ground(&self) -> RlvResult<()> {
        let allowed = {
            let locks = self.lock_locks();
            self.permissions(&locks).can_sit()
        };
        if !allowed {
            return Err(RlvError::PermissionDenied {
                behavior: "sit".into(),
            });
        }
        self.actions.sit_ground().await
    }

    async fn force_tp_to(&self, option: &str) -> RlvResult<()> {
        let allowed = {
            let locks = self.lock_locks();
            self.permissions(&locks).can_tp_loc()
        };
        if !allowed {
            return Err(RlvError::PermissionDenied {
                behavior: "tploc".into(),
            });
        }
        self.actions.tp_to(parse_destination(option)?).await
    }

    async fn force_set_rot(&self, option: &str) -> RlvResult<()> {
        let radians = option
            .parse::<f32>()
            .map_err(|_| RlvError::parse(format!("'{option}' is not an angle")))?;
        self.actions.set_rot(radians).await
    }

    /// `adjustheight:<distance>[;factor[;delta]]`
    async fn force_adjust_height(&self, option: &str) -> RlvResult<()> {
        let mut parts = option.split(';');
        let distance = parse_float_part(parts.next(), option)?;
        let factor = match parts.next() {
            Some(part) => parse_float_part(Some(part), option)?,
            None => 1.0,
        };
        let delta = match parts.next() {
            Some(part) => parse_float_part(Some(part), option)?,
            None => 0.0,
        };
        self.actions.adjust_height(distance, factor, delta).await
    }

    async fn force_set_cam_fov(&self, option: &str) -> RlvResult<()> {
        let mut fov = option
            .parse::<f32>()
            .map_err(|_| RlvError::parse(format!("'{option}' is not a field of view")))?;
        // forced FOV still obeys the active limits
        if let Some(min) = self.restriction_limit(&RlvBehavior::SetCamFovMin, true) {
            fov = fov.max(min);
        }
        if let Some(max) = self.restriction_limit(&RlvBehavior::SetCamFovMax, false) {
            fov = fov.min(max);
        }
        self.actions.set_cam_fov(fov).await
    }

    async fn force_set_group(&self, option: &str) -> RlvResult<()> {
        if self.store.contains_unconditional(&RlvBehavior::SetGroup) {
            return Err(RlvError::PermissionDenied {
                behavior: "setgroup".into(),
            });
        }
        if option.is_empty() {
            return Err(RlvError::parse("missing group"));
        }
        let target = match Uuid::parse_str(option) {
            Ok(id) => GroupTarget::Id(id),
            Err(_) => GroupTarget::Name(option.to_string()),
        };
        self.actions.set_group(target).await
    }

    async fn force_set_setting(
        &self,
        gate: &RlvBehavior,
        key: &str,
        value: &str,
    ) -> RlvResult<()> {
        if self.store.contains_unconditional(gate) {
            return Err(RlvError::PermissionDenied {
                behavior: gate.wire_name(),
            });
        }
        match gate {
            RlvBehavior::SetEnv => self.actions.set_env(key, value).await,
            _ => self.actions.set_debug(key, value).await,
        }
    }
}

/// Target folders for the `*this` command family, tried in order: item
/// uuid, clothing layer, attachment point, literal path. The empty
/// option resolves to the folder owning the sending object's item.
pub(crate) fn resolve_this_folders(
    inventory: &InventoryMap,
    sender: ObjectId,
    option: &str,
) -> Vec<FolderId> {
    if option.is_empty() {
        return inventory
            .folder_of_attached_prim(sender)
            .map(|f| vec![f])
            .unwrap_or_default();
    }
    if let Ok(id) = Uuid::parse_str(option) {
        return inventory.folders_containing(Some(ItemId::from_uuid(id)), None, None, false);
    }
    if let Some(layer) = WearableType::from_name(option) {
        return inventory.folders_containing(None, None, Some(layer), false);
    }
    if let Some(point) = AttachmentPoint::from_name(option) {
        return inventory.folders_containing(None, Some(point), None, false);
    }
    inventory
        .folder_from_path(option, true)
        .map(|f| vec![f])
        .unwrap_or_default()
}

/// `x/y/z` within the region, or `region/x/y/z`
fn parse_destination(option: &str) -> RlvResult<TpDestination> {
    let parts: Vec<&str> = option.split('/').collect();
    let (region, coords) = match parts.len() {
        3 => (None, &parts[..]),
        4 => (Some(parts[0].to_string()), &parts[1..]),
        _ => return Err(RlvError::parse(format!("'{option}' is not a destination"))),
    };
    let mut xyz = [0.0f32; 3];
    for (slot, part) in xyz.iter_mut().zip(coords) {
        *slot = part
            .parse::<f32>()
            .map_err(|_| RlvError::parse(format!("'{option}' is not a destination")))?;
    }
    Ok(TpDestination {
        region,
        x: xyz[0],
        y: xyz[1],
        z: xyz[2],
    })
}

fn parse_float_part(part: Option<&str>, option: &str) -> RlvResult<f32> {
    part.and_then(|p| p.parse::<f32>().ok())
        .ok_or_else(|| RlvError::parse(format!("'{option}' is not a height adjustment")))
}
