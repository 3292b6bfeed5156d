//! Get-request handling
//!
//! Builds the formatted reply for each query behavior and sends it over
//! the requested channel. Reply formats are protocol surface and must
//! not drift: `getstatus` is `<sep><name>(:<args>)` per restriction,
//! `getoutfit`/`getattach` are fixed-order binary digit strings, and
//! `getinvworn` pairs each folder name with its two worn-state digits.

use crate::engine::RlvEngine;
use crate::force::resolve_this_folders;
use crate::traits::CameraParam;
use rlv_inventory::{naming, InventoryMap};
use rlv_parser::RlvMessage;
use rlv_types::{
    AttachmentPoint, BehaviorName, FolderId, ObjectId, RlvBehavior, RlvError, RlvResult,
    WearableType,
};
use tracing::debug;
use uuid::Uuid;

pub(crate) const VERSION_STRING: &str = "RestrainedLove viewer v3.4.3";
pub(crate) const VERSION_NUMBER: u32 = 3040300;

impl RlvEngine {
    pub(crate) async fn handle_query(
        &self,
        message: &RlvMessage,
        name: &BehaviorName,
        option: &str,
        channel: i32,
    ) -> RlvResult<()> {
        use RlvBehavior as B;
        let reply = match &name.canonical {
            B::Version | B::VersionNew => VERSION_STRING.to_string(),
            B::VersionNum => VERSION_NUMBER.to_string(),
            B::VersionNumBl => {
                let names: Vec<&str> = self.options.blacklist_names().collect();
                if names.is_empty() {
                    VERSION_NUMBER.to_string()
                } else {
                    format!("{},{}", VERSION_NUMBER, names.join(","))
                }
            }
            B::GetBlacklist => self
                .options
                .blacklist_names()
                .filter(|n| option.is_empty() || n.contains(option))
                .collect::<Vec<&str>>()
                .join(","),
            B::GetStatus => self.status_reply(option, Some(message.sender)),
            B::GetStatusAll => self.status_reply(option, None),
            B::GetSitId => match self.world.sit_object().await? {
                Some(object) => object.to_string(),
                None => Uuid::nil().to_string(),
            },
            B::GetOutfit => self.outfit_reply(option).await?,
            B::GetAttach => self.attach_reply(option).await?,
            B::GetInv => self.inv_reply(option).await?,
            B::GetInvWorn => self.inv_worn_reply(option).await?,
            B::GetPath => self.path_reply(message.sender, option, true).await?,
            B::GetPathNew => self.path_reply(message.sender, option, false).await?,
            B::FindFolder => self.find_folder_reply(option, true).await?,
            B::FindFolders => self.find_folder_reply(option, false).await?,
            B::GetCamFovMin => {
                self.camera_reply(&B::SetCamFovMin, CameraParam::FovMin, true).await?
            }
            B::GetCamFovMax => {
                self.camera_reply(&B::SetCamFovMax, CameraParam::FovMax, false).await?
            }
            B::GetCamFov => format_float(self.world.camera_param(CameraParam::Fov).await?),
            B::GetCamAvDistMin => {
                self.camera_reply(&B::SetCamAvDistMin, CameraParam::AvDistMin, true).await?
            }
            B::GetCamAvDistMax => {
                self.camera_reply(&B::SetCamAvDistMax, CameraParam::AvDistMax, false).await?
            }
            B::GetCamTextures => {
                if self.store.contains(&B::SetCamTextures) {
                    "1".to_string()
                } else {
                    "0".to_string()
                }
            }
            B::GetGroup => self.world.active_group().await?,
            B::GetHeightOffset => format_float(self.world.height_offset().await?),
            B::GetEnvSetting(key) => self.world.env_setting(key).await?.unwrap_or_default(),
            B::GetDebugSetting(key) => self.world.debug_setting(key).await?.unwrap_or_default(),
            other => return Err(RlvError::parse(format!("'{other}' is not a query"))),
        };
        debug!(channel, behavior = %name.canonical, len = reply.len(), "query reply");
        self.transport.send_reply(channel, &reply).await
    }

    /// `getstatus[:filter[;sep]]`; the separator defaults to `/` and
    /// prefixes every entry
    fn status_reply(&self, option: &str, sender: Option<ObjectId>) -> String {
        let (filter, sep) = match option.split_once(';') {
            Some((filter, sep)) if !sep.is_empty() => (filter, sep),
            Some((filter, _)) => (filter, "/"),
            None => (option, "/"),
        };
        let mut reply = String::new();
        for restriction in self.store.find(filter, sender) {
            reply.push_str(sep);
            reply.push_str(&restriction.status_text());
        }
        reply
    }

    /// Fixed-order 16-digit worn string, or a single digit for one layer
    async fn outfit_reply(&self, option: &str) -> RlvResult<String> {
        let outfit = self.inventory.try_get_current_outfit().await?;
        let worn = |layer: WearableType| outfit.iter().any(|i| i.worn_on == Some(layer));
        if !option.is_empty() {
            let layer = WearableType::from_name(option)
                .ok_or_else(|| RlvError::parse(format!("unknown layer '{option}'")))?;
            return Ok(digit(worn(layer)).to_string());
        }
        Ok(WearableType::ALL.iter().map(|l| digit(worn(*l))).collect())
    }

    /// Per-point attached string in point-index order, or a single digit
    async fn attach_reply(&self, option: &str) -> RlvResult<String> {
        let outfit = self.inventory.try_get_current_outfit().await?;
        let attached =
            |point: AttachmentPoint| outfit.iter().any(|i| i.attached_to == Some(point));
        if !option.is_empty() {
            let point = AttachmentPoint::from_name(option)
                .ok_or_else(|| RlvError::parse(format!("unknown attachment point '{option}'")))?;
            return Ok(digit(attached(point)).to_string());
        }
        Ok(AttachmentPoint::ALL
            .iter()
            .map(|p| digit(attached(*p)))
            .collect())
    }

    /// Comma-joined child folder names, private folders skipped
    async fn inv_reply(&self, option: &str) -> RlvResult<String> {
        let inventory = self.shared_inventory().await?;
        let Some(folder) = inventory.folder_from_path(option, true) else {
            return Ok(String::new());
        };
        let names: Vec<String> = inventory
            .child_folders(folder)
            .iter()
            .filter(|f| !naming::is_private(&f.name))
            .map(|f| f.name.clone())
            .collect();
        Ok(names.join(","))
    }

    /// The queried folder's own digits first (bare `|nn`), then
    /// `name|nn` per non-private child
    async fn inv_worn_reply(&self, option: &str) -> RlvResult<String> {
        let inventory = self.shared_inventory().await?;
        let Some(folder) = inventory.folder_from_path(option, true) else {
            return Ok(String::new());
        };
        let mut entries = vec![format!("|{}", worn_digits(&inventory, folder))];
        for child in inventory.child_folders(folder) {
            if naming::is_private(&child.name) {
                continue;
            }
            entries.push(format!("{}|{}", child.name, worn_digits(&inventory, child.id)));
        }
        Ok(entries.join(","))
    }

    async fn path_reply(
        &self,
        sender: ObjectId,
        option: &str,
        first_only: bool,
    ) -> RlvResult<String> {
        let inventory = self.shared_inventory().await?;
        let folders = resolve_this_folders(&inventory, sender, option);
        let mut paths: Vec<String> = folders
            .iter()
            .filter_map(|f| inventory.path_to_folder(*f))
            .collect();
        if first_only {
            paths.truncate(1);
        }
        Ok(paths.join(","))
    }

    /// `findfolder:part1[&&part2...]`: folders whose path contains every
    /// part, tree order, private subtrees excluded
    async fn find_folder_reply(&self, option: &str, first_only: bool) -> RlvResult<String> {
        let inventory = self.shared_inventory().await?;
        let parts: Vec<String> = option
            .split("&&")
            .map(|p| p.trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            return Ok(String::new());
        }
        let Some(root) = inventory.root() else {
            return Ok(String::new());
        };

        let mut found: Vec<String> = Vec::new();
        let mut stack = vec![root];
        while let Some(folder) = stack.pop() {
            let Some(node) = inventory.folder(folder) else {
                continue;
            };
            if folder != root {
                if naming::is_private(&node.name) {
                    continue;
                }
                if let Some(path) = inventory.path_to_folder(folder) {
                    let lower = path.to_ascii_lowercase();
                    if parts.iter().all(|p| lower.contains(p)) {
                        if first_only {
                            return Ok(path);
                        }
                        found.push(path);
                    }
                }
            }
            stack.extend(node.folders.iter().rev().copied());
        }
        Ok(found.join(","))
    }

    /// The tightest active restriction value, else the live camera value
    async fn camera_reply(
        &self,
        restriction: &RlvBehavior,
        param: CameraParam,
        tightest_is_max: bool,
    ) -> RlvResult<String> {
        let value = match self.restriction_limit(restriction, tightest_is_max) {
            Some(value) => value,
            None => self.world.camera_param(param).await?,
        };
        Ok(format_float(value))
    }
}

fn digit(on: bool) -> char {
    if on {
        '1'
    } else {
        '0'
    }
}

fn format_float(value: f32) -> String {
    format!("{value:.6}")
}

fn worn_digits(inventory: &InventoryMap, folder: FolderId) -> String {
    let direct = inventory.items_in(folder);
    let direct_total = direct.len();
    let direct_worn = direct.iter().filter(|i| i.is_on_avatar()).count();

    let mut total = direct_total;
    let mut worn = direct_worn;
    for descendant in inventory.descendant_folders(folder) {
        let items = inventory.items_in(descendant);
        total += items.len();
        worn += items.iter().filter(|i| i.is_on_avatar()).count();
    }

    format!(
        "{}{}",
        worn_digit(direct_total, direct_worn),
        worn_digit(total, worn)
    )
}

/// `0` no items, `1` none worn, `2` some worn, `3` all worn
fn worn_digit(total: usize, worn: usize) -> char {
    if total == 0 {
        '0'
    } else if worn == 0 {
        '1'
    } else if worn == total {
        '3'
    } else {
        '2'
    }
}
