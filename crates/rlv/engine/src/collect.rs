//! Attach and detach collection
//!
//! Recursive folder traversals that turn a target folder into the list
//! of items to attach or detach, applying the naming conventions:
//! `.`-prefixed folders and items are skipped everywhere, a `+` folder
//! switches its subtree to add semantics, and a parenthesized token in
//! an item name overrides the one in its folder's name.

use rlv_inventory::{naming, InventoryMap, ItemNode};
use rlv_permissions::PermissionService;
use rlv_types::{AttachmentPoint, FolderId, ItemId};

/// One item to attach, with its resolved point and replace/add mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentRequest {
    pub item_id: ItemId,
    pub attachment_point: AttachmentPoint,
    pub replace_existing: bool,
}

/// Collect attach requests from a folder.
///
/// Items already on the avatar are skipped. The point precedence is
/// item name, then folder name, then the generic default point.
pub fn collect_items_to_attach(
    inventory: &InventoryMap,
    folder: FolderId,
    replace_existing: bool,
    recursive: bool,
) -> Vec<AttachmentRequest> {
    let mut requests = Vec::new();
    collect_attach_into(inventory, folder, replace_existing, recursive, &mut requests);
    requests
}

fn collect_attach_into(
    inventory: &InventoryMap,
    folder: FolderId,
    replace_existing: bool,
    recursive: bool,
    requests: &mut Vec<AttachmentRequest>,
) {
    let Some(node) = inventory.folder(folder) else {
        return;
    };
    if naming::is_private(&node.name) {
        return;
    }

    // A `+` folder forces add semantics; the override carries into the
    // recursion because the flag is passed on by value
    let replace = if naming::is_add_folder(&node.name) {
        false
    } else {
        replace_existing
    };
    let folder_point = naming::encoded_attachment_point(&node.name);

    for item in inventory.items_in(folder) {
        if item.is_on_avatar() || naming::is_private(&item.name) {
            continue;
        }
        let point = naming::encoded_attachment_point(&item.name)
            .or(folder_point)
            .unwrap_or(AttachmentPoint::Default);
        requests.push(AttachmentRequest {
            item_id: item.id,
            attachment_point: point,
            replace_existing: replace,
        });
    }

    if recursive {
        let children: Vec<FolderId> = node.folders.clone();
        for child in children {
            collect_attach_into(inventory, child, replace, true, requests);
        }
    }
}

/// Which safeguards a detach collection applies.
///
/// The hard-force family (`detachall`, `detachallthis`) runs with
/// `consult_locks` off: it honors plain `detach` restrictions and
/// nostrip markers but not the locked-folder map. That asymmetry is
/// protocol-mandated, not an oversight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachGate {
    pub enforce_nostrip: bool,
    pub consult_locks: bool,
}

/// Collect the detachable items of a folder.
pub fn collect_items_to_detach(
    inventory: &InventoryMap,
    folder: FolderId,
    recursive: bool,
    perms: &PermissionService<'_>,
    gate: DetachGate,
) -> Vec<ItemId> {
    let mut items = Vec::new();
    collect_detach_into(inventory, folder, recursive, perms, gate, &mut items);
    items
}

fn collect_detach_into(
    inventory: &InventoryMap,
    folder: FolderId,
    recursive: bool,
    perms: &PermissionService<'_>,
    gate: DetachGate,
    items: &mut Vec<ItemId>,
) {
    let Some(node) = inventory.folder(folder) else {
        return;
    };
    if naming::is_private(&node.name) {
        return;
    }

    for item in inventory.items_in(folder) {
        if can_rem_attach_item(inventory, item, perms, gate) {
            items.push(item.id);
        }
    }

    if recursive {
        let children: Vec<FolderId> = node.folders.clone();
        for child in children {
            collect_detach_into(inventory, child, recursive, perms, gate, items);
        }
    }
}

/// Whether one item passes every detach safeguard: it must be on the
/// avatar, not `.`-hidden, not nostrip-protected (item name or any
/// ancestor folder name), and permitted by the permission service.
/// Body-part layers are rejected there unconditionally.
pub fn can_rem_attach_item(
    inventory: &InventoryMap,
    item: &ItemNode,
    perms: &PermissionService<'_>,
    gate: DetachGate,
) -> bool {
    if !item.is_on_avatar() || naming::is_private(&item.name) {
        return false;
    }
    if gate.enforce_nostrip && nostrip_protected(inventory, item) {
        return false;
    }
    let folder = gate.consult_locks.then_some(item.folder);
    perms.can_detach(folder, true, item.attached_to, item.worn_on)
}

fn nostrip_protected(inventory: &InventoryMap, item: &ItemNode) -> bool {
    if naming::has_nostrip(&item.name) {
        return true;
    }
    let mut current = Some(item.folder);
    while let Some(id) = current {
        let Some(node) = inventory.folder(id) else {
            break;
        };
        if naming::has_nostrip(&node.name) {
            return true;
        }
        current = node.parent;
    }
    false
}
