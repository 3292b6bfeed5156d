//! Permission service
//!
//! Pure yes/no decisions over the restriction store and locked-folder
//! map; nothing here mutates. The exception-carrying queries all run one
//! shared three-tier algorithm: an explicit to/from-list restriction
//! with a matching target always blocks; "secure" restrictions block
//! unless the *same sender* also issued a matching exception; plain
//! restrictions block unless a matching exception exists from that
//! sender or, in permissive mode, from any sender.

use rlv_locks::LockedFolderMap;
use rlv_store::RestrictionStore;
use rlv_types::{
    AttachmentPoint, FolderId, RestrictionArg, RlvBehavior, WearableType,
};
use tracing::debug;
use uuid::Uuid;

/// The target an exception may name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExceptionTarget<'a> {
    Agent(Uuid),
    Name(&'a str),
    Channel(i64),
}

impl ExceptionTarget<'_> {
    fn matches(&self, arg: &RestrictionArg) -> bool {
        match (self, arg) {
            (Self::Agent(id), RestrictionArg::Id(other)) => id == other,
            (Self::Name(name), RestrictionArg::Text(other)) => name.eq_ignore_ascii_case(other),
            (Self::Channel(ch), RestrictionArg::Int(other)) => ch == other,
            _ => false,
        }
    }
}

/// Pure permission queries for one decision point in time
#[derive(Debug, Clone, Copy)]
pub struct PermissionService<'a> {
    store: &'a RestrictionStore,
    locks: &'a LockedFolderMap,
    permissive_default: bool,
}

impl<'a> PermissionService<'a> {
    pub fn new(store: &'a RestrictionStore, locks: &'a LockedFolderMap, permissive: bool) -> Self {
        Self {
            store,
            locks,
            permissive_default: permissive,
        }
    }

    /// Permissive mode relaxes same-sender exception matching on the
    /// plain tier. The `permissive` restriction switches it off while
    /// held, whatever the engine default.
    pub fn is_permissive(&self) -> bool {
        self.permissive_default && !self.store.contains_unconditional(&RlvBehavior::Permissive)
    }

    // ===== attach / detach =====

    /// Whether an item may be attached/worn.
    ///
    /// `folder` is the owning folder when the item comes from the shared
    /// subtree; `is_shared` selects the `sharedwear`/`unsharedwear` gate;
    /// `point`/`layer` describe where the item would go.
    pub fn can_attach(
        &self,
        folder: Option<FolderId>,
        is_shared: bool,
        point: Option<AttachmentPoint>,
        layer: Option<WearableType>,
    ) -> bool {
        if self.scoped_block(&RlvBehavior::AddAttach, point.map(RestrictionArg::Attachment)) {
            return self.deny("addattach");
        }
        if self.scoped_block(&RlvBehavior::AddOutfit, layer.map(RestrictionArg::Wearable)) {
            return self.deny("addoutfit");
        }
        if is_shared {
            if self.store.contains_unconditional(&RlvBehavior::SharedWear) {
                return self.deny("sharedwear");
            }
            if let Some(folder) = folder {
                if !self.locks.can_attach(folder) {
                    return self.deny("locked folder");
                }
            }
        } else if self.store.contains_unconditional(&RlvBehavior::UnsharedWear) {
            return self.deny("unsharedwear");
        }
        true
    }

    /// Whether an item may be detached/removed.
    ///
    /// A bare `detach` restriction blocks unconditionally; a
    /// point-scoped one blocks only that point. Body-part layers are
    /// never detachable. Shared items additionally honor the
    /// locked-folder map.
    pub fn can_detach(
        &self,
        folder: Option<FolderId>,
        is_shared: bool,
        point: Option<AttachmentPoint>,
        layer: Option<WearableType>,
    ) -> bool {
        if layer.map(|l| l.is_body_part()).unwrap_or(false) {
            return self.deny("body part");
        }
        if self.scoped_block(&RlvBehavior::Detach, point.map(RestrictionArg::Attachment)) {
            return self.deny("detach");
        }
        if self.scoped_block(&RlvBehavior::RemAttach, point.map(RestrictionArg::Attachment)) {
            return self.deny("remattach");
        }
        if self.scoped_block(&RlvBehavior::RemOutfit, layer.map(RestrictionArg::Wearable)) {
            return self.deny("remoutfit");
        }
        if is_shared {
            if let Some(folder) = folder {
                if !self.locks.can_detach(folder) {
                    return self.deny("locked folder");
                }
            }
        }
        true
    }

    /// Whether the host may auto-wear a fallback outfit after a strip
    pub fn can_default_wear(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::DefaultWear)
    }

    // ===== movement and world =====

    pub fn can_fly(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::Fly)
    }

    pub fn can_sit(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::Sit)
    }

    pub fn can_unsit(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::Unsit)
    }

    pub fn can_stand_tp(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::StandTp)
    }

    pub fn can_tp_loc(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::TpLoc)
    }

    pub fn can_tp_lm(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::TpLm)
    }

    pub fn can_rez(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::Rez)
    }

    pub fn can_show_inv(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::ShowInv)
    }

    pub fn can_show_loc(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::ShowLoc)
    }

    // ===== chat =====

    pub fn can_send_chat(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::SendChat)
    }

    pub fn can_chat_shout(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::ChatShout)
    }

    pub fn can_chat_whisper(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::ChatWhisper)
    }

    pub fn can_emote(&self) -> bool {
        !self.store.contains_unconditional(&RlvBehavior::Emote)
    }

    /// Non-zero script channels: the `sendchannel_except` list blocks
    /// its channels outright, then the secure/plain tiers apply with the
    /// channel as the exception target.
    pub fn can_send_channel(&self, channel: i64) -> bool {
        self.check_secure(
            &RlvBehavior::SendChannel,
            Some(&RlvBehavior::SendChannelSec),
            Some(&RlvBehavior::SendChannelExcept),
            Some(ExceptionTarget::Channel(channel)),
        )
    }

    // ===== exception-carrying queries (shared algorithm) =====

    pub fn can_send_im(&self, target: ExceptionTarget<'_>) -> bool {
        self.check_secure(
            &RlvBehavior::SendIm,
            Some(&RlvBehavior::SendImSec),
            Some(&RlvBehavior::SendImTo),
            Some(target),
        )
    }

    pub fn can_start_im(&self, target: ExceptionTarget<'_>) -> bool {
        self.check_secure(
            &RlvBehavior::StartIm,
            None,
            Some(&RlvBehavior::StartImTo),
            Some(target),
        )
    }

    pub fn can_receive_im(&self, from: ExceptionTarget<'_>) -> bool {
        self.check_secure(
            &RlvBehavior::RecvIm,
            Some(&RlvBehavior::RecvImSec),
            Some(&RlvBehavior::RecvImFrom),
            Some(from),
        )
    }

    pub fn can_receive_chat(&self, from: ExceptionTarget<'_>) -> bool {
        self.check_secure(
            &RlvBehavior::RecvChat,
            Some(&RlvBehavior::RecvChatSec),
            Some(&RlvBehavior::RecvChatFrom),
            Some(from),
        )
    }

    pub fn can_receive_emote(&self, from: ExceptionTarget<'_>) -> bool {
        self.check_secure(
            &RlvBehavior::RecvEmote,
            Some(&RlvBehavior::RecvEmoteSec),
            Some(&RlvBehavior::RecvEmoteFrom),
            Some(from),
        )
    }

    pub fn can_tp_lure(&self, from: ExceptionTarget<'_>) -> bool {
        self.check_secure(
            &RlvBehavior::TpLure,
            Some(&RlvBehavior::TpLureSec),
            None,
            Some(from),
        )
    }

    pub fn can_tp_request(&self, from: ExceptionTarget<'_>) -> bool {
        self.check_secure(
            &RlvBehavior::TpRequest,
            Some(&RlvBehavior::TpRequestSec),
            None,
            Some(from),
        )
    }

    pub fn can_show_names(&self, target: Option<ExceptionTarget<'_>>) -> bool {
        self.check_secure(
            &RlvBehavior::ShowNames,
            Some(&RlvBehavior::ShowNamesSec),
            None,
            target,
        )
    }

    pub fn can_share(&self, target: Option<ExceptionTarget<'_>>) -> bool {
        self.check_secure(&RlvBehavior::Share, Some(&RlvBehavior::ShareSec), None, target)
    }

    /// The shared three-tier secure-restriction algorithm.
    ///
    /// Returns true when allowed. `base` is the plain behavior whose
    /// argument-carrying instances double as exceptions; `secure` is its
    /// `_sec` counterpart; `explicit` (when present) is a block-list
    /// whose entries match targets directly.
    pub fn check_secure(
        &self,
        base: &RlvBehavior,
        secure: Option<&RlvBehavior>,
        explicit: Option<&RlvBehavior>,
        target: Option<ExceptionTarget<'_>>,
    ) -> bool {
        // Tier 1: explicit to/from list, a matching entry always blocks
        if let (Some(explicit), Some(target)) = (explicit, target) {
            for restriction in self.store.get(explicit) {
                if restriction.args().iter().any(|arg| target.matches(arg)) {
                    return self.deny_behavior(explicit);
                }
            }
        }

        let exceptions: Vec<_> = self
            .store
            .get(base)
            .into_iter()
            .filter(|r| r.is_exception())
            .collect();
        let has_exception_from = |sender| {
            target
                .map(|t| {
                    exceptions.iter().any(|e| {
                        e.sender() == sender && e.args().iter().any(|arg| t.matches(arg))
                    })
                })
                .unwrap_or(false)
        };

        // Tier 2: secure restrictions require a same-sender exception
        if let Some(secure) = secure {
            for restriction in self.store.get(secure) {
                if restriction.args().is_empty() && !has_exception_from(restriction.sender()) {
                    return self.deny_behavior(secure);
                }
            }
        }

        // Tier 3: plain restrictions; permissive mode accepts an
        // exception from any sender
        let any_exception = target
            .map(|t| {
                exceptions
                    .iter()
                    .any(|e| e.args().iter().any(|arg| t.matches(arg)))
            })
            .unwrap_or(false);
        for restriction in self.store.get(base) {
            if !restriction.args().is_empty() {
                continue;
            }
            let excused = if self.is_permissive() {
                any_exception
            } else {
                has_exception_from(restriction.sender())
            };
            if !excused {
                return self.deny_behavior(base);
            }
        }

        true
    }

    /// Blocked when a bare restriction of `behavior` exists, or a scoped
    /// one matches `scope`
    fn scoped_block(&self, behavior: &RlvBehavior, scope: Option<RestrictionArg>) -> bool {
        self.store.get(behavior).iter().any(|r| {
            r.args().is_empty()
                || scope
                    .as_ref()
                    .map(|s| r.args().first() == Some(s))
                    .unwrap_or(false)
        })
    }

    fn deny(&self, reason: &str) -> bool {
        debug!(reason, "permission denied");
        false
    }

    fn deny_behavior(&self, behavior: &RlvBehavior) -> bool {
        debug!(behavior = %behavior, "permission denied");
        false
    }
}
