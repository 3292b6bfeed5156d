//! Protocol behavior names and classification tables
//!
//! `RlvBehavior` is the closed enumeration every inbound command name
//! resolves to. Synonym spellings canonicalize here (`camdistmax` →
//! `setcam_avdistmax`), and the `setenv_*` / `setdebug_*` / `getenv_*` /
//! `getdebug_*` prefix families parse into carrier variants holding the
//! setting suffix as a second-level key. Dispatch elsewhere is a match on
//! this enum, not a string lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the four folder-lock buckets a behavior feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderLockFamily {
    /// Governs attaching (true) or detaching (false)
    pub attach: bool,
    /// Propagates to every descendant folder
    pub recursive: bool,
    /// Exception variant (narrows, never removes)
    pub exception: bool,
}

/// A canonical behavior name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RlvBehavior {
    // ========== Movement ==========
    Fly,
    TempRun,
    AlwaysRun,
    SetRot,
    AdjustHeight,
    TpTo,
    Sit,
    Unsit,
    SitGround,
    SitTp,
    StandTp,

    // ========== Teleport ==========
    TpLm,
    TpLoc,
    TpLure,
    TpLureSec,
    TpRequest,
    TpRequestSec,
    AcceptTp,
    AcceptTpRequest,

    // ========== Chat ==========
    SendChat,
    ChatShout,
    ChatNormal,
    ChatWhisper,
    Emote,
    RedirChat,
    RedirEmote,
    SendChannel,
    SendChannelSec,
    SendChannelExcept,
    RecvChat,
    RecvChatSec,
    RecvChatFrom,
    RecvEmote,
    RecvEmoteSec,
    RecvEmoteFrom,

    // ========== Instant messages ==========
    SendIm,
    SendImSec,
    SendImTo,
    StartIm,
    StartImTo,
    RecvIm,
    RecvImSec,
    RecvImFrom,

    // ========== Names and UI ==========
    ShowNames,
    ShowNamesSec,
    ShowNameTags,
    ShowHoverText,
    ShowHoverTextAll,
    ShowHoverTextHud,
    ShowHoverTextWorld,
    ShowLoc,
    ShowWorldMap,
    ShowMiniMap,
    ShowInv,
    ViewNote,
    ViewScript,
    ViewTexture,

    // ========== Touch and edit ==========
    TouchFar,
    TouchAll,
    TouchWorld,
    TouchThis,
    TouchAttach,
    TouchAttachSelf,
    TouchAttachOther,
    TouchHud,
    TouchMe,
    Edit,
    EditObj,
    Rez,
    Share,
    ShareSec,

    // ========== Inventory and outfit restrictions ==========
    Detach,
    AddAttach,
    RemAttach,
    AddOutfit,
    RemOutfit,
    DetachThis,
    DetachAllThis,
    AttachThis,
    AttachAllThis,
    DetachThisExcept,
    DetachAllThisExcept,
    AttachThisExcept,
    AttachAllThisExcept,
    SharedWear,
    UnsharedWear,
    DefaultWear,

    // ========== Forced attach/detach ==========
    Attach,
    AttachOver,
    AttachAll,
    AttachAllOver,
    AttachThisOver,
    AttachAllThisOver,
    DetachAll,
    DetachMe,

    // ========== Camera ==========
    SetCamFovMin,
    SetCamFovMax,
    SetCamFov,
    SetCamAvDistMin,
    SetCamAvDistMax,
    SetCamTextures,
    SetCamUnlock,
    GetCamFovMin,
    GetCamFovMax,
    GetCamFov,
    GetCamAvDistMin,
    GetCamAvDistMax,
    GetCamTextures,

    // ========== Group ==========
    SetGroup,
    GetGroup,

    // ========== Environment and debug settings ==========
    SetEnv,
    SetDebug,
    /// `setenv_<suffix>` force command, suffix is the setting key
    SetEnvSetting(String),
    /// `getenv_<suffix>` query, suffix is the setting key
    GetEnvSetting(String),
    /// `setdebug_<suffix>` force command, suffix is the setting key
    SetDebugSetting(String),
    /// `getdebug_<suffix>` query, suffix is the setting key
    GetDebugSetting(String),

    // ========== Miscellaneous ==========
    Permissive,
    Notify,
    AcceptPermission,
    DenyPermission,
    Clear,

    // ========== Queries ==========
    Version,
    VersionNew,
    VersionNum,
    VersionNumBl,
    GetBlacklist,
    GetStatus,
    GetStatusAll,
    GetSitId,
    GetOutfit,
    GetAttach,
    GetInv,
    GetInvWorn,
    GetPath,
    GetPathNew,
    FindFolder,
    FindFolders,
    GetHeightOffset,
}

/// A behavior name as it arrived on the wire: the canonical behavior plus
/// the original spelling (synonyms canonicalize, the original is kept for
/// status replies and notifications).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BehaviorName {
    pub canonical: RlvBehavior,
    pub original: String,
}

impl BehaviorName {
    pub fn new(canonical: RlvBehavior, original: impl Into<String>) -> Self {
        Self {
            canonical,
            original: original.into(),
        }
    }
}

impl RlvBehavior {
    /// Every fixed (non-carrier) behavior, used for name lookup
    const FIXED: [RlvBehavior; 134] = [
        Self::Fly,
        Self::TempRun,
        Self::AlwaysRun,
        Self::SetRot,
        Self::AdjustHeight,
        Self::TpTo,
        Self::Sit,
        Self::Unsit,
        Self::SitGround,
        Self::SitTp,
        Self::StandTp,
        Self::TpLm,
        Self::TpLoc,
        Self::TpLure,
        Self::TpLureSec,
        Self::TpRequest,
        Self::TpRequestSec,
        Self::AcceptTp,
        Self::AcceptTpRequest,
        Self::SendChat,
        Self::ChatShout,
        Self::ChatNormal,
        Self::ChatWhisper,
        Self::Emote,
        Self::RedirChat,
        Self::RedirEmote,
        Self::SendChannel,
        Self::SendChannelSec,
        Self::SendChannelExcept,
        Self::RecvChat,
        Self::RecvChatSec,
        Self::RecvChatFrom,
        Self::RecvEmote,
        Self::RecvEmoteSec,
        Self::RecvEmoteFrom,
        Self::SendIm,
        Self::SendImSec,
        Self::SendImTo,
        Self::StartIm,
        Self::StartImTo,
        Self::RecvIm,
        Self::RecvImSec,
        Self::RecvImFrom,
        Self::ShowNames,
        Self::ShowNamesSec,
        Self::ShowNameTags,
        Self::ShowHoverText,
        Self::ShowHoverTextAll,
        Self::ShowHoverTextHud,
        Self::ShowHoverTextWorld,
        Self::ShowLoc,
        Self::ShowWorldMap,
        Self::ShowMiniMap,
        Self::ShowInv,
        Self::ViewNote,
        Self::ViewScript,
        Self::ViewTexture,
        Self::TouchFar,
        Self::TouchAll,
        Self::TouchWorld,
        Self::TouchThis,
        Self::TouchAttach,
        Self::TouchAttachSelf,
        Self::TouchAttachOther,
        Self::TouchHud,
        Self::TouchMe,
        Self::Edit,
        Self::EditObj,
        Self::Rez,
        Self::Share,
        Self::ShareSec,
        Self::Detach,
        Self::AddAttach,
        Self::RemAttach,
        Self::AddOutfit,
        Self::RemOutfit,
        Self::DetachThis,
        Self::DetachAllThis,
        Self::AttachThis,
        Self::AttachAllThis,
        Self::DetachThisExcept,
        Self::DetachAllThisExcept,
        Self::AttachThisExcept,
        Self::AttachAllThisExcept,
        Self::SharedWear,
        Self::UnsharedWear,
        Self::DefaultWear,
        Self::Attach,
        Self::AttachOver,
        Self::AttachAll,
        Self::AttachAllOver,
        Self::AttachThisOver,
        Self::AttachAllThisOver,
        Self::DetachAll,
        Self::DetachMe,
        Self::SetCamFovMin,
        Self::SetCamFovMax,
        Self::SetCamFov,
        Self::SetCamAvDistMin,
        Self::SetCamAvDistMax,
        Self::SetCamTextures,
        Self::SetCamUnlock,
        Self::GetCamFovMin,
        Self::GetCamFovMax,
        Self::GetCamFov,
        Self::GetCamAvDistMin,
        Self::GetCamAvDistMax,
        Self::GetCamTextures,
        Self::SetGroup,
        Self::GetGroup,
        Self::SetEnv,
        Self::SetDebug,
        Self::Permissive,
        Self::Notify,
        Self::AcceptPermission,
        Self::DenyPermission,
        Self::Clear,
        Self::Version,
        Self::VersionNew,
        Self::VersionNum,
        Self::VersionNumBl,
        Self::GetBlacklist,
        Self::GetStatus,
        Self::GetStatusAll,
        Self::GetSitId,
        Self::GetOutfit,
        Self::GetAttach,
        Self::GetInv,
        Self::GetInvWorn,
        Self::GetPath,
        Self::GetPathNew,
        Self::FindFolder,
        Self::FindFolders,
        Self::GetHeightOffset,
    ];

    /// Wire name of a fixed behavior; carrier variants return `None`
    fn fixed_name(&self) -> Option<&'static str> {
        let name = match self {
            Self::Fly => "fly",
            Self::TempRun => "temprun",
            Self::AlwaysRun => "alwaysrun",
            Self::SetRot => "setrot",
            Self::AdjustHeight => "adjustheight",
            Self::TpTo => "tpto",
            Self::Sit => "sit",
            Self::Unsit => "unsit",
            Self::SitGround => "sitground",
            Self::SitTp => "sittp",
            Self::StandTp => "standtp",
            Self::TpLm => "tplm",
            Self::TpLoc => "tploc",
            Self::TpLure => "tplure",
            Self::TpLureSec => "tplure_sec",
            Self::TpRequest => "tprequest",
            Self::TpRequestSec => "tprequest_sec",
            Self::AcceptTp => "accepttp",
            Self::AcceptTpRequest => "accepttprequest",
            Self::SendChat => "sendchat",
            Self::ChatShout => "chatshout",
            Self::ChatNormal => "chatnormal",
            Self::ChatWhisper => "chatwhisper",
            Self::Emote => "emote",
            Self::RedirChat => "redirchat",
            Self::RedirEmote => "rediremote",
            Self::SendChannel => "sendchannel",
            Self::SendChannelSec => "sendchannel_sec",
            Self::SendChannelExcept => "sendchannel_except",
            Self::RecvChat => "recvchat",
            Self::RecvChatSec => "recvchat_sec",
            Self::RecvChatFrom => "recvchatfrom",
            Self::RecvEmote => "recvemote",
            Self::RecvEmoteSec => "recvemote_sec",
            Self::RecvEmoteFrom => "recvemotefrom",
            Self::SendIm => "sendim",
            Self::SendImSec => "sendim_sec",
            Self::SendImTo => "sendimto",
            Self::StartIm => "startim",
            Self::StartImTo => "startimto",
            Self::RecvIm => "recvim",
            Self::RecvImSec => "recvim_sec",
            Self::RecvImFrom => "recvimfrom",
            Self::ShowNames => "shownames",
            Self::ShowNamesSec => "shownames_sec",
            Self::ShowNameTags => "shownametags",
            Self::ShowHoverText => "showhovertext",
            Self::ShowHoverTextAll => "showhovertextall",
            Self::ShowHoverTextHud => "showhovertexthud",
            Self::ShowHoverTextWorld => "showhovertextworld",
            Self::ShowLoc => "showloc",
            Self::ShowWorldMap => "showworldmap",
            Self::ShowMiniMap => "showminimap",
            Self::ShowInv => "showinv",
            Self::ViewNote => "viewnote",
            Self::ViewScript => "viewscript",
            Self::ViewTexture => "viewtexture",
            Self::TouchFar => "touchfar",
            Self::TouchAll => "touchall",
            Self::TouchWorld => "touchworld",
            Self::TouchThis => "touchthis",
            Self::TouchAttach => "touchattach",
            Self::TouchAttachSelf => "touchattachself",
            Self::TouchAttachOther => "touchattachother",
            Self::TouchHud => "touchhud",
            Self::TouchMe => "touchme",
            Self::Edit => "edit",
            Self::EditObj => "editobj",
            Self::Rez => "rez",
            Self::Share => "share",
            Self::ShareSec => "share_sec",
            Self::Detach => "detach",
            Self::AddAttach => "addattach",
            Self::RemAttach => "remattach",
            Self::AddOutfit => "addoutfit",
            Self::RemOutfit => "remoutfit",
            Self::DetachThis => "detachthis",
            Self::DetachAllThis => "detachallthis",
            Self::AttachThis => "attachthis",
            Self::AttachAllThis => "attachallthis",
            Self::DetachThisExcept => "detachthis_except",
            Self::DetachAllThisExcept => "detachallthis_except",
            Self::AttachThisExcept => "attachthis_except",
            Self::AttachAllThisExcept => "attachallthis_except",
            Self::SharedWear => "sharedwear",
            Self::UnsharedWear => "unsharedwear",
            Self::DefaultWear => "defaultwear",
            Self::Attach => "attach",
            Self::AttachOver => "attachover",
            Self::AttachAll => "attachall",
            Self::AttachAllOver => "attachallover",
            Self::AttachThisOver => "attachthisover",
            Self::AttachAllThisOver => "attachallthisover",
            Self::DetachAll => "detachall",
            Self::DetachMe => "detachme",
            Self::SetCamFovMin => "setcam_fovmin",
            Self::SetCamFovMax => "setcam_fovmax",
            Self::SetCamFov => "setcam_fov",
            Self::SetCamAvDistMin => "setcam_avdistmin",
            Self::SetCamAvDistMax => "setcam_avdistmax",
            Self::SetCamTextures => "setcam_textures",
            Self::SetCamUnlock => "setcam_unlock",
            Self::GetCamFovMin => "getcam_fovmin",
            Self::GetCamFovMax => "getcam_fovmax",
            Self::GetCamFov => "getcam_fov",
            Self::GetCamAvDistMin => "getcam_avdistmin",
            Self::GetCamAvDistMax => "getcam_avdistmax",
            Self::GetCamTextures => "getcam_textures",
            Self::SetGroup => "setgroup",
            Self::GetGroup => "getgroup",
            Self::SetEnv => "setenv",
            Self::SetDebug => "setdebug",
            Self::Permissive => "permissive",
            Self::Notify => "notify",
            Self::AcceptPermission => "acceptpermission",
            Self::DenyPermission => "denypermission",
            Self::Clear => "clear",
            Self::Version => "version",
            Self::VersionNew => "versionnew",
            Self::VersionNum => "versionnum",
            Self::VersionNumBl => "versionnumbl",
            Self::GetBlacklist => "getblacklist",
            Self::GetStatus => "getstatus",
            Self::GetStatusAll => "getstatusall",
            Self::GetSitId => "getsitid",
            Self::GetOutfit => "getoutfit",
            Self::GetAttach => "getattach",
            Self::GetInv => "getinv",
            Self::GetInvWorn => "getinvworn",
            Self::GetPath => "getpath",
            Self::GetPathNew => "getpathnew",
            Self::FindFolder => "findfolder",
            Self::FindFolders => "findfolders",
            Self::GetHeightOffset => "getheightoffset",
            Self::SetEnvSetting(_)
            | Self::GetEnvSetting(_)
            | Self::SetDebugSetting(_)
            | Self::GetDebugSetting(_) => return None,
        };
        Some(name)
    }

    /// Canonical wire name (allocates only for the setting carriers)
    pub fn wire_name(&self) -> String {
        match self {
            Self::SetEnvSetting(sfx) => format!("setenv_{sfx}"),
            Self::GetEnvSetting(sfx) => format!("getenv_{sfx}"),
            Self::SetDebugSetting(sfx) => format!("setdebug_{sfx}"),
            Self::GetDebugSetting(sfx) => format!("getdebug_{sfx}"),
            other => other
                .fixed_name()
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Resolve a lower-cased wire name to its canonical behavior.
    ///
    /// Handles synonym spellings and the `setenv_*` / `setdebug_*` /
    /// `getenv_*` / `getdebug_*` prefix families. Returns `None` for
    /// unknown names.
    pub fn from_name(name: &str) -> Option<BehaviorName> {
        let lower = name.trim().to_ascii_lowercase();
        if lower.is_empty() {
            return None;
        }

        if let Some(found) = Self::FIXED
            .iter()
            .find(|b| b.fixed_name() == Some(lower.as_str()))
        {
            return Some(BehaviorName::new(found.clone(), lower));
        }

        // Legacy synonym spellings
        let synonym = match lower.as_str() {
            "fartouch" => Some(Self::TouchFar),
            "camzoommax" => Some(Self::SetCamFovMin),
            "camzoommin" => Some(Self::SetCamFovMax),
            "camdistmin" => Some(Self::SetCamAvDistMin),
            "camdistmax" => Some(Self::SetCamAvDistMax),
            "camtextures" => Some(Self::SetCamTextures),
            "camunlock" => Some(Self::SetCamUnlock),
            _ => None,
        };
        if let Some(canonical) = synonym {
            return Some(BehaviorName::new(canonical, lower));
        }

        // Prefix-keyed setting families; the suffix is a second-level key
        for (prefix, make) in [
            ("setenv_", Self::SetEnvSetting as fn(String) -> Self),
            ("getenv_", Self::GetEnvSetting as fn(String) -> Self),
            ("setdebug_", Self::SetDebugSetting as fn(String) -> Self),
            ("getdebug_", Self::GetDebugSetting as fn(String) -> Self),
        ] {
            if let Some(suffix) = lower.strip_prefix(prefix) {
                if !suffix.is_empty() {
                    return Some(BehaviorName::new(make(suffix.to_string()), lower));
                }
            }
        }

        None
    }

    /// Whether `@<name>=n|y|add|rem` is a valid restriction command
    pub fn supports_restriction(&self) -> bool {
        !matches!(
            self,
            Self::SetRot
                | Self::AdjustHeight
                | Self::TpTo
                | Self::SitGround
                | Self::Attach
                | Self::AttachOver
                | Self::AttachAll
                | Self::AttachAllOver
                | Self::AttachThisOver
                | Self::AttachAllThisOver
                | Self::DetachAll
                | Self::DetachMe
                | Self::SetCamFov
                | Self::SetEnvSetting(_)
                | Self::GetEnvSetting(_)
                | Self::SetDebugSetting(_)
                | Self::GetDebugSetting(_)
                | Self::Clear
                | Self::Version
                | Self::VersionNew
                | Self::VersionNum
                | Self::VersionNumBl
                | Self::GetBlacklist
                | Self::GetStatus
                | Self::GetStatusAll
                | Self::GetSitId
                | Self::GetOutfit
                | Self::GetAttach
                | Self::GetInv
                | Self::GetInvWorn
                | Self::GetPath
                | Self::GetPathNew
                | Self::FindFolder
                | Self::FindFolders
                | Self::GetHeightOffset
                | Self::GetCamFovMin
                | Self::GetCamFovMax
                | Self::GetCamFov
                | Self::GetCamAvDistMin
                | Self::GetCamAvDistMax
                | Self::GetCamTextures
                | Self::GetGroup
        )
    }

    /// Whether `@<name>[:option]=force` is a valid action command
    pub fn supports_force(&self) -> bool {
        matches!(
            self,
            Self::SetRot
                | Self::AdjustHeight
                | Self::TpTo
                | Self::Sit
                | Self::Unsit
                | Self::SitGround
                | Self::Detach
                | Self::RemAttach
                | Self::RemOutfit
                | Self::DetachThis
                | Self::DetachAllThis
                | Self::AttachThis
                | Self::AttachAllThis
                | Self::Attach
                | Self::AttachOver
                | Self::AttachAll
                | Self::AttachAllOver
                | Self::AttachThisOver
                | Self::AttachAllThisOver
                | Self::DetachAll
                | Self::DetachMe
                | Self::SetCamFov
                | Self::SetGroup
                | Self::SetEnvSetting(_)
                | Self::SetDebugSetting(_)
        )
    }

    /// Whether `@<name>[:option]=<channel>` is a valid query command
    pub fn supports_query(&self) -> bool {
        matches!(
            self,
            Self::Version
                | Self::VersionNew
                | Self::VersionNum
                | Self::VersionNumBl
                | Self::GetBlacklist
                | Self::GetStatus
                | Self::GetStatusAll
                | Self::GetSitId
                | Self::GetOutfit
                | Self::GetAttach
                | Self::GetInv
                | Self::GetInvWorn
                | Self::GetPath
                | Self::GetPathNew
                | Self::FindFolder
                | Self::FindFolders
                | Self::GetHeightOffset
                | Self::GetCamFovMin
                | Self::GetCamFovMax
                | Self::GetCamFov
                | Self::GetCamAvDistMin
                | Self::GetCamAvDistMax
                | Self::GetCamTextures
                | Self::GetGroup
                | Self::GetEnvSetting(_)
                | Self::GetDebugSetting(_)
        )
    }

    /// Behaviors whose argument-carrying form is a per-target exception
    /// narrowing the bare form (fixed table; the `*_except` folder-lock
    /// variants are always exceptions).
    pub fn supports_exceptions(&self) -> bool {
        matches!(
            self,
            Self::TpLure
                | Self::TpRequest
                | Self::AcceptTp
                | Self::AcceptTpRequest
                | Self::SendChannel
                | Self::SendChannelExcept
                | Self::RecvChat
                | Self::RecvEmote
                | Self::SendIm
                | Self::StartIm
                | Self::RecvIm
                | Self::ShowNames
                | Self::ShowNameTags
                | Self::TouchWorld
                | Self::TouchAttachOther
                | Self::TouchHud
                | Self::Edit
                | Self::Share
                | Self::DetachThisExcept
                | Self::DetachAllThisExcept
                | Self::AttachThisExcept
                | Self::AttachAllThisExcept
        )
    }

    /// Folder-lock family membership for the eight `*this` behaviors
    pub fn folder_lock_family(&self) -> Option<FolderLockFamily> {
        let family = match self {
            Self::AttachThis => FolderLockFamily {
                attach: true,
                recursive: false,
                exception: false,
            },
            Self::AttachAllThis => FolderLockFamily {
                attach: true,
                recursive: true,
                exception: false,
            },
            Self::DetachThis => FolderLockFamily {
                attach: false,
                recursive: false,
                exception: false,
            },
            Self::DetachAllThis => FolderLockFamily {
                attach: false,
                recursive: true,
                exception: false,
            },
            Self::AttachThisExcept => FolderLockFamily {
                attach: true,
                recursive: false,
                exception: true,
            },
            Self::AttachAllThisExcept => FolderLockFamily {
                attach: true,
                recursive: true,
                exception: true,
            },
            Self::DetachThisExcept => FolderLockFamily {
                attach: false,
                recursive: false,
                exception: true,
            },
            Self::DetachAllThisExcept => FolderLockFamily {
                attach: false,
                recursive: true,
                exception: true,
            },
            _ => return None,
        };
        Some(family)
    }

    /// Version and blacklist queries must keep working under a blacklist,
    /// or a script can no longer discover what is blocked.
    pub fn is_blacklistable(&self) -> bool {
        !matches!(
            self,
            Self::Version
                | Self::VersionNew
                | Self::VersionNum
                | Self::VersionNumBl
                | Self::GetBlacklist
                | Self::Clear
        )
    }
}

impl fmt::Display for RlvBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_name())
    }
}
