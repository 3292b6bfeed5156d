//! Avatar attachment points
//!
//! Positional slots an object can be attached to. The numeric index is
//! wire-visible: `@getattach` replies are a digit string ordered by it,
//! and `ReplaceExisting` semantics key off the slot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A positional attachment slot on the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AttachmentPoint {
    /// Generic slot used when no point is encoded anywhere
    Default = 0,
    Chest = 1,
    Skull = 2,
    LeftShoulder = 3,
    RightShoulder = 4,
    LeftHand = 5,
    RightHand = 6,
    LeftFoot = 7,
    RightFoot = 8,
    Spine = 9,
    Pelvis = 10,
    Mouth = 11,
    Chin = 12,
    LeftEar = 13,
    RightEar = 14,
    LeftEye = 15,
    RightEye = 16,
    Nose = 17,
    RightUpperArm = 18,
    RightForearm = 19,
    LeftUpperArm = 20,
    LeftForearm = 21,
    RightHip = 22,
    RightUpperLeg = 23,
    RightLowerLeg = 24,
    LeftHip = 25,
    LeftUpperLeg = 26,
    LeftLowerLeg = 27,
    Stomach = 28,
    LeftPec = 29,
    RightPec = 30,
    HudCenter2 = 31,
    HudTopRight = 32,
    HudTop = 33,
    HudTopLeft = 34,
    HudCenter = 35,
    HudBottomLeft = 36,
    HudBottom = 37,
    HudBottomRight = 38,
    Neck = 39,
    Root = 40,
}

impl AttachmentPoint {
    /// All points in wire-index order, `Default` first
    pub const ALL: [AttachmentPoint; 41] = [
        Self::Default,
        Self::Chest,
        Self::Skull,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHand,
        Self::RightHand,
        Self::LeftFoot,
        Self::RightFoot,
        Self::Spine,
        Self::Pelvis,
        Self::Mouth,
        Self::Chin,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftEye,
        Self::RightEye,
        Self::Nose,
        Self::RightUpperArm,
        Self::RightForearm,
        Self::LeftUpperArm,
        Self::LeftForearm,
        Self::RightHip,
        Self::RightUpperLeg,
        Self::RightLowerLeg,
        Self::LeftHip,
        Self::LeftUpperLeg,
        Self::LeftLowerLeg,
        Self::Stomach,
        Self::LeftPec,
        Self::RightPec,
        Self::HudCenter2,
        Self::HudTopRight,
        Self::HudTop,
        Self::HudTopLeft,
        Self::HudCenter,
        Self::HudBottomLeft,
        Self::HudBottom,
        Self::HudBottomRight,
        Self::Neck,
        Self::Root,
    ];

    /// Wire index of the point (digit position in `@getattach` replies)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Canonical wire name, as used in command options and encoded
    /// parenthesized folder/item name tokens
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Default => "none",
            Self::Chest => "chest",
            Self::Skull => "skull",
            Self::LeftShoulder => "left shoulder",
            Self::RightShoulder => "right shoulder",
            Self::LeftHand => "left hand",
            Self::RightHand => "right hand",
            Self::LeftFoot => "left foot",
            Self::RightFoot => "right foot",
            Self::Spine => "spine",
            Self::Pelvis => "pelvis",
            Self::Mouth => "mouth",
            Self::Chin => "chin",
            Self::LeftEar => "left ear",
            Self::RightEar => "right ear",
            Self::LeftEye => "left eye",
            Self::RightEye => "right eye",
            Self::Nose => "nose",
            Self::RightUpperArm => "r upper arm",
            Self::RightForearm => "r forearm",
            Self::LeftUpperArm => "l upper arm",
            Self::LeftForearm => "l forearm",
            Self::RightHip => "right hip",
            Self::RightUpperLeg => "r upper leg",
            Self::RightLowerLeg => "r lower leg",
            Self::LeftHip => "left hip",
            Self::LeftUpperLeg => "l upper leg",
            Self::LeftLowerLeg => "l lower leg",
            Self::Stomach => "stomach",
            Self::LeftPec => "left pec",
            Self::RightPec => "right pec",
            Self::HudCenter2 => "center 2",
            Self::HudTopRight => "top right",
            Self::HudTop => "top",
            Self::HudTopLeft => "top left",
            Self::HudCenter => "center",
            Self::HudBottomLeft => "bottom left",
            Self::HudBottom => "bottom",
            Self::HudBottomRight => "bottom right",
            Self::Neck => "neck",
            Self::Root => "root",
        }
    }

    /// Parse a point from its wire name or an accepted alias.
    ///
    /// Matching is case-insensitive. Returns `None` for unknown names so
    /// callers can fall back to path or layer interpretation.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let found = Self::ALL
            .iter()
            .find(|p| p.wire_name() == name)
            .copied();
        if found.is_some() {
            return found;
        }
        // Aliases kept for older scripts
        match name.as_str() {
            "left pectoral" => Some(Self::LeftPec),
            "right pectoral" => Some(Self::RightPec),
            "groin" => Some(Self::Pelvis),
            "avatar center" => Some(Self::Root),
            _ => None,
        }
    }

    /// Parse a point from its numeric wire index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether this is a HUD slot (screen-space, not on the body)
    pub fn is_hud(&self) -> bool {
        matches!(
            self,
            Self::HudCenter2
                | Self::HudTopRight
                | Self::HudTop
                | Self::HudTopLeft
                | Self::HudCenter
                | Self::HudBottomLeft
                | Self::HudBottom
                | Self::HudBottomRight
        )
    }
}

impl fmt::Display for AttachmentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
