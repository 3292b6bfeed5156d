//! Wearable clothing layers and body parts
//!
//! Layer slots for worn (non-attached) items. The `@getoutfit` reply is a
//! fixed-order binary digit string over these, and the four body-part
//! layers are never detachable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A clothing layer or body-part slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WearableType {
    Gloves,
    Jacket,
    Pants,
    Shirt,
    Shoes,
    Skirt,
    Socks,
    Undershirt,
    Underpants,
    Skin,
    Eyes,
    Hair,
    Shape,
    Alpha,
    Tattoo,
    Physics,
}

impl WearableType {
    /// All layers in `@getoutfit` digit order
    pub const ALL: [WearableType; 16] = [
        Self::Gloves,
        Self::Jacket,
        Self::Pants,
        Self::Shirt,
        Self::Shoes,
        Self::Skirt,
        Self::Socks,
        Self::Undershirt,
        Self::Underpants,
        Self::Skin,
        Self::Eyes,
        Self::Hair,
        Self::Shape,
        Self::Alpha,
        Self::Tattoo,
        Self::Physics,
    ];

    /// Digit position in the `@getoutfit` reply
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|w| w == self)
            .unwrap_or(0)
    }

    /// Canonical wire name used in command options and name tokens
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Gloves => "gloves",
            Self::Jacket => "jacket",
            Self::Pants => "pants",
            Self::Shirt => "shirt",
            Self::Shoes => "shoes",
            Self::Skirt => "skirt",
            Self::Socks => "socks",
            Self::Undershirt => "undershirt",
            Self::Underpants => "underpants",
            Self::Skin => "skin",
            Self::Eyes => "eyes",
            Self::Hair => "hair",
            Self::Shape => "shape",
            Self::Alpha => "alpha",
            Self::Tattoo => "tattoo",
            Self::Physics => "physics",
        }
    }

    /// Parse a layer from its wire name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.iter().find(|w| w.wire_name() == name).copied()
    }

    /// Body parts can be replaced but never removed outright
    pub fn is_body_part(&self) -> bool {
        matches!(self, Self::Skin | Self::Shape | Self::Eyes | Self::Hair)
    }
}

impl fmt::Display for WearableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
