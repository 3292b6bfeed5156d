//! Typed restriction arguments
//!
//! Command options parse into a closed union of the five concrete
//! argument kinds instead of a heterogeneous object list, so permission
//! logic matches on structure rather than runtime type checks.

use crate::attachment::AttachmentPoint;
use crate::wearable::WearableType;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One parsed restriction argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RestrictionArg {
    /// Integer payload (channel numbers, notify channels)
    Int(i64),
    /// Floating-point payload (distances, field-of-view limits)
    Float(f32),
    /// Object or agent id payload
    Id(Uuid),
    /// Raw string payload (folder paths, group names, notify filters)
    Text(String),
    /// Clothing-layer payload
    Wearable(WearableType),
    /// Attachment-point payload
    Attachment(AttachmentPoint),
}

impl RestrictionArg {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<Uuid> {
        match self {
            Self::Id(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_wearable(&self) -> Option<WearableType> {
        match self {
            Self::Wearable(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_attachment(&self) -> Option<AttachmentPoint> {
        match self {
            Self::Attachment(v) => Some(*v),
            _ => None,
        }
    }
}

// Restriction equality (and therefore store de-duplication) includes args,
// so the float payload needs Eq/Hash. Restriction floats come from parsed
// text and are compared bit-for-bit.
impl Eq for RestrictionArg {}

impl std::hash::Hash for RestrictionArg {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Int(v) => {
                0u8.hash(state);
                v.hash(state);
            }
            Self::Float(v) => {
                1u8.hash(state);
                v.to_bits().hash(state);
            }
            Self::Id(v) => {
                2u8.hash(state);
                v.hash(state);
            }
            Self::Text(v) => {
                3u8.hash(state);
                v.hash(state);
            }
            Self::Wearable(v) => {
                4u8.hash(state);
                v.hash(state);
            }
            Self::Attachment(v) => {
                5u8.hash(state);
                v.hash(state);
            }
        }
    }
}

impl fmt::Display for RestrictionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Id(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Wearable(v) => write!(f, "{v}"),
            Self::Attachment(v) => write!(f, "{v}"),
        }
    }
}
