//! The immutable restriction record
//!
//! One installed restriction: a canonical behavior, the spelling it
//! arrived under, the sender that issued it, and its parsed arguments.
//! Identity (and therefore store de-duplication) is
//! `(behavior, sender, args)`; the sender display name and original
//! spelling are carried for replies but do not participate in equality.

use crate::arg::RestrictionArg;
use crate::behavior::{BehaviorName, RlvBehavior};
use crate::ids::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// An installed restriction. Never mutated after construction; clearing
/// replaces set membership, it never edits args.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restriction {
    behavior: RlvBehavior,
    original_behavior: String,
    sender: ObjectId,
    sender_name: String,
    args: Vec<RestrictionArg>,
}

impl Restriction {
    pub fn new(
        name: BehaviorName,
        sender: ObjectId,
        sender_name: impl Into<String>,
        args: Vec<RestrictionArg>,
    ) -> Self {
        Self {
            behavior: name.canonical,
            original_behavior: name.original,
            sender,
            sender_name: sender_name.into(),
            args,
        }
    }

    pub fn behavior(&self) -> &RlvBehavior {
        &self.behavior
    }

    /// The spelling the restriction arrived under (synonyms preserved)
    pub fn original_behavior(&self) -> &str {
        &self.original_behavior
    }

    pub fn sender(&self) -> ObjectId {
        self.sender
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    pub fn args(&self) -> &[RestrictionArg] {
        &self.args
    }

    /// An exception narrows a broader restriction rather than installing
    /// a block of its own: the behavior must be in the exception table
    /// and the restriction must carry a target argument.
    pub fn is_exception(&self) -> bool {
        self.behavior.supports_exceptions() && !self.args.is_empty()
    }

    /// Wire rendering used by `@getstatus`: `name` or `name:arg1;arg2`
    pub fn status_text(&self) -> String {
        if self.args.is_empty() {
            self.original_behavior.clone()
        } else {
            let args = self
                .args
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(";");
            format!("{}:{}", self.original_behavior, args)
        }
    }
}

impl PartialEq for Restriction {
    fn eq(&self, other: &Self) -> bool {
        self.behavior == other.behavior && self.sender == other.sender && self.args == other.args
    }
}

impl Eq for Restriction {}

impl Hash for Restriction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.behavior.hash(state);
        self.sender.hash(state);
        self.args.hash(state);
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.status_text(), self.sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::RlvBehavior;
    use uuid::Uuid;

    fn name(wire: &str) -> BehaviorName {
        RlvBehavior::from_name(wire).unwrap()
    }

    #[test]
    fn test_equality_ignores_sender_name_and_spelling() {
        let sender = ObjectId::generate();
        let a = Restriction::new(name("camdistmax"), sender, "Collar", vec![]);
        let b = Restriction::new(name("setcam_avdistmax"), sender, "Other Name", vec![]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_distinguishes_sender_and_args() {
        let sender = ObjectId::generate();
        let other = ObjectId::generate();
        let base = Restriction::new(name("sendim"), sender, "Collar", vec![]);
        let with_arg = Restriction::new(
            name("sendim"),
            sender,
            "Collar",
            vec![RestrictionArg::Id(Uuid::new_v4())],
        );
        let from_other = Restriction::new(name("sendim"), other, "Collar", vec![]);
        assert_ne!(base, with_arg);
        assert_ne!(base, from_other);
    }

    #[test]
    fn test_is_exception_requires_table_and_args() {
        let sender = ObjectId::generate();
        // sendim with a target is an exception
        let exc = Restriction::new(
            name("sendim"),
            sender,
            "Collar",
            vec![RestrictionArg::Id(Uuid::new_v4())],
        );
        assert!(exc.is_exception());
        // bare sendim is a plain restriction
        let plain = Restriction::new(name("sendim"), sender, "Collar", vec![]);
        assert!(!plain.is_exception());
        // fly never supports exceptions, args or not
        let fly = Restriction::new(
            name("fly"),
            sender,
            "Collar",
            vec![RestrictionArg::Int(1)],
        );
        assert!(!fly.is_exception());
    }

    #[test]
    fn test_restriction_survives_json_round_trip() {
        let sender = ObjectId::generate();
        let r = Restriction::new(
            name("detachallthis"),
            sender,
            "Collar",
            vec![RestrictionArg::Text("Clothing/Hats".into())],
        );
        let json = serde_json::to_string(&r).unwrap();
        let back: Restriction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
        assert_eq!(back.original_behavior(), r.original_behavior());
        assert_eq!(back.sender_name(), r.sender_name());
    }

    #[test]
    fn test_status_text_keeps_original_spelling() {
        let sender = ObjectId::generate();
        let r = Restriction::new(
            name("camdistmax"),
            sender,
            "Collar",
            vec![RestrictionArg::Float(3.0)],
        );
        assert_eq!(r.status_text(), "camdistmax:3");
    }
}
