//! Per-behavior option grammar
//!
//! Restriction options parse into typed arguments according to a fixed
//! per-behavior table: integer channels, float distances, target ids,
//! clothing layers, attachment points, or raw path/name strings. A
//! grammar mismatch is a parse failure for the whole command.

use rlv_types::{
    AttachmentPoint, RestrictionArg, RlvBehavior, RlvError, RlvResult, WearableType,
};
use uuid::Uuid;

/// Parse a restriction command's option into typed args.
///
/// The empty option is valid for every behavior that has a bare form;
/// behaviors that require a target (`showhovertext`, `editobj`,
/// `touchthis`) reject it.
pub fn parse_restriction_args(
    behavior: &RlvBehavior,
    option: &str,
) -> RlvResult<Vec<RestrictionArg>> {
    use RlvBehavior as B;

    match behavior {
        // Channel-valued
        B::RedirChat | B::RedirEmote => require(option, behavior, int_arg),
        B::SendChannel | B::SendChannelExcept => optional(option, behavior, int_arg),

        // notify: <channel>[;filter]
        B::Notify => {
            let option = non_empty(option, behavior)?;
            let (channel, filter) = match option.split_once(';') {
                Some((channel, filter)) => (channel, Some(filter)),
                None => (option, None),
            };
            let mut args = vec![int_arg(channel, behavior)?];
            if let Some(filter) = filter {
                args.push(RestrictionArg::Text(filter.to_string()));
            }
            Ok(args)
        }

        // Distance-valued (optional: the bare form blocks outright)
        B::TouchFar | B::SitTp => optional(option, behavior, float_arg),

        // Camera limits require a value
        B::SetCamFovMin | B::SetCamFovMax | B::SetCamAvDistMin | B::SetCamAvDistMax => {
            require(option, behavior, float_arg)
        }

        // Attachment-point scoped
        B::Detach | B::AddAttach | B::RemAttach => optional(option, behavior, point_arg),

        // Clothing-layer scoped
        B::AddOutfit | B::RemOutfit => optional(option, behavior, wearable_arg),

        // Folder-lock family: uuid | layer | point | path
        B::DetachThis
        | B::DetachAllThis
        | B::AttachThis
        | B::AttachAllThis
        | B::DetachThisExcept
        | B::DetachAllThisExcept
        | B::AttachThisExcept
        | B::AttachAllThisExcept => {
            if option.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![folder_target_arg(option)])
        }

        // Id required
        B::ShowHoverText | B::EditObj | B::TouchThis => require(option, behavior, id_arg),

        // Per-target exception and explicit to/from-list families: bare,
        // uuid, or a name string (group targets)
        B::TpLure
        | B::TpRequest
        | B::AcceptTp
        | B::AcceptTpRequest
        | B::RecvChat
        | B::RecvChatFrom
        | B::RecvEmote
        | B::RecvEmoteFrom
        | B::SendIm
        | B::SendImTo
        | B::StartIm
        | B::StartImTo
        | B::RecvIm
        | B::RecvImFrom
        | B::ShowNames
        | B::ShowNameTags
        | B::TouchWorld
        | B::TouchAttachOther
        | B::TouchHud
        | B::Edit
        | B::Share => optional(option, behavior, id_or_text_arg),

        // Group restriction takes an optional group id or name
        B::SetGroup => optional(option, behavior, id_or_text_arg),

        // Everything else has no option grammar
        _ => {
            if option.is_empty() {
                Ok(Vec::new())
            } else {
                Err(RlvError::parse(format!(
                    "'{behavior}' takes no option, got '{option}'"
                )))
            }
        }
    }
}

fn non_empty<'a>(option: &'a str, behavior: &RlvBehavior) -> RlvResult<&'a str> {
    if option.is_empty() {
        Err(RlvError::parse(format!("'{behavior}' requires an option")))
    } else {
        Ok(option)
    }
}

fn optional(
    option: &str,
    behavior: &RlvBehavior,
    parse: impl Fn(&str, &RlvBehavior) -> RlvResult<RestrictionArg>,
) -> RlvResult<Vec<RestrictionArg>> {
    if option.is_empty() {
        return Ok(Vec::new());
    }
    parse(option, behavior).map(|arg| vec![arg])
}

fn require(
    option: &str,
    behavior: &RlvBehavior,
    parse: impl Fn(&str, &RlvBehavior) -> RlvResult<RestrictionArg>,
) -> RlvResult<Vec<RestrictionArg>> {
    let option = non_empty(option, behavior)?;
    parse(option, behavior).map(|arg| vec![arg])
}

fn int_arg(option: &str, behavior: &RlvBehavior) -> RlvResult<RestrictionArg> {
    option
        .trim()
        .parse::<i64>()
        .map(RestrictionArg::Int)
        .map_err(|_| RlvError::parse(format!("'{behavior}' expects an integer, got '{option}'")))
}

fn float_arg(option: &str, behavior: &RlvBehavior) -> RlvResult<RestrictionArg> {
    option
        .trim()
        .parse::<f32>()
        .map(RestrictionArg::Float)
        .map_err(|_| RlvError::parse(format!("'{behavior}' expects a number, got '{option}'")))
}

fn id_arg(option: &str, behavior: &RlvBehavior) -> RlvResult<RestrictionArg> {
    Uuid::parse_str(option.trim())
        .map(RestrictionArg::Id)
        .map_err(|_| RlvError::parse(format!("'{behavior}' expects a uuid, got '{option}'")))
}

fn id_or_text_arg(option: &str, _behavior: &RlvBehavior) -> RlvResult<RestrictionArg> {
    match Uuid::parse_str(option.trim()) {
        Ok(id) => Ok(RestrictionArg::Id(id)),
        Err(_) => Ok(RestrictionArg::Text(option.to_string())),
    }
}

fn point_arg(option: &str, behavior: &RlvBehavior) -> RlvResult<RestrictionArg> {
    AttachmentPoint::from_name(option)
        .map(RestrictionArg::Attachment)
        .ok_or_else(|| {
            RlvError::parse(format!(
                "'{behavior}' expects an attachment point, got '{option}'"
            ))
        })
}

fn wearable_arg(option: &str, behavior: &RlvBehavior) -> RlvResult<RestrictionArg> {
    WearableType::from_name(option)
        .map(RestrictionArg::Wearable)
        .ok_or_else(|| {
            RlvError::parse(format!(
                "'{behavior}' expects a clothing layer, got '{option}'"
            ))
        })
}

/// Folder-lock targets try uuid, then layer, then point, then fall back
/// to a literal path (case preserved for the path form).
fn folder_target_arg(option: &str) -> RestrictionArg {
    if let Ok(id) = Uuid::parse_str(option.trim()) {
        return RestrictionArg::Id(id);
    }
    if let Some(layer) = WearableType::from_name(option) {
        return RestrictionArg::Wearable(layer);
    }
    if let Some(point) = AttachmentPoint::from_name(option) {
        return RestrictionArg::Attachment(point);
    }
    RestrictionArg::Text(option.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_options_for_optional_behaviors() {
        assert!(parse_restriction_args(&RlvBehavior::SendChannel, "")
            .unwrap()
            .is_empty());
        assert!(parse_restriction_args(&RlvBehavior::Detach, "")
            .unwrap()
            .is_empty());
        assert!(parse_restriction_args(&RlvBehavior::SendIm, "")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_channel_args() {
        assert_eq!(
            parse_restriction_args(&RlvBehavior::SendChannel, "5").unwrap(),
            vec![RestrictionArg::Int(5)]
        );
        assert!(parse_restriction_args(&RlvBehavior::RedirChat, "").is_err());
        assert!(parse_restriction_args(&RlvBehavior::RedirChat, "abc").is_err());
    }

    #[test]
    fn test_notify_channel_and_filter() {
        let args = parse_restriction_args(&RlvBehavior::Notify, "2222;worn").unwrap();
        assert_eq!(
            args,
            vec![
                RestrictionArg::Int(2222),
                RestrictionArg::Text("worn".into())
            ]
        );
        let args = parse_restriction_args(&RlvBehavior::Notify, "2222").unwrap();
        assert_eq!(args, vec![RestrictionArg::Int(2222)]);
    }

    #[test]
    fn test_camera_limits_require_float() {
        assert_eq!(
            parse_restriction_args(&RlvBehavior::SetCamAvDistMax, "3.5").unwrap(),
            vec![RestrictionArg::Float(3.5)]
        );
        assert!(parse_restriction_args(&RlvBehavior::SetCamAvDistMax, "").is_err());
    }

    #[test]
    fn test_point_and_layer_args() {
        assert_eq!(
            parse_restriction_args(&RlvBehavior::Detach, "spine").unwrap(),
            vec![RestrictionArg::Attachment(AttachmentPoint::Spine)]
        );
        assert_eq!(
            parse_restriction_args(&RlvBehavior::AddOutfit, "pants").unwrap(),
            vec![RestrictionArg::Wearable(WearableType::Pants)]
        );
        assert!(parse_restriction_args(&RlvBehavior::Detach, "tail").is_err());
    }

    #[test]
    fn test_folder_target_precedence() {
        let id = Uuid::new_v4();
        assert_eq!(
            parse_restriction_args(&RlvBehavior::DetachThis, &id.to_string()).unwrap(),
            vec![RestrictionArg::Id(id)]
        );
        assert_eq!(
            parse_restriction_args(&RlvBehavior::DetachThis, "pants").unwrap(),
            vec![RestrictionArg::Wearable(WearableType::Pants)]
        );
        assert_eq!(
            parse_restriction_args(&RlvBehavior::DetachThis, "spine").unwrap(),
            vec![RestrictionArg::Attachment(AttachmentPoint::Spine)]
        );
        // Case preserved for literal paths
        assert_eq!(
            parse_restriction_args(&RlvBehavior::DetachAllThis, "Clothing/Hats").unwrap(),
            vec![RestrictionArg::Text("Clothing/Hats".into())]
        );
    }

    #[test]
    fn test_no_option_behaviors_reject_payload() {
        assert!(parse_restriction_args(&RlvBehavior::Fly, "").unwrap().is_empty());
        assert!(parse_restriction_args(&RlvBehavior::Fly, "1").is_err());
    }

    #[test]
    fn test_id_or_name_targets() {
        let id = Uuid::new_v4();
        assert_eq!(
            parse_restriction_args(&RlvBehavior::SendIm, &id.to_string()).unwrap(),
            vec![RestrictionArg::Id(id)]
        );
        assert_eq!(
            parse_restriction_args(&RlvBehavior::SendImTo, "Some Group").unwrap(),
            vec![RestrictionArg::Text("Some Group".into())]
        );
    }
}
