//! Message tokenizer
//!
//! Splits one inbound line into per-command triples. A line carries one
//! sender; comma-separated sub-commands are tokenized independently and
//! the caller dispatches each one (overall success is the AND of the
//! sub-results, without short-circuiting).

use rlv_types::{ObjectId, RlvError, RlvResult};
use serde::{Deserialize, Serialize};

/// One tokenized command, not retained past dispatch.
///
/// `behavior` and `param` are lower-cased; `option` keeps its case
/// because folder paths are case-preserving even though matching against
/// them is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlvMessage {
    pub behavior: String,
    pub option: String,
    pub param: String,
    pub sender: ObjectId,
    pub sender_name: String,
}

/// Tokenize a raw line into its command triples.
///
/// The line must start with `@`. Each comma-separated segment is either
/// the bare token `clear` (which bypasses the general grammar) or
/// `behavior(:option)?=param`. A malformed segment yields an error entry
/// for that segment only; the remaining segments still tokenize.
pub fn tokenize(
    line: &str,
    sender: ObjectId,
    sender_name: &str,
) -> RlvResult<Vec<RlvResult<RlvMessage>>> {
    let rest = line
        .strip_prefix('@')
        .ok_or_else(|| RlvError::parse("missing @ prefix"))?;
    if rest.is_empty() {
        return Err(RlvError::parse("empty command"));
    }

    let messages = rest
        .split(',')
        .map(|segment| tokenize_one(segment.trim(), sender, sender_name))
        .collect();
    Ok(messages)
}

fn tokenize_one(segment: &str, sender: ObjectId, sender_name: &str) -> RlvResult<RlvMessage> {
    if segment.is_empty() {
        return Err(RlvError::parse("empty command segment"));
    }

    // `clear` alone skips the behavior(:option)?=param grammar
    if segment.eq_ignore_ascii_case("clear") {
        return Ok(RlvMessage {
            behavior: "clear".to_string(),
            option: String::new(),
            param: String::new(),
            sender,
            sender_name: sender_name.to_string(),
        });
    }

    let (head, param) = segment
        .split_once('=')
        .ok_or_else(|| RlvError::parse(format!("missing '=' in '{segment}'")))?;
    if head.is_empty() {
        return Err(RlvError::parse(format!("missing behavior in '{segment}'")));
    }
    if param.is_empty() {
        return Err(RlvError::parse(format!("missing param in '{segment}'")));
    }

    let (behavior, option) = match head.split_once(':') {
        Some((behavior, option)) => (behavior, option.to_string()),
        None => (head, String::new()),
    };
    if behavior.is_empty() {
        return Err(RlvError::parse(format!("missing behavior in '{segment}'")));
    }

    Ok(RlvMessage {
        behavior: behavior.to_ascii_lowercase(),
        option,
        param: param.to_ascii_lowercase(),
        sender,
        sender_name: sender_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> ObjectId {
        ObjectId::generate()
    }

    #[test]
    fn test_single_command() {
        let msgs = tokenize("@fly=n", sender(), "Collar").unwrap();
        assert_eq!(msgs.len(), 1);
        let msg = msgs[0].as_ref().unwrap();
        assert_eq!(msg.behavior, "fly");
        assert_eq!(msg.option, "");
        assert_eq!(msg.param, "n");
    }

    #[test]
    fn test_option_preserves_case_but_behavior_and_param_fold() {
        let msgs = tokenize("@AttachThis:Clothing/Hats=Force", sender(), "Collar").unwrap();
        let msg = msgs[0].as_ref().unwrap();
        assert_eq!(msg.behavior, "attachthis");
        assert_eq!(msg.option, "Clothing/Hats");
        assert_eq!(msg.param, "force");
    }

    #[test]
    fn test_multi_command_split() {
        let msgs = tokenize("@fly=n,tploc=n,sendim:abc=rem", sender(), "Collar").unwrap();
        assert_eq!(msgs.len(), 3);
        assert!(msgs.iter().all(|m| m.is_ok()));
        assert_eq!(msgs[2].as_ref().unwrap().behavior, "sendim");
    }

    #[test]
    fn test_bare_clear_bypasses_grammar() {
        let msgs = tokenize("@clear", sender(), "Collar").unwrap();
        let msg = msgs[0].as_ref().unwrap();
        assert_eq!(msg.behavior, "clear");
        assert_eq!(msg.param, "");
    }

    #[test]
    fn test_malformed_segment_does_not_poison_line() {
        let msgs = tokenize("@fly=n,borked,unsit=n", sender(), "Collar").unwrap();
        assert_eq!(msgs.len(), 3);
        assert!(msgs[0].is_ok());
        assert!(msgs[1].is_err());
        assert!(msgs[2].is_ok());
    }

    #[test]
    fn test_missing_at_prefix() {
        assert!(tokenize("fly=n", sender(), "Collar").is_err());
    }

    #[test]
    fn test_missing_param() {
        let msgs = tokenize("@fly=", sender(), "Collar").unwrap();
        assert!(msgs[0].is_err());
    }
}
