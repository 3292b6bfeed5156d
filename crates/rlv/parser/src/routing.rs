//! Routing classification
//!
//! Decides what a tokenized command is, in the protocol's fixed order:
//! `clear` → force action → restriction install/remove → nonzero channel
//! query → failure. (The blacklist check sits above this in the engine,
//! before classification.)

use crate::message::RlvMessage;
use rlv_types::{BehaviorName, RlvBehavior, RlvError, RlvResult};
use tracing::debug;

/// A classified command, ready for dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCommand {
    /// Remove restrictions from this sender, optionally filtered by a
    /// behavior-name substring
    Clear { filter: Option<String> },

    /// Install (`n`/`add`) or remove (`y`/`rem`) a restriction
    Restriction {
        name: BehaviorName,
        option: String,
        install: bool,
    },

    /// `=force` action command
    Force { name: BehaviorName, option: String },

    /// `=<channel>` query command
    Query {
        name: BehaviorName,
        option: String,
        channel: i32,
    },
}

/// Classify a tokenized message.
///
/// Fails with a parse error when the behavior name is unknown, the param
/// does not fit any routing rule, or the behavior does not support the
/// routed command kind.
pub fn classify(message: &RlvMessage) -> RlvResult<ParsedCommand> {
    if message.behavior == "clear" {
        let filter = if message.param.is_empty() {
            None
        } else {
            Some(message.param.clone())
        };
        return Ok(ParsedCommand::Clear { filter });
    }

    let name = RlvBehavior::from_name(&message.behavior)
        .ok_or_else(|| RlvError::parse(format!("unknown behavior '{}'", message.behavior)))?;

    let command = match message.param.as_str() {
        "force" => {
            if !name.canonical.supports_force() {
                return Err(RlvError::parse(format!(
                    "'{}' is not a force command",
                    message.behavior
                )));
            }
            ParsedCommand::Force {
                name,
                option: message.option.clone(),
            }
        }
        "n" | "add" => {
            if !name.canonical.supports_restriction() {
                return Err(RlvError::parse(format!(
                    "'{}' is not a restriction",
                    message.behavior
                )));
            }
            ParsedCommand::Restriction {
                name,
                option: message.option.clone(),
                install: true,
            }
        }
        "y" | "rem" => {
            if !name.canonical.supports_restriction() {
                return Err(RlvError::parse(format!(
                    "'{}' is not a restriction",
                    message.behavior
                )));
            }
            ParsedCommand::Restriction {
                name,
                option: message.option.clone(),
                install: false,
            }
        }
        other => match other.parse::<i32>() {
            Ok(channel) if channel != 0 => {
                if !name.canonical.supports_query() {
                    return Err(RlvError::parse(format!(
                        "'{}' is not a query",
                        message.behavior
                    )));
                }
                ParsedCommand::Query {
                    name,
                    option: message.option.clone(),
                    channel,
                }
            }
            _ => {
                debug!(behavior = %message.behavior, param = %message.param, "unroutable command");
                return Err(RlvError::parse(format!(
                    "unroutable param '{}' for '{}'",
                    message.param, message.behavior
                )));
            }
        },
    };

    Ok(command)
}
