//! Command parsing for the RLV protocol
//!
//! Tokenizes a raw `@`-prefixed line into `(behavior, option, param)`
//! triples, then classifies each triple for routing: clear command,
//! restriction install/remove, force action, or channel query. The
//! grammar is fixed (`behavior(:option)?=param`, comma-joined
//! multi-commands, the bare token `clear` as a special case).

pub mod message;
pub mod options;
pub mod routing;

pub use message::{tokenize, RlvMessage};
pub use options::parse_restriction_args;
pub use routing::{classify, ParsedCommand};
