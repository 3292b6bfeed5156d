//! Folder and item naming conventions
//!
//! Name prefixes and parenthesized tokens are wire-visible protocol
//! surface, not display sugar: `.` hides a node, `~`/`+` are stripped
//! for matching, `+` switches a folder to add-instead-of-replace attach
//! semantics, and a trailing `(token)` encodes a default attachment
//! point.

use rlv_types::AttachmentPoint;

/// Leading `.`: excluded from recursive traversal and default path
/// resolution
pub fn is_private(name: &str) -> bool {
    name.starts_with('.')
}

/// Leading `+`: attach requests collected from this folder carry
/// add-instead-of-replace semantics
pub fn is_add_folder(name: &str) -> bool {
    name.starts_with('+')
}

/// Name with a single leading `~` or `+` marker removed, for matching
pub fn stripped(name: &str) -> &str {
    name.strip_prefix(['~', '+']).unwrap_or(name)
}

/// Case-insensitive `nostrip` marker: exempts an item (or everything
/// under a folder) from non-forced detach
pub fn has_nostrip(name: &str) -> bool {
    name.to_ascii_lowercase().contains("nostrip")
}

/// The last parenthesized token in a name, e.g. `"Hats (spine)"` →
/// `"spine"`.
fn parenthesized_token(name: &str) -> Option<&str> {
    let open = name.rfind('(')?;
    let close = name[open..].find(')')? + open;
    let token = name[open + 1..close].trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Attachment point encoded in a folder or item name, if any
pub fn encoded_attachment_point(name: &str) -> Option<AttachmentPoint> {
    parenthesized_token(name).and_then(AttachmentPoint::from_name)
}
