//! Engine configuration

use rlv_types::RlvBehavior;
use std::collections::BTreeSet;
use tracing::warn;

/// Engine-wide settings, fixed at construction.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Relax same-sender exception matching on the plain restriction
    /// tier (the `permissive` restriction switches it off while held)
    pub permissive: bool,
    /// Honor `nostrip` markers during detach collection
    pub enforce_nostrip: bool,
    // Canonical wire names, sorted for the getblacklist reply
    blacklist: BTreeSet<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            permissive: true,
            enforce_nostrip: true,
            blacklist: BTreeSet::new(),
        }
    }
}

impl EngineOptions {
    pub fn builder() -> EngineOptionsBuilder {
        EngineOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Whether commands naming this behavior are refused
    pub fn is_blacklisted(&self, behavior: &RlvBehavior) -> bool {
        behavior.is_blacklistable() && self.blacklist.contains(&behavior.wire_name())
    }

    /// Blacklisted behavior names in sorted order
    pub fn blacklist_names(&self) -> impl Iterator<Item = &str> {
        self.blacklist.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct EngineOptionsBuilder {
    options: EngineOptions,
}

impl EngineOptionsBuilder {
    pub fn permissive(mut self, permissive: bool) -> Self {
        self.options.permissive = permissive;
        self
    }

    pub fn enforce_nostrip(mut self, enforce: bool) -> Self {
        self.options.enforce_nostrip = enforce;
        self
    }

    /// Seed the blacklist with a behavior name. Unknown names and
    /// behaviors that must stay reachable (version and blacklist
    /// queries) are ignored.
    pub fn blacklist(mut self, name: &str) -> Self {
        match RlvBehavior::from_name(name) {
            Some(parsed) if parsed.canonical.is_blacklistable() => {
                self.options
                    .blacklist
                    .insert(parsed.canonical.wire_name());
            }
            _ => warn!(name, "ignoring unusable blacklist entry"),
        }
        self
    }

    pub fn build(self) -> EngineOptions {
        self.options
    }
}
