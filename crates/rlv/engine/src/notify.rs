//! Notification target matching
//!
//! `@notify:<channel>[;filter]=add` registers the sender as a
//! notification target. Every restriction change and report event is
//! offered to each registration; a filter narrows delivery to texts
//! containing it.

use rlv_store::RestrictionStore;
use rlv_types::RlvBehavior;

/// Channels of every registration whose filter matches `text` (an
/// absent filter matches everything). De-duplicated, order unspecified.
pub(crate) fn matching_channels(store: &RestrictionStore, text: &str) -> Vec<i32> {
    let text = text.to_ascii_lowercase();
    let mut channels = Vec::new();
    for registration in store.get(&RlvBehavior::Notify) {
        let Some(channel) = registration.args().first().and_then(|a| a.as_int()) else {
            continue;
        };
        let matches = match registration.args().get(1).and_then(|a| a.as_text()) {
            Some(filter) => text.contains(&filter.to_ascii_lowercase()),
            None => true,
        };
        let channel = channel as i32;
        if matches && !channels.contains(&channel) {
            channels.push(channel);
        }
    }
    channels
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlv_types::{ObjectId, Restriction, RestrictionArg};

    fn register(store: &RestrictionStore, channel: i64, filter: Option<&str>) {
        let mut args = vec![RestrictionArg::Int(channel)];
        if let Some(filter) = filter {
            args.push(RestrictionArg::Text(filter.to_string()));
        }
        store.add(Restriction::new(
            RlvBehavior::from_name("notify").unwrap(),
            ObjectId::generate(),
            "Collar",
            args,
        ));
    }

    #[test]
    fn test_unfiltered_registration_matches_everything() {
        let store = RestrictionStore::new();
        register(&store, 1234, None);
        assert_eq!(matching_channels(&store, "fly"), vec![1234]);
        assert_eq!(matching_channels(&store, "tploc"), vec![1234]);
    }

    #[test]
    fn test_filter_narrows_delivery() {
        let store = RestrictionStore::new();
        register(&store, 1234, Some("tp"));
        register(&store, 5678, Some("fly"));
        assert_eq!(matching_channels(&store, "tploc"), vec![1234]);
        assert_eq!(matching_channels(&store, "fly"), vec![5678]);
        assert!(matching_channels(&store, "sendim").is_empty());
    }

    #[test]
    fn test_duplicate_channels_collapse() {
        let store = RestrictionStore::new();
        register(&store, 1234, Some("tp"));
        register(&store, 1234, None);
        assert_eq!(matching_channels(&store, "tploc"), vec![1234]);
    }
}
