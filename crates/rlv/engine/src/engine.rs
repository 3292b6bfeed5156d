//! The engine core
//!
//! One instance per agent. Commands run synchronously to completion;
//! restriction mutation happens before any awaited collaborator call, so
//! cancellation of a collaborator call never leaves partial state.

use crate::notify;
use crate::options::EngineOptions;
use crate::traits::{ActionHandler, InventoryProvider, ReplyTransport, WorldProvider};
use rlv_inventory::InventoryMap;
use rlv_locks::LockedFolderMap;
use rlv_parser::{classify, parse_restriction_args, tokenize, ParsedCommand, RlvMessage};
use rlv_permissions::PermissionService;
use rlv_store::{RestrictionChange, RestrictionStore};
use rlv_types::{
    AttachmentPoint, BehaviorName, ObjectId, Restriction, RlvBehavior, RlvError, RlvResult,
    WearableType,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub struct RlvEngine {
    pub(crate) options: EngineOptions,
    pub(crate) store: Arc<RestrictionStore>,
    pub(crate) locks: Mutex<LockedFolderMap>,
    pub(crate) inventory: Arc<dyn InventoryProvider>,
    pub(crate) world: Arc<dyn WorldProvider>,
    pub(crate) transport: Arc<dyn ReplyTransport>,
    pub(crate) actions: Arc<dyn ActionHandler>,
}

impl RlvEngine {
    pub fn new(
        options: EngineOptions,
        inventory: Arc<dyn InventoryProvider>,
        world: Arc<dyn WorldProvider>,
        transport: Arc<dyn ReplyTransport>,
        actions: Arc<dyn ActionHandler>,
    ) -> Self {
        Self {
            options,
            store: Arc::new(RestrictionStore::new()),
            locks: Mutex::new(LockedFolderMap::new()),
            inventory,
            world,
            transport,
            actions,
        }
    }

    /// The restriction store, for hosts that surface state in a UI
    pub fn store(&self) -> &RestrictionStore {
        &self.store
    }

    /// Process one inbound line.
    ///
    /// The line must start with `@`; comma-separated sub-commands all
    /// run even when an earlier one fails, and the returned flag is the
    /// AND of their results. The outer error covers only a line that
    /// cannot be split at all.
    pub async fn process_message(
        &self,
        line: &str,
        sender: ObjectId,
        sender_name: &str,
    ) -> RlvResult<bool> {
        let messages = tokenize(line, sender, sender_name)?;
        let mut all_ok = true;
        for message in messages {
            let result = match message {
                Ok(message) => self.process_command(&message).await,
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                debug!(error = %err, sender = %sender, "command failed");
                all_ok = false;
            }
        }
        Ok(all_ok)
    }

    async fn process_command(&self, message: &RlvMessage) -> RlvResult<()> {
        if let Some(name) = RlvBehavior::from_name(&message.behavior) {
            if self.options.is_blacklisted(&name.canonical) {
                // a query still gets an (empty) reply so the script is
                // not left waiting on the channel
                if let Ok(channel) = message.param.parse::<i32>() {
                    if channel != 0 {
                        self.transport.send_reply(channel, "").await?;
                    }
                }
                return Err(RlvError::Blacklisted {
                    behavior: message.behavior.clone(),
                });
            }
        }

        match classify(message)? {
            ParsedCommand::Clear { filter } => {
                self.handle_clear(message.sender, filter.as_deref()).await
            }
            ParsedCommand::Restriction {
                name,
                option,
                install,
            } => {
                self.handle_restriction(message, name, &option, install)
                    .await
            }
            ParsedCommand::Force { name, option } => {
                self.handle_force(message, &name, &option).await
            }
            ParsedCommand::Query {
                name,
                option,
                channel,
            } => self.handle_query(message, &name, &option, channel).await,
        }
    }

    async fn handle_restriction(
        &self,
        message: &RlvMessage,
        name: BehaviorName,
        option: &str,
        install: bool,
    ) -> RlvResult<()> {
        let args = parse_restriction_args(&name.canonical, option)?;
        let restriction = Restriction::new(name, message.sender, &message.sender_name, args);

        // Fetch the inventory before mutating: the store update itself
        // must stay synchronous so cancellation cannot split it.
        let inventory = if restriction.behavior().folder_lock_family().is_some() {
            Some(self.shared_inventory_or_empty().await)
        } else {
            None
        };

        let change = if install {
            self.store.add(restriction.clone());
            RestrictionChange::Added(restriction)
        } else {
            self.store.remove(&restriction);
            RestrictionChange::Removed(restriction)
        };

        if let Some(inventory) = inventory {
            // Incremental apply on add; removal rebuilds, because other
            // restrictions may still cover the same folders
            let mut locks = self.lock_locks();
            match &change {
                RestrictionChange::Added(restriction) => locks.apply(restriction, &inventory),
                RestrictionChange::Removed(_) => {
                    *locks = LockedFolderMap::rebuild(&self.store, &inventory)
                }
            }
        }

        self.notify_change(&change).await;
        Ok(())
    }

    async fn handle_clear(&self, sender: ObjectId, filter: Option<&str>) -> RlvResult<()> {
        let inventory = self.shared_inventory_or_empty().await;
        let removed = self.store.clear(sender, filter);
        {
            let mut locks = self.lock_locks();
            *locks = LockedFolderMap::rebuild(&self.store, &inventory);
        }
        info!(sender = %sender, count = removed.len(), "restrictions cleared");
        for restriction in removed {
            self.notify_change(&RestrictionChange::Removed(restriction))
                .await;
        }
        Ok(())
    }

    /// Fan a restriction change out to every matching `notify` target
    async fn notify_change(&self, change: &RestrictionChange) {
        let body = change.restriction().status_text();
        let text = format!("/{}{}", body, change.suffix());
        self.notify_text(&body, &text).await;
    }

    pub(crate) async fn notify_text(&self, match_against: &str, text: &str) {
        for channel in notify::matching_channels(&self.store, match_against) {
            if let Err(err) = self.transport.send_reply(channel, text).await {
                warn!(channel, error = %err, "notify delivery failed");
            }
        }
    }

    // ===== public notification API =====

    pub async fn report_sit(&self, object: ObjectId) {
        let text = format!("sat object legally {object}");
        self.notify_text("sat", &text).await;
    }

    pub async fn report_unsit(&self) {
        self.notify_text("unsat", "unsat object legally").await;
    }

    pub async fn report_worn_item_change(&self, layer: WearableType, worn: bool) {
        let verb = if worn { "worn" } else { "unworn" };
        let text = format!("{verb} legally {}", layer.wire_name());
        self.notify_text(verb, &text).await;
    }

    pub async fn report_attached_item_change(&self, point: AttachmentPoint, attached: bool) {
        let verb = if attached { "attached" } else { "detached" };
        let text = format!("{verb} legally {}", point.wire_name());
        self.notify_text(verb, &text).await;
    }

    pub async fn report_inventory_offer(&self, path: &str, accepted: bool) {
        let verb = if accepted { "accepted_in_inv" } else { "declined" };
        let text = format!("{verb} inv_offer {path}");
        self.notify_text(verb, &text).await;
    }

    /// Route a public chat line. With `redirchat` active the line goes
    /// to the redirect channels instead of public chat; the returned
    /// flag says whether it was redirected.
    pub async fn report_send_public_message(&self, text: &str) -> RlvResult<bool> {
        let redirects = self.store.get(&RlvBehavior::RedirChat);
        if redirects.is_empty() {
            self.notify_text("sentchat", "sentchat").await;
            return Ok(false);
        }
        for redirect in redirects {
            if let Some(channel) = redirect.args().first().and_then(|a| a.as_int()) {
                self.transport.send_reply(channel as i32, text).await?;
            }
        }
        Ok(true)
    }

    // ===== shared plumbing =====

    pub(crate) fn lock_locks(&self) -> MutexGuard<'_, LockedFolderMap> {
        self.locks
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    pub(crate) fn permissions<'a>(&'a self, locks: &'a LockedFolderMap) -> PermissionService<'a> {
        PermissionService::new(&self.store, locks, self.options.permissive)
    }

    /// Fresh index over the shared folder; the provider is re-queried
    /// every time because inventory may change between commands
    pub(crate) async fn shared_inventory(&self) -> RlvResult<InventoryMap> {
        let snapshot = self
            .inventory
            .try_get_shared_folder()
            .await?
            .ok_or_else(|| RlvError::resolution("shared folder"))?;
        Ok(InventoryMap::build(&snapshot))
    }

    pub(crate) async fn shared_inventory_or_empty(&self) -> InventoryMap {
        match self.shared_inventory().await {
            Ok(map) => map,
            Err(err) => {
                warn!(error = %err, "shared folder unavailable");
                InventoryMap::default()
            }
        }
    }

    /// Tightest value across a camera-limit restriction's instances
    pub(crate) fn restriction_limit(
        &self,
        behavior: &RlvBehavior,
        tightest_is_max: bool,
    ) -> Option<f32> {
        let values = self
            .store
            .get(behavior)
            .iter()
            .filter_map(|r| r.args().first().and_then(|a| a.as_float()))
            .collect::<Vec<f32>>();
        if tightest_is_max {
            values.into_iter().reduce(f32::max)
        } else {
            values.into_iter().reduce(f32::min)
        }
    }
}

impl std::fmt::Debug for RlvEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RlvEngine")
            .field("restrictions", &self.store.len())
            .finish()
    }
}
