//! End-to-end engine tests over the protocol surface

use async_trait::async_trait;
use rlv_engine::{
    ActionHandler, AttachmentRequest, CameraParam, EngineOptions, GroupTarget, InventoryProvider,
    ReplyTransport, RlvEngine, TpDestination, WorldProvider,
};
use rlv_inventory::{FolderSnapshot, ItemSnapshot};
use rlv_types::{
    AttachmentPoint, FolderId, ItemId, ObjectId, RlvBehavior, RlvResult, WearableType,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ===== collaborator mocks =====

struct StaticInventory {
    tree: FolderSnapshot,
}

fn collect_outfit(folder: &FolderSnapshot, out: &mut Vec<ItemSnapshot>) {
    for item in &folder.items {
        if item.is_on_avatar() {
            out.push(item.clone());
        }
    }
    for child in &folder.folders {
        collect_outfit(child, out);
    }
}

#[async_trait]
impl InventoryProvider for StaticInventory {
    async fn try_get_shared_folder(&self) -> RlvResult<Option<FolderSnapshot>> {
        Ok(Some(self.tree.clone()))
    }

    async fn try_get_current_outfit(&self) -> RlvResult<Vec<ItemSnapshot>> {
        let mut out = Vec::new();
        collect_outfit(&self.tree, &mut out);
        Ok(out)
    }
}

#[derive(Default)]
struct StaticWorld {
    sitting: Option<ObjectId>,
}

#[async_trait]
impl WorldProvider for StaticWorld {
    async fn object_exists(&self, _object: ObjectId) -> RlvResult<bool> {
        Ok(true)
    }

    async fn is_sitting(&self) -> RlvResult<bool> {
        Ok(self.sitting.is_some())
    }

    async fn sit_object(&self) -> RlvResult<Option<ObjectId>> {
        Ok(self.sitting)
    }

    async fn active_group(&self) -> RlvResult<String> {
        Ok("Friends".to_string())
    }

    async fn camera_param(&self, _param: CameraParam) -> RlvResult<f32> {
        Ok(1.0)
    }

    async fn height_offset(&self) -> RlvResult<f32> {
        Ok(0.0)
    }

    async fn env_setting(&self, _key: &str) -> RlvResult<Option<String>> {
        Ok(None)
    }

    async fn debug_setting(&self, _key: &str) -> RlvResult<Option<String>> {
        Ok(None)
    }
}

#[derive(Default)]
struct RecordingTransport {
    replies: Mutex<Vec<(i32, String)>>,
}

impl RecordingTransport {
    fn replies(&self) -> Vec<(i32, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplyTransport for RecordingTransport {
    async fn send_reply(&self, channel: i32, text: &str) -> RlvResult<()> {
        self.replies.lock().unwrap().push((channel, text.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingActions {
    attaches: Mutex<Vec<Vec<AttachmentRequest>>>,
    detaches: Mutex<Vec<Vec<ItemId>>>,
    rem_outfits: Mutex<Vec<Vec<ItemId>>>,
    sits: Mutex<Vec<ObjectId>>,
    unsits: Mutex<usize>,
    teleports: Mutex<Vec<TpDestination>>,
    groups: Mutex<Vec<GroupTarget>>,
}

impl RecordingActions {
    fn attaches(&self) -> Vec<Vec<AttachmentRequest>> {
        self.attaches.lock().unwrap().clone()
    }

    fn detaches(&self) -> Vec<Vec<ItemId>> {
        self.detaches.lock().unwrap().clone()
    }

    fn sits(&self) -> Vec<ObjectId> {
        self.sits.lock().unwrap().clone()
    }

    fn unsits(&self) -> usize {
        *self.unsits.lock().unwrap()
    }
}

#[async_trait]
impl ActionHandler for RecordingActions {
    async fn attach(&self, requests: Vec<AttachmentRequest>) -> RlvResult<()> {
        self.attaches.lock().unwrap().push(requests);
        Ok(())
    }

    async fn detach(&self, items: Vec<ItemId>) -> RlvResult<()> {
        self.detaches.lock().unwrap().push(items);
        Ok(())
    }

    async fn rem_outfit(&self, items: Vec<ItemId>) -> RlvResult<()> {
        self.rem_outfits.lock().unwrap().push(items);
        Ok(())
    }

    async fn sit(&self, object: ObjectId) -> RlvResult<()> {
        self.sits.lock().unwrap().push(object);
        Ok(())
    }

    async fn unsit(&self) -> RlvResult<()> {
        *self.unsits.lock().unwrap() += 1;
        Ok(())
    }

    async fn sit_ground(&self) -> RlvResult<()> {
        Ok(())
    }

    async fn set_rot(&self, _radians: f32) -> RlvResult<()> {
        Ok(())
    }

    async fn adjust_height(&self, _distance: f32, _factor: f32, _delta: f32) -> RlvResult<()> {
        Ok(())
    }

    async fn set_cam_fov(&self, _fov: f32) -> RlvResult<()> {
        Ok(())
    }

    async fn tp_to(&self, destination: TpDestination) -> RlvResult<()> {
        self.teleports.lock().unwrap().push(destination);
        Ok(())
    }

    async fn set_group(&self, group: GroupTarget) -> RlvResult<()> {
        self.groups.lock().unwrap().push(group);
        Ok(())
    }

    async fn set_env(&self, _key: &str, _value: &str) -> RlvResult<()> {
        Ok(())
    }

    async fn set_debug(&self, _key: &str, _value: &str) -> RlvResult<()> {
        Ok(())
    }
}

struct Harness {
    engine: RlvEngine,
    actions: Arc<RecordingActions>,
    transport: Arc<RecordingTransport>,
}

impl Harness {
    fn new(tree: FolderSnapshot) -> Self {
        Self::with_options(tree, EngineOptions::default())
    }

    fn with_options(tree: FolderSnapshot, options: EngineOptions) -> Self {
        Self::with_world(tree, options, StaticWorld::default())
    }

    fn seated_on(tree: FolderSnapshot, object: ObjectId) -> Self {
        let world = StaticWorld {
            sitting: Some(object),
        };
        Self::with_world(tree, EngineOptions::default(), world)
    }

    fn with_world(tree: FolderSnapshot, options: EngineOptions, world: StaticWorld) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let actions = Arc::new(RecordingActions::default());
        let transport = Arc::new(RecordingTransport::default());
        let engine = RlvEngine::new(
            options,
            Arc::new(StaticInventory { tree }),
            Arc::new(world),
            transport.clone(),
            actions.clone(),
        );
        Self {
            engine,
            actions,
            transport,
        }
    }

    async fn run(&self, line: &str, sender: ObjectId) -> bool {
        self.engine
            .process_message(line, sender, "Collar")
            .await
            .unwrap()
    }
}

fn folder(name: &str) -> FolderSnapshot {
    FolderSnapshot::new(FolderId::generate(), name)
}

fn item(name: &str) -> ItemSnapshot {
    ItemSnapshot::new(ItemId::generate(), name)
}

/// `#RLV/Clothing/{BusinessPants, HappyShirt, RetroPants, Hats/{FancyHat,
/// PartyHat}}`, `#RLV/Accessories/{Glasses, Watch}` with nothing worn
fn sample_tree() -> FolderSnapshot {
    folder("#RLV")
        .with_folder(
            folder("Clothing")
                .with_item(item("BusinessPants"))
                .with_item(item("HappyShirt"))
                .with_item(item("RetroPants"))
                .with_folder(
                    folder("Hats")
                        .with_item(item("FancyHat"))
                        .with_item(item("PartyHat")),
                ),
        )
        .with_folder(
            folder("Accessories")
                .with_item(item("Glasses"))
                .with_item(item("Watch")),
        )
}

/// Same shape, with the Clothing items on the avatar
fn worn_tree(hat_prim: ObjectId) -> FolderSnapshot {
    folder("#RLV")
        .with_folder(
            folder("Clothing")
                .with_item(item("BusinessPants").worn(WearableType::Pants))
                .with_item(item("HappyShirt").worn(WearableType::Shirt))
                .with_item(item("RetroPants"))
                .with_folder(
                    folder("Hats")
                        .with_item(item("FancyHat").attached(AttachmentPoint::Skull, hat_prim))
                        .with_item(item("PartyHat")),
                ),
        )
        .with_folder(folder("Accessories").with_item(item("Glasses")))
}

// ===== attach =====

#[tokio::test]
async fn test_attachall_collects_whole_clothing_subtree() {
    let harness = Harness::new(sample_tree());
    assert!(harness.run("@attachall:Clothing=force", ObjectId::generate()).await);

    let attaches = harness.actions.attaches();
    assert_eq!(attaches.len(), 1);
    let requests = &attaches[0];
    assert_eq!(requests.len(), 5);
    assert!(requests.iter().all(|r| r.replace_existing));
    assert!(requests
        .iter()
        .all(|r| r.attachment_point == AttachmentPoint::Default));
}

#[tokio::test]
async fn test_attach_is_not_recursive() {
    let harness = Harness::new(sample_tree());
    assert!(harness.run("@attach:Clothing=force", ObjectId::generate()).await);

    let attaches = harness.actions.attaches();
    assert_eq!(attaches[0].len(), 3);
}

#[tokio::test]
async fn test_attachover_keeps_add_semantics() {
    let harness = Harness::new(sample_tree());
    assert!(harness
        .run("@attachallover:Accessories=force", ObjectId::generate())
        .await);

    let attaches = harness.actions.attaches();
    assert_eq!(attaches[0].len(), 2);
    assert!(attaches[0].iter().all(|r| !r.replace_existing));
}

#[tokio::test]
async fn test_attach_resolution_failure_still_emits_empty_event() {
    let harness = Harness::new(sample_tree());
    assert!(!harness.run("@attach:NoSuchFolder=force", ObjectId::generate()).await);

    let attaches = harness.actions.attaches();
    assert_eq!(attaches.len(), 1);
    assert!(attaches[0].is_empty());
}

#[tokio::test]
async fn test_private_folders_are_invisible_to_attach_and_getinv() {
    let tree = folder("#RLV").with_folder(
        folder("Clothing")
            .with_item(item("Shirt"))
            .with_folder(folder(".Private").with_item(item("Secret"))),
    );
    let harness = Harness::new(tree);
    let sender = ObjectId::generate();

    assert!(harness.run("@attachall:Clothing=force", sender).await);
    assert_eq!(harness.actions.attaches()[0].len(), 1);

    assert!(harness.run("@getinv:Clothing=2222", sender).await);
    assert_eq!(harness.transport.replies(), vec![(2222, String::new())]);
}

// ===== detach and the lock-bypass asymmetry =====

#[tokio::test]
async fn test_detachthis_force_honors_folder_locks() {
    let hat_prim = ObjectId::generate();
    let harness = Harness::new(worn_tree(hat_prim));
    let collar = ObjectId::generate();

    assert!(harness.run("@detachallthis:Clothing=n", collar).await);
    assert!(harness.run("@detachthis:Clothing=force", collar).await);

    let detaches = harness.actions.detaches();
    assert_eq!(detaches.len(), 1);
    assert!(detaches[0].is_empty());
}

/// Deliberate protocol asymmetry: the hard-force detach-all family does
/// not consult the locked-folder map, only plain detach restrictions
/// and nostrip rules.
#[tokio::test]
async fn test_detach_all_force_ignores_folder_locks() {
    let hat_prim = ObjectId::generate();
    let harness = Harness::new(worn_tree(hat_prim));
    let collar = ObjectId::generate();

    assert!(harness.run("@detachallthis:Clothing=n", collar).await);
    assert!(harness.run("@detachall:Clothing=force", collar).await);

    let detaches = harness.actions.detaches();
    assert_eq!(detaches.len(), 1);
    // the two worn clothing items and the attached hat
    assert_eq!(detaches[0].len(), 3);
}

#[tokio::test]
async fn test_detach_all_force_still_honors_plain_detach_restriction() {
    let hat_prim = ObjectId::generate();
    let harness = Harness::new(worn_tree(hat_prim));
    let collar = ObjectId::generate();

    // skull-scoped detach restriction survives the hard force
    assert!(harness.run("@detach:skull=n", collar).await);
    assert!(harness.run("@detachall:Clothing=force", collar).await);

    let detaches = harness.actions.detaches();
    assert_eq!(detaches[0].len(), 2);
}

#[tokio::test]
async fn test_detach_point_option() {
    let hat_prim = ObjectId::generate();
    let harness = Harness::new(worn_tree(hat_prim));

    assert!(harness.run("@detach:skull=force", ObjectId::generate()).await);
    let detaches = harness.actions.detaches();
    assert_eq!(detaches[0].len(), 1);
}

#[tokio::test]
async fn test_detach_without_option_detaches_the_sender_object() {
    let hat_prim = ObjectId::generate();
    let harness = Harness::new(worn_tree(hat_prim));

    // the hat itself asks to be detached
    assert!(harness.run("@detach=force", hat_prim).await);
    let detaches = harness.actions.detaches();
    assert_eq!(detaches[0].len(), 1);
}

// ===== restrictions, clear, notifications =====

#[tokio::test]
async fn test_restriction_install_and_remove_round_trip() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();

    assert!(harness.run("@fly=n", collar).await);
    assert!(harness.engine.store().contains(&RlvBehavior::Fly));

    assert!(harness.run("@fly=y", collar).await);
    assert!(!harness.engine.store().contains(&RlvBehavior::Fly));
}

#[tokio::test]
async fn test_multi_command_line_is_not_short_circuited() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();

    assert!(!harness.run("@fly=n,frobnicate=n,tploc=n", collar).await);
    assert!(harness.engine.store().contains(&RlvBehavior::Fly));
    assert!(harness.engine.store().contains(&RlvBehavior::TpLoc));
}

#[tokio::test]
async fn test_clear_with_substring_filter() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();
    let cuffs = ObjectId::generate();

    assert!(harness.run("@fly=n,tploc=n,tplm=n", collar).await);
    assert!(harness.run("@fly=n", cuffs).await);

    assert!(harness.run("@clear=tp", collar).await);
    assert!(!harness.engine.store().contains(&RlvBehavior::TpLoc));
    assert!(!harness.engine.store().contains(&RlvBehavior::TpLm));
    assert_eq!(harness.engine.store().get(&RlvBehavior::Fly).len(), 2);

    assert!(harness.run("@clear", collar).await);
    assert_eq!(harness.engine.store().get(&RlvBehavior::Fly).len(), 1);
}

#[tokio::test]
async fn test_notify_fanout_on_restriction_changes() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();

    assert!(harness.run("@notify:1234;fly=add", collar).await);
    assert!(harness.run("@fly=n", collar).await);
    assert!(harness.run("@tploc=n", collar).await);
    assert!(harness.run("@fly=y", collar).await);

    // the registration's own install matches its filter, so it is the
    // first delivery; tploc never matches
    let replies = harness.transport.replies();
    let to_1234: Vec<&str> = replies
        .iter()
        .filter(|(ch, _)| *ch == 1234)
        .map(|(_, text)| text.as_str())
        .collect();
    assert_eq!(to_1234, vec!["/notify:1234;fly=n", "/fly=n", "/fly=y"]);
}

#[tokio::test]
async fn test_report_api_routes_through_notify_filters() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();

    assert!(harness.run("@notify:7777;worn=add", collar).await);
    harness
        .engine
        .report_worn_item_change(WearableType::Shirt, true)
        .await;
    harness.engine.report_unsit().await;

    let replies = harness.transport.replies();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], (7777, "/notify:7777;worn=n".to_string()));
    assert_eq!(replies[1], (7777, "worn legally shirt".to_string()));
}

// ===== blacklist =====

#[tokio::test]
async fn test_blacklisted_restriction_fails_and_query_echoes_empty() {
    let options = EngineOptions::builder().blacklist("sendim").build();
    let harness = Harness::with_options(sample_tree(), options);
    let collar = ObjectId::generate();

    assert!(!harness.run("@sendim=n", collar).await);
    assert!(!harness.engine.store().contains(&RlvBehavior::SendIm));

    // a channel param still gets an empty echo so the script can proceed
    assert!(!harness.run("@sendim=2222", collar).await);
    assert_eq!(harness.transport.replies(), vec![(2222, String::new())]);
}

#[tokio::test]
async fn test_blacklist_queries_stay_reachable() {
    let options = EngineOptions::builder().blacklist("sendim").build();
    let harness = Harness::with_options(sample_tree(), options);
    let collar = ObjectId::generate();

    assert!(harness.run("@versionnum=2222", collar).await);
    assert!(harness.run("@getblacklist=2222", collar).await);
    assert!(harness.run("@versionnumbl=2222", collar).await);

    let replies = harness.transport.replies();
    assert_eq!(replies[0], (2222, "3040300".to_string()));
    assert_eq!(replies[1], (2222, "sendim".to_string()));
    assert_eq!(replies[2], (2222, "3040300,sendim".to_string()));
}

// ===== queries =====

#[tokio::test]
async fn test_getstatus_uses_separator_and_sender_scope() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();
    let cuffs = ObjectId::generate();

    assert!(harness.run("@fly=n,tploc=n", collar).await);
    assert!(harness.run("@sendim=n", cuffs).await);

    assert!(harness.run("@getstatus=2222", collar).await);
    assert!(harness.run("@getstatus:tp;|=2222", collar).await);
    assert!(harness.run("@getstatusall=2222", collar).await);

    let replies = harness.transport.replies();
    assert_eq!(replies[0], (2222, "/fly/tploc".to_string()));
    assert_eq!(replies[1], (2222, "|tploc".to_string()));
    assert_eq!(replies[2], (2222, "/fly/sendim/tploc".to_string()));
}

#[tokio::test]
async fn test_getoutfit_digit_string() {
    let hat_prim = ObjectId::generate();
    let harness = Harness::new(worn_tree(hat_prim));
    let collar = ObjectId::generate();

    assert!(harness.run("@getoutfit=2222", collar).await);
    assert!(harness.run("@getoutfit:pants=2222", collar).await);
    assert!(harness.run("@getoutfit:gloves=2222", collar).await);

    let replies = harness.transport.replies();
    // pants at digit 2, shirt at digit 3
    assert_eq!(replies[0], (2222, "0011000000000000".to_string()));
    assert_eq!(replies[1], (2222, "1".to_string()));
    assert_eq!(replies[2], (2222, "0".to_string()));
}

#[tokio::test]
async fn test_getattach_marks_occupied_points() {
    let hat_prim = ObjectId::generate();
    let harness = Harness::new(worn_tree(hat_prim));
    let collar = ObjectId::generate();

    assert!(harness.run("@getattach:skull=2222", collar).await);
    assert!(harness.run("@getattach=2222", collar).await);

    let replies = harness.transport.replies();
    assert_eq!(replies[0], (2222, "1".to_string()));
    let full = &replies[1].1;
    assert_eq!(full.len(), AttachmentPoint::ALL.len());
    assert_eq!(
        full.chars().nth(AttachmentPoint::Skull.index()),
        Some('1')
    );
    assert_eq!(full.chars().filter(|c| *c == '1').count(), 1);
}

#[tokio::test]
async fn test_getinvworn_digit_pairs() {
    let hat_prim = ObjectId::generate();
    let harness = Harness::new(worn_tree(hat_prim));
    let collar = ObjectId::generate();

    assert!(harness.run("@getinvworn:Clothing=2222", collar).await);

    // directly: 3 items, 2 worn -> 2; recursively: 5 items, 3 worn -> 2
    // Hats directly: 2 items, 1 worn -> 2; recursively the same
    let replies = harness.transport.replies();
    assert_eq!(replies[0], (2222, "|22,Hats|22".to_string()));
}

#[tokio::test]
async fn test_getinvworn_all_and_none_digits() {
    let tree = folder("#RLV").with_folder(
        folder("Outfits")
            .with_folder(folder("Work").with_item(item("Blazer").worn(WearableType::Jacket)))
            .with_folder(folder("Beach").with_item(item("Sandals")))
            .with_folder(folder("Empty")),
    );
    let harness = Harness::new(tree);
    let collar = ObjectId::generate();

    assert!(harness.run("@getinvworn:Outfits=2222", collar).await);
    let replies = harness.transport.replies();
    assert_eq!(
        replies[0],
        (2222, "|02,Work|33,Beach|11,Empty|00".to_string())
    );
}

#[tokio::test]
async fn test_getpath_resolves_the_sender_object() {
    let hat_prim = ObjectId::generate();
    let harness = Harness::new(worn_tree(hat_prim));

    assert!(harness.run("@getpath=2222", hat_prim).await);
    assert!(harness.run("@getpathnew:skull=2222", hat_prim).await);

    let replies = harness.transport.replies();
    assert_eq!(replies[0], (2222, "Clothing/Hats".to_string()));
    assert_eq!(replies[1], (2222, "Clothing/Hats".to_string()));
}

#[tokio::test]
async fn test_findfolder_matches_all_parts() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();

    assert!(harness.run("@findfolder:cloth&&hats=2222", collar).await);
    assert!(harness.run("@findfolders:s=2222", collar).await);

    let replies = harness.transport.replies();
    assert_eq!(replies[0], (2222, "Clothing/Hats".to_string()));
    assert_eq!(
        replies[1],
        (2222, "Clothing/Hats,Accessories".to_string())
    );
}

#[tokio::test]
async fn test_getcam_prefers_restriction_over_world_value() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();

    assert!(harness.run("@getcam_avdistmax=2222", collar).await);
    assert!(harness.run("@setcam_avdistmax:3.5=n", collar).await);
    assert!(harness.run("@getcam_avdistmax=2222", collar).await);

    let replies = harness.transport.replies();
    assert_eq!(replies[0], (2222, "1.000000".to_string()));
    assert_eq!(replies[1], (2222, "3.500000".to_string()));
}

// ===== forced movement =====

#[tokio::test]
async fn test_forced_sit_respects_sit_restriction() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();
    let bench = Uuid::new_v4();

    assert!(harness.run(&format!("@sit:{bench}=force"), collar).await);
    assert_eq!(harness.actions.sits().len(), 1);

    assert!(harness.run("@sit=n", collar).await);
    assert!(!harness.run(&format!("@sit:{bench}=force"), collar).await);
    assert_eq!(harness.actions.sits().len(), 1);
}

#[tokio::test]
async fn test_forced_unsit_stands_a_seated_avatar() {
    let bench = ObjectId::generate();
    let harness = Harness::seated_on(sample_tree(), bench);
    let collar = ObjectId::generate();

    assert!(harness.run("@unsit=force", collar).await);
    assert_eq!(harness.actions.unsits(), 1);
}

#[tokio::test]
async fn test_forced_unsit_is_ignored_while_standing() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();

    assert!(harness.run("@unsit=force", collar).await);
    assert_eq!(harness.actions.unsits(), 0);
}

#[tokio::test]
async fn test_forced_teleport_parses_destination() {
    let harness = Harness::new(sample_tree());
    let collar = ObjectId::generate();

    assert!(harness.run("@tpto:Sandbox/12/34/56=force", collar).await);
    let teleports = harness.actions.teleports.lock().unwrap().clone();
    assert_eq!(teleports.len(), 1);
    assert_eq!(teleports[0].region.as_deref(), Some("Sandbox"));

    assert!(harness.run("@tploc=n", collar).await);
    assert!(!harness.run("@tpto:12/34/56=force", collar).await);
    assert_eq!(harness.actions.teleports.lock().unwrap().len(), 1);
}
