use std::collections::HashMap;

use chrono::TimeDelta;

use crate::gateway::Gateway;
use crate::identity::Identity;
use crate::model::{Device, Episode, Subscription};
use crate::notify::Notifier;
use crate::snapshot::Snapshot;

mod sync;

/// Tuning knobs for the reconciliation engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Incoming episodes released longer ago than this are discarded
    pub staleness: TimeDelta,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            staleness: TimeDelta::days(360),
        }
    }
}

/// Client-side replica of one account's subscription state.
///
/// Holds the authoritative in-memory collections, reconciles them against
/// the catalog through the [`Gateway`], and announces every change on the
/// [`Notifier`]. Mutating operations take `&mut self`; the engine expects a
/// single writer and does no locking of its own.
pub struct SyncEngine<G: Gateway> {
    gateway: G,
    identity: Option<Identity>,
    devices: Vec<Device>,
    selected: Option<Device>,
    subscriptions: Vec<Subscription>,
    episodes: Vec<Episode>,
    /// Subscription title to linked episodes. An entry exists exactly for
    /// the held subscriptions; episodes without a matching subscription
    /// live only in the flat collection.
    shows: HashMap<String, Vec<Episode>>,
    watermark: i64,
    notifier: Notifier,
    options: EngineOptions,
}

impl<G: Gateway> SyncEngine<G> {
    /// Create an engine with default options
    pub fn new(gateway: G) -> Self {
        Self::with_options(gateway, EngineOptions::default())
    }

    /// Create an engine with explicit options
    pub fn with_options(gateway: G, options: EngineOptions) -> Self {
        Self {
            gateway,
            identity: None,
            devices: Vec::new(),
            selected: None,
            subscriptions: Vec::new(),
            episodes: Vec::new(),
            shows: HashMap::new(),
            watermark: 0,
            notifier: Notifier::new(),
            options,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Look up a device by id
    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|device| device.id == id)
    }

    /// Ids of all known devices, in fetch order
    pub fn device_ids(&self) -> Vec<&str> {
        self.devices.iter().map(|device| device.id.as_str()).collect()
    }

    pub fn selected_device(&self) -> Option<&Device> {
        self.selected.as_ref()
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Episodes linked to the given subscription title.
    ///
    /// Returns the empty slice for titles without a held subscription,
    /// even when unparented episodes with that title exist in the flat
    /// collection.
    pub fn episodes_for(&self, title: &str) -> &[Episode] {
        self.shows.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Mutable notifier access for listener registration
    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Change which device incremental updates are fetched for.
    ///
    /// Selecting the currently selected device (by id) is a no-op. A real
    /// change announces the selection, then resets the update cursor to
    /// zero and announces that too; callers are expected to `sync`
    /// afterwards to repopulate against the new device.
    pub fn set_selected_device(&mut self, device: Option<Device>) {
        if self.selected == device {
            return;
        }

        self.selected = device;
        self.notifier.emit_device_selected(&self.selected);

        self.watermark = 0;
        self.notifier.emit_watermark(self.watermark);
    }

    /// Seed the engine from previously persisted state.
    ///
    /// Bulk-appends the collections and restores the cursor without firing
    /// any change notifications; the snapshot is already-persisted truth,
    /// not a change. A blank or unresolvable selected device id yields no
    /// selection.
    pub fn initialize(&mut self, snapshot: Snapshot) {
        let Snapshot {
            devices,
            selected_device_id,
            subscriptions,
            episodes,
            watermark,
        } = snapshot;

        self.notifier.emit_log(&format!(
            "restoring state: {} devices, {} subscriptions, {} episodes, watermark {}",
            devices.len(),
            subscriptions.len(),
            episodes.len(),
            watermark
        ));

        self.devices.extend(devices);
        self.subscriptions.extend(subscriptions);
        self.episodes.extend(episodes);
        self.watermark = watermark;

        self.selected = selected_device_id
            .filter(|id| !id.is_empty())
            .and_then(|id| self.devices.iter().find(|device| device.id == id).cloned());

        self.rebuild_shows();
    }

    /// Capture the current state for persistence
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            devices: self.devices.clone(),
            selected_device_id: self.selected.as_ref().map(|device| device.id.clone()),
            subscriptions: self.subscriptions.clone(),
            episodes: self.episodes.clone(),
            watermark: self.watermark,
        }
    }

    /// Rebuild the title index from the flat collections
    fn rebuild_shows(&mut self) {
        self.shows.clear();
        for subscription in &self.subscriptions {
            let linked = self
                .episodes
                .iter()
                .filter(|episode| episode.podcast_title == subscription.title)
                .cloned()
                .collect();
            self.shows.insert(subscription.title.clone(), linked);
        }
    }
}
