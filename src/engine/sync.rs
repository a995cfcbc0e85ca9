// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};

use crate::error::{GatewayError, SyncError};
use crate::gateway::Gateway;
use crate::model::{Device, Episode, EpisodeStatus, Subscription, UpdateBatch};

use super::SyncEngine;

impl<G: Gateway> SyncEngine<G> {
    /// Replace the device set with the catalog's current full list.
    ///
    /// Every held device is announced as removed (in held order), then every
    /// fresh device as added. The previous selection is re-resolved against
    /// the new set; `device_selected` fires only when the resolution
    /// actually changes, which here means the selected device vanished. The
    /// update cursor is not touched.
    pub async fn fetch_devices(&mut self) -> Result<(), SyncError> {
        let identity = self.identity.as_ref().ok_or(SyncError::Unauthenticated)?;

        let body = self.gateway.device_list(identity).await?;
        let fresh: Vec<Device> = serde_json::from_str(&body).map_err(GatewayError::Malformed)?;

        let held = std::mem::take(&mut self.devices);
        for device in &held {
            self.notifier.emit_device_removed(device);
        }

        for device in fresh {
            self.notifier.emit_device_added(&device);
            self.devices.push(device);
        }

        if let Some(previous) = self.selected.take() {
            let resolved = self
                .devices
                .iter()
                .find(|device| device.id == previous.id)
                .cloned();
            let vanished = resolved.is_none();
            self.selected = resolved;
            if vanished {
                self.notifier.emit_device_selected(&self.selected);
            }
        }

        self.notifier.emit_log(&format!(
            "device list refreshed: {} devices",
            self.devices.len()
        ));
        Ok(())
    }

    /// Fetch and apply the incremental changes for the selected device.
    ///
    /// The update cursor advances, and is announced, before any entity
    /// diffing. That means listeners observe the new cursor even if a later
    /// listener misbehaves mid-batch; replaying the same batch is tolerated
    /// by every apply step being idempotent. Remote and parse failures
    /// happen before the advance and leave all state untouched.
    pub async fn sync(&mut self) -> Result<(), SyncError> {
        let identity = self.identity.as_ref().ok_or(SyncError::Unauthenticated)?;
        let device_id = self
            .selected
            .as_ref()
            .map(|device| device.id.clone())
            .ok_or(SyncError::NoDeviceSelected)?;

        let started = Utc::now();

        let body = self
            .gateway
            .updates(identity, &device_id, self.watermark)
            .await?;
        let batch: UpdateBatch = serde_json::from_str(&body).map_err(GatewayError::Malformed)?;

        let UpdateBatch {
            add,
            remove,
            updates,
            timestamp,
        } = batch;

        self.notifier.emit_log(&format!(
            "[{}ms] update batch parsed: {} additions, {} removals, {} episode updates",
            elapsed_ms(started),
            add.len(),
            remove.len(),
            updates.len()
        ));

        // The cursor never regresses; a replayed or out-of-order batch
        // leaves it alone
        if timestamp > self.watermark {
            self.watermark = timestamp;
            self.notifier.emit_watermark(self.watermark);
        }

        self.apply_subscription_additions(add);
        self.apply_subscription_removals(&remove);
        self.notifier.emit_log(&format!(
            "[{}ms] subscriptions reconciled",
            elapsed_ms(started)
        ));

        self.apply_episode_updates(updates);
        self.notifier.emit_log(&format!(
            "[{}ms] episodes reconciled",
            elapsed_ms(started)
        ));

        self.notifier
            .emit_log(&format!("[{}ms] sync complete", elapsed_ms(started)));
        Ok(())
    }

    /// Report one episode state change back to the catalog.
    ///
    /// One-way push: the remote service is the system of record for this,
    /// so no local state changes and no notifications fire. The change
    /// comes back through a later `sync`.
    pub async fn push_update(&self, episode: &Episode) -> Result<(), SyncError> {
        let identity = self.identity.as_ref().ok_or(SyncError::Unauthenticated)?;
        self.gateway.push_episode(identity, episode).await?;
        Ok(())
    }

    fn apply_subscription_additions(&mut self, additions: Vec<Subscription>) {
        for subscription in additions {
            if self
                .subscriptions
                .iter()
                .any(|held| held.title == subscription.title)
            {
                continue;
            }

            // Episodes retained before their subscription arrived become
            // visible the moment the title resolves
            let linked: Vec<Episode> = self
                .episodes
                .iter()
                .filter(|episode| episode.podcast_title == subscription.title)
                .cloned()
                .collect();
            self.shows.insert(subscription.title.clone(), linked);

            self.notifier.emit_subscription_added(&subscription);
            self.subscriptions.push(subscription);
        }
    }

    fn apply_subscription_removals(&mut self, removals: &[String]) {
        for reference in removals {
            let Some(position) = self
                .subscriptions
                .iter()
                .position(|held| &held.title == reference)
            else {
                // Unknown references are not an error
                continue;
            };

            self.remove_linked_episodes(reference);
            self.shows.remove(reference);

            let subscription = self.subscriptions.remove(position);
            self.notifier.emit_subscription_removed(&subscription);
        }
    }

    /// Cascade: drop every episode linked to the title, announcing the
    /// shrinking set once per removed episode
    fn remove_linked_episodes(&mut self, title: &str) {
        loop {
            let Some(position) = self
                .episodes
                .iter()
                .position(|episode| episode.podcast_title == title)
            else {
                break;
            };

            self.episodes.remove(position);
            self.notifier.emit_episodes_removed(&self.episodes);
        }
    }

    fn apply_episode_updates(&mut self, updates: Vec<Episode>) {
        let now = Utc::now();
        let mut removals: Vec<Episode> = Vec::new();
        let mut upserts: Vec<Episode> = Vec::new();

        for episode in updates {
            if self.is_discardable(&episode, now) {
                continue;
            }

            match episode.status {
                EpisodeStatus::Delete => removals.push(episode),
                EpisodeStatus::New | EpisodeStatus::Play | EpisodeStatus::Download => {
                    upserts.push(episode)
                }
            }
        }

        if self.apply_episode_removals(&removals) {
            self.notifier.emit_episodes_removed(&self.episodes);
        }

        if self.apply_episode_upserts(upserts) {
            self.notifier.emit_episodes_added(&self.episodes);
        }
    }

    /// The catalog delivers junk on occasion: episodes with no title, no
    /// url, or no usable release timestamp are unusable, and anything
    /// released beyond the staleness horizon is noise. None of it reaches
    /// the collections or the bus.
    fn is_discardable(&self, episode: &Episode, now: DateTime<Utc>) -> bool {
        if episode.title.is_empty() || episode.url.is_none() {
            return true;
        }

        match episode.released {
            Some(released) => now - released > self.options.staleness,
            None => true,
        }
    }

    /// Returns true when at least one removal actually landed
    fn apply_episode_removals(&mut self, removals: &[Episode]) -> bool {
        let mut landed = false;

        for removal in removals {
            let Some(position) = self
                .episodes
                .iter()
                .position(|held| held.url == removal.url)
            else {
                continue;
            };

            let held = self.episodes.remove(position);
            if let Some(linked) = self.shows.get_mut(&held.podcast_title) {
                linked.retain(|episode| episode.url != held.url);
            }
            landed = true;
        }

        landed
    }

    /// Returns true when the bucket was non-empty
    fn apply_episode_upserts(&mut self, upserts: Vec<Episode>) -> bool {
        if upserts.is_empty() {
            return false;
        }

        for episode in upserts {
            // A refresh may move an episode to another subscription; the
            // former title's index entry must not keep the stale copy
            if let Some(held) = self.episodes.iter().find(|held| held.url == episode.url)
                && held.podcast_title != episode.podcast_title
                && let Some(previous) = self.shows.get_mut(&held.podcast_title)
            {
                previous.retain(|linked| linked.url != episode.url);
            }

            // Index entries exist only for held subscriptions; unparented
            // episodes stay flat-only until their subscription shows up
            if let Some(linked) = self.shows.get_mut(&episode.podcast_title) {
                match linked.iter_mut().find(|held| held.url == episode.url) {
                    Some(held) => *held = episode.clone(),
                    None => linked.push(episode.clone()),
                }
            }

            match self.episodes.iter_mut().find(|held| held.url == episode.url) {
                Some(held) => *held = episode,
                None => self.episodes.push(episode),
            }
        }

        true
    }
}

fn elapsed_ms(started: DateTime<Utc>) -> i64 {
    (Utc::now() - started).num_milliseconds()
}
