// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::GatewayError;
use crate::identity::Identity;
use crate::model::Episode;

/// Root of the public catalog service
pub const DEFAULT_BASE_URL: &str = "https://gpodder.net/";

/// Transport seam between the engine and the catalog service.
///
/// Implementations attach authentication and move bytes; they never
/// interpret payload structure, retry, or keep state. Fetches return the
/// raw response text for the engine to parse.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch the raw device list JSON for the account
    async fn device_list(&self, identity: &Identity) -> Result<String, GatewayError>;

    /// Fetch the raw incremental update JSON for a device, starting at the
    /// given cursor
    async fn updates(
        &self,
        identity: &Identity,
        device_id: &str,
        since: i64,
    ) -> Result<String, GatewayError>;

    /// Submit one episode state change
    async fn push_episode(
        &self,
        identity: &Identity,
        episode: &Episode,
    ) -> Result<(), GatewayError>;
}

/// Default gateway implementation using reqwest
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base: Url,
}

impl HttpGateway {
    /// Create a gateway against the given service root
    pub fn new(base: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base)
    }

    /// Create a gateway with a custom reqwest::Client
    pub fn with_client(client: reqwest::Client, mut base: Url) -> Self {
        // Url::join drops the last segment of a base path that lacks a
        // trailing slash; a path-prefixed server root must keep its prefix
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Self { client, base }
    }

    fn device_list_url(&self, username: &str) -> Result<Url, GatewayError> {
        Ok(self
            .base
            .join(&format!("api/2/devices/{}.json", username))?)
    }

    fn updates_url(&self, username: &str, device_id: &str, since: i64) -> Result<Url, GatewayError> {
        let mut url = self
            .base
            .join(&format!("api/2/updates/{}/{}.json", username, device_id))?;
        url.set_query(Some(&format!("since={}&include_actions=true", since)));
        Ok(url)
    }

    fn episodes_url(&self, username: &str) -> Result<Url, GatewayError> {
        Ok(self
            .base
            .join(&format!("api/2/episodes/{}.json", username))?)
    }

    async fn get_text(&self, identity: &Identity, url: Url) -> Result<String, GatewayError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .basic_auth(identity.username(), Some(identity.secret()))
            .send()
            .await
            .map_err(|e| GatewayError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| GatewayError::Request {
            url: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn device_list(&self, identity: &Identity) -> Result<String, GatewayError> {
        let url = self.device_list_url(identity.username())?;
        self.get_text(identity, url).await
    }

    async fn updates(
        &self,
        identity: &Identity,
        device_id: &str,
        since: i64,
    ) -> Result<String, GatewayError> {
        let url = self.updates_url(identity.username(), device_id, since)?;
        self.get_text(identity, url).await
    }

    async fn push_episode(
        &self,
        identity: &Identity,
        episode: &Episode,
    ) -> Result<(), GatewayError> {
        let url = self.episodes_url(identity.username())?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url.clone())
            .basic_auth(identity.username(), Some(identity.secret()))
            .json(episode)
            .send()
            .await
            .map_err(|e| GatewayError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
