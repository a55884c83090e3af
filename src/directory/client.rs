use async_trait::async_trait;
use dmr_schema::{Device, StaticTalkgroup, TalkgroupEntry, flatten_talkgroup_directory};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use super::DirectoryApi;
use crate::config::DirectoryConfig;
use crate::error::DirectoryError;
use crate::utils::logging::{body_preview, with_pretty_json_debug};

const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;

/// HTTP client for the BrandMeister v2 REST API. No credentials are sent.
#[derive(Debug, Clone)]
pub struct BrandmeisterClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BrandmeisterClient {
    pub fn new(cfg: &DirectoryConfig) -> Result<Self, DirectoryError> {
        if cfg.base_url.cannot_be_a_base() {
            return Err(DirectoryError::InvalidBaseUrl(cfg.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout())
            .default_headers(headers);

        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: cfg.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DirectoryError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, DirectoryError> {
        debug!(url = %url, "directory request");

        let resp = self.http.get(url.clone()).query(query).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let body = body_preview(&bytes, UPSTREAM_BODY_PREVIEW_CHARS);
            warn!(url = %url, status = %status, body = %body, "directory returned an error status");
            return Err(DirectoryError::UpstreamStatus { status, body });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DirectoryApi for BrandmeisterClient {
    async fn list_talkgroups(&self) -> Result<Vec<TalkgroupEntry>, DirectoryError> {
        let raw: Map<String, Value> = self.get_json(self.endpoint(&["talkgroup"])?, &[]).await?;
        let (entries, skipped) = flatten_talkgroup_directory(raw);
        if !skipped.is_empty() {
            warn!(count = skipped.len(), keys = ?skipped, "skipping non-numeric talkgroup ids");
        }
        debug!(count = entries.len(), "fetched talkgroup directory");
        Ok(entries)
    }

    async fn get_device(&self, id: i64) -> Result<Device, DirectoryError> {
        let id = id.to_string();
        let device: Device = self.get_json(self.endpoint(&["device", &id])?, &[]).await?;
        with_pretty_json_debug(&device, |pretty| {
            debug!(device.id = device.id, body = %pretty, "fetched device");
        });
        Ok(device)
    }

    async fn get_device_profile(&self, id: i64) -> Result<Value, DirectoryError> {
        let id = id.to_string();
        self.get_json(self.endpoint(&["device", &id, "profile"])?, &[])
            .await
    }

    async fn get_device_talkgroups(&self, id: i64) -> Result<Vec<StaticTalkgroup>, DirectoryError> {
        let id = id.to_string();
        let assignments: Vec<StaticTalkgroup> = self
            .get_json(self.endpoint(&["device", &id, "talkgroup"])?, &[])
            .await?;
        debug!(device.id = %id, count = assignments.len(), "fetched static talkgroups");
        Ok(assignments)
    }

    async fn search_by_callsign(&self, callsign: &str) -> Result<Vec<Device>, DirectoryError> {
        self.get_json(
            self.endpoint(&["device", "byCall"])?,
            &[("callsign", callsign)],
        )
        .await
    }

    async fn list_repeaters(&self) -> Result<Vec<Device>, DirectoryError> {
        let devices: Vec<Device> = self
            .get_json(self.endpoint(&["device"])?, &[("repeater", "true")])
            .await?;
        debug!(count = devices.len(), "fetched repeater list");
        Ok(devices)
    }
}
