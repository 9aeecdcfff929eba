use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_GET_PATH: &str = "/v1/config/get";
pub const DEFAULT_UPDATE_PATH: &str = "/v1/config/update";

/// Client for the get/update endpoints of a config-cache server.
///
/// The underlying [`reqwest::Client`] is supplied by the caller, so pooling,
/// timeouts and proxies are configured where the client is owned.
#[derive(Debug, Clone)]
pub struct ConfigClient {
    client: Client,
    host: Url,
    get_path: String,
    update_path: String,
}

impl ConfigClient {
    pub fn new(client: Client, host: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client,
            host: Url::parse(host)?,
            get_path: DEFAULT_GET_PATH.to_string(),
            update_path: DEFAULT_UPDATE_PATH.to_string(),
        })
    }

    /// Override the endpoint paths.
    pub fn with_paths(mut self, get_path: impl Into<String>, update_path: impl Into<String>) -> Self {
        self.get_path = get_path.into();
        self.update_path = update_path.into();
        self
    }

    /// Fetch the raw document for `name`.
    pub async fn get(&self, name: &str) -> Result<Bytes, ClientError> {
        self.get_with(name, |req| req).await
    }

    /// [`get`](Self::get) with a hook to adjust the request (headers, auth).
    pub async fn get_with<F>(&self, name: &str, modify: F) -> Result<Bytes, ClientError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.endpoint(&self.get_path, name);
        let resp = modify(self.client.get(url)).send().await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if status != StatusCode::OK {
            return Err(ClientError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }

    /// Fetch and decode the document for `name`.
    pub async fn get_typed<T: DeserializeOwned>(&self, name: &str) -> Result<T, ClientError> {
        let data = self.get(name).await?;
        serde_json::from_slice(&data).map_err(|source| {
            let body = String::from_utf8_lossy(&data).into_owned();
            tracing::error!(config = %name, error = %source, body = %body, "Failed to decode config");
            ClientError::Decode { source, body }
        })
    }

    /// Replace the document for `name` with `data`.
    pub async fn update(&self, name: &str, data: impl Into<Vec<u8>>) -> Result<(), ClientError> {
        self.update_with(name, data, |req| req).await
    }

    pub async fn update_with<F>(
        &self,
        name: &str,
        data: impl Into<Vec<u8>>,
        modify: F,
    ) -> Result<(), ClientError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.endpoint(&self.update_path, name);
        let resp = modify(self.client.post(url).body(data.into())).send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(())
    }

    /// Encode `value` as JSON and store it as the document for `name`.
    pub async fn update_typed<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), ClientError> {
        let data = serde_json::to_vec(value).map_err(ClientError::Encode)?;
        self.update(name, data).await
    }

    /// `host` + `path` (appended, not replacing a host path prefix) + `?config=name`.
    fn endpoint(&self, path: &str, name: &str) -> Url {
        let mut url = self.host.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url.query_pairs_mut().append_pair("config", name);
        url
    }
}
