//! HTTP client for a single CDM node.
//!
//! # Responsibilities
//! - Build endpoint URLs (`{scheme}://{address}/api/{version}{endpoint}`)
//! - Attach credentials and a user agent
//! - Enforce the per-request timeout and the caller's cancel token
//! - Map non-success statuses and undecodable bodies to [`ClientError`]

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::types::{ApiVersion, ClientError, ClientResult, Credentials};
use crate::config::NodeConfig;
use crate::resilience::timeouts;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// REST client for one node.
#[derive(Clone)]
pub struct CdmClient {
    http: reqwest::Client,
    /// `{scheme}://{address}/api/`
    base_url: Url,
    credentials: Option<Credentials>,
    request_timeout: Duration,
}

impl CdmClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `node` - Node connection settings
    /// * `credentials` - Optional credentials; bootstrap endpoints work without
    pub fn new(node: &NodeConfig, credentials: Option<Credentials>) -> ClientResult<Self> {
        let address = node.address.trim().trim_end_matches('/');
        let raw = format!("{}://{}/api/", node.scheme, address);
        if address.is_empty() {
            return Err(ClientError::InvalidUrl {
                url: raw,
                reason: "missing host".to_string(),
            });
        }
        let base_url = Url::parse(&raw).map_err(|e| ClientError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if base_url.host_str().map_or(true, str::is_empty) {
            return Err(ClientError::InvalidUrl {
                url: raw,
                reason: "missing host".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(node.allow_insecure_tls)
            .user_agent(USER_AGENT)
            .build()?;

        tracing::debug!(
            base_url = %base_url,
            insecure_tls = node.allow_insecure_tls,
            authenticated = credentials.is_some(),
            "Node client initialized"
        );

        Ok(Self {
            http,
            base_url,
            credentials,
            request_timeout: node.request_timeout(),
        })
    }

    /// Host name or IP of the node.
    pub fn node(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }

    /// Full URL for an endpoint.
    pub fn endpoint_url(&self, version: ApiVersion, endpoint: &str) -> ClientResult<Url> {
        let path = format!("{}/{}", version.as_str(), endpoint.trim_start_matches('/'));
        self.base_url.join(&path).map_err(|e| ClientError::InvalidUrl {
            url: format!("{}{}", self.base_url, path),
            reason: e.to_string(),
        })
    }

    /// GET an endpoint and decode the JSON response.
    pub async fn get<T>(
        &self,
        cancel: &CancellationToken,
        version: ApiVersion,
        endpoint: &str,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let body = self.execute(cancel, Method::GET, version, endpoint, None::<&()>).await?;
        decode(&body)
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post<B, T>(
        &self,
        cancel: &CancellationToken,
        version: ApiVersion,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.execute(cancel, Method::POST, version, endpoint, Some(body)).await?;
        decode(&body)
    }

    /// PATCH a JSON body and decode the JSON response.
    pub async fn patch<B, T>(
        &self,
        cancel: &CancellationToken,
        version: ApiVersion,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.execute(cancel, Method::PATCH, version, endpoint, Some(body)).await?;
        decode(&body)
    }

    /// DELETE an endpoint, discarding any response body.
    pub async fn delete(
        &self,
        cancel: &CancellationToken,
        version: ApiVersion,
        endpoint: &str,
    ) -> ClientResult<()> {
        self.execute(cancel, Method::DELETE, version, endpoint, None::<&()>)
            .await
            .map(|_| ())
    }

    async fn execute<B>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        version: ApiVersion,
        endpoint: &str,
        body: Option<&B>,
    ) -> ClientResult<String>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(version, endpoint)?;
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = self.authorize(request);

        let res = timeouts::bounded(cancel, self.request_timeout, async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            if !status.is_success() {
                return Err(ClientError::Status {
                    code: status.as_u16(),
                    body: text,
                });
            }
            Ok(text)
        })
        .await;

        if let Err(e) = &res {
            tracing::trace!(method = %method, url = %url, error = %e, "Request failed");
        }
        res
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(Credentials::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            Some(Credentials::Token(token)) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> ClientResult<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    Ok(serde_json::from_str(body)?)
}
