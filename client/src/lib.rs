//! HTTP client for the Slate projects backend.
//!
//! # Architecture
//!
//! - [`ApiClient`] - untyped JSON `get`/`post`/`delete` against a base URL,
//!   attaching the bearer credential when one is supplied
//! - [`ProjectsApi`] - typed project endpoints that unwrap the backend's
//!   `{ "data": ... }` envelope
//!
//! # Error Handling
//!
//! Every failure is a [`ClientError`]. Any non-2xx response becomes
//! [`ClientError::RequestFailed`] regardless of status class; nothing is
//! retried. Callers decide how failures surface to the user.

mod projects;

pub use projects::{Envelope, PROJECTS_PATH, ProjectsApi};

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

pub use slate_types;
use slate_types::Credential;

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 8;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("invalid request path '{path}'")]
    InvalidPath { path: String },
    #[error("API error: {status}")]
    RequestFailed { status: StatusCode, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// HTTP status for `RequestFailed`, `None` for everything else.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Process-wide connection pool shared by every [`ApiClient`].
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("Failed to build HTTP client: {e}. Falling back to defaults.");
            reqwest::Client::new()
        })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("slate/", env!("CARGO_PKG_VERSION"))),
    );

    // No overall request timeout: a hung request keeps its indicator up until
    // the caller aborts it.
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

/// JSON client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_http(http_client().clone(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|source| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http,
            base: trimmed.to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Resolve `path` against the base URL, keeping any path prefix the base carries.
    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        let joined = if path.starts_with('/') {
            format!("{}{path}", self.base)
        } else {
            format!("{}/{path}", self.base)
        };
        Url::parse(&joined).map_err(|_| ClientError::InvalidPath {
            path: path.to_string(),
        })
    }

    pub async fn get<T>(&self, path: &str, credential: Option<&Credential>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        self.send::<(), T>(Method::GET, url, None, credential).await
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        payload: &B,
        credential: Option<&Credential>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        self.send(Method::POST, url, Some(payload), credential)
            .await
    }

    pub async fn delete<T>(
        &self,
        path: &str,
        credential: Option<&Credential>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        self.delete_url(url, credential).await
    }

    pub(crate) async fn delete_url<T>(
        &self,
        url: Url,
        credential: Option<&Credential>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        self.send::<(), T>(Method::DELETE, url, None, credential)
            .await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        url: Url,
        payload: Option<&B>,
        credential: Option<&Credential>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.request(method.clone(), url.clone());

        if let Some(credential) = credential {
            request = request.header(AUTHORIZATION, credential.bearer());
        }
        if let Some(payload) = payload {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .json(payload);
        }

        let response = request.send().await.map_err(|err| {
            tracing::warn!(%method, path = url.path(), "Request failed to send: {err}");
            ClientError::Transport(err)
        })?;

        let status = response.status();
        tracing::debug!(%method, path = url.path(), %status, "API response");

        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            return Err(ClientError::RequestFailed { status, body });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ClientError::Decode)
    }
}

/// Read at most `MAX_ERROR_BODY_BYTES` of an error response for diagnostics.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
