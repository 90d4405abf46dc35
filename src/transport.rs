//! HTTP transport shared by every role client.
//!
//! Each call builds its request eagerly and hands back a boxed future that
//! owns everything it needs; dropping the future abandons the result but not
//! a request that has already left.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::ApiError;
use crate::types::{ApiResponse, SUCCESS_CODE};
use crate::validate::Validate;

pub type ApiRequest<T> = BoxFuture<'static, Result<T, ApiError>>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8888/api";

/// Max size of a response payload. Reading stops as soon as it is exceeded.
const PAYLOAD_LIMIT: usize = 64 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Transport {
    client: Client,
    base: Url,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(config.base_url.to_string()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(target: "api", %method, %url, "preparing request");
        Ok(self.client.request(method, url))
    }

    pub fn get<R>(&self, segments: &[&str]) -> ApiRequest<R>
    where
        R: DeserializeOwned + Validate + Send + 'static,
    {
        dispatch(self.request(Method::GET, segments))
    }

    pub fn get_with_query<Q, R>(&self, segments: &[&str], query: &Q) -> ApiRequest<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned + Validate + Send + 'static,
    {
        let request = self.request(Method::GET, segments).map(|r| r.query(query));
        dispatch(request)
    }

    pub fn post_json<B, R>(&self, segments: &[&str], body: &B) -> ApiRequest<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Validate + Send + 'static,
    {
        let request = self.request(Method::POST, segments).map(|r| r.json(body));
        dispatch(request)
    }

    pub fn post_empty<R>(&self, segments: &[&str]) -> ApiRequest<R>
    where
        R: DeserializeOwned + Validate + Send + 'static,
    {
        dispatch(self.request(Method::POST, segments))
    }

    pub fn post_multipart<R>(&self, segments: &[&str], form: Form) -> ApiRequest<R>
    where
        R: DeserializeOwned + Validate + Send + 'static,
    {
        let request = self.request(Method::POST, segments).map(|r| r.multipart(form));
        dispatch(request)
    }
}

fn dispatch<R>(request: Result<RequestBuilder, ApiError>) -> ApiRequest<R>
where
    R: DeserializeOwned + Validate + Send + 'static,
{
    async move {
        let response = request?.send().await.map_err(|err| {
            tracing::warn!(target: "api", ?err, "request failed");
            ApiError::Transport(err)
        })?;
        unwrap_response(response).await
    }
    .boxed()
}

fn oversized(len: u64, limit: usize) -> ApiError {
    ApiError::InvalidResponse(format!("payload of {len} bytes exceeds limit of {limit} bytes"))
}

/// Buffers the body, giving up once more than `limit` bytes arrived.
async fn read_limited(mut response: Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(oversized(len, limit));
        }
    }
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() > limit {
            return Err(oversized(body.len() as u64, limit));
        }
    }
    Ok(body)
}

async fn unwrap_response<R>(response: Response) -> Result<R, ApiError>
where
    R: DeserializeOwned + Validate,
{
    let status = response.status();
    let url = response.url().clone();
    let bytes = read_limited(response, PAYLOAD_LIMIT).await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ApiResponse<Option<serde_json::Value>>>(&bytes)
            .map(|envelope| envelope.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
        tracing::warn!(target: "api", %url, %status, %message, "backend rejected request");
        return Err(ApiError::Status { status, message });
    }

    let envelope: ApiResponse<Option<serde_json::Value>> = serde_json::from_slice(&bytes)?;
    if envelope.code != SUCCESS_CODE {
        tracing::warn!(
            target: "api",
            %url,
            code = envelope.code,
            message = %envelope.message,
            "backend reported failure"
        );
        return Err(ApiError::Backend {
            code: envelope.code,
            message: envelope.message,
        });
    }

    let data = envelope.data.unwrap_or(serde_json::Value::Null);
    let value: R = serde_json::from_value(data)?;
    value.validate()?;
    tracing::debug!(target: "api", %url, "request succeeded");
    Ok(value)
}
