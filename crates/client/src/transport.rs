//! One HTTP round trip per call, normalized into [`ApiResponse`] or
//! [`ClientError`].
//!
//! The transport attaches the session's bearer token, insists on a JSON
//! response and maps error statuses into [`ClientError::Api`] with the
//! server's fields or their defaults. It never retries.

use std::sync::Arc;

use gearhub_core::ApiResponse;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, DEFAULT_API_MESSAGE};
use crate::session::SessionStore;

/// Query parameters as `(name, value)` pairs; absent filters are left out.
pub type Query = Vec<(&'static str, String)>;

/// Request payload.
#[derive(Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Form),
}

impl Body {
    /// JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Encode` if the value cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ClientError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| ClientError::Encode(e.to_string()))
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Json(_) => "json",
            Self::Multipart(_) => "multipart",
        }
    }
}

/// Envelope with every field optional, as error responses may be partial.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    success: Option<bool>,
    message: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
    code: Option<String>,
    origin_message: Option<String>,
}

/// HTTP transport bound to a base URL and a session.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    client: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl Transport {
    /// Create a transport for `config`, reading tokens from `session`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(TransportInner {
                client,
                base_url: config.base_url.clone(),
                session,
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Send a request and decode the envelope's `data` as `T`.
    ///
    /// # Errors
    ///
    /// - `ClientError::Network` if no response arrived
    /// - `ClientError::Protocol` if the response is not the JSON envelope
    /// - `ClientError::Api` for an error status or `success: false`
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Body,
    ) -> Result<ApiResponse<T>, ClientError> {
        let url = self.url(path, query)?;
        self.execute(method, url, body).await
    }

    /// GET a resource addressed by path segments; each segment is
    /// percent-encoded, so `/`, `?` and `#` inside one stay in it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn get_segments<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<ApiResponse<T>, ClientError> {
        let url = segments_url(&self.inner.base_url, segments)?;
        self.execute(Method::GET, url, Body::Empty).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Body,
    ) -> Result<ApiResponse<T>, ClientError> {
        let path = url.path().to_string();
        let body_kind = body.kind();

        let mut request = self.inner.client.request(method.clone(), url);
        if let Some(token) = self.inner.session.token().await {
            request = request.bearer_auth(token.expose_secret());
        }
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(&value),
            Body::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, %path, status = status.as_u16(), body = body_kind, "api round trip");

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
        let text = response.text().await?;

        decode(status, is_json, &text)
    }

    /// Send a request whose payload is not needed.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn send_unit(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<ApiResponse<()>, ClientError> {
        let response: ApiResponse<IgnoredAny> = self.send(method, path, &[], body).await?;
        Ok(response.map(|_| ()))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::GET, path, query, Body::Empty).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::POST, path, &[], Body::json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::PUT, path, &[], Body::json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse<()>, ClientError> {
        self.send_unit(Method::DELETE, path, Body::Empty).await
    }

    pub async fn multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::POST, path, &[], Body::Multipart(form)).await
    }

    fn url(&self, path: &str, query: &[(&'static str, String)]) -> Result<Url, ClientError> {
        build_url(&self.inner.base_url, path, query)
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Append `path` to the base URL's path, then add `query`.
fn build_url(base: &Url, path: &str, query: &[(&'static str, String)]) -> Result<Url, ClientError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined).map_err(|e| ClientError::Encode(e.to_string()))?;
    if !query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url)
}

/// Append percent-encoded `segments` to the base URL's path.
fn segments_url(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ClientError::Encode(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a raw response into an envelope or an error.
fn decode<T: DeserializeOwned>(
    status: StatusCode,
    is_json: bool,
    text: &str,
) -> Result<ApiResponse<T>, ClientError> {
    if !is_json {
        return Err(ClientError::non_json(status.as_u16(), text));
    }

    let raw: RawEnvelope =
        serde_json::from_str(text).map_err(|e| ClientError::malformed(status.as_u16(), &e))?;

    if !status.is_success() || raw.success == Some(false) {
        return Err(ClientError::Api {
            status: status.as_u16(),
            code: raw
                .code
                .unwrap_or_else(|| format!("E{}", status.as_u16())),
            message: raw
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_API_MESSAGE.to_string()),
            origin_message: raw
                .origin_message
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string()),
        });
    }

    let data = serde_json::from_value(raw.data)
        .map_err(|e| ClientError::malformed(status.as_u16(), &e))?;
    Ok(ApiResponse {
        success: true,
        message: raw.message.unwrap_or_default(),
        data,
        code: raw.code,
        origin_message: raw.origin_message,
    })
}
