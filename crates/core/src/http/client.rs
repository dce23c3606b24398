use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, Request, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::errors::{ApiFieldError, CoreError};
use crate::storage::TokenStore;

/// The single outbound request dispatcher.
///
/// Fixed base URL, credentials forwarded (cookie store on native,
/// `credentials: include` in the browser), and the persisted bearer token
/// attached to every request built here. Nothing else in the crate sets the
/// `Authorization` header.
pub struct HttpClient {
    client: Client,
    base_url: String,
    token_key: String,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("token_key", &self.token_key)
            .finish()
    }
}

impl HttpClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, CoreError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let builder = Client::builder().default_headers(headers);
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.cookie_store(true);
        #[cfg(not(target_arch = "wasm32"))]
        let builder = match config.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        let client = builder
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_key: config.token_key.clone(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/trades/42`.
    pub fn url(&self, path: &str) -> Result<Url, CoreError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| CoreError::InvalidRequest(format!("bad URL {joined}: {e}")))
    }

    /// Start a request, with the bearer token attached when one is persisted.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, CoreError> {
        let url = self.url(path)?;
        let builder = self.client.request(method, url);
        #[cfg(target_arch = "wasm32")]
        let builder = builder.fetch_credentials_include();

        match self.tokens.get(&self.token_key)? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    /// Finish building `builder` and dispatch it, decoding a JSON body.
    ///
    /// Construction problems (e.g. a token that is not a valid header value)
    /// fail here, before anything is sent.
    pub async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, CoreError> {
        let (method, path, response) = self.dispatch(builder).await?;
        decode_response(response).await.inspect_err(|e| {
            debug!(%method, %path, error = %e, "request rejected");
        })
    }

    /// Like `send`, but any 2xx counts as success whatever its body.
    ///
    /// A JSON body is returned parsed, any other text as `Value::String`,
    /// and an empty body as `Value::Null`.
    pub async fn send_ack(&self, builder: RequestBuilder) -> Result<Value, CoreError> {
        let (method, path, response) = self.dispatch(builder).await?;
        decode_ack(response).await.inspect_err(|e| {
            debug!(%method, %path, error = %e, "request rejected");
        })
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<(Method, String, Response), CoreError> {
        let request: Request = builder.build().map_err(|e| CoreError::InvalidRequest(e.to_string()))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, %path, "dispatching request");

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(%method, %path, error = %e, "request failed in transport");
            CoreError::from(e)
        })?;
        Ok((method, path, response))
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, CoreError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        return serde_json::from_slice(body)
            .map_err(|e| CoreError::Deserialization(format!("unexpected response body: {e}")));
    }

    Err(failure(status, &bytes))
}

async fn decode_ack(response: Response) -> Result<Value, CoreError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())));
    }

    Err(failure(status, &bytes))
}

fn failure(status: StatusCode, body: &[u8]) -> CoreError {
    if status == StatusCode::UNAUTHORIZED {
        return CoreError::Unauthorized;
    }
    parse_api_error(status.as_u16(), body)
}

/// Turn a non-2xx body into `CoreError::Api`.
///
/// Understands `{ "message": "...", "errors": { "<field>": { "message": "..." } } }`;
/// field entries may also be bare strings. Anything unparseable yields an
/// error without a message.
pub fn parse_api_error(status: u16, body: &[u8]) -> CoreError {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let field_errors = parsed
        .as_ref()
        .and_then(|v| v.get("errors"))
        .and_then(Value::as_object)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|(field, entry)| {
                    let message = match entry {
                        Value::String(s) => Some(s.clone()),
                        other => other.get("message").and_then(Value::as_str).map(str::to_string),
                    }?;
                    Some(ApiFieldError {
                        field: field.clone(),
                        message,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    CoreError::Api {
        status,
        message,
        field_errors,
    }
}
