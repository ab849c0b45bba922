//! Client for the hosted content store (Sanity HTTP API).
//!
//! Handlers talk to the store through the [`ContentStore`] trait so the
//! HTTP client can be swapped for an in-memory store in tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::SanityConfig;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run a read-only GROQ query; `params` are bound as `$name` variables.
    async fn fetch(&self, query: &str, params: &[(&str, Value)]) -> Result<Value, SanityError>;

    /// Create one document and return the stored representation.
    async fn create(&self, document: Value) -> Result<Value, SanityError>;
}

#[derive(Debug)]
pub enum SanityError {
    Http(reqwest::Error),
    Api { status: u16, message: String },
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for SanityError {
    fn from(e: reqwest::Error) -> Self {
        SanityError::Http(e)
    }
}

impl std::fmt::Display for SanityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SanityError::Http(e) => write!(f, "HTTP error: {}", e),
            SanityError::Api { status, message } => {
                write!(f, "Sanity API error ({}): {}", status, message)
            }
            SanityError::UnexpectedResponse(s) => write!(f, "Unexpected Sanity response: {}", s),
        }
    }
}

impl std::error::Error for SanityError {}

#[derive(Clone)]
pub struct SanityClient {
    config: SanityConfig,
    http: Client,
}

impl SanityClient {
    pub fn new(config: SanityConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// `https://<project>.api.sanity.io/v<version>`; reads may go through the CDN host.
    fn api_base(&self, allow_cdn: bool) -> String {
        let host = match &self.config.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => {
                let domain = if allow_cdn && self.config.use_cdn {
                    "apicdn.sanity.io"
                } else {
                    "api.sanity.io"
                };
                format!("https://{}.{}", self.config.project_id, domain)
            }
        };
        let version = self.config.api_version.trim_start_matches('v');
        format!("{}/v{}", host, version)
    }

    pub fn query_url(&self) -> String {
        format!("{}/data/query/{}", self.api_base(true), self.config.dataset)
    }

    pub fn mutate_url(&self) -> String {
        format!("{}/data/mutate/{}", self.api_base(false), self.config.dataset)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl ContentStore for SanityClient {
    async fn fetch(&self, query: &str, params: &[(&str, Value)]) -> Result<Value, SanityError> {
        // GROQ parameters travel as `$name=<json>`
        let mut pairs = vec![("query".to_string(), query.to_string())];
        for (name, value) in params {
            pairs.push((format!("${}", name), value.to_string()));
        }

        let resp = self
            .authorize(self.http.get(self.query_url()))
            .query(&pairs)
            .send()
            .await?;

        let mut body = read_json(resp).await?;
        body.get_mut("result")
            .map(Value::take)
            .ok_or_else(|| SanityError::UnexpectedResponse("missing `result`".into()))
    }

    async fn create(&self, document: Value) -> Result<Value, SanityError> {
        let resp = self
            .authorize(self.http.post(self.mutate_url()))
            .query(&[("returnDocuments", "true"), ("visibility", "sync")])
            .json(&json!({ "mutations": [{ "create": document }] }))
            .send()
            .await?;

        let mut body = read_json(resp).await?;
        body.pointer_mut("/results/0/document")
            .map(Value::take)
            .ok_or_else(|| SanityError::UnexpectedResponse("missing created document".into()))
    }
}

async fn read_json(resp: reqwest::Response) -> Result<Value, SanityError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(SanityError::Api {
            status: status.as_u16(),
            message: api_error_message(&text),
        });
    }

    serde_json::from_str(&text).map_err(|e| SanityError::UnexpectedResponse(e.to_string()))
}

/// Deserialize a query result into a typed read model
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, SanityError> {
    serde_json::from_value(value).map_err(|e| SanityError::UnexpectedResponse(e.to_string()))
}

/// Pull the human-readable message out of an error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    value
        .pointer("/error/description")
        .and_then(Value::as_str)
        .or_else(|| value.get("message").and_then(Value::as_str))
        .or_else(|| value.get("error").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
