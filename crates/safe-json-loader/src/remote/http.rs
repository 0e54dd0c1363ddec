//! HTTP layer: status, content-type and body-size gating.
//!
//! This is the ONLY place that looks at responses. remote/mod.rs never
//! interprets status codes or headers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use url::Url;

use crate::error::{LoaderError, LoaderResult};

use super::helpers::{content_type_is_json, JSON_MEDIA_TYPE};

const USER_AGENT_VALUE: &str = concat!("safe-json-loader/", env!("CARGO_PKG_VERSION"));

/// Outcome of a body fetch.
#[derive(Debug)]
pub(crate) enum BodyOutcome {
    Body(Vec<u8>),
    /// Over the byte limit; `size` is known when the server declared it.
    TooLarge { size: Option<u64> },
}

/// HTTP backend (holds the reqwest client and the response gates).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    client: reqwest::Client,
    timeout: Duration,
    loose_content_type: bool,
    max_body_bytes: u64,
}

impl HttpBackend {
    pub(crate) fn new(
        timeout: Duration,
        loose_content_type: bool,
        max_body_bytes: u64,
    ) -> Result<Self, reqwest::Error> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        default_headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()?;

        Ok(Self {
            client,
            timeout,
            loose_content_type,
            max_body_bytes,
        })
    }

    /// GET `url` and return its body if every gate passes.
    pub(crate) async fn fetch_body(&self, url: &Url) -> LoaderResult<BodyOutcome> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.fetch_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::RemoteFetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type_is_json(&content_type, self.loose_content_type) {
            return Err(LoaderError::RemoteContentType {
                url: url.to_string(),
                content_type: if content_type.is_empty() {
                    "<missing>".to_string()
                } else {
                    content_type
                },
            });
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_body_bytes {
                return Ok(BodyOutcome::TooLarge {
                    size: Some(declared),
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.fetch_error(url, e))? {
            if (body.len() + chunk.len()) as u64 > self.max_body_bytes {
                return Ok(BodyOutcome::TooLarge { size: None });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(BodyOutcome::Body(body))
    }

    fn fetch_error(&self, url: &Url, err: reqwest::Error) -> LoaderError {
        let message = if err.is_timeout() {
            format!("timed out after {} ms", self.timeout.as_millis())
        } else {
            err.to_string()
        };
        LoaderError::RemoteFetch {
            url: url.to_string(),
            message,
        }
    }
}
