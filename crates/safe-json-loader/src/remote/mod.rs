//! Remote reader for single documents and index documents.
//!
//! Public surface: no header or status knowledge. All response gating lives in
//! http.rs.

use serde_json::{json, Value as JsonValue};
use url::Url;

use crate::error::{LoaderError, LoaderResult};
use crate::limiter::fan_out;
use crate::loader::LoadContext;
use crate::sanitize::{json_depth, parse_bounded, sanitize_value};
use crate::source::{parse_http_url, url_basename};
use crate::types::{LoadedFile, SkippedFile};

mod helpers;
mod http;

use helpers::{classify_document, DocumentKind};
use http::{BodyOutcome, HttpBackend};

/// Fetches, gates and sanitizes remote JSON.
#[derive(Clone)]
pub(crate) struct RemoteReader {
    ctx: LoadContext,
    http: HttpBackend,
}

impl RemoteReader {
    pub(crate) fn new(ctx: LoadContext, origin: &Url) -> LoaderResult<Self> {
        let config = &ctx.config;
        let http = HttpBackend::new(
            config.http_timeout(),
            config.loose_content_type,
            config.max_file_bytes,
        )
        .map_err(|e| LoaderError::RemoteFetch {
            url: origin.to_string(),
            message: format!("failed to create HTTP client: {}", e),
        })?;

        Ok(Self { ctx, http })
    }

    /// Load `url` as a single document, or fan out if it is an index.
    pub(crate) async fn load(&self, url: &Url) -> LoaderResult<Vec<LoadedFile>> {
        let document = self.fetch_document(url).await?;

        let kind = classify_document(&document).map_err(|message| {
            LoaderError::RemoteIndexInvalidFormat {
                url: url.to_string(),
                message,
            }
        })?;

        match kind {
            DocumentKind::Index(entries) => self.load_index(url, entries).await,
            DocumentKind::Terminal => Ok(vec![self.finish(url, document)]),
        }
    }

    /// Fetch, parse, sanitize and depth-check one document.
    pub(crate) async fn fetch_document(&self, url: &Url) -> LoaderResult<JsonValue> {
        let config = &self.ctx.config;
        config
            .logger
            .debug("fetching remote document", &json!({ "url": url.as_str() }));

        let body = match self.http.fetch_body(url).await? {
            BodyOutcome::Body(body) => body,
            BodyOutcome::TooLarge { size } => {
                let skipped = SkippedFile::too_large(url.as_str(), size, config.max_file_bytes);
                config.logger.warn("response size limit reached", &json!(skipped));
                config.notify_skipped(&skipped);
                return Err(LoaderError::RemoteFileTooLarge {
                    url: url.to_string(),
                    limit: config.max_file_bytes,
                });
            }
        };

        let options = config.sanitize_options();
        let parsed = parse_bounded(&body, options.max_depth, |e| LoaderError::RemoteJsonParse {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let data = sanitize_value(&parsed, options)?;
        drop(parsed);

        let depth = json_depth(&data);
        if depth > config.max_json_depth {
            return Err(LoaderError::RemoteJsonDepthExceeded {
                url: url.to_string(),
                depth,
                limit: config.max_json_depth,
            });
        }

        Ok(data)
    }

    async fn load_index(
        &self,
        index_url: &Url,
        entries: Vec<String>,
    ) -> LoaderResult<Vec<LoadedFile>> {
        let config = &self.ctx.config;

        if entries.len() > config.max_files {
            return Err(LoaderError::RemoteIndexTooManyFiles {
                url: index_url.to_string(),
                count: entries.len(),
                limit: config.max_files,
            });
        }

        let urls = entries
            .into_iter()
            .map(|entry| {
                parse_http_url(&entry).ok_or_else(|| LoaderError::RemoteIndexInvalidUrl {
                    url: index_url.to_string(),
                    entry,
                })
            })
            .collect::<LoaderResult<Vec<Url>>>()?;

        config.logger.debug(
            "expanding remote index",
            &json!({ "url": index_url.as_str(), "files": urls.len() }),
        );

        let tasks: Vec<_> = urls
            .into_iter()
            .map(|url| {
                let reader = self.clone();
                async move {
                    let data = reader.fetch_document(&url).await?;
                    Ok(reader.finish(&url, data))
                }
            })
            .collect();
        let files = fan_out(&self.ctx.limiter, tasks).await?;

        config.logger.info(
            "loaded remote index",
            &json!({ "url": index_url.as_str(), "files": files.len() }),
        );
        Ok(files)
    }

    fn finish(&self, url: &Url, data: JsonValue) -> LoadedFile {
        let file = LoadedFile::new(url_basename(url), data, url.as_str());
        self.ctx.config.notify_loaded(&file);
        file
    }
}
