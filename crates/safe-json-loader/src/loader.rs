//! Entry point: classify the input and dispatch to the local or remote reader.
//!
//! One call owns one [`LoaderConfig`] and one [`ConcurrencyLimiter`]; every
//! file of a directory and every URL of an index shares them.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tokio::fs;

use crate::config::{LoaderConfig, LoaderOptions};
use crate::error::{LoaderError, LoaderResult};
use crate::limiter::ConcurrencyLimiter;
use crate::local::{has_json_extension, load_directory, load_file};
use crate::remote::RemoteReader;
use crate::source::Source;
use crate::types::LoadedFile;

/// Shared state for one load: resolved config plus the limiter.
#[derive(Clone)]
pub(crate) struct LoadContext {
    pub(crate) config: Arc<LoaderConfig>,
    pub(crate) limiter: ConcurrencyLimiter,
}

impl LoadContext {
    pub(crate) fn new(config: LoaderConfig) -> Self {
        let limiter = ConcurrencyLimiter::new(config.max_concurrency);
        Self {
            config: Arc::new(config),
            limiter,
        }
    }
}

/// Load and sanitize JSON from a local path or an `http(s)` URL.
///
/// A directory yields every `.json` file directly inside it; a remote index
/// document yields every document it lists. Either the whole batch loads or
/// the first error is returned.
///
/// # Example
///
/// ```no_run
/// use safe_json_loader::{load_safe_json_resources, LoaderOptions};
///
/// # async fn example() -> safe_json_loader::LoaderResult<()> {
/// let options = LoaderOptions::new().with_max_files(10);
/// let files = load_safe_json_resources("./fixtures", options).await?;
/// for file in &files {
///     println!("{} from {}", file.name(), file.source());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn load_safe_json_resources(
    input: &str,
    options: LoaderOptions,
) -> LoaderResult<Vec<LoadedFile>> {
    load_safe_json_resources_with_config(input, LoaderConfig::resolve(options)).await
}

/// Same as [`load_safe_json_resources`], with an already resolved config.
pub async fn load_safe_json_resources_with_config(
    input: &str,
    config: LoaderConfig,
) -> LoaderResult<Vec<LoadedFile>> {
    let ctx = LoadContext::new(config);

    let result = load(&ctx, input).await;
    if let Err(err) = &result {
        ctx.config.logger.error(
            &err.to_string(),
            &json!({ "code": err.code(), "input": input }),
        );
    }
    result
}

async fn load(ctx: &LoadContext, input: &str) -> LoaderResult<Vec<LoadedFile>> {
    let source = Source::classify(input)?;
    ctx.config.logger.debug(
        "classified input",
        &json!({
            "input": input,
            "source": source.to_string(),
            "remote": source.is_remote(),
        }),
    );

    match source {
        Source::Remote(url) => RemoteReader::new(ctx.clone(), &url)?.load(&url).await,
        Source::Local(path) => load_local(ctx, &path).await,
    }
}

async fn load_local(ctx: &LoadContext, path: &Path) -> LoaderResult<Vec<LoadedFile>> {
    let display = path.display().to_string();

    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(LoaderError::LocalPathNotFound { path: display })
        }
        Err(e) => return Err(LoaderError::local_io(display, e)),
    };

    if metadata.is_file() {
        if !has_json_extension(path) {
            return Err(LoaderError::LocalFileExtension { path: display });
        }
        Ok(vec![load_file(ctx, path).await?])
    } else if metadata.is_dir() {
        load_directory(ctx, path).await
    } else {
        Err(LoaderError::LocalPathType { path: display })
    }
}
