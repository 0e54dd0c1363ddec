//! Local file and directory reader.
//!
//! Limits are checked before the I/O they protect: a file is statted before
//! it is read, and a directory's JSON files are counted and statted before
//! any of them is opened.

use std::path::{Path, PathBuf};

use serde_json::json;
use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::error::{LoaderError, LoaderResult};
use crate::limiter::fan_out;
use crate::loader::LoadContext;
use crate::sanitize::{json_depth, parse_bounded, sanitize_value};
use crate::source::path_basename;
use crate::types::{LoadedFile, SkippedFile};

/// `.json`, compared case-insensitively.
pub(crate) fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load a single JSON file.
pub(crate) async fn load_file(ctx: &LoadContext, path: &Path) -> LoaderResult<LoadedFile> {
    let config = &ctx.config;
    let source = path.display().to_string();
    let limit = config.max_file_bytes;

    let metadata = fs::metadata(path)
        .await
        .map_err(|e| LoaderError::local_io(&source, e))?;
    if metadata.len() > limit {
        return Err(reject_too_large(ctx, &source, Some(metadata.len())));
    }

    let bytes = read_bounded(path, limit)
        .await
        .map_err(|e| LoaderError::local_io(&source, e))?;
    if bytes.len() as u64 > limit {
        // Grew between stat and read.
        return Err(reject_too_large(ctx, &source, None));
    }

    let options = config.sanitize_options();
    let parsed = parse_bounded(&bytes, options.max_depth, |e| LoaderError::LocalJsonParse {
        path: source.clone(),
        message: e.to_string(),
    })?;
    let data = sanitize_value(&parsed, options)?;
    drop(parsed);

    let depth = json_depth(&data);
    if depth > config.max_json_depth {
        return Err(LoaderError::LocalJsonDepthExceeded {
            path: source,
            depth,
            limit: config.max_json_depth,
        });
    }

    config.logger.debug(
        "loaded local file",
        &json!({ "source": source, "bytes": bytes.len(), "depth": depth }),
    );

    let file = LoadedFile::new(path_basename(path), data, source);
    config.notify_loaded(&file);
    Ok(file)
}

/// Load every `.json` file directly inside `dir`.
pub(crate) async fn load_directory(ctx: &LoadContext, dir: &Path) -> LoaderResult<Vec<LoadedFile>> {
    let config = &ctx.config;
    let dir_display = dir.display().to_string();

    let candidates = list_json_files(dir).await?;
    if candidates.len() > config.max_files {
        return Err(LoaderError::LocalDirTooManyFiles {
            path: dir_display,
            count: candidates.len(),
            limit: config.max_files,
        });
    }

    let mut total: u64 = 0;
    for path in &candidates {
        let source = path.display().to_string();
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| LoaderError::local_io(&source, e))?;
        total = total.saturating_add(metadata.len());
        if total > config.max_total_bytes {
            let skipped = SkippedFile::total_exceeded(&source, total, config.max_total_bytes);
            config
                .logger
                .warn("directory size limit reached", &json!(skipped));
            config.notify_skipped(&skipped);
            return Err(LoaderError::LocalDirTotalTooLarge {
                path: dir_display,
                limit: config.max_total_bytes,
            });
        }
    }

    config.logger.debug(
        "loading directory",
        &json!({ "source": dir_display, "files": candidates.len(), "bytes": total }),
    );

    let tasks: Vec<_> = candidates
        .into_iter()
        .map(|path| {
            let ctx = ctx.clone();
            async move { load_file(&ctx, &path).await }
        })
        .collect();
    let files = fan_out(&ctx.limiter, tasks).await?;

    config.logger.info(
        "loaded directory",
        &json!({ "source": dir_display, "files": files.len() }),
    );
    Ok(files)
}

/// Regular `.json` files in `dir`, sorted by file name.
async fn list_json_files(dir: &Path) -> LoaderResult<Vec<PathBuf>> {
    let dir_display = dir.display().to_string();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| LoaderError::local_io(&dir_display, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LoaderError::local_io(&dir_display, e))?
    {
        let path = entry.path();
        if !has_json_extension(&path) {
            continue;
        }
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| LoaderError::local_io(path.display().to_string(), e))?;
        if file_type.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read at most `limit + 1` bytes, enough to tell whether the file is over.
async fn read_bounded(path: &Path, limit: u64) -> std::io::Result<Vec<u8>> {
    let file = fs::File::open(path).await?;
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .await?;
    Ok(bytes)
}

fn reject_too_large(ctx: &LoadContext, source: &str, size: Option<u64>) -> LoaderError {
    let config = &ctx.config;
    let skipped = SkippedFile::too_large(source, size, config.max_file_bytes);
    config.logger.warn("file size limit reached", &json!(skipped));
    config.notify_skipped(&skipped);
    LoaderError::LocalFileTooLarge {
        path: source.to_string(),
        size: size.unwrap_or(config.max_file_bytes.saturating_add(1)),
        limit: config.max_file_bytes,
    }
}
