//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use safe_json_loader::{LoadedFile, LoaderOptions, SkippedFile};

/// Collects hook callbacks so tests can assert on them.
#[derive(Clone, Default)]
pub struct HookLog {
    pub loaded: Arc<Mutex<Vec<String>>>,
    pub skipped: Arc<Mutex<Vec<SkippedFile>>>,
}

impl HookLog {
    /// Install both hooks on `options`.
    pub fn attach(&self, options: LoaderOptions) -> LoaderOptions {
        let loaded = self.loaded.clone();
        let skipped = self.skipped.clone();
        options
            .on_file_loaded(move |file: &LoadedFile| {
                loaded.lock().unwrap().push(file.name().to_string())
            })
            .on_file_skipped(move |file: &SkippedFile| skipped.lock().unwrap().push(file.clone()))
    }

    pub fn loaded(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }

    pub fn skipped(&self) -> Vec<SkippedFile> {
        self.skipped.lock().unwrap().clone()
    }
}
