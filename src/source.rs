//! Where content comes from.
//!
//! A [`ContentSource`] hands out raw JSON text for a collection index or a
//! single per-entity document. Parsing and validation happen in
//! [`crate::load`]; sources only know about locations.
//!
//! | Source | Index | Entity |
//! |--------|-------|--------|
//! | [`LocalSource`] | `{root}/{collection}/index.json` | `{root}/{collection}/{key}.json` |
//! | [`RemoteSource`] | `{base}/content/{collection}/index.json` | `{base}/content/{collection}/{key}.json` |

use crate::fetch::{Fetch, FetchError, RetryPolicy, fetch_with_retry};
use crate::types::{Collection, is_safe_key};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("refusing {collection} key {key:?}: not a plain file name")]
    UnsafeKey { collection: Collection, key: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

fn checked_key(collection: Collection, key: &str) -> Result<&str, SourceError> {
    if is_safe_key(key) {
        Ok(key)
    } else {
        Err(SourceError::UnsafeKey {
            collection,
            key: key.to_string(),
        })
    }
}

pub trait ContentSource {
    /// Raw text of the collection's `index.json`.
    fn read_index(&self, collection: Collection) -> Result<String, SourceError>;

    /// Raw text of the per-entity document keyed by slug (projects) or id
    /// (knowledge). Keys that are not a plain file name are refused with
    /// [`SourceError::UnsafeKey`].
    fn read_entity(&self, collection: Collection, key: &str) -> Result<String, SourceError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

impl<S: ContentSource + ?Sized> ContentSource for Box<S> {
    fn read_index(&self, collection: Collection) -> Result<String, SourceError> {
        (**self).read_index(collection)
    }

    fn read_entity(&self, collection: Collection, key: &str) -> Result<String, SourceError> {
        (**self).read_entity(collection, key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Content read from a directory on disk, the build-time path.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.dir_name()).join("index.json")
    }

    pub fn entity_path(&self, collection: Collection, key: &str) -> PathBuf {
        self.root
            .join(collection.dir_name())
            .join(format!("{key}.json"))
    }

    fn read(&self, path: PathBuf) -> Result<String, SourceError> {
        debug!(path = %path.display(), "reading content file");
        fs::read_to_string(&path).map_err(|source| SourceError::Io { path, source })
    }
}

impl ContentSource for LocalSource {
    fn read_index(&self, collection: Collection) -> Result<String, SourceError> {
        self.read(self.index_path(collection))
    }

    fn read_entity(&self, collection: Collection, key: &str) -> Result<String, SourceError> {
        let key = checked_key(collection, key)?;
        self.read(self.entity_path(collection, key))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Content served over HTTP by a previous export, the runtime path.
///
/// Every request goes through [`fetch_with_retry`].
pub struct RemoteSource<F> {
    base_url: String,
    fetcher: F,
    retry: RetryPolicy,
}

impl<F: Fetch> RemoteSource<F> {
    pub fn new(base_url: &str, fetcher: F, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            fetcher,
            retry,
        }
    }

    pub fn index_url(&self, collection: Collection) -> String {
        format!("{}/content/{}/index.json", self.base_url, collection.dir_name())
    }

    pub fn entity_url(&self, collection: Collection, key: &str) -> String {
        format!("{}/content/{}/{key}.json", self.base_url, collection.dir_name())
    }
}

impl<F: Fetch> ContentSource for RemoteSource<F> {
    fn read_index(&self, collection: Collection) -> Result<String, SourceError> {
        Ok(fetch_with_retry(
            &self.fetcher,
            &self.index_url(collection),
            self.retry,
        )?)
    }

    fn read_entity(&self, collection: Collection, key: &str) -> Result<String, SourceError> {
        let key = checked_key(collection, key)?;
        Ok(fetch_with_retry(
            &self.fetcher,
            &self.entity_url(collection, key),
            self.retry,
        )?)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
