//! Channel catalog: the persisted, searchable list of saved channels

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One saved channel. The on-disk field is `nombre` for compatibility with
/// channel lists written by earlier releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(rename = "nombre")]
    pub name: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no channel list found at {}", .0.display())]
    StorageUnavailable(PathBuf),
    #[error("channel list at {} is not valid JSON: {source}", .path.display())]
    CorruptStorage {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not write channel list to {}: {source}", .path.display())]
    StorageWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("no channel selected")]
    NoSelection,
    #[error("selection {index} is out of range ({len} channels shown)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// The full ordered channel list, bound to the file it persists to.
///
/// Insertion order is preserved; entries are never deduplicated or sorted.
/// Every mutation saves synchronously, so the file never lags memory by more
/// than the mutation that just failed to write.
#[derive(Debug)]
pub struct Catalog {
    channels: Vec<Channel>,
    path: PathBuf,
}

impl Catalog {
    /// An empty catalog bound to `path`. Used when loading fails and the
    /// application continues with no channels.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            channels: Vec::new(),
            path: path.into(),
        }
    }

    /// Read the channel list from `path`.
    ///
    /// A missing file is `StorageUnavailable`, a present but unparseable file
    /// is `CorruptStorage`; both are recoverable by falling back to
    /// [`Catalog::empty`].
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        if !path.exists() {
            return Err(CatalogError::StorageUnavailable(path));
        }
        let content = fs::read_to_string(&path)
            .map_err(|_| CatalogError::StorageUnavailable(path.clone()))?;
        let channels: Vec<Channel> =
            serde_json::from_str(&content).map_err(|source| CatalogError::CorruptStorage {
                path: path.clone(),
                source,
            })?;
        Ok(Self { channels, path })
    }

    /// Write the full list back to the catalog file, replacing its contents.
    pub fn save(&self) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).ok();
        }
        let content = serde_json::to_string_pretty(&self.channels)
            .map_err(|source| CatalogError::StorageWrite {
                path: self.path.clone(),
                source: source.into(),
            })?;
        fs::write(&self.path, content).map_err(|source| CatalogError::StorageWrite {
            path: self.path.clone(),
            source,
        })
    }

    /// Append a channel and save.
    ///
    /// An empty name or url is rejected before anything is mutated. A failed
    /// save returns `StorageWrite` with the entry still appended in memory;
    /// the caller decides how loudly to warn.
    pub fn add(&mut self, name: &str, url: &str) -> Result<(), CatalogError> {
        if name.is_empty() {
            return Err(CatalogError::InvalidInput("channel name is empty"));
        }
        if url.is_empty() {
            return Err(CatalogError::InvalidInput("stream URL is empty"));
        }
        self.channels.push(Channel {
            name: name.to_string(),
            url: url.to_string(),
        });
        self.save()
    }

    /// All channels whose name contains `query`, case-insensitively, in
    /// catalog order. An empty query matches everything.
    ///
    /// Recomputed from the full list on every call; the returned view is what
    /// selection indices refer to.
    pub fn filter(&self, query: &str) -> Vec<Channel> {
        self.channels
            .iter()
            .filter(|c| contains_ignore_case(&c.name, query))
            .cloned()
            .collect()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Map a selection index in a filtered view back to that entry's stream URL.
pub fn resolve(view: &[Channel], index: usize) -> Result<&str, CatalogError> {
    view.get(index)
        .map(|c| c.url.as_str())
        .ok_or(CatalogError::IndexOutOfRange {
            index,
            len: view.len(),
        })
}

/// Case-insensitive substring check without allocation
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }

    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}
