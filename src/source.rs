//! Frame sources: where the ordered collection of frames comes from.
//!
//! A [`FrameSource`] enumerates frame identifiers and hands out the raw frame for one of them.
//! Two implementations exist and are selected once, at construction time, by [`build_source`]:
//!
//! - [`LocalSource`]: scans a directory and decodes every recognised image once, up front.
//! - [`RemoteSource`]: enumerates a remote listing once and fetches bytes per request.

use std::{fmt, sync::Arc};

use crate::{
    config::SourceConfig,
    foundation::error::{FlipbookError, FlipbookResult},
};

pub mod local;
pub mod remote;

pub use local::LocalSource;
pub use remote::{HttpFetch, RemoteSource, ReqwestFetch};

/// File extensions treated as frames (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Stable, name-ordered identifier of one frame.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(String);

impl FrameId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lexicographically sorted, duplicate-free snapshot of a source's frames.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameCollection {
    ids: Arc<[FrameId]>,
}

impl FrameCollection {
    pub fn from_ids(mut ids: Vec<FrameId>) -> Self {
        ids.sort();
        ids.dedup();
        Self { ids: ids.into() }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FrameId> {
        self.ids.get(index)
    }

    pub fn position(&self, id: &FrameId) -> Option<usize> {
        self.ids.binary_search(id).ok()
    }

    pub fn contains(&self, id: &FrameId) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameId> {
        self.ids.iter()
    }
}

/// Frame content as handed out by a source.
///
/// Remote sources return the bytes as fetched; the local source has already decoded every frame
/// during its bulk load and returns the decoded image so the pipeline does not decode twice.
#[derive(Clone, Debug)]
pub enum RawFrame {
    Bytes(Vec<u8>),
    Decoded(Arc<image::DynamicImage>),
}

/// Capability interface over frame sources.
pub trait FrameSource: Send + Sync {
    /// Enumerate frames. Memoised after the first successful call.
    fn list(&self) -> FlipbookResult<FrameCollection>;

    /// Raw content for `id`; `NotFound` if `id` is outside the current collection.
    fn fetch(&self, id: &FrameId) -> FlipbookResult<RawFrame>;
}

/// Whether `name` carries one of [`IMAGE_EXTENSIONS`].
pub fn is_supported_image_name(name: &str) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
}

/// Construct the source variant named by the configuration.
pub fn build_source(cfg: &SourceConfig) -> FlipbookResult<Box<dyn FrameSource>> {
    match cfg {
        SourceConfig::Local { dir } => Ok(Box::new(LocalSource::new(dir))),
        SourceConfig::Remote {
            listing_url,
            timeout_secs,
        } => {
            if listing_url.trim().is_empty() {
                return Err(FlipbookError::config("remote listing_url must be non-empty"));
            }
            let http = ReqwestFetch::new(std::time::Duration::from_secs(*timeout_secs))?;
            Ok(Box::new(RemoteSource::new(listing_url.clone(), http)))
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/source/collection.rs"]
mod tests;
