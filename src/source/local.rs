use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    foundation::{
        error::{FlipbookError, FlipbookResult},
        gate::InitGate,
    },
    source::{FrameCollection, FrameId, FrameSource, RawFrame, is_supported_image_name},
};

#[derive(Debug)]
struct LoadedFrames {
    collection: FrameCollection,
    images: HashMap<FrameId, Arc<image::DynamicImage>>,
}

/// Directory-backed source, bulk-loaded on first use.
///
/// Every recognised image in `dir` (non-recursive) is read and decoded exactly once, behind an
/// [`InitGate`]. Files that fail to read or decode are logged and left out of the collection.
#[derive(Debug)]
pub struct LocalSource {
    dir: PathBuf,
    loaded: InitGate<LoadedFrames>,
}

impl LocalSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            loaded: InitGate::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn frames(&self) -> FlipbookResult<Arc<LoadedFrames>> {
        self.loaded.get_or_try_init(|| load_dir(&self.dir))
    }
}

impl FrameSource for LocalSource {
    fn list(&self) -> FlipbookResult<FrameCollection> {
        Ok(self.frames()?.collection.clone())
    }

    fn fetch(&self, id: &FrameId) -> FlipbookResult<RawFrame> {
        let frames = self.frames()?;
        frames
            .images
            .get(id)
            .map(|img| RawFrame::Decoded(Arc::clone(img)))
            .ok_or_else(|| {
                FlipbookError::not_found(format!("frame '{id}' is not in the collection"))
            })
    }
}

#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
fn load_dir(dir: &Path) -> FlipbookResult<LoadedFrames> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        FlipbookError::enumeration(format!("read frame dir '{}': {e}", dir.display()))
    })?;

    let mut images = HashMap::new();
    let mut skipped = 0usize;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                skipped += 1;
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_supported_image_name(name) {
            continue;
        }

        let decoded = std::fs::read(&path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| image::load_from_memory(&bytes).map_err(|e| e.to_string()));
        match decoded {
            Ok(img) => {
                images.insert(FrameId::new(name), Arc::new(img));
            }
            Err(e) => {
                tracing::warn!(file = name, error = %e, "excluding frame that failed to load");
                skipped += 1;
            }
        }
    }

    let collection = FrameCollection::from_ids(images.keys().cloned().collect());
    tracing::info!(frames = collection.len(), skipped, "local frames loaded");
    Ok(LoadedFrames { collection, images })
}

#[cfg(test)]
#[path = "../../tests/unit/source/local.rs"]
mod tests;
