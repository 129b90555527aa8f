use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    cache::{CacheStats, FrameCache},
    config::FlipbookConfig,
    foundation::error::{FlipbookError, FlipbookResult},
    pipeline::{EncodedFrame, FramePipeline},
    source::{FrameSource, build_source},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Ready,
    NoImages,
    Error,
}

/// Body of the info query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    pub total: usize,
    pub status: SourceStatus,
}

/// Body of a successful frame query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSuccess {
    pub success: bool,
    pub image: String,
    pub index: usize,
    pub total: usize,
}

/// Body of a failed frame query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFailure {
    pub success: bool,
    pub error: String,
}

/// Frame query result; serializes to exactly one of the two body shapes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameResponse {
    Success(FrameSuccess),
    Failure(FrameFailure),
}

impl FrameResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Owned composition of source, cache and pipeline; create once and share with handlers.
pub struct FrameService {
    source: Box<dyn FrameSource>,
    cache: FrameCache,
    pipeline: FramePipeline,
}

impl FrameService {
    pub fn new(source: Box<dyn FrameSource>, cache: FrameCache, pipeline: FramePipeline) -> Self {
        Self {
            source,
            cache,
            pipeline,
        }
    }

    pub fn from_config(cfg: &FlipbookConfig) -> FlipbookResult<Self> {
        cfg.validate()?;
        Ok(Self::new(
            build_source(&cfg.source)?,
            FrameCache::new(cfg.cache.capacity, cfg.cache.eviction),
            FramePipeline::new(cfg.pipeline),
        ))
    }

    pub fn source(&self) -> &dyn FrameSource {
        self.source.as_ref()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cached_frames(&self) -> usize {
        self.cache.len()
    }

    pub fn total(&self) -> FlipbookResult<usize> {
        Ok(self.source.list()?.len())
    }

    /// Enumeration failures degrade to `error` rather than failing the query.
    pub fn info(&self) -> InfoResponse {
        match self.source.list() {
            Ok(list) if list.is_empty() => InfoResponse {
                total: 0,
                status: SourceStatus::NoImages,
            },
            Ok(list) => InfoResponse {
                total: list.len(),
                status: SourceStatus::Ready,
            },
            Err(e) => {
                tracing::warn!(error = %e, "frame enumeration failed");
                InfoResponse {
                    total: 0,
                    status: SourceStatus::Error,
                }
            }
        }
    }

    /// Resolve `index` through source, cache and pipeline. Failures are not retried.
    #[tracing::instrument(skip(self))]
    pub fn get_frame(&self, index: i64) -> FlipbookResult<Arc<EncodedFrame>> {
        let list = self.source.list()?;
        let id = usize::try_from(index)
            .ok()
            .and_then(|i| list.get(i))
            .ok_or_else(|| {
                FlipbookError::not_found(format!(
                    "frame index {index} out of range [0, {})",
                    list.len()
                ))
            })?;
        self.cache.get_or_compute(id, || {
            let raw = self.source.fetch(id)?;
            self.pipeline.encode_raw(&raw)
        })
    }

    /// [`FrameService::get_frame`] mapped onto the response shapes; never panics or errors.
    pub fn frame_response(&self, index: i64) -> FrameResponse {
        let frame = self
            .get_frame(index)
            .and_then(|frame| Ok((frame, self.total()?)));
        match frame {
            Ok((frame, total)) => FrameResponse::Success(FrameSuccess {
                success: true,
                image: frame.data_url().to_string(),
                index: index as usize,
                total,
            }),
            Err(e) => {
                tracing::debug!(index, error = %e, "frame query failed");
                FrameResponse::Failure(FrameFailure {
                    success: false,
                    error: e.to_string(),
                })
            }
        }
    }
}
