//! Flipbook serves an ordered collection of still images as an on-demand, variably paced
//! animation.
//!
//! - A [`FrameSource`] enumerates frames, either from a local directory ([`LocalSource`]) or a
//!   remote listing ([`RemoteSource`]).
//! - A [`FramePipeline`] turns raw images into downscaled JPEG data URLs.
//! - A [`FrameCache`] memoizes pipeline output up to a fixed capacity.
//! - A [`FrameService`] composes the three behind index-addressed queries.
//! - A [`PlaybackController`] turns pointer position into speed and drives the frame index.
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
mod foundation;
pub mod logging;
pub mod pipeline;
pub mod playback;
pub mod service;
pub mod source;

pub use crate::cache::{CacheStats, EvictionPolicy, FrameCache};
pub use crate::config::{CacheConfig, FlipbookConfig, PlaybackConfig, SourceConfig};
pub use crate::foundation::error::{FlipbookError, FlipbookResult, FrameErrorKind};
pub use crate::foundation::gate::InitGate;
pub use crate::logging::init_logging;
pub use crate::pipeline::{EncodedFrame, FramePipeline, PipelineSettings};
pub use crate::playback::{
    FrameRequest, LatestFrameGate, PlaybackController, PlaybackMode, PlaybackTuning,
    speed_for_pointer,
};
pub use crate::service::{
    FrameFailure, FrameResponse, FrameService, FrameSuccess, InfoResponse, SourceStatus,
};
pub use crate::source::{
    FrameCollection, FrameId, FrameSource, HttpFetch, LocalSource, RawFrame, RemoteSource,
    ReqwestFetch, build_source,
};
