//! Runtime configuration, loaded from JSON.
//!
//! Every section has defaults, so `{}` is a complete config: a local source reading `images/`,
//! a 50-entry admission-capped cache, 1200px / q85 JPEG output and the stock playback tuning.
//!
//! ```json
//! {
//!   "source": { "remote": { "listing_url": "https://example.test/frames", "timeout_secs": 10 } },
//!   "cache": { "capacity": 120, "eviction": "lru" },
//!   "pipeline": { "max_width": 960, "quality": 80 },
//!   "playback": { "idle_timeout_ms": 2000 }
//! }
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    cache::{DEFAULT_CAPACITY, EvictionPolicy},
    foundation::error::{FlipbookError, FlipbookResult},
    pipeline::PipelineSettings,
    playback::{
        DEFAULT_AUTO_SPEED, DEFAULT_DEAD_ZONE, DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SPEED,
        DEFAULT_POLL_INTERVAL, PlaybackTuning,
    },
    source::remote::DEFAULT_TIMEOUT,
};

pub const DEFAULT_FRAME_DIR: &str = "images";
pub const DEFAULT_TICK_HZ: u32 = 60;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlipbookConfig {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub pipeline: PipelineSettings,
    pub playback: PlaybackConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum SourceConfig {
    Local {
        #[serde(default = "default_frame_dir")]
        dir: PathBuf,
    },
    Remote {
        listing_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Local {
            dir: default_frame_dir(),
        }
    }
}

fn default_frame_dir() -> PathBuf {
    PathBuf::from(DEFAULT_FRAME_DIR)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub capacity: usize,
    pub eviction: EvictionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            eviction: EvictionPolicy::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaybackConfig {
    pub auto_speed: f64,
    pub max_speed: f64,
    pub dead_zone: f64,
    pub idle_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub tick_hz: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            auto_speed: DEFAULT_AUTO_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            dead_zone: DEFAULT_DEAD_ZONE,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT.as_millis() as u64,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            tick_hz: DEFAULT_TICK_HZ,
        }
    }
}

impl PlaybackConfig {
    pub fn tuning(&self) -> PlaybackTuning {
        PlaybackTuning {
            auto_speed: self.auto_speed,
            max_speed: self.max_speed,
            dead_zone: self.dead_zone,
            idle_timeout: Duration::from_millis(self.idle_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }
}

impl FlipbookConfig {
    pub fn from_json_str(s: &str) -> FlipbookResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| FlipbookError::config(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> FlipbookResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| {
            FlipbookError::config(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> FlipbookResult<()> {
        if let SourceConfig::Remote {
            listing_url,
            timeout_secs,
        } = &self.source
        {
            if listing_url.trim().is_empty() {
                return Err(FlipbookError::config("remote listing_url must be non-empty"));
            }
            if *timeout_secs == 0 {
                return Err(FlipbookError::config("remote timeout_secs must be > 0"));
            }
        }

        if self.cache.capacity == 0 {
            return Err(FlipbookError::config("cache capacity must be > 0"));
        }
        if self.pipeline.max_width == 0 {
            return Err(FlipbookError::config("pipeline max_width must be > 0"));
        }
        if !(1..=100).contains(&self.pipeline.quality) {
            return Err(FlipbookError::config("pipeline quality must be in 1..=100"));
        }

        let p = &self.playback;
        if !p.auto_speed.is_finite() || p.auto_speed < 0.0 {
            return Err(FlipbookError::config(
                "playback auto_speed must be finite and >= 0",
            ));
        }
        if !p.max_speed.is_finite() || p.max_speed < 0.0 {
            return Err(FlipbookError::config(
                "playback max_speed must be finite and >= 0",
            ));
        }
        if !(0.0..1.0).contains(&p.dead_zone) {
            return Err(FlipbookError::config("playback dead_zone must be in [0, 1)"));
        }
        if p.idle_timeout_ms == 0 || p.poll_interval_ms == 0 {
            return Err(FlipbookError::config(
                "playback idle_timeout_ms and poll_interval_ms must be > 0",
            ));
        }
        if p.tick_hz == 0 {
            return Err(FlipbookError::config("playback tick_hz must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
