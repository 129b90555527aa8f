//! Viewer-side playback state machine.
//!
//! The controller is driven by three inputs, all carrying an injected timestamp so behaviour is
//! deterministic: pointer moves (enter MANUAL and set speed), polls (revert to AUTO after the
//! idle timeout), and ticks (advance and wrap the position, emit a frame request).

use std::{fmt, time::Duration};

pub const DEFAULT_AUTO_SPEED: f64 = 0.833;
pub const DEFAULT_MAX_SPEED: f64 = 5.0;
pub const DEFAULT_DEAD_ZONE: f64 = 0.15;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackMode {
    #[default]
    Auto,
    Manual,
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "AUTO",
            Self::Manual => "MANUAL",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackTuning {
    /// Frames per tick while AUTO.
    pub auto_speed: f64,
    /// Speed magnitude at the pointer's extreme edges.
    pub max_speed: f64,
    /// Half-width of the zero-speed band around the center, in normalized offset units.
    pub dead_zone: f64,
    pub idle_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for PlaybackTuning {
    fn default() -> Self {
        Self {
            auto_speed: DEFAULT_AUTO_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            dead_zone: DEFAULT_DEAD_ZONE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Signed speed for a pointer at fractional horizontal position `x` (clamped to `[0, 1]`).
///
/// With `n = 2x - 1`, `|n|` below the dead zone maps to exactly zero; beyond it the remaining
/// magnitude is remapped linearly onto `[0, max_speed]` and signed by direction.
pub fn speed_for_pointer(x: f64, tuning: &PlaybackTuning) -> f64 {
    let x = if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.5 };
    let n = 2.0 * x - 1.0;
    let mag = n.abs();
    if mag < tuning.dead_zone {
        return 0.0;
    }
    n.signum() * ((mag - tuning.dead_zone) / (1.0 - tuning.dead_zone)) * tuning.max_speed
}

/// A frame lookup issued by one tick. `seq` strictly increases per controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRequest {
    pub index: usize,
    pub seq: u64,
}

#[derive(Clone, Debug)]
pub struct PlaybackController {
    tuning: PlaybackTuning,
    position: f64,
    total_frames: usize,
    speed: f64,
    mode: PlaybackMode,
    last_input: Option<Duration>,
    next_seq: u64,
}

impl PlaybackController {
    pub fn new(total_frames: usize, tuning: PlaybackTuning) -> Self {
        Self {
            tuning,
            position: 0.0,
            total_frames,
            speed: tuning.auto_speed,
            mode: PlaybackMode::Auto,
            last_input: None,
            next_seq: 0,
        }
    }

    pub fn tuning(&self) -> &PlaybackTuning {
        &self.tuning
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// `floor(position)`, or `None` with no frames.
    pub fn frame_index(&self) -> Option<usize> {
        if self.total_frames == 0 {
            return None;
        }
        Some((self.position.floor().max(0.0) as usize).min(self.total_frames - 1))
    }

    /// Move the position, e.g. to resume a session. Wrapped into range like a tick would.
    pub fn seek(&mut self, position: f64) {
        self.position = position;
        self.wrap();
    }

    /// Re-snapshot the collection length.
    pub fn set_total_frames(&mut self, total_frames: usize) {
        self.total_frames = total_frames;
        if self.position >= total_frames as f64 {
            self.position = 0.0;
        }
    }

    pub fn pointer_moved(&mut self, x: f64, now: Duration) {
        self.mode = PlaybackMode::Manual;
        self.last_input = Some(now);
        self.speed = speed_for_pointer(x, &self.tuning);
    }

    /// Revert MANUAL to AUTO once `idle_timeout` has passed since the last pointer move.
    pub fn poll(&mut self, now: Duration) -> PlaybackMode {
        if self.mode == PlaybackMode::Manual
            && self
                .last_input
                .is_none_or(|t| now.saturating_sub(t) >= self.tuning.idle_timeout)
        {
            self.mode = PlaybackMode::Auto;
            self.speed = self.tuning.auto_speed;
            tracing::debug!("playback idle, back to auto");
        }
        self.mode
    }

    /// Advance one tick and return the frame to request.
    pub fn tick(&mut self) -> Option<FrameRequest> {
        if self.total_frames == 0 {
            return None;
        }
        self.position += self.speed;
        self.wrap();
        let index = self.frame_index()?;
        let seq = self.next_seq;
        self.next_seq += 1;
        Some(FrameRequest { index, seq })
    }

    fn wrap(&mut self) {
        let total = self.total_frames as f64;
        if self.total_frames == 0 || !self.position.is_finite() {
            self.position = 0.0;
        } else if self.position >= total {
            self.position = 0.0;
        } else if self.position < 0.0 {
            self.position = total - 1.0;
        }
    }

    /// One-line UI state, e.g. `MANUAL | frame 3/240 | speed -2.10`.
    pub fn status_text(&self) -> String {
        match self.frame_index() {
            Some(i) => format!(
                "{} | frame {}/{} | speed {:+.2}",
                self.mode,
                i + 1,
                self.total_frames,
                self.speed
            ),
            None => format!("{} | no frames", self.mode),
        }
    }
}

/// Drops responses that arrive after a newer one was already shown.
///
/// Ticks issue requests without waiting for earlier ones, so responses may arrive out of order.
/// Feeding each arrival's [`FrameRequest::seq`] through [`LatestFrameGate::accept`] keeps a late,
/// stale frame from overriding a newer one.
#[derive(Clone, Copy, Debug, Default)]
pub struct LatestFrameGate {
    shown: Option<u64>,
}

impl LatestFrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, seq: u64) -> bool {
        if self.shown.is_some_and(|shown| seq <= shown) {
            return false;
        }
        self.shown = Some(seq);
        true
    }

    pub fn last_shown(&self) -> Option<u64> {
        self.shown
    }
}

#[cfg(test)]
#[path = "../tests/unit/playback.rs"]
mod tests;
