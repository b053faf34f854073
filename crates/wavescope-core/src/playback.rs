//! Playback scheduler: advances the frame cursor on a fixed interval.
//!
//! The scheduler does not own a timer. Callers pass the current [`Instant`] to
//! [`Playback::tick`] and use [`Playback::next_deadline`] to decide when to wake.

use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

/// Play/pause state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

/// Frame cursor plus play/pause scheduling.
#[derive(Debug, Clone)]
pub struct Playback {
    frame: usize,
    frame_count: usize,
    state: PlaybackState,
    fps: u32,
    fps_range: RangeInclusive<u32>,
    next_tick: Option<Instant>,
    torn_down: bool,
}

impl Playback {
    /// Creates a paused scheduler at frame 0.
    ///
    /// `frame_count` is raised to at least 1 so the cursor always has a valid frame.
    #[must_use]
    pub fn new(frame_count: usize, fps: u32, fps_range: RangeInclusive<u32>) -> Self {
        let fps_range = if fps_range.is_empty() || *fps_range.start() == 0 {
            1..=(*fps_range.end()).max(1)
        } else {
            fps_range
        };
        Self {
            frame: 0,
            frame_count: frame_count.max(1),
            state: PlaybackState::Paused,
            fps: fps.clamp(*fps_range.start(), *fps_range.end()),
            fps_range,
            next_tick: None,
            torn_down: false,
        }
    }

    /// Current frame index.
    #[must_use]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Number of frames in the loop.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Returns true while playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Returns true after [`Playback::teardown`].
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Frames per second (clamped to the configured range).
    #[must_use]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Tick interval: `round(1000 / fps)` milliseconds.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis((1000.0 / f64::from(self.fps)).round() as u64)
    }

    /// When the next tick is due, if playing.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Starts playing. Ignored after teardown.
    pub fn play(&mut self, now: Instant) {
        if self.torn_down || self.is_playing() {
            return;
        }
        self.state = PlaybackState::Playing;
        self.next_tick = Some(now + self.interval());
        log::debug!("playback started at frame {}", self.frame);
    }

    /// Pauses and clears the pending tick.
    pub fn pause(&mut self) {
        if self.is_playing() {
            log::debug!("playback paused at frame {}", self.frame);
        }
        self.state = PlaybackState::Paused;
        self.next_tick = None;
    }

    /// Toggles between playing and paused.
    pub fn toggle(&mut self, now: Instant) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play(now);
        }
    }

    /// Pauses and rewinds to frame 0.
    pub fn reset(&mut self) {
        self.pause();
        if !self.torn_down {
            self.frame = 0;
        }
    }

    /// Scrubs to `frame` (clamped to the last frame) without changing play state.
    pub fn set_frame(&mut self, frame: usize) {
        if self.torn_down {
            return;
        }
        self.frame = frame.min(self.frame_count - 1);
    }

    /// Advances one frame, wrapping at the end.
    pub fn step(&mut self) {
        if self.torn_down {
            return;
        }
        self.frame = (self.frame + 1) % self.frame_count;
    }

    /// Changes the frame rate; a pending tick is rescheduled from `now`.
    pub fn set_fps(&mut self, fps: u32, now: Instant) {
        self.fps = fps.clamp(*self.fps_range.start(), *self.fps_range.end());
        if self.is_playing() {
            self.next_tick = Some(now + self.interval());
        }
    }

    /// Replaces the loop length, clamping the cursor into range.
    pub fn set_frame_count(&mut self, frame_count: usize) {
        self.frame_count = frame_count.max(1);
        self.frame = self.frame.min(self.frame_count - 1);
    }

    /// Advances the cursor if a tick is due. Returns true if the frame changed.
    ///
    /// At most one frame is advanced per call; when the caller has fallen more
    /// than an interval behind, the schedule is re-anchored at `now`.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.torn_down || !self.is_playing() {
            return false;
        }
        let Some(deadline) = self.next_tick else {
            return false;
        };
        if now < deadline {
            return false;
        }

        let before = self.frame;
        self.step();

        let interval = self.interval();
        let next = deadline + interval;
        self.next_tick = Some(if next <= now { now + interval } else { next });

        self.frame != before
    }

    /// Stops playback permanently. No later call mutates the cursor.
    pub fn teardown(&mut self) {
        self.pause();
        self.torn_down = true;
    }
}
