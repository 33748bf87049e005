//! Horizontal page-swipe detection and page navigation.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum horizontal travel for a swipe, in logical pixels.
pub const SWIPE_MIN_DISTANCE: f64 = 60.0;
/// Maximum gesture duration for a swipe.
pub const SWIPE_MAX_DURATION_MS: u64 = 500;
/// Horizontal travel must exceed vertical travel by this factor.
pub const SWIPE_DIRECTION_RATIO: f64 = 1.5;
/// Lock after a page change during which further changes are refused.
pub const PAGE_CHANGE_COOLDOWN_MS: u64 = 400;

/// Swipe thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwipeConfig {
    pub min_distance: f64,
    pub max_duration_ms: u64,
    pub direction_ratio: f64,
    pub cooldown_ms: u64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            min_distance: SWIPE_MIN_DISTANCE,
            max_duration_ms: SWIPE_MAX_DURATION_MS,
            direction_ratio: SWIPE_DIRECTION_RATIO,
            cooldown_ms: PAGE_CHANGE_COOLDOWN_MS,
        }
    }
}

impl SwipeConfig {
    pub fn max_duration(&self) -> Duration {
        Duration::from_millis(self.max_duration_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Classify a completed gesture from its displacement and duration.
    pub fn classify(&self, delta: Vec2, elapsed: Duration) -> Option<SwipeDirection> {
        let dx = delta.x.abs();
        let dy = delta.y.abs();
        if dx < self.min_distance || elapsed > self.max_duration() || dx <= dy * self.direction_ratio {
            return None;
        }
        Some(if delta.x < 0.0 {
            SwipeDirection::Next
        } else {
            SwipeDirection::Previous
        })
    }
}

/// Page direction requested by a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeDirection {
    /// Finger moved right to left.
    Next,
    /// Finger moved left to right.
    Previous,
}

#[derive(Debug, Clone, Copy)]
struct TouchTrack {
    start: Point,
    start_time: Duration,
}

/// Tracks one single-finger touch gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct SwipeDetector {
    config: SwipeConfig,
    track: Option<TouchTrack>,
}

impl SwipeDetector {
    pub fn new(config: SwipeConfig) -> Self {
        Self { config, track: None }
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    /// Whether a gesture is being tracked.
    pub fn is_tracking(&self) -> bool {
        self.track.is_some()
    }

    /// Begin tracking. Gestures with more than one finger are never swipes.
    pub fn touch_start(&mut self, position: Point, time: Duration, touches: usize) {
        self.track = (touches == 1).then_some(TouchTrack {
            start: position,
            start_time: time,
        });
    }

    /// A second finger turns the gesture into a non-swipe.
    pub fn touch_move(&mut self, touches: usize) {
        if touches != 1 {
            self.track = None;
        }
    }

    /// Finish the gesture and classify it.
    pub fn touch_end(&mut self, position: Point, time: Duration) -> Option<SwipeDirection> {
        let track = self.track.take()?;
        let elapsed = time.saturating_sub(track.start_time);
        self.config.classify(position - track.start, elapsed)
    }

    pub fn touch_cancel(&mut self) {
        self.track = None;
    }
}

/// Current page within `1..=count`, with a cooldown between changes.
#[derive(Debug, Clone)]
pub struct PageNavigator {
    current: u32,
    count: u32,
    cooldown: Duration,
    locked_until: Option<Duration>,
}

impl PageNavigator {
    pub fn new(current: u32, count: u32, cooldown: Duration) -> Self {
        let count = count.max(1);
        Self {
            current: current.clamp(1, count),
            count,
            cooldown,
            locked_until: None,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn set_count(&mut self, count: u32) {
        self.count = count.max(1);
        self.current = self.current.min(self.count);
    }

    /// Whether a page change at `now` would be refused by the cooldown.
    pub fn is_locked(&self, now: Duration) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Target page for one step in `direction`, honoring bounds and cooldown.
    pub fn target(&self, direction: SwipeDirection, now: Duration) -> Option<u32> {
        if self.is_locked(now) {
            return None;
        }
        let target = match direction {
            SwipeDirection::Next if self.current < self.count => self.current + 1,
            SwipeDirection::Previous if self.current > 1 => self.current - 1,
            _ => return None,
        };
        Some(target)
    }

    /// Step one page and arm the cooldown. Returns the new page.
    pub fn step(&mut self, direction: SwipeDirection, now: Duration) -> Option<u32> {
        let target = self.target(direction, now)?;
        self.commit(target, now);
        Some(target)
    }

    /// Jump to an explicit page, sharing the bounds and cooldown of [`step`].
    ///
    /// [`step`]: Self::step
    pub fn go_to(&mut self, page: u32, now: Duration) -> Option<u32> {
        if self.is_locked(now) || page < 1 || page > self.count || page == self.current {
            return None;
        }
        self.commit(page, now);
        Some(page)
    }

    /// Record a page change decided by the caller.
    pub fn commit(&mut self, page: u32, now: Duration) {
        self.current = page.clamp(1, self.count);
        self.locked_until = Some(now + self.cooldown);
    }
}
