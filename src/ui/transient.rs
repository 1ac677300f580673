//! Self-expiring UI state.
//!
//! Toasts, the invalid-input cue and row transitions all start at an
//! `Instant` and derive their phase from elapsed time, so nothing has to
//! schedule a callback to revert them.

use std::time::{Duration, Instant};

/// Durations of every timed visual effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTimings {
    pub toast_enter: Duration,
    pub toast_visible: Duration,
    pub toast_fade: Duration,
    pub cue_shake: Duration,
    pub cue_reset: Duration,
    pub row_insert: Duration,
    pub row_remove: Duration,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            toast_enter: Duration::from_millis(10),
            toast_visible: Duration::from_millis(3000),
            toast_fade: Duration::from_millis(300),
            cue_shake: Duration::from_millis(500),
            cue_reset: Duration::from_millis(1000),
            row_insert: Duration::from_millis(300),
            row_remove: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Shown,
    Leaving,
    Expired,
}

/// A transient confirmation message
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    started: Instant,
    enter: Duration,
    visible: Duration,
    fade: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, now: Instant, timings: &TransitionTimings) -> Self {
        Self {
            message: message.into(),
            started: now,
            enter: timings.toast_enter,
            visible: timings.toast_visible,
            fade: timings.toast_fade,
        }
    }

    pub fn phase(&self, now: Instant) -> ToastPhase {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.enter {
            ToastPhase::Entering
        } else if elapsed < self.visible {
            ToastPhase::Shown
        } else if elapsed < self.visible + self.fade {
            ToastPhase::Leaving
        } else {
            ToastPhase::Expired
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.phase(now) == ToastPhase::Expired
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuePhase {
    /// Border flagged and the field shakes
    Shaking,
    /// Shake finished, border still flagged
    Flagged,
    Cleared,
}

/// Invalid-input cue on a text field
#[derive(Debug, Clone, Copy)]
pub struct InvalidCue {
    started: Instant,
    shake: Duration,
    reset: Duration,
}

impl InvalidCue {
    /// Horizontal shake period, one column each way
    const STEP: Duration = Duration::from_millis(50);

    pub fn new(now: Instant, timings: &TransitionTimings) -> Self {
        Self {
            started: now,
            shake: timings.cue_shake,
            reset: timings.cue_reset.max(timings.cue_shake),
        }
    }

    pub fn phase(&self, now: Instant) -> CuePhase {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed < self.shake {
            CuePhase::Shaking
        } else if elapsed < self.reset {
            CuePhase::Flagged
        } else {
            CuePhase::Cleared
        }
    }

    /// Column offset of the shaking field: 0, -1, +1, -1, ... while shaking
    pub fn offset(&self, now: Instant) -> i16 {
        if self.phase(now) != CuePhase::Shaking {
            return 0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let step = elapsed.as_millis() / Self::STEP.as_millis();
        match step {
            0 => 0,
            n if n % 2 == 1 => -1,
            _ => 1,
        }
    }

    pub fn is_flagged(&self, now: Instant) -> bool {
        self.phase(now) != CuePhase::Cleared
    }
}
