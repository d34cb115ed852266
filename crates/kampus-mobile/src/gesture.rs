//! Touch tracking for the manual pull-to-refresh scaffolding.

/// Downward drag distance that triggers a refresh on release.
pub const PULL_THRESHOLD_PX: f64 = 72.0;

/// Drag distance beyond which the indicator stops following the finger.
pub const MAX_INDICATOR_PX: f64 = 120.0;

/// Tracks one pull gesture from touch start to release.
#[derive(Debug, Clone, Copy, Default)]
pub struct PullTracker {
    start_y: Option<f64>,
    distance: f64,
}

impl PullTracker {
    /// Start tracking unless the refresher is disarmed.
    pub fn begin(&mut self, y: f64, interactive: bool) {
        self.distance = 0.0;
        self.start_y = interactive.then_some(y);
    }

    /// Follow the finger; returns the clamped indicator offset.
    pub fn update(&mut self, y: f64) -> f64 {
        let Some(start_y) = self.start_y else {
            return 0.0;
        };
        self.distance = (y - start_y).max(0.0);
        self.indicator_offset()
    }

    /// Release the touch. Returns `true` when the pull should refresh.
    pub fn finish(&mut self) -> bool {
        let triggered = self.start_y.is_some() && self.distance >= PULL_THRESHOLD_PX;
        *self = Self::default();
        triggered
    }

    pub const fn is_tracking(&self) -> bool {
        self.start_y.is_some()
    }

    pub fn indicator_offset(&self) -> f64 {
        self.distance.min(MAX_INDICATOR_PX)
    }
}
