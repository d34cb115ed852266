//! Manual pull-to-refresh gesture tracking.

use serde::{Deserialize, Serialize};

use crate::back::SessionSlot;

/// How pull-to-refresh is provided for the embedded browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// The embedded browser handles the gesture itself.
    Native,
    /// The shell wraps the browser in its own refresh scaffolding.
    Manual,
}

/// Result of a pull gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A reload was issued.
    Reloaded,
    /// Content is not scrolled to the top; the gesture is ignored.
    Disarmed,
    /// No live browser session to reload.
    NoSession,
    /// Native mode; the browser owns the gesture.
    Native,
}

/// Whether a refresh gesture should be armed at `offset`.
pub fn refresher_armed(offset: f64) -> bool {
    offset == 0.0
}

/// Issues reloads for the manual refresh gesture.
///
/// Arming is derived elsewhere from the latest scroll offset (see
/// [`refresher_armed`]); the controller only decides what a pull does with it.
#[derive(Debug, Clone, Copy)]
pub struct RefreshController {
    mode: RefreshMode,
}

impl RefreshController {
    pub const fn new(mode: RefreshMode) -> Self {
        Self { mode }
    }

    pub const fn mode(&self) -> RefreshMode {
        self.mode
    }

    /// Whether the manual refresh affordance is interactive.
    ///
    /// Always `false` in native mode.
    pub fn is_interactive(&self, armed: bool) -> bool {
        self.mode == RefreshMode::Manual && armed
    }

    /// Handle a completed pull gesture.
    pub fn pull(&self, armed: bool, session: &SessionSlot) -> RefreshOutcome {
        match self.mode {
            RefreshMode::Native => RefreshOutcome::Native,
            RefreshMode::Manual if !armed => RefreshOutcome::Disarmed,
            RefreshMode::Manual => match session.with_session(|session| session.reload()) {
                Some(()) => {
                    tracing::debug!("Reloading embedded browser page");
                    RefreshOutcome::Reloaded
                }
                None => RefreshOutcome::NoSession,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::back::tests::CountingSession;

    #[test]
    fn armed_only_at_top() {
        assert!(refresher_armed(0.0));
        assert!(!refresher_armed(0.5));
        assert!(!refresher_armed(120.0));
        assert!(!refresher_armed(-3.0));
    }

    #[test]
    fn manual_controller_is_interactive_only_when_armed() {
        let controller = RefreshController::new(RefreshMode::Manual);
        assert!(controller.is_interactive(true));
        assert!(!controller.is_interactive(false));
    }

    #[test]
    fn pull_reloads_once_when_armed() {
        let slot = SessionSlot::new();
        let session = CountingSession::default();
        slot.attach(session.clone());
        let controller = RefreshController::new(RefreshMode::Manual);

        assert_eq!(controller.pull(true, &slot), RefreshOutcome::Reloaded);
        assert_eq!(session.reload_calls.get(), 1);
        assert_eq!(session.back_calls.get(), 0);
    }

    #[test]
    fn pull_is_ignored_when_scrolled_down() {
        let slot = SessionSlot::new();
        let session = CountingSession::default();
        slot.attach(session.clone());
        let controller = RefreshController::new(RefreshMode::Manual);

        assert_eq!(
            controller.pull(refresher_armed(300.0), &slot),
            RefreshOutcome::Disarmed
        );
        assert_eq!(session.reload_calls.get(), 0);
    }

    #[test]
    fn pull_without_session_reports_it() {
        let controller = RefreshController::new(RefreshMode::Manual);
        assert_eq!(
            controller.pull(true, &SessionSlot::new()),
            RefreshOutcome::NoSession
        );
    }

    #[test]
    fn native_mode_is_inert() {
        let slot = SessionSlot::new();
        let session = CountingSession::default();
        slot.attach(session.clone());
        let controller = RefreshController::new(RefreshMode::Native);

        assert!(!controller.is_interactive(true));
        assert_eq!(controller.pull(true, &slot), RefreshOutcome::Native);
        assert_eq!(session.reload_calls.get(), 0);
    }
}
