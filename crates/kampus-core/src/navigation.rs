//! Navigation state tracking for the embedded browser surface.

use serde::{Deserialize, Serialize};

/// Snapshot reported by the embedded browser on every history change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    /// Current page URL.
    pub url: String,
    /// Whether the browser has a previous history entry.
    pub can_go_back: bool,
    /// Whether the page is still loading, when reported.
    #[serde(default)]
    pub loading: bool,
    /// Document title, when reported.
    #[serde(default)]
    pub title: Option<String>,
}

impl NavigationState {
    pub fn new(url: impl Into<String>, can_go_back: bool) -> Self {
        Self {
            url: url.into(),
            can_go_back,
            loading: false,
            title: None,
        }
    }
}

/// Status bar text style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusBarStyle {
    /// Light text, for dark backgrounds
    #[default]
    Light,
    /// Dark text, for light backgrounds
    Dark,
}

/// Platform status bar.
pub trait StatusBar {
    fn set_style(&self, style: StatusBarStyle);
}

/// Status bar that ignores every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatusBar;

impl StatusBar for NoopStatusBar {
    fn set_style(&self, _style: StatusBarStyle) {}
}

/// Whether the custom back affordance should be shown for `state`.
///
/// Always hidden on the entry page, whatever the history says.
pub fn back_affordance_visible(state: &NavigationState, entry_url: &str) -> bool {
    state.can_go_back && state.url != entry_url
}

/// Derives back affordance visibility from navigation snapshots.
pub struct NavigationTracker<S> {
    entry_url: String,
    style: StatusBarStyle,
    status_bar: S,
}

impl<S: StatusBar> NavigationTracker<S> {
    pub fn new(entry_url: impl Into<String>, style: StatusBarStyle, status_bar: S) -> Self {
        Self {
            entry_url: entry_url.into(),
            style,
            status_bar,
        }
    }

    /// Observe a snapshot and return whether the back affordance is visible.
    ///
    /// The status bar style is re-applied on every snapshot; iOS resets it
    /// after some web navigations.
    pub fn observe(&self, state: &NavigationState) -> bool {
        self.status_bar.set_style(self.style);
        let visible = back_affordance_visible(state, &self.entry_url);
        tracing::debug!(
            url = %state.url,
            can_go_back = state.can_go_back,
            visible,
            "Navigation state changed"
        );
        visible
    }

    pub fn entry_url(&self) -> &str {
        &self.entry_url
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::ENTRY_URL;

    /// Status bar fake that records every applied style.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingStatusBar {
        pub(crate) applied: Rc<RefCell<Vec<StatusBarStyle>>>,
    }

    impl StatusBar for RecordingStatusBar {
        fn set_style(&self, style: StatusBarStyle) {
            self.applied.borrow_mut().push(style);
        }
    }

    #[test]
    fn entry_page_never_shows_back_affordance() {
        assert!(!back_affordance_visible(
            &NavigationState::new(ENTRY_URL, true),
            ENTRY_URL
        ));
        assert!(!back_affordance_visible(
            &NavigationState::new(ENTRY_URL, false),
            ENTRY_URL
        ));
    }

    #[test]
    fn other_pages_follow_history() {
        let dashboard = "https://akademi.etkinkampus.com/dashboard";
        assert!(back_affordance_visible(
            &NavigationState::new(dashboard, true),
            ENTRY_URL
        ));
        assert!(!back_affordance_visible(
            &NavigationState::new(dashboard, false),
            ENTRY_URL
        ));
    }

    #[test]
    fn entry_match_is_exact() {
        let with_query = format!("{ENTRY_URL}?next=/courses");
        assert!(back_affordance_visible(
            &NavigationState::new(with_query, true),
            ENTRY_URL
        ));
        assert!(back_affordance_visible(
            &NavigationState::new(format!("{ENTRY_URL}/"), true),
            ENTRY_URL
        ));
    }

    #[test]
    fn tracker_applies_status_bar_style_on_every_snapshot() {
        let status_bar = RecordingStatusBar::default();
        let tracker = NavigationTracker::new(ENTRY_URL, StatusBarStyle::Light, status_bar.clone());

        assert!(!tracker.observe(&NavigationState::new(ENTRY_URL, false)));
        assert!(tracker.observe(&NavigationState::new(
            "https://akademi.etkinkampus.com/dashboard",
            true
        )));
        assert!(!tracker.observe(&NavigationState::new(ENTRY_URL, true)));

        assert_eq!(
            *status_bar.applied.borrow(),
            vec![StatusBarStyle::Light; 3]
        );
    }

    #[test]
    fn navigation_state_deserializes_bridge_payload() {
        let state: NavigationState = serde_json::from_str(
            r#"{"url":"https://akademi.etkinkampus.com/dashboard","canGoBack":true}"#,
        )
        .unwrap();

        assert_eq!(
            state,
            NavigationState::new("https://akademi.etkinkampus.com/dashboard", true)
        );
    }
}
