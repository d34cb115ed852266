//! Shell composition for a single screen.
//!
//! [`Shell`] owns the browser session slot and wires navigation tracking,
//! back interception and the refresh controller around the state reducer.
//! Platform crates feed it [`ShellEvent`]s and render from [`Shell::state`].

mod state;
mod surface;

pub use state::{reduce, ShellEvent, ShellState};
pub use surface::{Platform, SurfaceConfig};

use crate::back::{
    attempt_back, BackDisposition, BackHandlerRegistry, BackInterception, BrowserSession,
    InterceptionState, SessionSlot,
};
use crate::config::ShellConfig;
use crate::navigation::{NavigationTracker, StatusBar};
use crate::refresh::{RefreshController, RefreshOutcome};

pub struct Shell<S> {
    config: ShellConfig,
    platform: Platform,
    tracker: NavigationTracker<S>,
    state: ShellState,
    session: SessionSlot,
    back_handlers: BackHandlerRegistry,
    interception: BackInterception,
    refresh: RefreshController,
}

impl<S: StatusBar> Shell<S> {
    pub fn new(platform: Platform, config: ShellConfig, status_bar: S) -> Self {
        let session = SessionSlot::new();
        let back_handlers = BackHandlerRegistry::new();
        let interception = BackInterception::new(
            back_handlers.clone(),
            session.clone(),
            platform.has_hardware_back(),
        );
        let tracker = NavigationTracker::new(
            config.entry_url.clone(),
            config.status_bar_style,
            status_bar,
        );
        tracing::info!(?platform, entry_url = %config.entry_url, "Shell mounted");

        Self {
            refresh: RefreshController::new(platform.refresh_mode()),
            config,
            platform,
            tracker,
            state: ShellState::default(),
            session,
            back_handlers,
            interception,
        }
    }

    pub const fn state(&self) -> &ShellState {
        &self.state
    }

    pub const fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub const fn platform(&self) -> Platform {
        self.platform
    }

    pub const fn back_visible(&self) -> bool {
        self.state.back_visible
    }

    /// Whether the manual refresh affordance currently accepts pulls.
    pub fn refresh_interactive(&self) -> bool {
        self.refresh.is_interactive(self.state.refresher_armed)
    }

    pub const fn session(&self) -> &SessionSlot {
        &self.session
    }

    /// Registry the platform adapter feeds hardware back signals into.
    pub const fn back_handlers(&self) -> &BackHandlerRegistry {
        &self.back_handlers
    }

    pub const fn interception_state(&self) -> InterceptionState {
        self.interception.state()
    }

    pub fn attach_session(&self, session: impl BrowserSession + 'static) {
        self.session.attach(session);
    }

    pub fn detach_session(&self) {
        self.session.detach();
    }

    /// Apply one event: run its side effects, fold it into the state, then
    /// reconcile the hardware back subscription.
    pub fn handle(&mut self, event: ShellEvent) {
        tracing::trace!(event = event.tag(), "Shell event");
        if let ShellEvent::NavigationChanged(navigation) = &event {
            self.tracker.observe(navigation);
        }
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, &event, self.tracker.entry_url());
        self.interception.sync(self.state.back_visible);
    }

    /// Hardware back signal from the platform.
    pub fn hardware_back(&self) -> BackDisposition {
        self.back_handlers.dispatch()
    }

    /// Tap on the custom back button.
    pub fn back_button_pressed(&self) -> bool {
        attempt_back(&self.session)
    }

    /// Completed manual pull gesture.
    pub fn pull_to_refresh(&self) -> RefreshOutcome {
        self.refresh.pull(self.state.refresher_armed, &self.session)
    }

    pub fn surface_config(&self) -> SurfaceConfig {
        SurfaceConfig::for_platform(self.platform, &self.config)
    }

    /// Release the hardware back subscription and the browser session.
    pub fn teardown(&mut self) {
        self.interception.release();
        self.session.detach();
        tracing::info!("Shell torn down");
    }
}
