//! Event handling for the native shell, independent of the webview toolkit.
//!
//! Webview callbacks, JNI entry points and the permission thread all turn into
//! [`UserEvent`]s on the event loop; [`Host`] feeds them to the [`Shell`] and
//! pushes the resulting overlay to the page.

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::mpsc::SyncSender;

use kampus_core::navigation::StatusBar;
use kampus_core::permissions::{Permission, PermissionStatus, PromptChoice, SettingsPrompt};
use kampus_core::refresh::RefreshMode;
use kampus_core::shell::SurfaceConfig;
use kampus_core::{BackDisposition, BrowserSession, Shell, ShellEvent};
use tokio::sync::oneshot;

use crate::bridge::{
    is_web_navigation, NavigationFeed, OverlayRenderer, OverlayView, PageCommand, PageMessage,
    PromptView, TouchPhase,
};
use crate::gesture::PullTracker;

/// The live webview, as the host drives it.
pub trait PageSurface {
    fn evaluate(&self, script: &str);
    fn load_url(&self, url: &str);
    fn open_settings(&self);
}

/// Lends the webview to the core as its browser session.
pub struct SurfaceSession<V>(Rc<V>);

impl<V: PageSurface> BrowserSession for SurfaceSession<V> {
    fn go_back(&mut self) {
        self.0.evaluate(PageCommand::GoBack.script());
    }

    fn reload(&mut self) {
        self.0.evaluate(PageCommand::Reload.script());
    }
}

/// A settings prompt waiting for the user's answer in the overlay.
#[derive(Debug)]
pub struct PendingPrompt {
    pub prompt: SettingsPrompt,
    reply: oneshot::Sender<PromptChoice>,
}

impl PendingPrompt {
    pub fn new(prompt: SettingsPrompt) -> (Self, oneshot::Receiver<PromptChoice>) {
        let (reply, answer) = oneshot::channel();
        (Self { prompt, reply }, answer)
    }

    pub fn resolve(self, choice: PromptChoice) {
        let _ = self.reply.send(choice);
    }
}

#[derive(Debug)]
pub enum UserEvent {
    /// Raw IPC body posted by the page script.
    Page(String),
    PageLoad { url: String, finished: bool },
    /// `window.open` or a `target="_blank"` link.
    NewWindow(String),
    /// Android back key. The reply says whether the shell consumed it.
    HardwareBack(SyncSender<bool>),
    Prompt(PendingPrompt),
    PermissionResolved {
        permission: Permission,
        status: PermissionStatus,
    },
    OpenSettings,
}

pub struct Host<V, S> {
    shell: Shell<S>,
    surface: Rc<V>,
    surface_config: SurfaceConfig,
    feed: NavigationFeed,
    pull: PullTracker,
    pull_offset: f64,
    prompts: VecDeque<PendingPrompt>,
    overlay: OverlayRenderer,
}

impl<V: PageSurface + 'static, S: StatusBar> Host<V, S> {
    pub fn new(shell: Shell<S>, surface: Rc<V>) -> Self {
        shell.attach_session(SurfaceSession(Rc::clone(&surface)));
        Self {
            surface_config: shell.surface_config(),
            shell,
            surface,
            feed: NavigationFeed::default(),
            pull: PullTracker::default(),
            pull_offset: 0.0,
            prompts: VecDeque::new(),
            overlay: OverlayRenderer::default(),
        }
    }

    #[cfg(test)]
    pub const fn shell(&self) -> &Shell<S> {
        &self.shell
    }

    pub fn handle(&mut self, event: UserEvent) {
        match event {
            UserEvent::Page(body) => self.on_page_message(&body),
            UserEvent::PageLoad { url, finished } => {
                let snapshot = if finished {
                    self.feed.load_finished(url)
                } else {
                    self.feed.load_started(url)
                };
                self.shell.handle(ShellEvent::NavigationChanged(snapshot));
            }
            UserEvent::NewWindow(url) => {
                if self.surface_config.javascript_can_open_windows && is_web_navigation(&url) {
                    self.surface.load_url(&url);
                } else {
                    tracing::debug!(%url, "Dropped new window request");
                }
            }
            UserEvent::HardwareBack(reply) => {
                let disposition = self.shell.hardware_back();
                tracing::debug!(?disposition, "Hardware back");
                let _ = reply.send(disposition == BackDisposition::Handled);
            }
            UserEvent::Prompt(pending) => self.prompts.push_back(pending),
            UserEvent::PermissionResolved { permission, status } => {
                self.shell
                    .handle(ShellEvent::PermissionResolved { permission, status });
            }
            UserEvent::OpenSettings => self.surface.open_settings(),
        }
        self.render();
    }

    fn on_page_message(&mut self, body: &str) {
        let message = match PageMessage::parse(body) {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!("Ignoring page message: {}", error);
                return;
            }
        };
        match message {
            PageMessage::Navigation {
                url,
                can_go_back,
                title,
                fresh,
            } => {
                if fresh {
                    self.overlay.invalidate();
                }
                let snapshot = self.feed.page_reported(url, can_go_back, title);
                self.shell.handle(ShellEvent::NavigationChanged(snapshot));
            }
            PageMessage::Scroll { y } => self.shell.handle(ShellEvent::ScrollChanged { offset: y }),
            PageMessage::Touch { phase, y } => self.on_touch(phase, y),
            PageMessage::BackButton => {
                let went_back = self.shell.back_button_pressed();
                tracing::debug!(went_back, "Back button pressed");
            }
            PageMessage::PromptChoice { choice } => {
                if let Some(pending) = self.prompts.pop_front() {
                    pending.resolve(choice);
                }
            }
        }
    }

    fn on_touch(&mut self, phase: TouchPhase, y: f64) {
        if self.surface_config.refresh_mode != RefreshMode::Manual {
            return;
        }
        match phase {
            TouchPhase::Start => self.pull.begin(y, self.shell.refresh_interactive()),
            TouchPhase::Move => self.pull_offset = self.pull.update(y),
            TouchPhase::End => {
                self.pull_offset = 0.0;
                if self.pull.finish() {
                    let outcome = self.shell.pull_to_refresh();
                    tracing::debug!(?outcome, "Pull to refresh");
                }
            }
        }
    }

    fn render(&mut self) {
        let view = OverlayView {
            back_visible: self.shell.back_visible(),
            loading: self.shell.state().loading,
            pull_offset: self.pull_offset,
            prompt: self.prompts.front().map(|pending| PromptView::from(&pending.prompt)),
        };
        if let Some(script) = self.overlay.next(view) {
            self.surface.evaluate(&script);
        }
    }

    /// Drop pending prompts (their flows resolve as cancelled) and release
    /// the hardware back subscription.
    pub fn teardown(&mut self) {
        self.prompts.clear();
        self.shell.teardown();
    }
}
