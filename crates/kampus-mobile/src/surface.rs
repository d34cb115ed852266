//! Native window and webview for the shell.
//!
//! The remote app is the webview's top-level document, so its own URL and
//! history drive the shell. Webview callbacks, the permission thread and the
//! Android back key all reach [`Host`] as [`UserEvent`]s on the event loop.

use std::rc::Rc;

use kampus_core::first_launch::{detect_first_launch, FileStore};
use kampus_core::navigation::{StatusBar, StatusBarStyle};
use kampus_core::permissions::{
    Permission, PermissionApi, PermissionPrimer, PermissionStatus, PromptChoice, SettingsPrompt,
    SettingsPrompter,
};
use kampus_core::shell::SurfaceConfig;
use kampus_core::{Locale, Platform, Shell, ShellConfig};
use tao::event::Event;
use tao::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use tao::window::{Window, WindowBuilder};
use thiserror::Error;
use wry::{PageLoadEvent, WebView, WebViewBuilder};

use crate::bridge::{is_web_navigation, page_script, PageOptions};
use crate::host::{Host, PageSurface, PendingPrompt, UserEvent};
use crate::native;
use crate::paths::shell_store_path;

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("failed to create window: {0}")]
    Window(#[from] tao::error::OsError),

    #[error("failed to create webview: {0}")]
    WebView(#[from] wry::Error),

    #[error("failed to build page script: {0}")]
    Script(#[from] serde_json::Error),
}

/// Build the window and webview, then run the event loop. Returns only on
/// setup failure.
pub fn run() -> Result<(), SurfaceError> {
    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();
    #[cfg(target_os = "android")]
    native::install_back_forwarding(proxy.clone());

    let locale = native::device_locale()
        .map(|tag| Locale::from_language_tag(&tag))
        .unwrap_or_default();
    let config = ShellConfig::default().with_locale(locale);
    let platform = Platform::current();
    let surface_config = SurfaceConfig::for_platform(platform, &config);
    tracing::info!(?platform, ?locale, "Starting shell surface");

    let window = WindowBuilder::new()
        .with_title("Etkin Kampüs")
        .build(&event_loop)?;
    let webview = build_webview(&window, &surface_config, &config, &proxy)?;

    let status_bar = NativeStatusBar {
        background: surface_config.status_bar_background.clone(),
    };
    let shell = Shell::new(platform, config, status_bar);
    let mut host = Host::new(shell, Rc::new(NativeSurface { webview }));

    let first_launch = detect_first_launch(&FileStore::new(shell_store_path()));
    spawn_permission_priming(proxy, first_launch, locale);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        let _ = &window;
        match event {
            Event::UserEvent(event) => host.handle(event),
            Event::LoopDestroyed => host.teardown(),
            _ => {}
        }
    })
}

fn build_webview(
    window: &Window,
    surface: &SurfaceConfig,
    config: &ShellConfig,
    proxy: &EventLoopProxy<UserEvent>,
) -> Result<WebView, SurfaceError> {
    let script = page_script(&PageOptions::new(surface, &config.accent_color))?;
    let ipc_events = proxy.clone();
    let load_events = proxy.clone();
    let window_events = proxy.clone();

    let webview = WebViewBuilder::new()
        .with_url(&surface.source_url)
        .with_initialization_script(&script)
        .with_back_forward_navigation_gestures(surface.back_forward_gestures)
        .with_ipc_handler(move |request: wry::http::Request<String>| {
            let _ = ipc_events.send_event(UserEvent::Page(request.into_body()));
        })
        .with_on_page_load_handler(move |event, url| {
            let finished = matches!(event, PageLoadEvent::Finished);
            let _ = load_events.send_event(UserEvent::PageLoad { url, finished });
        })
        .with_navigation_handler(|url| {
            let allowed = is_web_navigation(&url);
            if !allowed {
                tracing::debug!(%url, "Blocked navigation outside the web surface");
            }
            allowed
        })
        .with_new_window_req_handler(move |url| {
            let _ = window_events.send_event(UserEvent::NewWindow(url));
            false
        })
        .build(window)?;
    Ok(webview)
}

struct NativeSurface {
    webview: WebView,
}

impl PageSurface for NativeSurface {
    fn evaluate(&self, script: &str) {
        if let Err(error) = self.webview.evaluate_script(script) {
            tracing::warn!("Failed to evaluate page script: {}", error);
        }
    }

    fn load_url(&self, url: &str) {
        if let Err(error) = self.webview.load_url(url) {
            tracing::warn!("Failed to load {}: {}", url, error);
        }
    }

    fn open_settings(&self) {
        native::open_settings();
    }
}

struct NativeStatusBar {
    background: Option<String>,
}

impl StatusBar for NativeStatusBar {
    fn set_style(&self, style: StatusBarStyle) {
        native::apply_status_bar(style, self.background.as_deref());
    }
}

struct NativePermissions {
    events: EventLoopProxy<UserEvent>,
}

impl PermissionApi for NativePermissions {
    async fn check(&self, permission: Permission) -> PermissionStatus {
        native::check_permission(permission)
    }

    async fn request(&self, permission: Permission) -> PermissionStatus {
        native::request_permission(permission).await
    }

    fn open_settings(&self) {
        let _ = self.events.send_event(UserEvent::OpenSettings);
    }
}

/// Shows settings prompts in the page overlay and waits for the tap.
struct OverlayPrompter {
    events: EventLoopProxy<UserEvent>,
}

impl SettingsPrompter for OverlayPrompter {
    async fn present(&self, prompt: SettingsPrompt) -> PromptChoice {
        let (pending, answer) = PendingPrompt::new(prompt);
        if self.events.send_event(UserEvent::Prompt(pending)).is_err() {
            return PromptChoice::Cancel;
        }
        answer.await.unwrap_or(PromptChoice::Cancel)
    }
}

/// Prime permissions off the UI thread; results come back as events.
fn spawn_permission_priming(events: EventLoopProxy<UserEvent>, first_launch: bool, locale: Locale) {
    let spawned = std::thread::Builder::new()
        .name("kampus-permissions".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().build() {
                Ok(runtime) => runtime,
                Err(error) => {
                    tracing::warn!("Failed to start permission runtime: {}", error);
                    return;
                }
            };
            let primer = PermissionPrimer::new(
                NativePermissions {
                    events: events.clone(),
                },
                OverlayPrompter {
                    events: events.clone(),
                },
                locale,
            );
            for report in runtime.block_on(primer.prime(first_launch)) {
                let _ = events.send_event(UserEvent::PermissionResolved {
                    permission: report.permission,
                    status: report.status(),
                });
            }
        });
    if let Err(error) = spawned {
        tracing::warn!("Failed to spawn permission priming: {}", error);
    }
}
