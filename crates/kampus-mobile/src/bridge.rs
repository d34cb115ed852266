//! Page bridge between the native shell and the remote web app.
//!
//! The remote app is the webview's top-level document. [`page_script`] is
//! injected into every page it loads: it tracks the history position, streams
//! [`PageMessage`]s through `window.ipc` and draws the shell overlay that
//! [`OverlayRenderer`] scripts update.

use kampus_core::navigation::NavigationState;
use kampus_core::permissions::{PromptChoice, SettingsPrompt};
use kampus_core::refresh::RefreshMode;
use kampus_core::shell::SurfaceConfig;
use serde::{Deserialize, Serialize};

use crate::gesture::{MAX_INDICATOR_PX, PULL_THRESHOLD_PX};

const OPTIONS_PLACEHOLDER: &str = "__KAMPUS_OPTIONS__";
const MARKUP_PLACEHOLDER: &str = "__KAMPUS_MARKUP__";

/// Installed at document start in the top-level frame.
///
/// Every history entry the script sees is stamped with its position in
/// `history.state`, and the last position is kept in `sessionStorage` so a
/// full page load continues from it. `canGoBack` is `position > 0`.
const PAGE_SCRIPT: &str = r##"
(function () {
    if (window.top !== window || window.__kampus) {
        return;
    }
    const options = __KAMPUS_OPTIONS__;
    const INDEX_KEY = "__kampusIndex";
    const LAST_INDEX_KEY = "kampus:last-index";

    const post = (message) => {
        if (window.ipc && typeof window.ipc.postMessage === "function") {
            window.ipc.postMessage(JSON.stringify(message));
        }
    };

    const readIndex = (state) =>
        state && typeof state === "object" && typeof state[INDEX_KEY] === "number"
            ? state[INDEX_KEY]
            : null;
    const withIndex = (state, at) => {
        if (state === undefined || state === null) {
            return { [INDEX_KEY]: at };
        }
        if (typeof state === "object" && !Array.isArray(state)) {
            return Object.assign({}, state, { [INDEX_KEY]: at });
        }
        return state;
    };
    const remember = (at) => {
        try {
            sessionStorage.setItem(LAST_INDEX_KEY, String(at));
        } catch (_) {}
    };
    const recall = () => {
        try {
            const raw = sessionStorage.getItem(LAST_INDEX_KEY);
            const value = raw === null ? NaN : Number(raw);
            return Number.isFinite(value) ? value : null;
        } catch (_) {
            return null;
        }
    };

    const nativePush = history.pushState.bind(history);
    const nativeReplace = history.replaceState.bind(history);

    let index = readIndex(history.state);
    if (index === null) {
        const last = recall();
        index = last !== null && history.length > 1 ? last + 1 : 0;
    }
    const stamp = () => {
        try {
            nativeReplace(withIndex(history.state, index), "");
        } catch (_) {}
        remember(index);
    };
    stamp();

    const report = (fresh) => {
        post({
            type: "navigation",
            url: location.href,
            canGoBack: index > 0,
            title: document.title || null,
            fresh: fresh,
        });
    };

    history.pushState = function (state, title, url) {
        const next = index + 1;
        nativePush(withIndex(state, next), title, url);
        index = next;
        remember(index);
        report(false);
    };
    history.replaceState = function (state, title, url) {
        nativeReplace(withIndex(state, index), title, url);
        report(false);
    };
    window.addEventListener("popstate", (event) => {
        const restored = readIndex(event.state);
        if (restored === null) {
            // Fragment navigation adds an entry without state.
            index += 1;
            stamp();
        } else {
            index = restored;
            remember(index);
        }
        report(false);
    });
    document.addEventListener("DOMContentLoaded", () => report(false));

    let scrollQueued = false;
    window.addEventListener("scroll", () => {
        if (scrollQueued) {
            return;
        }
        scrollQueued = true;
        requestAnimationFrame(() => {
            scrollQueued = false;
            post({ type: "scroll", y: Math.max(0, window.scrollY || 0) });
        });
    }, { passive: true });

    const host = document.createElement("kampus-overlay");
    host.style.cssText = "position:fixed;inset:0;z-index:2147483647;pointer-events:none;";
    const root = host.attachShadow({ mode: "closed" });
    root.innerHTML = __KAMPUS_MARKUP__;
    const $ = (selector) => root.querySelector(selector);
    const loading = $(".loading");
    const pull = $(".pull");
    const back = $(".back");
    const backdrop = $(".backdrop");
    loading.style.background = options.loadingBackground;
    $(".loading .spinner").style.borderTopColor = options.indicatorColor;
    $(".pull .spinner").style.borderTopColor = options.accentColor;
    back.style.background = options.accentColor;
    $(".settings").style.color = options.accentColor;

    let view = options.initial;
    const draw = () => {
        if (!host.isConnected && document.documentElement) {
            document.documentElement.appendChild(host);
        }
        loading.hidden = !view.loading;
        back.hidden = !view.backVisible;
        pull.hidden = view.pullOffset <= 0;
        pull.style.transform = `translate(-50%, ${view.pullOffset}px)`;
        backdrop.hidden = !view.prompt;
        if (view.prompt) {
            $("h2").textContent = view.prompt.title;
            $("p").textContent = view.prompt.message;
            $(".cancel").textContent = view.prompt.cancelLabel;
            $(".settings").textContent = view.prompt.settingsLabel;
        }
    };
    back.addEventListener("click", () => post({ type: "backButton" }));
    $(".cancel").addEventListener("click", () => post({ type: "promptChoice", choice: "cancel" }));
    $(".settings").addEventListener("click", () => post({ type: "promptChoice", choice: "openSettings" }));

    const touchY = (event) => {
        const touch = event.touches[0] || event.changedTouches[0];
        return touch ? touch.clientY : 0;
    };
    let pullStart = null;
    let pullDistance = 0;
    let lastY = 0;
    let moveQueued = false;
    window.addEventListener("touchstart", (event) => {
        if (event.touches.length !== 1 || (window.scrollY || 0) > 0) {
            pullStart = null;
            return;
        }
        pullStart = touchY(event);
        lastY = pullStart;
        pullDistance = 0;
        if (!options.nativeRefresh) {
            post({ type: "touch", phase: "start", y: pullStart });
        }
    }, { passive: true });
    window.addEventListener("touchmove", (event) => {
        if (pullStart === null) {
            return;
        }
        lastY = touchY(event);
        if (options.nativeRefresh) {
            pullDistance = Math.max(0, lastY - pullStart);
            view = Object.assign({}, view, { pullOffset: Math.min(pullDistance, options.maxPull) });
            draw();
            return;
        }
        if (moveQueued) {
            return;
        }
        moveQueued = true;
        requestAnimationFrame(() => {
            moveQueued = false;
            post({ type: "touch", phase: "move", y: lastY });
        });
    }, { passive: true });
    const endPull = () => {
        if (pullStart === null) {
            return;
        }
        pullStart = null;
        if (!options.nativeRefresh) {
            post({ type: "touch", phase: "end", y: lastY });
            return;
        }
        const triggered = pullDistance >= options.pullThreshold;
        view = Object.assign({}, view, { pullOffset: 0 });
        draw();
        if (triggered) {
            location.reload();
        }
    };
    window.addEventListener("touchend", endPull, { passive: true });
    window.addEventListener("touchcancel", endPull, { passive: true });

    window.__kampus = {
        render(next) {
            view = next;
            draw();
        },
    };
    draw();
    report(true);
})();
"##;

const OVERLAY_MARKUP: &str = r#"<style>
[hidden] { display: none !important; }
.loading { position: fixed; inset: 0; display: flex; align-items: center; justify-content: center; pointer-events: auto; }
.spinner { width: 36px; height: 36px; border-radius: 50%; border: 4px solid rgba(255, 255, 255, 0.35); animation: spin 0.8s linear infinite; }
.pull { position: fixed; top: 8px; left: 50%; width: 40px; height: 40px; border-radius: 50%; display: flex; align-items: center; justify-content: center; box-shadow: 0 2px 6px rgba(0, 0, 0, 0.25); background: #fff; }
.pull .spinner { width: 20px; height: 20px; border-width: 3px; border-color: rgba(0, 0, 0, 0.1); }
.back { position: fixed; left: 16px; bottom: 24px; width: 48px; height: 48px; border: 0; border-radius: 50%; color: #fff; font-size: 24px; line-height: 48px; box-shadow: 0 2px 8px rgba(0, 0, 0, 0.3); pointer-events: auto; }
.backdrop { position: fixed; inset: 0; background: rgba(0, 0, 0, 0.4); display: flex; align-items: center; justify-content: center; pointer-events: auto; }
.dialog { width: min(320px, 85vw); background: #fff; border-radius: 12px; padding: 20px; font-family: system-ui, sans-serif; color: #222; }
.dialog h2 { margin: 0 0 8px; font-size: 18px; }
.dialog p { margin: 0 0 16px; font-size: 15px; line-height: 1.4; }
.actions { display: flex; justify-content: flex-end; gap: 8px; }
.actions button { border: 0; background: none; font-size: 15px; font-weight: 600; padding: 8px 12px; }
@keyframes spin { to { transform: rotate(360deg); } }
</style>
<div class="loading"><div class="spinner"></div></div>
<div class="pull" hidden><div class="spinner"></div></div>
<button class="back" type="button" aria-label="Back" hidden>&#8592;</button>
<div class="backdrop" hidden>
  <div class="dialog" role="alertdialog">
    <h2></h2>
    <p></p>
    <div class="actions">
      <button class="cancel" type="button"></button>
      <button class="settings" type="button"></button>
    </div>
  </div>
</div>"#;

/// Page script settings, inlined as JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOptions {
    /// The page runs its own pull-to-refresh instead of forwarding touches.
    pub native_refresh: bool,
    pub pull_threshold: f64,
    pub max_pull: f64,
    pub accent_color: String,
    pub loading_background: String,
    pub indicator_color: String,
    /// Overlay drawn before the shell renders anything.
    pub initial: OverlayView,
}

impl PageOptions {
    pub fn new(surface: &SurfaceConfig, accent_color: &str) -> Self {
        Self {
            native_refresh: surface.refresh_mode == RefreshMode::Native,
            pull_threshold: PULL_THRESHOLD_PX,
            max_pull: MAX_INDICATOR_PX,
            accent_color: accent_color.to_string(),
            loading_background: surface.loading_background.clone(),
            indicator_color: surface.loading_indicator_color.clone(),
            initial: OverlayView::initial(),
        }
    }
}

/// Build the script injected into every page.
pub fn page_script(options: &PageOptions) -> serde_json::Result<String> {
    let options = serde_json::to_string(options)?;
    let markup = serde_json::to_string(OVERLAY_MARKUP)?;
    Ok(PAGE_SCRIPT
        .replace(OPTIONS_PLACEHOLDER, &options)
        .replace(MARKUP_PLACEHOLDER, &markup))
}

/// Messages posted by the page script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageMessage {
    #[serde(rename_all = "camelCase")]
    Navigation {
        url: String,
        can_go_back: bool,
        #[serde(default)]
        title: Option<String>,
        /// First report from a newly loaded document.
        #[serde(default)]
        fresh: bool,
    },
    Scroll {
        y: f64,
    },
    Touch {
        phase: TouchPhase,
        #[serde(default)]
        y: f64,
    },
    BackButton,
    PromptChoice {
        choice: PromptChoice,
    },
}

impl PageMessage {
    pub fn parse(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

/// Commands sent to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCommand {
    GoBack,
    Reload,
}

impl PageCommand {
    pub const fn script(self) -> &'static str {
        match self {
            Self::GoBack => "history.back();",
            Self::Reload => "location.reload();",
        }
    }
}

/// Whether the webview may load `url` itself.
///
/// Everything else (`tel:`, `mailto:`, store links, custom schemes) is
/// refused.
pub fn is_web_navigation(url: &str) -> bool {
    let scheme = url.split_once(':').map_or("", |(scheme, _)| scheme);
    ["https", "http", "about", "blob", "data"]
        .iter()
        .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
}

/// Merges page load events and page script reports into snapshots.
///
/// Load events own `loading`; the page script owns `can_go_back` and `title`.
#[derive(Debug, Clone)]
pub struct NavigationFeed {
    current: NavigationState,
}

impl Default for NavigationFeed {
    fn default() -> Self {
        Self {
            current: NavigationState {
                loading: true,
                ..NavigationState::new(String::new(), false)
            },
        }
    }
}

impl NavigationFeed {
    pub fn load_started(&mut self, url: String) -> NavigationState {
        self.current.url = url;
        self.current.loading = true;
        self.current.clone()
    }

    pub fn load_finished(&mut self, url: String) -> NavigationState {
        self.current.url = url;
        self.current.loading = false;
        self.current.clone()
    }

    pub fn page_reported(
        &mut self,
        url: String,
        can_go_back: bool,
        title: Option<String>,
    ) -> NavigationState {
        self.current.url = url;
        self.current.can_go_back = can_go_back;
        self.current.title = title;
        self.current.clone()
    }
}

/// Everything the page overlay draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayView {
    pub back_visible: bool,
    pub loading: bool,
    pub pull_offset: f64,
    pub prompt: Option<PromptView>,
}

impl OverlayView {
    pub const fn initial() -> Self {
        Self {
            back_visible: false,
            loading: true,
            pull_offset: 0.0,
            prompt: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptView {
    pub title: &'static str,
    pub message: &'static str,
    pub cancel_label: &'static str,
    pub settings_label: &'static str,
}

impl From<&SettingsPrompt> for PromptView {
    fn from(prompt: &SettingsPrompt) -> Self {
        Self {
            title: prompt.title,
            message: prompt.message,
            cancel_label: prompt.cancel_label,
            settings_label: prompt.settings_label,
        }
    }
}

/// Produces overlay scripts, skipping views the page already shows.
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    shown: Option<OverlayView>,
}

impl OverlayRenderer {
    /// A new document was loaded; it starts from the initial view.
    pub fn invalidate(&mut self) {
        self.shown = None;
    }

    pub fn next(&mut self, view: OverlayView) -> Option<String> {
        if self.shown.as_ref() == Some(&view) {
            return None;
        }
        let payload = match serde_json::to_string(&view) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!("Failed to serialize overlay view: {}", error);
                return None;
            }
        };
        self.shown = Some(view);
        Some(format!(
            "window.__kampus && window.__kampus.render({payload});"
        ))
    }
}
