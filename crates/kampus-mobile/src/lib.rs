//! Kampus Shell mobile application
//!
//! A native window hosting the Etkin Kampus Akademi web app in a webview,
//! with the shell overlay (back button, loading screen, pull-to-refresh,
//! settings prompts) and the Android/iOS glue behind it.
#![cfg_attr(not(any(target_os = "android", target_os = "ios")), allow(dead_code))]

mod bridge;
mod gesture;
mod host;
mod native;
mod paths;
#[cfg(any(target_os = "android", target_os = "ios"))]
mod surface;

#[cfg(any(target_os = "android", target_os = "ios"))]
fn init_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{registry, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kampus=info,kampus_core=info,kampus_mobile=info"));

    #[cfg(target_os = "android")]
    let platform_layer = paranoid_android::layer("kampus");
    #[cfg(target_os = "ios")]
    let platform_layer = tracing_oslog::OsLogger::new("com.etkinkampus.akademi", "shell");

    let _ = registry().with(filter).with(platform_layer).try_init();
}

#[cfg(any(target_os = "android", target_os = "ios"))]
fn run_shell() {
    dotenvy::dotenv().ok();
    init_logging();
    tracing::info!("Starting Kampus mobile shell...");

    if let Err(error) = surface::run() {
        tracing::error!("Kampus shell failed to start: {}", error);
    }
}

/// Android: registers the activity bindings that start [`run_shell`] on
/// the app's event loop thread. iOS: called from `main` and never returns.
#[cfg(any(target_os = "android", target_os = "ios"))]
#[no_mangle]
#[inline(never)]
#[allow(unsafe_code)]
pub extern "C" fn start_app() {
    #[cfg(target_os = "android")]
    {
        tao::android_binding!(com_etkinkampus, akademi, WryActivity, wry::android_setup, run_shell);
        wry::android_binding!(com_etkinkampus, akademi);
    }
    #[cfg(target_os = "ios")]
    run_shell();
}
