//! Platform selection and embedded browser surface configuration.

use serde::{Deserialize, Serialize};

use crate::config::ShellConfig;
use crate::refresh::RefreshMode;

/// Target mobile platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    /// Platform this binary was built for. Non-mobile hosts behave like Android.
    pub const fn current() -> Self {
        if cfg!(target_os = "ios") {
            Self::Ios
        } else {
            Self::Android
        }
    }

    /// The iOS surface runs its own pull-to-refresh; Android pulls go through
    /// the shell.
    pub const fn refresh_mode(self) -> RefreshMode {
        match self {
            Self::Ios => RefreshMode::Native,
            Self::Android => RefreshMode::Manual,
        }
    }

    pub const fn has_hardware_back(self) -> bool {
        matches!(self, Self::Android)
    }
}

/// How the embedded browser surface should be set up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfaceConfig {
    pub source_url: String,
    pub refresh_mode: RefreshMode,
    /// Swipe back/forward through history. Only honored on iOS.
    pub back_forward_gestures: bool,
    /// `window.open` and `target="_blank"` load in place instead of being dropped.
    pub javascript_can_open_windows: bool,
    pub loading_background: String,
    pub loading_indicator_color: String,
    /// Status bar background, where the platform lets the app paint it.
    pub status_bar_background: Option<String>,
}

impl SurfaceConfig {
    pub fn for_platform(platform: Platform, config: &ShellConfig) -> Self {
        let (loading_indicator_color, status_bar_background) = match platform {
            Platform::Ios => (config.accent_color.clone(), None),
            Platform::Android => ("#ffffff".to_string(), Some(config.accent_color.clone())),
        };
        Self {
            source_url: config.entry_url.clone(),
            refresh_mode: platform.refresh_mode(),
            back_forward_gestures: true,
            javascript_can_open_windows: true,
            loading_background: config.accent_color.clone(),
            loading_indicator_color,
            status_bar_background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENTRY_URL;

    #[test]
    fn ios_uses_native_refresh() {
        let surface = SurfaceConfig::for_platform(Platform::Ios, &ShellConfig::default());

        assert_eq!(surface.refresh_mode, RefreshMode::Native);
        assert_eq!(surface.source_url, ENTRY_URL);
        assert_eq!(surface.status_bar_background, None);
        assert!(!Platform::Ios.has_hardware_back());
    }

    #[test]
    fn android_uses_manual_refresh_scaffolding() {
        let surface = SurfaceConfig::for_platform(Platform::Android, &ShellConfig::default());

        assert_eq!(surface.refresh_mode, RefreshMode::Manual);
        assert_eq!(surface.loading_indicator_color, "#ffffff");
        assert_eq!(surface.status_bar_background.as_deref(), Some("#FF7300"));
        assert!(Platform::Android.has_hardware_back());
    }

    #[test]
    fn both_platforms_open_windows_in_place_over_accent_overlay() {
        for platform in [Platform::Ios, Platform::Android] {
            let surface = SurfaceConfig::for_platform(platform, &ShellConfig::default());
            assert!(surface.back_forward_gestures);
            assert!(surface.javascript_can_open_windows);
            assert_eq!(surface.loading_background, "#FF7300");
        }
    }
}
