//! Shell configuration.
//!
//! Everything the shell needs is compiled in. `ShellConfig::default()` carries
//! the shipped values; only the prompt locale is picked at startup.

use serde::{Deserialize, Serialize};

use crate::navigation::StatusBarStyle;

/// The only content source. Also the login page, where back navigation is
/// suppressed.
pub const ENTRY_URL: &str = "https://akademi.etkinkampus.com/login";

/// Brand accent used for the loading overlay and the refresh spinner.
pub const ACCENT_COLOR: &str = "#FF7300";

/// Language used for user-facing prompt copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Turkish, the shipped copy
    #[default]
    Tr,
    /// English
    En,
}

impl Locale {
    /// Pick a locale from a device language tag such as `en-US` or `en_US.UTF-8`.
    ///
    /// Anything that is not English falls back to Turkish.
    pub fn from_language_tag(tag: &str) -> Self {
        let lang = tag
            .split(['_', '-', '.'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if lang == "en" {
            Self::En
        } else {
            Self::Tr
        }
    }
}

/// Static configuration for one shell screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Start URL and back-suppressed entry page.
    pub entry_url: String,
    /// Status bar text style re-asserted on every navigation.
    pub status_bar_style: StatusBarStyle,
    /// Accent colour (CSS hex).
    pub accent_color: String,
    /// Prompt language.
    pub locale: Locale,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            entry_url: ENTRY_URL.to_string(),
            status_bar_style: StatusBarStyle::Light,
            accent_color: ACCENT_COLOR.to_string(),
            locale: Locale::Tr,
        }
    }
}

impl ShellConfig {
    #[must_use]
    pub const fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_uses_shipped_values() {
        let config = ShellConfig::default();
        assert_eq!(config.entry_url, ENTRY_URL);
        assert_eq!(config.status_bar_style, StatusBarStyle::Light);
        assert_eq!(config.accent_color, "#FF7300");
        assert_eq!(config.locale, Locale::Tr);
    }

    #[test]
    fn locale_from_language_tag() {
        assert_eq!(Locale::from_language_tag("en_US.UTF-8"), Locale::En);
        assert_eq!(Locale::from_language_tag("EN-gb"), Locale::En);
        assert_eq!(Locale::from_language_tag("tr_TR.UTF-8"), Locale::Tr);
        assert_eq!(Locale::from_language_tag("de_DE"), Locale::Tr);
        assert_eq!(Locale::from_language_tag(""), Locale::Tr);
    }

    #[test]
    fn device_language_tags_pick_prompt_locale() {
        let picked = |tag: &str| ShellConfig::default().with_locale(Locale::from_language_tag(tag));

        assert_eq!(picked("en-US").locale, Locale::En);
        assert_eq!(picked("en").locale, Locale::En);
        assert_eq!(picked("tr-TR").locale, Locale::Tr);
        assert_eq!(picked("zh-Hans-CN").locale, Locale::Tr);
    }
}
