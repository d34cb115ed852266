//! First-run permission priming for camera and photo-library access.
//!
//! Each permission is checked, requested when still undecided, and, when the
//! request is denied on the very first launch, followed by a prompt offering a
//! shortcut to the system settings. Denials are ordinary outcomes here; the
//! primer has no error path and never re-prompts.

use serde::{Deserialize, Serialize};

use crate::config::Locale;

/// Permissions primed on first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    Camera,
    MediaLibrary,
}

impl Permission {
    /// Every primed permission, in prompt order.
    pub const ALL: [Self; 2] = [Self::Camera, Self::MediaLibrary];

    /// Kebab-case name, as used on the platform bridge.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::MediaLibrary => "media-library",
        }
    }
}

/// Authorization status reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The device has no such feature.
    Unavailable,
    /// Blocked by policy (parental controls, MDM).
    Restricted,
    /// Partial access, e.g. a user-selected subset of photos.
    Limited,
    /// Denied permanently; the platform will not show its own dialog again.
    Blocked,
}

impl PermissionStatus {
    /// Whether a request should follow a check that returned this status.
    pub const fn needs_request(self) -> bool {
        !matches!(self, Self::Granted | Self::Unavailable)
    }
}

/// Platform permission subsystem.
#[allow(async_fn_in_trait)]
pub trait PermissionApi {
    async fn check(&self, permission: Permission) -> PermissionStatus;
    async fn request(&self, permission: Permission) -> PermissionStatus;
    fn open_settings(&self);
}

/// User's answer to a settings prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptChoice {
    Cancel,
    OpenSettings,
}

/// Localized copy for the two-option settings prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsPrompt {
    pub permission: Permission,
    pub title: &'static str,
    pub message: &'static str,
    pub cancel_label: &'static str,
    pub settings_label: &'static str,
}

impl SettingsPrompt {
    pub const fn for_permission(permission: Permission, locale: Locale) -> Self {
        let (title, cancel_label, settings_label) = match locale {
            Locale::Tr => ("Dikkat!", "İptal", "Ayarlara Git"),
            Locale::En => ("Heads up!", "Cancel", "Go to Settings"),
        };
        let message = match (permission, locale) {
            (Permission::Camera, Locale::Tr) => {
                "Profil fotoğrafı çekebilmek için uygulama ayarlarından kamera erişimine izin vermeyi unutmayın."
            }
            (Permission::MediaLibrary, Locale::Tr) => {
                "Galeriden profil fotoğrafı seçebilmek için uygulama ayarlarından izinleri düzenlemeyi unutmayın."
            }
            (Permission::Camera, Locale::En) => {
                "To take a profile photo, remember to allow camera access in the app settings."
            }
            (Permission::MediaLibrary, Locale::En) => {
                "To pick a profile photo from your gallery, remember to update the permissions in the app settings."
            }
        };
        Self {
            permission,
            title,
            message,
            cancel_label,
            settings_label,
        }
    }
}

/// Presents settings prompts to the user.
#[allow(async_fn_in_trait)]
pub trait SettingsPrompter {
    async fn present(&self, prompt: SettingsPrompt) -> PromptChoice;
}

/// What priming did for one permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimeReport {
    pub permission: Permission,
    /// Status from the initial check.
    pub checked: PermissionStatus,
    /// Status the request resolved to, when one was issued.
    pub requested: Option<PermissionStatus>,
    /// User's answer, when a settings prompt was shown.
    pub prompt: Option<PromptChoice>,
}

impl PrimeReport {
    /// Latest known status for the permission.
    pub fn status(&self) -> PermissionStatus {
        self.requested.unwrap_or(self.checked)
    }
}

/// Runs the permission priming flow.
pub struct PermissionPrimer<A, P> {
    api: A,
    prompter: P,
    locale: Locale,
}

impl<A: PermissionApi, P: SettingsPrompter> PermissionPrimer<A, P> {
    pub const fn new(api: A, prompter: P, locale: Locale) -> Self {
        Self {
            api,
            prompter,
            locale,
        }
    }

    /// Prime every permission. The flows run concurrently and do not depend
    /// on each other.
    pub async fn prime(&self, first_launch: bool) -> Vec<PrimeReport> {
        let (camera, media_library) = tokio::join!(
            self.prime_one(Permission::Camera, first_launch),
            self.prime_one(Permission::MediaLibrary, first_launch),
        );
        vec![camera, media_library]
    }

    async fn prime_one(&self, permission: Permission, first_launch: bool) -> PrimeReport {
        let checked = self.api.check(permission).await;
        let mut report = PrimeReport {
            permission,
            checked,
            requested: None,
            prompt: None,
        };
        if !checked.needs_request() {
            tracing::debug!(permission = permission.name(), ?checked, "Permission settled");
            return report;
        }

        let requested = self.api.request(permission).await;
        report.requested = Some(requested);
        tracing::info!(permission = permission.name(), ?requested, "Permission requested");
        if requested != PermissionStatus::Denied || !first_launch {
            return report;
        }

        let choice = self
            .prompter
            .present(SettingsPrompt::for_permission(permission, self.locale))
            .await;
        report.prompt = Some(choice);
        if choice == PromptChoice::OpenSettings {
            tracing::info!(permission = permission.name(), "Opening system settings");
            self.api.open_settings();
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::first_launch::{detect_first_launch, MemoryStore};

    #[derive(Default)]
    struct FakePermissions {
        checks: HashMap<Permission, PermissionStatus>,
        requests: HashMap<Permission, PermissionStatus>,
        requested: RefCell<Vec<Permission>>,
        settings_opened: Cell<usize>,
    }

    impl FakePermissions {
        fn with(
            mut self,
            permission: Permission,
            checked: PermissionStatus,
            requested: PermissionStatus,
        ) -> Self {
            self.checks.insert(permission, checked);
            self.requests.insert(permission, requested);
            self
        }
    }

    impl PermissionApi for &FakePermissions {
        async fn check(&self, permission: Permission) -> PermissionStatus {
            self.checks
                .get(&permission)
                .copied()
                .unwrap_or(PermissionStatus::Granted)
        }

        async fn request(&self, permission: Permission) -> PermissionStatus {
            self.requested.borrow_mut().push(permission);
            self.requests
                .get(&permission)
                .copied()
                .unwrap_or(PermissionStatus::Granted)
        }

        fn open_settings(&self) {
            self.settings_opened.set(self.settings_opened.get() + 1);
        }
    }

    struct FakePrompter {
        choice: PromptChoice,
        presented: RefCell<Vec<SettingsPrompt>>,
    }

    impl FakePrompter {
        fn answering(choice: PromptChoice) -> Self {
            Self {
                choice,
                presented: RefCell::new(Vec::new()),
            }
        }
    }

    impl SettingsPrompter for &FakePrompter {
        async fn present(&self, prompt: SettingsPrompt) -> PromptChoice {
            self.presented.borrow_mut().push(prompt);
            self.choice
        }
    }

    #[test]
    fn request_follows_every_unsettled_status() {
        assert!(!PermissionStatus::Granted.needs_request());
        assert!(!PermissionStatus::Unavailable.needs_request());
        assert!(PermissionStatus::Denied.needs_request());
        assert!(PermissionStatus::Restricted.needs_request());
        assert!(PermissionStatus::Limited.needs_request());
        assert!(PermissionStatus::Blocked.needs_request());
    }

    #[tokio::test]
    async fn first_launch_denial_shows_settings_prompt() {
        let api = FakePermissions::default().with(
            Permission::Camera,
            PermissionStatus::Denied,
            PermissionStatus::Denied,
        );
        let prompter = FakePrompter::answering(PromptChoice::Cancel);
        let primer = PermissionPrimer::new(&api, &prompter, Locale::Tr);

        let reports = primer.prime(true).await;

        let presented = prompter.presented.borrow();
        assert_eq!(presented.len(), 1);
        assert_eq!(presented[0].permission, Permission::Camera);
        assert_eq!(presented[0].title, "Dikkat!");
        assert_eq!(presented[0].settings_label, "Ayarlara Git");
        assert_eq!(reports[0].prompt, Some(PromptChoice::Cancel));
        assert_eq!(reports[0].status(), PermissionStatus::Denied);
        assert_eq!(api.settings_opened.get(), 0);
    }

    #[tokio::test]
    async fn later_launch_denial_is_silent() {
        let api = FakePermissions::default().with(
            Permission::Camera,
            PermissionStatus::Denied,
            PermissionStatus::Denied,
        );
        let prompter = FakePrompter::answering(PromptChoice::OpenSettings);
        let primer = PermissionPrimer::new(&api, &prompter, Locale::Tr);

        let reports = primer.prime(false).await;

        assert!(prompter.presented.borrow().is_empty());
        assert_eq!(*api.requested.borrow(), vec![Permission::Camera]);
        assert_eq!(reports[0].requested, Some(PermissionStatus::Denied));
        assert_eq!(reports[0].prompt, None);
    }

    #[tokio::test]
    async fn only_the_first_of_two_launches_prompts() {
        let store = MemoryStore::new();
        let api = FakePermissions::default().with(
            Permission::Camera,
            PermissionStatus::Denied,
            PermissionStatus::Denied,
        );
        let prompter = FakePrompter::answering(PromptChoice::Cancel);

        let first = PermissionPrimer::new(&api, &prompter, Locale::Tr)
            .prime(detect_first_launch(&store))
            .await;
        assert_eq!(prompter.presented.borrow().len(), 1);
        assert_eq!(first[0].prompt, Some(PromptChoice::Cancel));

        let second = PermissionPrimer::new(&api, &prompter, Locale::Tr)
            .prime(detect_first_launch(&store))
            .await;
        assert_eq!(prompter.presented.borrow().len(), 1);
        assert_eq!(second[0].requested, Some(PermissionStatus::Denied));
        assert_eq!(second[0].prompt, None);
        assert_eq!(
            *api.requested.borrow(),
            vec![Permission::Camera, Permission::Camera]
        );
    }

    #[tokio::test]
    async fn choosing_settings_opens_them() {
        let api = FakePermissions::default().with(
            Permission::MediaLibrary,
            PermissionStatus::Denied,
            PermissionStatus::Denied,
        );
        let prompter = FakePrompter::answering(PromptChoice::OpenSettings);
        let primer = PermissionPrimer::new(&api, &prompter, Locale::En);

        primer.prime(true).await;

        assert_eq!(api.settings_opened.get(), 1);
        let presented = prompter.presented.borrow();
        assert_eq!(presented[0].permission, Permission::MediaLibrary);
        assert_eq!(presented[0].cancel_label, "Cancel");
    }

    #[tokio::test]
    async fn granted_and_unavailable_skip_request() {
        let api = FakePermissions::default()
            .with(
                Permission::Camera,
                PermissionStatus::Granted,
                PermissionStatus::Denied,
            )
            .with(
                Permission::MediaLibrary,
                PermissionStatus::Unavailable,
                PermissionStatus::Denied,
            );
        let prompter = FakePrompter::answering(PromptChoice::OpenSettings);
        let primer = PermissionPrimer::new(&api, &prompter, Locale::Tr);

        let reports = primer.prime(true).await;

        assert!(api.requested.borrow().is_empty());
        assert!(prompter.presented.borrow().is_empty());
        assert_eq!(reports[0].status(), PermissionStatus::Granted);
        assert_eq!(reports[1].status(), PermissionStatus::Unavailable);
    }

    #[tokio::test]
    async fn blocked_request_is_not_prompted() {
        let api = FakePermissions::default().with(
            Permission::Camera,
            PermissionStatus::Denied,
            PermissionStatus::Blocked,
        );
        let prompter = FakePrompter::answering(PromptChoice::OpenSettings);
        let primer = PermissionPrimer::new(&api, &prompter, Locale::Tr);

        let reports = primer.prime(true).await;

        assert!(prompter.presented.borrow().is_empty());
        assert_eq!(reports[0].status(), PermissionStatus::Blocked);
    }

    #[tokio::test]
    async fn each_permission_is_primed_independently() {
        let api = FakePermissions::default()
            .with(
                Permission::Camera,
                PermissionStatus::Denied,
                PermissionStatus::Denied,
            )
            .with(
                Permission::MediaLibrary,
                PermissionStatus::Restricted,
                PermissionStatus::Denied,
            );
        let prompter = FakePrompter::answering(PromptChoice::Cancel);
        let primer = PermissionPrimer::new(&api, &prompter, Locale::Tr);

        let reports = primer.prime(true).await;

        assert_eq!(reports.len(), 2);
        let mut requested = api.requested.borrow().clone();
        requested.sort();
        assert_eq!(requested, vec![Permission::Camera, Permission::MediaLibrary]);
        assert_eq!(prompter.presented.borrow().len(), 2);
    }
}
