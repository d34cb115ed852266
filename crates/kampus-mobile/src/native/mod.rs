//! Platform permissions, status bar, settings deep link and device locale.
//!
//! Status mapping is shared and host-tested; the calls into Android (JNI) and
//! iOS (Objective-C runtime) live in the per-platform modules.

use kampus_core::permissions::{Permission, PermissionStatus};

#[cfg(target_os = "android")]
mod android;
#[cfg(target_os = "ios")]
mod ios;

#[cfg(target_os = "android")]
pub use android::{
    apply_status_bar, check_permission, device_locale, install_back_forwarding, open_settings,
    request_permission,
};
#[cfg(target_os = "ios")]
pub use ios::{apply_status_bar, check_permission, device_locale, open_settings, request_permission};

/// Photo access became `READ_MEDIA_IMAGES` in Android 13 (API 33).
const ANDROID_MEDIA_IMAGES_SDK: i32 = 33;

/// Android runtime permission for `permission` on API level `sdk_int`.
pub const fn android_permission(permission: Permission, sdk_int: i32) -> &'static str {
    match permission {
        Permission::Camera => "android.permission.CAMERA",
        Permission::MediaLibrary if sdk_int >= ANDROID_MEDIA_IMAGES_SDK => {
            "android.permission.READ_MEDIA_IMAGES"
        }
        Permission::MediaLibrary => "android.permission.READ_EXTERNAL_STORAGE",
    }
}

/// `checkSelfPermission` result. Android cannot tell "never asked" from
/// "denied" without asking, so both are `Denied`.
pub const fn android_check_status(granted: bool, available: bool) -> PermissionStatus {
    match (available, granted) {
        (false, _) => PermissionStatus::Unavailable,
        (true, true) => PermissionStatus::Granted,
        (true, false) => PermissionStatus::Denied,
    }
}

/// Result of a runtime permission request. A refusal the system will not ask
/// about again (no rationale after the dialog) is `Blocked`.
pub const fn android_request_status(granted: bool, can_ask_again: bool) -> PermissionStatus {
    match (granted, can_ask_again) {
        (true, _) => PermissionStatus::Granted,
        (false, true) => PermissionStatus::Denied,
        (false, false) => PermissionStatus::Blocked,
    }
}

/// `AVAuthorizationStatus`.
pub const fn apple_camera_status(raw: isize) -> PermissionStatus {
    match raw {
        0 => PermissionStatus::Denied,
        1 => PermissionStatus::Restricted,
        2 => PermissionStatus::Blocked,
        3 => PermissionStatus::Granted,
        _ => PermissionStatus::Unavailable,
    }
}

/// `PHAuthorizationStatus`.
pub const fn apple_photos_status(raw: isize) -> PermissionStatus {
    match raw {
        4 => PermissionStatus::Limited,
        other => apple_camera_status(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_permission_depends_on_api_level() {
        assert_eq!(
            android_permission(Permission::MediaLibrary, 34),
            "android.permission.READ_MEDIA_IMAGES"
        );
        assert_eq!(
            android_permission(Permission::MediaLibrary, 32),
            "android.permission.READ_EXTERNAL_STORAGE"
        );
        assert_eq!(android_permission(Permission::Camera, 21), "android.permission.CAMERA");
    }

    #[test]
    fn android_check_reports_missing_hardware() {
        assert_eq!(android_check_status(false, false), PermissionStatus::Unavailable);
        assert_eq!(android_check_status(true, false), PermissionStatus::Unavailable);
        assert_eq!(android_check_status(true, true), PermissionStatus::Granted);
        assert_eq!(android_check_status(false, true), PermissionStatus::Denied);
    }

    #[test]
    fn android_refusal_is_denied_until_the_system_stops_asking() {
        assert_eq!(android_request_status(true, false), PermissionStatus::Granted);
        assert_eq!(android_request_status(false, true), PermissionStatus::Denied);
        assert_eq!(android_request_status(false, false), PermissionStatus::Blocked);
    }

    #[test]
    fn apple_statuses_map_onto_shell_statuses() {
        assert_eq!(apple_camera_status(0), PermissionStatus::Denied);
        assert_eq!(apple_camera_status(1), PermissionStatus::Restricted);
        assert_eq!(apple_camera_status(2), PermissionStatus::Blocked);
        assert_eq!(apple_camera_status(3), PermissionStatus::Granted);
        assert_eq!(apple_camera_status(4), PermissionStatus::Unavailable);
        assert_eq!(apple_photos_status(4), PermissionStatus::Limited);
        assert_eq!(apple_photos_status(2), PermissionStatus::Blocked);
    }
}
