//! iOS glue through the Objective-C runtime.
//!
//! Camera access goes through `AVCaptureDevice`, photo access through
//! `PHPhotoLibrary` (read-write level). A refusal of the system dialog is
//! final on iOS, so request results map denial to `Blocked`.
#![allow(unsafe_code)]

use std::ffi::{c_char, CStr};
use std::sync::Mutex;

use block2::RcBlock;
use kampus_core::navigation::StatusBarStyle;
use kampus_core::permissions::{Permission, PermissionStatus};
use objc2::rc::autoreleasepool;
use objc2::runtime::{AnyObject, Bool};
use objc2::{class, msg_send};
use tokio::sync::oneshot;

use super::{apple_camera_status, apple_photos_status};

/// `PHAccessLevelReadWrite`
const PHOTO_ACCESS_READ_WRITE: isize = 2;
/// `UIStatusBarStyleLightContent`
const STATUS_BAR_LIGHT_CONTENT: isize = 1;
/// `UIStatusBarStyleDarkContent`
const STATUS_BAR_DARK_CONTENT: isize = 3;

#[link(name = "AVFoundation", kind = "framework")]
extern "C" {
    static AVMediaTypeVideo: &'static AnyObject;
}

#[link(name = "Photos", kind = "framework")]
extern "C" {}

#[link(name = "UIKit", kind = "framework")]
extern "C" {
    static UIApplicationOpenSettingsURLString: &'static AnyObject;
}

pub fn check_permission(permission: Permission) -> PermissionStatus {
    autoreleasepool(|_| match permission {
        Permission::Camera => unsafe {
            let device: *mut AnyObject =
                msg_send![class!(AVCaptureDevice), defaultDeviceWithMediaType: AVMediaTypeVideo];
            if device.is_null() {
                return PermissionStatus::Unavailable;
            }
            let raw: isize =
                msg_send![class!(AVCaptureDevice), authorizationStatusForMediaType: AVMediaTypeVideo];
            apple_camera_status(raw)
        },
        Permission::MediaLibrary => unsafe {
            let raw: isize = msg_send![
                class!(PHPhotoLibrary),
                authorizationStatusForAccessLevel: PHOTO_ACCESS_READ_WRITE
            ];
            apple_photos_status(raw)
        },
    })
}

pub async fn request_permission(permission: Permission) -> PermissionStatus {
    let (reply, answer) = oneshot::channel();
    let reply = Mutex::new(Some(reply));
    let settle = move |status: PermissionStatus| {
        if let Some(reply) = reply.lock().ok().and_then(|mut slot| slot.take()) {
            let _ = reply.send(status);
        }
    };
    match permission {
        Permission::Camera => {
            let handler = RcBlock::new(move |granted: Bool| {
                settle(if granted.as_bool() {
                    PermissionStatus::Granted
                } else {
                    PermissionStatus::Blocked
                });
            });
            autoreleasepool(|_| unsafe {
                let _: () = msg_send![
                    class!(AVCaptureDevice),
                    requestAccessForMediaType: AVMediaTypeVideo,
                    completionHandler: &*handler
                ];
            });
        }
        Permission::MediaLibrary => {
            let handler = RcBlock::new(move |raw: isize| settle(apple_photos_status(raw)));
            autoreleasepool(|_| unsafe {
                let _: () = msg_send![
                    class!(PHPhotoLibrary),
                    requestAuthorizationForAccessLevel: PHOTO_ACCESS_READ_WRITE,
                    handler: &*handler
                ];
            });
        }
    }
    answer.await.unwrap_or(PermissionStatus::Unavailable)
}

/// Open this app's page in the Settings app. Main thread only.
pub fn open_settings() {
    autoreleasepool(|_| unsafe {
        let url: *mut AnyObject =
            msg_send![class!(NSURL), URLWithString: UIApplicationOpenSettingsURLString];
        if url.is_null() {
            tracing::warn!("Settings URL is unavailable");
            return;
        }
        let application: *mut AnyObject = msg_send![class!(UIApplication), sharedApplication];
        let options: *mut AnyObject = msg_send![class!(NSDictionary), dictionary];
        let completion = RcBlock::new(|opened: Bool| {
            tracing::debug!(opened = opened.as_bool(), "Settings deep link");
        });
        let _: () = msg_send![
            application,
            openURL: url,
            options: options,
            completionHandler: &*completion
        ];
    });
}

/// Needs `UIViewControllerBasedStatusBarAppearance = NO` in `Info.plist`.
/// iOS draws the status bar over the page, so `background` is unused.
pub fn apply_status_bar(style: StatusBarStyle, _background: Option<&str>) {
    let raw = match style {
        StatusBarStyle::Light => STATUS_BAR_LIGHT_CONTENT,
        StatusBarStyle::Dark => STATUS_BAR_DARK_CONTENT,
    };
    unsafe {
        let application: *mut AnyObject = msg_send![class!(UIApplication), sharedApplication];
        let _: () = msg_send![application, setStatusBarStyle: raw, animated: Bool::NO];
    }
}

/// First of the user's preferred languages, e.g. `tr-TR`.
pub fn device_locale() -> Option<String> {
    autoreleasepool(|_| unsafe {
        let languages: *mut AnyObject = msg_send![class!(NSLocale), preferredLanguages];
        if languages.is_null() {
            return None;
        }
        let first: *mut AnyObject = msg_send![languages, firstObject];
        if first.is_null() {
            return None;
        }
        let utf8: *const c_char = msg_send![first, UTF8String];
        if utf8.is_null() {
            return None;
        }
        Some(CStr::from_ptr(utf8).to_string_lossy().into_owned())
    })
}
