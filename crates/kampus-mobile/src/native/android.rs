//! Android glue.
//!
//! `MainActivity` calls `KampusNative.init(this)` before the webview starts,
//! forwards back presses and permission results through the `KampusNative`
//! entry points below, and exposes small helpers (`hasCamera`,
//! `requestKampusPermission`, `openAppSettings`, `applyStatusBar`) that Rust
//! calls back into.
#![allow(unsafe_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{mpsc, Mutex, OnceLock};
use std::time::Duration;

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{jboolean, jint, JNI_FALSE, JNI_TRUE};
use jni::{JNIEnv, JavaVM};
use kampus_core::navigation::StatusBarStyle;
use kampus_core::permissions::{Permission, PermissionStatus};
use tao::event_loop::EventLoopProxy;
use tokio::sync::oneshot;

use super::{android_check_status, android_permission, android_request_status};
use crate::host::UserEvent;
use crate::paths;

/// How long a back press waits for the shell before falling through.
const HARDWARE_BACK_TIMEOUT: Duration = Duration::from_millis(300);

/// `PackageManager.PERMISSION_GRANTED`
const PERMISSION_GRANTED: i32 = 0;

struct Activity {
    vm: JavaVM,
    activity: GlobalRef,
}

static ACTIVITY: OnceLock<Activity> = OnceLock::new();
static BACK_EVENTS: OnceLock<Mutex<EventLoopProxy<UserEvent>>> = OnceLock::new();
static PENDING_REQUESTS: Mutex<BTreeMap<i32, oneshot::Sender<PermissionStatus>>> =
    Mutex::new(BTreeMap::new());
static NEXT_REQUEST_CODE: AtomicI32 = AtomicI32::new(0x4b00);
/// The system shows one permission dialog at a time.
static REQUEST_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

#[no_mangle]
pub extern "system" fn Java_com_etkinkampus_akademi_KampusNative_init(
    mut env: JNIEnv,
    _class: JClass,
    activity: JObject,
) {
    if ACTIVITY.get().is_some() {
        return;
    }
    if let Ok(dir) = files_dir(&mut env, &activity) {
        paths::seed_data_dir(&dir);
    }
    let Ok(activity) = env.new_global_ref(activity) else {
        return;
    };
    let Ok(vm) = env.get_java_vm() else {
        return;
    };
    let _ = ACTIVITY.set(Activity { vm, activity });
}

#[no_mangle]
pub extern "system" fn Java_com_etkinkampus_akademi_KampusNative_onHardwareBack(
    _env: JNIEnv,
    _class: JClass,
) -> jboolean {
    if forward_hardware_back() {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

#[no_mangle]
pub extern "system" fn Java_com_etkinkampus_akademi_KampusNative_onPermissionResult(
    _env: JNIEnv,
    _class: JClass,
    request_code: jint,
    granted: jboolean,
    can_ask_again: jboolean,
) {
    let status = android_request_status(granted != JNI_FALSE, can_ask_again != JNI_FALSE);
    match take_pending(request_code) {
        Some(reply) => {
            let _ = reply.send(status);
        }
        None => tracing::debug!(request_code, "Permission result without a pending request"),
    }
}

/// Route back presses from the activity into the event loop.
pub fn install_back_forwarding(events: EventLoopProxy<UserEvent>) {
    let _ = BACK_EVENTS.set(Mutex::new(events));
}

/// Ask the shell whether it consumes a back press. Blocks the UI thread until
/// the event loop answers.
fn forward_hardware_back() -> bool {
    let Some(events) = BACK_EVENTS.get() else {
        return false;
    };
    let (reply, answer) = mpsc::sync_channel(1);
    let sent = events
        .lock()
        .map(|proxy| proxy.send_event(UserEvent::HardwareBack(reply)).is_ok())
        .unwrap_or(false);
    sent && answer.recv_timeout(HARDWARE_BACK_TIMEOUT).unwrap_or(false)
}

pub fn check_permission(permission: Permission) -> PermissionStatus {
    with_activity("permission check", |env, activity| {
        let available = match permission {
            Permission::Camera => env.call_method(activity, "hasCamera", "()Z", &[])?.z()?,
            Permission::MediaLibrary => true,
        };
        let sdk = sdk_int(env)?;
        let name = env.new_string(android_permission(permission, sdk))?;
        let result = env
            .call_method(
                activity,
                "checkSelfPermission",
                "(Ljava/lang/String;)I",
                &[JValue::from(&name)],
            )?
            .i()?;
        Ok(android_check_status(result == PERMISSION_GRANTED, available))
    })
    .unwrap_or(PermissionStatus::Unavailable)
}

pub async fn request_permission(permission: Permission) -> PermissionStatus {
    let _dialog = REQUEST_LOCK.lock().await;
    let code = NEXT_REQUEST_CODE.fetch_add(1, Ordering::Relaxed);
    let (reply, answer) = oneshot::channel();
    if let Ok(mut pending) = PENDING_REQUESTS.lock() {
        pending.insert(code, reply);
    }
    let started = with_activity("permission request", |env, activity| {
        let sdk = sdk_int(env)?;
        let name = env.new_string(android_permission(permission, sdk))?;
        env.call_method(
            activity,
            "requestKampusPermission",
            "(Ljava/lang/String;I)V",
            &[JValue::from(&name), JValue::Int(code)],
        )?;
        Ok(())
    });
    if started.is_none() {
        take_pending(code);
        return PermissionStatus::Unavailable;
    }
    answer.await.unwrap_or(PermissionStatus::Unavailable)
}

pub fn open_settings() {
    with_activity("settings deep link", |env, activity| {
        env.call_method(activity, "openAppSettings", "()V", &[])?;
        Ok(())
    });
}

pub fn apply_status_bar(style: StatusBarStyle, background: Option<&str>) {
    with_activity("status bar update", |env, activity| {
        let color = match background {
            Some(color) => JObject::from(env.new_string(color)?),
            None => JObject::null(),
        };
        let light = u8::from(style == StatusBarStyle::Light);
        env.call_method(
            activity,
            "applyStatusBar",
            "(ZLjava/lang/String;)V",
            &[JValue::Bool(light), JValue::from(&color)],
        )?;
        Ok(())
    });
}

/// `Locale.getDefault()` as a BCP 47 tag.
pub fn device_locale() -> Option<String> {
    with_activity("locale lookup", |env, _activity| {
        let locale = env
            .call_static_method("java/util/Locale", "getDefault", "()Ljava/util/Locale;", &[])?
            .l()?;
        let tag = env
            .call_method(&locale, "toLanguageTag", "()Ljava/lang/String;", &[])?
            .l()?;
        let tag: String = env.get_string(&JString::from(tag))?.into();
        Ok(tag)
    })
}

fn take_pending(code: i32) -> Option<oneshot::Sender<PermissionStatus>> {
    PENDING_REQUESTS.lock().ok()?.remove(&code)
}

/// Run `call` against the activity on the current thread, attaching it to the
/// VM if needed. Java exceptions are cleared and logged.
fn with_activity<T>(
    action: &str,
    call: impl FnOnce(&mut JNIEnv, &JObject) -> jni::errors::Result<T>,
) -> Option<T> {
    let context = ACTIVITY.get()?;
    let mut env = match context.vm.attach_current_thread() {
        Ok(env) => env,
        Err(error) => {
            tracing::warn!("Failed to attach to the JVM for {}: {}", action, error);
            return None;
        }
    };
    match call(&mut *env, context.activity.as_obj()) {
        Ok(value) => Some(value),
        Err(error) => {
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_clear();
            }
            tracing::warn!("Android {} failed: {}", action, error);
            None
        }
    }
}

fn sdk_int(env: &mut JNIEnv) -> jni::errors::Result<i32> {
    env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")?.i()
}

fn files_dir(env: &mut JNIEnv, activity: &JObject) -> jni::errors::Result<PathBuf> {
    let dir = env
        .call_method(activity, "getFilesDir", "()Ljava/io/File;", &[])?
        .l()?;
    let path = env
        .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])?
        .l()?;
    let path: String = env.get_string(&JString::from(path))?.into();
    Ok(PathBuf::from(path))
}
