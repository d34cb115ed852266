//! kampus-core - Core library for Kampus Shell
//!
//! Platform-independent logic behind the mobile shell: navigation tracking,
//! back-button interception, manual pull-to-refresh, first-launch detection
//! and permission priming. Platform crates plug in through the traits exposed
//! here and render whatever [`shell::Shell`] decides.

pub mod back;
pub mod config;
pub mod error;
pub mod first_launch;
pub mod navigation;
pub mod permissions;
pub mod refresh;
pub mod shell;

pub use back::{attempt_back, BackDisposition, BackHandlerRegistry, BrowserSession, SessionSlot};
pub use config::{Locale, ShellConfig, ENTRY_URL};
pub use error::{Error, Result};
pub use navigation::{NavigationState, NavigationTracker, StatusBar, StatusBarStyle};
pub use permissions::{Permission, PermissionApi, PermissionPrimer, PermissionStatus};
pub use shell::{Platform, Shell, ShellEvent, ShellState};
