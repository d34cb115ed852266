//! Shell state reducer.
//!
//! Every input the shell reacts to is a [`ShellEvent`]; [`reduce`] folds them
//! into a [`ShellState`] whose derived booleans depend on nothing else.

use std::collections::BTreeMap;

use crate::navigation::{back_affordance_visible, NavigationState};
use crate::permissions::{Permission, PermissionStatus};
use crate::refresh::refresher_armed;

/// Input events emitted by the embedded browser and the permission flow.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    NavigationChanged(NavigationState),
    ScrollChanged { offset: f64 },
    PermissionResolved {
        permission: Permission,
        status: PermissionStatus,
    },
}

impl ShellEvent {
    /// Log-safe event tag.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::NavigationChanged(_) => "NavigationChanged",
            Self::ScrollChanged { .. } => "ScrollChanged",
            Self::PermissionResolved { .. } => "PermissionResolved",
        }
    }
}

/// Per-screen shell state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    /// Latest navigation snapshot, once one has arrived.
    pub navigation: Option<NavigationState>,
    /// Whether the custom back button is shown.
    pub back_visible: bool,
    /// Whether a manual pull gesture would reload.
    pub refresher_armed: bool,
    /// Whether the page is still loading.
    pub loading: bool,
    /// Last resolved status per permission.
    pub permissions: BTreeMap<Permission, PermissionStatus>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            navigation: None,
            back_visible: false,
            refresher_armed: true,
            loading: true,
            permissions: BTreeMap::new(),
        }
    }
}

/// Fold one event into the state.
pub fn reduce(mut state: ShellState, event: &ShellEvent, entry_url: &str) -> ShellState {
    match event {
        ShellEvent::NavigationChanged(navigation) => {
            state.back_visible = back_affordance_visible(navigation, entry_url);
            state.loading = navigation.loading;
            state.navigation = Some(navigation.clone());
        }
        ShellEvent::ScrollChanged { offset } => {
            state.refresher_armed = refresher_armed(*offset);
        }
        ShellEvent::PermissionResolved { permission, status } => {
            state.permissions.insert(*permission, *status);
        }
    }
    state
}
