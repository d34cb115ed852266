//! Back affordance controller and hardware back-button interception.
//!
//! The shell owns a [`SessionSlot`] holding the live browser session and a
//! [`BackHandlerRegistry`] that the platform adapter feeds hardware back
//! signals into. [`BackInterception`] keeps exactly one registry subscription
//! alive while the back affordance is visible.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Imperative commands accepted by a live embedded browser.
pub trait BrowserSession {
    /// Navigate one entry back in the browser's own history.
    fn go_back(&mut self);
    /// Reload the current page.
    fn reload(&mut self);
}

/// Slot holding the live browser session, if one is attached.
///
/// Cloning shares the slot. Controllers only borrow the session for the
/// duration of a single command.
#[derive(Clone, Default)]
pub struct SessionSlot {
    inner: Rc<RefCell<Option<Box<dyn BrowserSession>>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a live session, replacing any previous one.
    pub fn attach(&self, session: impl BrowserSession + 'static) {
        *self.inner.borrow_mut() = Some(Box::new(session));
    }

    /// Detach the current session, returning it.
    pub fn detach(&self) -> Option<Box<dyn BrowserSession>> {
        self.inner.borrow_mut().take()
    }

    pub fn is_live(&self) -> bool {
        self.inner.borrow().is_some()
    }

    /// Run `command` against the live session.
    ///
    /// Returns `None` without running it when no session is attached.
    pub fn with_session<R>(&self, command: impl FnOnce(&mut dyn BrowserSession) -> R) -> Option<R> {
        let mut slot = self.inner.borrow_mut();
        let session = slot.as_mut()?;
        Some(command(&mut **session))
    }
}

/// Navigate the embedded browser back one entry.
///
/// Returns `true` when a live session handled the request, `false` when the
/// caller should fall back to its default behavior.
pub fn attempt_back(slot: &SessionSlot) -> bool {
    let handled = slot.with_session(|session| session.go_back()).is_some();
    if !handled {
        tracing::debug!("Back requested without a live browser session");
    }
    handled
}

/// Outcome of dispatching a hardware back signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackDisposition {
    /// A handler consumed the signal.
    Handled,
    /// No handler consumed it; the platform default applies.
    FallThrough,
}

type BackHandler = Rc<dyn Fn() -> bool>;

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    handlers: Vec<(u64, BackHandler)>,
}

/// Dispatcher for hardware back signals.
///
/// Handlers run newest-first; the first one returning `true` stops the
/// signal.
#[derive(Clone, Default)]
pub struct BackHandlerRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl BackHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. It stays active until the returned guard drops.
    pub fn subscribe(&self, handler: impl Fn() -> bool + 'static) -> BackSubscription {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.handlers.push((id, Rc::new(handler)));
        BackSubscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Number of live subscriptions.
    pub fn active_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }

    /// Route one hardware back signal through the registered handlers.
    pub fn dispatch(&self) -> BackDisposition {
        // Handlers may subscribe or unsubscribe while running.
        let handlers: Vec<BackHandler> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .rev()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        if handlers.into_iter().any(|handler| handler()) {
            BackDisposition::Handled
        } else {
            BackDisposition::FallThrough
        }
    }
}

/// Guard for one registry subscription. Dropping it deregisters the handler.
#[must_use = "dropping the subscription deregisters the handler immediately"]
pub struct BackSubscription {
    id: u64,
    registry: Weak<RefCell<RegistryInner>>,
}

impl Drop for BackSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner
                .borrow_mut()
                .handlers
                .retain(|(id, _)| *id != self.id);
        }
    }
}

/// Hardware back interception state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptionState {
    Unregistered,
    Registered,
}

/// Holds a hardware back subscription exactly while the back affordance is
/// visible.
pub struct BackInterception {
    registry: BackHandlerRegistry,
    session: SessionSlot,
    enabled: bool,
    subscription: Option<BackSubscription>,
}

impl BackInterception {
    /// `enabled` is false on platforms without a hardware back button; the
    /// interception then never registers.
    pub const fn new(registry: BackHandlerRegistry, session: SessionSlot, enabled: bool) -> Self {
        Self {
            registry,
            session,
            enabled,
            subscription: None,
        }
    }

    /// Reconcile the subscription with the current back affordance visibility.
    pub fn sync(&mut self, visible: bool) {
        let wanted = self.enabled && visible;
        match (wanted, self.subscription.is_some()) {
            (true, false) => {
                let session = self.session.clone();
                self.subscription = Some(self.registry.subscribe(move || attempt_back(&session)));
                tracing::debug!("Hardware back interception registered");
            }
            (false, true) => {
                self.subscription = None;
                tracing::debug!("Hardware back interception released");
            }
            _ => {}
        }
    }

    /// Release the subscription for teardown.
    pub fn release(&mut self) {
        self.sync(false);
    }

    pub const fn state(&self) -> InterceptionState {
        if self.subscription.is_some() {
            InterceptionState::Registered
        } else {
            InterceptionState::Unregistered
        }
    }
}
