//! Shake listener registry.
//!
//! Listeners are stored in registration order and notified synchronously in
//! that order. A failing listener (returning `Err` or panicking) is logged and
//! skipped; the remaining listeners still run. Notification works on a
//! snapshot, so a listener registered during a pass only sees the next shake.
//!
//! Registration is deduplicated by identity: registering the same
//! [`ShakeListener`] twice yields the original id instead of a second entry.

use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    str::FromStr,
    sync::{Arc, Mutex, PoisonError, Weak},
};

use crate::error::{DetectorError, ListenerError};

/// Result returned by a shake listener.
pub type ListenerResult = Result<(), ListenerError>;

/// Callback invoked on every accepted shake. The shake event has no payload.
pub type ShakeListener = Arc<dyn Fn() -> ListenerResult + Send + Sync>;

/// Wrap an infallible closure as a [`ShakeListener`].
pub fn listener_fn(f: impl Fn() + Send + Sync + 'static) -> ShakeListener {
    Arc::new(move || {
        f();
        Ok(())
    })
}

/// Events a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Accepted shake
    Shake,
}

impl EventName {
    /// Wire name of the event.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shake => "shake",
        }
    }
}

impl FromStr for EventName {
    type Err = DetectorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "shake" => Ok(Self::Shake),
            other => Err(DetectorError::UnsupportedEvent(other.to_string())),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier assigned to a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Insertion-ordered collection of shake listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(ListenerId, ShakeListener)>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, returning its id.
    ///
    /// Re-registering a listener that is already present returns the existing
    /// id and does not create a duplicate entry.
    pub fn insert(&mut self, listener: ShakeListener) -> ListenerId {
        if let Some((id, _)) = self.entries.iter().find(|(_, l)| Arc::ptr_eq(l, &listener)) {
            tracing::debug!(listener = %id, "listener already registered");
            return *id;
        }

        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Remove a single listener. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Remove every listener, returning how many were registered.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` is still registered.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    /// Copy of the current listeners, in registration order.
    pub fn snapshot(&self) -> Vec<(ListenerId, ShakeListener)> {
        self.entries.clone()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("next_id", &self.next_id)
            .field("listeners", &self.entries.iter().map(|(id, _)| *id).collect::<Vec<_>>())
            .finish()
    }
}

/// Registry shared between the detector and outstanding handles.
pub(crate) type SharedRegistry = Arc<Mutex<ListenerRegistry>>;

/// Lock a shared registry. Listeners never run under this lock, so a poisoned
/// lock still guards consistent data.
pub(crate) fn lock(registry: &Mutex<ListenerRegistry>) -> std::sync::MutexGuard<'_, ListenerRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle returned by `add_listener`.
///
/// Dropping the handle does NOT unregister the listener; call
/// [`ListenerHandle::remove`].
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    id: ListenerId,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl ListenerHandle {
    pub(crate) fn new(id: ListenerId, registry: &SharedRegistry) -> Self {
        Self { id, registry: Arc::downgrade(registry) }
    }

    /// Id of the listener this handle controls.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Unregister exactly this listener.
    ///
    /// Idempotent. Returns `true` if the listener was still registered.
    pub fn remove(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => lock(&registry).remove(self.id),
            None => false,
        }
    }
}

/// Outcome of one notification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Listeners that returned successfully
    pub delivered: usize,
    /// Listeners that returned an error or panicked
    pub failed: usize,
}

/// Invoke every listener in order, isolating failures.
pub fn notify_all(listeners: &[(ListenerId, ShakeListener)]) -> NotifyReport {
    let mut report = NotifyReport::default();

    for (id, listener) in listeners {
        match catch_unwind(AssertUnwindSafe(|| listener())) {
            Ok(Ok(())) => report.delivered += 1,
            Ok(Err(error)) => {
                tracing::warn!(listener = %id, %error, "shake listener returned an error");
                report.failed += 1;
            },
            Err(_) => {
                tracing::warn!(listener = %id, "shake listener panicked");
                report.failed += 1;
            },
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, ShakeListener) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let listener = listener_fn(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (count, listener)
    }

    #[test]
    fn only_shake_event_parses() {
        assert_eq!("shake".parse::<EventName>(), Ok(EventName::Shake));
        assert_eq!(
            "Shake".parse::<EventName>(),
            Err(DetectorError::UnsupportedEvent("Shake".into()))
        );
    }

    #[test]
    fn duplicate_registration_is_collapsed() {
        let mut registry = ListenerRegistry::new();
        let (count, listener) = counter();

        let first = registry.insert(Arc::clone(&listener));
        let second = registry.insert(listener);

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);

        notify_all(&registry.snapshot());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handle_removes_only_its_listener() {
        let registry: SharedRegistry = Arc::new(Mutex::new(ListenerRegistry::new()));
        let (_, a) = counter();
        let (_, b) = counter();

        let id_a = lock(&registry).insert(a);
        let id_b = lock(&registry).insert(b);
        let handle = ListenerHandle::new(id_a, &registry);

        assert!(handle.remove());
        assert!(!handle.remove());
        assert!(!lock(&registry).contains(id_a));
        assert!(lock(&registry).contains(id_b));
    }

    #[test]
    fn handle_outliving_registry_is_inert() {
        let registry: SharedRegistry = Arc::new(Mutex::new(ListenerRegistry::new()));
        let (_, a) = counter();
        let handle = ListenerHandle::new(lock(&registry).insert(a), &registry);

        drop(registry);
        assert!(!handle.remove());
    }

    #[test]
    fn failing_listener_does_not_stop_the_pass() {
        let mut registry = ListenerRegistry::new();
        let (count, after) = counter();

        registry.insert(Arc::new(|| -> ListenerResult { Err(ListenerError::new("boom")) }));
        registry.insert(after);

        let report = notify_all(&registry.snapshot());
        assert_eq!(report, NotifyReport { delivered: 1, failed: 1 });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[allow(clippy::panic)]
    fn panicking_listener_does_not_stop_the_pass() {
        let mut registry = ListenerRegistry::new();
        let (count, after) = counter();

        registry.insert(listener_fn(|| panic!("listener bug")));
        registry.insert(after);

        let report = notify_all(&registry.snapshot());
        assert_eq!(report.failed, 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut registry = ListenerRegistry::new();
        let (_, a) = counter();
        let (_, b) = counter();

        let first = registry.insert(a);
        assert_eq!(registry.clear(), 1);
        let second = registry.insert(b);

        assert_ne!(first, second);
    }
}
