//! Shake integration hook.
//!
//! Binds the shake capability's lifecycle to the [`crate::App`]'s decision
//! and forwards notifications into a channel the runtime selects on.
//!
//! The hook owns the current subscription handle. Every re-evaluation first
//! releases that handle and clears all listeners, then enables or stops the
//! capability, and, if active, registers exactly one fresh listener. Two
//! re-evaluations cannot interleave because both take `&mut self`.
//!
//! Dropping a hook that still listens (for example when the runtime future is
//! cancelled) stops the capability on the current tokio runtime.

use std::sync::Arc;

use shakeguard_core::{
    DetectorError, EventName, ListenerError, ListenerHandle, ShakeListener, ShakePlugin,
};
use tokio::sync::mpsc;

/// Receiving end of the hook's shake notifications.
pub type ShakeReceiver = mpsc::UnboundedReceiver<()>;

/// Owns the application's shake subscription.
pub struct ShakeHook<P: ShakePlugin> {
    plugin: Arc<P>,
    subscription: Option<ListenerHandle>,
    /// Capability enabled by this hook and not stopped since.
    listening: bool,
    notify: mpsc::UnboundedSender<()>,
}

impl<P: ShakePlugin> ShakeHook<P> {
    /// Create a hook for `plugin` and the receiver its notifications go to.
    pub fn new(plugin: P) -> (Self, ShakeReceiver) {
        let (notify, receiver) = mpsc::unbounded_channel();
        (Self { plugin: Arc::new(plugin), subscription: None, listening: false, notify }, receiver)
    }

    /// The shake capability.
    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    /// Whether the hook currently holds a subscription.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Re-evaluate detection.
    ///
    /// # Errors
    ///
    /// Only if the capability rejects the `"shake"` event name.
    pub async fn apply(&mut self, active: bool) -> Result<(), DetectorError> {
        self.release();
        self.plugin.remove_all_listeners().await;

        if !active {
            self.plugin.stop_listening().await;
            self.listening = false;
            tracing::debug!("shake hook inactive");
            return Ok(());
        }

        self.plugin.enable_listening().await;
        self.listening = true;

        let notify = self.notify.clone();
        let listener: ShakeListener = Arc::new(move || {
            notify.send(()).map_err(|_| ListenerError::new("shake receiver dropped"))
        });
        let handle = self.plugin.add_listener(EventName::Shake.as_str(), listener).await?;
        tracing::debug!(listener = %handle.id(), "shake hook subscribed");
        self.subscription = Some(handle);

        Ok(())
    }

    /// Release the event source and every listener. Safe from any state.
    pub async fn teardown(&mut self) {
        self.release();
        self.plugin.stop_listening().await;
        self.listening = false;
        self.plugin.remove_all_listeners().await;
        tracing::debug!("shake hook torn down");
    }

    fn release(&mut self) {
        if let Some(handle) = self.subscription.take() {
            handle.remove();
        }
    }
}

impl<P: ShakePlugin> Drop for ShakeHook<P> {
    fn drop(&mut self) {
        self.release();
        if !self.listening {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let plugin = Arc::clone(&self.plugin);
                runtime.spawn(async move {
                    plugin.stop_listening().await;
                    tracing::debug!("shake hook stopped on drop");
                });
            },
            Err(_) => tracing::warn!("shake hook dropped outside a runtime, source left attached"),
        }
    }
}

impl<P: ShakePlugin> std::fmt::Debug for ShakeHook<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShakeHook")
            .field("subscription", &self.subscription)
            .field("listening", &self.listening)
            .finish_non_exhaustive()
    }
}
