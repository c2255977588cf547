//! Plugin bridge and capability registration.
//!
//! The application depends on one abstract capability, [`ShakePlugin`]. The
//! concrete implementation is picked once, lazily, on first use: the native
//! accelerometer-backed detector inside a native shell, the keyboard fallback
//! everywhere else. Callers never branch on platform.
//!
//! Both implementations are the same [`ShakeDetector`] parameterized with a
//! different adapter, so operation signatures and the (payload-free) shake
//! event are identical by construction.

use std::{
    fmt,
    future::Future,
    sync::{Arc, OnceLock},
};

use crate::{
    adapter::{AccelerometerAdapter, Haptics, KeyboardAdapter, MotionAdapter, NoHaptics},
    detector::ShakeDetector,
    env::Environment,
    error::DetectorError,
    listener::{ListenerHandle, ShakeListener},
};

/// Uniform shake-detection capability exposed to the UI layer.
pub trait ShakePlugin: Send + Sync + 'static {
    /// Start listening. Idempotent; always resolves.
    fn enable_listening(&self) -> impl Future<Output = ()> + Send;

    /// Stop listening. Idempotent; always resolves.
    fn stop_listening(&self) -> impl Future<Output = ()> + Send;

    /// Register a listener for `event` (only `"shake"`).
    fn add_listener(
        &self,
        event: &str,
        listener: ShakeListener,
    ) -> impl Future<Output = Result<ListenerHandle, DetectorError>> + Send;

    /// Remove every listener.
    fn remove_all_listeners(&self) -> impl Future<Output = ()> + Send;

    /// Trigger a shake without a physical gesture. Cooldown applies.
    fn manual_shake(&self) -> impl Future<Output = ()> + Send;

    /// Ask for motion access. Resolves `true` once access is granted, and on
    /// platforms without a permission concept.
    fn request_permission(&self) -> impl Future<Output = bool> + Send;

    /// Whether the capability is currently listening.
    fn is_listening(&self) -> bool;
}

/// Native implementation: accelerometer plus haptics.
pub type NativeShake<E, S, H> = ShakeDetector<E, AccelerometerAdapter<S>, H>;

/// Web fallback implementation: keyboard simulation, no haptics.
pub type WebShake<E, K> = ShakeDetector<E, KeyboardAdapter<K>, NoHaptics>;

impl<E, A, H> ShakePlugin for ShakeDetector<E, A, H>
where
    E: Environment,
    A: MotionAdapter,
    H: Haptics,
{
    async fn enable_listening(&self) {
        ShakeDetector::enable_listening(self).await;
    }

    async fn stop_listening(&self) {
        ShakeDetector::stop_listening(self).await;
    }

    async fn add_listener(
        &self,
        event: &str,
        listener: ShakeListener,
    ) -> Result<ListenerHandle, DetectorError> {
        ShakeDetector::add_listener(self, event, listener).await
    }

    async fn remove_all_listeners(&self) {
        ShakeDetector::remove_all_listeners(self).await;
    }

    async fn manual_shake(&self) {
        ShakeDetector::manual_shake(self).await;
    }

    async fn request_permission(&self) -> bool {
        ShakeDetector::request_permission(self).await
    }

    fn is_listening(&self) -> bool {
        ShakeDetector::is_listening(self)
    }
}

impl<P: ShakePlugin> ShakePlugin for Arc<P> {
    fn enable_listening(&self) -> impl Future<Output = ()> + Send {
        P::enable_listening(self)
    }

    fn stop_listening(&self) -> impl Future<Output = ()> + Send {
        P::stop_listening(self)
    }

    fn add_listener(
        &self,
        event: &str,
        listener: ShakeListener,
    ) -> impl Future<Output = Result<ListenerHandle, DetectorError>> + Send {
        P::add_listener(self, event, listener)
    }

    fn remove_all_listeners(&self) -> impl Future<Output = ()> + Send {
        P::remove_all_listeners(self)
    }

    fn manual_shake(&self) -> impl Future<Output = ()> + Send {
        P::manual_shake(self)
    }

    fn request_permission(&self) -> impl Future<Output = bool> + Send {
        P::request_permission(self)
    }

    fn is_listening(&self) -> bool {
        P::is_listening(self)
    }
}

/// Execution environment reported by the host shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Native iOS shell
    Ios,
    /// Native Android shell
    Android,
    /// Plain browser or terminal
    Web,
}

impl Platform {
    /// Whether this platform runs inside a native shell.
    pub fn is_native(self) -> bool {
        matches!(self, Self::Ios | Self::Android)
    }
}

/// Probe answering "which platform am I running on".
pub trait RuntimeProbe: Send + Sync + 'static {
    /// Detect the current platform.
    fn platform(&self) -> Platform;
}

/// Fixed answer, for hosts that know their platform at build time.
impl RuntimeProbe for Platform {
    fn platform(&self) -> Platform {
        *self
    }
}

/// The implementation selected for this process.
#[derive(Debug, Clone)]
pub enum ShakeBackend<N, W> {
    /// Native-side implementation
    Native(N),
    /// Web fallback implementation
    Web(W),
}

impl<N, W> ShakeBackend<N, W> {
    /// Native implementation, if selected.
    pub fn native(&self) -> Option<&N> {
        match self {
            Self::Native(native) => Some(native),
            Self::Web(_) => None,
        }
    }

    /// Web implementation, if selected.
    pub fn web(&self) -> Option<&W> {
        match self {
            Self::Web(web) => Some(web),
            Self::Native(_) => None,
        }
    }
}

impl<N: ShakePlugin, W: ShakePlugin> ShakePlugin for ShakeBackend<N, W> {
    async fn enable_listening(&self) {
        match self {
            Self::Native(p) => p.enable_listening().await,
            Self::Web(p) => p.enable_listening().await,
        }
    }

    async fn stop_listening(&self) {
        match self {
            Self::Native(p) => p.stop_listening().await,
            Self::Web(p) => p.stop_listening().await,
        }
    }

    async fn add_listener(
        &self,
        event: &str,
        listener: ShakeListener,
    ) -> Result<ListenerHandle, DetectorError> {
        match self {
            Self::Native(p) => p.add_listener(event, listener).await,
            Self::Web(p) => p.add_listener(event, listener).await,
        }
    }

    async fn remove_all_listeners(&self) {
        match self {
            Self::Native(p) => p.remove_all_listeners().await,
            Self::Web(p) => p.remove_all_listeners().await,
        }
    }

    async fn manual_shake(&self) {
        match self {
            Self::Native(p) => p.manual_shake().await,
            Self::Web(p) => p.manual_shake().await,
        }
    }

    async fn request_permission(&self) -> bool {
        match self {
            Self::Native(p) => p.request_permission().await,
            Self::Web(p) => p.request_permission().await,
        }
    }

    fn is_listening(&self) -> bool {
        match self {
            Self::Native(p) => p.is_listening(),
            Self::Web(p) => p.is_listening(),
        }
    }
}

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Lazily resolved shake capability.
///
/// The probe and factories run once, on first use; every later call reuses the
/// memoized backend.
pub struct PluginRegistry<N, W> {
    name: &'static str,
    probe: Box<dyn RuntimeProbe>,
    native: Factory<N>,
    web: Factory<W>,
    backend: OnceLock<ShakeBackend<N, W>>,
}

impl<N, W> PluginRegistry<N, W>
where
    N: ShakePlugin,
    W: ShakePlugin,
{
    /// Register a capability under `name` with one factory per platform kind.
    pub fn register(
        name: &'static str,
        probe: impl RuntimeProbe,
        native: impl Fn() -> N + Send + Sync + 'static,
        web: impl Fn() -> W + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            probe: Box::new(probe),
            native: Box::new(native),
            web: Box::new(web),
            backend: OnceLock::new(),
        }
    }

    /// Registered capability name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the backend has been resolved yet.
    pub fn is_resolved(&self) -> bool {
        self.backend.get().is_some()
    }

    /// Resolve (once) and return the backend.
    pub fn backend(&self) -> &ShakeBackend<N, W> {
        self.backend.get_or_init(|| {
            let platform = self.probe.platform();
            tracing::info!(plugin = self.name, ?platform, "resolving shake capability");
            if platform.is_native() {
                ShakeBackend::Native((self.native)())
            } else {
                ShakeBackend::Web((self.web)())
            }
        })
    }
}

impl<N, W> fmt::Debug for PluginRegistry<N, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("name", &self.name)
            .field("resolved", &self.backend.get().is_some())
            .finish_non_exhaustive()
    }
}

impl<N: ShakePlugin, W: ShakePlugin> ShakePlugin for PluginRegistry<N, W> {
    fn enable_listening(&self) -> impl Future<Output = ()> + Send {
        self.backend().enable_listening()
    }

    fn stop_listening(&self) -> impl Future<Output = ()> + Send {
        self.backend().stop_listening()
    }

    fn add_listener(
        &self,
        event: &str,
        listener: ShakeListener,
    ) -> impl Future<Output = Result<ListenerHandle, DetectorError>> + Send {
        self.backend().add_listener(event, listener)
    }

    fn remove_all_listeners(&self) -> impl Future<Output = ()> + Send {
        self.backend().remove_all_listeners()
    }

    fn manual_shake(&self) -> impl Future<Output = ()> + Send {
        self.backend().manual_shake()
    }

    fn request_permission(&self) -> impl Future<Output = bool> + Send {
        self.backend().request_permission()
    }

    fn is_listening(&self) -> bool {
        self.backend().is_listening()
    }
}
