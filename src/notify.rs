use std::error::Error;
use std::sync::Arc;

use crate::model::{Device, Episode, Subscription};

/// Outcome of a single listener invocation
pub type ListenerResult = Result<(), Box<dyn Error + Send + Sync>>;

/// A registered callback for one event category.
///
/// The `Arc` allocation is the registration handle: the same handle cannot
/// be registered twice, and removal works by handle identity, not by
/// comparing closures.
pub type Listener<A> = Arc<dyn Fn(&A) -> ListenerResult + Send + Sync>;

/// A registered callback for diagnostic log lines; log listeners cannot fail
pub type LogListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Wrap an infallible closure as a listener
pub fn listener<A, F>(f: F) -> Listener<A>
where
    A: ?Sized,
    F: Fn(&A) + Send + Sync + 'static,
{
    Arc::new(move |payload: &A| {
        f(payload);
        Ok(())
    })
}

/// Listeners for one category of change event.
///
/// Dispatch is synchronous, in registration order. A listener returning an
/// error is reported through the log channel and does not stop dispatch to
/// the listeners after it.
pub struct Channel<A: ?Sized> {
    name: &'static str,
    listeners: Vec<Listener<A>>,
}

impl<A: ?Sized> Channel<A> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: Vec::new(),
        }
    }

    /// Register a listener; registering the same handle twice is a no-op
    pub fn add(&mut self, listener: Listener<A>) {
        if self
            .listeners
            .iter()
            .any(|held| Arc::ptr_eq(held, &listener))
        {
            return;
        }
        self.listeners.push(listener);
    }

    /// Unregister a listener by handle; unknown handles are ignored
    pub fn remove(&mut self, listener: &Listener<A>) {
        self.listeners.retain(|held| !Arc::ptr_eq(held, listener));
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn emit(&self, payload: &A, log: &LogChannel) {
        for listener in &self.listeners {
            if let Err(error) = listener(payload) {
                log.emit(&format!("{} listener failed: {}", self.name, error));
            }
        }
    }
}

/// Listeners for diagnostic log lines.
///
/// Listener failures from the other channels are reported here as well, so
/// this channel must stay infallible to keep dispatch from recursing.
pub struct LogChannel {
    listeners: Vec<LogListener>,
}

impl LogChannel {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a log listener; registering the same handle twice is a no-op
    pub fn add(&mut self, listener: LogListener) {
        if self
            .listeners
            .iter()
            .any(|held| Arc::ptr_eq(held, &listener))
        {
            return;
        }
        self.listeners.push(listener);
    }

    /// Unregister a log listener by handle; unknown handles are ignored
    pub fn remove(&mut self, listener: &LogListener) {
        self.listeners.retain(|held| !Arc::ptr_eq(held, listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn emit(&self, line: &str) {
        for listener in &self.listeners {
            listener(line);
        }
    }
}

/// Change notification hub for the reconciliation engine.
///
/// One channel per event category. Callers register listeners on the
/// channels they care about; only the engine emits. The episode channels
/// are batched: their payload is the resulting full episode set, not the
/// delta, so listeners diff against their own last-known view.
pub struct Notifier {
    pub device_added: Channel<Device>,
    pub device_removed: Channel<Device>,
    /// `None` payload means the selection was cleared
    pub device_selected: Channel<Option<Device>>,
    pub subscription_added: Channel<Subscription>,
    pub subscription_removed: Channel<Subscription>,
    pub episodes_added: Channel<[Episode]>,
    pub episodes_removed: Channel<[Episode]>,
    pub watermark: Channel<i64>,
    pub log: LogChannel,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            device_added: Channel::new("device_added"),
            device_removed: Channel::new("device_removed"),
            device_selected: Channel::new("device_selected"),
            subscription_added: Channel::new("subscription_added"),
            subscription_removed: Channel::new("subscription_removed"),
            episodes_added: Channel::new("episodes_added"),
            episodes_removed: Channel::new("episodes_removed"),
            watermark: Channel::new("watermark"),
            log: LogChannel::new(),
        }
    }

    pub(crate) fn emit_device_added(&self, device: &Device) {
        self.device_added.emit(device, &self.log);
    }

    pub(crate) fn emit_device_removed(&self, device: &Device) {
        self.device_removed.emit(device, &self.log);
    }

    pub(crate) fn emit_device_selected(&self, selection: &Option<Device>) {
        self.device_selected.emit(selection, &self.log);
    }

    pub(crate) fn emit_subscription_added(&self, subscription: &Subscription) {
        self.subscription_added.emit(subscription, &self.log);
    }

    pub(crate) fn emit_subscription_removed(&self, subscription: &Subscription) {
        self.subscription_removed.emit(subscription, &self.log);
    }

    pub(crate) fn emit_episodes_added(&self, episodes: &[Episode]) {
        self.episodes_added.emit(episodes, &self.log);
    }

    pub(crate) fn emit_episodes_removed(&self, episodes: &[Episode]) {
        self.episodes_removed.emit(episodes, &self.log);
    }

    pub(crate) fn emit_watermark(&self, value: i64) {
        self.watermark.emit(&value, &self.log);
    }

    pub(crate) fn emit_log(&self, line: &str) {
        self.log.emit(line);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
