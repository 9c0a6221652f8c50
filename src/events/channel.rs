//! Typed, synchronous event channel.
//!
//! A [`Channel<T>`] keeps two ordered lists: persistent listeners added with
//! [`Channel::on`] and one-shot listeners added with [`Channel::once`].
//! [`Channel::emit`] runs the persistent listeners in registration order and
//! then the one-shot listeners that were queued when the emit began.
//!
//! The listener lists live behind a mutex that is never held while a listener
//! runs. Each emit dispatches over a snapshot, so a listener may subscribe,
//! unsubscribe or emit again on the same channel without affecting the
//! dispatch in progress.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use crossbeam_channel::Sender;
use tracing::{debug, error, warn};

use super::handler::{Disposable, Handler};
use super::types::{ChannelInfo, ChannelOptions, DispatchReport, FailurePolicy};

const UNNAMED: &str = "<unnamed>";

struct QueuedOnce<T> {
    seq: u64,
    handler: Handler<T>,
}

struct Listeners<T> {
    persistent: Vec<Handler<T>>,
    once: Vec<QueuedOnce<T>>,
    next_seq: u64,
}

struct Shared<T> {
    listeners: Mutex<Listeners<T>>,
    name: OnceLock<String>,
    options: ChannelOptions,
}

/// A single typed event line.
///
/// `Channel` is a shared handle: clones observe and mutate the same listener
/// lists, so a channel fetched from a registry is the registry's channel,
/// not a copy of it.
pub struct Channel<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: 'static> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Channel<T> {
    /// Create a channel with default options
    pub fn new() -> Self {
        Self::with_options(ChannelOptions::default())
    }

    /// Create a channel with explicit options
    pub fn with_options(options: ChannelOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                listeners: Mutex::new(Listeners {
                    persistent: Vec::new(),
                    once: Vec::new(),
                    next_seq: 0,
                }),
                name: OnceLock::new(),
                options,
            }),
        }
    }

    /// Registry key this channel was declared under, if any
    pub fn name(&self) -> &str {
        self.shared.name.get().map(String::as_str).unwrap_or(UNNAMED)
    }

    /// Attach the registry key used in log output. The first name wins.
    pub fn named(self, name: impl Into<String>) -> Self {
        let _ = self.shared.name.set(name.into());
        self
    }

    pub fn options(&self) -> &ChannelOptions {
        &self.shared.options
    }

    /// Number of persistent listeners
    pub fn listener_count(&self) -> usize {
        self.listeners().persistent.len()
    }

    /// Number of one-shot listeners waiting for the next emit
    pub fn once_count(&self) -> usize {
        self.listeners().once.len()
    }

    pub fn info(&self) -> ChannelInfo {
        let listeners = self.listeners();
        ChannelInfo {
            name: self.name().to_string(),
            listeners: listeners.persistent.len(),
            once_listeners: listeners.once.len(),
        }
    }

    /// Whether two handles refer to the same channel
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Register a persistent listener.
    ///
    /// The listener is appended after every existing one. Registering the
    /// same handler twice makes it run twice per emit.
    pub fn on(&self, handler: impl Into<Handler<T>>) -> Disposable {
        let handler = handler.into();
        self.listeners().persistent.push(handler.clone());
        debug!(channel = self.name(), "Listener registered");

        let channel = Arc::downgrade(&self.shared);
        Disposable::new(move || {
            if let Some(shared) = Weak::upgrade(&channel) {
                Channel { shared }.off(&handler);
            }
        })
    }

    /// Register a listener for the next emit only
    pub fn once(&self, handler: impl Into<Handler<T>>) {
        let mut listeners = self.listeners();
        let seq = listeners.next_seq;
        listeners.next_seq += 1;
        listeners.once.push(QueuedOnce {
            seq,
            handler: handler.into(),
        });
    }

    /// Remove the first persistent registration of `handler`.
    ///
    /// Unknown handlers are ignored. One-shot listeners are not affected.
    pub fn off(&self, handler: &Handler<T>) {
        let mut listeners = self.listeners();
        if let Some(index) = listeners
            .persistent
            .iter()
            .position(|registered| registered.ptr_eq(handler))
        {
            listeners.persistent.remove(index);
            debug!(channel = self.name(), "Listener removed");
        }
    }

    /// Deliver `payload` to every listener, synchronously.
    pub fn emit(&self, payload: &T) -> DispatchReport {
        let (persistent, cutoff) = {
            let listeners = self.listeners();
            if listeners.persistent.is_empty() && listeners.once.is_empty() {
                if self.shared.options.warn_when_idle {
                    warn!(channel = self.name(), "No listeners for event");
                }
                return DispatchReport::default();
            }
            (listeners.persistent.clone(), listeners.next_seq)
        };

        let mut report = DispatchReport::default();
        for handler in &persistent {
            self.dispatch(handler, payload, &mut report);
        }

        // Taken only now so a panicking persistent listener leaves the queue intact
        let due: Vec<Handler<T>> = {
            let mut listeners = self.listeners();
            let (due, later): (Vec<_>, Vec<_>) = std::mem::take(&mut listeners.once)
                .into_iter()
                .partition(|queued| queued.seq < cutoff);
            listeners.once = later;
            due.into_iter().map(|queued| queued.handler).collect()
        };
        for handler in &due {
            self.dispatch(handler, payload, &mut report);
        }

        report
    }

    /// Re-emit every payload of this channel on `target`.
    ///
    /// Disposing the returned handle stops the forwarding only.
    pub fn pipe(&self, target: &Channel<T>) -> Disposable {
        let target = target.clone();
        self.on(move |payload: &T| {
            target.emit(payload);
        })
    }

    fn dispatch(&self, handler: &Handler<T>, payload: &T, report: &mut DispatchReport) {
        match self.shared.options.failure_policy {
            FailurePolicy::Propagate => {
                handler.call(payload);
                report.delivered += 1;
            }
            FailurePolicy::Isolate => {
                match panic::catch_unwind(AssertUnwindSafe(|| handler.call(payload))) {
                    Ok(()) => report.delivered += 1,
                    Err(cause) => {
                        report.failed += 1;
                        error!(
                            channel = self.name(),
                            reason = panic_message(cause.as_ref()),
                            "Event listener panicked"
                        );
                    }
                }
            }
        }
    }

    fn listeners(&self) -> MutexGuard<'_, Listeners<T>> {
        // Listeners never run under the lock, so poisoning leaves consistent data
        self.shared
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + 'static> Channel<T> {
    /// Send a clone of every payload to a crossbeam receiver.
    ///
    /// Lets a consumer on another thread observe the channel. If the
    /// receiver is dropped, payloads are silently discarded.
    pub fn forward_to(&self, sender: Sender<T>) -> Disposable {
        let name = self.name().to_string();
        self.on(move |payload: &T| {
            if sender.send(payload.clone()).is_err() {
                debug!(channel = %name, "Forwarding receiver disconnected");
            }
        })
    }
}

impl Channel<()> {
    /// Emit on a channel that carries no payload
    pub fn notify(&self) -> DispatchReport {
        self.emit(&())
    }
}

impl<T: 'static> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners();
        f.debug_struct("Channel")
            .field("name", &self.name())
            .field("listeners", &listeners.persistent.len())
            .field("once_listeners", &listeners.once.len())
            .finish()
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> &str {
    if let Some(message) = cause.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
