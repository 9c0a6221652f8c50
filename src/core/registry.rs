//! Fixed, named collections of channels.
//!
//! A registry type is declared once with [`event_registry!`](crate::event_registry)
//! and wrapped in a [`Registry`] handle. The key set is part of the type, so
//! it cannot grow or shrink after construction; typed [`EventKey`]s resolve
//! channels without a name lookup, and string lookups are checked against
//! the declared names.

use std::any::{type_name, Any};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{EventError, Result};
use crate::events::{Channel, ChannelInfo};

/// Type-erased view of a channel, used for lookups by name
pub trait AnyChannel: Send + Sync {
    fn info(&self) -> ChannelInfo;

    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> AnyChannel for Channel<T> {
    fn info(&self) -> ChannelInfo {
        Channel::info(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A struct of named channels.
///
/// Implemented by [`event_registry!`](crate::event_registry); implement it by
/// hand only for registries the macro cannot express.
pub trait EventMap: Send + Sync + 'static {
    /// Every channel name, in declaration order
    const NAMES: &'static [&'static str];

    /// Look up a channel by its declared name
    fn channel_by_name(&self, name: &str) -> Option<&dyn AnyChannel>;
}

/// Compile-time name of one channel inside registry `R`, carrying its
/// payload type `T`.
pub struct EventKey<R, T> {
    name: &'static str,
    select: fn(&R) -> &Channel<T>,
}

impl<R, T> EventKey<R, T> {
    pub const fn new(name: &'static str, select: fn(&R) -> &Channel<T>) -> Self {
        Self { name, select }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Borrow the channel this key names from `events`
    pub fn select<'a>(&self, events: &'a R) -> &'a Channel<T> {
        (self.select)(events)
    }
}

impl<R, T> Clone for EventKey<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, T> Copy for EventKey<R, T> {}

// Names are unique within a registry type, so the name is the identity
impl<R, T> PartialEq for EventKey<R, T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<R, T> Eq for EventKey<R, T> {}

impl<R, T> fmt::Debug for EventKey<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventKey")
            .field("registry", &type_name::<R>())
            .field("name", &self.name)
            .field("payload", &type_name::<T>())
            .finish()
    }
}

/// Shared handle to one registry instance.
///
/// Clones refer to the same channels. Dereferences to the declared struct,
/// so channels are also reachable as plain fields.
pub struct Registry<R> {
    events: Arc<R>,
}

impl<R> Clone for Registry<R> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<R> Deref for Registry<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.events
    }
}

impl<R: EventMap> Registry<R> {
    pub fn new(events: R) -> Self {
        Self {
            events: Arc::new(events),
        }
    }

    pub(crate) fn from_arc(events: Arc<R>) -> Self {
        Self { events }
    }

    pub(crate) fn as_arc(&self) -> &Arc<R> {
        &self.events
    }

    /// Every channel name this registry declares
    pub fn names(&self) -> &'static [&'static str] {
        R::NAMES
    }

    /// The channel named by `key`
    pub fn get<T: 'static>(&self, key: EventKey<R, T>) -> Channel<T> {
        key.select(&self.events).clone()
    }

    /// Look up a channel by name at runtime.
    ///
    /// Fails with [`EventError::UnknownChannel`] for names outside the
    /// declared set and [`EventError::PayloadMismatch`] when the channel
    /// carries a different payload type.
    pub fn channel<T: 'static>(&self, name: &str) -> Result<Channel<T>> {
        let channel = self
            .events
            .channel_by_name(name)
            .ok_or_else(|| EventError::UnknownChannel {
                name: name.to_string(),
            })?;

        channel
            .as_any()
            .downcast_ref::<Channel<T>>()
            .cloned()
            .ok_or_else(|| EventError::PayloadMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Listener counts for every channel, in declaration order
    pub fn describe(&self) -> Vec<ChannelInfo> {
        R::NAMES
            .iter()
            .filter_map(|name| self.events.channel_by_name(name))
            .map(|channel| channel.info())
            .collect()
    }

    /// Whether two handles refer to the same registry instance
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.events, &other.events)
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Registry").field(&type_name::<R>()).finish()
    }
}
