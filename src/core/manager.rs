//! Provider and accessors for one registry type.
//!
//! [`create_event_manager`] takes a registry declaration and returns an
//! [`EventManager`]: the scope boundary ([`EventManager::provider`]) plus the
//! accessors that resolve the nearest provided registry
//! ([`EventManager::events`], [`EventManager::event`],
//! [`EventManager::event_handler`]).
//!
//! Accessors only succeed while a scope of the same manager is open on the
//! current thread; outside of one they return [`EventError::ScopeMissing`].

use std::any::type_name;
use std::fmt;

use tracing::debug;

use super::registry::{EventKey, EventMap, Registry};
use super::scope::{self, ContextId, ScopeGuard};
use crate::error::{EventError, Result};
use crate::events::{Channel, Disposable, Handler};

/// Create the provider and accessors for a registry declaration
pub fn create_event_manager<R: EventMap>(events: R) -> EventManager<R> {
    EventManager::new(events)
}

/// Scope boundary and accessors for registries of type `R`.
///
/// Cloning a manager keeps the same context: scopes opened through one clone
/// are visible through every other.
pub struct EventManager<R> {
    context: ContextId,
    registry: Registry<R>,
}

impl<R> Clone for EventManager<R> {
    fn clone(&self) -> Self {
        Self {
            context: self.context,
            registry: self.registry.clone(),
        }
    }
}

impl<R: EventMap> EventManager<R> {
    pub fn new(events: R) -> Self {
        Self {
            context: ContextId::next(),
            registry: Registry::new(events),
        }
    }

    /// Context shared by this manager and its clones
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// The registry this manager was created with
    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    /// Provide this manager's own registry until the guard is dropped
    pub fn provider(&self) -> ScopeGuard {
        self.provide(&self.registry)
    }

    /// Provide another registry instance, shadowing any outer scope
    pub fn provide(&self, registry: &Registry<R>) -> ScopeGuard {
        scope::push(self.context, registry.as_arc().clone())
    }

    /// Run `f` with this manager's registry provided.
    ///
    /// The scope is closed when `f` returns or unwinds.
    pub fn scope<O>(&self, f: impl FnOnce() -> O) -> O {
        let _guard = self.provider();
        f()
    }

    /// All channels of the nearest provided registry
    pub fn events(&self) -> Result<Registry<R>> {
        let provided = scope::resolve(self.context).ok_or(EventError::ScopeMissing {
            registry: type_name::<R>(),
        })?;

        // Only this manager pushes entries under its context, always as `R`
        let events = provided
            .downcast::<R>()
            .map_err(|_| EventError::ScopeMissing {
                registry: type_name::<R>(),
            })?;

        Ok(Registry::from_arc(events))
    }

    /// One channel of the nearest provided registry
    pub fn event<T: 'static>(&self, key: EventKey<R, T>) -> Result<Channel<T>> {
        Ok(self.events()?.get(key))
    }

    /// One channel of the nearest provided registry, looked up by name
    pub fn channel<T: 'static>(&self, name: &str) -> Result<Channel<T>> {
        self.events()?.channel(name)
    }

    /// Subscribe `handler` to the channel named by `key` for as long as the
    /// returned binding lives.
    pub fn event_handler<T: 'static>(
        &self,
        key: EventKey<R, T>,
        handler: impl Into<Handler<T>>,
    ) -> Result<HandlerBinding<R, T>> {
        let mut binding = HandlerBinding {
            manager: self.clone(),
            active: None,
        };
        binding.update(key, handler)?;
        Ok(binding)
    }
}

impl<R> fmt::Debug for EventManager<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("context", &self.context)
            .field("registry", &type_name::<R>())
            .finish()
    }
}

struct ActiveBinding<R, T> {
    registry: Registry<R>,
    key: EventKey<R, T>,
    handler: Handler<T>,
    subscription: Disposable,
}

/// A handler subscription tied to the lifetime of its owner.
///
/// Call [`update`](Self::update) whenever the owner's inputs may have
/// changed; the subscription is only replaced when the key, the handler or
/// the resolved registry differs. Dropping the binding removes the current
/// subscription.
pub struct HandlerBinding<R: EventMap, T: 'static> {
    manager: EventManager<R>,
    active: Option<ActiveBinding<R, T>>,
}

impl<R: EventMap, T: 'static> HandlerBinding<R, T> {
    /// Re-apply the subscription with possibly new inputs.
    ///
    /// On error the previous subscription stays in place.
    pub fn update(&mut self, key: EventKey<R, T>, handler: impl Into<Handler<T>>) -> Result<()> {
        let handler = handler.into();
        let registry = self.manager.events()?;

        if let Some(active) = &self.active {
            if active.key == key
                && active.handler.ptr_eq(&handler)
                && active.registry.ptr_eq(&registry)
            {
                return Ok(());
            }
        }

        self.release();
        let subscription = registry.get(key).on(handler.clone());
        debug!(channel = key.name(), "Handler bound");
        self.active = Some(ActiveBinding {
            registry,
            key,
            handler,
            subscription,
        });
        Ok(())
    }

    /// Name of the channel currently subscribed to
    pub fn key(&self) -> Option<&'static str> {
        self.active.as_ref().map(|active| active.key.name())
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn release(&mut self) {
        if let Some(active) = self.active.take() {
            active.subscription.dispose();
            debug!(channel = active.key.name(), "Handler unbound");
        }
    }
}

impl<R: EventMap, T: 'static> Drop for HandlerBinding<R, T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<R: EventMap, T: 'static> fmt::Debug for HandlerBinding<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("key", &self.key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_registry;
    use std::sync::{Arc, Mutex};

    event_registry! {
        struct Counters {
            on_tick: u32,
            on_tock: u32,
        }
    }

    fn recorder(label: &'static str, seen: &Arc<Mutex<Vec<(&'static str, u32)>>>) -> Handler<u32> {
        let seen = Arc::clone(seen);
        Handler::new(move |value: &u32| seen.lock().unwrap().push((label, *value)))
    }

    #[test]
    fn accessors_fail_outside_scope() {
        let manager = create_event_manager(Counters::new());

        assert!(matches!(manager.events(), Err(EventError::ScopeMissing { .. })));
        assert!(matches!(
            manager.event(Counters::ON_TICK),
            Err(EventError::ScopeMissing { .. })
        ));
        assert!(matches!(
            manager.channel::<u32>("on_tick"),
            Err(EventError::ScopeMissing { .. })
        ));
        assert!(matches!(
            manager.event_handler(Counters::ON_TICK, |_: &u32| {}),
            Err(EventError::ScopeMissing { .. })
        ));
    }

    #[test]
    fn provider_exposes_own_registry() {
        let manager = create_event_manager(Counters::new());
        let _scope = manager.provider();

        let events = manager.events().unwrap();
        let tick = manager.event(Counters::ON_TICK).unwrap();

        assert!(events.ptr_eq(manager.registry()));
        assert!(tick.ptr_eq(&manager.registry().on_tick));
    }

    #[test]
    fn clones_share_a_context_and_managers_do_not() {
        let manager = create_event_manager(Counters::new());
        let clone = manager.clone();
        let other = create_event_manager(Counters::new());

        let scope = clone.provider();

        assert_eq!(scope.context(), manager.context());
        assert_ne!(other.context(), manager.context());
        assert!(manager.events().is_ok());
        assert!(other.events().is_err());
    }

    #[test]
    fn scope_closes_after_closure() {
        let manager = create_event_manager(Counters::new());

        let inside = manager.scope(|| manager.events().is_ok());

        assert!(inside);
        assert!(manager.events().is_err());
    }

    #[test]
    fn scope_closes_when_closure_panics() {
        let manager = create_event_manager(Counters::new());

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            manager.scope(|| panic!("consumer failed"))
        }));

        assert!(outcome.is_err());
        assert!(manager.events().is_err());
    }

    #[test]
    fn managers_have_separate_contexts() {
        let first = create_event_manager(Counters::new());
        let second = create_event_manager(Counters::new());
        let _scope = first.provider();

        assert!(first.events().is_ok());
        assert!(second.events().is_err());
    }

    #[test]
    fn binding_subscribes_until_dropped() {
        let manager = create_event_manager(Counters::new());
        let _scope = manager.provider();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let binding = manager
            .event_handler(Counters::ON_TICK, recorder("a", &seen))
            .unwrap();
        manager.registry().on_tick.emit(&1);
        drop(binding);
        manager.registry().on_tick.emit(&2);

        assert_eq!(*seen.lock().unwrap(), vec![("a", 1)]);
        assert_eq!(manager.registry().on_tick.listener_count(), 0);
    }

    #[test]
    fn unchanged_inputs_keep_the_subscription() {
        let manager = create_event_manager(Counters::new());
        let _scope = manager.provider();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder("a", &seen);

        let mut binding = manager
            .event_handler(Counters::ON_TICK, handler.clone())
            .unwrap();
        binding.update(Counters::ON_TICK, handler.clone()).unwrap();
        binding.update(Counters::ON_TICK, handler).unwrap();
        manager.registry().on_tick.emit(&1);

        assert_eq!(*seen.lock().unwrap(), vec![("a", 1)]);
        assert_eq!(manager.registry().on_tick.listener_count(), 1);
    }

    #[test]
    fn changed_handler_replaces_the_old_one() {
        let manager = create_event_manager(Counters::new());
        let _scope = manager.provider();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut binding = manager
            .event_handler(Counters::ON_TICK, recorder("old", &seen))
            .unwrap();
        binding
            .update(Counters::ON_TICK, recorder("new", &seen))
            .unwrap();
        manager.registry().on_tick.emit(&5);

        assert_eq!(*seen.lock().unwrap(), vec![("new", 5)]);
        assert_eq!(manager.registry().on_tick.listener_count(), 1);
    }

    #[test]
    fn changed_key_moves_the_subscription() {
        let manager = create_event_manager(Counters::new());
        let _scope = manager.provider();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder("a", &seen);

        let mut binding = manager
            .event_handler(Counters::ON_TICK, handler.clone())
            .unwrap();
        binding.update(Counters::ON_TOCK, handler).unwrap();

        assert_eq!(binding.key(), Some("on_tock"));
        assert_eq!(manager.registry().on_tick.listener_count(), 0);
        assert_eq!(manager.registry().on_tock.listener_count(), 1);
    }

    #[test]
    fn changed_registry_rebinds() {
        let manager = create_event_manager(Counters::new());
        let replacement = Registry::new(Counters::new());
        let _outer = manager.provider();
        let handler = Handler::new(|_: &u32| {});

        let mut binding = manager
            .event_handler(Counters::ON_TICK, handler.clone())
            .unwrap();
        {
            let _inner = manager.provide(&replacement);
            binding.update(Counters::ON_TICK, handler.clone()).unwrap();
        }

        assert_eq!(manager.registry().on_tick.listener_count(), 0);
        assert_eq!(replacement.on_tick.listener_count(), 1);
    }

    #[test]
    fn failed_update_keeps_previous_subscription() {
        let manager = create_event_manager(Counters::new());
        let scope = manager.provider();
        let handler = Handler::new(|_: &u32| {});

        let mut binding = manager
            .event_handler(Counters::ON_TICK, handler.clone())
            .unwrap();
        drop(scope);

        assert!(binding.update(Counters::ON_TOCK, handler).is_err());
        assert_eq!(binding.key(), Some("on_tick"));
        assert_eq!(manager.registry().on_tick.listener_count(), 1);

        drop(binding);
        assert_eq!(manager.registry().on_tick.listener_count(), 0);
    }
}
