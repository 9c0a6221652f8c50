//! Thread-local stack of provided registries.
//!
//! Every [`EventManager`](super::EventManager) owns a [`ContextId`]. Providing
//! a registry pushes `(context, registry)` onto this thread's stack and hands
//! back a [`ScopeGuard`]; lookups walk the stack from the top, so the
//! innermost provider of a context wins. Dropping the guard removes its entry
//! again, also when the stack unwinds through it.

use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

type ProvidedRegistry = Arc<dyn Any + Send + Sync>;

struct ScopeEntry {
    context: ContextId,
    token: u64,
    registry: ProvidedRegistry,
}

thread_local! {
    static SCOPES: RefCell<Vec<ScopeEntry>> = const { RefCell::new(Vec::new()) };
}

static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(1);
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identity of one provider/consumer pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Keeps a registry provided for as long as it lives.
///
/// Not `Send`: the scope belongs to the thread that opened it.
#[must_use = "the scope closes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    context: ContextId,
    token: u64,
    _thread_bound: PhantomData<Rc<()>>,
}

impl ScopeGuard {
    pub fn context(&self) -> ContextId {
        self.context
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let token = self.token;
        let removed = SCOPES
            .try_with(|scopes| {
                let mut scopes = scopes.borrow_mut();
                let index = scopes.iter().rposition(|entry| entry.token == token)?;
                if index + 1 != scopes.len() {
                    warn!(
                        context = self.context.0,
                        "Scope closed while nested scopes were still open"
                    );
                }
                Some(scopes.remove(index))
            })
            .ok()
            .flatten();

        // Dropped outside the borrow: the registry may own listeners with guards of their own
        if let Some(entry) = removed {
            debug!(context = entry.context.0, "Scope closed");
            drop(entry.registry);
        }
    }
}

pub(crate) fn push(context: ContextId, registry: ProvidedRegistry) -> ScopeGuard {
    let token = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
    SCOPES.with(|scopes| {
        scopes.borrow_mut().push(ScopeEntry {
            context,
            token,
            registry,
        })
    });
    debug!(context = context.0, "Scope opened");

    ScopeGuard {
        context,
        token,
        _thread_bound: PhantomData,
    }
}

/// The registry bound by the innermost open scope of `context`
pub(crate) fn resolve(context: ContextId) -> Option<ProvidedRegistry> {
    SCOPES.with(|scopes| {
        scopes
            .borrow()
            .iter()
            .rev()
            .find(|entry| entry.context == context)
            .map(|entry| Arc::clone(&entry.registry))
    })
}

/// Number of scopes open on the current thread, across all contexts
pub fn depth() -> usize {
    SCOPES.with(|scopes| scopes.borrow().len())
}
