//! Listener handles and registration undo handles.

use std::fmt;
use std::sync::Arc;

type ListenerFn<T> = dyn Fn(&T) + Send + Sync;

/// A listener that can be registered on a [`Channel`](super::Channel).
///
/// Closures have no identity of their own, so a `Handler` wraps one in an
/// `Arc` and compares by pointer. Clones of a handler are the *same*
/// handler: registering a clone and calling `off` with the original removes
/// it.
pub struct Handler<T> {
    inner: Arc<ListenerFn<T>>,
}

impl<T> Handler<T> {
    /// Wrap a closure as a new, distinct handler.
    pub fn new(f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// Whether two handles refer to the same listener.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn call(&self, payload: &T) {
        (self.inner)(payload)
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

impl<T, F> From<F> for Handler<T>
where
    F: Fn(&T) + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Undoes exactly one registration.
///
/// Dropping a `Disposable` without calling [`dispose`](Self::dispose) leaves
/// the registration in place.
#[must_use = "dropping a Disposable does not remove the listener"]
pub struct Disposable {
    undo: Box<dyn FnOnce() + Send>,
}

impl Disposable {
    pub(crate) fn new(undo: impl FnOnce() + Send + 'static) -> Self {
        Self {
            undo: Box::new(undo),
        }
    }

    /// Remove the registration this handle was returned for.
    pub fn dispose(self) {
        (self.undo)()
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable").finish_non_exhaustive()
    }
}
