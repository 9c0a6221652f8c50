//! # Tiny Events
//!
//! Typed in-process event channels, grouped into registries that are made
//! available to a region of code through scopes.
//!
//! ## Core Philosophy
//! - **Synchronous** - `emit` runs every listener before it returns
//! - **Typed end to end** - channel keys carry their payload type
//! - **Scoped** - consumers reach a registry only inside its provider
//!
//! ## Architecture
//! - `events` - The `Channel` primitive and its listener handles
//! - `core` - Registries, scopes and the accessors built on them
//! - `error` - Lookup errors

pub mod core;
pub mod error;
pub mod events;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at the crate root
pub use crate::core::{create_event_manager, EventKey, EventManager, HandlerBinding, Registry};
pub use error::{EventError, Result};
pub use events::{Channel, Disposable, Handler};

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

#[doc(hidden)]
pub mod __private {
    pub use paste;
}

/// Initialize tracing for the library
///
/// This should be called once by the application entry point. Logs go to
/// stderr, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}

/// Like [`init_tracing`], but shows channel activity at debug level unless
/// `RUST_LOG` says otherwise
pub fn init_verbose_tracing() {
    tracing::subscriber::set_global_default(verbose_subscriber(std::io::stderr))
        .expect("Failed to set global default tracing subscriber");
}

/// The subscriber installed by [`init_verbose_tracing`], writing to `writer`
pub fn verbose_subscriber<W>(writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tiny_events=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish()
}
