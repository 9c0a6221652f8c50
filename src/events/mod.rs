//! # Events Module
//!
//! Typed, synchronous, in-process event channels.
//!
//! ## Design
//! A [`Channel`] delivers each emitted payload to its listeners on the
//! calling thread, in registration order, before `emit` returns. Nothing is
//! queued or replayed: a payload emitted while nobody listens is dropped
//! with a warning.
//!
//! ## Example
//! ```rust,ignore
//! let opened = Channel::<String>::new();
//!
//! let subscription = opened.on(|id: &String| println!("Opening {id}"));
//! opened.once(|_: &String| println!("First modal of the session"));
//!
//! opened.emit(&"settings".to_string());
//! subscription.dispose();
//! ```

mod channel;
mod handler;
mod types;

pub use channel::Channel;
pub use handler::{Disposable, Handler};
pub use types::*;
