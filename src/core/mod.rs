//! # Core Module
//!
//! Registries of named channels and the scopes that make them reachable.
//!
//! ## Modules
//! - `registry` - Fixed, typed collections of channels
//! - `scope` - Thread-local stack of provided registries
//! - `manager` - Provider and accessors built on the two above
//! - `macros` - The `event_registry!` declaration macro

mod macros;
pub mod manager;
pub mod registry;
pub mod scope;

// Re-export commonly used types
pub use manager::{create_event_manager, EventManager, HandlerBinding};
pub use registry::{AnyChannel, EventKey, EventMap, Registry};
pub use scope::{ContextId, ScopeGuard};
