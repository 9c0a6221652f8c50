//! # Error Module
//!
//! Error types for registry and scope lookups.
//!
//! ## Design Principles
//! - **Lookups fail loudly** - a missing scope or an unknown channel name
//!   is a programming error and is returned to the immediate caller
//! - **Dispatch never fails** - emitting with no listeners or with a failing
//!   listener is logged, not raised
//! - **Include context** - registry type and channel name in every message

use thiserror::Error;

/// Top-level error for event lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("No active scope provides {registry}. Wrap the caller in its provider.")]
    ScopeMissing { registry: &'static str },

    #[error("Unknown event channel: {name}")]
    UnknownChannel { name: String },

    #[error("Event channel {name} does not carry payloads of type {expected}")]
    PayloadMismatch { name: String, expected: &'static str },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, EventError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_missing_names_the_registry() {
        let error = EventError::ScopeMissing {
            registry: "ModalEvents",
        };
        let message = error.to_string();
        assert!(message.contains("ModalEvents"));
        assert!(message.contains("provider"));
    }

    #[test]
    fn unknown_channel_includes_name() {
        let error = EventError::UnknownChannel {
            name: "on_close_modal".to_string(),
        };
        assert!(error.to_string().contains("on_close_modal"));
    }

    #[test]
    fn payload_mismatch_includes_expected_type() {
        let error = EventError::PayloadMismatch {
            name: "on_open_modal".to_string(),
            expected: "u32",
        };
        let message = error.to_string();
        assert!(message.contains("on_open_modal"));
        assert!(message.contains("u32"));
    }
}
