//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tiny_events::event_registry;

#[path = "../../src/test_support.rs"]
mod test_support;

pub use test_support::{capture_logs, CapturedLogs};

/// Payload of `on_open_modal`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenModal {
    pub modal_id: String,
}

event_registry! {
    pub struct ModalEvents {
        on_open_modal: OpenModal,
        on_close_modal: (),
    }
}

/// A handler that records every payload it receives
pub fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, tiny_events::Handler<T>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler = tiny_events::Handler::new(move |payload: &T| {
        sink.lock().unwrap().push(payload.clone())
    });
    (seen, handler)
}
