//! The modal example: a host that shows modals and a button that asks for one.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tiny_events::events::DispatchReport;
use tiny_events::{event_registry, Channel, EventManager, Handler, HandlerBinding, Result};

/// Payload of `on_open_modal`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenModal {
    pub modal_id: String,
}

event_registry! {
    /// Events shared between the modal host and the controls that open it
    pub struct ModalEvents {
        /// Asks the modal host to show a modal
        on_open_modal: OpenModal,
        /// Asks the modal host to close whatever is open
        on_close_modal: (),
    }
}

/// Shows whichever modal was requested last
pub struct ModalHost {
    shown: Arc<Mutex<Vec<OpenModal>>>,
    _opened: HandlerBinding<ModalEvents, OpenModal>,
    _closed: HandlerBinding<ModalEvents, ()>,
}

impl ModalHost {
    pub fn mount(manager: &EventManager<ModalEvents>) -> Result<Self> {
        let shown = Arc::new(Mutex::new(Vec::new()));

        let on_open = Arc::clone(&shown);
        let opened = manager.event_handler(
            ModalEvents::ON_OPEN_MODAL,
            Handler::new(move |event: &OpenModal| {
                if let Ok(mut shown) = on_open.lock() {
                    shown.push(event.clone());
                }
            }),
        )?;
        let closed = manager.event_handler(
            ModalEvents::ON_CLOSE_MODAL,
            Handler::new(|_: &()| tracing::info!("Modal closed")),
        )?;

        Ok(Self {
            shown,
            _opened: opened,
            _closed: closed,
        })
    }

    /// Every modal this host was asked to show, oldest first
    pub fn shown(&self) -> Vec<OpenModal> {
        self.shown.lock().map(|shown| shown.clone()).unwrap_or_default()
    }
}

/// Emits `on_open_modal` when clicked
pub struct OpenModalButton {
    open_modal: Channel<OpenModal>,
}

impl OpenModalButton {
    pub fn mount(manager: &EventManager<ModalEvents>) -> Result<Self> {
        Ok(Self {
            open_modal: manager.event(ModalEvents::ON_OPEN_MODAL)?,
        })
    }

    pub fn click(&self, modal_id: &str) -> DispatchReport {
        self.open_modal.emit(&OpenModal {
            modal_id: modal_id.to_string(),
        })
    }
}
