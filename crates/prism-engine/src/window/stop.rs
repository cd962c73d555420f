use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use winit::event_loop::EventLoopProxy;

/// Events the runtime sends itself.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum RuntimeEvent {
    Stop,
}

/// Asks a running event loop to return.
///
/// Clones share one flag. Once the runtime owns the handle it also wakes the
/// blocked loop, so a stop requested from another thread is seen promptly.
#[derive(Debug, Clone)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
    waker: Option<EventLoopProxy<RuntimeEvent>>,
}

impl StopHandle {
    /// A handle not yet tied to an event loop.
    pub fn new() -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            waker: None,
        }
    }

    pub(crate) fn with_waker(waker: EventLoopProxy<RuntimeEvent>) -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            waker: Some(waker),
        }
    }

    /// Requests a stop. Idempotent.
    pub fn stop(&self) {
        if self.requested.swap(true, Ordering::AcqRel) {
            return;
        }
        log::debug!("stop requested");
        if let Some(waker) = &self.waker {
            // Closed loop means it already returned.
            let _ = waker.send_event(RuntimeEvent::Stop);
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}
