use thiserror::Error;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate.
    Fatal,
}

/// Failures while bringing up the window and its device.
///
/// `ExtensionLoad` is the one bootstrap failure the demos report specially:
/// the message goes to stderr as `Error: '<message>'` and the process exits
/// with status 1 before anything is uploaded or drawn.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("{0}")]
    ExtensionLoad(String),
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("event loop failure: {0}")]
    EventLoop(String),
}
