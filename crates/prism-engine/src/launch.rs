//! Process entry for the demo binaries: logging, runtime, exit status.

use std::process::ExitCode;

use anyhow::Result;

use crate::device::{BootstrapError, GpuInit};
use crate::logging::{LoggingConfig, init_logging};
use crate::scene::{Scene, SceneApp};
use crate::window::{Runtime, RuntimeConfig, StopHandle};

/// Status for a loop that ended normally.
pub const EXIT_OK: u8 = 0;
/// Status for a device that could not be loaded.
pub const EXIT_EXTENSION_LOAD: u8 = 1;
/// Status for any other fatal error.
pub const EXIT_FAILURE: u8 = 1;

/// GPU settings the demos run with: no sRGB re-encoding of clear colors or
/// texels.
pub fn demo_gpu_init() -> GpuInit {
    GpuInit::default().with_srgb(false)
}

/// Runs `scene` in a window configured by `config` until the window closes.
pub fn run_scene(config: RuntimeConfig, scene: Scene) -> ExitCode {
    run_scene_with_stop(config, scene, |_| {})
}

/// Like [`run_scene`], but hands `on_stop` the loop's [`StopHandle`] before
/// blocking, so another thread can end the loop.
pub fn run_scene_with_stop<F>(config: RuntimeConfig, scene: Scene, on_stop: F) -> ExitCode
where
    F: FnOnce(StopHandle),
{
    run_scene_with(config, demo_gpu_init(), scene, on_stop)
}

pub fn run_scene_with<F>(
    config: RuntimeConfig,
    gpu_init: GpuInit,
    scene: Scene,
    on_stop: F,
) -> ExitCode
where
    F: FnOnce(StopHandle),
{
    init_logging(LoggingConfig::default());
    log_ignored_args(std::env::args().skip(1));

    let result = try_run(config, gpu_init, scene, on_stop);
    report(&result);
    ExitCode::from(exit_status(&result))
}

fn try_run<F>(config: RuntimeConfig, gpu_init: GpuInit, scene: Scene, on_stop: F) -> Result<()>
where
    F: FnOnce(StopHandle),
{
    let app = SceneApp::new(scene)?;
    let runtime = Runtime::new()?;
    on_stop(runtime.stop_handle());
    runtime.run(config, gpu_init, app)
}

/// The bootstrap failure in `err`'s chain, if any.
pub fn bootstrap_error(err: &anyhow::Error) -> Option<&BootstrapError> {
    err.chain().find_map(|e| e.downcast_ref::<BootstrapError>())
}

/// Maps a run's outcome to the process exit status.
pub fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => EXIT_OK,
        Err(err) => match bootstrap_error(err) {
            Some(BootstrapError::ExtensionLoad(_)) => EXIT_EXTENSION_LOAD,
            _ => EXIT_FAILURE,
        },
    }
}

/// The line written to stderr for a failed run.
pub fn error_line(err: &anyhow::Error) -> String {
    match bootstrap_error(err) {
        Some(BootstrapError::ExtensionLoad(msg)) => format!("Error: '{msg}'"),
        _ => format!("Error: {err:#}"),
    }
}

fn report(result: &Result<()>) {
    if let Err(err) = result {
        eprintln!("{}", error_line(err));
    }
}

fn log_ignored_args<I>(args: I)
where
    I: IntoIterator<Item = String>,
{
    for arg in args {
        log::debug!("ignoring argument {arg:?}");
    }
}
