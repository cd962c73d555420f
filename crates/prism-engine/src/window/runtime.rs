use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{BootstrapError, DisplayMode, Gpu, GpuInit};
use crate::time::FrameClock;

use super::stop::{RuntimeEvent, StopHandle};

/// When redraws are requested.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RedrawPolicy {
    /// Only when the window needs repainting: first show, expose, resize.
    #[default]
    OnDemand,
    /// Every loop iteration.
    Continuous,
}

/// Window configuration, complete before the window is created.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Inner size in physical pixels.
    pub size: PhysicalSize<u32>,
    /// Outer top-left position on screen; `None` leaves it to the platform.
    pub position: Option<PhysicalPosition<i32>>,
    pub display_mode: DisplayMode,
    pub redraw: RedrawPolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            size: PhysicalSize::new(640, 480),
            position: None,
            display_mode: DisplayMode::DOUBLE_RGBA,
            redraw: RedrawPolicy::OnDemand,
        }
    }
}

impl RuntimeConfig {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = PhysicalSize::new(width, height);
        self
    }

    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.position = Some(PhysicalPosition::new(x, y));
        self
    }

    pub fn display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn redraw(mut self, policy: RedrawPolicy) -> Self {
        self.redraw = policy;
        self
    }

    fn window_attributes(&self) -> winit::window::WindowAttributes {
        let attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.size);
        match self.position {
            Some(pos) => attrs.with_position(pos),
            None => attrs,
        }
    }
}

/// Owns the event loop until `run` is called.
pub struct Runtime {
    event_loop: EventLoop<RuntimeEvent>,
    stop: StopHandle,
}

impl Runtime {
    pub fn new() -> Result<Self> {
        let event_loop = EventLoop::<RuntimeEvent>::with_user_event()
            .build()
            .map_err(|e| BootstrapError::EventLoop(e.to_string()))
            .context("failed to create winit EventLoop")?;
        let stop = StopHandle::with_waker(event_loop.create_proxy());
        Ok(Self { event_loop, stop })
    }

    /// Handle that makes `run` return; may be moved to another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Creates the window and device, hands the device to
    /// `App::on_device_ready`, then blocks dispatching events until the
    /// window closes, the app exits, or a stop is requested.
    ///
    /// Returns the first fatal error, with a [`BootstrapError`] in its chain
    /// when the window or device could not be brought up.
    pub fn run<A>(self, config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let gpu_init = gpu_init.with_display_mode(config.display_mode);
        let mut state = AppState::new(config, gpu_init, app, self.stop);

        self.event_loop
            .run_app(&mut state)
            .map_err(|e| BootstrapError::EventLoop(e.to_string()))
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => {
                log::info!("event loop returned");
                Ok(())
            }
        }
    }
}

/// Loads the device for `window`, then hands it to `ready` for upload.
///
/// A failed load becomes [`BootstrapError::ExtensionLoad`] and `ready` is
/// never called.
fn bring_up<'w, W, D>(
    window: &'w W,
    load: impl FnOnce(&'w W) -> Result<D>,
    ready: impl FnOnce(&D) -> Result<()>,
) -> Result<D>
where
    W: ?Sized,
{
    let device = load(window).map_err(|e| BootstrapError::ExtensionLoad(format!("{e:#}")))?;
    ready(&device).context("static resource upload failed")?;
    Ok(device)
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    stop: StopHandle,

    entry: Option<WindowEntry>,
    fatal: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A, stop: StopHandle) -> Self {
        Self {
            config,
            gpu_init,
            app,
            stop,
            entry: None,
            fatal: None,
            exit_requested: false,
        }
    }

    /// Keeps the first fatal error and tears the window down.
    fn record_failure(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.entry = None;
        self.exit_requested = true;
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.record_failure(err);
        event_loop.exit();
    }

    fn should_exit(&self) -> bool {
        self.exit_requested || self.stop.is_stop_requested()
    }

    /// Window → device → upload, strictly in that order.
    fn bootstrap(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(self.config.window_attributes())
            .map_err(|e| BootstrapError::Window(e.to_string()))?;
        log::info!(
            "window {:?} created ({}x{})",
            self.config.title,
            self.config.size.width,
            self.config.size.height
        );

        let gpu_init = self.gpu_init.clone();
        let app = &mut self.app;
        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| {
                bring_up(
                    w,
                    |w| pollster::block_on(Gpu::new(w, gpu_init)),
                    |gpu| app.on_device_ready(gpu),
                )
            },
        }
        .try_build()?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    fn redraw(&mut self) -> AppControl {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return AppControl::Continue;
        };

        entry.with_mut(|fields| {
            let time = fields.clock.tick();
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    window: fields.window,
                },
                gpu: fields.gpu,
                time,
            };
            app.on_frame(&mut ctx)
        })
    }

    fn request_redraw(&self) {
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }
}

impl<A> ApplicationHandler<RuntimeEvent> for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            self.request_redraw();
            return;
        }
        if self.exit_requested {
            return;
        }

        if let Err(err) = self.bootstrap(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: RuntimeEvent) {
        match event {
            RuntimeEvent::Stop => {
                log::debug!("stop event received");
                self.exit_requested = true;
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit() {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        if self.config.redraw == RedrawPolicy::Continuous {
            self.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested || self.entry.is_none() {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested");
                self.entry = None;
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                }
                self.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
                self.request_redraw();
            }

            WindowEvent::Occluded(false) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_clock_mut(|c| c.reset());
                }
                self.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == AppControl::Exit {
                    self.exit_requested = true;
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::{EXIT_EXTENSION_LOAD, error_line, exit_status};

    #[derive(Default)]
    struct Recorder {
        uploads: u32,
        frames: u32,
    }

    impl App for Recorder {
        fn on_device_ready(&mut self, _gpu: &Gpu<'_>) -> Result<()> {
            self.uploads += 1;
            Ok(())
        }

        fn on_frame(&mut self, _ctx: &mut FrameCtx<'_, '_>) -> AppControl {
            self.frames += 1;
            AppControl::Continue
        }
    }

    fn state(stop: StopHandle) -> AppState<Recorder> {
        AppState::new(RuntimeConfig::default(), GpuInit::default(), Recorder::default(), stop)
    }

    // ── bootstrap ─────────────────────────────────────────────────────────

    #[test]
    fn failed_device_load_skips_upload() {
        let mut uploads = 0;
        let result = bring_up(
            "window",
            |_| -> Result<u32> { Err(anyhow::anyhow!("no adapter")) },
            |_| {
                uploads += 1;
                Ok(())
            },
        );
        assert_eq!(uploads, 0);

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BootstrapError>(),
            Some(BootstrapError::ExtensionLoad(msg)) if msg == "no adapter"
        ));
    }

    #[test]
    fn loaded_device_is_uploaded_once() {
        let mut seen = Vec::new();
        let device = bring_up("window", |w| Ok(w.len()), |d| {
            seen.push(*d);
            Ok(())
        });
        assert_eq!(device.unwrap(), 6);
        assert_eq!(seen, vec![6]);
    }

    #[test]
    fn upload_failure_is_not_an_extension_load() {
        let result = bring_up("w", |_| Ok(()), |_| Err(anyhow::anyhow!("too big")));
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<BootstrapError>().is_none());
        assert_eq!(exit_status(&Err(err)), 1);
    }

    #[test]
    fn failed_bootstrap_never_draws_and_exits_one() {
        let mut st = state(StopHandle::new());
        let err = bring_up("w", |_| -> Result<()> { Err(anyhow::anyhow!("glew")) }, |_| Ok(()))
            .unwrap_err();
        st.record_failure(err);

        assert!(st.should_exit());
        assert_eq!(st.redraw(), AppControl::Continue);
        assert_eq!(st.app.uploads, 0);
        assert_eq!(st.app.frames, 0);

        let fatal = st.fatal.take().unwrap();
        assert_eq!(error_line(&fatal), "Error: 'glew'");
        assert_eq!(exit_status(&Err(fatal)), EXIT_EXTENSION_LOAD);
    }

    #[test]
    fn first_failure_is_kept() {
        let mut st = state(StopHandle::new());
        st.record_failure(anyhow::anyhow!("first"));
        st.record_failure(anyhow::anyhow!("second"));
        assert_eq!(st.fatal.unwrap().to_string(), "first");
    }

    // ── stop ──────────────────────────────────────────────────────────────

    #[test]
    fn stop_from_handed_out_handle_ends_loop() {
        let handle = StopHandle::new();
        let st = state(handle.clone());
        assert!(!st.should_exit());

        std::thread::spawn(move || handle.stop()).join().unwrap();
        assert!(st.should_exit());
    }

    // ── config ────────────────────────────────────────────────────────────

    #[test]
    fn builder_sets_every_field() {
        let c = RuntimeConfig::default()
            .title("t")
            .size(1136, 640)
            .position(100, 100)
            .redraw(RedrawPolicy::Continuous);
        assert_eq!(c.title, "t");
        assert_eq!(c.size, PhysicalSize::new(1136, 640));
        assert_eq!(c.position, Some(PhysicalPosition::new(100, 100)));
        assert_eq!(c.redraw, RedrawPolicy::Continuous);
        assert_eq!(c.display_mode, DisplayMode::DOUBLE_RGBA);
    }

    #[test]
    fn default_redraw_is_on_demand() {
        assert_eq!(RuntimeConfig::default().redraw, RedrawPolicy::OnDemand);
        assert_eq!(RuntimeConfig::default().position, None);
    }
}
