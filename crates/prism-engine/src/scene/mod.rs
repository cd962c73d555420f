//! A single-primitive scene and the app that uploads and redraws it.
//!
//! `SceneApp` is the only owner of the scene's device handles: they are
//! written once in `on_device_ready` and read by every `on_frame`.

use anyhow::{Context, Result};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::Gpu;
use crate::paint::Color;
use crate::render::{self, DrawStrategy, FramePlan, SceneRenderer, SceneResources};

/// What to draw and what to clear to.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub clear: Color,
    pub strategy: DrawStrategy,
}

impl Scene {
    pub fn new(strategy: DrawStrategy) -> Self {
        Self {
            clear: Color::BLACK,
            strategy,
        }
    }

    pub fn with_clear(mut self, clear: Color) -> Self {
        self.clear = clear;
        self
    }

    /// The redraw cycle for this scene.
    pub fn frame_plan(&self) -> FramePlan {
        FramePlan::for_strategy(&self.strategy, self.clear)
    }
}

/// Drives one [`Scene`] through upload and redraw.
pub struct SceneApp {
    scene: Scene,
    plan: FramePlan,
    resources: Option<SceneResources>,
    renderer: SceneRenderer,
    redraws: u64,
}

impl SceneApp {
    /// Fails if the scene's redraw cycle is malformed.
    pub fn new(scene: Scene) -> Result<Self> {
        let plan = scene.frame_plan();
        plan.validate().context("scene produces an invalid redraw cycle")?;
        Ok(Self {
            scene,
            plan,
            resources: None,
            renderer: SceneRenderer::new(),
            redraws: 0,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// `None` until upload has happened.
    pub fn resources(&self) -> Option<&SceneResources> {
        self.resources.as_ref()
    }

    /// Plan for the next redraw; `None` before upload, so nothing is drawn.
    pub fn frame_plan(&self) -> Option<&FramePlan> {
        self.resources.as_ref().map(|_| &self.plan)
    }

    /// Redraw requests handled so far, including ones skipped because the
    /// back buffer could not be acquired.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

impl App for SceneApp {
    fn on_device_ready(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        if self.resources.is_some() {
            log::warn!("scene already uploaded; ignoring second device-ready");
            return Ok(());
        }

        let resources = render::upload(gpu.device(), gpu.queue(), &self.scene.strategy)
            .context("failed to upload scene resources")?;
        log::info!(
            "scene uploaded ({:?}, {} steps per redraw)",
            self.scene.strategy.primitive(),
            self.plan.steps().len()
        );
        self.resources = Some(resources);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(resources) = self.resources.as_ref() else {
            return AppControl::Continue;
        };

        log::trace!("redraw {} (dt {:.4}s)", ctx.time.frame_index, ctx.time.dt);

        let (plan, strategy, renderer) = (&self.plan, &self.scene.strategy, &mut self.renderer);
        let clear = plan.clear_color().unwrap_or(self.scene.clear);

        let control = ctx.render(clear, |rctx, target| {
            renderer.encode(rctx, target, plan, strategy, resources);
        });

        self.redraws += 1;
        control
    }
}
