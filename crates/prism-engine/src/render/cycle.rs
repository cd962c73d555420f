//! One redraw cycle, as an ordered list of steps checked by a state machine.
//!
//! ```text
//! Idle → Clearing → AttributesEnabled → Bound → Drawn → Swapped → Idle
//! ```
//!
//! A [`FramePlan`] is built once from the scene's [`DrawStrategy`] and
//! validated by [`RedrawCycle`]; the renderer encodes the same plan against
//! wgpu on every redraw.
//! Attribute enables are pipeline state in wgpu, so the enable, declare and
//! disable steps are checked here and realized by pipeline selection.

use std::collections::BTreeSet;

use thiserror::Error;

use super::geometry::VertexAttribute;
use super::primitive::PrimitiveKind;
use super::strategy::{DrawCall, DrawStrategy, ImmediateVertex};
use crate::paint::Color;

/// Phase of the redraw state machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RedrawPhase {
    Idle,
    Clearing,
    AttributesEnabled,
    Bound,
    Drawn,
    Swapped,
}

/// One step of a redraw cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawStep {
    Clear(Color),
    EnableAttribute(u32),
    EnableTexturing,
    BindTexture,
    /// Byte layout of an enabled attribute against the vertex store.
    DeclareAttribute { attribute: VertexAttribute, stride: u64 },
    BindVertexBuffer,
    BindIndexBuffer,
    /// Opens an immediate-mode emission bracket.
    Begin(PrimitiveKind),
    Emit(ImmediateVertex),
    /// Closes the bracket and draws what was emitted.
    End,
    Draw(DrawCall),
    DisableAttribute(u32),
    DisableTexturing,
    Present,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CycleError {
    #[error("{step} not allowed while {phase:?}")]
    OutOfOrder { step: &'static str, phase: RedrawPhase },
    #[error("attribute {0} enabled twice")]
    AlreadyEnabled(u32),
    #[error("attribute {0} used without being enabled")]
    NotEnabled(u32),
    #[error("texturing used without being enabled")]
    TexturingNotEnabled,
    #[error("second draw in one cycle")]
    SecondDraw,
    #[error("emission bracket not balanced")]
    UnbalancedBracket,
    #[error("present with state still enabled: attributes {attributes:?}, texturing {texturing}")]
    LeakedState { attributes: Vec<u32>, texturing: bool },
}

/// Tracks the phase and the enabled state across one cycle.
#[derive(Debug, Clone)]
pub struct RedrawCycle {
    phase: RedrawPhase,
    enabled: BTreeSet<u32>,
    texturing: bool,
    in_bracket: bool,
    draws: u32,
}

impl Default for RedrawCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RedrawCycle {
    pub fn new() -> Self {
        Self {
            phase: RedrawPhase::Idle,
            enabled: BTreeSet::new(),
            texturing: false,
            in_bracket: false,
            draws: 0,
        }
    }

    pub fn phase(&self) -> RedrawPhase {
        self.phase
    }

    /// Attribute indices currently enabled.
    pub fn enabled_attributes(&self) -> impl Iterator<Item = u32> + '_ {
        self.enabled.iter().copied()
    }

    pub fn texturing(&self) -> bool {
        self.texturing
    }

    /// Applies one step, advancing the phase.
    pub fn apply(&mut self, step: &DrawStep) -> Result<(), CycleError> {
        use RedrawPhase::*;

        match step {
            DrawStep::Clear(_) => {
                self.expect("clear", &[Idle])?;
                self.phase = Clearing;
            }
            DrawStep::EnableAttribute(i) => {
                self.expect("enable attribute", &[Clearing, AttributesEnabled])?;
                if !self.enabled.insert(*i) {
                    return Err(CycleError::AlreadyEnabled(*i));
                }
                self.phase = AttributesEnabled;
            }
            DrawStep::EnableTexturing => {
                self.expect("enable texturing", &[Clearing, AttributesEnabled])?;
                self.texturing = true;
                self.phase = AttributesEnabled;
            }
            DrawStep::BindTexture => {
                self.expect("bind texture", &[AttributesEnabled])?;
                if !self.texturing {
                    return Err(CycleError::TexturingNotEnabled);
                }
            }
            DrawStep::DeclareAttribute { attribute, .. } => {
                self.expect("declare attribute", &[AttributesEnabled])?;
                if !self.enabled.contains(&attribute.location) {
                    return Err(CycleError::NotEnabled(attribute.location));
                }
            }
            DrawStep::BindVertexBuffer | DrawStep::BindIndexBuffer => {
                self.expect("bind buffer", &[AttributesEnabled, Bound])?;
                self.phase = Bound;
            }
            DrawStep::Begin(_) => {
                self.expect("begin", &[AttributesEnabled])?;
                self.in_bracket = true;
                self.phase = Bound;
            }
            DrawStep::Emit(_) => {
                self.expect("emit", &[Bound])?;
                if !self.in_bracket {
                    return Err(CycleError::UnbalancedBracket);
                }
            }
            DrawStep::End => {
                self.expect("end", &[Bound])?;
                if !self.in_bracket {
                    return Err(CycleError::UnbalancedBracket);
                }
                self.in_bracket = false;
                self.record_draw()?;
            }
            DrawStep::Draw(_) => {
                self.expect("draw", &[Bound, Drawn])?;
                if self.in_bracket {
                    return Err(CycleError::UnbalancedBracket);
                }
                self.record_draw()?;
            }
            DrawStep::DisableAttribute(i) => {
                self.expect("disable attribute", &[Drawn])?;
                if !self.enabled.remove(i) {
                    return Err(CycleError::NotEnabled(*i));
                }
            }
            DrawStep::DisableTexturing => {
                self.expect("disable texturing", &[Drawn])?;
                if !self.texturing {
                    return Err(CycleError::TexturingNotEnabled);
                }
                self.texturing = false;
            }
            DrawStep::Present => {
                self.expect("present", &[Drawn])?;
                if !self.enabled.is_empty() || self.texturing {
                    return Err(CycleError::LeakedState {
                        attributes: self.enabled.iter().copied().collect(),
                        texturing: self.texturing,
                    });
                }
                self.phase = Swapped;
            }
        }
        Ok(())
    }

    /// Returns to `Idle` after a present, ready for the next cycle.
    pub fn finish(&mut self) -> Result<(), CycleError> {
        self.expect("finish", &[RedrawPhase::Swapped])?;
        *self = Self::new();
        Ok(())
    }

    fn record_draw(&mut self) -> Result<(), CycleError> {
        if self.draws > 0 {
            return Err(CycleError::SecondDraw);
        }
        self.draws = 1;
        self.phase = RedrawPhase::Drawn;
        Ok(())
    }

    fn expect(&self, step: &'static str, allowed: &[RedrawPhase]) -> Result<(), CycleError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(CycleError::OutOfOrder { step, phase: self.phase })
        }
    }
}

/// The steps of one redraw cycle, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    steps: Vec<DrawStep>,
}

impl FramePlan {
    /// Builds the cycle for `strategy`, clearing to `clear`.
    pub fn for_strategy(strategy: &DrawStrategy, clear: Color) -> Self {
        let mut steps = vec![DrawStep::Clear(clear)];

        match strategy {
            DrawStrategy::Buffered(draw) => {
                let layout = draw.geometry().layout();
                let locations: Vec<u32> = layout.attributes.iter().map(|a| a.location).collect();

                steps.extend(locations.iter().map(|&i| DrawStep::EnableAttribute(i)));
                steps.extend(layout.attributes.iter().map(|&attribute| {
                    DrawStep::DeclareAttribute { attribute, stride: layout.stride }
                }));
                steps.push(DrawStep::BindVertexBuffer);
                if draw.geometry().indices().is_some() {
                    steps.push(DrawStep::BindIndexBuffer);
                }
                steps.push(DrawStep::Draw(draw.call()));
                steps.extend(locations.iter().map(|&i| DrawStep::DisableAttribute(i)));
            }
            DrawStrategy::Immediate(draw) => {
                steps.push(DrawStep::EnableTexturing);
                steps.push(DrawStep::BindTexture);
                steps.push(DrawStep::Begin(draw.primitive()));
                steps.extend(draw.vertices().iter().map(|&v| DrawStep::Emit(v)));
                steps.push(DrawStep::End);
                steps.push(DrawStep::DisableTexturing);
            }
        }

        steps.push(DrawStep::Present);
        Self { steps }
    }

    pub fn steps(&self) -> &[DrawStep] {
        &self.steps
    }

    pub fn clear_color(&self) -> Option<Color> {
        self.steps.iter().find_map(|s| match s {
            DrawStep::Clear(c) => Some(*c),
            _ => None,
        })
    }

    /// Immediate-mode vertices in emission order.
    pub fn emitted(&self) -> Vec<ImmediateVertex> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                DrawStep::Emit(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Number of steps that issue a draw (`Draw` or `End`).
    pub fn draw_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, DrawStep::Draw(_) | DrawStep::End))
            .count()
    }

    /// Runs the plan through a fresh state machine, ending back at `Idle`.
    pub fn validate(&self) -> Result<(), CycleError> {
        let mut cycle = RedrawCycle::new();
        self.steps.iter().try_for_each(|s| cycle.apply(s))?;
        cycle.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::geometry::{GeometryBuffer, VertexLayout};
    use crate::render::image::ImageBuffer;
    use crate::render::strategy::{BufferedDraw, ImmediateDraw};

    fn triangle_strategy() -> DrawStrategy {
        #[rustfmt::skip]
        let v = vec![
            -0.5, -0.5, 0.0, 0.0, 0.0,
             0.5, -0.5, 0.0, 0.0, 0.0,
             0.5,  0.5, 0.0, 0.0, 0.0,
            -0.5,  0.5, 0.0, 0.0, 0.0,
        ];
        let g = GeometryBuffer::new(v, Some(vec![0, 1, 2, 2, 3, 0]), VertexLayout::packed_f32(&[3, 2]))
            .unwrap();
        DrawStrategy::Buffered(
            BufferedDraw::new(PrimitiveKind::Triangles, g, DrawCall::Arrays { first: 0, count: 3 })
                .unwrap(),
        )
    }

    fn quad_strategy() -> DrawStrategy {
        let draw = ImmediateDraw::new(
            PrimitiveKind::Quads,
            vec![
                ImmediateVertex::new([0.0, 0.0], [-0.5, -0.5]),
                ImmediateVertex::new([1.0, 0.0], [1.0, -1.0]),
                ImmediateVertex::new([1.0, 1.0], [1.0, 1.0]),
                ImmediateVertex::new([0.0, 1.0], [-1.0, 1.0]),
            ],
            ImageBuffer::filled(2, 2, [0, 128, 255]).unwrap(),
        )
        .unwrap();
        DrawStrategy::Immediate(draw)
    }

    // ── plans ─────────────────────────────────────────────────────────────

    #[test]
    fn buffered_plan_follows_cycle_order() {
        let plan = FramePlan::for_strategy(&triangle_strategy(), Color::BLACK);
        let steps = plan.steps();
        assert_eq!(steps[0], DrawStep::Clear(Color::BLACK));
        assert_eq!(steps[1], DrawStep::EnableAttribute(0));
        assert_eq!(steps[2], DrawStep::EnableAttribute(1));
        assert!(matches!(steps[3], DrawStep::DeclareAttribute { stride: 20, .. }));
        assert!(matches!(steps[4], DrawStep::DeclareAttribute { .. }));
        assert_eq!(steps[5], DrawStep::BindVertexBuffer);
        assert_eq!(steps[6], DrawStep::BindIndexBuffer);
        assert_eq!(steps[7], DrawStep::Draw(DrawCall::Arrays { first: 0, count: 3 }));
        assert_eq!(steps[8], DrawStep::DisableAttribute(0));
        assert_eq!(steps[9], DrawStep::DisableAttribute(1));
        assert_eq!(steps[10], DrawStep::Present);
        assert_eq!(plan.validate(), Ok(()));
    }

    #[test]
    fn immediate_plan_brackets_emitted_vertices() {
        let plan = FramePlan::for_strategy(&quad_strategy(), Color::BLACK);
        assert_eq!(plan.steps()[1], DrawStep::EnableTexturing);
        assert_eq!(plan.steps()[2], DrawStep::BindTexture);
        assert_eq!(plan.steps()[3], DrawStep::Begin(PrimitiveKind::Quads));
        assert_eq!(plan.emitted().len(), 4);
        assert_eq!(plan.draw_count(), 1);
        assert!(!plan.steps().iter().any(|s| matches!(s, DrawStep::DeclareAttribute { .. })));
        assert_eq!(plan.validate(), Ok(()));
    }

    #[test]
    fn every_plan_draws_exactly_once() {
        for s in [triangle_strategy(), quad_strategy()] {
            assert_eq!(FramePlan::for_strategy(&s, Color::BLACK).draw_count(), 1);
        }
    }

    // ── state machine ─────────────────────────────────────────────────────

    #[test]
    fn repeated_cycles_leave_no_enabled_state() {
        let plan = FramePlan::for_strategy(&triangle_strategy(), Color::BLACK);
        let mut cycle = RedrawCycle::new();
        for _ in 0..5 {
            let mut enabled_this_cycle = Vec::new();
            for step in plan.steps() {
                cycle.apply(step).unwrap();
                if let DrawStep::EnableAttribute(i) = step {
                    enabled_this_cycle.push(*i);
                }
            }
            assert_eq!(enabled_this_cycle, vec![0, 1]);
            assert_eq!(cycle.enabled_attributes().count(), 0);
            assert!(!cycle.texturing());
            assert_eq!(cycle.phase(), RedrawPhase::Swapped);
            cycle.finish().unwrap();
            assert_eq!(cycle.phase(), RedrawPhase::Idle);
        }
    }

    #[test]
    fn present_with_enabled_attribute_is_a_leak() {
        let mut cycle = RedrawCycle::new();
        for step in [
            DrawStep::Clear(Color::BLACK),
            DrawStep::EnableAttribute(0),
            DrawStep::BindVertexBuffer,
            DrawStep::Draw(DrawCall::Arrays { first: 0, count: 1 }),
        ] {
            cycle.apply(&step).unwrap();
        }
        assert_eq!(
            cycle.apply(&DrawStep::Present),
            Err(CycleError::LeakedState { attributes: vec![0], texturing: false })
        );
    }

    #[test]
    fn draw_before_bind_is_out_of_order() {
        let mut cycle = RedrawCycle::new();
        cycle.apply(&DrawStep::Clear(Color::BLACK)).unwrap();
        cycle.apply(&DrawStep::EnableAttribute(0)).unwrap();
        assert_eq!(
            cycle.apply(&DrawStep::Draw(DrawCall::Arrays { first: 0, count: 1 })),
            Err(CycleError::OutOfOrder { step: "draw", phase: RedrawPhase::AttributesEnabled })
        );
    }

    #[test]
    fn second_draw_rejected() {
        let mut cycle = RedrawCycle::new();
        let call = DrawStep::Draw(DrawCall::Arrays { first: 0, count: 1 });
        for step in [DrawStep::Clear(Color::BLACK), DrawStep::EnableAttribute(0), DrawStep::BindVertexBuffer] {
            cycle.apply(&step).unwrap();
        }
        cycle.apply(&call).unwrap();
        assert_eq!(cycle.apply(&call), Err(CycleError::SecondDraw));
    }

    #[test]
    fn declaring_disabled_attribute_rejected() {
        let mut cycle = RedrawCycle::new();
        cycle.apply(&DrawStep::Clear(Color::BLACK)).unwrap();
        cycle.apply(&DrawStep::EnableAttribute(0)).unwrap();
        let step = DrawStep::DeclareAttribute {
            attribute: VertexAttribute::f32(1, 2, 12),
            stride: 20,
        };
        assert_eq!(cycle.apply(&step), Err(CycleError::NotEnabled(1)));
    }

    #[test]
    fn clear_outside_idle_rejected() {
        let mut cycle = RedrawCycle::new();
        cycle.apply(&DrawStep::Clear(Color::BLACK)).unwrap();
        assert!(matches!(
            cycle.apply(&DrawStep::Clear(Color::BLACK)),
            Err(CycleError::OutOfOrder { step: "clear", .. })
        ));
    }

    #[test]
    fn finish_before_present_rejected() {
        let mut cycle = RedrawCycle::new();
        assert!(cycle.finish().is_err());
    }

    #[test]
    fn emit_outside_bracket_rejected() {
        let mut cycle = RedrawCycle::new();
        for step in [DrawStep::Clear(Color::BLACK), DrawStep::EnableTexturing, DrawStep::BindTexture] {
            cycle.apply(&step).unwrap();
        }
        cycle.apply(&DrawStep::BindVertexBuffer).unwrap();
        assert_eq!(
            cycle.apply(&DrawStep::Emit(ImmediateVertex::new([0.0; 2], [0.0; 2]))),
            Err(CycleError::UnbalancedBracket)
        );
    }
}
