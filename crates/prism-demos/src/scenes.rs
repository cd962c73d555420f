use anyhow::Context;
use prism_engine::paint::Color;
use prism_engine::render::{
    BufferedDraw, DrawCall, DrawStrategy, GeometryBuffer, ImageBuffer, ImageError, ImmediateDraw,
    ImmediateVertex, LayoutError, PrimitiveKind, VertexLayout,
};
use prism_engine::scene::Scene;

pub const IMAGE_SIZE: u32 = 256;
pub const IMAGE_RGB: [u8; 3] = [0, 128, 255];

/// x, y, z, u, v per vertex; texture coordinates unused.
#[rustfmt::skip]
const SQUARE_VERTICES: [f32; 20] = [
    -0.5, -0.5, 0.0, 0.0, 0.0,
     0.5, -0.5, 0.0, 0.0, 0.0,
     0.5,  0.5, 0.0, 0.0, 0.0,
    -0.5,  0.5, 0.0, 0.0, 0.0,
];

const SQUARE_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

fn square_geometry() -> Result<GeometryBuffer, LayoutError> {
    GeometryBuffer::new(
        SQUARE_VERTICES.to_vec(),
        Some(SQUARE_INDICES.to_vec()),
        VertexLayout::packed_f32(&[3, 2]),
    )
}

fn square_scene(call: DrawCall) -> Result<Scene, LayoutError> {
    let draw = BufferedDraw::new(PrimitiveKind::Triangles, square_geometry()?, call)?;
    Ok(Scene::new(DrawStrategy::Buffered(draw)).with_clear(Color::BLACK))
}

/// Square geometry with indices uploaded, drawn without them: three
/// sequential vertices, so only the lower-right triangle appears.
pub fn triangle_scene() -> Result<Scene, LayoutError> {
    square_scene(DrawCall::Arrays { first: 0, count: 3 })
}

/// Alternate to [`triangle_scene`] that draws the whole square through the
/// index store. No binary uses it.
pub fn indexed_square_scene() -> Result<Scene, LayoutError> {
    square_scene(DrawCall::Indexed { first: 0, count: 6 })
}

/// One point at the origin.
pub fn point_scene() -> Result<Scene, LayoutError> {
    let geometry = GeometryBuffer::new(vec![0.0, 0.0, 0.0], None, VertexLayout::packed_f32(&[3]))?;
    let draw = BufferedDraw::new(
        PrimitiveKind::Points,
        geometry,
        DrawCall::Arrays { first: 0, count: 1 },
    )?;
    Ok(Scene::new(DrawStrategy::Buffered(draw)).with_clear(Color::BLACK))
}

pub fn quad_image() -> Result<ImageBuffer, ImageError> {
    ImageBuffer::filled(IMAGE_SIZE, IMAGE_SIZE, IMAGE_RGB)
}

/// A solid image on a quad emitted vertex by vertex each redraw.
///
/// The first corner sits at (-0.5, -0.5), not (-1, -1), so the quad is
/// skewed.
pub fn textured_quad_scene() -> anyhow::Result<Scene> {
    let draw = ImmediateDraw::new(
        PrimitiveKind::Quads,
        vec![
            ImmediateVertex::new([0.0, 0.0], [-0.5, -0.5]),
            ImmediateVertex::new([1.0, 0.0], [1.0, -1.0]),
            ImmediateVertex::new([1.0, 1.0], [1.0, 1.0]),
            ImmediateVertex::new([0.0, 1.0], [-1.0, 1.0]),
        ],
        quad_image().context("quad image")?,
    )
    .context("quad vertices")?;
    Ok(Scene::new(DrawStrategy::Immediate(draw)).with_clear(Color::BLACK))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::render::{DrawStep, FramePlan, RedrawCycle};

    fn buffered(scene: &Scene) -> &BufferedDraw {
        match &scene.strategy {
            DrawStrategy::Buffered(b) => b,
            other => panic!("expected buffered strategy, got {other:?}"),
        }
    }

    // ── triangle ──────────────────────────────────────────────────────────

    #[test]
    fn triangle_rasterizes_first_three_vertices_only() {
        let scene = triangle_scene().unwrap();
        let draw = buffered(&scene);
        let g = draw.geometry();

        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.indices(), Some(&SQUARE_INDICES[..]));
        assert_eq!(draw.call(), DrawCall::Arrays { first: 0, count: 3 });
        assert_eq!(draw.call().referenced_vertices(g), vec![0, 1, 2]);
        assert!(!draw.call().is_indexed());
    }

    #[test]
    fn triangle_uploads_whole_square() {
        let scene = triangle_scene().unwrap();
        let g = buffered(&scene).geometry();
        assert_eq!(g.byte_len(), 5 * 4 * 4);
        assert_eq!(g.vertex_bytes().len(), 80);
        assert_eq!(g.index_bytes().map(<[u8]>::len), Some(24));
        assert!(g.max_read_end() <= g.byte_len());
        assert_eq!(g.attribute_values(3, 0), Some(&[-0.5, 0.5, 0.0][..]));
    }

    #[test]
    fn triangle_plan_binds_index_store_but_draws_arrays() {
        let plan = triangle_scene().unwrap().frame_plan();
        assert!(plan.steps().contains(&DrawStep::BindIndexBuffer));
        assert!(plan.steps().contains(&DrawStep::Draw(DrawCall::Arrays { first: 0, count: 3 })));
        assert_eq!(plan.draw_count(), 1);
    }

    #[test]
    fn indexed_alternate_covers_square() {
        let scene = indexed_square_scene().unwrap();
        let draw = buffered(&scene);
        assert_eq!(draw.call().referenced_vertices(draw.geometry()), vec![0, 1, 2, 2, 3, 0]);
        assert_eq!(scene.frame_plan().validate(), Ok(()));
    }

    // ── point ─────────────────────────────────────────────────────────────

    #[test]
    fn point_draws_one_vertex_at_origin() {
        let scene = point_scene().unwrap();
        let draw = buffered(&scene);
        assert_eq!(draw.primitive(), PrimitiveKind::Points);
        assert_eq!(draw.geometry().byte_len(), 12);
        assert_eq!(draw.geometry().indices(), None);
        assert_eq!(draw.call().referenced_vertices(draw.geometry()), vec![0]);
        assert_eq!(draw.geometry().attribute_values(0, 0), Some(&[0.0, 0.0, 0.0][..]));
    }

    #[test]
    fn point_plan_enables_position_only() {
        let plan = point_scene().unwrap().frame_plan();
        let enabled: Vec<u32> = plan
            .steps()
            .iter()
            .filter_map(|s| match s {
                DrawStep::EnableAttribute(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(enabled, vec![0]);
        assert!(!plan.steps().contains(&DrawStep::BindIndexBuffer));
    }

    // ── textured quad ─────────────────────────────────────────────────────

    #[test]
    fn quad_image_bytes_are_constant() {
        let image = quad_image().unwrap();
        let bytes = image.as_bytes();
        assert_eq!(bytes.len(), 256 * 256 * 3);
        assert_eq!(&bytes[..3], &[0, 128, 255]);
        assert!(bytes.chunks_exact(3).all(|p| p == IMAGE_RGB));
    }

    #[test]
    fn quad_device_bytes_keep_rgb() {
        let rgba = quad_image().unwrap().to_rgba8();
        assert_eq!(rgba.len(), 256 * 256 * 4);
        assert_eq!(&rgba[..4], &[0, 128, 255, 255]);
    }

    #[test]
    fn quad_is_two_triangles_of_emitted_corners() {
        let scene = textured_quad_scene().unwrap();
        let DrawStrategy::Immediate(draw) = &scene.strategy else {
            panic!("expected immediate strategy");
        };
        let expanded = draw.expanded_vertices();
        assert_eq!(expanded.len(), 6);
        assert_eq!(expanded[0].position, [-0.5, -0.5]);
        assert_eq!(expanded[2].tex_coord, [1.0, 1.0]);
        assert_eq!(expanded[5], expanded[0]);
    }

    // ── every scene ───────────────────────────────────────────────────────

    #[test]
    fn every_scene_cycles_cleanly() {
        let scenes = [
            triangle_scene().unwrap(),
            point_scene().unwrap(),
            textured_quad_scene().unwrap(),
        ];
        for scene in &scenes {
            let plan: FramePlan = scene.frame_plan();
            assert_eq!(plan.clear_color(), Some(Color::BLACK));

            let mut cycle = RedrawCycle::new();
            for _ in 0..3 {
                for step in plan.steps() {
                    cycle.apply(step).unwrap();
                }
                assert_eq!(cycle.enabled_attributes().count(), 0);
                assert!(!cycle.texturing());
                cycle.finish().unwrap();
            }
        }
    }
}
