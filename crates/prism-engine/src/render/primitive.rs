/// How a vertex sequence is grouped into shapes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PrimitiveKind {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
}

impl PrimitiveKind {
    /// The native topology, or `None` for kinds the device cannot rasterize
    /// directly (fans and quads are only drawable after expansion).
    pub fn native_topology(self) -> Option<wgpu::PrimitiveTopology> {
        match self {
            PrimitiveKind::Points => Some(wgpu::PrimitiveTopology::PointList),
            PrimitiveKind::Lines => Some(wgpu::PrimitiveTopology::LineList),
            PrimitiveKind::LineStrip => Some(wgpu::PrimitiveTopology::LineStrip),
            PrimitiveKind::Triangles => Some(wgpu::PrimitiveTopology::TriangleList),
            PrimitiveKind::TriangleStrip => Some(wgpu::PrimitiveTopology::TriangleStrip),
            PrimitiveKind::TriangleFan | PrimitiveKind::Quads => None,
        }
    }

    /// Topology used after [`expand`](Self::expand).
    pub fn expanded_topology(self) -> wgpu::PrimitiveTopology {
        self.native_topology()
            .unwrap_or(wgpu::PrimitiveTopology::TriangleList)
    }

    /// Whether `count` vertices form whole shapes with nothing left over.
    pub fn is_complete(self, count: usize) -> bool {
        match self {
            PrimitiveKind::Points => count >= 1,
            PrimitiveKind::Lines => count >= 2 && count % 2 == 0,
            PrimitiveKind::LineStrip => count >= 2,
            PrimitiveKind::Triangles => count >= 3 && count % 3 == 0,
            PrimitiveKind::TriangleStrip | PrimitiveKind::TriangleFan => count >= 3,
            PrimitiveKind::Quads => count >= 4 && count % 4 == 0,
        }
    }

    /// Vertex order that draws `count` vertices with the expanded topology.
    ///
    /// Native kinds keep their order. A quad `a b c d` becomes the triangles
    /// `a b c` and `c d a`; a fan becomes `0 i i+1`. Trailing vertices that
    /// do not complete a shape are dropped.
    pub fn expand(self, count: usize) -> Vec<usize> {
        match self {
            PrimitiveKind::Quads => (0..count / 4)
                .flat_map(|q| {
                    let b = q * 4;
                    [b, b + 1, b + 2, b + 2, b + 3, b]
                })
                .collect(),
            PrimitiveKind::TriangleFan => (1..count.saturating_sub(1))
                .flat_map(|i| [0, i, i + 1])
                .collect(),
            _ => (0..count).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_counts_per_kind() {
        assert!(PrimitiveKind::Quads.is_complete(4));
        assert!(PrimitiveKind::Quads.is_complete(8));
        assert!(!PrimitiveKind::Quads.is_complete(6));
        assert!(!PrimitiveKind::Quads.is_complete(0));
        assert!(PrimitiveKind::Points.is_complete(1));
        assert!(!PrimitiveKind::Points.is_complete(0));
        assert!(!PrimitiveKind::Triangles.is_complete(4));
        assert!(PrimitiveKind::TriangleFan.is_complete(5));
        assert!(!PrimitiveKind::Lines.is_complete(3));
    }

    #[test]
    fn quad_becomes_two_triangles() {
        assert_eq!(PrimitiveKind::Quads.expand(4), vec![0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn incomplete_quad_is_dropped() {
        assert_eq!(PrimitiveKind::Quads.expand(7), vec![0, 1, 2, 2, 3, 0]);
        assert!(PrimitiveKind::Quads.expand(3).is_empty());
    }

    #[test]
    fn fan_pivots_on_first_vertex() {
        assert_eq!(PrimitiveKind::TriangleFan.expand(5), vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
        assert!(PrimitiveKind::TriangleFan.expand(2).is_empty());
    }

    #[test]
    fn native_kinds_keep_order() {
        assert_eq!(PrimitiveKind::Points.expand(3), vec![0, 1, 2]);
        assert_eq!(
            PrimitiveKind::Points.native_topology(),
            Some(wgpu::PrimitiveTopology::PointList)
        );
    }

    #[test]
    fn quads_have_no_native_topology() {
        assert_eq!(PrimitiveKind::Quads.native_topology(), None);
        assert_eq!(
            PrimitiveKind::Quads.expanded_topology(),
            wgpu::PrimitiveTopology::TriangleList
        );
    }
}
