//! Mesh representation for the shield geometry
//!
//! The shield is a subdivided icosahedron projected onto a sphere. Each of the
//! 20 faces is split into `(detail + 1)²` triangles, the same lattice scheme
//! common polyhedron generators use, then vertices shared between faces are
//! welded so the wireframe can be drawn from unique edges.

use std::collections::BTreeSet;

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Vec3;

/// 3D vertex data structure for rendering
///
/// # Memory Layout
/// `#[repr(C)]` plus `Pod` so vertex buffers can be viewed as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],

    /// Unit normal
    pub normal: [f32; 3],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Position as a vector
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }
}

/// Indexed triangle mesh with its unique edge list
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Triangle indices, counter-clockwise when seen from outside
    pub indices: Vec<u32>,

    /// Unique undirected edges, each stored as `[low, high]`
    pub edges: Vec<[u32; 2]>,
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

fn icosahedron_corners() -> [Vec3; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0), Vec3::new(1.0, t, 0.0), Vec3::new(-1.0, -t, 0.0), Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t), Vec3::new(0.0, 1.0, t), Vec3::new(0.0, -1.0, -t), Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0), Vec3::new(t, 0.0, 1.0), Vec3::new(-t, 0.0, -1.0), Vec3::new(-t, 0.0, 1.0),
    ]
}

/// Welds vertices that land on the same sphere point
///
/// Shared edge points are computed independently by each face, so they are
/// matched by distance rather than by exact bits.
struct SphereBuilder {
    radius: f32,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

const WELD_TOLERANCE: f32 = 1.0e-4;

impl SphereBuilder {
    fn vertex(&mut self, direction: Vec3) -> u32 {
        let normal = direction.normalize();
        let position = normal * self.radius;

        let existing = self
            .vertices
            .iter()
            .position(|v| (Vec3::from(v.normal) - normal).norm() < WELD_TOLERANCE);
        if let Some(index) = existing {
            return index as u32;
        }

        self.vertices.push(Vertex::new(position.into(), normal.into()));
        (self.vertices.len() - 1) as u32
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        let pa = self.vertices[a as usize].position();
        let pb = self.vertices[b as usize].position();
        let pc = self.vertices[c as usize].position();
        let normal = (pb - pa).cross(&(pc - pa));

        // Centered sphere: outward faces point away from the origin.
        if normal.dot(&(pa + pb + pc)) >= 0.0 {
            self.indices.extend_from_slice(&[a, b, c]);
        } else {
            self.indices.extend_from_slice(&[a, c, b]);
        }
    }

    fn subdivide(&mut self, a: Vec3, b: Vec3, c: Vec3, detail: u32) {
        let cols = detail as usize + 1;
        let mut rows: Vec<Vec<u32>> = Vec::with_capacity(cols + 1);

        for i in 0..=cols {
            let t = i as f32 / cols as f32;
            let left = a.lerp(&c, t);
            let right = b.lerp(&c, t);
            let segments = cols - i;

            let row = (0..=segments)
                .map(|j| {
                    if segments == 0 {
                        self.vertex(left)
                    } else {
                        self.vertex(left.lerp(&right, j as f32 / segments as f32))
                    }
                })
                .collect();
            rows.push(row);
        }

        for i in 0..cols {
            for j in 0..(2 * (cols - i) - 1) {
                let k = j / 2;
                if j % 2 == 0 {
                    self.triangle(rows[i][k + 1], rows[i + 1][k], rows[i][k]);
                } else {
                    self.triangle(rows[i][k + 1], rows[i + 1][k + 1], rows[i + 1][k]);
                }
            }
        }
    }
}

impl Mesh {
    /// Create a new mesh, deriving the edge list from the triangles
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let edges = Self::unique_edges(&indices);
        Self { vertices, indices, edges }
    }

    /// Icosahedron of `radius` with every face subdivided `detail` times
    ///
    /// Produces `20 * (detail + 1)²` triangles.
    pub fn icosphere(radius: f32, detail: u32) -> Self {
        let mut builder = SphereBuilder {
            radius,
            vertices: Vec::new(),
            indices: Vec::new(),
        };

        let corners = icosahedron_corners();
        for [a, b, c] in ICOSAHEDRON_FACES {
            builder.subdivide(corners[a], corners[b], corners[c], detail);
        }

        let mesh = Self::new(builder.vertices, builder.indices);
        log::debug!(
            "Built icosphere r={} detail={}: {} vertices, {} triangles, {} edges",
            radius,
            detail,
            mesh.vertices.len(),
            mesh.triangle_count(),
            mesh.edges.len()
        );
        mesh
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate over triangles as vertex index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Largest vertex distance from the model origin
    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.position().norm())
            .fold(0.0, f32::max)
    }

    fn unique_edges(indices: &[u32]) -> Vec<[u32; 2]> {
        let mut edges = BTreeSet::new();
        for tri in indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                edges.insert([a.min(b), a.max(b)]);
            }
        }
        edges.into_iter().collect()
    }
}
