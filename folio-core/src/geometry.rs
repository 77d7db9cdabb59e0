/// Geometry primitives: triangle soups for rasterizing and indexed box meshes
use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices.
    /// Degenerate triangles get a zero normal.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Expand an indexed vertex buffer into triangles with flat face normals.
    /// Trailing indices that do not form a full triangle are ignored.
    pub fn from_indexed(positions: &[Point3<f32>], indices: &[u32]) -> Self {
        let mut mesh = Self::with_capacity(indices.len() / 3);
        for face in indices.chunks_exact(3) {
            let p = |i: u32| positions[i as usize];
            let mut triangle = Triangle::new(
                Vertex::new(p(face[0]), Vector3::zeros()),
                Vertex::new(p(face[1]), Vector3::zeros()),
                Vertex::new(p(face[2]), Vector3::zeros()),
            );
            let normal = triangle.calculate_normal();
            for vertex in &mut triangle.vertices {
                vertex.normal = normal;
            }
            mesh.add_triangle(triangle);
        }
        mesh
    }
}

/// A contiguous index range drawn with one material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialGroup {
    pub start: usize,
    pub count: usize,
    pub material_index: usize,
}

/// Indexed, subdivided box.
///
/// Faces are emitted in the order +x, -x, +y, -y, +z, -z; each face is a
/// `(grid_x + 1) × (grid_y + 1)` vertex grid with its own material group, so
/// material slot `n` always addresses face `n`.
#[derive(Debug, Clone, Default)]
pub struct BoxGeometry {
    pub positions: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub groups: Vec<MaterialGroup>,
}

const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

impl BoxGeometry {
    pub fn new(
        width: f32,
        height: f32,
        depth: f32,
        width_segments: u32,
        height_segments: u32,
        depth_segments: u32,
    ) -> Self {
        let (ws, hs, ds) = (
            width_segments.max(1),
            height_segments.max(1),
            depth_segments.max(1),
        );
        let mut geometry = Self::default();

        geometry.build_plane([Z, Y, X], -1.0, -1.0, [depth, height, width], ds, hs, 0);
        geometry.build_plane([Z, Y, X], 1.0, -1.0, [depth, height, -width], ds, hs, 1);
        geometry.build_plane([X, Z, Y], 1.0, 1.0, [width, depth, height], ws, ds, 2);
        geometry.build_plane([X, Z, Y], 1.0, -1.0, [width, depth, -height], ws, ds, 3);
        geometry.build_plane([X, Y, Z], 1.0, -1.0, [width, height, depth], ws, hs, 4);
        geometry.build_plane([X, Y, Z], -1.0, -1.0, [width, height, -depth], ws, hs, 5);

        geometry
    }

    /// Emit one face. `axes` maps the plane's (u, v, w) onto (x, y, z);
    /// `size` is the signed (u, v, w) extent.
    #[allow(clippy::too_many_arguments)]
    fn build_plane(
        &mut self,
        axes: [usize; 3],
        u_dir: f32,
        v_dir: f32,
        size: [f32; 3],
        grid_x: u32,
        grid_y: u32,
        material_index: usize,
    ) {
        let [u, v, w] = axes;
        let [plane_width, plane_height, plane_depth] = size;

        let segment_width = plane_width / grid_x as f32;
        let segment_height = plane_height / grid_y as f32;
        let width_half = plane_width / 2.0;
        let height_half = plane_height / 2.0;
        let depth_half = plane_depth / 2.0;
        let grid_x1 = grid_x + 1;
        let grid_y1 = grid_y + 1;

        let vertex_offset = self.positions.len() as u32;
        let group_start = self.indices.len();

        for iy in 0..grid_y1 {
            let y = iy as f32 * segment_height - height_half;
            for ix in 0..grid_x1 {
                let x = ix as f32 * segment_width - width_half;

                let mut position = Point3::origin();
                position[u] = x * u_dir;
                position[v] = y * v_dir;
                position[w] = depth_half;
                self.positions.push(position);

                let mut normal = Vector3::zeros();
                normal[w] = if plane_depth > 0.0 { 1.0 } else { -1.0 };
                self.normals.push(normal);

                self.uvs
                    .push([ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32]);
            }
        }

        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = vertex_offset + ix + grid_x1 * iy;
                let b = vertex_offset + ix + grid_x1 * (iy + 1);
                let c = vertex_offset + (ix + 1) + grid_x1 * (iy + 1);
                let d = vertex_offset + (ix + 1) + grid_x1 * iy;

                self.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        self.groups.push(MaterialGroup {
            start: group_start,
            count: self.indices.len() - group_start,
            material_index,
        });
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        for position in &mut self.positions {
            *position += offset;
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat positions, three floats per vertex.
    pub fn position_buffer(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| [p.x, p.y, p.z])
            .collect()
    }
}
