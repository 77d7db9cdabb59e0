/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Point3, Vector3};
use std::io::Write;
use folio_core::{Bone, BoxGeometry, Camera, Mesh, PageMaterials, Triangle};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 0.5;

const JOINT_CHAR: char = 'o';
const BONE_CHAR: char = '*';
const BONE_COLOR: Color = Color::Red;

/// Faces lit head-on keep their full color; faces seen edge-on dim to this
const MIN_SHADE: f32 = 0.35;

/// ASCII renderer that converts world-space meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.color_buffer[y * self.width + x])
    }

    /// Render one skinned page. `positions` are the page's world-space
    /// vertices; each material group of `geometry` is tinted with its slot
    /// in `materials`, so the pink faces, white edges and dark spine stay
    /// distinguishable.
    pub fn render_page(
        &mut self,
        positions: &[Point3<f32>],
        geometry: &BoxGeometry,
        materials: &PageMaterials,
        camera: &Camera,
    ) {
        for group in &geometry.groups {
            let Some(indices) = geometry.indices.get(group.start..group.start + group.count) else {
                continue;
            };
            let tint = materials
                .slots
                .get(group.material_index)
                .map(|m| m.color.to_array())
                .unwrap_or([1.0; 3]);
            let mesh = Mesh::from_indexed(positions, indices);
            self.render_mesh(&mesh, camera, tint);
        }
    }

    /// Render a mesh whose vertices are already in world space
    pub fn render_mesh(&mut self, mesh: &Mesh, camera: &Camera, tint: [f32; 3]) {
        let light_dir = (camera.position() - camera.target)
            .try_normalize(1e-6)
            .unwrap_or_else(Vector3::z);
        for triangle in &mesh.triangles {
            self.render_triangle(triangle, camera, &light_dir, tint);
        }
    }

    /// Overlay a bone chain: a marker at every joint and a line from each
    /// joint to its parent. Drawn over the pages regardless of depth.
    pub fn render_bones(&mut self, joints: &[Point3<f32>], bones: &[Bone], camera: &Camera) {
        let screen: Vec<Option<(f32, f32)>> = joints
            .iter()
            .map(|p| {
                camera
                    .project_to_screen(p, self.width as u32, self.height as u32)
                    .map(|(x, y, _)| (x, y))
            })
            .collect();

        for (i, bone) in bones.iter().enumerate() {
            let Some(parent) = bone.parent else { continue };
            if let (Some(Some(from)), Some(Some(to))) = (screen.get(parent), screen.get(i)) {
                self.overlay_line(*from, *to, BONE_CHAR);
            }
        }
        for &(x, y) in screen.iter().flatten() {
            self.overlay(x, y, JOINT_CHAR);
        }
    }

    fn overlay_line(&mut self, from: (f32, f32), to: (f32, f32), character: char) {
        let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = from.0 + (to.0 - from.0) * t;
            let y = from.1 + (to.1 - from.1) * t;
            self.overlay(x, y, character);
        }
    }

    fn overlay(&mut self, x: f32, y: f32, character: char) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            self.depth_buffer[idx] = f32::NEG_INFINITY;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = BONE_COLOR;
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        camera: &Camera,
        light_dir: &Vector3<f32>,
        tint: [f32; 3],
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(&vertex.position, self.width as u32, self.height as u32) {
                Some(coords) => *slot = coords,
                None => return, // Triangle is clipped
            }
        }

        // Pages are thin: shade both sides so the back face stays visible
        let normal = triangle.calculate_normal();
        let brightness = normal.dot(light_dir).abs();

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];
        let color = shade(tint, brightness);

        self.rasterize_triangle(&screen_coords, character, color);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                            self.color_buffer[idx] = color;
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Material color dimmed by how obliquely the face is seen
fn shade(tint: [f32; 3], brightness: f32) -> Color {
    let level = MIN_SHADE + (1.0 - MIN_SHADE) * brightness.clamp(0.0, 1.0);
    let channel = |c: f32| (c.clamp(0.0, 1.0) * level * 255.0).round() as u8;
    Color::Rgb {
        r: channel(tint[0]),
        g: channel(tint[1]),
        b: channel(tint[2]),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Book, BookConfig, PageRecord};

    fn single_page() -> Book {
        Book::new(BookConfig::default(), &[PageRecord::new("a", "b")]).unwrap()
    }

    fn page_camera() -> Camera {
        let mut camera = Camera::new(40, 20);
        camera.target = Point3::new(0.64, 0.0, 0.0);
        camera
    }

    #[test]
    fn test_barycentric_center() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (3.0, 0.0), (0.0, 3.0), (1.0, 1.0)).unwrap();
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-6);
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
    }

    #[test]
    fn test_degenerate_barycentric() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }

    #[test]
    fn test_page_covers_center_of_view() {
        let book = single_page();
        let positions = book.world_positions(0).unwrap();
        let page = &book.pages()[0];

        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.render_page(&positions, &book.geometry().mesh, &page.materials, &page_camera());

        assert_ne!(renderer.char_at(20, 10), Some(' '));
        assert_eq!(renderer.char_at(40, 0), None);

        renderer.clear();
        assert_eq!(renderer.char_at(20, 10), Some(' '));
        assert_eq!(renderer.color_at(20, 10), Some(Color::Reset));
    }

    #[test]
    fn test_page_face_is_tinted_with_its_material() {
        let book = single_page();
        let positions = book.world_positions(0).unwrap();
        let page = &book.pages()[0];

        // default camera looks down -z at the front face, which is pink
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.render_page(&positions, &book.geometry().mesh, &page.materials, &page_camera());

        match renderer.color_at(20, 10) {
            Some(Color::Rgb { r, g, b }) => {
                assert!(r > g && g > 0, "expected pink, got {r} {g} {b}");
                assert!(b > g);
            }
            other => panic!("expected an rgb cell, got {other:?}"),
        }
    }

    #[test]
    fn test_shade_dims_oblique_faces() {
        assert_eq!(shade([1.0, 1.0, 1.0], 1.0), Color::Rgb { r: 255, g: 255, b: 255 });
        match shade([1.0, 0.5, 0.0], 0.0) {
            Color::Rgb { r, g, b } => {
                assert_eq!(r, (MIN_SHADE * 255.0).round() as u8);
                assert!(g < r);
                assert_eq!(b, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bones_drawn_over_page() {
        let book = single_page();
        let positions = book.world_positions(0).unwrap();
        let page = &book.pages()[0];
        let camera = page_camera();

        let mut joints = Vec::new();
        assert!(book.joint_positions_into(0, &mut joints));

        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.render_page(&positions, &book.geometry().mesh, &page.materials, &camera);
        renderer.render_bones(&joints, page.mesh.skeleton().bones(), &camera);

        let mut markers = 0;
        let mut lines = 0;
        for y in 0..20 {
            for x in 0..40 {
                match renderer.char_at(x, y) {
                    Some(JOINT_CHAR) => markers += 1,
                    Some(BONE_CHAR) => lines += 1,
                    _ => continue,
                }
                assert_eq!(renderer.color_at(x, y), Some(BONE_COLOR));
            }
        }
        assert!(markers >= 2);
        assert!(lines > 0);
    }
}
