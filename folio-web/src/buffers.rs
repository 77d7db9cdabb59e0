//! Flattening helpers that turn core geometry into typed-array friendly
//! buffers.

use folio_core::geometry::MaterialGroup;
use nalgebra::{Point3, Vector3};

pub fn flatten_points(points: &[Point3<f32>], out: &mut Vec<f32>) {
    out.clear();
    out.reserve(points.len() * 3);
    for p in points {
        out.extend_from_slice(&[p.x, p.y, p.z]);
    }
}

pub fn flatten_vectors(vectors: &[Vector3<f32>]) -> Vec<f32> {
    vectors.iter().flat_map(|v| [v.x, v.y, v.z]).collect()
}

pub fn flatten_uvs(uvs: &[[f32; 2]]) -> Vec<f32> {
    uvs.iter().flatten().copied().collect()
}

/// `(start, count, material_index)` triples.
pub fn flatten_groups(groups: &[MaterialGroup]) -> Vec<u32> {
    groups
        .iter()
        .flat_map(|g| [g.start as u32, g.count as u32, g.material_index as u32])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{build_page_geometry, PageDimensions};

    #[test]
    fn test_flatten_points_reuses_buffer() {
        let mut out = vec![9.0; 10];
        flatten_points(&[Point3::new(1.0, 2.0, 3.0)], &mut out);
        assert_eq!(out, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_page_buffers_line_up() {
        let page = build_page_geometry(PageDimensions::default()).unwrap();
        let n = page.vertex_count();
        let mut positions = Vec::new();
        flatten_points(&page.mesh.positions, &mut positions);
        assert_eq!(positions.len(), n * 3);
        assert_eq!(flatten_vectors(&page.mesh.normals).len(), n * 3);
        assert_eq!(flatten_uvs(&page.mesh.uvs).len(), n * 2);

        let groups = flatten_groups(&page.mesh.groups);
        assert_eq!(groups.len(), 6 * 3);
        let total: u32 = groups.chunks_exact(3).map(|g| g[1]).sum();
        assert_eq!(total as usize, page.mesh.indices.len());
    }
}
