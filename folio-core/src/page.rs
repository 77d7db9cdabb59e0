//! Skinned page geometry.
//!
//! A page is a thin box split into equal segments along its width. Every
//! vertex is bound to the two bones at the ends of the segment it falls in,
//! weighted linearly by its position inside that segment, so bending a bone
//! folds the page smoothly across segment boundaries.

use nalgebra::Vector3;

use crate::config::PageDimensions;
use crate::error::FolioResult;
use crate::geometry::BoxGeometry;

/// Rows along the page height.
const HEIGHT_SEGMENTS: u32 = 2;
const DEPTH_SEGMENTS: u32 = 1;

/// Box geometry plus per-vertex skin attributes.
///
/// Only the first two lanes of `skin_indices` / `skin_weights` are used; the
/// remaining lanes are zero so the buffers can be uploaded as 4-wide
/// attributes.
#[derive(Debug, Clone)]
pub struct PageGeometry {
    pub dimensions: PageDimensions,
    pub mesh: BoxGeometry,
    pub skin_indices: Vec<[u16; 4]>,
    pub skin_weights: Vec<[f32; 4]>,
}

impl PageGeometry {
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// Highest bone index referenced by any vertex.
    pub fn max_bone_index(&self) -> usize {
        self.skin_indices
            .iter()
            .map(|lanes| lanes[1] as usize)
            .max()
            .unwrap_or(0)
    }

    pub fn skin_index_buffer(&self) -> Vec<u16> {
        self.skin_indices.iter().flatten().copied().collect()
    }

    pub fn skin_weight_buffer(&self) -> Vec<f32> {
        self.skin_weights.iter().flatten().copied().collect()
    }
}

/// Build the shared page mesh with its spine edge at x = 0.
pub fn build_page_geometry(dimensions: PageDimensions) -> FolioResult<PageGeometry> {
    dimensions.validate()?;

    let mut mesh = BoxGeometry::new(
        dimensions.width,
        dimensions.height,
        dimensions.depth,
        dimensions.segments,
        HEIGHT_SEGMENTS,
        DEPTH_SEGMENTS,
    );
    mesh.translate(Vector3::new(dimensions.width / 2.0, 0.0, 0.0));

    let segment_width = dimensions.segment_width();
    let mut skin_indices = Vec::with_capacity(mesh.vertex_count());
    let mut skin_weights = Vec::with_capacity(mesh.vertex_count());

    for position in &mesh.positions {
        let (bone, weight) = skin_binding(position.x, segment_width, dimensions.segments);
        skin_indices.push([bone, bone + 1, 0, 0]);
        skin_weights.push([1.0 - weight, weight, 0.0, 0.0]);
    }

    log::debug!(
        "page geometry: {} vertices, {} triangles, {} segments",
        mesh.vertex_count(),
        mesh.triangle_count(),
        dimensions.segments
    );

    Ok(PageGeometry {
        dimensions,
        mesh,
        skin_indices,
        skin_weights,
    })
}

/// Segment containing `x` and the weight of that segment's far bone.
///
/// The segment index is clamped into `[0, segments - 1]`, so the free edge
/// (x == width) binds fully to the last bone instead of a bone past the end
/// of the chain.
pub fn skin_binding(x: f32, segment_width: f32, segments: u32) -> (u16, f32) {
    let last = segments.saturating_sub(1) as f32;
    let segment = (x / segment_width).floor().clamp(0.0, last);
    let weight = ((x - segment * segment_width) / segment_width).clamp(0.0, 1.0);
    (segment as u16, weight)
}
