/// Folio Web - WASM bridge between the book core and a browser 3D scene
///
/// The host scene (any WebGL/WebGPU engine with skinned meshes) pulls the
/// shared page buffers once, creates one skinned mesh per page from them,
/// and calls `update` every frame before reading back bone matrices.

pub mod buffers;
pub mod console;

use folio_core::{manifest, Book, BookConfig, ConstantBend, FolioError, FolioResult, PageRecord};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js(err: FolioError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_config(config: JsValue) -> Result<BookConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(BookConfig::default());
    }
    let config: BookConfig = serde_wasm_bindgen::from_value(config)?;
    config.validate().map_err(to_js)?;
    Ok(config)
}

fn missing_page(index: usize) -> JsValue {
    JsValue::from_str(&format!("no page at index {}", index))
}

#[derive(Debug, PartialEq, Serialize)]
struct SkippedJson {
    number: usize,
    error: String,
}

/// A book whose pages are skinned against the shared page geometry
#[wasm_bindgen]
pub struct WebBook {
    book: Book,
    scratch: Vec<nalgebra::Point3<f32>>,
}

#[wasm_bindgen]
impl WebBook {
    /// Build a book from an optional config object and an array of
    /// `{ front, back }` page records
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, pages: JsValue) -> Result<WebBook, JsValue> {
        let config = parse_config(config)?;
        let records: Vec<PageRecord> = serde_wasm_bindgen::from_value(pages)?;
        Self::build(config, &records).map_err(to_js)
    }

    /// Build a book from a text page manifest
    #[wasm_bindgen(js_name = fromManifest)]
    pub fn from_manifest(config: JsValue, text: &str) -> Result<WebBook, JsValue> {
        let config = parse_config(config)?;
        Self::build_from_manifest(config, text).map_err(to_js)
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.book.pages().len()
    }

    #[wasm_bindgen(js_name = vertexCount)]
    pub fn vertex_count(&self) -> usize {
        self.book.geometry().vertex_count()
    }

    #[wasm_bindgen(js_name = boneCount)]
    pub fn bone_count(&self) -> usize {
        self.book.config().page.bone_count()
    }

    /// Rest positions of the shared page geometry, spine at x = 0
    pub fn positions(&self) -> Vec<f32> {
        self.book.geometry().mesh.position_buffer()
    }

    pub fn normals(&self) -> Vec<f32> {
        buffers::flatten_vectors(&self.book.geometry().mesh.normals)
    }

    pub fn uvs(&self) -> Vec<f32> {
        buffers::flatten_uvs(&self.book.geometry().mesh.uvs)
    }

    pub fn indices(&self) -> Vec<u32> {
        self.book.geometry().mesh.indices.clone()
    }

    /// Material groups as `(start, count, materialIndex)` triples
    pub fn groups(&self) -> Vec<u32> {
        buffers::flatten_groups(&self.book.geometry().mesh.groups)
    }

    #[wasm_bindgen(js_name = skinIndices)]
    pub fn skin_indices(&self) -> Vec<u16> {
        self.book.geometry().skin_index_buffer()
    }

    #[wasm_bindgen(js_name = skinWeights)]
    pub fn skin_weights(&self) -> Vec<f32> {
        self.book.geometry().skin_weight_buffer()
    }

    /// Scene-space offset of a page
    #[wasm_bindgen(js_name = pageOffset)]
    pub fn page_offset(&self, index: usize) -> Result<Vec<f32>, JsValue> {
        let page = self.book.page(index).ok_or_else(|| missing_page(index))?;
        Ok(vec![page.offset.x, page.offset.y, page.offset.z])
    }

    /// `{ front, back }` surface identifiers of a page
    #[wasm_bindgen(js_name = pageSurfaces)]
    pub fn page_surfaces(&self, index: usize) -> Result<JsValue, JsValue> {
        let page = self.book.page(index).ok_or_else(|| missing_page(index))?;
        Ok(serde_wasm_bindgen::to_value(&page.record)?)
    }

    /// Skinning matrices of a page, 16 column-major floats per bone
    #[wasm_bindgen(js_name = boneMatrices)]
    pub fn bone_matrices(&self, index: usize) -> Result<Vec<f32>, JsValue> {
        self.bone_matrix_buffer(index).ok_or_else(|| missing_page(index))
    }

    /// CPU-skinned positions of a page in scene space
    #[wasm_bindgen(js_name = deformedPositions)]
    pub fn deformed_positions(&mut self, index: usize) -> Result<Vec<f32>, JsValue> {
        self.deformed_buffer(index).ok_or_else(|| missing_page(index))
    }

    /// World-space joint of every bone of a page, 3 floats per bone, for
    /// drawing a skeleton helper
    #[wasm_bindgen(js_name = bonePositions)]
    pub fn bone_positions(&mut self, index: usize) -> Result<Vec<f32>, JsValue> {
        self.joint_buffer(index).ok_or_else(|| missing_page(index))
    }

    /// Parent of every bone, -1 for the root
    #[wasm_bindgen(js_name = boneParents)]
    pub fn bone_parents(&self) -> Vec<i32> {
        self.parent_buffer()
    }

    /// Records that were rejected, as `{ number, error }` objects
    #[wasm_bindgen(js_name = skippedPages)]
    pub fn skipped_pages(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.skipped_summaries())?)
    }

    /// Hold the driven bone at a fixed angle
    #[wasm_bindgen(js_name = setBendDegrees)]
    pub fn set_bend_degrees(&mut self, degrees: f32) {
        self.book.set_bend_curve(ConstantBend::degrees(degrees));
    }

    /// Per-frame update, `t` in seconds
    pub fn update(&mut self, t: f32) -> Result<(), JsValue> {
        self.book.update(t).map_err(to_js)
    }
}

impl WebBook {
    fn build(config: BookConfig, records: &[PageRecord]) -> FolioResult<WebBook> {
        let book = Book::new(config, records)?;
        Ok(WebBook {
            book,
            scratch: Vec::new(),
        })
    }

    fn build_from_manifest(config: BookConfig, text: &str) -> FolioResult<WebBook> {
        let records = manifest::parse_manifest(text)?;
        Self::build(config, &records)
    }

    fn bone_matrix_buffer(&self, index: usize) -> Option<Vec<f32>> {
        let page = self.book.page(index)?;
        let mut out = Vec::with_capacity(page.mesh.skeleton().len() * 16);
        page.mesh.bone_matrices_into(&mut out);
        Some(out)
    }

    fn deformed_buffer(&mut self, index: usize) -> Option<Vec<f32>> {
        if !self.book.world_positions_into(index, &mut self.scratch) {
            return None;
        }
        let mut out = Vec::new();
        buffers::flatten_points(&self.scratch, &mut out);
        Some(out)
    }

    fn joint_buffer(&mut self, index: usize) -> Option<Vec<f32>> {
        if !self.book.joint_positions_into(index, &mut self.scratch) {
            return None;
        }
        let mut out = Vec::new();
        buffers::flatten_points(&self.scratch, &mut out);
        Some(out)
    }

    fn parent_buffer(&self) -> Vec<i32> {
        let Some(page) = self.book.pages().first() else {
            return Vec::new();
        };
        page.mesh
            .skeleton()
            .bones()
            .iter()
            .map(|bone| bone.parent.map_or(-1, |p| p as i32))
            .collect()
    }

    fn skipped_summaries(&self) -> Vec<SkippedJson> {
        self.book
            .skipped()
            .iter()
            .map(|s| SkippedJson {
                number: s.number,
                error: s.error.to_string(),
            })
            .collect()
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    console::init(log::LevelFilter::Info);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<PageRecord> {
        (0..n)
            .map(|i| PageRecord::new(format!("front-{i}"), format!("back-{i}")))
            .collect()
    }

    #[test]
    fn test_bone_matrices_cover_every_bone() {
        let web = WebBook::build(BookConfig::default(), &records(2)).unwrap();
        let matrices = web.bone_matrix_buffer(1).unwrap();
        assert_eq!(matrices.len(), 6 * 16);
        // rest pose: identity skinning matrices
        assert_eq!(&matrices[..16], nalgebra::Matrix4::<f32>::identity().as_slice());
        assert!(web.bone_matrix_buffer(2).is_none());
    }

    #[test]
    fn test_skipped_pages_are_reported() {
        let mut input = records(3);
        input[0].front.clear();
        let web = WebBook::build(BookConfig::default(), &input).unwrap();
        assert_eq!(web.page_count(), 2);

        let skipped = web.skipped_summaries();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].number, 0);
        assert!(skipped[0].error.contains("front"));
    }

    #[test]
    fn test_invalid_config_fails_build() {
        let mut config = BookConfig::default();
        config.page.segments = 0;
        assert!(WebBook::build(config, &records(1)).is_err());
    }

    #[test]
    fn test_manifest_build() {
        let text = "# two pages\npage cover spread-1\npage spread-2 back\n";
        let web = WebBook::build_from_manifest(BookConfig::default(), text).unwrap();
        assert_eq!(web.page_count(), 2);
        assert!(WebBook::build_from_manifest(BookConfig::default(), "leaf a b").is_err());
    }

    #[test]
    fn test_buffers_follow_update() {
        let mut web = WebBook::build(BookConfig::default(), &records(1)).unwrap();
        let rest = web.deformed_buffer(0).unwrap();
        assert_eq!(rest.len(), web.vertex_count() * 3);

        web.book.update(0.0).unwrap();
        let bent = web.deformed_buffer(0).unwrap();
        assert_ne!(rest, bent);

        let joints = web.joint_buffer(0).unwrap();
        assert_eq!(joints.len(), web.bone_count() * 3);
        assert!(joints[3 * 3 + 2].abs() > 1e-3);
        assert!(web.joint_buffer(1).is_none());
    }

    #[test]
    fn test_bone_parents() {
        let web = WebBook::build(BookConfig::default(), &records(1)).unwrap();
        assert_eq!(web.parent_buffer(), vec![-1, 0, 1, 2, 3, 4]);

        let empty = WebBook::build(BookConfig::default(), &[]).unwrap();
        assert!(empty.parent_buffer().is_empty());
    }
}
