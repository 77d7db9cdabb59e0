//! Book composition.
//!
//! The book owns the shared page geometry and base materials, and one
//! [`PageInstance`] per valid page record. Each instance has its own
//! skeleton, so pages bend independently while drawing from the same
//! vertex buffers.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::animation::{BendAnimator, BendCurve, ConstantBend};
use crate::config::BookConfig;
use crate::error::{FolioError, FolioResult};
use crate::material::{PageMaterials, SLOT_BACK, SLOT_FRONT};
use crate::page::{build_page_geometry, PageGeometry};
use crate::skeleton::build_bone_chain;
use crate::skinning::{bind_skin, SkinnedMesh};

/// Front and back surface identifiers of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
}

impl PageRecord {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    pub fn validate(&self, index: usize) -> FolioResult<()> {
        for (side, id) in [("front", &self.front), ("back", &self.back)] {
            if id.trim().is_empty() {
                return Err(FolioError::InvalidPageData {
                    index,
                    reason: format!("missing {side} surface"),
                });
            }
        }
        Ok(())
    }
}

/// One page placed in the book.
#[derive(Debug, Clone)]
pub struct PageInstance {
    /// Position of the record in the input list.
    pub number: usize,
    pub offset: Vector3<f32>,
    pub record: PageRecord,
    /// The book's shared palette; per-page surfaces come from `record`.
    pub materials: Rc<PageMaterials>,
    pub mesh: SkinnedMesh,
}

impl PageInstance {
    /// Texture bound to a material slot: the record's identifiers on the
    /// front and back faces, the shared palette's texture elsewhere.
    pub fn surface_texture(&self, slot: usize) -> Option<&str> {
        match slot {
            SLOT_FRONT => Some(&self.record.front),
            SLOT_BACK => Some(&self.record.back),
            _ => self.materials.slots.get(slot)?.texture.as_deref(),
        }
    }
}

/// Shared page resources, built once per book.
#[derive(Debug, Clone)]
pub struct PageResources {
    pub geometry: Rc<PageGeometry>,
    pub materials: Rc<PageMaterials>,
}

impl PageResources {
    pub fn new(config: &BookConfig) -> FolioResult<Self> {
        Ok(Self {
            geometry: Rc::new(build_page_geometry(config.page)?),
            materials: Rc::new(PageMaterials::base()?),
        })
    }
}

/// A page record that could not be turned into a page.
#[derive(Debug)]
pub struct SkippedPage {
    pub number: usize,
    pub error: FolioError,
}

#[derive(Debug)]
pub struct Book {
    config: BookConfig,
    resources: PageResources,
    pages: Vec<PageInstance>,
    skipped: Vec<SkippedPage>,
    animator: BendAnimator,
}

impl Book {
    /// Build a book. Invalid configuration fails the whole book; an invalid
    /// record only drops that page.
    pub fn new(config: BookConfig, records: &[PageRecord]) -> FolioResult<Self> {
        config.validate()?;
        let resources = PageResources::new(&config)?;
        let animator = BendAnimator::new(
            config.bend_bone,
            ConstantBend {
                angle: config.bend_angle(),
            },
        );

        let mut pages = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();
        for (number, record) in records.iter().enumerate() {
            match create_page(&config, &resources, number, record) {
                Ok(page) => pages.push(page),
                Err(error) => {
                    log::warn!("skipping page {}: {}", number, error);
                    skipped.push(SkippedPage { number, error });
                }
            }
        }

        log::info!(
            "book ready: {} pages, {} skipped, {} vertices per page",
            pages.len(),
            skipped.len(),
            resources.geometry.vertex_count()
        );

        Ok(Self {
            config,
            resources,
            pages,
            skipped,
            animator,
        })
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn geometry(&self) -> &Rc<PageGeometry> {
        &self.resources.geometry
    }

    pub fn base_materials(&self) -> &Rc<PageMaterials> {
        &self.resources.materials
    }

    pub fn pages(&self) -> &[PageInstance] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&PageInstance> {
        self.pages.get(index)
    }

    pub fn skipped(&self) -> &[SkippedPage] {
        &self.skipped
    }

    pub fn set_bend_curve(&mut self, curve: impl BendCurve + 'static) {
        self.animator.set_curve(curve);
    }

    pub fn bend_angle_at(&self, t: f32) -> f32 {
        self.animator.angle_at(t)
    }

    /// Per-frame update: bend the configured bone of every page.
    pub fn update(&mut self, t: f32) -> FolioResult<()> {
        for page in &mut self.pages {
            self.animator.apply(page.mesh.skeleton_mut(), t)?;
        }
        Ok(())
    }

    /// Skinned positions of one page in book space.
    pub fn world_positions_into(&self, index: usize, out: &mut Vec<Point3<f32>>) -> bool {
        let Some(page) = self.pages.get(index) else {
            return false;
        };
        page.mesh.deformed_positions_into(out);
        for p in out.iter_mut() {
            *p += page.offset;
        }
        true
    }

    /// Bone joints of one page in book space, one point per bone.
    pub fn joint_positions_into(&self, index: usize, out: &mut Vec<Point3<f32>>) -> bool {
        let Some(page) = self.pages.get(index) else {
            return false;
        };
        page.mesh.skeleton().joint_positions_into(out);
        for p in out.iter_mut() {
            *p += page.offset;
        }
        true
    }

    pub fn world_positions(&self, index: usize) -> Option<Vec<Point3<f32>>> {
        let mut out = Vec::new();
        self.world_positions_into(index, &mut out).then_some(out)
    }
}

fn create_page(
    config: &BookConfig,
    resources: &PageResources,
    number: usize,
    record: &PageRecord,
) -> FolioResult<PageInstance> {
    record.validate(number)?;
    let skeleton = build_bone_chain(config.page.segments, config.page.segment_width())?;
    let mesh = bind_skin(Rc::clone(&resources.geometry), skeleton)?;
    Ok(PageInstance {
        number,
        offset: Vector3::new(number as f32 * config.page_spacing, 0.0, 0.0),
        record: record.clone(),
        materials: Rc::clone(&resources.materials),
        mesh,
    })
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
    fn test_pages_are_spaced_along_x() {
        let book = Book::new(BookConfig::default(), &records(3)).unwrap();
        assert_eq!(book.pages().len(), 3);
        for (i, expected) in [0.0, 0.15, 0.30].iter().enumerate() {
            let offset = book.pages()[i].offset;
            assert!((offset.x - expected).abs() < 1e-6);
            assert_eq!(offset.y, 0.0);
            assert_eq!(offset.z, 0.0);
        }
    }

    #[test]
    fn test_pages_share_geometry_but_not_skeletons() {
        let mut book = Book::new(BookConfig::default(), &records(3)).unwrap();
        for page in book.pages() {
            assert!(Rc::ptr_eq(page.mesh.geometry(), book.geometry()));
        }
        // three pages plus the book's own handle
        assert_eq!(Rc::strong_count(book.geometry()), 4);

        book.pages[0].mesh.skeleton_mut().set_rotation_y(1, 0.5).unwrap();
        assert_eq!(book.pages()[1].mesh.skeleton().bones()[1].rotation.y, 0.0);
    }

    #[test]
    fn test_update_bends_configured_bone() {
        let mut book = Book::new(BookConfig::default(), &records(2)).unwrap();
        book.update(0.0).unwrap();
        for page in book.pages() {
            let bones = page.mesh.skeleton().bones();
            assert!((bones[2].rotation.y - 20.0_f32.to_radians()).abs() < 1e-6);
            assert_eq!(bones[1].rotation.y, 0.0);
            assert_eq!(bones[3].rotation.y, 0.0);
        }
    }

    #[test]
    fn test_custom_curve() {
        let mut book = Book::new(BookConfig::default(), &records(1)).unwrap();
        book.set_bend_curve(|t: f32| t.sin());
        book.update(1.0).unwrap();
        let y = book.pages()[0].mesh.skeleton().bones()[2].rotation.y;
        assert!((y - 1.0_f32.sin()).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_record_is_skipped() {
        let mut input = records(3);
        input[1].back.clear();
        let book = Book::new(BookConfig::default(), &input).unwrap();

        assert_eq!(book.pages().len(), 2);
        assert_eq!(book.skipped().len(), 1);
        assert_eq!(book.skipped()[0].number, 1);
        assert!(matches!(
            book.skipped()[0].error,
            FolioError::InvalidPageData { index: 1, .. }
        ));
        // remaining pages keep their original slots
        assert!((book.pages()[1].offset.x - 0.30).abs() < 1e-6);
        assert_eq!(book.pages()[1].number, 2);
    }

    #[test]
    fn test_invalid_dimensions_fail_book() {
        let mut config = BookConfig::default();
        config.page.depth = 0.0;
        assert!(matches!(
            Book::new(config, &records(1)),
            Err(FolioError::InvalidDimension { name: "depth", .. })
        ));
    }

    #[test]
    fn test_pages_share_materials() {
        let book = Book::new(BookConfig::default(), &records(3)).unwrap();
        for page in book.pages() {
            assert!(Rc::ptr_eq(&page.materials, book.base_materials()));
        }
        assert_eq!(Rc::strong_count(book.base_materials()), 4);
        assert!(book.base_materials().front().texture.is_none());
    }

    #[test]
    fn test_surface_textures_come_from_record() {
        let book = Book::new(BookConfig::default(), &records(2)).unwrap();
        let page = &book.pages()[1];
        assert_eq!(page.surface_texture(SLOT_FRONT), Some("front-1"));
        assert_eq!(page.surface_texture(SLOT_BACK), Some("back-1"));
        assert_eq!(page.surface_texture(0), None);
        assert_eq!(page.surface_texture(6), None);
    }

    #[test]
    fn test_world_positions_apply_offset() {
        let book = Book::new(BookConfig::default(), &records(2)).unwrap();
        let local = book.pages()[1].mesh.deformed_positions();
        let world = book.world_positions(1).unwrap();
        for (l, w) in local.iter().zip(&world) {
            assert!(((w - l) - Vector3::new(0.15, 0.0, 0.0)).norm() < 1e-6);
        }
        assert!(book.world_positions(2).is_none());
    }

    #[test]
    fn test_joint_positions_apply_offset() {
        let mut book = Book::new(BookConfig::default(), &records(2)).unwrap();
        book.update(0.0).unwrap();
        let mut joints = Vec::new();
        assert!(book.joint_positions_into(1, &mut joints));
        assert_eq!(joints.len(), 6);
        assert!((joints[0] - Point3::new(0.15, 0.0, 0.0)).norm() < 1e-6);
        assert!((joints[2] - Point3::new(0.15 + 2.0 * 0.256, 0.0, 0.0)).norm() < 1e-5);
        // the bent bone swings the joints past it out of the page plane
        assert!(joints[3].z.abs() > 1e-3);
        assert!(!book.joint_positions_into(2, &mut joints));
    }

    #[test]
    fn test_missing_field_in_json_record() {
        let record: PageRecord = serde_json::from_str(r#"{ "front": "a" }"#).unwrap();
        assert!(record.validate(0).is_err());
    }
}
