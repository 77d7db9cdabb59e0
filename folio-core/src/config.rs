//! Book configuration.
//!
//! Defaults reproduce the reference book: a 1.28 × 1.71 page, 3 mm thick,
//! split into five bendable segments, with pages 0.15 apart and the third
//! bone bent by 20 degrees.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FolioError, FolioResult};

pub const PAGE_WIDTH: f32 = 1.28;
pub const PAGE_HEIGHT: f32 = 1.71;
pub const PAGE_DEPTH: f32 = 0.003;
pub const PAGE_SEGMENTS: u32 = 5;
pub const PAGE_SPACING: f32 = 0.15;
pub const BEND_BONE: usize = 2;
pub const BEND_ANGLE_DEGREES: f32 = 20.0;

/// Largest segment count whose bone indices (`segments`) fit a `u16` skin
/// index attribute.
pub const MAX_SEGMENTS: u32 = u16::MAX as u32 - 1;

/// Physical size of a page and how finely it is segmented along its width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageDimensions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub segments: u32,
}

impl PageDimensions {
    pub fn new(width: f32, height: f32, depth: f32, segments: u32) -> Self {
        Self {
            width,
            height,
            depth,
            segments,
        }
    }

    /// Width of one bendable segment.
    pub fn segment_width(&self) -> f32 {
        self.width / self.segments as f32
    }

    /// Number of bones in a page skeleton.
    pub fn bone_count(&self) -> usize {
        self.segments as usize + 1
    }

    pub fn validate(&self) -> FolioResult<()> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FolioError::InvalidDimension { name, value });
            }
        }
        if self.segments == 0 || self.segments > MAX_SEGMENTS {
            return Err(FolioError::InvalidDimension {
                name: "segments",
                value: self.segments as f32,
            });
        }
        Ok(())
    }
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self::new(PAGE_WIDTH, PAGE_HEIGHT, PAGE_DEPTH, PAGE_SEGMENTS)
    }
}

/// Everything needed to assemble and animate a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub page: PageDimensions,
    /// Distance between consecutive pages along x.
    pub page_spacing: f32,
    /// Bone driven by the per-frame bend.
    pub bend_bone: usize,
    pub bend_angle_degrees: f32,
}

impl BookConfig {
    pub fn from_json(json: &str) -> FolioResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> FolioResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> FolioResult<()> {
        self.page.validate()?;
        if !self.page_spacing.is_finite() || self.page_spacing < 0.0 {
            return Err(FolioError::InvalidDimension {
                name: "page_spacing",
                value: self.page_spacing,
            });
        }
        let count = self.page.bone_count();
        if self.bend_bone >= count {
            return Err(FolioError::BoneOutOfRange {
                bone: self.bend_bone,
                count,
            });
        }
        Ok(())
    }

    pub fn bend_angle(&self) -> f32 {
        self.bend_angle_degrees.to_radians()
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            page: PageDimensions::default(),
            page_spacing: PAGE_SPACING,
            bend_bone: BEND_BONE,
            bend_angle_degrees: BEND_ANGLE_DEGREES,
        }
    }
}
