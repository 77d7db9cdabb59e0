//! Page material palette.
//!
//! A page box has one material slot per face, in face order (+x, -x, +y,
//! -y, +z, -z). One palette is shared by every page; the front (+z) and
//! back (-z) faces take their textures from each page's record, the four
//! edges are plain colors.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    combinator::{all_consuming, map, map_res, value},
    sequence::preceded,
    IResult,
};

use crate::error::{FolioError, FolioResult};

pub const SLOT_FRONT: usize = 4;
pub const SLOT_BACK: usize = 5;

/// Linear RGB in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#rgb`, `#rrggbb`, `white`, `black` or `pink`.
    pub fn parse(input: &str) -> FolioResult<Self> {
        match all_consuming(parse_color)(input.trim()) {
            Ok((_, color)) => Ok(color),
            Err(_) => Err(FolioError::InvalidColor(input.to_string())),
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn hex6(input: &str) -> IResult<&str, &str> {
    take_while_m_n(6, 6, |c: char| c.is_ascii_hexdigit())(input)
}

fn hex3(input: &str) -> IResult<&str, &str> {
    take_while_m_n(3, 3, |c: char| c.is_ascii_hexdigit())(input)
}

fn parse_long_hex(input: &str) -> IResult<&str, Color> {
    map_res(preceded(tag("#"), hex6), |digits: &str| {
        u32::from_str_radix(digits, 16).map(|v| {
            Color::from_bytes((v >> 16) as u8, (v >> 8) as u8, v as u8)
        })
    })(input)
}

fn parse_short_hex(input: &str) -> IResult<&str, Color> {
    map_res(preceded(tag("#"), hex3), |digits: &str| {
        u16::from_str_radix(digits, 16).map(|v| {
            let expand = |nibble: u16| ((nibble & 0xf) * 17) as u8;
            Color::from_bytes(expand(v >> 8), expand(v >> 4), expand(v))
        })
    })(input)
}

fn parse_color(input: &str) -> IResult<&str, Color> {
    alt((
        parse_long_hex,
        parse_short_hex,
        value(Color::rgb(1.0, 1.0, 1.0), tag("white")),
        value(Color::rgb(0.0, 0.0, 0.0), tag("black")),
        map(tag("pink"), |_| Color::from_bytes(0xff, 0xc0, 0xcb)),
    ))(input)
}

/// Surface description for one face of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub texture: Option<String>,
}

impl Material {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            texture: None,
        }
    }
}

/// The six face materials of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMaterials {
    pub slots: [Material; 6],
}

impl PageMaterials {
    /// The untextured palette every page starts from.
    pub fn base() -> FolioResult<Self> {
        let edge = Material::solid(Color::parse("white")?);
        let spine = Material::solid(Color::parse("#111")?);
        let face = Material::solid(Color::parse("pink")?);
        Ok(Self {
            slots: [
                edge.clone(),
                spine,
                edge.clone(),
                edge,
                face.clone(),
                face,
            ],
        })
    }

    pub fn front(&self) -> &Material {
        &self.slots[SLOT_FRONT]
    }

    pub fn back(&self) -> &Material {
        &self.slots[SLOT_BACK]
    }
}
