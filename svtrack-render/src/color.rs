//! Indexed color table for variant quads.
//!
//! Vertices carry a table slot rather than an RGBA value; the host resolves
//! the slot against the table at draw time, so restyling never rebuilds
//! geometry.

use svtrack_core::SvType;

/// Slots of the shared color table. The numeric order is part of the
/// upload contract with the host shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorIx {
    Variant = 0,
    VariantLight = 1,
    Insertion = 2,
    InsertionLight = 3,
    Deletion = 4,
    DeletionLight = 5,
    Inversion = 6,
    InversionLight = 7,
    Translocation = 8,
    TranslocationLight = 9,
    Duplication = 10,
    DuplicationLight = 11,
    Line = 12,
    Black = 13,
    Black05 = 14,
    White = 15,
}

impl ColorIx {
    pub const COUNT: usize = 16;

    pub fn as_f32(self) -> f32 {
        self as u8 as f32
    }
}

/// Alpha multiplier for the light companion of each variant color, used
/// for common population variants.
const LIGHT_ALPHA: f32 = 0.33;

/// Resolved RGBA table, built once per style from a five-color scale.
#[derive(Debug, Clone)]
pub struct ColorTable {
    rgba: [[f32; 4]; ColorIx::COUNT],
}

impl ColorTable {
    /// Build from the configured scale, ordered insertion, deletion,
    /// inversion, translocation, duplication.
    pub fn new(scale: &[[f32; 4]; 5]) -> Self {
        let mut rgba = [[0.0; 4]; ColorIx::COUNT];
        let neutral = [0.4, 0.4, 0.4, 1.0];
        rgba[ColorIx::Variant as usize] = neutral;
        rgba[ColorIx::VariantLight as usize] = Self::lighten(neutral);
        rgba[ColorIx::Insertion as usize] = scale[0];
        rgba[ColorIx::InsertionLight as usize] = Self::lighten(scale[0]);
        rgba[ColorIx::Deletion as usize] = scale[1];
        rgba[ColorIx::DeletionLight as usize] = Self::lighten(scale[1]);
        rgba[ColorIx::Inversion as usize] = scale[2];
        rgba[ColorIx::InversionLight as usize] = Self::lighten(scale[2]);
        rgba[ColorIx::Translocation as usize] = scale[3];
        rgba[ColorIx::TranslocationLight as usize] = Self::lighten(scale[3]);
        rgba[ColorIx::Duplication as usize] = scale[4];
        rgba[ColorIx::DuplicationLight as usize] = Self::lighten(scale[4]);
        rgba[ColorIx::Line as usize] = [0.0, 0.0, 0.0, 0.6];
        rgba[ColorIx::Black as usize] = [0.0, 0.0, 0.0, 1.0];
        rgba[ColorIx::Black05 as usize] = [0.0, 0.0, 0.0, 0.5];
        rgba[ColorIx::White as usize] = [1.0, 1.0, 1.0, 1.0];
        Self { rgba }
    }

    fn lighten(color: [f32; 4]) -> [f32; 4] {
        [color[0], color[1], color[2], color[3] * LIGHT_ALPHA]
    }

    /// Table slot for a variant kind, light companion when requested.
    pub fn index_for(sv_type: SvType, light: bool) -> ColorIx {
        match (sv_type, light) {
            (SvType::Insertion, false) => ColorIx::Insertion,
            (SvType::Insertion, true) => ColorIx::InsertionLight,
            (SvType::Deletion, false) => ColorIx::Deletion,
            (SvType::Deletion, true) => ColorIx::DeletionLight,
            (SvType::Inversion, false) => ColorIx::Inversion,
            (SvType::Inversion, true) => ColorIx::InversionLight,
            (SvType::Translocation, false) => ColorIx::Translocation,
            (SvType::Translocation, true) => ColorIx::TranslocationLight,
            (SvType::Duplication, false) => ColorIx::Duplication,
            (SvType::Duplication, true) => ColorIx::DuplicationLight,
        }
    }

    pub fn rgba(&self, ix: ColorIx) -> [f32; 4] {
        self.rgba[ix as usize]
    }

    /// Flat table for upload, `COUNT * 4` floats.
    pub fn as_flat(&self) -> Vec<f32> {
        self.rgba.iter().flatten().copied().collect()
    }
}
