// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load options, behavior flags and per-font draw state.

use bitflags::bitflags;

use crate::batch::IDENTITY_MATRIX;
use crate::cache::GlyphCacheKey;
use crate::engine::Hinting;
use crate::variation::Variations;

bitflags! {
    /// Per-font behavior toggles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FontFlags: u32 {
        /// Rotate text by [`FontSettings::angle`].
        const ROTATION       = 1 << 0;
        /// Skip glyphs that are not fully inside [`FontSettings::clip`].
        const CLIPPING       = 1 << 1;
        /// Draw a shadow below each glyph.
        const SHADOW         = 1 << 2;
        /// Apply [`FontSettings::matrix`].
        const MATRIX         = 1 << 3;
        /// Scale text by [`FontSettings::aspect`].
        const ASPECT         = 1 << 4;
        /// Break lines at [`FontSettings::wrap_width`].
        const WORD_WRAP      = 1 << 5;
        /// Render coverage as fully on or off.
        const MONOCHROME     = 1 << 6;
        /// Disable hinting.
        const HINTING_NONE   = 1 << 7;
        /// Vertical-only hinting.
        const HINTING_SLIGHT = 1 << 8;
        /// Full hinting.
        const HINTING_FULL   = 1 << 9;
        /// Synthesize bold.
        const BOLD           = 1 << 10;
        /// Synthesize italic.
        const ITALIC         = 1 << 11;
        /// Lay out every character on a fixed column grid.
        const MONOSPACED     = 1 << 12;
        /// Ignore pair kerning.
        const NO_KERNING     = 1 << 13;
    }
}

impl FontFlags {
    /// Flags that change rasterized bitmaps but are not part of the glyph
    /// cache key.
    pub(crate) const RASTER_STYLE: Self = Self::MONOCHROME
        .union(Self::HINTING_NONE)
        .union(Self::HINTING_SLIGHT)
        .union(Self::HINTING_FULL);
}

/// Options applied when a font is loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontOptions {
    /// Hinting used when no `HINTING_*` flag is set.
    pub hinting: Hinting,
    /// Initial size in pixels per em.
    pub size: f32,
    /// Upper bound on the bitmap bytes one glyph cache uploads.
    pub max_texture_bytes: usize,
    /// Face to load from font collections.
    pub face_index: u32,
    /// Initial flags.
    pub flags: FontFlags,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            hinting: Hinting::Slight,
            size: 11.0,
            max_texture_bytes: 1 << 24,
            face_index: 0,
            flags: FontFlags::empty(),
        }
    }
}

/// Drop shadow parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shadow {
    /// Blur level; `0` draws a hard shadow.
    pub level: i32,
    /// Offset from the glyph in pixels.
    pub offset: [i32; 2],
    /// Straight RGBA color.
    pub color: [u8; 4],
}

/// Rectangle in the font's drawing space, inclusive of its edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipRect {
    /// Left edge.
    pub xmin: i32,
    /// Right edge.
    pub xmax: i32,
    /// Bottom edge.
    pub ymin: i32,
    /// Top edge.
    pub ymax: i32,
}

impl ClipRect {
    /// Returns `true` if the quad `[x1, y1, x2, y2]` (top edge `y1`) lies
    /// entirely inside.
    pub fn contains_quad(&self, quad: [f32; 4]) -> bool {
        let [x1, y1, x2, y2] = quad;
        x1 >= self.xmin as f32
            && x2 <= self.xmax as f32
            && y2 >= self.ymin as f32
            && y1 <= self.ymax as f32
    }
}

/// Everything about a font that callers change between draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSettings {
    /// Size in pixels per em.
    pub size: f32,
    /// Normalized variation coordinates.
    pub variations: Variations,
    /// Behavior toggles.
    pub flags: FontFlags,
    /// Drawing origin.
    pub position: [i32; 3],
    /// Scale applied with [`FontFlags::ASPECT`].
    pub aspect: [f32; 3],
    /// Rotation in radians applied with [`FontFlags::ROTATION`].
    pub angle: f32,
    /// Straight RGBA text color.
    pub color: [u8; 4],
    /// Shadow drawn with [`FontFlags::SHADOW`].
    pub shadow: Shadow,
    /// Column-major transform applied with [`FontFlags::MATRIX`].
    pub matrix: [f32; 16],
    /// Clip rectangle used with [`FontFlags::CLIPPING`].
    pub clip: ClipRect,
    /// Line width in pixels used with [`FontFlags::WORD_WRAP`].
    pub wrap_width: i32,
}

impl FontSettings {
    pub(crate) fn new(options: &FontOptions) -> Self {
        Self {
            size: options.size,
            variations: Variations::default(),
            flags: options.flags,
            position: [0; 3],
            aspect: [1.0; 3],
            angle: 0.0,
            color: [0, 0, 0, 255],
            shadow: Shadow::default(),
            matrix: IDENTITY_MATRIX,
            clip: ClipRect::default(),
            wrap_width: 0,
        }
    }

    /// The glyph cache these settings draw with.
    pub fn cache_key(&self) -> GlyphCacheKey {
        GlyphCacheKey {
            size: self.size,
            weight: self.variations.weight,
            slant: self.variations.slant,
            width: self.variations.width,
            spacing: self.variations.spacing,
            bold: self.flags.contains(FontFlags::BOLD),
            italic: self.flags.contains(FontFlags::ITALIC),
        }
    }

    /// Hinting selected by the flags, or `default` if none is set.
    pub fn hinting(&self, default: Hinting) -> Hinting {
        if self.flags.contains(FontFlags::HINTING_NONE) {
            Hinting::None
        } else if self.flags.contains(FontFlags::HINTING_SLIGHT) {
            Hinting::Slight
        } else if self.flags.contains(FontFlags::HINTING_FULL) {
            Hinting::Full
        } else {
            default
        }
    }

    /// Returns `true` if the pen should advance on a fixed column grid.
    pub fn monospaced(&self) -> bool {
        self.flags.contains(FontFlags::MONOSPACED)
    }

    /// Transform for a batch: the user matrix, then the position, then the
    /// aspect scale, then the rotation, each only when its flag is set.
    pub fn model_matrix(&self) -> [f32; 16] {
        let mut m = if self.flags.contains(FontFlags::MATRIX) {
            self.matrix
        } else {
            IDENTITY_MATRIX
        };
        let [x, y, z] = self.position.map(|v| v as f32);
        let mut translate = IDENTITY_MATRIX;
        translate[12] = x;
        translate[13] = y;
        translate[14] = z;
        m = mul(&m, &translate);
        if self.flags.contains(FontFlags::ASPECT) {
            let mut scale = IDENTITY_MATRIX;
            scale[0] = self.aspect[0];
            scale[5] = self.aspect[1];
            scale[10] = self.aspect[2];
            m = mul(&m, &scale);
        }
        if self.flags.contains(FontFlags::ROTATION) {
            let (sin, cos) = self.angle.sin_cos();
            let mut rotate = IDENTITY_MATRIX;
            rotate[0] = cos;
            rotate[1] = sin;
            rotate[4] = -sin;
            rotate[5] = cos;
            m = mul(&m, &rotate);
        }
        m
    }
}

/// `a * b` for column-major 4×4 matrices.
fn mul(a: &[f32; 16], b: &[f32; 16]) -> [f32; 16] {
    let mut out = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matrix_translates_only() {
        let mut settings = FontSettings::new(&FontOptions::default());
        assert_eq!(settings.model_matrix(), IDENTITY_MATRIX);
        settings.position = [10, 20, 0];
        // Aspect is ignored without its flag.
        settings.aspect = [2.0, 2.0, 1.0];
        let m = settings.model_matrix();
        assert_eq!(&m[12..15], &[10.0, 20.0, 0.0]);
        assert_eq!(m[0], 1.0);
    }

    #[test]
    fn aspect_scales_after_translation() {
        let mut settings = FontSettings::new(&FontOptions::default());
        settings.flags |= FontFlags::ASPECT;
        settings.position = [10, 0, 0];
        settings.aspect = [2.0, 3.0, 1.0];
        let m = settings.model_matrix();
        assert_eq!(m[0], 2.0);
        assert_eq!(m[5], 3.0);
        assert_eq!(m[12], 10.0);
    }

    #[test]
    fn rotation_by_quarter_turn() {
        let mut settings = FontSettings::new(&FontOptions::default());
        settings.flags |= FontFlags::ROTATION;
        settings.angle = core::f32::consts::FRAC_PI_2;
        let m = settings.model_matrix();
        // The x axis maps to the y axis.
        assert!(m[0].abs() < 1e-6);
        assert!((m[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn hinting_flags_override_default() {
        let mut settings = FontSettings::new(&FontOptions::default());
        assert_eq!(settings.hinting(Hinting::Full), Hinting::Full);
        settings.flags |= FontFlags::HINTING_NONE;
        assert_eq!(settings.hinting(Hinting::Full), Hinting::None);
    }

    #[test]
    fn cache_key_reflects_style_flags() {
        let mut settings = FontSettings::new(&FontOptions::default());
        settings.flags |= FontFlags::BOLD;
        settings.variations.weight = 0.5;
        let key = settings.cache_key();
        assert!(key.bold);
        assert!(!key.italic);
        assert_eq!(key.weight, 0.5);
        assert_eq!(key.size, 11.0);
    }

    #[test]
    fn clip_requires_full_containment() {
        let clip = ClipRect {
            xmin: 0,
            xmax: 100,
            ymin: 0,
            ymax: 50,
        };
        assert!(clip.contains_quad([10.0, 40.0, 20.0, 30.0]));
        assert!(!clip.contains_quad([95.0, 40.0, 105.0, 30.0]));
        assert!(!clip.contains_quad([10.0, 55.0, 20.0, 45.0]));
    }
}
