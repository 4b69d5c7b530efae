// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The font engine seam.
//!
//! The cache never parses font files itself. Everything it needs from a font
//! (glyph lookup, rasterization, kerning pairs and axis metadata) comes
//! through [`FontEngine`]. With the `swash` feature a ready-made engine is
//! provided by [`SwashEngine`].

use core::fmt::Debug;

use linebender_resource_handle::Blob;

#[cfg(feature = "swash")]
mod swash_engine;
mod unicode_range;

#[cfg(feature = "swash")]
pub use swash_engine::{SwashEngine, SwashLoader};
pub use unicode_range::UnicodeRanges;

use crate::glyph::{GlyphBitmap, GlyphBounds};
use crate::{Error, FtPix, Tag, VariationAxis};

/// Hinting strength.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Hinting {
    /// No hinting; outlines are rendered as designed.
    None,
    /// Light hinting.
    ///
    /// [`SwashEngine`] can only turn hinting on or off, so it hints these
    /// outlines the same way as [`Hinting::Full`].
    #[default]
    Slight,
    /// Full hinting. Advances are also rounded to whole pixels.
    Full,
}

/// Everything a font engine needs to rasterize one glyph.
#[derive(Clone, Copy, Debug)]
pub struct RasterRequest<'a> {
    /// Glyph index, as returned by [`FontEngine::glyph_index`].
    pub glyph: u32,
    /// Size in pixels per em.
    pub size: f32,
    /// Design-space axis values. Axes not listed use their default.
    pub axes: &'a [(Tag, f32)],
    /// Synthesize bold.
    pub bold: bool,
    /// Synthesize italic.
    pub italic: bool,
    /// Hinting strength.
    pub hinting: Hinting,
    /// Produce a 1-bit looking bitmap (coverage is either 0 or 255).
    pub monochrome: bool,
}

/// Rasterizer output for one glyph.
#[derive(Clone, Debug, Default)]
pub struct RasterizedGlyph {
    /// Horizontal advance.
    pub advance_x: FtPix,
    /// Change in left side bearing caused by hinting.
    pub lsb_delta: FtPix,
    /// Change in right side bearing caused by hinting.
    pub rsb_delta: FtPix,
    /// Bounding box relative to the pen.
    pub bounds: GlyphBounds,
    /// Horizontal bearing in pixels.
    pub bearing_x: i32,
    /// Vertical bearing in pixels.
    pub bearing_y: i32,
    /// Coverage bitmap; `None` for blank glyphs or when rasterization failed.
    pub bitmap: Option<GlyphBitmap>,
}

impl RasterizedGlyph {
    /// A glyph that advances the pen but draws nothing.
    pub fn blank(advance_x: FtPix) -> Self {
        Self {
            advance_x,
            ..Self::default()
        }
    }
}

/// Vertical metrics of a face at a given size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaceMetrics {
    /// Distance from the baseline to the top of the line (positive).
    pub ascender: FtPix,
    /// Distance from the baseline to the bottom of the line (negative).
    pub descender: FtPix,
    /// Baseline-to-baseline distance.
    pub line_height: FtPix,
}

/// A loaded font face.
///
/// Implementations must be usable from several threads at once: glyphs for
/// one font may be rasterized concurrently while the font's cache lock is
/// released.
pub trait FontEngine: Send + Sync + Debug {
    /// Maps a character to a glyph index; `0` is the missing glyph.
    fn glyph_index(&self, c: char) -> u32;

    /// Rasterizes a glyph.
    ///
    /// Must not fail: if no bitmap can be produced, return the advance with
    /// `bitmap: None`.
    fn rasterize(&self, request: &RasterRequest<'_>) -> RasterizedGlyph;

    /// Horizontal advance of a glyph without rasterizing it.
    fn advance(&self, request: &RasterRequest<'_>) -> FtPix;

    /// Vertical metrics at the given size.
    fn metrics(&self, size: f32, axes: &[(Tag, f32)]) -> FaceMetrics;

    /// Design units per em, used to scale kerning values.
    fn units_per_em(&self) -> u16;

    /// Returns `true` if the face has pair kerning data.
    fn has_kerning(&self) -> bool;

    /// Unscaled kerning between two glyph indices, in design units.
    fn kerning(&self, left: u32, right: u32) -> i32;

    /// Variation axes of the face; empty for static fonts.
    fn variation_axes(&self) -> Vec<VariationAxis> {
        Vec::new()
    }

    /// Unicode coverage bits from the `OS/2` table.
    fn unicode_ranges(&self) -> UnicodeRanges {
        UnicodeRanges::default()
    }
}

/// Creates [`FontEngine`]s from font data.
pub trait EngineLoader: Send + Sync + Debug {
    /// Parses face `index` of `data`.
    ///
    /// `name` identifies the data in error messages.
    fn load(&self, data: Blob<u8>, index: u32, name: &str) -> Result<Box<dyn FontEngine>, Error>;
}
