// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rasterized glyph records.

use core::fmt;

use crate::cache::CacheId;
use crate::engine::RasterizedGlyph;
use crate::FtPix;

/// Glyph bounding box in fixed-point pixels, relative to the pen position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphBounds {
    /// Left edge.
    pub x_min: FtPix,
    /// Right edge.
    pub x_max: FtPix,
    /// Bottom edge (below the baseline when negative).
    pub y_min: FtPix,
    /// Top edge.
    pub y_max: FtPix,
}

impl GlyphBounds {
    /// Returns `true` if the box has no area.
    pub fn is_empty(&self) -> bool {
        self.x_min >= self.x_max || self.y_min >= self.y_max
    }
}

/// An 8-bit coverage bitmap owned by a single glyph.
///
/// Rows are `pitch` bytes apart; only the first `width` bytes of each row
/// are coverage values.
#[derive(Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    data: Box<[u8]>,
    width: u32,
    height: u32,
    pitch: u32,
}

impl GlyphBitmap {
    /// Wraps rasterizer output.
    ///
    /// Returns `None` if the dimensions are zero or `data` is too short for
    /// `height` rows of `pitch` bytes.
    pub fn new(data: Vec<u8>, width: u32, height: u32, pitch: u32) -> Option<Self> {
        if width == 0 || height == 0 || pitch < width {
            return None;
        }
        let needed = (pitch as usize).checked_mul(height as usize)?;
        if data.len() < needed {
            return None;
        }
        Some(Self {
            data: data.into_boxed_slice(),
            width,
            height,
            pitch,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Distance between rows in bytes.
    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Raw bytes, including any row padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Coverage values of row `y`, top row first.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.pitch as usize;
        &self.data[start..start + self.width as usize]
    }

    /// Iterates over rows without padding, top row first.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(|y| self.row(y))
    }

    /// Number of bytes the bitmap occupies once packed without padding.
    pub fn packed_len(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Debug for GlyphBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pitch", &self.pitch)
            .finish_non_exhaustive()
    }
}

/// One character rasterized for one glyph cache.
#[derive(Debug)]
pub struct Glyph {
    /// The character this glyph was rasterized for.
    pub c: char,
    /// The font engine's glyph index.
    pub index: u32,
    /// Bounding box relative to the pen.
    pub bounds: GlyphBounds,
    /// Horizontal advance.
    pub advance_x: FtPix,
    /// Change in left side bearing caused by hinting, zero otherwise.
    pub lsb_delta: FtPix,
    /// Change in right side bearing caused by hinting, zero otherwise.
    pub rsb_delta: FtPix,
    /// Byte offset of the packed bitmap in the cache's glyph texture.
    ///
    /// `None` for glyphs without a bitmap, and for glyphs that did not fit
    /// under the texture size limit.
    pub texture_offset: Option<usize>,
    /// Horizontal bearing: origin to the left edge of the bitmap, in pixels.
    pub bearing_x: i32,
    /// Vertical bearing: baseline to the top edge of the bitmap, in pixels.
    pub bearing_y: i32,
    bitmap: Option<GlyphBitmap>,
    cache: CacheId,
}

impl Glyph {
    pub(crate) fn from_raster(c: char, index: u32, raster: RasterizedGlyph, cache: CacheId) -> Self {
        Self {
            c,
            index,
            bounds: raster.bounds,
            advance_x: raster.advance_x,
            lsb_delta: raster.lsb_delta,
            rsb_delta: raster.rsb_delta,
            texture_offset: None,
            bearing_x: raster.bearing_x,
            bearing_y: raster.bearing_y,
            bitmap: raster.bitmap,
            cache,
        }
    }

    /// The coverage bitmap, absent for whitespace and failed rasterization.
    pub fn bitmap(&self) -> Option<&GlyphBitmap> {
        self.bitmap.as_ref()
    }

    /// Bitmap width and height in pixels, zero without a bitmap.
    pub fn dims(&self) -> [u32; 2] {
        self.bitmap
            .as_ref()
            .map_or([0, 0], |b| [b.width(), b.height()])
    }

    /// The glyph cache that owns this glyph.
    pub fn cache(&self) -> CacheId {
        self.cache
    }

    /// Returns `true` if there is nothing to draw for this glyph.
    pub fn is_blank(&self) -> bool {
        self.bitmap.is_none()
    }
}
