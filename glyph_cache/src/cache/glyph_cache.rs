// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyphs of one font at one size and variation.

use core::fmt;

use smallvec::SmallVec;

use super::{BitmapStaging, CacheId, GlyphCacheKey};
use crate::batch::GlyphTexture;
use crate::glyph::Glyph;

/// Number of buckets glyphs are spread over, by character code.
pub const GLYPH_BUCKETS: usize = 257;

/// Characters below this code are also reachable through a direct table.
pub const ASCII_TABLE_SIZE: usize = 128;

/// Glyph records for one configuration of a font.
///
/// Glyphs are stored in insertion order and indexed two ways: by bucket
/// (`c % 257`) for every character, and directly for `c < 128`. The direct
/// table only ever points at entries that are also in their bucket.
///
/// The cache owns the staging buffer for its bitmaps and, once a draw
/// session created one, the texture they are uploaded to.
pub struct GlyphCache {
    id: CacheId,
    key: GlyphCacheKey,
    glyphs: Vec<Glyph>,
    buckets: Vec<SmallVec<[u32; 2]>>,
    ascii: [Option<u32>; ASCII_TABLE_SIZE],
    fixed_width: i32,
    staging: BitmapStaging,
    texture: Option<Box<dyn GlyphTexture>>,
}

impl GlyphCache {
    /// Creates an empty cache.
    ///
    /// `fixed_width` is the column width used for monospaced layout, and
    /// `max_texture_bytes` caps the bitmap bytes the cache will stage.
    pub fn new(id: CacheId, key: GlyphCacheKey, fixed_width: i32, max_texture_bytes: usize) -> Self {
        Self {
            id,
            key,
            glyphs: Vec::new(),
            buckets: vec![SmallVec::new(); GLYPH_BUCKETS],
            ascii: [None; ASCII_TABLE_SIZE],
            fixed_width: fixed_width.max(1),
            staging: BitmapStaging::new(max_texture_bytes),
            texture: None,
        }
    }

    /// Identifier of this cache within its font.
    pub fn id(&self) -> CacheId {
        self.id
    }

    /// The configuration this cache was created for.
    pub fn key(&self) -> &GlyphCacheKey {
        &self.key
    }

    /// Column width for monospaced layout, in whole pixels.
    pub fn fixed_width(&self) -> i32 {
        self.fixed_width
    }

    fn bucket(c: char) -> usize {
        c as usize % GLYPH_BUCKETS
    }

    /// Looks up the glyph for `c`.
    ///
    /// Characters below 128 go through the direct table; everything else
    /// through its bucket. `None` means the glyph still has to be
    /// rasterized and inserted.
    pub fn find(&self, c: char) -> Option<&Glyph> {
        if (c as usize) < ASCII_TABLE_SIZE {
            return self.ascii_entry(c);
        }
        self.find_in_buckets(c)
    }

    /// Looks up `c` in its bucket only.
    pub fn find_in_buckets(&self, c: char) -> Option<&Glyph> {
        self.buckets[Self::bucket(c)]
            .iter()
            .map(|&i| &self.glyphs[i as usize])
            .find(|g| g.c == c)
    }

    /// Looks up `c` in the direct table only. Always `None` for `c >= 128`.
    pub fn ascii_entry(&self, c: char) -> Option<&Glyph> {
        let slot = self.ascii.get(c as usize)?;
        slot.map(|i| &self.glyphs[i as usize])
    }

    /// Adds a glyph and returns the stored record.
    ///
    /// If a glyph for the same character is already present the new one is
    /// dropped and the existing record is returned. The glyph's bitmap is
    /// appended to the staging buffer; if that would exceed the texture
    /// limit the glyph is stored without a texture offset.
    pub fn insert(&mut self, mut glyph: Glyph) -> &Glyph {
        if let Some(i) = self.position(glyph.c) {
            return &self.glyphs[i];
        }
        debug_assert_eq!(glyph.cache(), self.id, "glyph rasterized for another cache");
        if let Some(bitmap) = glyph.bitmap() {
            glyph.texture_offset = self.staging.push(bitmap.rows(), bitmap.packed_len());
            if glyph.texture_offset.is_none() {
                log::warn!(
                    "glyph texture limit of {} bytes reached, {:?} will not be drawn",
                    self.staging.limit(),
                    glyph.c
                );
            }
        }
        let Ok(index) = u32::try_from(self.glyphs.len()) else {
            unreachable!("more glyphs than there are characters");
        };
        let c = glyph.c;
        self.buckets[Self::bucket(c)].push(index);
        if let Some(slot) = self.ascii.get_mut(c as usize) {
            *slot = Some(index);
        }
        self.glyphs.push(glyph);
        &self.glyphs[index as usize]
    }

    fn position(&self, c: char) -> Option<usize> {
        self.buckets[Self::bucket(c)]
            .iter()
            .map(|&i| i as usize)
            .find(|&i| self.glyphs[i].c == c)
    }

    /// Number of glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns `true` if no glyph has been inserted.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Iterates over glyphs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Glyph> + '_ {
        self.glyphs.iter()
    }

    /// Bitmap bytes awaiting upload.
    pub fn staging(&self) -> &BitmapStaging {
        &self.staging
    }

    pub(crate) fn staging_mut(&mut self) -> &mut BitmapStaging {
        &mut self.staging
    }

    /// The texture bitmaps are uploaded to, if one was created.
    pub fn texture(&self) -> Option<&dyn GlyphTexture> {
        self.texture.as_deref()
    }

    pub(crate) fn texture_mut(&mut self) -> Option<&mut (dyn GlyphTexture + 'static)> {
        self.texture.as_deref_mut()
    }

    /// Installs a new texture and returns the previous one.
    pub(crate) fn replace_texture(
        &mut self,
        texture: Box<dyn GlyphTexture>,
    ) -> Option<Box<dyn GlyphTexture>> {
        self.texture.replace(texture)
    }

    /// Drops every glyph, the staged bitmaps and the texture.
    pub fn clear(&mut self) {
        self.glyphs.clear();
        self.buckets.iter_mut().for_each(SmallVec::clear);
        self.ascii = [None; ASCII_TABLE_SIZE];
        self.staging.clear();
        self.texture = None;
    }
}

impl fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphCache")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("glyphs", &self.glyphs.len())
            .field("fixed_width", &self.fixed_width)
            .field("staged", &self.staging.len())
            .field("texture", &self.texture.as_ref().map(|t| t.id()))
            .finish_non_exhaustive()
    }
}
