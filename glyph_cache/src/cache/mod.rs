// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-configuration glyph caches.
//!
//! A font keeps one [`GlyphCache`] for every distinct [`GlyphCacheKey`] it
//! has been drawn with. Each cache holds the rasterized glyphs, a staging
//! buffer of their packed bitmaps and the texture those bitmaps are
//! uploaded to.

mod glyph_cache;
mod key;
mod staging;

pub use glyph_cache::{GlyphCache, ASCII_TABLE_SIZE, GLYPH_BUCKETS};
pub use key::GlyphCacheKey;
pub use staging::BitmapStaging;

/// Identifies a glyph cache within its font.
///
/// Identifiers are never reused by the same font, even after its caches are
/// cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheId(pub(crate) u32);

impl CacheId {
    /// The raw identifier.
    pub fn to_u32(self) -> u32 {
        self.0
    }
}
