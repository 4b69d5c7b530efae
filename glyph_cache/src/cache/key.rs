// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph cache configuration key.

use core::hash::{Hash, Hasher};

/// The configuration a glyph cache was rasterized for.
///
/// Two keys are equal only if every float is bit-identical: `11.0` and
/// `11.000001` select different caches, and so do `0.0` and `-0.0`. Callers
/// that derive sizes from arithmetic should quantize them first.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlyphCacheKey {
    /// Size in pixels per em.
    pub size: f32,
    /// Normalized weight in `[-1, 1]`.
    pub weight: f32,
    /// Normalized slant in `[-1, 1]`.
    pub slant: f32,
    /// Normalized width in `[-1, 1]`.
    pub width: f32,
    /// Normalized spacing in `[-1, 1]`.
    pub spacing: f32,
    /// Synthetic bold.
    pub bold: bool,
    /// Synthetic italic.
    pub italic: bool,
}

impl GlyphCacheKey {
    /// A key for `size` with default variations and no synthetic styles.
    pub fn with_size(size: f32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    fn bits(&self) -> [u32; 5] {
        [
            self.size.to_bits(),
            self.weight.to_bits(),
            self.slant.to_bits(),
            self.width.to_bits(),
            self.spacing.to_bits(),
        ]
    }
}

impl PartialEq for GlyphCacheKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits() && self.bold == other.bold && self.italic == other.italic
    }
}

impl Eq for GlyphCacheKey {}

impl Hash for GlyphCacheKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
        self.bold.hash(state);
        self.italic.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_bitwise() {
        let a = GlyphCacheKey::with_size(12.0);
        assert_eq!(a, GlyphCacheKey::with_size(12.0));
        assert_ne!(a, GlyphCacheKey::with_size(f32::from_bits(12.0_f32.to_bits() + 1)));
        let negative_zero = GlyphCacheKey {
            weight: -0.0,
            ..a
        };
        assert_ne!(a, negative_zero);
        let nan = GlyphCacheKey::with_size(f32::NAN);
        assert_eq!(nan, nan);
    }

    #[test]
    fn style_flags_are_part_of_the_key() {
        let a = GlyphCacheKey::with_size(12.0);
        assert_ne!(a, GlyphCacheKey { bold: true, ..a });
        assert_ne!(a, GlyphCacheKey { italic: true, ..a });
    }
}
