// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph Cache keeps rasterized glyphs, kerning pairs and glyph textures for
//! loaded fonts, and submits glyphs to a graphics backend in batches.
//!
//! A [`Font`] owns one [`GlyphCache`] per distinct [`GlyphCacheKey`] (size,
//! variations and style). Glyphs are rasterized once per cache by a
//! [`FontEngine`](engine::FontEngine), their bitmaps packed into a staging
//! buffer and uploaded to a backend texture when the cache is bound to a
//! [`DrawSession`]. Pen positions use [`FtPix`], 1/64 pixel fixed point.
//!
//! ## Features
//!
//! - `swash` (enabled by default): Provides [`SwashEngine`](engine::SwashEngine)
//!   and [`FontLibrary::with_swash`].
//!
//! ## Example
//!
//! ```no_run
//! use glyph_cache::{FontFlags, FontLibrary, FontOptions};
//!
//! # #[cfg(feature = "swash")]
//! # fn main() -> Result<(), glyph_cache::Error> {
//! let library = FontLibrary::with_swash(FontOptions::default());
//! let font = library.load("DejaVuSans.ttf")?;
//! font.set_size(14.0);
//! font.enable(FontFlags::WORD_WRAP);
//! font.set_wrap_width(200);
//! let lines = font.wrap("The quick brown fox jumps over the lazy dog");
//! println!("{} lines, {}px wide", lines.len(), font.width("The quick"));
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "swash"))]
//! # fn main() {}
//! ```

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

mod batch;
mod buffer;
mod cache;
mod error;
mod fixed;
mod font;
mod glyph;
mod kerning;
mod source;
mod tag;
mod variation;

pub mod engine;

#[cfg(test)]
mod tests;

pub use batch::{
    Batch, DrawSession, GlyphInstance, GlyphTexture, GraphicsBackend, SessionOptions, SessionStats,
    TextureId, BATCH_LEN_MAX, IDENTITY_MATRIX,
};
pub use buffer::{BufferPixels, FontBuffer};
pub use cache::{
    BitmapStaging, CacheId, GlyphCache, GlyphCacheKey, ASCII_TABLE_SIZE, GLYPH_BUCKETS,
};
pub use error::{Error, ErrorKind};
pub use fixed::{FtPix, UNITS_PER_PIXEL};
pub use font::{
    ClipRect, Font, FontFlags, FontId, FontOptions, FontSettings, GlyphCacheGuard, GlyphStep,
    Shadow,
};
pub use glyph::{Glyph, GlyphBitmap, GlyphBounds};
pub use kerning::{KerningCache, KERNING_ENTRY_UNSET, KERNING_TABLE_SIZE};
pub use source::{FontLibrary, FontSource};
pub use tag::Tag;
pub use variation::{AxisValues, VariationAxis, Variations, MAX_VARIATION_AXES};
