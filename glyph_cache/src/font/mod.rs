// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The font handle.
//!
//! A [`Font`] owns its engine, its list of glyph caches, its kerning table
//! and its draw state. Glyph caches are only reachable through a
//! [`GlyphCacheGuard`], which holds the font's cache lock; the lock is
//! released only while the engine rasterizes a missing glyph.

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::cache::{CacheId, GlyphCache, GlyphCacheKey};
use crate::engine::{FaceMetrics, FontEngine, Hinting, RasterRequest, RasterizedGlyph, UnicodeRanges};
use crate::glyph::Glyph;
use crate::kerning::KerningCache;
use crate::source::FontSource;
use crate::variation::{AxisValues, VariationAxis, Variations, MAX_VARIATION_AXES};
use crate::{FtPix, Tag};

mod layout;
mod settings;

pub use layout::GlyphStep;
pub use settings::{ClipRect, FontFlags, FontOptions, FontSettings, Shadow};

static NEXT_FONT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a loaded font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub(crate) u64);

impl FontId {
    fn next() -> Self {
        Self(NEXT_FONT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identifier.
    pub fn to_u64(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct CacheList {
    caches: Vec<GlyphCache>,
    next_id: u32,
    kerning: Option<KerningCache>,
}

impl CacheList {
    fn position(&self, key: &GlyphCacheKey) -> Option<usize> {
        self.caches.iter().position(|cache| cache.key() == key)
    }
}

/// A loaded font face with its glyph caches and draw state.
///
/// Fonts are shared as `Arc<Font>`; every method takes `&self`. Draw state
/// lives behind its own lock so changing it never waits for glyph
/// rasterization.
pub struct Font {
    id: FontId,
    source: FontSource,
    engine: Box<dyn FontEngine>,
    axes: Vec<VariationAxis>,
    unicode_ranges: UnicodeRanges,
    units_per_em: u16,
    has_kerning: bool,
    hinting: Hinting,
    max_texture_bytes: usize,
    settings: Mutex<FontSettings>,
    caches: Mutex<CacheList>,
}

impl Font {
    /// Wraps a loaded engine.
    pub fn new(source: FontSource, engine: Box<dyn FontEngine>, options: &FontOptions) -> Self {
        let mut axes = engine.variation_axes();
        if axes.len() > MAX_VARIATION_AXES {
            log::debug!(
                "{}: using {MAX_VARIATION_AXES} of {} variation axes",
                source.name(),
                axes.len()
            );
            axes.truncate(MAX_VARIATION_AXES);
        }
        let has_kerning = engine.has_kerning();
        let font = Self {
            id: FontId::next(),
            unicode_ranges: engine.unicode_ranges(),
            units_per_em: engine.units_per_em().max(1),
            has_kerning,
            hinting: options.hinting,
            max_texture_bytes: options.max_texture_bytes,
            settings: Mutex::new(FontSettings::new(options)),
            caches: Mutex::new(CacheList {
                caches: Vec::new(),
                next_id: 0,
                kerning: has_kerning.then(KerningCache::new),
            }),
            axes,
            engine,
            source,
        };
        log::debug!(
            "loaded font {:?} ({}): {} axes, kerning: {has_kerning}",
            font.id,
            font.source.name(),
            font.axes.len()
        );
        font
    }

    /// Process-unique identifier.
    pub fn id(&self) -> FontId {
        self.id
    }

    /// Where the font data came from.
    pub fn source(&self) -> &FontSource {
        &self.source
    }

    /// File name or buffer name.
    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// The engine backing this font.
    pub fn engine(&self) -> &dyn FontEngine {
        &*self.engine
    }

    /// Variation axes of the face, at most 16.
    pub fn variation_axes(&self) -> &[VariationAxis] {
        &self.axes
    }

    /// Unicode coverage declared by the face.
    pub fn unicode_ranges(&self) -> UnicodeRanges {
        self.unicode_ranges
    }

    /// Returns `true` if the face has pair kerning.
    pub fn has_kerning(&self) -> bool {
        self.has_kerning
    }

    /// Returns `true` if the face maps `c` to a glyph.
    pub fn has_glyph(&self, c: char) -> bool {
        self.engine.glyph_index(c) != 0
    }

    /// A copy of the current draw state.
    pub fn settings(&self) -> FontSettings {
        *self.settings.lock()
    }

    /// Changes the draw state.
    ///
    /// Changing the hinting or [`FontFlags::MONOCHROME`] flags destroys
    /// every glyph cache, since their glyphs were rasterized differently.
    pub fn update_settings(&self, f: impl FnOnce(&mut FontSettings)) {
        let mut settings = self.settings.lock();
        let before = settings.flags & FontFlags::RASTER_STYLE;
        f(&mut settings);
        let restyled = settings.flags & FontFlags::RASTER_STYLE != before;
        drop(settings);
        if restyled {
            self.clear_glyph_caches();
        }
    }

    /// Sets the size in pixels per em.
    pub fn set_size(&self, size: f32) {
        self.settings.lock().size = size;
    }

    /// Sets normalized variation coordinates, clamped to `[-1, 1]`.
    pub fn set_variations(&self, variations: Variations) {
        self.settings.lock().variations = variations.clamped();
    }

    /// Turns flags on. See [`update_settings`](Self::update_settings).
    pub fn enable(&self, flags: FontFlags) {
        self.update_settings(|settings| settings.flags.insert(flags));
    }

    /// Turns flags off. See [`update_settings`](Self::update_settings).
    pub fn disable(&self, flags: FontFlags) {
        self.update_settings(|settings| settings.flags.remove(flags));
    }

    /// Sets the drawing origin.
    pub fn set_position(&self, x: i32, y: i32, z: i32) {
        self.settings.lock().position = [x, y, z];
    }

    /// Sets the text color.
    pub fn set_color(&self, color: [u8; 4]) {
        self.settings.lock().color = color;
    }

    /// Sets the shadow drawn with [`FontFlags::SHADOW`].
    pub fn set_shadow(&self, shadow: Shadow) {
        self.settings.lock().shadow = shadow;
    }

    /// Sets the clip rectangle used with [`FontFlags::CLIPPING`].
    pub fn set_clip(&self, clip: ClipRect) {
        self.settings.lock().clip = clip;
    }

    /// Sets the line width used with [`FontFlags::WORD_WRAP`].
    pub fn set_wrap_width(&self, width: i32) {
        self.settings.lock().wrap_width = width;
    }

    /// Sets the transform used with [`FontFlags::MATRIX`].
    pub fn set_matrix(&self, matrix: [f32; 16]) {
        self.settings.lock().matrix = matrix;
    }

    /// Sets the rotation used with [`FontFlags::ROTATION`].
    pub fn set_angle(&self, angle: f32) {
        self.settings.lock().angle = angle;
    }

    /// Sets the scale used with [`FontFlags::ASPECT`].
    pub fn set_aspect(&self, aspect: [f32; 3]) {
        self.settings.lock().aspect = aspect;
    }

    /// Design-space axis values for `key`.
    pub fn axis_values(&self, key: &GlyphCacheKey) -> AxisValues {
        let variations = Variations {
            weight: key.weight,
            slant: key.slant,
            width: key.width,
            spacing: key.spacing,
        };
        variations.resolve(&self.axes, key.size)
    }

    /// Vertical metrics for the current size and variations.
    pub fn metrics(&self) -> FaceMetrics {
        let key = self.settings().cache_key();
        self.engine.metrics(key.size, &self.axis_values(&key))
    }

    /// Distance from the baseline to the top of a line, in pixels.
    pub fn ascender(&self) -> f32 {
        self.metrics().ascender.to_float()
    }

    /// Distance from the baseline to the bottom of a line, negative.
    pub fn descender(&self) -> f32 {
        self.metrics().descender.to_float()
    }

    fn request<'a>(&self, glyph: u32, key: &GlyphCacheKey, axes: &'a [(Tag, f32)]) -> RasterRequest<'a> {
        let settings = self.settings();
        RasterRequest {
            glyph,
            size: key.size,
            axes,
            bold: key.bold,
            italic: key.italic,
            hinting: settings.hinting(self.hinting),
            monochrome: settings.flags.contains(FontFlags::MONOCHROME),
        }
    }

    fn rasterize(&self, c: char, key: &GlyphCacheKey) -> (u32, RasterizedGlyph) {
        let index = self.engine.glyph_index(c);
        let axes = self.axis_values(key);
        let raster = self.engine.rasterize(&self.request(index, key, &axes));
        if raster.bitmap.is_none() && !c.is_whitespace() && index != 0 {
            log::trace!("{}: no bitmap for {c:?} (glyph {index})", self.name());
        }
        (index, raster)
    }

    fn new_cache(&self, list: &mut CacheList, key: GlyphCacheKey) -> usize {
        let zero = self.engine.glyph_index('0');
        let axes = self.axis_values(&key);
        let advance = self.engine.advance(&self.request(zero, &key, &axes));
        let id = CacheId(list.next_id);
        list.next_id += 1;
        list.caches.push(GlyphCache::new(
            id,
            key,
            advance.to_int_ceil(),
            self.max_texture_bytes,
        ));
        log::debug!(
            "{}: new glyph cache {id:?} for {key:?} ({} total)",
            self.name(),
            list.caches.len()
        );
        list.caches.len() - 1
    }

    /// Locks the cache list and returns the glyph cache for `key`, creating
    /// it if no cache with a bit-identical key exists.
    ///
    /// The lock is held until the guard is dropped or passed to
    /// [`release_glyph_cache`](Self::release_glyph_cache).
    pub fn acquire_glyph_cache(&self, key: GlyphCacheKey) -> GlyphCacheGuard<'_> {
        let mut list = self.caches.lock();
        let index = match list.position(&key) {
            Some(index) => index,
            None => self.new_cache(&mut list, key),
        };
        GlyphCacheGuard {
            font: self,
            list,
            index,
            key,
        }
    }

    /// The glyph cache for the current settings.
    pub fn current_glyph_cache(&self) -> GlyphCacheGuard<'_> {
        self.acquire_glyph_cache(self.settings().cache_key())
    }

    /// Unlocks the cache list. Caches are kept until the font is dropped
    /// or [`clear_glyph_caches`](Self::clear_glyph_caches) is called.
    pub fn release_glyph_cache(&self, guard: GlyphCacheGuard<'_>) {
        debug_assert!(core::ptr::eq(guard.font, self), "guard of another font");
        drop(guard);
    }

    /// Number of glyph caches.
    pub fn glyph_cache_count(&self) -> usize {
        self.caches.lock().caches.len()
    }

    /// Keys of all glyph caches, oldest first.
    pub fn glyph_cache_keys(&self) -> Vec<GlyphCacheKey> {
        self.caches.lock().caches.iter().map(|c| *c.key()).collect()
    }

    /// Destroys the glyph cache for `key`, returning `true` if it existed.
    pub fn remove_glyph_cache(&self, key: &GlyphCacheKey) -> bool {
        let mut list = self.caches.lock();
        let Some(index) = list.position(key) else {
            return false;
        };
        let cache = list.caches.remove(index);
        log::debug!("{}: removed glyph cache {:?}", self.name(), cache.id());
        true
    }

    /// Destroys every glyph cache together with its glyphs and texture.
    ///
    /// The kerning table is kept, since it does not depend on size.
    pub fn clear_glyph_caches(&self) {
        let mut list = self.caches.lock();
        log::debug!("{}: purging {} glyph caches", self.name(), list.caches.len());
        list.caches.clear();
    }

    /// Number of kerning pairs computed so far; `None` without kerning.
    pub fn kerning_pairs_cached(&self) -> Option<usize> {
        self.caches.lock().kerning.as_ref().map(KerningCache::populated)
    }
}

impl Drop for Font {
    fn drop(&mut self) {
        let list = self.caches.get_mut();
        log::debug!(
            "unloading font {:?} ({}) with {} glyph caches",
            self.id,
            self.source.name(),
            list.caches.len()
        );
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("axes", &self.axes.len())
            .field("has_kerning", &self.has_kerning)
            .finish_non_exhaustive()
    }
}

/// Exclusive access to one glyph cache of a font.
///
/// Holds the font's cache lock. Missing glyphs are rasterized by
/// [`glyph`](Self::glyph) with the lock temporarily released.
pub struct GlyphCacheGuard<'a> {
    font: &'a Font,
    list: MutexGuard<'a, CacheList>,
    index: usize,
    key: GlyphCacheKey,
}

impl<'a> GlyphCacheGuard<'a> {
    /// The font this cache belongs to.
    pub fn font(&self) -> &'a Font {
        self.font
    }

    /// Returns the glyph for `c`, rasterizing and inserting it on a miss.
    ///
    /// The engine runs without the cache lock. If another thread inserted
    /// the same character meanwhile, its record wins. If the cache was
    /// destroyed meanwhile, it is recreated.
    pub fn glyph(&mut self, c: char) -> &Glyph {
        if self.list.caches[self.index].find(c).is_none() {
            let font = self.font;
            let key = self.key;
            let (index, raster) = MutexGuard::unlocked(&mut self.list, || font.rasterize(c, &key));
            self.index = match self.list.position(&key) {
                Some(index) => index,
                None => font.new_cache(&mut self.list, key),
            };
            let cache = &mut self.list.caches[self.index];
            let glyph = Glyph::from_raster(c, index, raster, cache.id());
            return cache.insert(glyph);
        }
        let cache = &self.list.caches[self.index];
        match cache.find(c) {
            Some(glyph) => glyph,
            None => unreachable!("glyph vanished while the cache was locked"),
        }
    }

    /// Kerning between two glyphs at this cache's size.
    ///
    /// Zero if the font has no kerning. Pairs of characters below 128 are
    /// computed once per font; other pairs are looked up every time.
    pub fn kerning(&mut self, left: char, left_index: u32, right: char, right_index: u32) -> FtPix {
        let font = self.font;
        let Some(table) = self.list.kerning.as_mut() else {
            return FtPix::ZERO;
        };
        let units = table.get(left, right, || font.engine.kerning(left_index, right_index));
        if units == 0 {
            return FtPix::ZERO;
        }
        FtPix::from_float(units as f32 * self.key.size / f32::from(font.units_per_em))
    }
}

impl Deref for GlyphCacheGuard<'_> {
    type Target = GlyphCache;

    fn deref(&self) -> &GlyphCache {
        &self.list.caches[self.index]
    }
}

impl DerefMut for GlyphCacheGuard<'_> {
    fn deref_mut(&mut self) -> &mut GlyphCache {
        &mut self.list.caches[self.index]
    }
}

impl fmt::Debug for GlyphCacheGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphCacheGuard")
            .field("font", &self.font.id)
            .field("cache", &**self)
            .finish_non_exhaustive()
    }
}
