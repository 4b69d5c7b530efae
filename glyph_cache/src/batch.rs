// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched glyph submission to a graphics backend.
//!
//! A [`DrawSession`] is created per frame by the code that owns the
//! graphics context. It is bound to one font, one glyph cache and one
//! transform at a time and accumulates [`GlyphInstance`]s until it is
//! flushed, either explicitly or implicitly when:
//!
//! - the batch is full,
//! - a different font, cache or matrix is bound,
//! - the bound cache's texture is replaced.
//!
//! Texture memory belongs to the backend; glyph caches only hold the
//! [`GlyphTexture`] handles it creates.

use core::fmt;

use bytemuck::{Pod, Zeroable};

use crate::cache::{CacheId, GlyphCache};
use crate::font::FontId;
use crate::glyph::Glyph;
use crate::Error;

/// Maximum number of glyphs submitted in one batch.
pub const BATCH_LEN_MAX: usize = 2048;

/// Identity matrix in column-major order.
pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Per-glyph attributes of one batch entry.
///
/// The layout is stable so instance slices can be handed to a vertex
/// buffer with [`bytemuck::cast_slice`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GlyphInstance {
    /// Quad corners `[x1, y1, x2, y2]`; `y1` is the top edge.
    pub pos: [f32; 4],
    /// Straight RGBA color.
    pub color: [u8; 4],
    /// Byte offset of the packed bitmap in the glyph texture.
    pub offset: u32,
    /// Bitmap width and height in pixels.
    pub glyph_size: [i32; 2],
}

impl GlyphInstance {
    /// Quad of `glyph` with its origin at pen position `(x, y)`.
    pub fn quad(glyph: &Glyph, x: f32, y: f32) -> [f32; 4] {
        let [w, h] = glyph.dims();
        let (w, h) = (w as f32, h as f32);
        let x1 = x + glyph.bearing_x as f32;
        let y1 = y + glyph.bearing_y as f32;
        [x1, y1, x1 + w, y1 - h]
    }

    /// Builds the instance for `glyph` at pen position `(x, y)`.
    ///
    /// Returns `None` for glyphs without a texture slot.
    pub fn new(glyph: &Glyph, x: f32, y: f32, color: [u8; 4]) -> Option<Self> {
        let offset = u32::try_from(glyph.texture_offset?).ok()?;
        let [w, h] = glyph.dims();
        Some(Self {
            pos: Self::quad(glyph, x, y),
            color,
            offset,
            glyph_size: [i32::try_from(w).ok()?, i32::try_from(h).ok()?],
        })
    }
}

/// Backend handle of a glyph texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// A linear texture of 8-bit coverage values owned by the graphics backend.
pub trait GlyphTexture: Send + fmt::Debug {
    /// Backend handle, reported in each [`Batch`].
    fn id(&self) -> TextureId;

    /// Size in bytes.
    fn capacity(&self) -> usize;

    /// Copies `bytes` to the texture starting at byte `offset`.
    ///
    /// `offset + bytes.len()` never exceeds [`capacity`](Self::capacity).
    fn write(&mut self, offset: usize, bytes: &[u8]);
}

/// One submission to the graphics backend.
#[derive(Clone, Copy, Debug)]
pub struct Batch<'a> {
    /// Font the glyphs belong to.
    pub font: FontId,
    /// Glyph cache the glyphs were taken from.
    pub cache: CacheId,
    /// Texture holding the glyph bitmaps.
    pub texture: TextureId,
    /// Model matrix, column-major.
    pub matrix: &'a [f32; 16],
    /// The glyphs, at most [`BATCH_LEN_MAX`].
    pub instances: &'a [GlyphInstance],
}

/// The consumer of glyph batches.
pub trait GraphicsBackend {
    /// Allocates a glyph texture of `capacity` bytes.
    fn create_texture(&mut self, capacity: usize) -> Box<dyn GlyphTexture>;

    /// Draws one batch.
    fn draw(&mut self, batch: &Batch<'_>) -> Result<(), Error>;
}

/// Draw session configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Glyphs per batch; clamped to `1..=BATCH_LEN_MAX`.
    pub max_batch_len: usize,
    /// Smallest texture the session creates for a glyph cache.
    pub initial_texture_bytes: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_batch_len: BATCH_LEN_MAX,
            initial_texture_bytes: 64 * 1024,
        }
    }
}

/// Counters describing a finished session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Batches submitted to the backend.
    pub flushes: usize,
    /// Batches submitted because the batch was full or the binding changed.
    pub implicit_flushes: usize,
    /// Glyphs submitted.
    pub glyphs: usize,
    /// Glyph textures created or replaced.
    pub textures_created: usize,
}

#[derive(Clone, Copy, Debug)]
struct Binding {
    font: FontId,
    cache: CacheId,
    texture: TextureId,
    matrix: [f32; 16],
}

impl Binding {
    fn same_target(&self, font: FontId, cache: CacheId) -> bool {
        self.font == font && self.cache == cache
    }

    fn same_matrix(&self, matrix: &[f32; 16]) -> bool {
        self.matrix
            .iter()
            .zip(matrix)
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

/// Accumulates glyphs for one graphics context.
///
/// Not shareable between threads: it borrows the backend mutably for its
/// whole lifetime. After a failed flush the session drops every further
/// glyph and [`finish`](Self::finish) reports the error; nothing is
/// retried. Dropping a session flushes whatever is still pending.
pub struct DrawSession<'b, B: GraphicsBackend + ?Sized> {
    backend: &'b mut B,
    max_len: usize,
    initial_texture_bytes: usize,
    binding: Option<Binding>,
    instances: Vec<GlyphInstance>,
    failed: Option<Error>,
    stats: SessionStats,
}

impl<'b, B: GraphicsBackend + ?Sized> DrawSession<'b, B> {
    /// Starts a session drawing to `backend`.
    pub fn new(backend: &'b mut B, options: SessionOptions) -> Self {
        let max_len = options.max_batch_len.clamp(1, BATCH_LEN_MAX);
        Self {
            backend,
            max_len,
            initial_texture_bytes: options.initial_texture_bytes.max(1),
            binding: None,
            instances: Vec::with_capacity(max_len),
            failed: None,
            stats: SessionStats::default(),
        }
    }

    /// Makes `cache` of `font` the target of subsequent glyphs.
    ///
    /// Pending glyphs are flushed first if the font, the cache or the
    /// matrix differ from the current binding. Any staged bitmaps of
    /// `cache` are uploaded.
    pub fn bind(&mut self, font: FontId, cache: &mut GlyphCache, matrix: &[f32; 16]) {
        if let Some(binding) = &self.binding {
            if !binding.same_target(font, cache.id()) || !binding.same_matrix(matrix) {
                self.flush_implicit();
                self.binding = None;
            }
        }
        self.upload(font, cache);
        let Some(texture) = cache.texture().map(|t| t.id()) else {
            return;
        };
        self.binding = Some(Binding {
            font,
            cache: cache.id(),
            texture,
            matrix: *matrix,
        });
    }

    /// Returns `true` if `cache` of `font` is bound with `matrix`.
    pub fn is_bound(&self, font: FontId, cache: CacheId, matrix: &[f32; 16]) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.same_target(font, cache) && b.same_matrix(matrix))
    }

    /// Writes the staged bitmaps of `cache` to its texture.
    ///
    /// Creates the texture on first use, and replaces it with one at least
    /// twice as large when the staged bytes no longer fit. A replacement
    /// flushes pending glyphs of the old texture and re-uploads every
    /// staged bitmap.
    pub fn upload(&mut self, font: FontId, cache: &mut GlyphCache) {
        let needed = cache.staging().len();
        let current = cache.texture().map(|t| t.capacity());
        if current.is_none_or(|capacity| capacity < needed) {
            let limit = cache.staging().limit().max(1);
            let capacity = match current {
                Some(capacity) => capacity.saturating_mul(2).max(needed),
                None => self.initial_texture_bytes.max(needed),
            }
            .next_power_of_two()
            .min(limit)
            .max(needed);
            let bound_here = self
                .binding
                .as_ref()
                .is_some_and(|b| b.same_target(font, cache.id()));
            if bound_here {
                self.flush_implicit();
            }
            let texture = self.backend.create_texture(capacity);
            log::debug!(
                "glyph cache {:?} of font {font:?}: texture {:?} with {capacity} bytes",
                cache.id(),
                texture.id()
            );
            let id = texture.id();
            cache.replace_texture(texture);
            cache.staging_mut().reset_landed();
            self.stats.textures_created += 1;
            if bound_here {
                if let Some(binding) = &mut self.binding {
                    binding.texture = id;
                }
            }
        }
        let pending = cache.staging().pending();
        if pending.is_empty() {
            return;
        }
        // Split borrow: the texture and the staging buffer both live in the cache.
        let bytes = cache.staging().bytes()[pending.clone()].to_vec();
        if let Some(texture) = cache.texture_mut() {
            texture.write(pending.start, &bytes);
            cache.staging_mut().mark_landed();
        }
    }

    /// Appends a glyph at pen position `(x, y)` to the bound batch.
    ///
    /// Glyphs without a texture slot are skipped. Returns `true` if the
    /// glyph was queued.
    pub fn add_glyph(&mut self, glyph: &Glyph, x: f32, y: f32, color: [u8; 4]) -> bool {
        if let Some(binding) = &self.binding {
            debug_assert_eq!(binding.cache, glyph.cache(), "glyph from an unbound cache");
        }
        match GlyphInstance::new(glyph, x, y, color) {
            Some(instance) => self.add_instance(instance),
            None => false,
        }
    }

    /// Appends a prepared instance to the bound batch.
    ///
    /// The batch is flushed as soon as it holds the maximum number of
    /// glyphs. Returns `false` if nothing is bound or the session has
    /// failed.
    pub fn add_instance(&mut self, instance: GlyphInstance) -> bool {
        if self.failed.is_some() {
            return false;
        }
        if self.binding.is_none() {
            log::warn!("glyph added to a draw session with nothing bound");
            return false;
        }
        self.instances.push(instance);
        if self.instances.len() >= self.max_len {
            self.flush_implicit();
        }
        true
    }

    /// Glyphs waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.instances.len()
    }

    /// Counters so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Submits pending glyphs as one batch.
    ///
    /// Keeps the binding. Once a submission has failed, every later call
    /// returns that error.
    pub fn flush(&mut self) -> Result<(), Error> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        let Some(binding) = &self.binding else {
            self.instances.clear();
            return Ok(());
        };
        if self.instances.is_empty() {
            return Ok(());
        }
        let batch = Batch {
            font: binding.font,
            cache: binding.cache,
            texture: binding.texture,
            matrix: &binding.matrix,
            instances: &self.instances,
        };
        let result = self.backend.draw(&batch);
        let count = self.instances.len();
        self.instances.clear();
        match result {
            Ok(()) => {
                self.stats.flushes += 1;
                self.stats.glyphs += count;
                log::trace!("flushed {count} glyphs");
                Ok(())
            }
            Err(err) => {
                log::error!("dropping text for the rest of the session: {err}");
                self.failed = Some(err.clone());
                Err(err)
            }
        }
    }

    fn flush_implicit(&mut self) {
        if self.instances.is_empty() || self.failed.is_some() {
            return;
        }
        if self.flush().is_ok() {
            self.stats.implicit_flushes += 1;
        }
    }

    /// Flushes and forgets the binding.
    pub fn unbind(&mut self) {
        self.flush_implicit();
        self.binding = None;
    }

    /// Flushes pending glyphs and ends the session.
    pub fn finish(mut self) -> Result<SessionStats, Error> {
        self.flush()?;
        self.binding = None;
        Ok(self.stats)
    }
}

impl<B: GraphicsBackend + ?Sized> Drop for DrawSession<'_, B> {
    fn drop(&mut self) {
        if !self.instances.is_empty() {
            // Errors were already logged by `flush`.
            let _ = self.flush();
        }
    }
}

impl<B: GraphicsBackend + ?Sized> fmt::Debug for DrawSession<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawSession")
            .field("bound", &self.binding.map(|b| (b.font, b.cache)))
            .field("pending", &self.instances.len())
            .field("failed", &self.failed.is_some())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::GlyphCacheKey;
    use crate::tests::{glyph_with_bitmap, RecordingBackend};

    fn cache(id: u32) -> GlyphCache {
        GlyphCache::new(CacheId(id), GlyphCacheKey::with_size(10.0), 5, 1 << 16)
    }

    #[test]
    fn instance_layout_is_packed() {
        assert_eq!(size_of::<GlyphInstance>(), 32);
        let instances = [GlyphInstance::default(); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 96);
    }

    #[test]
    fn quad_uses_bearings() {
        let mut cache = cache(1);
        let glyph = cache.insert(glyph_with_bitmap(CacheId(1), 'a', 3, 4, 1, 7));
        let instance = GlyphInstance::new(glyph, 10.0, 20.0, [1, 2, 3, 4]).unwrap();
        assert_eq!(instance.pos, [11.0, 27.0, 14.0, 23.0]);
        assert_eq!(instance.glyph_size, [3, 4]);
        assert_eq!(instance.offset, 0);
    }

    #[test]
    fn full_batch_flushes_once() {
        let mut backend = RecordingBackend::default();
        let mut session = DrawSession::new(&mut backend, SessionOptions::default());
        let mut cache = cache(1);
        session.bind(FontId(1), &mut cache, &IDENTITY_MATRIX);
        for _ in 0..BATCH_LEN_MAX + 1 {
            assert!(session.add_instance(GlyphInstance::default()));
        }
        assert_eq!(session.stats().implicit_flushes, 1);
        assert_eq!(session.pending(), 1);
        let stats = session.finish().unwrap();
        assert_eq!(stats.flushes, 2);
        assert_eq!(stats.glyphs, BATCH_LEN_MAX + 1);
        assert_eq!(backend.batches.len(), 2);
        assert_eq!(backend.batches[0].instances.len(), BATCH_LEN_MAX);
    }

    #[test]
    fn rebinding_flushes() {
        let mut backend = RecordingBackend::default();
        let mut session = DrawSession::new(&mut backend, SessionOptions::default());
        let (mut a, mut b) = (cache(1), cache(2));
        session.bind(FontId(1), &mut a, &IDENTITY_MATRIX);
        session.add_instance(GlyphInstance::default());
        // Same binding: nothing happens.
        session.bind(FontId(1), &mut a, &IDENTITY_MATRIX);
        assert_eq!(session.pending(), 1);
        session.bind(FontId(1), &mut b, &IDENTITY_MATRIX);
        assert_eq!(session.pending(), 0);
        session.add_instance(GlyphInstance::default());
        let mut moved = IDENTITY_MATRIX;
        moved[12] = 5.0;
        session.bind(FontId(1), &mut b, &moved);
        assert_eq!(session.stats().implicit_flushes, 2);
        drop(session);
        assert_eq!(backend.batches.len(), 2);
        assert_eq!(backend.batches[1].cache, CacheId(2));
    }

    #[test]
    fn nothing_is_queued_without_binding() {
        let mut backend = RecordingBackend::default();
        let mut session = DrawSession::new(&mut backend, SessionOptions::default());
        assert!(!session.add_instance(GlyphInstance::default()));
        assert_eq!(session.pending(), 0);
    }

    #[test]
    fn failed_flush_is_not_retried() {
        let mut backend = RecordingBackend {
            fail_after: Some(0),
            ..RecordingBackend::default()
        };
        let mut session = DrawSession::new(&mut backend, SessionOptions::default());
        let mut cache = cache(1);
        session.bind(FontId(1), &mut cache, &IDENTITY_MATRIX);
        session.add_instance(GlyphInstance::default());
        assert!(session.flush().is_err());
        assert!(!session.add_instance(GlyphInstance::default()));
        assert!(session.finish().is_err());
        assert_eq!(backend.attempts, 1);
    }

    #[test]
    fn texture_grows_and_reuploads() {
        let mut backend = RecordingBackend::default();
        let options = SessionOptions {
            initial_texture_bytes: 8,
            ..SessionOptions::default()
        };
        let mut session = DrawSession::new(&mut backend, options);
        let mut cache = cache(1);
        cache.insert(glyph_with_bitmap(CacheId(1), 'a', 2, 3, 0, 3));
        session.bind(FontId(1), &mut cache, &IDENTITY_MATRIX);
        assert_eq!(cache.texture().map(|t| t.capacity()), Some(8));
        session.add_glyph(cache.find('a').unwrap(), 0.0, 0.0, [0; 4]);

        cache.insert(glyph_with_bitmap(CacheId(1), 'b', 3, 3, 0, 3));
        session.upload(FontId(1), &mut cache);
        assert_eq!(cache.texture().map(|t| t.capacity()), Some(16));
        // The queued 'a' went out with the old texture.
        assert_eq!(session.pending(), 0);
        assert_eq!(session.stats().textures_created, 2);
        assert_eq!(cache.staging().pending(), 15..15);
        drop(session);
        assert_eq!(backend.batches.len(), 1);
        let texture = backend.textures.last().unwrap();
        assert_eq!(texture.lock().len(), 16);
        assert_eq!(&texture.lock()[..15], cache.staging().bytes());
    }
}
