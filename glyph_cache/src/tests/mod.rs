// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::batch::{Batch, GlyphInstance, GlyphTexture, GraphicsBackend, TextureId};
use crate::cache::CacheId;
use crate::engine::{FaceMetrics, FontEngine, RasterRequest, RasterizedGlyph};
use crate::font::{Font, FontId, FontOptions};
use crate::glyph::{Glyph, GlyphBitmap, GlyphBounds};
use crate::source::FontSource;
use crate::{Error, FtPix, Tag};

#[expect(
    clippy::cast_possible_truncation,
    reason = "test sizes are small and positive"
)]
fn px(v: f32) -> u32 {
    v.ceil() as u32
}

fn solid_bitmap(width: u32, height: u32, value: u8) -> Option<GlyphBitmap> {
    GlyphBitmap::new(vec![value; (width * height) as usize], width, height, width)
}

/// A face where every glyph advances 0.55 em and draws a solid box of
/// 0.5 em by 0.7 em sitting on the baseline.
///
/// Glyph indices are code points. Whitespace has no bitmap.
#[derive(Debug, Default)]
pub(crate) struct MockEngine {
    kerning: HashMap<(u32, u32), i32>,
    pub(crate) raster_calls: Arc<AtomicUsize>,
}

impl MockEngine {
    pub(crate) fn with_kerning(mut self, left: char, right: char, units: i32) -> Self {
        self.kerning.insert((left as u32, right as u32), units);
        self
    }
}

impl FontEngine for MockEngine {
    fn glyph_index(&self, c: char) -> u32 {
        c as u32
    }

    fn rasterize(&self, request: &RasterRequest<'_>) -> RasterizedGlyph {
        self.raster_calls.fetch_add(1, Ordering::Relaxed);
        let advance_x = self.advance(request);
        let blank = char::from_u32(request.glyph).is_none_or(char::is_whitespace);
        if blank {
            return RasterizedGlyph::blank(advance_x);
        }
        let (w, h) = (px(0.5 * request.size), px(0.7 * request.size));
        let (wi, hi) = (w as i32, h as i32);
        RasterizedGlyph {
            advance_x,
            lsb_delta: FtPix::ZERO,
            rsb_delta: FtPix::ZERO,
            bounds: GlyphBounds {
                x_min: FtPix::ZERO,
                x_max: FtPix::from_int(wi),
                y_min: FtPix::ZERO,
                y_max: FtPix::from_int(hi),
            },
            bearing_x: 0,
            bearing_y: hi,
            bitmap: solid_bitmap(w, h, 255),
        }
    }

    fn advance(&self, request: &RasterRequest<'_>) -> FtPix {
        FtPix::from_float(0.55 * request.size)
    }

    fn metrics(&self, size: f32, _axes: &[(Tag, f32)]) -> FaceMetrics {
        FaceMetrics {
            ascender: FtPix::from_float(0.8 * size),
            descender: FtPix::from_float(-0.2 * size),
            line_height: FtPix::from_float(1.2 * size),
        }
    }

    fn units_per_em(&self) -> u16 {
        1000
    }

    fn has_kerning(&self) -> bool {
        !self.kerning.is_empty()
    }

    fn kerning(&self, left: u32, right: u32) -> i32 {
        self.kerning.get(&(left, right)).copied().unwrap_or(0)
    }
}

pub(crate) fn mock_font(engine: MockEngine) -> Font {
    Font::new(
        FontSource::memory("mock.ttf", Vec::new()),
        Box::new(engine),
        &FontOptions::default(),
    )
}

/// A glyph with a `width` × `height` bitmap filled with the character's
/// low byte.
pub(crate) fn glyph_with_bitmap(
    cache: CacheId,
    c: char,
    width: u32,
    height: u32,
    bearing_x: i32,
    bearing_y: i32,
) -> Glyph {
    let raster = RasterizedGlyph {
        advance_x: FtPix::from_int(width as i32),
        bearing_x,
        bearing_y,
        bitmap: solid_bitmap(width, height, u8::try_from(c).unwrap_or(0xff)),
        ..RasterizedGlyph::default()
    };
    Glyph::from_raster(c, c as u32, raster, cache)
}

#[derive(Debug)]
pub(crate) struct RecordedBatch {
    pub(crate) font: FontId,
    pub(crate) cache: CacheId,
    pub(crate) texture: TextureId,
    pub(crate) matrix: [f32; 16],
    pub(crate) instances: Vec<GlyphInstance>,
}

#[derive(Debug)]
struct RecordingTexture {
    id: TextureId,
    data: Arc<Mutex<Vec<u8>>>,
}

impl GlyphTexture for RecordingTexture {
    fn id(&self) -> TextureId {
        self.id
    }

    fn capacity(&self) -> usize {
        self.data.lock().len()
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.data.lock()[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

/// Keeps every batch and texture it is given.
///
/// With `fail_after: Some(n)`, every draw after the first `n` fails.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub(crate) batches: Vec<RecordedBatch>,
    pub(crate) textures: Vec<Arc<Mutex<Vec<u8>>>>,
    pub(crate) fail_after: Option<usize>,
    pub(crate) attempts: usize,
}

impl GraphicsBackend for RecordingBackend {
    fn create_texture(&mut self, capacity: usize) -> Box<dyn GlyphTexture> {
        let data = Arc::new(Mutex::new(vec![0; capacity]));
        self.textures.push(data.clone());
        Box::new(RecordingTexture {
            id: TextureId(self.textures.len() as u64),
            data,
        })
    }

    fn draw(&mut self, batch: &Batch<'_>) -> Result<(), Error> {
        self.attempts += 1;
        if self.fail_after.is_some_and(|n| self.batches.len() >= n) {
            return Err(Error::backend("device lost"));
        }
        self.batches.push(RecordedBatch {
            font: batch.font,
            cache: batch.cache,
            texture: batch.texture,
            matrix: *batch.matrix,
            instances: batch.instances.to_vec(),
        });
        Ok(())
    }
}
