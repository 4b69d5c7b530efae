// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A font engine that draws every glyph as a box.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glyph_cache::engine::{EngineLoader, FaceMetrics, FontEngine, RasterRequest, RasterizedGlyph};
use glyph_cache::{Error, FtPix, GlyphBitmap, GlyphBounds, Tag, VariationAxis};
use linebender_resource_handle::Blob;
use parking_lot::Mutex;

/// Shared counters, cloned into engines so tests can watch them after the
/// engine has been moved into a font.
#[derive(Clone, Debug, Default)]
pub(crate) struct Counters {
    pub(crate) rasterized: Arc<AtomicUsize>,
    pub(crate) dropped: Arc<AtomicUsize>,
    pub(crate) loaded: Arc<AtomicUsize>,
    pub(crate) last_axes: Arc<Mutex<Vec<(Tag, f32)>>>,
}

impl Counters {
    pub(crate) fn rasterized(&self) -> usize {
        self.rasterized.load(Ordering::SeqCst)
    }

    pub(crate) fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    pub(crate) fn loaded(&self) -> usize {
        self.loaded.load(Ordering::SeqCst)
    }
}

/// Every glyph advances 0.6 em and covers a 0.5 by 0.7 em box on the
/// baseline. Glyph indices are code points; whitespace is blank.
#[derive(Debug, Default)]
pub(crate) struct BoxEngine {
    counters: Counters,
    kerning: Vec<((u32, u32), i32)>,
    axes: Vec<VariationAxis>,
    delay: Option<Duration>,
}

impl BoxEngine {
    pub(crate) fn new(counters: &Counters) -> Self {
        Self {
            counters: counters.clone(),
            kerning: Vec::new(),
            axes: Vec::new(),
            delay: None,
        }
    }

    pub(crate) fn with_kerning(mut self, left: char, right: char, units: i32) -> Self {
        self.kerning.push(((left as u32, right as u32), units));
        self
    }

    pub(crate) fn with_axis(mut self, tag: Tag, min: f32, default: f32, max: f32) -> Self {
        self.axes.push(VariationAxis {
            tag,
            min,
            default,
            max,
        });
        self
    }

    /// Sleeps in every rasterization, to widen race windows.
    pub(crate) fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl FontEngine for BoxEngine {
    fn glyph_index(&self, c: char) -> u32 {
        c as u32
    }

    fn rasterize(&self, request: &RasterRequest<'_>) -> RasterizedGlyph {
        self.counters.rasterized.fetch_add(1, Ordering::SeqCst);
        *self.counters.last_axes.lock() = request.axes.to_vec();
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let advance_x = self.advance(request);
        if char::from_u32(request.glyph).is_none_or(char::is_whitespace) {
            return RasterizedGlyph::blank(advance_x);
        }
        let w = (0.5 * request.size).ceil() as u32;
        let h = (0.7 * request.size).ceil() as u32;
        RasterizedGlyph {
            advance_x,
            bounds: GlyphBounds {
                x_min: FtPix::ZERO,
                x_max: FtPix::from_int(w as i32),
                y_min: FtPix::ZERO,
                y_max: FtPix::from_int(h as i32),
            },
            bearing_x: 0,
            bearing_y: h as i32,
            bitmap: GlyphBitmap::new(vec![0xff; (w * h) as usize], w, h, w),
            ..RasterizedGlyph::default()
        }
    }

    fn advance(&self, request: &RasterRequest<'_>) -> FtPix {
        FtPix::from_float(0.6 * request.size)
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
        self.kerning
            .iter()
            .find(|(pair, _)| *pair == (left, right))
            .map_or(0, |(_, units)| *units)
    }

    fn variation_axes(&self) -> Vec<VariationAxis> {
        self.axes.clone()
    }
}

impl Drop for BoxEngine {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Loads [`BoxEngine`]s. Data starting with `bad` is rejected.
#[derive(Debug, Default)]
pub(crate) struct BoxLoader {
    pub(crate) counters: Counters,
}

impl EngineLoader for BoxLoader {
    fn load(&self, data: Blob<u8>, _index: u32, name: &str) -> Result<Box<dyn FontEngine>, Error> {
        if data.data().starts_with(b"bad") {
            return Err(Error::invalid_font(name));
        }
        self.counters.loaded.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(BoxEngine::new(&self.counters)))
    }
}
