// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A graphics backend that records what it is asked to draw.

use std::sync::Arc;

use glyph_cache::{
    Batch, CacheId, Error, FontId, GlyphInstance, GlyphTexture, GraphicsBackend, TextureId,
};
use parking_lot::Mutex;

#[derive(Debug)]
pub(crate) struct DrawnBatch {
    pub(crate) font: FontId,
    pub(crate) cache: CacheId,
    pub(crate) texture: TextureId,
    pub(crate) matrix: [f32; 16],
    pub(crate) instances: Vec<GlyphInstance>,
}

#[derive(Debug)]
struct SharedTexture {
    id: TextureId,
    data: Arc<Mutex<Vec<u8>>>,
}

impl GlyphTexture for SharedTexture {
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

/// Records batches and keeps a handle on every texture it creates.
///
/// A texture is still owned by a glyph cache while its strong count is
/// above one.
#[derive(Debug, Default)]
pub(crate) struct TestBackend {
    pub(crate) batches: Vec<DrawnBatch>,
    pub(crate) textures: Vec<Arc<Mutex<Vec<u8>>>>,
    /// Fail every draw once this many batches were accepted.
    pub(crate) fail_after: Option<usize>,
}

impl TestBackend {
    pub(crate) fn failing_after(batches: usize) -> Self {
        Self {
            fail_after: Some(batches),
            ..Self::default()
        }
    }

    /// Textures still held by some glyph cache.
    pub(crate) fn live_textures(&self) -> usize {
        self.textures
            .iter()
            .filter(|t| Arc::strong_count(t) > 1)
            .count()
    }
}

impl GraphicsBackend for TestBackend {
    fn create_texture(&mut self, capacity: usize) -> Box<dyn GlyphTexture> {
        let data = Arc::new(Mutex::new(vec![0; capacity]));
        self.textures.push(data.clone());
        Box::new(SharedTexture {
            id: TextureId(self.textures.len() as u64),
            data,
        })
    }

    fn draw(&mut self, batch: &Batch<'_>) -> Result<(), Error> {
        if self.fail_after.is_some_and(|n| self.batches.len() >= n) {
            return Err(Error::backend("out of vertex memory"));
        }
        self.batches.push(DrawnBatch {
            font: batch.font,
            cache: batch.cache,
            texture: batch.texture,
            matrix: *batch.matrix,
            instances: batch.instances.to_vec(),
        });
        Ok(())
    }
}
