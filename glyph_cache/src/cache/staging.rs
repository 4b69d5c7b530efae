// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Staging buffer for glyph bitmaps awaiting texture upload.

use core::ops::Range;

/// Packed glyph bitmaps in the order they were rasterized.
///
/// Bytes `0..landed` have been written to the glyph texture; bytes
/// `landed..len` are pending. The byte offset of a bitmap here is also its
/// offset in the texture.
#[derive(Debug, Default)]
pub struct BitmapStaging {
    data: Vec<u8>,
    landed: usize,
    limit: usize,
}

impl BitmapStaging {
    /// Creates an empty buffer that refuses to grow past `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            landed: 0,
            limit,
        }
    }

    /// Appends one packed bitmap and returns its offset.
    ///
    /// Returns `None` and stages nothing if the buffer would grow past its
    /// limit.
    pub fn push(&mut self, rows: impl Iterator<Item = impl AsRef<[u8]>>, len: usize) -> Option<usize> {
        let offset = self.data.len();
        if offset.checked_add(len)? > self.limit {
            return None;
        }
        self.data.reserve(len);
        for row in rows {
            self.data.extend_from_slice(row.as_ref());
        }
        debug_assert_eq!(self.data.len(), offset + len, "row lengths must sum to len");
        Some(offset)
    }

    /// Total staged bytes, landed or not.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing was ever staged.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes already written to the texture.
    pub fn landed(&self) -> usize {
        self.landed
    }

    /// Bytes allocated for staging.
    pub fn allocated(&self) -> usize {
        self.data.capacity()
    }

    /// Maximum number of bytes this buffer accepts.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Byte range that still has to be uploaded.
    pub fn pending(&self) -> Range<usize> {
        self.landed..self.data.len()
    }

    /// All staged bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Records that everything staged so far reached the texture.
    pub fn mark_landed(&mut self) {
        self.landed = self.data.len();
    }

    /// Marks every byte as pending again, e.g. after the texture was
    /// replaced.
    pub fn reset_landed(&mut self) {
        self.landed = 0;
    }

    /// Drops all staged bytes.
    pub fn clear(&mut self) {
        self.data = Vec::new();
        self.landed = 0;
    }
}
