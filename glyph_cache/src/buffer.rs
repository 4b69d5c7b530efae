// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing glyphs into caller-owned pixel buffers.

use core::fmt;

use crate::glyph::GlyphBitmap;

/// Pixel storage of a [`FontBuffer`], row 0 at the bottom.
pub enum BufferPixels<'a> {
    /// Linear float channels.
    Float(&'a mut [f32]),
    /// 8-bit channels.
    Byte(&'a mut [u8]),
}

/// A CPU target for [`Font::draw_buffer`](crate::Font::draw_buffer).
///
/// Colors are given pre-converted for both storage kinds; the buffer only
/// blends. Coverage is combined with the color alpha and blended over the
/// existing pixels; the alpha channel accumulates.
pub struct FontBuffer<'a> {
    pixels: BufferPixels<'a>,
    width: usize,
    height: usize,
    channels: usize,
    color_float: [f32; 4],
    color_byte: [u8; 4],
}

impl<'a> FontBuffer<'a> {
    /// Wraps `pixels` as a `width` × `height` image with `channels`
    /// interleaved channels.
    ///
    /// Returns `None` if `channels` is not in `1..=4` or `pixels` is too
    /// short.
    pub fn new(pixels: BufferPixels<'a>, width: usize, height: usize, channels: usize) -> Option<Self> {
        if !(1..=4).contains(&channels) {
            return None;
        }
        let needed = width.checked_mul(height)?.checked_mul(channels)?;
        let len = match &pixels {
            BufferPixels::Float(p) => p.len(),
            BufferPixels::Byte(p) => p.len(),
        };
        if len < needed {
            return None;
        }
        Some(Self {
            pixels,
            width,
            height,
            channels,
            color_float: [0.0, 0.0, 0.0, 1.0],
            color_byte: [0, 0, 0, 255],
        })
    }

    /// Sets the text color for float and byte storage.
    pub fn set_color(&mut self, float: [f32; 4], byte: [u8; 4]) {
        self.color_float = float;
        self.color_byte = byte;
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Blends `bitmap` with its top-left pixel at (`left`, `top`).
    ///
    /// Pixels outside the buffer are skipped. Returns `true` if any pixel
    /// landed inside.
    pub fn blit(&mut self, bitmap: &GlyphBitmap, left: i32, top: i32) -> bool {
        let mut touched = false;
        for (r, row) in bitmap.rows().enumerate() {
            let Some(y) = i64::from(top)
                .checked_sub(r as i64)
                .and_then(|y| usize::try_from(y).ok())
                .filter(|y| *y < self.height)
            else {
                continue;
            };
            for (c, &coverage) in row.iter().enumerate() {
                if coverage == 0 {
                    continue;
                }
                let Some(x) = usize::try_from(i64::from(left) + c as i64)
                    .ok()
                    .filter(|x| *x < self.width)
                else {
                    continue;
                };
                touched = true;
                self.blend((y * self.width + x) * self.channels, coverage);
            }
        }
        touched
    }

    fn blend(&mut self, at: usize, coverage: u8) {
        let channels = self.channels;
        let color_channels = channels.min(3);
        let has_alpha = channels == 4;
        match &mut self.pixels {
            BufferPixels::Float(pixels) => {
                let a = f32::from(coverage) / 255.0 * self.color_float[3];
                if a <= 0.0 {
                    return;
                }
                let px = &mut pixels[at..at + channels];
                for (dst, src) in px[..color_channels].iter_mut().zip(self.color_float) {
                    *dst = src * a + *dst * (1.0 - a);
                }
                if has_alpha {
                    px[3] = (px[3] + a).min(1.0);
                }
            }
            BufferPixels::Byte(pixels) => {
                let a = f32::from(coverage) / 255.0 * f32::from(self.color_byte[3]) / 255.0;
                if a <= 0.0 {
                    return;
                }
                let px = &mut pixels[at..at + channels];
                for (dst, src) in px[..color_channels].iter_mut().zip(self.color_byte) {
                    *dst = to_byte(f32::from(src) * a + f32::from(*dst) * (1.0 - a));
                }
                if has_alpha {
                    px[3] = to_byte(f32::from(px[3]) + a * 255.0);
                }
            }
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is rounded and clamped to the u8 range first"
)]
fn to_byte(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

impl fmt::Debug for FontBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.pixels {
            BufferPixels::Float(_) => "float",
            BufferPixels::Byte(_) => "byte",
        };
        f.debug_struct("FontBuffer")
            .field("kind", &kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for BufferPixels<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(p) => f.debug_tuple("Float").field(&p.len()).finish(),
            Self::Byte(p) => f.debug_tuple("Byte").field(&p.len()).finish(),
        }
    }
}
