// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pen placement, measurement, wrapping and drawing.

use core::ops::Range;

use unicode_width::UnicodeWidthChar;

use super::{Font, FontFlags, FontSettings, GlyphCacheGuard};
use crate::batch::{DrawSession, GlyphInstance, GraphicsBackend};
use crate::buffer::FontBuffer;
use crate::glyph::GlyphBounds;
use crate::FtPix;

/// One glyph placed on a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphStep {
    /// The character.
    pub c: char,
    /// Its glyph index.
    pub index: u32,
    /// Byte offset of the character in the laid out text.
    pub byte: usize,
    /// Pen position the glyph is drawn at, after kerning.
    pub pen_x: FtPix,
    /// Pen position after the glyph.
    pub next_x: FtPix,
}

/// Horizontal pen state along one line.
struct Pen {
    x: FtPix,
    prev: Option<(char, u32, FtPix)>,
    kerning: bool,
    monospaced: bool,
}

impl Pen {
    fn new(font: &Font, settings: &FontSettings) -> Self {
        let monospaced = settings.monospaced();
        Self {
            x: FtPix::ZERO,
            prev: None,
            kerning: font.has_kerning()
                && !monospaced
                && !settings.flags.contains(FontFlags::NO_KERNING),
            monospaced,
        }
    }

    fn advance(&mut self, guard: &mut GlyphCacheGuard<'_>, c: char, byte: usize) -> GlyphStep {
        let glyph = guard.glyph(c);
        let (index, advance_x, lsb_delta, rsb_delta) =
            (glyph.index, glyph.advance_x, glyph.lsb_delta, glyph.rsb_delta);
        let (pen_x, next_x) = if self.monospaced {
            let columns = c.width().unwrap_or(1).max(1);
            let columns = i32::try_from(columns).unwrap_or(1);
            let step = FtPix::from_int(columns.saturating_mul(guard.fixed_width()));
            (self.x, self.x + step)
        } else {
            let mut adjust = lsb_delta - self.prev.map_or(FtPix::ZERO, |(_, _, rsb)| rsb);
            if self.kerning {
                if let Some((prev_c, prev_index, _)) = self.prev {
                    adjust += guard.kerning(prev_c, prev_index, c, index);
                }
            }
            let pen_x = self.x + adjust;
            (pen_x, pen_x.round_advance(advance_x))
        };
        self.x = next_x;
        self.prev = Some((c, index, rsb_delta));
        GlyphStep {
            c,
            index,
            byte,
            pen_x,
            next_x,
        }
    }
}

/// Vertical offset of line `n`, lines running downwards.
fn line_offset(n: usize, line_height: FtPix) -> FtPix {
    let n = i32::try_from(n).unwrap_or(i32::MAX);
    FtPix::from_raw(line_height.raw().saturating_mul(n).saturating_neg())
}

impl Font {
    fn line_height(&self, guard: &GlyphCacheGuard<'_>) -> FtPix {
        let key = *guard.key();
        let height = self.engine.metrics(key.size, &self.axis_values(&key)).line_height;
        height.ceil()
    }

    fn layout_line(
        &self,
        guard: &mut GlyphCacheGuard<'_>,
        settings: &FontSettings,
        text: &str,
        base: usize,
    ) -> Vec<GlyphStep> {
        let mut pen = Pen::new(self, settings);
        text.char_indices()
            .map(|(offset, c)| pen.advance(guard, c, base + offset))
            .collect()
    }

    fn wrap_lines(
        &self,
        guard: &mut GlyphCacheGuard<'_>,
        settings: &FontSettings,
        text: &str,
    ) -> Vec<Range<usize>> {
        if !settings.flags.contains(FontFlags::WORD_WRAP) || settings.wrap_width <= 0 {
            return vec![0..text.len()];
        }
        let limit = settings.wrap_width;
        let mut lines = Vec::new();
        let mut start = 0;
        let mut i = 0;
        let mut pen = Pen::new(self, settings);
        let mut last_space = None;
        while let Some(c) = text[i..].chars().next() {
            if c == '\n' {
                lines.push(start..i);
                i += 1;
                start = i;
                pen = Pen::new(self, settings);
                last_space = None;
                continue;
            }
            let step = pen.advance(guard, c, i);
            if step.next_x.to_int() > limit && i > start {
                if c == ' ' {
                    lines.push(start..i);
                    i += 1;
                } else if let Some(space) = last_space {
                    lines.push(start..space);
                    i = space + 1;
                } else {
                    lines.push(start..i);
                }
                start = i;
                pen = Pen::new(self, settings);
                last_space = None;
                continue;
            }
            if c == ' ' {
                last_space = Some(i);
            }
            i += c.len_utf8();
        }
        lines.push(start..text.len());
        lines
    }

    /// Places the glyphs of `text` on a single line with the current
    /// settings, ignoring word wrap.
    pub fn layout(&self, text: &str) -> Vec<GlyphStep> {
        let settings = self.settings();
        let mut guard = self.acquire_glyph_cache(settings.cache_key());
        self.layout_line(&mut guard, &settings, text, 0)
    }

    /// Splits `text` into lines with the current settings.
    ///
    /// Without [`FontFlags::WORD_WRAP`] or a positive wrap width the whole
    /// text is one line. Otherwise lines break at `'\n'` and before the
    /// glyph that would cross the wrap width: at that glyph if it is a
    /// space, else at the last space of the line, else right there.
    /// Spaces at a break are dropped.
    pub fn wrap(&self, text: &str) -> Vec<Range<usize>> {
        let settings = self.settings();
        let mut guard = self.acquire_glyph_cache(settings.cache_key());
        self.wrap_lines(&mut guard, &settings, text)
    }

    /// Pen advance of `text` on one line, in pixels.
    pub fn advance_width(&self, text: &str) -> f32 {
        self.layout(text)
            .last()
            .map_or(0.0, |step| step.next_x.to_float())
    }

    /// Box covering every glyph and advance of `text`, relative to the
    /// origin of the first line.
    pub fn bounds(&self, text: &str) -> GlyphBounds {
        let settings = self.settings();
        let mut guard = self.acquire_glyph_cache(settings.cache_key());
        let line_height = self.line_height(&guard);
        let mut bounds: Option<GlyphBounds> = None;
        for (n, line) in self.wrap_lines(&mut guard, &settings, text).into_iter().enumerate() {
            let y = line_offset(n, line_height);
            let steps = self.layout_line(&mut guard, &settings, &text[line.clone()], line.start);
            for step in steps {
                let Some(glyph) = guard.find(step.c) else {
                    continue;
                };
                let glyph_box = GlyphBounds {
                    x_min: step.pen_x.min(step.pen_x + glyph.bounds.x_min),
                    x_max: step.next_x.max(step.pen_x + glyph.bounds.x_max),
                    y_min: y + glyph.bounds.y_min,
                    y_max: y + glyph.bounds.y_max,
                };
                bounds = Some(match bounds {
                    None => glyph_box,
                    Some(b) => GlyphBounds {
                        x_min: b.x_min.min(glyph_box.x_min),
                        x_max: b.x_max.max(glyph_box.x_max),
                        y_min: b.y_min.min(glyph_box.y_min),
                        y_max: b.y_max.max(glyph_box.y_max),
                    },
                });
            }
        }
        bounds.unwrap_or_default()
    }

    /// Width of [`bounds`](Self::bounds) in pixels, scaled by the aspect
    /// with [`FontFlags::ASPECT`].
    pub fn width(&self, text: &str) -> f32 {
        let b = self.bounds(text);
        let settings = self.settings();
        let scale = if settings.flags.contains(FontFlags::ASPECT) {
            settings.aspect[0]
        } else {
            1.0
        };
        (b.x_max - b.x_min).to_float() * scale
    }

    /// Height of [`bounds`](Self::bounds) in pixels, scaled by the aspect
    /// with [`FontFlags::ASPECT`].
    pub fn height(&self, text: &str) -> f32 {
        let b = self.bounds(text);
        let settings = self.settings();
        let scale = if settings.flags.contains(FontFlags::ASPECT) {
            settings.aspect[1]
        } else {
            1.0
        };
        (b.y_max - b.y_min).to_float() * scale
    }

    /// Column width of the current glyph cache, in pixels.
    pub fn fixed_width(&self) -> i32 {
        self.current_glyph_cache().fixed_width()
    }

    /// Queues `text` on `session` with the current settings.
    ///
    /// Every glyph is rasterized before the cache is bound, so the texture
    /// is uploaded once. Returns the number of glyphs queued, not counting
    /// shadows.
    pub fn draw<B: GraphicsBackend + ?Sized>(&self, session: &mut DrawSession<'_, B>, text: &str) -> usize {
        let settings = self.settings();
        let mut guard = self.acquire_glyph_cache(settings.cache_key());
        for c in text.chars() {
            guard.glyph(c);
        }
        let lines = self.wrap_lines(&mut guard, &settings, text);
        let line_height = self.line_height(&guard);
        let matrix = settings.model_matrix();
        session.bind(self.id, &mut guard, &matrix);

        let [pos_x, pos_y, _] = settings.position.map(|v| v as f32);
        let clipping = settings.flags.contains(FontFlags::CLIPPING);
        let shadow = settings.flags.contains(FontFlags::SHADOW);
        let [shadow_x, shadow_y] = settings.shadow.offset.map(|v| v as f32);
        let mut queued = 0;
        for (n, line) in lines.into_iter().enumerate() {
            let y = line_offset(n, line_height).to_int() as f32;
            let mut pen = Pen::new(self, &settings);
            for (offset, c) in text[line.clone()].char_indices() {
                let step = pen.advance(&mut guard, c, line.start + offset);
                let Some(glyph) = guard.find(c) else {
                    continue;
                };
                if glyph.is_blank() {
                    continue;
                }
                let x = step.pen_x.to_int_floor() as f32;
                if clipping {
                    let [x1, y1, x2, y2] = GlyphInstance::quad(glyph, x, y);
                    let placed = [x1 + pos_x, y1 + pos_y, x2 + pos_x, y2 + pos_y];
                    if !settings.clip.contains_quad(placed) {
                        continue;
                    }
                }
                if shadow {
                    session.add_glyph(glyph, x + shadow_x, y + shadow_y, settings.shadow.color);
                }
                if session.add_glyph(glyph, x, y, settings.color) {
                    queued += 1;
                }
            }
        }
        if !guard.staging().pending().is_empty() {
            session.upload(self.id, &mut guard);
        }
        queued
    }

    /// Composites `text` into a CPU buffer with the current settings.
    ///
    /// The text origin is the font position; the buffer's y axis points
    /// up. Returns the number of glyphs drawn.
    pub fn draw_buffer(&self, buffer: &mut FontBuffer<'_>, text: &str) -> usize {
        let settings = self.settings();
        let mut guard = self.acquire_glyph_cache(settings.cache_key());
        let lines = self.wrap_lines(&mut guard, &settings, text);
        let line_height = self.line_height(&guard);
        let [pos_x, pos_y, _] = settings.position;
        let mut drawn = 0;
        for (n, line) in lines.into_iter().enumerate() {
            let y = pos_y + line_offset(n, line_height).to_int();
            let mut pen = Pen::new(self, &settings);
            for (offset, c) in text[line.clone()].char_indices() {
                let step = pen.advance(&mut guard, c, line.start + offset);
                let Some(glyph) = guard.find(c) else {
                    continue;
                };
                let Some(bitmap) = glyph.bitmap() else {
                    continue;
                };
                let left = pos_x + step.pen_x.to_int_floor() + glyph.bearing_x;
                let top = y + glyph.bearing_y - 1;
                if buffer.blit(bitmap, left, top) {
                    drawn += 1;
                }
            }
        }
        drawn
    }
}
