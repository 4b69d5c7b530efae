// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`FontEngine`] backed by `swash`.

use core::fmt;

use linebender_resource_handle::Blob;
use parking_lot::Mutex;
use read_fonts::tables::kern::{Kern, Subtable, SubtableKind};
use read_fonts::types::GlyphId;
use read_fonts::TableProvider as _;
use smallvec::SmallVec;
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::{Angle, Format, Transform};
use swash::{CacheKey, FontRef, Setting};

use super::{
    EngineLoader, FaceMetrics, FontEngine, Hinting, RasterRequest, RasterizedGlyph, UnicodeRanges,
};
use crate::glyph::{GlyphBitmap, GlyphBounds};
use crate::{Error, FtPix, Tag, VariationAxis};

/// Horizontal shear applied for synthetic italics.
const ITALIC_SKEW_DEGREES: f32 = 12.0;

/// Outline growth for synthetic bold, in ems.
const BOLD_STRENGTH_EM: f32 = 1.0 / 24.0;

/// A face parsed by `swash`.
///
/// Glyphs are rasterized from outlines; embedded bitmaps and color glyphs
/// are not used. Kerning comes from the legacy `kern` table, read with
/// `read-fonts`.
pub struct SwashEngine {
    data: Blob<u8>,
    index: u32,
    offset: u32,
    key: CacheKey,
    units_per_em: u16,
    axes: Vec<VariationAxis>,
    has_kerning: bool,
    unicode_ranges: UnicodeRanges,
    contexts: Mutex<Vec<ScaleContext>>,
}

impl SwashEngine {
    /// Parses face `index` of `data`.
    pub fn new(data: Blob<u8>, index: u32) -> Option<Self> {
        let font = FontRef::from_index(data.data(), index as usize)?;
        let tables = read_fonts::FontRef::from_index(data.data(), index).ok()?;
        let (offset, key) = (font.offset, font.key);
        let units_per_em = font.metrics(&[]).units_per_em;
        let axes = font
            .variations()
            .map(|axis| VariationAxis {
                tag: Tag::from_u32(axis.tag()),
                min: axis.min_value(),
                default: axis.default_value(),
                max: axis.max_value(),
            })
            .collect();
        let has_kerning = tables
            .kern()
            .is_ok_and(|kern| usable_subtables(&kern).next().is_some());
        let unicode_ranges = tables
            .os2()
            .map(|os2| {
                UnicodeRanges([
                    os2.ul_unicode_range_1(),
                    os2.ul_unicode_range_2(),
                    os2.ul_unicode_range_3(),
                    os2.ul_unicode_range_4(),
                ])
            })
            .unwrap_or_default();
        Some(Self {
            data,
            index,
            offset,
            key,
            units_per_em,
            axes,
            has_kerning,
            unicode_ranges,
            contexts: Mutex::new(Vec::new()),
        })
    }

    fn font(&self) -> FontRef<'_> {
        FontRef {
            data: self.data.data(),
            offset: self.offset,
            key: self.key,
        }
    }

    /// Axis values as normalized coordinates, in font axis order.
    fn normalized_coords(&self, values: &[(Tag, f32)]) -> SmallVec<[i16; 4]> {
        self.font()
            .variations()
            .normalized_coords(Self::settings(values))
            .collect()
    }

    fn settings(values: &[(Tag, f32)]) -> SmallVec<[Setting<f32>; 4]> {
        values
            .iter()
            .map(|&(tag, value)| Setting {
                tag: tag.to_u32(),
                value,
            })
            .collect()
    }

    fn advance_px(&self, request: &RasterRequest<'_>, glyph: u16) -> f32 {
        let coords = self.normalized_coords(request.axes);
        let mut advance = self
            .font()
            .glyph_metrics(&coords)
            .scale(request.size)
            .advance_width(glyph);
        if request.bold {
            advance += request.size * BOLD_STRENGTH_EM;
        }
        if request.hinting == Hinting::Full {
            advance = advance.round();
        }
        advance
    }
}

/// Horizontal `kern` subtables holding pair values.
///
/// Cross-stream, minimum and state machine subtables are skipped.
fn usable_subtables<'a>(kern: &'a Kern<'a>) -> impl Iterator<Item = Subtable<'a>> + 'a {
    kern.subtables().filter_map(Result::ok).filter(|subtable| {
        let minimum = match subtable {
            Subtable::Ot(ot) => ot.coverage() & 0x2 != 0,
            Subtable::Aat(_) => false,
        };
        subtable.is_horizontal()
            && !subtable.is_cross_stream()
            && !subtable.is_variable()
            && !subtable.is_state_machine()
            && !minimum
    })
}

/// Sum of the pair values of every usable subtable.
fn pair_kerning(kern: &Kern<'_>, left: GlyphId, right: GlyphId) -> i32 {
    usable_subtables(kern)
        .filter_map(|subtable| match subtable.kind().ok()? {
            SubtableKind::Format0(pairs) => pairs.kerning(left, right),
            SubtableKind::Format2(classes) => classes.kerning(left, right),
            SubtableKind::Format3(classes) => classes.kerning(left, right),
            SubtableKind::Format1(_) => None,
        })
        .fold(0_i32, i32::saturating_add)
}

impl FontEngine for SwashEngine {
    fn glyph_index(&self, c: char) -> u32 {
        u32::from(self.font().charmap().map(c))
    }

    fn rasterize(&self, request: &RasterRequest<'_>) -> RasterizedGlyph {
        let Ok(glyph) = u16::try_from(request.glyph) else {
            return RasterizedGlyph::default();
        };
        let advance_x = FtPix::from_float(self.advance_px(request, glyph));
        let settings = Self::settings(request.axes);

        let mut context = self.contexts.lock().pop().unwrap_or_else(ScaleContext::new);
        let image = {
            let mut scaler = context
                .builder(self.font())
                .size(request.size)
                .hint(request.hinting != Hinting::None)
                .variations(settings.iter().copied())
                .build();
            let mut render = Render::new(&[Source::Outline]);
            render.format(Format::Alpha);
            if request.bold {
                render.embolden(request.size * BOLD_STRENGTH_EM);
            }
            if request.italic {
                render.transform(Some(Transform::skew(
                    Angle::from_degrees(ITALIC_SKEW_DEGREES),
                    Angle::from_degrees(0.0),
                )));
            }
            render.render(&mut scaler, glyph)
        };
        self.contexts.lock().push(context);

        let Some(mut image) = image else {
            log::warn!("swash could not render glyph {glyph}");
            return RasterizedGlyph::blank(advance_x);
        };
        let placement = image.placement;
        if request.monochrome {
            for v in &mut image.data {
                *v = if *v >= 128 { 255 } else { 0 };
            }
        }
        let bitmap = GlyphBitmap::new(image.data, placement.width, placement.height, placement.width);
        let (width, height) = (
            i32::try_from(placement.width).unwrap_or(i32::MAX),
            i32::try_from(placement.height).unwrap_or(i32::MAX),
        );
        RasterizedGlyph {
            advance_x,
            lsb_delta: FtPix::ZERO,
            rsb_delta: FtPix::ZERO,
            bounds: GlyphBounds {
                x_min: FtPix::from_int(placement.left),
                x_max: FtPix::from_int(placement.left.saturating_add(width)),
                y_min: FtPix::from_int(placement.top.saturating_sub(height)),
                y_max: FtPix::from_int(placement.top),
            },
            bearing_x: placement.left,
            bearing_y: placement.top,
            bitmap,
        }
    }

    fn advance(&self, request: &RasterRequest<'_>) -> FtPix {
        u16::try_from(request.glyph).map_or(FtPix::ZERO, |glyph| {
            FtPix::from_float(self.advance_px(request, glyph))
        })
    }

    fn metrics(&self, size: f32, axes: &[(Tag, f32)]) -> FaceMetrics {
        let coords = self.normalized_coords(axes);
        let metrics = self.font().metrics(&coords).scale(size);
        FaceMetrics {
            ascender: FtPix::from_float(metrics.ascent),
            descender: FtPix::from_float(-metrics.descent),
            line_height: FtPix::from_float(metrics.ascent + metrics.descent + metrics.leading),
        }
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn has_kerning(&self) -> bool {
        self.has_kerning
    }

    fn kerning(&self, left: u32, right: u32) -> i32 {
        if !self.has_kerning {
            return 0;
        }
        let Ok(tables) = read_fonts::FontRef::from_index(self.data.data(), self.index) else {
            return 0;
        };
        tables.kern().map_or(0, |kern| {
            pair_kerning(&kern, GlyphId::new(left), GlyphId::new(right))
        })
    }

    fn variation_axes(&self) -> Vec<VariationAxis> {
        self.axes.clone()
    }

    fn unicode_ranges(&self) -> UnicodeRanges {
        self.unicode_ranges
    }
}

impl fmt::Debug for SwashEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwashEngine")
            .field("len", &self.data.data().len())
            .field("index", &self.index)
            .field("units_per_em", &self.units_per_em)
            .field("axes", &self.axes.len())
            .field("has_kerning", &self.has_kerning)
            .finish_non_exhaustive()
    }
}

/// Loads fonts with [`SwashEngine`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SwashLoader;

impl EngineLoader for SwashLoader {
    fn load(&self, data: Blob<u8>, index: u32, name: &str) -> Result<Box<dyn FontEngine>, Error> {
        match SwashEngine::new(data, index) {
            Some(engine) => Ok(Box::new(engine)),
            None => Err(Error::invalid_font(name)),
        }
    }
}
