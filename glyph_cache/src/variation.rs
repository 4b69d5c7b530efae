// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Variable font axes and the per-font variation state.

use smallvec::SmallVec;

use crate::Tag;

/// Maximum number of variation axes tracked per font.
pub const MAX_VARIATION_AXES: usize = 16;

/// Design-space values for a set of axes, ready to hand to a font engine.
pub type AxisValues = SmallVec<[(Tag, f32); 4]>;

/// Metadata for one axis of a variable font.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariationAxis {
    /// Axis identifier.
    pub tag: Tag,
    /// Minimum design-space value.
    pub min: f32,
    /// Default design-space value.
    pub default: f32,
    /// Maximum design-space value.
    pub max: f32,
}

impl VariationAxis {
    /// Maps a user value in `[-1, +1]` to design space.
    ///
    /// `0` maps to the default, `-1` to the minimum and `+1` to the maximum.
    /// The two halves are scaled independently, so the default does not need
    /// to sit in the middle of the range.
    pub fn value_at(&self, t: f32) -> f32 {
        let t = t.clamp(-1.0, 1.0);
        if t >= 0.0 {
            self.default + t * (self.max - self.default)
        } else {
            self.default + t * (self.default - self.min)
        }
    }

    /// Clamps a design-space value into this axis' range.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min.min(self.max), self.max.max(self.min))
    }
}

/// User-facing variation state of a font.
///
/// Each field is a normalized value in `[-1, +1]` where `0` selects the
/// font's default for that axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Variations {
    /// Weight (`wght`).
    pub weight: f32,
    /// Slant (`slnt`).
    pub slant: f32,
    /// Width (`wdth`).
    pub width: f32,
    /// Spacing (`spac`).
    pub spacing: f32,
}

impl Variations {
    /// Creates a state with every axis at its default.
    pub const fn new() -> Self {
        Self {
            weight: 0.0,
            slant: 0.0,
            width: 0.0,
            spacing: 0.0,
        }
    }

    /// Returns a copy with every value clamped to `[-1, +1]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            weight: self.weight.clamp(-1.0, 1.0),
            slant: self.slant.clamp(-1.0, 1.0),
            width: self.width.clamp(-1.0, 1.0),
            spacing: self.spacing.clamp(-1.0, 1.0),
        }
    }

    /// Resolves this state against the axes a font actually has.
    ///
    /// Axes at their default (`0`) are omitted. If the font has an optical
    /// size axis it follows `size`.
    pub fn resolve(&self, axes: &[VariationAxis], size: f32) -> AxisValues {
        let mut values = AxisValues::new();
        for axis in axes.iter().take(MAX_VARIATION_AXES) {
            let user = match axis.tag {
                Tag::WEIGHT => self.weight,
                Tag::SLANT => self.slant,
                Tag::WIDTH => self.width,
                Tag::SPACING => self.spacing,
                Tag::OPTICAL_SIZE => {
                    values.push((axis.tag, axis.clamp(size)));
                    continue;
                }
                _ => continue,
            };
            if user != 0.0 {
                values.push((axis.tag, axis.value_at(user)));
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEIGHT: VariationAxis = VariationAxis {
        tag: Tag::WEIGHT,
        min: 100.0,
        default: 400.0,
        max: 900.0,
    };

    #[test]
    fn value_at_scales_each_half_separately() {
        assert_eq!(WEIGHT.value_at(0.0), 400.0);
        assert_eq!(WEIGHT.value_at(1.0), 900.0);
        assert_eq!(WEIGHT.value_at(-1.0), 100.0);
        assert_eq!(WEIGHT.value_at(0.5), 650.0);
        assert_eq!(WEIGHT.value_at(-0.5), 250.0);
        assert_eq!(WEIGHT.value_at(3.0), 900.0);
    }

    #[test]
    fn resolve_skips_defaults_and_unknown_axes() {
        let axes = [
            WEIGHT,
            VariationAxis {
                tag: Tag::from_bytes(*b"GRAD"),
                min: -1.0,
                default: 0.0,
                max: 1.0,
            },
            VariationAxis {
                tag: Tag::WIDTH,
                min: 75.0,
                default: 100.0,
                max: 125.0,
            },
        ];
        let state = Variations {
            weight: 1.0,
            ..Variations::new()
        };
        let values = state.resolve(&axes, 12.0);
        assert_eq!(values.as_slice(), &[(Tag::WEIGHT, 900.0)]);
    }

    #[test]
    fn optical_size_follows_font_size() {
        let axes = [VariationAxis {
            tag: Tag::OPTICAL_SIZE,
            min: 8.0,
            default: 14.0,
            max: 72.0,
        }];
        let values = Variations::new().resolve(&axes, 100.0);
        assert_eq!(values.as_slice(), &[(Tag::OPTICAL_SIZE, 72.0)]);
        let values = Variations::new().resolve(&axes, 11.0);
        assert_eq!(values.as_slice(), &[(Tag::OPTICAL_SIZE, 11.0)]);
    }
}
