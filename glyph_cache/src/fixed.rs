// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-point sub-pixel coordinates.
//!
//! Glyph metrics are kept in 26.6 fixed point: one unit is 1/64th of a pixel.
//! All scaling and rounding goes through [`FtPix`] so that the conventions
//! stay in one place.
//!
//! Note that the default pixel conversion ([`FtPix::to_int`]) and pen
//! advancement ([`FtPix::round_advance`]) use *floor* rounding rather than
//! round-to-nearest. Switching to nearest rounding produces visibly wider
//! text, so the floor convention is kept for compatibility.

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of fixed-point units per pixel.
pub const UNITS_PER_PIXEL: i32 = 64;

const FRACTION_MASK: i32 = UNITS_PER_PIXEL - 1;

/// A coordinate in 1/64th pixel units.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct FtPix(pub i32);

impl FtPix {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates a value from raw 26.6 units.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw 26.6 units.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Exact conversion from whole pixels.
    #[inline]
    pub const fn from_int(v: i32) -> Self {
        Self(v.saturating_mul(UNITS_PER_PIXEL))
    }

    /// Conversion from fractional pixels, rounded to the nearest unit
    /// (halfway cases away from zero).
    #[inline]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float to int casts saturate, which is the intended behavior"
    )]
    pub fn from_float(v: f32) -> Self {
        Self((v * UNITS_PER_PIXEL as f32).round() as i32)
    }

    /// Conversion to whole pixels using the default (legacy floor) rounding.
    #[inline]
    pub const fn to_int(self) -> i32 {
        self.0 >> 6
    }

    /// Conversion to whole pixels, rounding down.
    #[inline]
    pub const fn to_int_floor(self) -> i32 {
        // The fractional bits are discarded by the arithmetic shift.
        self.0 >> 6
    }

    /// Conversion to whole pixels, rounding up.
    #[inline]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the shifted sum is at most i32::MAX / 64 + 1"
    )]
    pub const fn to_int_ceil(self) -> i32 {
        ((self.0 as i64 + FRACTION_MASK as i64) >> 6) as i32
    }

    /// Conversion to fractional pixels.
    #[inline]
    pub fn to_float(self) -> f32 {
        self.0 as f32 / UNITS_PER_PIXEL as f32
    }

    /// Rounds down to a whole pixel, staying in fixed point.
    #[inline]
    pub const fn floor(self) -> Self {
        Self(self.0 & !FRACTION_MASK)
    }

    /// Rounds to the nearest whole pixel, staying in fixed point.
    #[inline]
    pub const fn round(self) -> Self {
        Self(self.0.saturating_add(UNITS_PER_PIXEL / 2) & !FRACTION_MASK)
    }

    /// Rounds up to a whole pixel, staying in fixed point.
    #[inline]
    pub const fn ceil(self) -> Self {
        Self(self.0.saturating_add(FRACTION_MASK) & !FRACTION_MASK)
    }

    /// Advances a pen position by `step`.
    ///
    /// Both operands are floored before summing so that rounding error does
    /// not accumulate over a run of glyphs.
    #[inline]
    pub const fn round_advance(self, step: Self) -> Self {
        Self(self.floor().0.saturating_add(step.floor().0))
    }

    /// Returns `true` if this value lies exactly on a pixel boundary.
    #[inline]
    pub const fn is_whole(self) -> bool {
        self.0 & FRACTION_MASK == 0
    }
}

impl fmt::Debug for FtPix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FtPix({} = {}px)", self.0, self.to_float())
    }
}

impl Add for FtPix {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for FtPix {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for FtPix {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for FtPix {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for FtPix {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}
