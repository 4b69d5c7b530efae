// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// A 4-byte OpenType tag, as used to identify variation axes and SFNT tables.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct Tag(u32);

impl Tag {
    /// Weight axis.
    pub const WEIGHT: Self = Self::from_bytes(*b"wght");
    /// Slant axis.
    pub const SLANT: Self = Self::from_bytes(*b"slnt");
    /// Width axis.
    pub const WIDTH: Self = Self::from_bytes(*b"wdth");
    /// Spacing axis.
    pub const SPACING: Self = Self::from_bytes(*b"spac");
    /// Optical size axis.
    pub const OPTICAL_SIZE: Self = Self::from_bytes(*b"opsz");

    /// Creates a tag from 4 bytes.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Creates a tag from its packed big-endian representation.
    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    /// Returns this tag as 4 bytes.
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Returns the packed big-endian representation.
    pub const fn to_u32(self) -> u32 {
        self.0
    }
}
