// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// The four `ulUnicodeRange` words of a face's `OS/2` table.
///
/// Each bit flags a Unicode block the font considers functional. See
/// [Unicode Range](https://learn.microsoft.com/en-us/typography/opentype/spec/os2#ur).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnicodeRanges(pub [u32; 4]);

impl UnicodeRanges {
    /// Returns `true` if range bit `bit` (0..128) is set.
    pub fn contains(&self, bit: u32) -> bool {
        let Some(word) = self.0.get((bit / 32) as usize) else {
            return false;
        };
        word & (1 << (bit % 32)) != 0
    }

    /// Returns `true` if no range bit is set.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|w| *w == 0)
    }
}
