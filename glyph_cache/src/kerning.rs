// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily populated kerning table for ASCII pairs.

use core::fmt;

/// Number of characters per side covered by the kerning table.
pub const KERNING_TABLE_SIZE: usize = 128;

/// Table value marking a pair whose kerning has not been computed yet.
pub const KERNING_ENTRY_UNSET: i32 = i32::MAX;

/// Pair kerning for the first 128 characters of a font.
///
/// Values are stored unscaled (design units), so one table serves every
/// glyph cache of a font regardless of size. Pairs outside the table are
/// never cached.
pub struct KerningCache {
    table: Box<[i32]>,
}

impl KerningCache {
    /// Creates a table with every pair unset.
    pub fn new() -> Self {
        Self {
            table: vec![KERNING_ENTRY_UNSET; KERNING_TABLE_SIZE * KERNING_TABLE_SIZE]
                .into_boxed_slice(),
        }
    }

    fn slot(left: char, right: char) -> Option<usize> {
        let (l, r) = (left as usize, right as usize);
        (l < KERNING_TABLE_SIZE && r < KERNING_TABLE_SIZE).then_some(l * KERNING_TABLE_SIZE + r)
    }

    /// Kerning between `left` and `right`.
    ///
    /// For pairs inside the table, `compute` runs on the first lookup only
    /// and its result is stored. For any other pair `compute` runs every
    /// time and the table is left untouched.
    ///
    /// A computed value equal to [`KERNING_ENTRY_UNSET`] would be
    /// indistinguishable from an empty slot, so it is stored (and returned)
    /// as `KERNING_ENTRY_UNSET - 1`.
    pub fn get(&mut self, left: char, right: char, compute: impl FnOnce() -> i32) -> i32 {
        let Some(slot) = Self::slot(left, right) else {
            return compute();
        };
        let cached = self.table[slot];
        if cached != KERNING_ENTRY_UNSET {
            return cached;
        }
        let value = compute().min(KERNING_ENTRY_UNSET - 1);
        self.table[slot] = value;
        value
    }

    /// The stored value for a pair, without computing anything.
    pub fn cached(&self, left: char, right: char) -> Option<i32> {
        Self::slot(left, right)
            .map(|slot| self.table[slot])
            .filter(|v| *v != KERNING_ENTRY_UNSET)
    }

    /// Number of pairs that have been computed.
    pub fn populated(&self) -> usize {
        self.table
            .iter()
            .filter(|v| **v != KERNING_ENTRY_UNSET)
            .count()
    }

    /// Forgets every stored pair.
    pub fn clear(&mut self) {
        self.table.fill(KERNING_ENTRY_UNSET);
    }
}

impl Default for KerningCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KerningCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KerningCache")
            .field("populated", &self.populated())
            .finish_non_exhaustive()
    }
}
