// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `glyph_cache`.
//!
//! - The `util` module holds the test font engine and graphics backend
//!   shared by every test module.
//! - Tests against a real face use the fonts in `assets/fonts`.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests, so shared utilities are compiled once.
//! - For test naming, put the "topic" of the test at the start of the name, for example
//!   `library_reuses_live_fonts` rather than `reuses_live_fonts_in_library`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod util;
