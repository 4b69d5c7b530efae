// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility types shared across tests.

mod backend;
mod engine;

use std::path::PathBuf;
use std::sync::Arc;

use glyph_cache::{Font, FontOptions, FontSource};

pub(crate) use backend::TestBackend;
pub(crate) use engine::{BoxEngine, BoxLoader, Counters};

/// A font backed by `engine`, loaded with `options`.
pub(crate) fn font_with(engine: BoxEngine, options: &FontOptions) -> Arc<Font> {
    Arc::new(Font::new(
        FontSource::memory("box.ttf", Vec::new()),
        Box::new(engine),
        options,
    ))
}

/// A font backed by `engine` at 10 pixels per em.
pub(crate) fn font(engine: BoxEngine) -> Arc<Font> {
    font_with(
        engine,
        &FontOptions {
            size: 10.0,
            ..FontOptions::default()
        },
    )
}

/// Path of a font in `assets/fonts`.
pub(crate) fn asset_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join("fonts")
        .join(name)
}
