// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font data sources and a library that loads each source once.

use core::fmt;
use std::path::Path;
use std::sync::{Arc, Weak};

use hashbrown::HashMap;
use linebender_resource_handle::Blob;
use parking_lot::Mutex;

use crate::engine::EngineLoader;
use crate::font::{Font, FontOptions};
use crate::Error;

/// Where a font's data came from.
///
/// The data is shared; it is released when the last font and source
/// holding it are dropped.
#[derive(Clone)]
pub enum FontSource {
    /// Read from a file.
    Path {
        /// The file that was read.
        path: Arc<Path>,
        /// File name, for messages.
        name: Arc<str>,
        /// The file contents.
        data: Blob<u8>,
    },
    /// Supplied by the caller under a name.
    Memory {
        /// The name the buffer was registered under.
        name: Arc<str>,
        /// The buffer.
        data: Blob<u8>,
    },
}

impl FontSource {
    /// A named in-memory source.
    pub fn memory(name: &str, data: Vec<u8>) -> Self {
        Self::Memory {
            name: name.into(),
            data: Blob::new(Arc::new(data)),
        }
    }

    /// File name or buffer name.
    pub fn name(&self) -> &str {
        match self {
            Self::Path { name, .. } | Self::Memory { name, .. } => name,
        }
    }

    /// The file path, for file sources.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path { path, .. } => Some(path),
            Self::Memory { .. } => None,
        }
    }

    /// The font data.
    pub fn data(&self) -> &Blob<u8> {
        match self {
            Self::Path { data, .. } | Self::Memory { data, .. } => data,
        }
    }
}

impl fmt::Debug for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path { path, data, .. } => f
                .debug_struct("Path")
                .field("path", path)
                .field("len", &data.data().len())
                .finish_non_exhaustive(),
            Self::Memory { name, data } => f
                .debug_struct("Memory")
                .field("name", name)
                .field("len", &data.data().len())
                .finish(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum SourceKey {
    Path(Arc<Path>),
    Memory(Arc<str>),
}

/// Loads fonts, returning the already loaded font for a repeated path or
/// buffer name while it is alive.
///
/// The library only holds weak references; a font is unloaded when the
/// last `Arc<Font>` is dropped.
pub struct FontLibrary {
    loader: Arc<dyn EngineLoader>,
    options: FontOptions,
    fonts: Mutex<HashMap<SourceKey, Weak<Font>>>,
}

impl FontLibrary {
    /// Creates a library that loads fonts with `loader`.
    pub fn new(loader: Arc<dyn EngineLoader>, options: FontOptions) -> Self {
        Self {
            loader,
            options,
            fonts: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a library backed by [`SwashLoader`](crate::engine::SwashLoader).
    #[cfg(feature = "swash")]
    pub fn with_swash(options: FontOptions) -> Self {
        Self::new(Arc::new(crate::engine::SwashLoader::default()), options)
    }

    /// Options applied to newly loaded fonts.
    pub fn options(&self) -> &FontOptions {
        &self.options
    }

    fn load_with(
        &self,
        key: SourceKey,
        read: impl FnOnce() -> Result<FontSource, Error>,
    ) -> Result<Arc<Font>, Error> {
        use hashbrown::hash_map::Entry;
        let mut fonts = self.fonts.lock();
        let slot = match fonts.entry(key) {
            Entry::Occupied(occupied) => {
                if let Some(font) = occupied.get().upgrade() {
                    return Ok(font);
                }
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(Weak::new()),
        };
        let source = read()?;
        let engine = self.loader.load(
            source.data().clone(),
            self.options.face_index,
            source.name(),
        )?;
        let font = Arc::new(Font::new(source, engine, &self.options));
        *slot = Arc::downgrade(&font);
        Ok(font)
    }

    /// Loads the font file at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Font>, Error> {
        let path: Arc<Path> = path.as_ref().into();
        self.load_with(SourceKey::Path(path.clone()), || {
            let data = std::fs::read(&path).map_err(|err| Error::io(&path, err))?;
            let name = path
                .file_name()
                .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
                .into();
            Ok(FontSource::Path {
                path,
                name,
                data: Blob::new(Arc::new(data)),
            })
        })
    }

    /// Loads a font from memory, registered under `name`.
    ///
    /// If a live font was already loaded under `name`, it is returned and
    /// `data` is dropped.
    pub fn load_mem(&self, name: &str, data: Vec<u8>) -> Result<Arc<Font>, Error> {
        self.load_with(SourceKey::Memory(name.into()), || {
            Ok(FontSource::memory(name, data))
        })
    }

    /// The live font loaded from `path`, if any.
    pub fn get_path(&self, path: impl AsRef<Path>) -> Option<Arc<Font>> {
        let key = SourceKey::Path(path.as_ref().into());
        self.fonts.lock().get(&key).and_then(Weak::upgrade)
    }

    /// The live font loaded from memory under `name`, if any.
    pub fn get_mem(&self, name: &str) -> Option<Arc<Font>> {
        let key = SourceKey::Memory(name.into());
        self.fonts.lock().get(&key).and_then(Weak::upgrade)
    }

    /// Every live font, in no particular order.
    pub fn fonts(&self) -> Vec<Arc<Font>> {
        self.fonts.lock().values().filter_map(Weak::upgrade).collect()
    }

    /// Forgets the memory font registered under `name`, so the next
    /// [`load_mem`](Self::load_mem) loads it again. Existing handles keep
    /// working.
    pub fn forget_mem(&self, name: &str) -> bool {
        self.fonts
            .lock()
            .remove(&SourceKey::Memory(name.into()))
            .is_some()
    }

    /// Drops entries of fonts that have been unloaded.
    pub fn prune(&self) {
        self.fonts.lock().retain(|_, font| font.strong_count() > 0);
    }

    /// Number of live fonts.
    pub fn len(&self) -> usize {
        self.fonts
            .lock()
            .values()
            .filter(|font| font.strong_count() > 0)
            .count()
    }

    /// Returns `true` if no font is alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary")
            .field("loader", &self.loader)
            .field("fonts", &self.len())
            .finish_non_exhaustive()
    }
}
