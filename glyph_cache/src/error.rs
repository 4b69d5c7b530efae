// Copyright 2025 the Glyph Cache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::path::Path;
use std::sync::Arc;

/// Error type for font loading and batch submission.
///
/// Carries a non-exhaustive [`ErrorKind`] plus a short description of what
/// was being attempted (a file path, a buffer name, or a backend message).
#[derive(Debug, Clone)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// What the failing operation was working on.
    context: Arc<str>,

    /// The underlying I/O error, for [`ErrorKind::Io`].
    io: Option<Arc<std::io::Error>>,
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The path, buffer name or backend message associated with this error.
    pub fn context(&self) -> &str {
        &self.context
    }

    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io,
            context: path.display().to_string().into(),
            io: Some(Arc::new(err)),
        }
    }

    /// Creates an error for font data that could not be parsed.
    ///
    /// Intended for [`EngineLoader`](crate::engine::EngineLoader) implementations.
    pub fn invalid_font(source: &str) -> Self {
        Self {
            kind: ErrorKind::InvalidFont,
            context: source.into(),
            io: None,
        }
    }

    /// Creates an error for a graphics backend that failed to draw a batch.
    ///
    /// Intended for [`GraphicsBackend`](crate::GraphicsBackend) implementations.
    pub fn backend(message: impl Into<Arc<str>>) -> Self {
        Self {
            kind: ErrorKind::Backend,
            context: message.into(),
            io: None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::Io => match &self.io {
                Some(io) => write!(f, "failed to read font file {}: {io}", self.context),
                None => write!(f, "failed to read font file {}", self.context),
            },
            ErrorKind::InvalidFont => write!(f, "invalid or unsupported font data: {}", self.context),
            ErrorKind::Backend => write!(f, "graphics backend rejected batch: {}", self.context),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.io
            .as_deref()
            .map(|io| io as &(dyn core::error::Error + 'static))
    }
}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A font file could not be read.
    Io,

    /// The font engine could not parse the font data.
    InvalidFont,

    /// The graphics backend failed to draw a batch.
    Backend,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::error::Error as _;

    #[test]
    fn io_errors_expose_their_source() {
        let err = Error::io(
            Path::new("/missing/font.ttf"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.context(), "/missing/font.ttf");
        assert!(err.source().is_some(), "io error should be chained");
        assert!(err.to_string().starts_with("failed to read font file /missing/font.ttf"));
    }

    #[test]
    fn backend_errors_carry_message() {
        let err = Error::backend("device lost");
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.source().is_none(), "backend errors have no source");
        assert_eq!(err.to_string(), "graphics backend rejected batch: device lost");
    }
}
