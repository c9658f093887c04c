//! The drawing-surface abstraction the layout steps are written against.
//!
//! A [`Surface`] is a single-page canvas with a text cursor. Coordinates are PDF points measured
//! from the top-left corner of the page, which keeps the layout code free of the flipped y axis
//! used by the PDF format itself. Drawing a text cell advances the cursor horizontally by the width
//! of the text; [`Surface::br`] moves it down and back to the left margin.
//!
//! Two implementations ship with the crate: [`PdfSurface`](crate::pdf::PdfSurface) writes real
//! documents and [`RecordingSurface`](crate::recording::RecordingSurface) records every call for
//! inspection.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Width of an A4 page in points.
pub const A4_WIDTH_PT: f64 = 595.28;
/// Height of an A4 page in points.
pub const A4_HEIGHT_PT: f64 = 841.89;

/// Page dimensions in points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
}

impl PageConfig {
    /// A portrait A4 page.
    pub const A4: PageConfig = PageConfig {
        width: A4_WIDTH_PT,
        height: A4_HEIGHT_PT,
    };
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::A4
    }
}

/// Page margins in points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    /// Creates margins with the same value on every side.
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// An 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Returns a neutral grey with all three channels set to `level`.
    pub const fn grey(level: u8) -> Self {
        Rgb(level, level, level)
    }
}

/// Error reported by a drawing surface.
///
/// Surfaces only know which primitive failed. The renderer wraps this value into the
/// [`InvoiceError`](crate::InvoiceError) variant that matches the layout step it was running.
#[derive(Debug)]
pub struct SurfaceError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl SurfaceError {
    /// Creates an error from a message alone.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error that keeps the underlying failure as its source.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for SurfaceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

/// Primitive canvas operations consumed by the layout steps.
///
/// A surface is owned by exactly one rendering call. Implementations are expected to be
/// deterministic for identical call sequences apart from document metadata such as timestamps.
pub trait Surface {
    /// Starts a new document with the given page size.
    fn start(&mut self, page: PageConfig) -> Result<(), SurfaceError>;

    /// Sets the margins applied to pages added afterwards.
    fn set_margins(&mut self, margins: Margins);

    /// Adds a page and moves the cursor to its top-left margin corner.
    fn add_page(&mut self) -> Result<(), SurfaceError>;

    /// Registers a TrueType font under `name` so [`Surface::set_font`] can select it.
    fn register_typeface(&mut self, name: &str, data: &[u8]) -> Result<(), SurfaceError>;

    /// Returns the horizontal cursor position.
    fn x(&self) -> f64;

    /// Returns the vertical cursor position.
    fn y(&self) -> f64;

    fn set_x(&mut self, x: f64);

    fn set_y(&mut self, y: f64);

    /// Moves the cursor down by `dy` and back to the left margin.
    fn br(&mut self, dy: f64);

    /// Draws `text` at the cursor using the active font and advances the cursor by its width.
    fn cell(&mut self, text: &str) -> Result<(), SurfaceError>;

    /// Draws a straight line using the stroke color.
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), SurfaceError>;

    /// Draws the image stored at `path` with its top-left corner at (`x`, `y`).
    fn image(
        &mut self,
        path: &Path,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), SurfaceError>;

    fn set_text_color(&mut self, color: Rgb);

    fn set_stroke_color(&mut self, color: Rgb);

    /// Selects a registered typeface and a font size in points.
    fn set_font(&mut self, name: &str, size: f64) -> Result<(), SurfaceError>;

    /// Changes the size of the active typeface.
    fn set_font_size(&mut self, size: f64) -> Result<(), SurfaceError>;

    /// Serializes the finished document, writes it to `target` and returns the written bytes.
    fn emit(&mut self, target: &Path) -> Result<Vec<u8>, SurfaceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_error_exposes_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = SurfaceError::with_source("write failed", io);
        assert_eq!(err.to_string(), "write failed");
        let source = StdError::source(&err).expect("source is kept");
        assert_eq!(source.to_string(), "gone");
        assert!(StdError::source(&SurfaceError::new("plain")).is_none());
    }

    #[test]
    fn uniform_margins() {
        let margins = Margins::uniform(50.0);
        assert_eq!(margins.left, 50.0);
        assert_eq!(margins.bottom, 50.0);
    }
}
