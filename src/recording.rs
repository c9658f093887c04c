//! An in-memory surface that records drawing calls instead of producing a PDF.
//!
//! [`RecordingSurface`] follows the same cursor rules as [`PdfSurface`](crate::pdf::PdfSurface)
//! but measures text with a fixed advance per character, so no font parsing takes place. Its
//! emitted document is the JSON encoded list of [`DrawOp`]s, which makes it useful for dry runs and
//! for asserting on layout decisions.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::surface::{Margins, PageConfig, Rgb, Surface, SurfaceError};

/// Horizontal advance of a single character relative to the font size.
pub const CHAR_ADVANCE: f64 = 0.5;

/// A single recorded drawing primitive.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Start { page: PageConfig },
    AddPage { margins: Margins },
    RegisterTypeface { name: String, bytes: usize },
    Text {
        x: f64,
        y: f64,
        text: String,
        font: String,
        size: f64,
        color: Rgb,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Rgb,
    },
    Image {
        path: PathBuf,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// Surface that keeps every primitive call in memory.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    page: Option<PageConfig>,
    margins: Margins,
    pages: usize,
    typefaces: Vec<String>,
    font: Option<String>,
    font_size: f64,
    x: f64,
    y: f64,
    text_color: Rgb,
    stroke_color: Rgb,
    ops: Vec<DrawOp>,
    emitted_to: Option<PathBuf>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded operations in call order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Recorded text cells as `(text, font, size)` triples.
    pub fn texts(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text {
                text, font, size, ..
            } => Some((text.as_str(), font.as_str(), *size)),
            _ => None,
        })
    }

    /// Returns the first text cell whose content equals `text`.
    pub fn find_text(&self, text: &str) -> Option<&DrawOp> {
        self.ops
            .iter()
            .find(|op| matches!(op, DrawOp::Text { text: t, .. } if t == text))
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Target passed to the last successful [`Surface::emit`] call.
    pub fn emitted_to(&self) -> Option<&Path> {
        self.emitted_to.as_deref()
    }

    fn require_page(&self) -> Result<(), SurfaceError> {
        if self.pages == 0 {
            Err(SurfaceError::new("no page has been added"))
        } else {
            Ok(())
        }
    }
}

impl Surface for RecordingSurface {
    fn start(&mut self, page: PageConfig) -> Result<(), SurfaceError> {
        if page.width <= 0.0 || page.height <= 0.0 {
            return Err(SurfaceError::new(format!(
                "invalid page size {}x{}",
                page.width, page.height
            )));
        }
        self.page = Some(page);
        self.ops.push(DrawOp::Start { page });
        Ok(())
    }

    fn set_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }

    fn add_page(&mut self) -> Result<(), SurfaceError> {
        if self.page.is_none() {
            return Err(SurfaceError::new("document has not been started"));
        }
        self.pages += 1;
        self.x = self.margins.left;
        self.y = self.margins.top;
        self.ops.push(DrawOp::AddPage {
            margins: self.margins,
        });
        Ok(())
    }

    fn register_typeface(&mut self, name: &str, data: &[u8]) -> Result<(), SurfaceError> {
        if data.is_empty() {
            return Err(SurfaceError::new(format!("font data for '{}' is empty", name)));
        }
        self.typefaces.push(name.to_owned());
        self.ops.push(DrawOp::RegisterTypeface {
            name: name.to_owned(),
            bytes: data.len(),
        });
        Ok(())
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    fn br(&mut self, dy: f64) {
        self.y += dy;
        self.x = self.margins.left;
    }

    fn cell(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.require_page()?;
        let font = self
            .font
            .clone()
            .ok_or_else(|| SurfaceError::new("no font selected"))?;
        self.ops.push(DrawOp::Text {
            x: self.x,
            y: self.y,
            text: text.to_owned(),
            font,
            size: self.font_size,
            color: self.text_color,
        });
        self.x += text.chars().count() as f64 * self.font_size * CHAR_ADVANCE;
        Ok(())
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), SurfaceError> {
        self.require_page()?;
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color: self.stroke_color,
        });
        Ok(())
    }

    fn image(
        &mut self,
        path: &Path,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), SurfaceError> {
        self.require_page()?;
        self.ops.push(DrawOp::Image {
            path: path.to_path_buf(),
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.stroke_color = color;
    }

    fn set_font(&mut self, name: &str, size: f64) -> Result<(), SurfaceError> {
        if !self.typefaces.iter().any(|registered| registered == name) {
            return Err(SurfaceError::new(format!("typeface '{}' is not registered", name)));
        }
        self.font = Some(name.to_owned());
        self.font_size = size;
        Ok(())
    }

    fn set_font_size(&mut self, size: f64) -> Result<(), SurfaceError> {
        if self.font.is_none() {
            return Err(SurfaceError::new("no font selected"));
        }
        self.font_size = size;
        Ok(())
    }

    fn emit(&mut self, target: &Path) -> Result<Vec<u8>, SurfaceError> {
        self.require_page()?;
        let bytes = serde_json::to_vec_pretty(&self.ops)
            .map_err(|err| SurfaceError::with_source("failed to serialize draw operations", err))?;
        self.emitted_to = Some(target.to_path_buf());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        surface.start(PageConfig::A4).unwrap();
        surface.set_margins(Margins::uniform(50.0));
        surface.add_page().unwrap();
        surface.register_typeface("Regular", b"font").unwrap();
        surface
    }

    #[test]
    fn add_page_moves_cursor_to_margin() {
        let surface = started();
        assert_eq!((surface.x(), surface.y()), (50.0, 50.0));
        assert_eq!(surface.page_count(), 1);
    }

    #[test]
    fn cell_advances_cursor_by_text_width() {
        let mut surface = started();
        surface.set_font("Regular", 10.0).unwrap();
        surface.cell("abcd").unwrap();
        assert_eq!(surface.x(), 50.0 + 4.0 * 10.0 * CHAR_ADVANCE);
        assert_eq!(surface.y(), 50.0);
    }

    #[test]
    fn br_returns_to_left_margin() {
        let mut surface = started();
        surface.set_x(300.0);
        surface.br(24.0);
        assert_eq!((surface.x(), surface.y()), (50.0, 74.0));
    }

    #[test]
    fn unknown_font_is_rejected() {
        let mut surface = started();
        assert!(surface.set_font("Missing", 10.0).is_err());
        assert!(surface.cell("text").is_err());
    }

    #[test]
    fn emit_serializes_ops() {
        let mut surface = started();
        surface.set_font("Regular", 9.0).unwrap();
        surface.cell("ITEM").unwrap();
        let bytes = surface.emit(Path::new("out.json")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"op\": \"text\""));
        assert!(text.contains("ITEM"));
        assert_eq!(surface.emitted_to(), Some(Path::new("out.json")));
    }
}
