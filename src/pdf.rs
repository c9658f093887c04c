//! PDF output built on `printpdf`, with text metrics taken from `genpdf`'s font cache.
//!
//! `printpdf` places text at absolute coordinates but cannot measure it, while `genpdf` parses the
//! same TrueType data and exposes glyph metrics. Every registered typeface is therefore loaded
//! twice: once as an embedded PDF font and once into a [`FontCache`] used to advance the cursor.

use std::fs;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use genpdf::fonts::{Font, FontCache, FontData, FontFamily};
use image::GenericImageView;
use log::debug;
use printpdf::{IndirectFontRef, PdfDocument, PdfDocumentReference, PdfLayerReference, Point};

use crate::elements::{decode_image_from_path, flatten_for_pdf};
use crate::surface::{Margins, PageConfig, Rgb, Surface, SurfaceError};

const MM_PER_PT: f64 = 25.4 / 72.0;
const LAYER_NAME: &str = "Layer 1";
const LINE_THICKNESS_PT: f64 = 1.0;
/// `genpdf` measures at integer font sizes; metrics are taken at this size and scaled linearly.
const METRIC_FONT_SIZE: u8 = 100;

fn pt_to_mm(value: f64) -> printpdf::Mm {
    printpdf::Mm(value * MM_PER_PT)
}

fn mm_to_pt(value: genpdf::Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0 / MM_PER_PT
}

fn pdf_color(color: Rgb) -> printpdf::Color {
    let Rgb(r, g, b) = color;
    printpdf::Color::Rgb(printpdf::Rgb::new(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        None,
    ))
}

fn single_face_family(data: FontData) -> FontFamily<FontData> {
    FontFamily {
        regular: data.clone(),
        bold: data.clone(),
        italic: data.clone(),
        bold_italic: data,
    }
}

struct RegisteredFont {
    name: String,
    pdf: IndirectFontRef,
    metrics: Font,
    /// Distance from the top of a line to the baseline, per point of font size.
    ascent: f64,
}

fn ascent_ratio(font: &rusttype::Font<'_>) -> f64 {
    let units_per_em = f64::from(font.units_per_em());
    if units_per_em == 0.0 {
        return 0.0;
    }
    f64::from(font.v_metrics_unscaled().ascent) / units_per_em
}

/// A [`Surface`] producing a single PDF document.
pub struct PdfSurface {
    title: String,
    page: Option<PageConfig>,
    margins: Margins,
    document: Option<PdfDocumentReference>,
    layer: Option<PdfLayerReference>,
    font_cache: Option<FontCache>,
    fonts: Vec<RegisteredFont>,
    active_font: Option<usize>,
    font_size: f64,
    x: f64,
    y: f64,
    text_color: Rgb,
    stroke_color: Rgb,
}

impl PdfSurface {
    /// Creates a surface whose document carries `title` in its metadata.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            page: None,
            margins: Margins::default(),
            document: None,
            layer: None,
            font_cache: None,
            fonts: Vec::new(),
            active_font: None,
            font_size: 0.0,
            x: 0.0,
            y: 0.0,
            text_color: Rgb::BLACK,
            stroke_color: Rgb::BLACK,
        }
    }

    fn page(&self) -> Result<PageConfig, SurfaceError> {
        self.page
            .ok_or_else(|| SurfaceError::new("document has not been started"))
    }

    fn layer(&self) -> Result<&PdfLayerReference, SurfaceError> {
        self.layer
            .as_ref()
            .ok_or_else(|| SurfaceError::new("no page has been added"))
    }

    fn active_font(&self) -> Result<&RegisteredFont, SurfaceError> {
        self.active_font
            .and_then(|index| self.fonts.get(index))
            .ok_or_else(|| SurfaceError::new("no font selected"))
    }

    /// Converts a top-left based y coordinate into the PDF's bottom-left based one.
    fn flip(&self, y: f64) -> Result<f64, SurfaceError> {
        Ok(self.page()?.height - y)
    }
}

impl Surface for PdfSurface {
    fn start(&mut self, page: PageConfig) -> Result<(), SurfaceError> {
        if page.width <= 0.0 || page.height <= 0.0 {
            return Err(SurfaceError::new(format!(
                "invalid page size {}x{}",
                page.width, page.height
            )));
        }
        self.page = Some(page);
        Ok(())
    }

    fn set_margins(&mut self, margins: Margins) {
        self.margins = margins;
    }

    fn add_page(&mut self) -> Result<(), SurfaceError> {
        let page = self.page()?;
        let (width, height) = (pt_to_mm(page.width), pt_to_mm(page.height));

        let layer = match &self.document {
            Some(document) => {
                let (page_index, layer_index) = document.add_page(width, height, LAYER_NAME);
                document.get_page(page_index).get_layer(layer_index)
            }
            None => {
                let (document, page_index, layer_index) =
                    PdfDocument::new(self.title.as_str(), width, height, LAYER_NAME);
                let layer = document.get_page(page_index).get_layer(layer_index);
                self.document = Some(document);
                layer
            }
        };

        self.layer = Some(layer);
        self.x = self.margins.left;
        self.y = self.margins.top;
        Ok(())
    }

    fn register_typeface(&mut self, name: &str, data: &[u8]) -> Result<(), SurfaceError> {
        let document = self.document.as_ref().ok_or_else(|| {
            SurfaceError::new("a page must be added before registering typefaces")
        })?;

        let font_data = FontData::new(data.to_vec(), None)
            .map_err(|err| SurfaceError::new(format!("cannot parse font data: {}", err)))?;
        let pdf = document
            .add_external_font(Cursor::new(data))
            .map_err(|err| SurfaceError::new(format!("cannot embed font data: {}", err)))?;

        let cache = self
            .font_cache
            .get_or_insert_with(|| FontCache::new(single_face_family(font_data.clone())));
        let metrics = cache.add_font_family(single_face_family(font_data)).regular;
        let ascent = ascent_ratio(cache.get_rt_font(metrics));

        debug!("embedded typeface '{}' ({} bytes)", name, data.len());
        self.fonts.push(RegisteredFont {
            name: name.to_owned(),
            pdf,
            metrics,
            ascent,
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
        let font = self.active_font()?;
        let cache = self
            .font_cache
            .as_ref()
            .ok_or_else(|| SurfaceError::new("no typeface registered"))?;

        let scale = self.font_size / f64::from(METRIC_FONT_SIZE);
        let width = mm_to_pt(font.metrics.str_width(cache, text, METRIC_FONT_SIZE)) * scale;
        let baseline = self.flip(self.y + font.ascent * self.font_size)?;

        let layer = self.layer()?;
        layer.set_fill_color(pdf_color(self.text_color));
        layer.use_text(
            text,
            self.font_size,
            pt_to_mm(self.x),
            pt_to_mm(baseline),
            &font.pdf,
        );

        self.x += width;
        Ok(())
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), SurfaceError> {
        let (y1, y2) = (self.flip(y1)?, self.flip(y2)?);
        let layer = self.layer()?;
        layer.set_outline_color(pdf_color(self.stroke_color));
        layer.set_outline_thickness(LINE_THICKNESS_PT);
        layer.add_shape(printpdf::Line {
            points: vec![
                (Point::new(pt_to_mm(x1), pt_to_mm(y1)), false),
                (Point::new(pt_to_mm(x2), pt_to_mm(y2)), false),
            ],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
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
        let bottom = self.flip(y + height)?;
        let layer = self.layer()?.clone();

        let image = decode_image_from_path(path)
            .map(flatten_for_pdf)
            .map_err(|err| SurfaceError::with_source("cannot embed image", err))?;
        let (px_width, px_height) = image.dimensions();
        if px_width == 0 || px_height == 0 {
            return Err(SurfaceError::new(format!(
                "image {} has no pixels",
                path.display()
            )));
        }

        // At 72 dpi one pixel maps to one point, so the scale factors are target size / pixels.
        printpdf::Image::from_dynamic_image(&image).add_to_layer(
            layer,
            Some(pt_to_mm(x)),
            Some(pt_to_mm(bottom)),
            None,
            Some(width / f64::from(px_width)),
            Some(height / f64::from(px_height)),
            Some(72.0),
        );
        Ok(())
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.stroke_color = color;
    }

    fn set_font(&mut self, name: &str, size: f64) -> Result<(), SurfaceError> {
        let index = self
            .fonts
            .iter()
            .position(|font| font.name == name)
            .ok_or_else(|| SurfaceError::new(format!("typeface '{}' is not registered", name)))?;
        self.active_font = Some(index);
        self.font_size = size;
        Ok(())
    }

    fn set_font_size(&mut self, size: f64) -> Result<(), SurfaceError> {
        self.active_font()?;
        self.font_size = size;
        Ok(())
    }

    fn emit(&mut self, target: &Path) -> Result<Vec<u8>, SurfaceError> {
        let document = self
            .document
            .take()
            .ok_or_else(|| SurfaceError::new("no page has been added"))?;
        self.layer = None;

        let mut writer = BufWriter::new(Vec::new());
        document
            .save(&mut writer)
            .map_err(|err| SurfaceError::new(format!("cannot serialize document: {}", err)))?;
        let bytes = writer
            .into_inner()
            .map_err(|err| SurfaceError::with_source("cannot flush document", err.into_error()))?;

        fs::write(target, &bytes).map_err(|err| {
            SurfaceError::with_source(format!("cannot write {}", target.display()), err)
        })?;
        Ok(bytes)
    }
}
