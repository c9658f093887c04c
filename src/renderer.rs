//! Invoice configuration and the `generate` pipeline.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{InvoiceError, Result};
use crate::layout::{self, NOTES_Y};
use crate::model::{Currency, InvoiceRequest, Labels, Typeface};
use crate::pdf::PdfSurface;
use crate::surface::{Margins, PageConfig, Surface, SurfaceError};

/// Uniform page margin in points.
pub const PAGE_MARGIN_PT: f64 = 50.0;

const MIN_FIELD_LEN: usize = 2;

/// Settings shared by every invoice a renderer produces.
#[derive(Clone, Debug)]
pub struct InvoiceConfig<'a> {
    sender: String,
    logo: Option<PathBuf>,
    regular: Typeface<'a>,
    bold: Typeface<'a>,
    headline: Typeface<'a>,
    labels: Labels,
    currency: Currency,
}

impl<'a> InvoiceConfig<'a> {
    /// Sender identity; a literal `\n` separates lines.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn logo(&self) -> Option<&Path> {
        self.logo.as_deref()
    }

    pub fn regular(&self) -> Typeface<'a> {
        self.regular
    }

    pub fn bold(&self) -> Typeface<'a> {
        self.bold
    }

    pub fn headline(&self) -> Typeface<'a> {
        self.headline
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    fn typefaces(&self) -> [Typeface<'a>; 3] {
        [self.regular, self.bold, self.headline]
    }
}

/// Monetary results of an invoice.
///
/// Tax is computed on the discounted subtotal: `tax = (subtotal - discount) * tax_rate`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub taxable: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
}

impl Totals {
    /// Computes the totals for a subtotal and fractional discount and tax rates.
    pub fn compute(subtotal: f64, discount_rate: f64, tax_rate: f64) -> Self {
        let discount = subtotal * discount_rate;
        let taxable = subtotal - discount;
        let tax = taxable * tax_rate;
        Self {
            subtotal,
            taxable,
            tax,
            discount,
            total: subtotal + tax - discount,
        }
    }
}

/// Renders invoices with a fixed template.
///
/// A renderer is immutable once constructed and can be shared between threads; each call to
/// [`generate`](Self::generate) works on its own surface.
#[derive(Clone, Debug)]
pub struct InvoiceRenderer<'a> {
    config: InvoiceConfig<'a>,
}

impl<'a> InvoiceRenderer<'a> {
    /// Creates a renderer.
    ///
    /// Fails with [`InvoiceError::InvalidInput`] when a typeface has no name or no data. Pass
    /// `None` as `logo` to omit the logo.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        regular: Typeface<'a>,
        bold: Typeface<'a>,
        headline: Typeface<'a>,
        currency: Currency,
        labels: Labels,
        logo: Option<PathBuf>,
        sender: impl Into<String>,
    ) -> Result<Self> {
        for (role, typeface) in [("regular", regular), ("bold", bold), ("headline", headline)] {
            if typeface.name().trim().is_empty() {
                return Err(InvoiceError::invalid(format!("the {} typeface has no name", role)));
            }
            if typeface.data().is_empty() {
                return Err(InvoiceError::invalid(format!(
                    "the {} typeface '{}' has no font data",
                    role,
                    typeface.name()
                )));
            }
        }

        Ok(Self {
            config: InvoiceConfig {
                sender: sender.into(),
                logo: logo.filter(|path| !path.as_os_str().is_empty()),
                regular,
                bold,
                headline,
                labels,
                currency,
            },
        })
    }

    pub fn config(&self) -> &InvoiceConfig<'a> {
        &self.config
    }

    /// Renders `request` into a PDF, writes it to the request's output path and returns its bytes.
    pub fn generate(&self, request: &InvoiceRequest) -> Result<Vec<u8>> {
        validate(request)?;
        let mut surface = PdfSurface::new(request.title());
        self.render(&mut surface, request)
    }

    /// Renders `request` onto a caller-provided surface and returns what the surface emits.
    ///
    /// The request is validated before the surface is touched.
    pub fn generate_on<S: Surface>(&self, surface: &mut S, request: &InvoiceRequest) -> Result<Vec<u8>> {
        validate(request)?;
        self.render(surface, request)
    }

    fn render<S: Surface>(&self, surface: &mut S, request: &InvoiceRequest) -> Result<Vec<u8>> {
        let config = &self.config;
        debug!("rendering invoice {} with {} items", request.id(), request.items().len());

        start_page(surface)?;
        for typeface in config.typefaces() {
            surface
                .register_typeface(typeface.name(), typeface.data())
                .map_err(|source| InvoiceError::TypefaceRegistration {
                    name: typeface.name().to_owned(),
                    source,
                })?;
            debug!("registered typeface '{}'", typeface.name());
        }

        layout::write_logo(surface, config)?;
        layout::write_title(surface, config, request.title(), request.id(), request.issue_date())?;
        layout::write_bill_to(surface, config, request.recipient())?;
        layout::write_header_row(surface, config)?;

        let mut subtotal = 0.0;
        for item in request.items() {
            subtotal += layout::write_row(surface, config, item)?;
        }
        if surface.y() > NOTES_Y {
            warn!(
                "item table of invoice {} ends at y={:.0} and overlaps the notes and totals area",
                request.id(),
                surface.y()
            );
        }

        if let Some(note) = request.note() {
            layout::write_notes(surface, config, note)?;
        }

        let totals = Totals::compute(subtotal, request.discount(), request.tax());
        debug!("invoice {} totals: {:?}", request.id(), totals);
        layout::write_totals(surface, config, &totals, request.tax(), request.discount())?;
        layout::write_due_date(surface, config, request.due_date())?;
        layout::write_footer(surface, config, request.id())?;

        let target = request.output();
        let bytes = surface
            .emit(target)
            .map_err(|source| InvoiceError::OutputEmission {
                target: target.display().to_string(),
                source,
            })?;
        info!("emitted invoice {} to {} ({} bytes)", request.id(), target.display(), bytes.len());
        Ok(bytes)
    }
}

fn start_page<S: Surface>(surface: &mut S) -> Result<()> {
    let drawing = |source: SurfaceError| InvoiceError::Drawing {
        step: "page setup",
        source,
    };
    surface.start(PageConfig::A4).map_err(drawing)?;
    surface.set_margins(Margins::uniform(PAGE_MARGIN_PT));
    surface.add_page().map_err(drawing)
}

/// Checks the preconditions of a generation request.
pub fn validate(request: &InvoiceRequest) -> Result<()> {
    let fields = [
        ("title", request.title()),
        ("id", request.id()),
        ("issue date", request.issue_date()),
        ("due date", request.due_date()),
        ("recipient", request.recipient()),
    ];
    for (field, value) in fields {
        if value.chars().count() < MIN_FIELD_LEN {
            return Err(InvoiceError::invalid(format!(
                "{} must be at least {} characters long",
                field, MIN_FIELD_LEN
            )));
        }
    }

    if request.output().to_string_lossy().chars().count() < MIN_FIELD_LEN {
        return Err(InvoiceError::invalid(format!(
            "output target must be at least {} characters long",
            MIN_FIELD_LEN
        )));
    }

    if request.items().is_empty() {
        return Err(InvoiceError::invalid("at least one line item is required"));
    }
    Ok(())
}
