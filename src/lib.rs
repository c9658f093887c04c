//! Renders invoices into single-page PDF documents using a fixed template.
//!
//! An [`InvoiceRenderer`] holds the sender identity, currency, captions and three typefaces.
//! [`InvoiceRenderer::generate`] validates an [`InvoiceRequest`], draws it onto a fresh
//! [`PdfSurface`](pdf::PdfSurface) and writes the document to the request's output path.
//! [`InvoiceRenderer::generate_on`] accepts any [`Surface`](surface::Surface), such as the
//! [`RecordingSurface`](recording::RecordingSurface) used for dry runs.

pub mod elements;
pub mod error;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod recording;
pub mod renderer;
pub mod surface;

pub use error::InvoiceError;
pub use model::{Currency, InvoiceRequest, Labels, LineItem, Typeface};
pub use renderer::{InvoiceConfig, InvoiceRenderer, Totals};
