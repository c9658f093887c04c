//! Data structures describing an invoice and the assets used to draw it.
//!
//! Typefaces borrow their font data from the caller so a single set of font files can back any
//! number of renderers. Everything else is plain owned data that front ends can build from
//! configuration files.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A named TrueType font whose bytes are owned by the caller.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Typeface<'a> {
    name: &'a str,
    data: &'a [u8],
}

impl<'a> Typeface<'a> {
    /// Pairs a font name with the raw font file contents.
    pub fn new(name: &'a str, data: &'a [u8]) -> Self {
        Self { name, data }
    }

    /// Name the font is registered under.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Raw font file contents.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

impl fmt::Debug for Typeface<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typeface")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Currency used for every monetary amount on the invoice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Display label such as `EUR`.
    pub label: String,
    /// Symbol prefixed to every amount, such as `€`.
    pub symbol: String,
}

impl Currency {
    pub fn new(label: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            symbol: symbol.into(),
        }
    }
}

/// Captions of the totals block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub subtotal: String,
    pub discount: String,
    pub tax: String,
    pub total: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            subtotal: "Subtotal".to_owned(),
            discount: "Discount".to_owned(),
            tax: "Tax".to_owned(),
            total: "Total".to_owned(),
        }
    }
}

/// A single billed position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: i64,
    pub rate: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: i64, rate: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            rate,
        }
    }

    /// Quantity multiplied by rate.
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.rate
    }
}

/// Parameters of a single [`generate`](crate::InvoiceRenderer::generate) call.
///
/// Rates are fractions: `0.15` is a 15% tax, `0.1` a 10% discount. The discount is subtracted from
/// the subtotal before tax is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct InvoiceRequest {
    title: String,
    id: String,
    issue_date: String,
    due_date: String,
    recipient: String,
    note: Option<String>,
    output: PathBuf,
    discount: f64,
    tax: f64,
    items: Vec<LineItem>,
}

impl InvoiceRequest {
    /// Creates a request without items, note, discount or tax.
    pub fn new(
        title: impl Into<String>,
        id: impl Into<String>,
        issue_date: impl Into<String>,
        due_date: impl Into<String>,
        recipient: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            id: id.into(),
            issue_date: issue_date.into(),
            due_date: due_date.into(),
            recipient: recipient.into(),
            note: None,
            output: output.into(),
            discount: 0.0,
            tax: 0.0,
            items: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn issue_date(&self) -> &str {
        &self.issue_date
    }

    pub fn due_date(&self) -> &str {
        &self.due_date
    }

    /// Recipient block; a literal `\n` separates lines.
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// The note, if one was set and is not empty.
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref().filter(|note| !note.is_empty())
    }

    /// Path the finished document is written to.
    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn tax(&self) -> f64 {
        self.tax
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sets the note and returns the updated request.
    pub fn with_note(mut self, note: impl Into<Option<String>>) -> Self {
        self.note = note.into();
        self
    }

    /// Sets the discount rate and returns the updated request.
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    /// Sets the tax rate and returns the updated request.
    pub fn with_tax(mut self, tax: f64) -> Self {
        self.tax = tax;
        self
    }

    /// Appends an item and returns the updated request.
    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    /// Extends the request with multiple items and returns the updated instance.
    pub fn with_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = LineItem>,
    {
        self.items.extend(items);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_note_is_treated_as_absent() {
        let request = InvoiceRequest::new("Title", "ID-1", "2025-04-20", "2025-06-01", "To", "out.pdf")
            .with_note(String::new());
        assert_eq!(request.note(), None);

        let request = request.with_note("Thanks".to_owned());
        assert_eq!(request.note(), Some("Thanks"));
    }

    #[test]
    fn item_amount_multiplies_quantity_and_rate() {
        assert_eq!(LineItem::new("Dev Work", 100, 100.0).amount(), 10_000.0);
        assert_eq!(LineItem::new("Nothing", 0, 42.5).amount(), 0.0);
    }
}
