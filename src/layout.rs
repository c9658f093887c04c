//! The invoice template as a fixed sequence of drawing steps.
//!
//! Each step positions the cursor, switches fonts and colors, draws its cells and leaves the cursor
//! where the next step expects it. Notes, totals and the footer sit at absolute y coordinates
//! regardless of how many item rows precede them.

use std::path::Path;

use crate::elements::{image_dimensions, scaled_logo_size};
use crate::error::{InvoiceError, Result};
use crate::format::{money, rate_caption, split_lines};
use crate::model::LineItem;
use crate::renderer::{InvoiceConfig, Totals};
use crate::surface::{Rgb, Surface, SurfaceError};

/// X position of the quantity column.
pub const QUANTITY_COLUMN_X: f64 = 360.0;
/// X position of the rate column, also used for totals captions.
pub const RATE_COLUMN_X: f64 = 405.0;
/// X position of the amount column, also used for totals amounts.
pub const AMOUNT_COLUMN_X: f64 = 480.0;
/// Horizontal distance of the logo from the cursor.
pub const LOGO_OFFSET_X: f64 = 460.0;
/// Y position of the notes block.
pub const NOTES_Y: f64 = 600.0;
/// Y position of the totals block.
pub const TOTALS_Y: f64 = 600.0;
/// Y position of the footer.
pub const FOOTER_Y: f64 = 800.0;

const SENDER_RULE_END_X: f64 = 260.0;
const FOOTER_RULE_END_X: f64 = 550.0;
const RULE_COLOR: Rgb = Rgb::grey(225);
const TOTAL_AMOUNT_SIZE: f64 = 11.5;

trait DrawContext<T> {
    fn drawing(self, step: &'static str) -> Result<T>;
}

impl<T> DrawContext<T> for std::result::Result<T, SurfaceError> {
    fn drawing(self, step: &'static str) -> Result<T> {
        self.map_err(|source| InvoiceError::Drawing { step, source })
    }
}

/// Draws the optional logo followed by the sender block and a short divider.
pub fn write_logo<S: Surface>(surface: &mut S, config: &InvoiceConfig<'_>) -> Result<()> {
    const STEP: &str = "sender block";

    if let Some(logo) = config.logo() {
        write_logo_image(surface, logo)?;
    }

    surface.set_text_color(Rgb::grey(55));
    let headline = config.headline().name();
    for (index, line) in split_lines(config.sender()).enumerate() {
        let (size, advance) = if index == 0 { (12.0, 18.0) } else { (10.0, 15.0) };
        surface.set_font(headline, size).drawing(STEP)?;
        surface.cell(line).drawing(STEP)?;
        surface.br(advance);
    }

    surface.br(21.0);
    surface.set_stroke_color(RULE_COLOR);
    let (x, y) = (surface.x(), surface.y());
    surface.line(x, y, SENDER_RULE_END_X, y).drawing(STEP)?;
    surface.br(36.0);
    Ok(())
}

fn write_logo_image<S: Surface>(surface: &mut S, logo: &Path) -> Result<()> {
    let (width, height) = image_dimensions(logo)?;
    let (scaled_width, scaled_height) = scaled_logo_size(width, height);
    let (x, y) = (LOGO_OFFSET_X + surface.x(), surface.y());
    surface
        .image(logo, x, y, scaled_width, scaled_height)
        .drawing("logo")?;
    surface.br(scaled_height + 24.0);
    Ok(())
}

/// Draws the title and the `#id · date` line below it.
pub fn write_title<S: Surface>(
    surface: &mut S,
    config: &InvoiceConfig<'_>,
    title: &str,
    id: &str,
    issue_date: &str,
) -> Result<()> {
    const STEP: &str = "title";
    let headline = config.headline().name();

    surface.set_font(headline, 24.0).drawing(STEP)?;
    surface.set_text_color(Rgb::BLACK);
    surface.cell(title).drawing(STEP)?;
    surface.br(36.0);

    surface.set_font(headline, 12.0).drawing(STEP)?;
    surface.set_text_color(Rgb::grey(100));
    surface.cell("#").drawing(STEP)?;
    surface.cell(id).drawing(STEP)?;
    surface.set_text_color(Rgb::grey(150));
    surface.cell("  ·  ").drawing(STEP)?;
    surface.set_text_color(Rgb::grey(100));
    surface.cell(issue_date).drawing(STEP)?;
    surface.br(48.0);
    Ok(())
}

/// Draws the `BILL TO` caption and the recipient block.
pub fn write_bill_to<S: Surface>(
    surface: &mut S,
    config: &InvoiceConfig<'_>,
    recipient: &str,
) -> Result<()> {
    const STEP: &str = "bill-to block";
    let regular = config.regular().name();

    surface.set_text_color(Rgb::grey(75));
    surface.set_font(regular, 9.0).drawing(STEP)?;
    surface.cell("BILL TO").drawing(STEP)?;
    surface.br(18.0);

    for (index, line) in split_lines(recipient).enumerate() {
        let (size, advance) = if index == 0 { (15.0, 20.0) } else { (10.0, 15.0) };
        surface.set_font(regular, size).drawing(STEP)?;
        surface.cell(line).drawing(STEP)?;
        surface.br(advance);
    }
    surface.br(64.0);
    Ok(())
}

/// Draws the ITEM / QTY / RATE / AMOUNT captions.
pub fn write_header_row<S: Surface>(surface: &mut S, config: &InvoiceConfig<'_>) -> Result<()> {
    const STEP: &str = "header row";

    surface.set_font(config.regular().name(), 9.0).drawing(STEP)?;
    surface.set_text_color(Rgb::grey(55));
    surface.cell("ITEM").drawing(STEP)?;
    surface.set_x(QUANTITY_COLUMN_X);
    surface.cell("QTY").drawing(STEP)?;
    surface.set_x(RATE_COLUMN_X);
    surface.cell("RATE").drawing(STEP)?;
    surface.set_x(AMOUNT_COLUMN_X);
    surface.cell("AMOUNT").drawing(STEP)?;
    surface.br(24.0);
    Ok(())
}

/// Draws one item row and returns its amount.
pub fn write_row<S: Surface>(
    surface: &mut S,
    config: &InvoiceConfig<'_>,
    item: &LineItem,
) -> Result<f64> {
    const STEP: &str = "item row";
    let symbol = &config.currency().symbol;
    let amount = item.amount();

    surface.set_font(config.regular().name(), 11.0).drawing(STEP)?;
    surface.set_text_color(Rgb::BLACK);
    surface.cell(&item.description).drawing(STEP)?;
    surface.set_x(QUANTITY_COLUMN_X);
    surface.cell(&item.quantity.to_string()).drawing(STEP)?;
    surface.set_x(RATE_COLUMN_X);
    surface.cell(&money(symbol, item.rate)).drawing(STEP)?;
    surface.set_x(AMOUNT_COLUMN_X);
    surface.cell(&money(symbol, amount)).drawing(STEP)?;
    surface.br(24.0);
    Ok(amount)
}

/// Draws the notes block at [`NOTES_Y`].
pub fn write_notes<S: Surface>(
    surface: &mut S,
    config: &InvoiceConfig<'_>,
    notes: &str,
) -> Result<()> {
    const STEP: &str = "notes";
    let regular = config.regular().name();

    surface.set_y(NOTES_Y);
    surface.set_font(regular, 9.0).drawing(STEP)?;
    surface.set_text_color(Rgb::grey(55));
    surface.cell("NOTES").drawing(STEP)?;
    surface.br(18.0);

    surface.set_font(regular, 9.0).drawing(STEP)?;
    surface.set_text_color(Rgb::BLACK);
    for line in split_lines(notes) {
        surface.cell(line).drawing(STEP)?;
        surface.br(15.0);
    }
    surface.br(48.0);
    Ok(())
}

/// Draws the totals block at [`TOTALS_Y`].
///
/// The tax and discount lines are only drawn when their amounts are positive. The total line is
/// always drawn and its amount uses the bold typeface.
pub fn write_totals<S: Surface>(
    surface: &mut S,
    config: &InvoiceConfig<'_>,
    totals: &Totals,
    tax_rate: f64,
    discount_rate: f64,
) -> Result<()> {
    let labels = config.labels();
    surface.set_y(TOTALS_Y);

    write_total(surface, config, &labels.subtotal, totals.subtotal, false)?;
    if totals.tax > 0.0 {
        let caption = rate_caption(&labels.tax, tax_rate);
        write_total(surface, config, &caption, totals.tax, false)?;
    }
    if totals.discount > 0.0 {
        let caption = rate_caption(&labels.discount, discount_rate);
        write_total(surface, config, &caption, totals.discount, false)?;
    }
    write_total(surface, config, &labels.total, totals.total, true)
}

fn write_total<S: Surface>(
    surface: &mut S,
    config: &InvoiceConfig<'_>,
    caption: &str,
    value: f64,
    emphasized: bool,
) -> Result<()> {
    const STEP: &str = "totals";

    surface.set_font(config.regular().name(), 9.0).drawing(STEP)?;
    surface.set_text_color(Rgb::grey(75));
    surface.set_x(RATE_COLUMN_X);
    surface.cell(caption).drawing(STEP)?;

    surface.set_text_color(Rgb::BLACK);
    surface.set_font_size(12.0).drawing(STEP)?;
    surface.set_x(AMOUNT_COLUMN_X);
    if emphasized {
        surface
            .set_font(config.bold().name(), TOTAL_AMOUNT_SIZE)
            .drawing(STEP)?;
    }
    surface
        .cell(&money(&config.currency().symbol, value))
        .drawing(STEP)?;
    surface.br(24.0);
    Ok(())
}

/// Draws the due date line below the totals.
pub fn write_due_date<S: Surface>(
    surface: &mut S,
    config: &InvoiceConfig<'_>,
    due_date: &str,
) -> Result<()> {
    const STEP: &str = "due date";

    surface.set_font(config.regular().name(), 9.0).drawing(STEP)?;
    surface.set_text_color(Rgb::grey(75));
    surface.set_x(RATE_COLUMN_X);
    surface.cell("Due Date").drawing(STEP)?;
    surface.set_text_color(Rgb::BLACK);
    surface.set_font_size(11.0).drawing(STEP)?;
    surface.set_x(AMOUNT_COLUMN_X);
    surface.cell(due_date).drawing(STEP)?;
    surface.br(12.0);
    Ok(())
}

/// Draws the invoice id and a divider rule at [`FOOTER_Y`].
pub fn write_footer<S: Surface>(surface: &mut S, config: &InvoiceConfig<'_>, id: &str) -> Result<()> {
    const STEP: &str = "footer";

    surface.set_y(FOOTER_Y);
    surface.set_font(config.regular().name(), 10.0).drawing(STEP)?;
    surface.set_text_color(Rgb::grey(55));
    surface.cell(id).drawing(STEP)?;
    surface.set_stroke_color(RULE_COLOR);
    let (x, y) = (surface.x(), surface.y());
    surface
        .line(x + 10.0, y + 6.0, FOOTER_RULE_END_X, y + 6.0)
        .drawing(STEP)?;
    surface.br(48.0);
    Ok(())
}
