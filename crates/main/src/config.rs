//! TOML invoice files read by the command line front end.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use easy_invoice::fonts::{FontSet, DEFAULT_FONT_FILES};
use easy_invoice::{Currency, InvoiceRequest, Labels, LineItem};
use serde::Deserialize;

/// Starter file written by `easy-invoice init`.
pub const TEMPLATE: &str = include_str!("../templates/invoice.toml");

#[derive(Debug, Deserialize)]
pub struct InvoiceFile {
    pub sender: SenderSection,
    #[serde(default)]
    pub fonts: Option<FontsSection>,
    pub currency: Currency,
    #[serde(default)]
    pub labels: Labels,
    pub invoice: InvoiceSection,
    /// Directory of the file itself; relative paths are resolved against it.
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct SenderSection {
    pub from: String,
    #[serde(default)]
    pub logo: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct FontsSection {
    pub directory: PathBuf,
    #[serde(default = "default_regular")]
    pub regular: String,
    #[serde(default = "default_bold")]
    pub bold: String,
    #[serde(default = "default_headline")]
    pub headline: String,
}

fn default_regular() -> String {
    DEFAULT_FONT_FILES[0].to_owned()
}

fn default_bold() -> String {
    DEFAULT_FONT_FILES[1].to_owned()
}

fn default_headline() -> String {
    DEFAULT_FONT_FILES[2].to_owned()
}

#[derive(Debug, Deserialize)]
pub struct InvoiceSection {
    pub title: String,
    pub id: String,
    pub issue_date: String,
    pub due_date: String,
    pub to: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl InvoiceFile {
    /// Reads and parses the invoice file at `path`.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)
            .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
        let mut file = Self::parse(&content)
            .map_err(|err| format!("failed to parse {}: {}", path.display(), err))?;
        file.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(file)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Logo path resolved against the file's directory.
    pub fn logo(&self) -> Option<PathBuf> {
        self.sender.logo.as_deref().map(|logo| self.resolve(logo))
    }

    /// Loads the configured fonts, or the default fonts when the file has no `[fonts]` table.
    pub fn load_fonts(&self) -> Result<FontSet, easy_invoice::InvoiceError> {
        match &self.fonts {
            Some(fonts) => FontSet::load(
                self.resolve(&fonts.directory),
                [
                    fonts.regular.as_str(),
                    fonts.bold.as_str(),
                    fonts.headline.as_str(),
                ],
            ),
            None => FontSet::load_default(),
        }
    }

    /// Builds the generation request, writing to `output` when given.
    pub fn request(&self, output: Option<PathBuf>) -> InvoiceRequest {
        let invoice = &self.invoice;
        let output = output
            .or_else(|| invoice.output.as_deref().map(|path| self.resolve(path)))
            .unwrap_or_else(|| PathBuf::from(format!("invoice-{}.pdf", invoice.id)));

        InvoiceRequest::new(
            invoice.title.as_str(),
            invoice.id.as_str(),
            invoice.issue_date.as_str(),
            invoice.due_date.as_str(),
            invoice.to.as_str(),
            output,
        )
        .with_note(invoice.note.clone())
        .with_discount(invoice.discount)
        .with_tax(invoice.tax)
        .with_items(invoice.items.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses() {
        let file = InvoiceFile::parse(TEMPLATE).expect("template parses");
        assert_eq!(file.currency.symbol, "€");
        assert_eq!(file.labels, Labels::default());
        assert_eq!(file.invoice.items.len(), 1);
        assert_eq!(file.invoice.items[0].quantity, 100);
    }

    #[test]
    fn template_keeps_literal_line_breaks() {
        let file = InvoiceFile::parse(TEMPLATE).unwrap();
        assert!(file.sender.from.contains("\\n"));
        assert!(!file.sender.from.contains('\n'));
    }

    #[test]
    fn request_uses_override_then_file_then_id() {
        let mut file = InvoiceFile::parse(TEMPLATE).unwrap();
        let request = file.request(Some(PathBuf::from("override.pdf")));
        assert_eq!(request.output(), Path::new("override.pdf"));
        assert_eq!(request.discount(), 0.10);
        assert_eq!(request.tax(), 0.15);

        file.invoice.output = None;
        let request = file.request(None);
        assert_eq!(request.output(), Path::new("invoice-DEV-001.pdf"));
    }

    #[test]
    fn relative_paths_resolve_against_file_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.toml");
        fs::write(&path, TEMPLATE).unwrap();

        let file = InvoiceFile::load(&path).unwrap();
        assert_eq!(file.logo(), Some(dir.path().join("assets/logo.png")));
    }
}
