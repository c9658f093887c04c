mod config;

use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use easy_invoice::recording::RecordingSurface;
use easy_invoice::InvoiceRenderer;
use log::info;

use crate::config::{InvoiceFile, TEMPLATE};

/// Renders invoices described in TOML files to PDF.
///
/// Fonts are read from the `[fonts]` table of the invoice file, or from the directory named by
/// `EASY_INVOICE_FONTS_DIR` when the table is missing.
#[derive(Parser)]
#[command(author, version, about = "Render invoices to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an invoice file to PDF.
    Render {
        /// Invoice description in TOML format.
        file: PathBuf,

        /// Write the PDF here instead of the path configured in the file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the drawing commands as JSON instead of writing a PDF.
        #[arg(long)]
        dry_run: bool,
    },

    /// Write a starter invoice file.
    #[command(aliases = ["new"])]
    Init {
        /// Destination of the new file.
        #[arg(default_value = "invoice.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            file,
            output,
            dry_run,
        } => render(&file, output, dry_run),
        Commands::Init { path, force } => init(&path, force),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn render(file: &Path, output: Option<PathBuf>, dry_run: bool) -> Result<(), Box<dyn Error>> {
    let invoice = InvoiceFile::load(file)?;
    let fonts = invoice.load_fonts()?;
    let (regular, bold, headline) = fonts.typefaces();

    let renderer = InvoiceRenderer::new(
        regular,
        bold,
        headline,
        invoice.currency.clone(),
        invoice.labels.clone(),
        invoice.logo(),
        invoice.sender.from.as_str(),
    )?;
    let request = invoice.request(output);

    if dry_run {
        let mut surface = RecordingSurface::new();
        let bytes = renderer.generate_on(&mut surface, &request)?;
        io::stdout().write_all(&bytes)?;
        println!();
        return Ok(());
    }

    let bytes = renderer.generate(&request)?;
    println!(
        "Generated {} ({} bytes)",
        request.output().display(),
        bytes.len()
    );
    Ok(())
}

fn init(path: &Path, force: bool) -> Result<(), Box<dyn Error>> {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        )
        .into());
    }
    fs::write(path, TEMPLATE)?;
    info!("wrote starter invoice file to {}", path.display());
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
