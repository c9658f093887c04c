//! Locating and loading the three typefaces an invoice is drawn with.
//!
//! The renderer only borrows font data, so something has to own it. [`FontSet`] reads the files once
//! and hands out [`Typeface`] views for as long as it lives.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{InvoiceError, Result};
use crate::model::Typeface;
use crate::surface::SurfaceError;

/// Environment variable that overrides the font search path.
pub const FONTS_DIR_ENV: &str = "EASY_INVOICE_FONTS_DIR";

/// File names looked up by [`FontSet::load_default`], in regular, bold, headline order.
pub const DEFAULT_FONT_FILES: [&str; 3] = ["Go-Regular.ttf", "Go-Medium.ttf", "Go-Bold.ttf"];

/// Sans-serif families commonly installed on Linux, tried when no search path entry has the
/// default files.
const SYSTEM_FONT_SETS: [(&str, [&str; 3]); 3] = [
    (
        "/usr/share/fonts/truetype/dejavu",
        ["DejaVuSans.ttf", "DejaVuSans-Bold.ttf", "DejaVuSans-Bold.ttf"],
    ),
    (
        "/usr/share/fonts/dejavu",
        ["DejaVuSans.ttf", "DejaVuSans-Bold.ttf", "DejaVuSans-Bold.ttf"],
    ),
    (
        "/usr/share/fonts/truetype/liberation",
        [
            "LiberationSans-Regular.ttf",
            "LiberationSans-Bold.ttf",
            "LiberationSans-Bold.ttf",
        ],
    ),
];

/// A directory together with the regular, bold and headline file names to load from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontSource {
    pub directory: PathBuf,
    pub files: [&'static str; 3],
}

/// One owned font file.
#[derive(Clone, Debug)]
pub struct FontFile {
    name: String,
    data: Vec<u8>,
}

impl FontFile {
    /// Reads the font at `path`, naming it after the file stem.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = fs::read(path).map_err(|err| InvoiceError::TypefaceRegistration {
            name: name.clone(),
            source: SurfaceError::with_source(format!("cannot read {}", path.display()), err),
        })?;
        debug!("loaded font file {} ({} bytes)", path.display(), data.len());
        Ok(Self { name, data })
    }

    pub fn typeface(&self) -> Typeface<'_> {
        Typeface::new(&self.name, &self.data)
    }
}

/// The regular, bold and headline fonts of an invoice.
#[derive(Clone, Debug)]
pub struct FontSet {
    pub regular: FontFile,
    pub bold: FontFile,
    pub headline: FontFile,
}

impl FontSet {
    /// Loads the three fonts from `directory`.
    pub fn load(directory: impl AsRef<Path>, files: [&str; 3]) -> Result<Self> {
        let directory = directory.as_ref();
        let [regular, bold, headline] = files;
        Ok(Self {
            regular: FontFile::load(directory.join(regular))?,
            bold: FontFile::load(directory.join(bold))?,
            headline: FontFile::load(directory.join(headline))?,
        })
    }

    /// Loads the fonts found by [`resolve_font_source`].
    pub fn load_default() -> Result<Self> {
        let source = resolve_font_source()?;
        Self::load(&source.directory, source.files)
    }

    /// Returns the regular, bold and headline typefaces.
    pub fn typefaces(&self) -> (Typeface<'_>, Typeface<'_>, Typeface<'_>) {
        (
            self.regular.typeface(),
            self.bold.typeface(),
            self.headline.typeface(),
        )
    }
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env::var_os(FONTS_DIR_ENV) {
        if !path.is_empty() {
            candidates.push(PathBuf::from(path));
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            candidates.push(bin_dir.join("assets/fonts"));
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path, files: [&'static str; 3]) -> Vec<&'static str> {
    files
        .iter()
        .copied()
        .filter(|name| !path.join(name).is_file())
        .collect()
}

fn font_source_candidates() -> Vec<FontSource> {
    let search_path = font_directory_candidates()
        .into_iter()
        .map(|directory| FontSource {
            directory,
            files: DEFAULT_FONT_FILES,
        });
    let system = SYSTEM_FONT_SETS
        .iter()
        .map(|(directory, files)| FontSource {
            directory: PathBuf::from(directory),
            files: *files,
        });
    search_path.chain(system).collect()
}

/// Finds the first candidate directory containing all three of its font files.
///
/// The search path holding [`DEFAULT_FONT_FILES`] is tried first, then well-known system font
/// directories.
pub fn resolve_font_source() -> Result<FontSource> {
    let mut attempts = Vec::new();

    for candidate in font_source_candidates() {
        if !candidate.directory.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.directory.display()));
            continue;
        }
        let missing = missing_font_files(&candidate.directory, candidate.files);
        if missing.is_empty() {
            debug!("using fonts from {}", candidate.directory.display());
            return Ok(candidate);
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.directory.display(),
            missing.join(", ")
        ));
    }

    Err(InvoiceError::TypefaceRegistration {
        name: DEFAULT_FONT_FILES.join(", "),
        source: SurfaceError::new(format!(
            "unable to locate the font directory; checked: {}. Set {} to a directory containing the fonts",
            attempts.join(", "),
            FONTS_DIR_ENV
        )),
    })
}

/// Indicates whether any usable font set can be found.
pub fn default_fonts_available() -> bool {
    resolve_font_source().is_ok()
}
