use std::fs;
use std::path::{Path, PathBuf};

use easy_invoice::fonts::{self, FontSet};
use easy_invoice::{Currency, InvoiceRenderer, InvoiceRequest, Labels, LineItem};
use sha2::{Digest, Sha256};

fn load_fonts() -> Option<FontSet> {
    if !fonts::default_fonts_available() {
        eprintln!(
            "Skipping PDF rendering test: no fonts found. Set EASY_INVOICE_FONTS_DIR or install DejaVu Sans."
        );
        return None;
    }
    Some(FontSet::load_default().expect("load default fonts"))
}

fn sample_request(output: &Path) -> InvoiceRequest {
    InvoiceRequest::new(
        "Development Services",
        "DEV-001",
        "2025-04-20",
        "2025-06-01",
        "Client Company\\n42 Client Street\\nRome, Italy",
        output,
    )
    .with_note("Thank you for your business!".to_owned())
    .with_discount(0.10)
    .with_tax(0.15)
    .with_item(LineItem::new("Software Development Services", 100, 100.0))
}

fn render_sample(fonts: &FontSet, output: &Path) -> Vec<u8> {
    render_with_logo(fonts, None, output)
}

fn render_with_logo(fonts: &FontSet, logo: Option<PathBuf>, output: &Path) -> Vec<u8> {
    let (regular, bold, headline) = fonts.typefaces();
    let renderer = InvoiceRenderer::new(
        regular,
        bold,
        headline,
        Currency::new("EUR", "€"),
        Labels::default(),
        logo,
        "Test Company\\n123 Address Avenue\\nMilan, Italy",
    )
    .expect("renderer is valid");
    renderer
        .generate(&sample_request(output))
        .expect("render sample invoice")
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() && data[cursor] != terminator {
                    if terminator == b')'
                        || !matches!(data[cursor], b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t')
                    {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while let Some(start_pos) = data[offset..]
            .windows(start.len())
            .position(|window| window == start)
        {
            let start_index = offset + start_pos + start.len();
            let Some(end_pos) = data[start_index..]
                .windows(end.len())
                .position(|window| window == end)
            else {
                break;
            };
            for byte in &mut data[start_index..start_index + end_pos] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = start_index + end_pos + end.len();
        }
    }

    let mut normalized = bytes.to_vec();
    let text_tags: [&[u8]; 3] = [b"/CreationDate(", b"/ModDate(", b"/Producer("];
    for tag in text_tags {
        scrub_segment(&mut normalized, tag, b')');
    }
    scrub_segment(&mut normalized, b"/ID[", b']');
    let xml_tags: [(&[u8], &[u8]); 6] = [
        (b"<xmp:CreateDate>", b"</xmp:CreateDate>"),
        (b"<xmp:ModifyDate>", b"</xmp:ModifyDate>"),
        (b"<xmp:MetadataDate>", b"</xmp:MetadataDate>"),
        (b"<xmpMM:DocumentID>", b"</xmpMM:DocumentID>"),
        (b"<xmpMM:InstanceID>", b"</xmpMM:InstanceID>"),
        (b"<xmpMM:VersionID>", b"</xmpMM:VersionID>"),
    ];
    for (start, end) in xml_tags {
        scrub_xml(&mut normalized, start, end);
    }
    normalized
}

/// Width, height, color space and bits per component of every image XObject in `bytes`.
fn image_xobjects(bytes: &[u8]) -> Vec<(i64, i64, String, i64)> {
    let document = lopdf::Document::load_mem(bytes).expect("output is a valid PDF");
    document
        .objects
        .values()
        .filter_map(|object| match object {
            lopdf::Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        })
        .filter(|dict| {
            dict.get(b"Subtype")
                .and_then(|subtype| subtype.as_name())
                .map_or(false, |subtype| subtype == b"Image")
        })
        .map(|dict| {
            let integer = |key: &[u8]| dict.get(key).and_then(|value| value.as_i64()).unwrap();
            let color_space = dict
                .get(b"ColorSpace")
                .and_then(|value| value.as_name_str())
                .unwrap()
                .to_owned();
            (
                integer(b"Width"),
                integer(b"Height"),
                color_space,
                integer(b"BitsPerComponent"),
            )
        })
        .collect()
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(scrub_pdf(bytes)).into()
}

#[test]
fn writes_single_page_pdf_to_output_target() {
    let Some(fonts) = load_fonts() else { return };
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("invoice-DEV-001.pdf");

    let bytes = render_sample(&fonts, &output);
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(fs::read(&output).unwrap(), bytes);

    let document = lopdf::Document::load_mem(&bytes).expect("output is a valid PDF");
    assert_eq!(document.get_pages().len(), 1);
}

#[test]
fn rendering_is_deterministic() {
    let Some(fonts) = load_fonts() else { return };
    let dir = tempfile::tempdir().unwrap();

    let bytes_a = render_sample(&fonts, &dir.path().join("a.pdf"));
    let bytes_b = render_sample(&fonts, &dir.path().join("b.pdf"));

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn unwritable_output_target_is_an_emission_error() {
    let Some(fonts) = load_fonts() else { return };
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("missing-dir").join("invoice.pdf");

    let (regular, bold, headline) = fonts.typefaces();
    let renderer = InvoiceRenderer::new(
        regular,
        bold,
        headline,
        Currency::new("EUR", "€"),
        Labels::default(),
        None,
        "Test Company",
    )
    .unwrap();
    let err = renderer.generate(&sample_request(&output)).unwrap_err();
    assert!(matches!(err, easy_invoice::InvoiceError::OutputEmission { .. }));
}

#[test]
fn opaque_logo_is_embedded_as_rgb_image() {
    let Some(fonts) = load_fonts() else { return };
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    image::RgbImage::from_pixel(200, 100, image::Rgb([10, 20, 30]))
        .save(&logo)
        .unwrap();

    let bytes = render_with_logo(&fonts, Some(logo), &dir.path().join("invoice.pdf"));
    assert_eq!(
        image_xobjects(&bytes),
        [(200, 100, "DeviceRGB".to_owned(), 8)]
    );
}

#[test]
fn transparent_logo_is_flattened_to_rgb_image() {
    let Some(fonts) = load_fonts() else { return };
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    image::RgbaImage::new(200, 100).save(&logo).unwrap();

    let bytes = render_with_logo(&fonts, Some(logo), &dir.path().join("invoice.pdf"));
    assert_eq!(
        image_xobjects(&bytes),
        [(200, 100, "DeviceRGB".to_owned(), 8)]
    );
    let document = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(document.get_pages().len(), 1);
}
