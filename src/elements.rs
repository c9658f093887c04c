//! Image helpers used for the sender logo.
//!
//! Decoding is delegated to the [`image`] crate. The layout only needs the pixel dimensions to
//! scale the logo; the PDF surface decodes the full image when embedding it.

use std::path::Path;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

use crate::error::{InvoiceError, Result};

/// Drawn width of the logo in points. The height follows the image's aspect ratio.
pub const LOGO_WIDTH_PT: f64 = 50.0;

/// Reads the pixel width and height of the image at `path` without decoding the pixel data.
pub fn image_dimensions(path: impl AsRef<Path>) -> Result<(u32, u32)> {
    let path = path.as_ref();
    image::image_dimensions(path).map_err(|source| InvoiceError::ImageDecode {
        path: path.display().to_string(),
        source,
    })
}

/// Loads and decodes the image at `path`, guessing the format from its contents.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage> {
    let path = path.as_ref();
    let decode_error = |source| InvoiceError::ImageDecode {
        path: path.display().to_string(),
        source,
    };
    image::io::Reader::open(path)
        .map_err(|err| decode_error(image::ImageError::IoError(err)))?
        .with_guessed_format()
        .map_err(|err| decode_error(image::ImageError::IoError(err)))?
        .decode()
        .map_err(decode_error)
}

/// Converts `image` into a pixel layout a PDF image XObject can carry directly.
///
/// 8-bit greyscale and RGB images pass through unchanged. Transparent pixels are composited onto
/// white and everything else is converted to 8-bit RGB.
pub fn flatten_for_pdf(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
        image if image.color().has_alpha() => {
            let (width, height) = image.dimensions();
            let rgba = image.to_rgba8();
            DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
                let [r, g, b, a] = rgba.get_pixel(x, y).0;
                Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
            }))
        }
        image => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (channel, alpha) = (u32::from(channel), u32::from(alpha));
    ((channel * alpha + 255 * (255 - alpha) + 127) / 255) as u8
}

/// Returns the drawn logo size for an image of `width` × `height` pixels.
pub fn scaled_logo_size(width: u32, height: u32) -> (f64, f64) {
    if width == 0 {
        return (LOGO_WIDTH_PT, 0.0);
    }
    let scaled_height = f64::from(height) * LOGO_WIDTH_PT / f64::from(width);
    (LOGO_WIDTH_PT, scaled_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logo_keeps_aspect_ratio() {
        assert_eq!(scaled_logo_size(200, 100), (50.0, 25.0));
        assert_eq!(scaled_logo_size(100, 300), (50.0, 150.0));
    }

    #[test]
    fn zero_width_image_does_not_divide_by_zero() {
        assert_eq!(scaled_logo_size(0, 10), (50.0, 0.0));
    }

    #[test]
    fn transparent_pixels_are_composited_onto_white() {
        let mut rgba = image::RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, image::Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, image::Rgba([200, 100, 0, 255]));

        let flattened = flatten_for_pdf(DynamicImage::ImageRgba8(rgba));
        let rgb = match flattened {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => panic!("expected an RGB image, got {:?}", other.color()),
        };
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [200, 100, 0]);
    }

    #[test]
    fn half_transparent_black_becomes_grey() {
        let rgba = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 128]));
        let flattened = flatten_for_pdf(DynamicImage::ImageRgba8(rgba)).to_rgb8();
        assert_eq!(flattened.get_pixel(0, 0).0, [127, 127, 127]);
    }

    #[test]
    fn opaque_images_keep_their_layout() {
        let grey = DynamicImage::ImageLuma8(image::GrayImage::new(3, 3));
        assert!(matches!(flatten_for_pdf(grey), DynamicImage::ImageLuma8(_)));

        let grey_alpha = DynamicImage::ImageLumaA8(image::GrayAlphaImage::new(3, 3));
        assert!(matches!(flatten_for_pdf(grey_alpha), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn missing_file_is_an_image_decode_error() {
        let err = image_dimensions("/__easy_invoice_missing_logo__.png").unwrap_err();
        assert!(matches!(err, InvoiceError::ImageDecode { .. }));
    }
}
