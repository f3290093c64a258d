use std::io::Cursor;

use anyhow::{anyhow, Context, Result};
use eframe::egui;
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, ResizeOptions, Resizer};
use image::DynamicImage;
use zune_jpeg::JpegDecoder;

/// Largest edge of the preview thumbnail, in pixels.
pub const PREVIEW_MAX_SIDE: u32 = 128;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A file the user picked or dropped, exactly as it will be uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        self.mime_type
            .get(..6)
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case("image/"))
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes() as f64 / BYTES_PER_MB
    }
}

pub fn decode_image(file: &ImageFile) -> Result<DynamicImage> {
    let is_jpeg = file.mime_type.eq_ignore_ascii_case("image/jpeg")
        || file.mime_type.eq_ignore_ascii_case("image/jpg");

    if is_jpeg {
        // zune-jpeg is considerably faster for the common camera case
        if let Some(image) = decode_jpeg(&file.bytes) {
            return Ok(image);
        }
    }

    image::load_from_memory(&file.bytes).with_context(|| format!("Unable to decode {}", file.name))
}

fn decode_jpeg(bytes: &[u8]) -> Option<DynamicImage> {
    let mut decoder = JpegDecoder::new(Cursor::new(bytes));
    let pixels = decoder.decode().ok()?;
    let info = decoder.info()?;
    // Grayscale and CMYK output does not fit an RGB buffer, leave those to `image`
    image::RgbImage::from_raw(info.width as u32, info.height as u32, pixels)
        .map(DynamicImage::ImageRgb8)
}

/// Size of an image scaled down so that its longer edge is at most `max_side`.
pub fn thumbnail_size(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let width = width.max(1);
    let height = height.max(1);
    if width <= max_side && height <= max_side {
        return (width, height);
    }
    if width >= height {
        let scaled = (height as f64 * max_side as f64 / width as f64).round() as u32;
        (max_side, scaled.max(1))
    } else {
        let scaled = (width as f64 * max_side as f64 / height as f64).round() as u32;
        (scaled.max(1), max_side)
    }
}

pub fn thumbnail(image: &DynamicImage, max_side: u32) -> Result<DynamicImage> {
    let (new_w, new_h) = thumbnail_size(image.width(), image.height(), max_side);
    if (new_w, new_h) == (image.width(), image.height()) {
        return Ok(image.clone());
    }

    let rgba = image.to_rgba8();
    let src_image = Image::from_vec_u8(rgba.width(), rgba.height(), rgba.into_raw(), PixelType::U8x4)
        .context("Unable to wrap image for resizing")?;
    let mut dst_image = Image::new(new_w, new_h, PixelType::U8x4);
    Resizer::new()
        .resize(&src_image, &mut dst_image, &ResizeOptions::default())
        .context("Unable to resize preview")?;

    image::RgbaImage::from_raw(new_w, new_h, dst_image.into_vec())
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| anyhow!("Resized buffer has unexpected size"))
}

pub fn to_color_image(img: &DynamicImage) -> egui::ColorImage {
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels = rgba.into_raw();
    egui::ColorImage::from_rgba_unmultiplied(size, &pixels)
}
