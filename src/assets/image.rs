//! Decoded images.

use std::io::Cursor;

use imgref::ImgVec;
use png::{BitDepth, ColorType, Decoder, Transformations};

use crate::error::BoxedError;

/// Decoded image resource.
///
/// Pixels are stored as `0xAARRGGBB`.
/// Shared between every [`super::ImageAsset`] registered from the same source path.
#[derive(Debug, Clone)]
pub struct Image {
    /// Pixel data.
    pixels: ImgVec<u32>,
}

impl Image {
    /// Wrap already decoded pixels.
    #[inline]
    #[must_use]
    pub const fn new(pixels: ImgVec<u32>) -> Self {
        Self { pixels }
    }

    /// Create an image filled with a single color.
    #[inline]
    #[must_use]
    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        let pixels = ImgVec::new(
            vec![color; width as usize * height as usize],
            width as usize,
            height as usize,
        );

        Self { pixels }
    }

    /// Decode a PNG.
    ///
    /// # Errors
    ///
    /// - When the bytes are not a valid PNG.
    /// - When the PNG can't be converted to 8 bit colors with an alpha channel.
    #[inline]
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, BoxedError> {
        decode_png(bytes).map(Self::new)
    }

    /// Natural width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width() as u32
    }

    /// Natural height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height() as u32
    }

    /// Color of a single pixel, `None` when out of bounds.
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }

        Some(self.pixels[(x as usize, y as usize)])
    }

    /// Raw pixel data.
    #[inline]
    #[must_use]
    pub const fn pixels(&self) -> &ImgVec<u32> {
        &self.pixels
    }
}

/// Decode a PNG into `0xAARRGGBB` pixels.
fn decode_png(bytes: &[u8]) -> Result<ImgVec<u32>, BoxedError> {
    // Decode the PNG
    let mut decoder = Decoder::new(Cursor::new(bytes));

    // Discard text chunks
    decoder.set_ignore_text_chunk(true);

    // Convert indexed images and images without alpha to 8 bit with alpha
    decoder.set_transformations(Transformations::normalize_to_color8() | Transformations::ALPHA);

    // Start parsing the PNG
    let mut reader = decoder.read_info()?;

    let (color_type, bits) = reader.output_color_type();
    if bits != BitDepth::Eight {
        return Err(format!("PNG has unsupported bit depth {bits:?}").into());
    }

    // Read the PNG
    let mut buf = vec![0_u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let bytes = &buf[..info.buffer_size()];

    let pixels = match color_type {
        ColorType::Rgba => bytes
            .chunks_exact(4)
            .map(|rgba| u32::from_le_bytes([rgba[2], rgba[1], rgba[0], rgba[3]]))
            .collect::<Vec<_>>(),
        ColorType::GrayscaleAlpha => bytes
            .chunks_exact(2)
            .map(|ga| u32::from_le_bytes([ga[0], ga[0], ga[0], ga[1]]))
            .collect::<Vec<_>>(),
        other => return Err(format!("PNG has unsupported color type {other:?}").into()),
    };

    Ok(ImgVec::new(
        pixels,
        info.width as usize,
        info.height as usize,
    ))
}
