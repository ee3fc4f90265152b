//! Software surface drawing into a pixel buffer.

use glamour::{Point2, Rect, Size2};
use imgref::ImgVec;

use crate::{assets::Image, surface::Surface};

/// In-memory [`Surface`] that can be passed around to rendering calls.
///
/// Pixels are stored as `0xAARRGGBB`, images are alpha blended on top of what's already drawn.
/// The desktop window uploads the buffer to the GPU when the frame is presented.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Pixel buffer.
    pixels: ImgVec<u32>,
    /// Position on the screen in device pixels.
    offset: Point2,
    /// Uniform scale applied to all draw calls.
    scale: f32,
    /// Whether to interpolate stretched images.
    smoothing: bool,
    /// Color areas are reset to when cleared.
    background_color: u32,
}

impl Canvas {
    /// Create a canvas filled with the background color.
    #[inline]
    #[must_use]
    pub fn new(size: Size2<u32>, background_color: u32) -> Self {
        Self {
            pixels: filled(size, background_color),
            offset: Point2::ZERO,
            scale: 1.0,
            smoothing: true,
            background_color,
        }
    }

    /// Move the canvas on the screen.
    #[inline]
    pub fn set_offset(&mut self, offset: Point2) {
        self.offset = offset;
    }

    /// Color of a single pixel, `None` when out of bounds.
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.pixels.width() as u32 || y >= self.pixels.height() as u32 {
            return None;
        }

        Some(self.pixels[(x as usize, y as usize)])
    }

    /// All pixels.
    #[inline]
    #[must_use]
    pub const fn pixels(&self) -> &ImgVec<u32> {
        &self.pixels
    }

    /// Convert a rectangle in logical coordinates to a clamped range of pixels.
    fn pixel_bounds(&self, area: Rect) -> Option<(usize, usize, usize, usize)> {
        let left = (area.origin.x * self.scale).round().max(0.0);
        let top = (area.origin.y * self.scale).round().max(0.0);
        let right = ((area.origin.x + area.size.width) * self.scale)
            .round()
            .min(self.pixels.width() as f32);
        let bottom = ((area.origin.y + area.size.height) * self.scale)
            .round()
            .min(self.pixels.height() as f32);

        (left < right && top < bottom).then_some((
            left as usize,
            top as usize,
            right as usize,
            bottom as usize,
        ))
    }
}

impl Surface for Canvas {
    #[inline]
    fn size(&self) -> Size2<u32> {
        Size2::new(self.pixels.width() as u32, self.pixels.height() as u32)
    }

    #[inline]
    fn set_size(&mut self, size: Size2<u32>) {
        if size == self.size() {
            return;
        }

        self.pixels = filled(size, self.background_color);
    }

    #[inline]
    fn offset(&self) -> Point2 {
        self.offset
    }

    #[inline]
    fn clear(&mut self, area: Rect) {
        profiling::scope!("Clear canvas");

        let Some((left, top, right, bottom)) = self.pixel_bounds(area) else {
            return;
        };

        for row in self.pixels.rows_mut().take(bottom).skip(top) {
            row[left..right].fill(self.background_color);
        }
    }

    #[inline]
    fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    fn draw_region(&mut self, image: &Image, source: Rect<u32>, destination: Rect) {
        profiling::scope!("Draw image region");

        if source.size.width == 0
            || source.size.height == 0
            || destination.size.width <= 0.0
            || destination.size.height <= 0.0
        {
            return;
        }

        let Some((left, top, right, bottom)) = self.pixel_bounds(destination) else {
            return;
        };

        // Destination rectangle in device pixels
        let dest_x = destination.origin.x * self.scale;
        let dest_y = destination.origin.y * self.scale;
        let step_x = source.size.width as f32 / (destination.size.width * self.scale);
        let step_y = source.size.height as f32 / (destination.size.height * self.scale);

        let region = Region::new(image, source);

        for y in top..bottom {
            // Sample at the center of the pixel
            let v = (y as f32 + 0.5 - dest_y) * step_y;
            for x in left..right {
                let u = (x as f32 + 0.5 - dest_x) * step_x;

                let color = if self.smoothing {
                    region.bilinear(u, v)
                } else {
                    region.nearest(u, v)
                };

                let target = &mut self.pixels[(x, y)];
                *target = blend(color, *target);
            }
        }
    }

    #[inline]
    fn set_smoothing(&mut self, smoothing: bool) {
        self.smoothing = smoothing;
    }
}

/// Part of an image being sampled, coordinates are relative to the region.
struct Region<'image> {
    image: &'image Image,
    source: Rect<u32>,
}

impl<'image> Region<'image> {
    fn new(image: &'image Image, source: Rect<u32>) -> Self {
        Self { image, source }
    }

    /// Color at a whole pixel of the region, clamped to its edges.
    fn texel(&self, x: i64, y: i64) -> u32 {
        let x = x.clamp(0, i64::from(self.source.size.width) - 1) as u32;
        let y = y.clamp(0, i64::from(self.source.size.height) - 1) as u32;

        // Regions reaching outside of the image are transparent there
        self.source
            .origin
            .x
            .checked_add(x)
            .zip(self.source.origin.y.checked_add(y))
            .and_then(|(x, y)| self.image.pixel(x, y))
            .unwrap_or(0)
    }

    /// Pixel the position falls in.
    fn nearest(&self, u: f32, v: f32) -> u32 {
        self.texel(u.floor() as i64, v.floor() as i64)
    }

    /// Weighted average of the four pixels surrounding the position.
    fn bilinear(&self, u: f32, v: f32) -> u32 {
        let u = u - 0.5;
        let v = v - 0.5;
        let x = u.floor();
        let y = v.floor();
        let fx = u - x;
        let fy = v - y;
        let (x, y) = (x as i64, y as i64);

        let top = lerp(self.texel(x, y), self.texel(x + 1, y), fx);
        let bottom = lerp(self.texel(x, y + 1), self.texel(x + 1, y + 1), fx);

        lerp(top, bottom, fy)
    }
}

/// Buffer of a single color.
fn filled(size: Size2<u32>, color: u32) -> ImgVec<u32> {
    let (width, height) = (size.width as usize, size.height as usize);

    ImgVec::new(vec![color; width * height], width, height)
}

/// Split a color into its `[a, r, g, b]` channels.
const fn channels(color: u32) -> [u8; 4] {
    color.to_be_bytes()
}

/// Interpolate every channel between two colors.
fn lerp(a: u32, b: u32, t: f32) -> u32 {
    let a = channels(a);
    let b = channels(b);

    u32::from_be_bytes(std::array::from_fn(|index| {
        (f32::from(a[index]) + (f32::from(b[index]) - f32::from(a[index])) * t).round() as u8
    }))
}

/// Draw a color over another with alpha.
fn blend(source: u32, target: u32) -> u32 {
    let [alpha, ..] = channels(source);
    match alpha {
        0 => target,
        255 => source,
        _ => {
            let source = channels(source);
            let target = channels(target);

            let alpha = f32::from(alpha) / 255.0;
            let target_alpha = f32::from(target[0]) / 255.0;
            let out_alpha = alpha + target_alpha * (1.0 - alpha);

            let channel = |index: usize| {
                let mixed = f32::from(source[index]) * alpha
                    + f32::from(target[index]) * target_alpha * (1.0 - alpha);

                (mixed / out_alpha).round() as u8
            };

            u32::from_be_bytes([
                (out_alpha * 255.0).round() as u8,
                channel(1),
                channel(2),
                channel(3),
            ])
        }
    }
}
