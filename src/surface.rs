//! Drawing surface the game renders frames on.

use std::ops::{Deref, DerefMut};

use glamour::{Point2, Rect, Size2};

use crate::assets::Image;

/// Platform drawing capability bound to a single on-screen target.
///
/// All coordinates passed to the drawing methods are multiplied by the scale set with [`Self::set_uniform_scale`].
///
/// [`crate::Canvas`] is a software implementation keeping the pixels in memory.
pub trait Surface {
    /// Size of the surface in physical pixels.
    fn size(&self) -> Size2<u32>;

    /// Resize the surface, this discards its contents.
    fn set_size(&mut self, size: Size2<u32>);

    /// Position of the top-left corner of the surface on the screen in device pixels.
    fn offset(&self) -> Point2;

    /// Reset an area of the surface to its background.
    fn clear(&mut self, area: Rect);

    /// Set the uniform scale applied to all following draw calls.
    ///
    /// A scale of `1.0` is the identity transform.
    fn set_uniform_scale(&mut self, scale: f32);

    /// Draw a region of an image stretched into a destination rectangle.
    fn draw_region(&mut self, image: &Image, source: Rect<u32>, destination: Rect);

    /// Enable or disable interpolation when images are stretched.
    fn set_smoothing(&mut self, smoothing: bool);

    /// Show the drawn frame on the screen.
    ///
    /// Called once at the end of every frame after the transform is restored.
    #[inline]
    fn present(&mut self) {}
}

/// Surface with a uniform scale applied for as long as the guard lives.
///
/// Dropping the guard restores the identity transform, also when the frame failed.
pub(crate) struct ScaledSurface<'surface> {
    /// Scaled surface.
    surface: &'surface mut dyn Surface,
}

impl<'surface> ScaledSurface<'surface> {
    /// Apply the scale.
    pub(crate) fn new(surface: &'surface mut dyn Surface, scale: f32) -> Self {
        surface.set_uniform_scale(scale);

        Self { surface }
    }
}

impl<'surface> Deref for ScaledSurface<'surface> {
    type Target = dyn Surface + 'surface;

    fn deref(&self) -> &Self::Target {
        self.surface
    }
}

impl<'surface> DerefMut for ScaledSurface<'surface> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.surface
    }
}

impl Drop for ScaledSurface<'_> {
    fn drop(&mut self) {
        self.surface.set_uniform_scale(1.0);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use glamour::{Point2, Rect, Size2};

    use super::{ScaledSurface, Surface};
    use crate::assets::Image;

    /// Call made on a [`RecordingSurface`].
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        SetSize(Size2<u32>),
        Clear(Rect),
        Scale(f32),
        Draw { source: Rect<u32>, destination: Rect },
        Smoothing(bool),
        Present,
    }

    /// Surface remembering every call made on it.
    #[derive(Debug)]
    pub(crate) struct RecordingSurface {
        pub(crate) size: Size2<u32>,
        pub(crate) offset: Point2,
        pub(crate) scale: f32,
        pub(crate) calls: Vec<Call>,
    }

    impl RecordingSurface {
        pub(crate) fn new(width: u32, height: u32) -> Self {
            Self {
                size: Size2::new(width, height),
                offset: Point2::ZERO,
                scale: 1.0,
                calls: Vec::new(),
            }
        }
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> Size2<u32> {
            self.size
        }

        fn set_size(&mut self, size: Size2<u32>) {
            self.size = size;
            self.calls.push(Call::SetSize(size));
        }

        fn offset(&self) -> Point2 {
            self.offset
        }

        fn clear(&mut self, area: Rect) {
            self.calls.push(Call::Clear(area));
        }

        fn set_uniform_scale(&mut self, scale: f32) {
            self.scale = scale;
            self.calls.push(Call::Scale(scale));
        }

        fn draw_region(&mut self, _image: &Image, source: Rect<u32>, destination: Rect) {
            self.calls.push(Call::Draw {
                source,
                destination,
            });
        }

        fn set_smoothing(&mut self, smoothing: bool) {
            self.calls.push(Call::Smoothing(smoothing));
        }

        fn present(&mut self) {
            self.calls.push(Call::Present);
        }
    }

    #[test]
    fn guard_restores_identity() {
        let mut surface = RecordingSurface::new(10, 10);

        {
            let mut scaled = ScaledSurface::new(&mut surface, 2.5);
            scaled.clear(Rect::new(Point2::ZERO, Size2::new(1.0, 1.0)));
        }

        assert!((surface.scale - 1.0).abs() < f32::EPSILON);
        assert_eq!(surface.calls.first(), Some(&Call::Scale(2.5)));
        assert_eq!(surface.calls.last(), Some(&Call::Scale(1.0)));
    }
}
