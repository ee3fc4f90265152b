//! Mapping between the logical coordinate system and physical pixels.

use glamour::{Point2, Size2};

use crate::error::{Error, Result};

/// Smallest scale allowed, used when the screen has no area.
const MIN_SCALE: f32 = 0.001;

/// Uniform scale fitting a logical size inside the screen without distortion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Scaling {
    /// Logical pixels to physical pixels.
    pub(crate) scale: f32,
    /// Physical size of the surface showing the logical area.
    pub(crate) surface_size: Size2<u32>,
}

impl Scaling {
    /// Fit the logical size inside the screen size.
    ///
    /// The scale is rounded to three decimals.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSize`] when a logical dimension is not a positive finite number.
    pub(crate) fn fit(logical: Size2, screen: Size2) -> Result<Self> {
        if !is_valid_dimension(logical.width) || !is_valid_dimension(logical.height) {
            return Err(Error::InvalidSize {
                width: logical.width,
                height: logical.height,
            });
        }

        let scale = round3((screen.height / logical.height).min(screen.width / logical.width));
        let scale = if scale.is_finite() {
            scale.max(MIN_SCALE)
        } else {
            MIN_SCALE
        };

        let surface_size = Size2::new(
            (logical.width * scale).round() as u32,
            (logical.height * scale).round() as u32,
        );

        Ok(Self {
            scale,
            surface_size,
        })
    }

    /// Convert a point on the screen to logical coordinates.
    ///
    /// `origin` is the position of the surface on the screen.
    pub(crate) fn to_logical(self, physical: Point2, origin: Point2) -> Point2 {
        Point2::new(
            (physical.x - origin.x) / self.scale,
            (physical.y - origin.y) / self.scale,
        )
    }
}

/// Whether the value can be used as a logical width or height.
fn is_valid_dimension(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Round to three decimals.
fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use glamour::{Point2, Size2};

    use super::Scaling;
    use crate::error::Error;

    #[test]
    fn portrait_on_landscape() {
        let scaling = Scaling::fit(Size2::new(100.0, 175.0), Size2::new(800.0, 600.0)).unwrap();

        assert!((scaling.scale - 3.429).abs() < 1e-6);
        assert_eq!(scaling.surface_size, Size2::new(343, 600));
    }

    #[test]
    fn uses_smallest_axis() {
        for (logical, screen) in [
            ((320.0, 240.0), (1920.0, 1080.0)),
            ((16.0, 9.0), (1280.0, 720.0)),
            ((1000.0, 10.0), (500.0, 500.0)),
        ] {
            let logical = Size2::new(logical.0, logical.1);
            let screen = Size2::new(screen.0, screen.1);
            let scaling = Scaling::fit(logical, screen).unwrap();

            let expected = ((screen.height / logical.height).min(screen.width / logical.width)
                * 1000.0)
                .round()
                / 1000.0;
            assert!((scaling.scale - expected).abs() < 1e-6);
            assert!(scaling.surface_size.width as f32 <= screen.width + 1.0);
            assert!(scaling.surface_size.height as f32 <= screen.height + 1.0);
        }
    }

    #[test]
    fn empty_screen_keeps_positive_scale() {
        let scaling = Scaling::fit(Size2::new(100.0, 100.0), Size2::new(0.0, 0.0)).unwrap();

        assert!(scaling.scale > 0.0);
    }

    #[test]
    fn invalid_logical_size() {
        for (width, height) in [(0.0, 10.0), (10.0, -1.0), (f32::NAN, 10.0), (f32::INFINITY, 1.0)]
        {
            assert!(matches!(
                Scaling::fit(Size2::new(width, height), Size2::new(800.0, 600.0)),
                Err(Error::InvalidSize { .. })
            ));
        }
    }

    #[test]
    fn to_logical_removes_offset_and_scale() {
        let scaling = Scaling::fit(Size2::new(100.0, 100.0), Size2::new(200.0, 200.0)).unwrap();

        let logical = scaling.to_logical(Point2::new(60.0, 20.0), Point2::new(50.0, 0.0));

        assert_eq!(logical, Point2::new(5.0, 10.0));
    }
}
