//! Game configuration.

use std::{path::PathBuf, time::Duration};

use glamour::Size2;

/// Initial game configuration passed to [`crate::run`] and [`crate::Game::new`].
///
/// There's two ways to initialize the config:
///
/// # Example
///
/// ```rust
/// # use wildflower::Config;
/// Config {
///   title: "My Game".to_owned(),
///   ..Default::default()
/// };
/// ```
///
/// # Example
///
/// ```rust
/// # use wildflower::Config;
/// Config::default().with_title("My Game");
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::exhaustive_structs, clippy::struct_excessive_bools)]
pub struct Config {
    /// Name in the title bar.
    ///
    /// Defaults to `"Wildflower"`.
    pub title: String,
    /// Requested size of the window in logical window pixels.
    ///
    /// Defaults to `(800.0, 600.0)`.
    pub window_size: Size2,
    /// Size of the coordinate system the views draw in and receive input in.
    ///
    /// `None` uses the physical size of the screen.
    ///
    /// Defaults to `None`.
    pub logical_size: Option<Size2>,
    /// Time between two ticks of the frame loop.
    ///
    /// Defaults to `100ms`.
    pub frame_interval: Duration,
    /// Whether [`crate::initialize`] starts the frame loop after mounting the first view.
    ///
    /// When disabled frames are only drawn when [`crate::Game::frame`] is called.
    ///
    /// Defaults to `true`.
    pub start_loop: bool,
    /// Rescale and redraw automatically when the screen is resized.
    ///
    /// Defaults to `true`.
    pub auto_resize: bool,
    /// Draw images without smoothing, for crisp pixel art.
    ///
    /// Defaults to `false`.
    pub pixel_mode: bool,
    /// Color the surface is cleared with every frame.
    ///
    /// Defaults to `0xFF000000` (black).
    pub background_color: u32,
    /// Color of the viewport.
    ///
    /// The viewport is the letterboxed area outside of the surface when inside a bigger window.
    ///
    /// Defaults to `0xFF202020` (dark gray).
    pub viewport_color: u32,
    /// Directory the desktop asset loader resolves paths in.
    ///
    /// Defaults to `"assets"`.
    pub asset_dir: PathBuf,
}

impl Config {
    /// Set the name in the title bar.
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();

        self
    }

    /// Set the requested window size.
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, window_size: impl Into<Size2>) -> Self {
        self.window_size = window_size.into();

        self
    }

    /// Set the size of the coordinate system the views use.
    #[inline]
    #[must_use]
    pub fn with_logical_size(mut self, logical_size: impl Into<Size2>) -> Self {
        self.logical_size = Some(logical_size.into());

        self
    }

    /// Set the time between two ticks of the frame loop.
    #[inline]
    #[must_use]
    pub const fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;

        self
    }

    /// Set whether [`crate::initialize`] starts the frame loop.
    #[inline]
    #[must_use]
    pub const fn with_start_loop(mut self, start_loop: bool) -> Self {
        self.start_loop = start_loop;

        self
    }

    /// Set whether to rescale and redraw when the screen is resized.
    #[inline]
    #[must_use]
    pub const fn with_auto_resize(mut self, auto_resize: bool) -> Self {
        self.auto_resize = auto_resize;

        self
    }

    /// Set whether images are drawn without smoothing.
    #[inline]
    #[must_use]
    pub const fn with_pixel_mode(mut self, pixel_mode: bool) -> Self {
        self.pixel_mode = pixel_mode;

        self
    }

    /// Set the color the surface is cleared with every frame.
    #[inline]
    #[must_use]
    pub const fn with_background_color(mut self, background_color: u32) -> Self {
        self.background_color = background_color;

        self
    }

    /// Set the color of the letterboxed area around the surface.
    #[inline]
    #[must_use]
    pub const fn with_viewport_color(mut self, viewport_color: u32) -> Self {
        self.viewport_color = viewport_color;

        self
    }

    /// Set the directory assets are loaded from on desktop.
    #[inline]
    #[must_use]
    pub fn with_asset_dir(mut self, asset_dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = asset_dir.into();

        self
    }
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            title: "Wildflower".to_owned(),
            window_size: Size2::new(800.0, 600.0),
            logical_size: None,
            frame_interval: Duration::from_millis(100),
            start_loop: true,
            auto_resize: true,
            pixel_mode: false,
            background_color: 0xFF00_0000,
            viewport_color: 0xFF20_2020,
            asset_dir: PathBuf::from("assets"),
        }
    }
}

/// Logical size requested by [`crate::Game::resize`].
///
/// Every dimension left `None` falls back to the physical screen dimension.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct ResizeOptions {
    /// Width of the logical coordinate system.
    ///
    /// Defaults to the screen width.
    pub logical_width: Option<f32>,
    /// Height of the logical coordinate system.
    ///
    /// Defaults to the screen height.
    pub logical_height: Option<f32>,
}

impl ResizeOptions {
    /// Request both logical dimensions.
    #[inline]
    #[must_use]
    pub const fn new(logical_width: f32, logical_height: f32) -> Self {
        Self {
            logical_width: Some(logical_width),
            logical_height: Some(logical_height),
        }
    }
}

impl From<Size2> for ResizeOptions {
    #[inline]
    fn from(size: Size2) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Region of a source image registered by [`crate::assets::AssetCache::register_image`].
///
/// Allows slicing sprites out of a spritesheet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct ImageOptions {
    /// Horizontal pixel offset on the source image.
    ///
    /// Defaults to `0`.
    pub left: u32,
    /// Vertical pixel offset on the source image.
    ///
    /// Defaults to `0`.
    pub top: u32,
    /// Width of the region.
    ///
    /// Defaults to the remaining width of the source image right of `left`.
    pub width: Option<u32>,
    /// Height of the region.
    ///
    /// Defaults to the remaining height of the source image below `top`.
    pub height: Option<u32>,
}

impl ImageOptions {
    /// Use an exact rectangle of the source image.
    #[inline]
    #[must_use]
    pub const fn region(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width: Some(width),
            height: Some(height),
        }
    }

    /// Start the region at an offset, extending to the edges of the source image.
    #[inline]
    #[must_use]
    pub const fn with_offset(mut self, left: u32, top: u32) -> Self {
        self.left = left;
        self.top = top;

        self
    }
}

/// Target size of [`crate::assets::AssetCache::draw`].
///
/// Every dimension left `None` uses the size of the asset region.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct DrawOptions {
    /// Width on the surface in logical pixels.
    pub width: Option<f32>,
    /// Height on the surface in logical pixels.
    pub height: Option<f32>,
}

impl DrawOptions {
    /// Draw with an exact size.
    #[inline]
    #[must_use]
    pub const fn sized(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }
}
