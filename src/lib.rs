#![forbid(unsafe_code)]

//! AGPL licensed minimal game loop for 2D games drawn in a logical coordinate system.
//!
//! # Features
//!
//! - A single active [`View`] per screen, with hooks for starting, input and drawing frames.
//! - Logical resolution independent of the screen, letterboxed with a uniform scale so nothing is distorted.
//! - Key-addressed asset cache, images sharing a source path are only loaded once so spritesheets can be sliced into many assets.
//! - PNG images and OGG audio playback.
//! - Frame loop on a timer that keeps a fixed interval between the end of a frame and the start of the next.
//!
//! # Goals
//!
//! - Small API that's quick to learn, especially for game jams.
//! - Every platform capability behind a trait, so the game can be driven by tests or another host.
//!
//! # Non-Goals
//!
//! - 3D, physics or a scene graph.
//! - Multiple windows or displays.
//!
//! # Usage
//!
//! There is a single trait [`View`] whose hooks all have default implementations, only override the ones your screen needs.
//! On desktop the game is started with [`run`], other hosts construct the game with [`initialize`] and drive it themselves.
//!
//! ```
//! use glamour::{Point2, Size2};
//! use wildflower::{
//!     config::{Config, DrawOptions, ImageOptions},
//!     task, Game, HookResult, KeyKind, Surface, Task, View,
//! };
//!
//! /// Title screen showing a logo.
//! struct Title {
//!     /// Seconds the title is shown.
//!     shown: f32,
//! }
//!
//! impl View for Title {
//!     fn on_start(&mut self, game: &Game) -> Task {
//!         // Load the logo from the `assets/` directory
//!         let assets = game.assets();
//!
//!         task(async move {
//!             assets
//!                 .register_image("logo", "logo.png", ImageOptions::default())
//!                 .await?;
//!
//!             Ok(())
//!         })
//!     }
//!
//!     fn on_key(&mut self, game: &Game, kind: KeyKind, key: &str) {
//!         // Stop drawing frames when 'Escape' is pressed
//!         if kind == KeyKind::Down && key == "Escape" {
//!             let _ = game.stop_loop();
//!         }
//!     }
//!
//!     fn on_frame(&mut self, game: &Game, surface: &mut dyn Surface, delta: f32) -> HookResult {
//!         self.shown += delta;
//!
//!         let assets = game.assets();
//!         if let Ok(logo) = assets.get_image("logo") {
//!             assets.draw(surface, &logo, Point2::new(10.0, 10.0), DrawOptions::default());
//!         }
//!
//!         Ok(())
//!     }
//! }
//!
//! # fn try_main() -> miette::Result<()> {
//! // In main
//!
//! // Open a window and run the game until it's closed
//! wildflower::run(
//!     Title { shown: 0.0 },
//!     Config::default()
//!         .with_title("My Game")
//!         .with_logical_size(Size2::new(320.0, 180.0)),
//! )
//! # }
//! ```
//!
//! # Install Requirements
//!
//! On Linux you need to install `asound2-dev` for audio:
//!
//! ```sh
//! sudo apt install libasound2-dev
//! ```

pub mod assets;
mod canvas;
pub mod config;
pub mod error;
mod game;
mod input;
mod surface;
mod view;
#[cfg(not(target_arch = "wasm32"))]
mod window;

use std::sync::atomic::{AtomicBool, Ordering};

pub use self::{
    canvas::Canvas,
    config::Config,
    error::{BoxedError, Error, Result},
    game::Game,
    input::{InputEvent, KeyKind, MouseKind},
    surface::Surface,
    view::{task, HookResult, Task, View},
};
#[cfg(not(target_arch = "wasm32"))]
pub use self::window::run;
use self::assets::ResourceLoader;

/// Whether [`initialize`] was called in this process.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Create the game for this process and mount its first view.
///
/// Only a single call is allowed per process, also when the call failed.
/// Use [`Game::new`] to construct games without this restriction, for example in tests.
///
/// Starts the frame loop when [`Config::start_loop`] is set.
///
/// # Arguments
///
/// * `surface` - Drawing surface on the screen.
/// * `view` - First view to mount.
/// * `loader` - Platform loader for images and sounds.
/// * `config` - Configuration of the game.
///
/// # Errors
///
/// - [`Error::AlreadyInitialized`] when called before.
/// - Any error of [`Game::new`], [`Game::set_view`] or [`Game::start_loop`].
///
/// # Example
///
/// ```
/// use glamour::Size2;
/// use wildflower::{assets::AssetSource, config::Config, Canvas, Error, View};
///
/// struct Empty;
///
/// impl View for Empty {}
///
/// let config = Config::default().with_start_loop(false);
/// let canvas = || Canvas::new(Size2::new(320, 180), config.background_color);
///
/// let game = wildflower::initialize(canvas(), Empty, AssetSource::new("assets"), &config)?;
/// game.frame()?;
///
/// // Only one game can be initialized
/// assert!(matches!(
///     wildflower::initialize(canvas(), Empty, AssetSource::new("assets"), &config),
///     Err(Error::AlreadyInitialized)
/// ));
/// # Ok::<(), Error>(())
/// ```
#[inline]
pub fn initialize(
    surface: impl Surface + 'static,
    view: impl View + 'static,
    loader: impl ResourceLoader + 'static,
    config: &Config,
) -> Result<Game> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(Error::AlreadyInitialized);
    }

    log::debug!("Initializing game");

    let game = Game::new(surface, loader, config)?;
    game.set_view(view)?;

    if config.start_loop {
        game.start_loop()?;
    }

    Ok(game)
}
