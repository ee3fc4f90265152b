//! Screens of a game.

use std::{future::Future, pin::Pin};

use crate::{
    error::BoxedError,
    game::Game,
    input::{KeyKind, MouseKind},
    surface::Surface,
};

/// Result of a view hook.
pub type HookResult = Result<(), BoxedError>;

/// Work a view started that continues after its hook returned.
///
/// Driven by [`Game::poll_tasks`].
pub type Task = Pin<Box<dyn Future<Output = HookResult>>>;

/// Box a future as a [`Task`].
///
/// Allows using `?` in an `async` block without annotating its error type.
#[inline]
pub fn task(future: impl Future<Output = HookResult> + 'static) -> Task {
    Box::pin(future)
}

/// A single screen of a game, only one is active at a time.
///
/// All hooks do nothing by default, so only the ones needed have to be implemented.
/// Every hook gets the game handle, which can be cloned into tasks.
///
/// # Example
///
/// ```
/// use glamour::Point2;
/// use wildflower::{
///     config::{DrawOptions, ImageOptions},
///     task, Game, HookResult, MouseKind, Surface, Task, View,
/// };
///
/// /// Draw a player at the last clicked position.
/// #[derive(Default)]
/// struct Level {
///     player: Point2,
/// }
///
/// impl View for Level {
///     fn on_start(&mut self, game: &Game) -> Task {
///         let assets = game.assets();
///
///         task(async move {
///             assets
///                 .register_image("player", "player.png", ImageOptions::default())
///                 .await?;
///
///             Ok(())
///         })
///     }
///
///     fn on_mouse(&mut self, _game: &Game, kind: MouseKind, x: f32, y: f32) {
///         if kind == MouseKind::Down {
///             self.player = Point2::new(x, y);
///         }
///     }
///
///     fn on_frame(&mut self, game: &Game, surface: &mut dyn Surface, _delta: f32) -> HookResult {
///         let assets = game.assets();
///         // Still loading
///         let Ok(player) = assets.get_image("player") else {
///             return Ok(());
///         };
///
///         assets.draw(surface, &player, self.player, DrawOptions::default());
///
///         Ok(())
///     }
/// }
/// ```
pub trait View {
    /// Called once when the view is mounted, before any frame is drawn with it.
    ///
    /// The returned task is started immediately and driven until it finishes, use it to load assets.
    #[inline]
    fn on_start(&mut self, _game: &Game) -> Task {
        Box::pin(std::future::ready(Ok(())))
    }

    /// Mouse event in logical coordinates.
    #[inline]
    fn on_mouse(&mut self, _game: &Game, _kind: MouseKind, _x: f32, _y: f32) {}

    /// Keyboard event, `key` is the platform key identifier such as `"a"` or `"ArrowUp"`.
    #[inline]
    fn on_key(&mut self, _game: &Game, _kind: KeyKind, _key: &str) {}

    /// Draw a frame on the already cleared and scaled surface.
    ///
    /// `delta` is the amount of seconds since the previous frame, `0.0` for the first frame.
    ///
    /// # Errors
    ///
    /// Failing stops the frame loop.
    #[inline]
    fn on_frame(&mut self, _game: &Game, _surface: &mut dyn Surface, _delta: f32) -> HookResult {
        Ok(())
    }
}

impl<V: View + ?Sized> View for Box<V> {
    #[inline]
    fn on_start(&mut self, game: &Game) -> Task {
        (**self).on_start(game)
    }

    #[inline]
    fn on_mouse(&mut self, game: &Game, kind: MouseKind, x: f32, y: f32) {
        (**self).on_mouse(game, kind, x, y);
    }

    #[inline]
    fn on_key(&mut self, game: &Game, kind: KeyKind, key: &str) {
        (**self).on_key(game, kind, key);
    }

    #[inline]
    fn on_frame(&mut self, game: &Game, surface: &mut dyn Surface, delta: f32) -> HookResult {
        (**self).on_frame(game, surface, delta)
    }
}
