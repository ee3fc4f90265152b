//! Orchestrator driving the active view.

mod frame_loop;
mod scale;

use std::{
    cell::RefCell,
    future::Future,
    rc::Rc,
    sync::Arc,
    task::{Context, Poll, Wake, Waker},
    time::Duration,
};

use glamour::{Point2, Rect, Size2};
use web_time::Instant;

use self::{
    frame_loop::{FrameLoop, FrameTimer},
    scale::Scaling,
};
use crate::{
    assets::{AssetCache, ResourceLoader},
    config::{Config, ResizeOptions},
    error::{Error, Result},
    input::{InputEvent, KeyKind, MouseKind},
    surface::{ScaledSurface, Surface},
    view::{HookResult, Task, View},
};

/// Internal wrapped implementation for [`Game`].
struct GameInner {
    /// Surface frames are drawn on.
    ///
    /// Taken out while a frame is being drawn.
    surface: Option<Box<dyn Surface>>,
    /// Position of the surface on the screen, kept for when the surface is taken out.
    surface_offset: Point2,
    /// Active view.
    ///
    /// Taken out while one of its hooks runs.
    view: Option<Box<dyn View>>,
    /// Increased every time a view is mounted.
    view_generation: u64,
    /// Whether a view hook is running.
    view_busy: bool,
    /// A frame was requested while a view hook was running.
    frame_requested: bool,
    /// Loaded images and sounds.
    assets: AssetCache,
    /// Current logical to physical transform.
    scaling: Scaling,
    /// Logical size of the last resize.
    logical_size: Size2,
    /// Options of the last resize, reused when the screen changes.
    resize_options: ResizeOptions,
    /// Physical size of the screen.
    screen_size: Size2,
    /// Resize automatically when the screen changes.
    auto_resize: bool,
    /// Timer of the recurring frames.
    frame_loop: FrameLoop,
    /// Interval used when starting the loop without one.
    frame_interval: Duration,
    /// Delta between frames.
    frame_timer: FrameTimer,
    /// Unfinished work started by views.
    tasks: Vec<Task>,
}

/// Handle to the game, drives the active [`View`].
///
/// The game owns the drawing surface, the active view and the [`AssetCache`].
/// It maps input from the screen to the logical coordinate system of the view and draws frames on a timer.
///
/// [`Game`] is cheap to clone due to being a `Rc<RefCell<..>>` under the hood, all clones control the same game.
/// No borrow is held while a view hook runs, so hooks can call every method on it.
#[derive(Clone)]
pub struct Game {
    /// Implementation of all non-primitive parts.
    inner: Rc<RefCell<GameInner>>,
}

impl Game {
    /// Create a game drawing on a surface, without a view mounted.
    ///
    /// The current size of the surface is used as the screen size, call [`Self::set_screen_size`] when that's not correct.
    /// Unlike [`crate::initialize`] this can be called as often as needed.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSize`] when the configured logical size can't be used.
    #[inline]
    pub fn new(
        surface: impl Surface + 'static,
        loader: impl ResourceLoader + 'static,
        config: &Config,
    ) -> Result<Self> {
        let surface_size = surface.size();
        let screen_size = Size2::new(surface_size.width as f32, surface_size.height as f32);

        let assets = AssetCache::new(loader);
        assets.set_pixel_mode(config.pixel_mode);

        let resize_options = config
            .logical_size
            .map(ResizeOptions::from)
            .unwrap_or_default();

        let inner = GameInner {
            surface_offset: surface.offset(),
            surface: Some(Box::new(surface)),
            view: None,
            view_generation: 0,
            view_busy: false,
            frame_requested: false,
            assets,
            // Replaced by the first resize
            scaling: Scaling {
                scale: 1.0,
                surface_size,
            },
            logical_size: screen_size,
            resize_options,
            screen_size,
            auto_resize: config.auto_resize,
            frame_loop: FrameLoop::Idle,
            frame_interval: config.frame_interval,
            frame_timer: FrameTimer::default(),
            tasks: Vec::new(),
        };

        let game = Self {
            inner: Rc::new(RefCell::new(inner)),
        };
        game.resize(resize_options)?;

        Ok(game)
    }

    /// Replace the active view.
    ///
    /// The new view is only mounted after [`View::on_start`] returned, the task it returned is started immediately.
    /// The previous view is dropped without notice.
    ///
    /// When called from inside a hook, the view set last wins.
    ///
    /// # Errors
    ///
    /// - [`Error::Hook`] when the start task failed before its first suspension, the view is mounted anyway.
    /// - Any error of a frame requested while the view was starting.
    #[inline]
    pub fn set_view(&self, view: impl View + 'static) -> Result<()> {
        let mut view: Box<dyn View> = Box::new(view);

        let (generation, previous) = self.write(|game| {
            game.view_generation += 1;

            (game.view_generation, game.view.take())
        });
        // Dropped without a borrow, the view might own game handles
        drop(previous);

        log::debug!("Mounting view {generation}");

        let task = self.hook_scope(|| view.on_start(self));

        let replaced = self.write(|game| {
            if game.view_generation == generation {
                game.view = Some(view);

                None
            } else {
                // Another view was set while this one was starting
                Some(view)
            }
        });
        if replaced.is_some() {
            log::debug!("View {generation} was replaced while starting");
        }
        drop(replaced);

        self.spawn(task)?;

        self.run_requested_frame()
    }

    /// Fit the logical coordinate system inside the screen.
    ///
    /// The scale is `min(screen_height / logical_height, screen_width / logical_width)` rounded to three decimals, the surface is resized to the logical size times the scale.
    /// Omitted dimensions use the screen size.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSize`] when a logical dimension is not a positive number.
    /// - [`Error::FrameInProgress`] when called while drawing a frame.
    #[inline]
    pub fn resize(&self, options: ResizeOptions) -> Result<()> {
        self.write(|game| {
            let surface = game.surface.as_mut().ok_or(Error::FrameInProgress)?;

            let logical_size = Size2::new(
                options.logical_width.unwrap_or(game.screen_size.width),
                options.logical_height.unwrap_or(game.screen_size.height),
            );
            let scaling = Scaling::fit(logical_size, game.screen_size)?;

            surface.set_size(scaling.surface_size);
            game.surface_offset = surface.offset();

            log::debug!(
                "Resized logical {}x{} to {}x{} with scale {}",
                logical_size.width,
                logical_size.height,
                scaling.surface_size.width,
                scaling.surface_size.height,
                scaling.scale
            );

            game.scaling = scaling;
            game.logical_size = logical_size;
            game.resize_options = options;

            Ok(())
        })
    }

    /// Set the physical size of the screen without resizing.
    #[inline]
    pub fn set_screen_size(&self, screen_size: Size2) {
        self.write(|game| game.screen_size = screen_size);
    }

    /// Respond to the screen changing size.
    ///
    /// When configured to resize automatically, the last resize is repeated and a new frame is drawn so the screen isn't left blank.
    ///
    /// # Errors
    ///
    /// - Any error of [`Self::resize`] or [`Self::frame`].
    #[inline]
    pub fn handle_screen_resize(&self, screen_size: Size2) -> Result<()> {
        self.set_screen_size(screen_size);

        let (auto_resize, options) = self.read(|game| (game.auto_resize, game.resize_options));
        if !auto_resize {
            return Ok(());
        }

        self.resize(options)?;
        self.frame()
    }

    /// Draw a single frame with the active view.
    ///
    /// The surface is cleared and scaled before [`View::on_frame`] is called, afterwards the scale is always restored.
    /// When called from a view hook other than [`View::on_frame`], the frame is drawn right after that hook returns.
    ///
    /// # Errors
    ///
    /// - [`Error::FrameInProgress`] when called while drawing a frame.
    /// - [`Error::Hook`] when the view failed, this also stops the frame loop.
    #[inline]
    pub fn frame(&self) -> Result<()> {
        profiling::scope!("Frame");

        let surface = self.write(|game| {
            let Some(surface) = game.surface.take() else {
                return Err(Error::FrameInProgress);
            };

            if game.view_busy {
                game.surface = Some(surface);
                game.frame_requested = true;

                return Ok(None);
            }

            Ok(Some(surface))
        })?;
        let Some(mut surface) = surface else {
            log::trace!("Deferring frame until the running hook returns");

            return Ok(());
        };

        let (delta, scale) =
            self.write(|game| (game.frame_timer.delta(Instant::now()), game.scaling.scale));

        let size = surface.size();
        surface.clear(Rect::new(
            Point2::ZERO,
            Size2::new(size.width as f32, size.height as f32),
        ));

        let result = {
            let mut scaled = ScaledSurface::new(surface.as_mut(), scale);

            self.with_view(|view, game| view.on_frame(game, &mut *scaled, delta))
        };

        surface.present();

        self.write(|game| {
            game.surface_offset = surface.offset();
            game.surface = Some(surface);
        });

        match result {
            None => {
                log::trace!("Drew frame without a view");

                Ok(())
            }
            Some(Ok(())) => {
                log::trace!("Drew frame with delta {delta}");

                Ok(())
            }
            Some(Err(err)) => {
                log::error!("Drawing frame failed: {err}");

                self.write(|game| {
                    if game.frame_loop.stop().is_ok() {
                        log::debug!("Stopped frame loop after failed frame");
                    }
                });

                Err(Error::hook(err))
            }
        }
    }

    /// Start drawing frames every configured interval, and draw one immediately.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRunning`] when the loop is already started.
    /// - Any error of the first [`Self::frame`].
    #[inline]
    pub fn start_loop(&self) -> Result<()> {
        let interval = self.read(|game| game.frame_interval);

        self.start_loop_every(interval)
    }

    /// Start drawing frames every interval, and draw one immediately.
    ///
    /// The interval is measured from the end of a frame to the start of the next, so slow frames make the loop drift.
    /// The loop only ticks when the host calls [`Self::tick`].
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRunning`] when the loop is already started.
    /// - Any error of the first [`Self::frame`].
    #[inline]
    pub fn start_loop_every(&self, interval: Duration) -> Result<()> {
        let drawing = self.write(|game| {
            game.frame_loop.start(interval, Instant::now())?;

            Ok::<_, Error>(game.surface.is_none())
        })?;

        log::debug!("Started frame loop every {interval:?}");

        // Started from inside a frame, the next tick draws
        if drawing {
            return Ok(());
        }

        self.frame()
    }

    /// Stop the frame loop, cancelling the next tick.
    ///
    /// # Errors
    ///
    /// - [`Error::NotRunning`] when the loop is not started.
    #[inline]
    pub fn stop_loop(&self) -> Result<()> {
        self.write(|game| game.frame_loop.stop())?;

        log::debug!("Stopped frame loop");

        Ok(())
    }

    /// Draw a frame when the loop is due, and schedule the next.
    ///
    /// Returns whether a frame was drawn.
    ///
    /// # Errors
    ///
    /// - Any error of [`Self::frame`].
    #[inline]
    pub fn tick(&self, now: Instant) -> Result<bool> {
        if !self.read(|game| game.frame_loop.is_due(now)) {
            return Ok(false);
        }

        profiling::scope!("Tick");

        let result = self.frame();

        // Measured after the work so the interval is kept between frames
        self.write(|game| game.frame_loop.reschedule(Instant::now()));

        result.map(|()| true)
    }

    /// When the loop must tick next, `None` when it's not running.
    #[inline]
    #[must_use]
    pub fn next_tick(&self) -> Option<Instant> {
        self.read(|game| game.frame_loop.next_tick())
    }

    /// Whether the frame loop is started.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.read(|game| game.frame_loop.is_running())
    }

    /// Forward an input event to the active view.
    ///
    /// Mouse positions are converted to logical coordinates, keys are passed as is.
    /// Dropped when no view is mounted or the view is busy with another hook.
    ///
    /// # Errors
    ///
    /// - Any error of a frame requested by the view while handling the event.
    #[inline]
    pub fn dispatch(&self, event: InputEvent) -> Result<()> {
        let handled = match event {
            InputEvent::Mouse { kind, x, y } => {
                let position = self.transform_coords(x, y);
                log::trace!("Mouse {kind:?} at ({}, {})", position.x, position.y);

                self.with_view(|view, game| view.on_mouse(game, kind, position.x, position.y))
            }
            InputEvent::Key { kind, key } => {
                log::trace!("Key {kind:?} '{key}'");

                self.with_view(|view, game| view.on_key(game, kind, &key))
            }
        };

        if handled.is_none() {
            log::trace!("No view to handle input");
        }

        self.run_requested_frame()
    }

    /// Forward a mouse event in screen coordinates to the active view.
    ///
    /// # Errors
    ///
    /// - Any error of [`Self::dispatch`].
    #[inline]
    pub fn handle_mouse(&self, kind: MouseKind, x: f32, y: f32) -> Result<()> {
        self.dispatch(InputEvent::Mouse { kind, x, y })
    }

    /// Forward a key event to the active view.
    ///
    /// # Errors
    ///
    /// - Any error of [`Self::dispatch`].
    #[inline]
    pub fn handle_key(&self, kind: KeyKind, key: &str) -> Result<()> {
        self.dispatch(InputEvent::Key {
            kind,
            key: key.into(),
        })
    }

    /// Convert a position on the screen to logical coordinates.
    #[inline]
    #[must_use]
    pub fn transform_coords(&self, x: f32, y: f32) -> Point2 {
        self.read(|game| {
            game.scaling
                .to_logical(Point2::new(x, y), game.surface_offset)
        })
    }

    /// Start a task, polling it once immediately.
    ///
    /// Unfinished tasks are driven by [`Self::poll_tasks`].
    ///
    /// # Errors
    ///
    /// - [`Error::Hook`] when the task failed on the first poll.
    #[inline]
    pub fn spawn(&self, task: impl Future<Output = HookResult> + 'static) -> Result<()> {
        let mut task: Task = Box::pin(task);

        match poll_task(&mut task) {
            Poll::Ready(result) => result.map_err(|err| {
                log::error!("Task failed: {err}");

                Error::hook(err)
            }),
            Poll::Pending => {
                self.write(|game| game.tasks.push(task));

                Ok(())
            }
        }
    }

    /// Poll all unfinished tasks once.
    ///
    /// # Errors
    ///
    /// - [`Error::Hook`] with the first task that failed, all tasks are polled regardless.
    #[inline]
    pub fn poll_tasks(&self) -> Result<()> {
        let tasks = self.write(|game| std::mem::take(&mut game.tasks));
        if tasks.is_empty() {
            return Ok(());
        }

        let mut pending = Vec::with_capacity(tasks.len());
        let mut first_error = None;
        for mut task in tasks {
            match poll_task(&mut task) {
                Poll::Ready(Ok(())) => (),
                Poll::Ready(Err(err)) => {
                    log::error!("Task failed: {err}");

                    first_error.get_or_insert(err);
                }
                Poll::Pending => pending.push(task),
            }
        }

        // Tasks spawned while polling are kept after the existing ones
        self.write(|game| {
            pending.append(&mut game.tasks);
            game.tasks = pending;
        });

        first_error.map_or(Ok(()), |err| Err(Error::hook(err)))
    }

    /// Whether any task is unfinished.
    #[inline]
    #[must_use]
    pub fn has_pending_tasks(&self) -> bool {
        self.read(|game| !game.tasks.is_empty())
    }

    /// Loaded images and sounds.
    #[inline]
    #[must_use]
    pub fn assets(&self) -> AssetCache {
        self.read(|game| game.assets.clone())
    }

    /// Logical pixels to physical pixels.
    #[inline]
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.read(|game| game.scaling.scale)
    }

    /// Size of the logical coordinate system.
    #[inline]
    #[must_use]
    pub fn logical_size(&self) -> Size2 {
        self.read(|game| game.logical_size)
    }

    /// Physical size of the screen.
    #[inline]
    #[must_use]
    pub fn screen_size(&self) -> Size2 {
        self.read(|game| game.screen_size)
    }

    /// Physical size of the surface.
    #[inline]
    #[must_use]
    pub fn surface_size(&self) -> Size2<u32> {
        self.read(|game| game.scaling.surface_size)
    }

    /// Run a hook on the active view, `None` when no view is mounted.
    ///
    /// The view is taken out while the hook runs, so the hook can use the game freely.
    fn with_view<R>(&self, hook: impl FnOnce(&mut dyn View, &Self) -> R) -> Option<R> {
        let (view, generation) = self.write(|game| (game.view.take(), game.view_generation));
        let mut view = view?;

        let result = self.hook_scope(|| hook(view.as_mut(), self));

        let replaced = self.write(|game| {
            if game.view_generation == generation && game.view.is_none() {
                game.view = Some(view);

                None
            } else {
                // A new view was set by the hook
                Some(view)
            }
        });
        drop(replaced);

        Some(result)
    }

    /// Mark a view hook as running for the duration of the closure.
    fn hook_scope<R>(&self, hook: impl FnOnce() -> R) -> R {
        let was_busy = self.write(|game| std::mem::replace(&mut game.view_busy, true));

        let result = hook();

        self.write(|game| game.view_busy = was_busy);

        result
    }

    /// Draw the frame requested while a hook was running.
    fn run_requested_frame(&self) -> Result<()> {
        let requested = self.write(|game| {
            !game.view_busy && std::mem::take(&mut game.frame_requested)
        });

        if requested {
            self.frame()
        } else {
            Ok(())
        }
    }

    /// Get a read-only reference to the inner struct.
    fn read<R>(&self, reader: impl FnOnce(&GameInner) -> R) -> R {
        reader(&self.inner.borrow())
    }

    /// Get a mutable reference to the inner struct.
    fn write<R>(&self, writer: impl FnOnce(&mut GameInner) -> R) -> R {
        writer(&mut self.inner.borrow_mut())
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.read(|game| {
            f.debug_struct("Game")
                .field("view_generation", &game.view_generation)
                .field("scaling", &game.scaling)
                .field("screen_size", &game.screen_size)
                .field("frame_loop", &game.frame_loop)
                .field("tasks", &game.tasks.len())
                .field("assets", &game.assets)
                .finish_non_exhaustive()
        })
    }
}

/// Waker that does nothing, the host polls all tasks every turn of its event loop.
struct NoopWaker;

impl Wake for NoopWaker {
    fn wake(self: Arc<Self>) {}
}

/// Poll a task once.
fn poll_task(task: &mut Task) -> Poll<HookResult> {
    let waker = Waker::from(Arc::new(NoopWaker));
    let mut cx = Context::from_waker(&waker);

    task.as_mut().poll(&mut cx)
}
