//! Spawn a winit window and run the game on desktop platforms.

mod gpu;

use std::sync::Arc;

use glamour::{Point2, Rect, Size2};
use miette::{Context, IntoDiagnostic, Result};
use web_time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use self::gpu::Gpu;
use crate::{
    assets::{AssetSource, Image},
    canvas::Canvas,
    config::Config,
    error::Error,
    game::Game,
    input::Input,
    surface::Surface,
    view::View,
};

/// Canvas shown centered in a window.
struct WindowSurface {
    /// Window the canvas is shown in.
    window: Arc<Window>,
    /// Pixels drawn by the game.
    canvas: Canvas,
    /// GPU state for showing the pixels.
    gpu: Gpu,
    /// Size the GPU surface is configured for.
    window_size: Size2<u32>,
    /// Color of the area around the canvas.
    viewport_color: u32,
}

impl WindowSurface {
    /// Follow the window size and keep the canvas centered in it.
    fn fit_window(&mut self) {
        let PhysicalSize { width, height } = self.window.inner_size();
        let window_size = Size2::new(width, height);

        if window_size != self.window_size {
            self.gpu.resize(window_size);
            self.window_size = window_size;
        }

        let canvas_size = self.canvas.size();
        self.canvas.set_offset(Point2::new(
            (window_size.width.saturating_sub(canvas_size.width) / 2) as f32,
            (window_size.height.saturating_sub(canvas_size.height) / 2) as f32,
        ));
    }
}

impl Surface for WindowSurface {
    fn size(&self) -> Size2<u32> {
        self.canvas.size()
    }

    fn set_size(&mut self, size: Size2<u32>) {
        self.canvas.set_size(size);

        self.fit_window();
    }

    fn offset(&self) -> Point2 {
        self.canvas.offset()
    }

    fn clear(&mut self, area: Rect) {
        self.canvas.clear(area);
    }

    fn set_uniform_scale(&mut self, scale: f32) {
        self.canvas.set_uniform_scale(scale);
    }

    fn draw_region(&mut self, image: &Image, source: Rect<u32>, destination: Rect) {
        self.canvas.draw_region(image, source, destination);
    }

    fn set_smoothing(&mut self, smoothing: bool) {
        self.canvas.set_smoothing(smoothing);
    }

    fn present(&mut self) {
        self.fit_window();

        self.gpu.present(
            self.canvas.pixels(),
            self.canvas.offset(),
            self.viewport_color,
        );
    }
}

/// Open a window and run the game in it until the window is closed.
///
/// Assets are loaded from [`Config::asset_dir`].
///
/// # Arguments
///
/// * `view` - First view to mount.
/// * `config` - Configuration for the window and the game.
///
/// # Errors
///
/// - When a window could not be opened.
/// - If no GPU could be found or accessed.
/// - When the game could not be initialized.
///
/// # Example
///
/// ```no_run
/// use wildflower::{config::Config, View};
///
/// struct Empty;
///
/// impl View for Empty {}
///
/// fn main() -> miette::Result<()> {
///     wildflower::run(Empty, Config::default().with_title("Empty"))
/// }
/// ```
#[inline]
pub fn run(view: impl View + 'static, config: Config) -> Result<()> {
    // Enable environment logger for winit, ignore when already set by the caller
    let _ = env_logger::try_init();

    let event_loop = EventLoop::new()
        .into_diagnostic()
        .wrap_err("Error setting up event loop for window")?;

    let mut state = State {
        game: None,
        view: Some(Box::new(view)),
        config,
        input: Input::default(),
        error: None,
    };

    event_loop
        .run_app(&mut state)
        .into_diagnostic()
        .wrap_err("Error running event loop")?;

    state.error.map_or(Ok(()), Err)
}

/// State of setting up a window that can still be uninitialized.
///
/// All optional fields are tied to the window creation flow of winit.
struct State {
    /// Running game.
    ///
    /// `None` if the window still needs to be initialized.
    game: Option<Game>,
    /// First view.
    ///
    /// Will be taken from the option once.
    view: Option<Box<dyn View>>,
    /// User supplied configuration.
    config: Config,
    /// Translates window events.
    input: Input,
    /// Error that stopped the event loop.
    error: Option<miette::Report>,
}

impl State {
    /// Create the window and start the game in it.
    fn setup(&mut self, event_loop: &ActiveEventLoop, view: Box<dyn View>) -> Result<Game> {
        // Define the properties of the window
        let window_attributes = WindowAttributes::default()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(
                self.config.window_size.width,
                self.config.window_size.height,
            ));

        // Spawn a new window using the event loop
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .into_diagnostic()
                .wrap_err("Error setting up window")?,
        );

        let PhysicalSize { width, height } = window.inner_size();
        let window_size = Size2::new(width, height);

        // Because pollster returns the value we can set it immediately
        let gpu = pollster::block_on(Gpu::new(Arc::clone(&window), window_size))?;

        let surface = WindowSurface {
            window,
            canvas: Canvas::new(window_size, self.config.background_color),
            gpu,
            window_size,
            viewport_color: self.config.viewport_color,
        };
        let loader = AssetSource::new(&self.config.asset_dir);

        let game = crate::initialize(surface, view, loader, &self.config)
            .wrap_err("Error starting game")?;

        Ok(game)
    }
}

impl ApplicationHandler for State {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Setup the window once
        let Some(view) = self.view.take() else {
            return;
        };

        match self.setup(event_loop, view) {
            Ok(game) => self.game = Some(game),
            Err(err) => {
                self.error = Some(err);

                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Do nothing if the window is not set up yet
        let Some(game) = &self.game else {
            return;
        };

        // Handle the window events
        let result = match event {
            // Letterbox the canvas in the new size
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                game.handle_screen_resize(Size2::new(width as f32, height as f32))
            }
            // Window contents were lost
            WindowEvent::RedrawRequested => game.frame(),
            // Close the window if requested
            WindowEvent::CloseRequested => {
                // Tell winit that we want to exit
                event_loop.exit();

                Ok(())
            }
            // Handle other window events with the input translator
            event => self
                .input
                .handle_event(&event)
                .map_or(Ok(()), |input| game.dispatch(input)),
        };

        report(result);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(game) = &self.game else {
            return;
        };

        report(game.poll_tasks());
        report(game.tick(Instant::now()).map(|_| ()));

        // Sleep until the next frame, unless tasks need to be driven
        let control_flow = if game.has_pending_tasks() {
            ControlFlow::Poll
        } else if let Some(next_tick) = game.next_tick() {
            ControlFlow::WaitUntil(next_tick)
        } else {
            ControlFlow::Wait
        };
        event_loop.set_control_flow(control_flow);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Destroy all state(s), anarchy for all
        self.game = None;
        self.view = None;
    }
}

/// Log errors the host can't return to anyone.
fn report(result: crate::Result<()>) {
    match result {
        Ok(()) => (),
        // Already logged when the view failed
        Err(Error::Hook { .. }) => (),
        Err(err) => log::error!("{:?}", miette::Report::new(err)),
    }
}
