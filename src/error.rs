//! Errors returned by the game and the asset cache.

use miette::Diagnostic;
use smol_str::SmolStr;

/// Boxed error type used for failures coming from outside of the engine.
///
/// Returned by view hooks and resource loaders.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type of all fallible engine operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong when driving a game.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[non_exhaustive]
pub enum Error {
    /// [`crate::initialize`] was called a second time in this process.
    #[error("A game has already been initialized")]
    #[diagnostic(
        code(wildflower::already_initialized),
        help("construct additional games with `Game::new` instead")
    )]
    AlreadyInitialized,
    /// [`crate::Game::start_loop`] was called while the frame loop is running.
    #[error("Frame loop is already running")]
    #[diagnostic(code(wildflower::already_running))]
    AlreadyRunning,
    /// [`crate::Game::stop_loop`] was called while no frame loop is running.
    #[error("Frame loop is not running")]
    #[diagnostic(code(wildflower::not_running))]
    NotRunning,
    /// A resource could not be loaded.
    #[error("Error loading asset from '{path}'")]
    #[diagnostic(code(wildflower::load))]
    Load {
        /// Source path of the resource.
        path: String,
        /// Why the loader failed.
        #[source]
        source: BoxedError,
    },
    /// No asset is registered under the key.
    #[error("No asset registered under key '{key}'")]
    #[diagnostic(
        code(wildflower::not_found),
        help("register the asset before retrieving it, or check whether it was unloaded")
    )]
    NotFound {
        /// Caller chosen key of the asset.
        key: SmolStr,
    },
    /// A logical size that can't be scaled to the screen.
    #[error("Invalid logical size {width}x{height}, both dimensions must be positive")]
    #[diagnostic(code(wildflower::invalid_size))]
    InvalidSize {
        /// Requested logical width.
        width: f32,
        /// Requested logical height.
        height: f32,
    },
    /// The surface is in use by the frame currently being drawn.
    #[error("A frame is already being drawn")]
    #[diagnostic(code(wildflower::frame_in_progress))]
    FrameInProgress,
    /// A view hook or a task spawned by a view failed.
    #[error("View failed")]
    #[diagnostic(code(wildflower::hook))]
    Hook {
        /// Error returned by the view.
        #[source]
        source: BoxedError,
    },
}

impl Error {
    /// Wrap a loader failure for a path.
    pub(crate) fn load(path: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self::Load {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Key was never registered or was unloaded.
    pub(crate) fn not_found(key: &str) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Wrap a view failure.
    pub(crate) fn hook(source: BoxedError) -> Self {
        Self::Hook { source }
    }
}
