//! Key-addressed cache of images and sounds.
//!
//! Images are deduplicated by their source path: registering the same path under multiple keys decodes it only once, while every key keeps its own region of the image.
//! This allows slicing a spritesheet into many assets.
//!
//! ```
//! use wildflower::{
//!     assets::{AssetCache, AudioResource, Image, LoadFuture, ResourceLoader},
//!     config::ImageOptions,
//! };
//!
//! # struct Sheet;
//! # impl ResourceLoader for Sheet {
//! #     fn load_image(&self, _path: &str) -> LoadFuture<Image> {
//! #         Box::pin(std::future::ready(Ok(Image::filled(64, 32, 0xFFFF_FFFF))))
//! #     }
//! #     fn load_audio(&self, path: &str) -> LoadFuture<Box<dyn AudioResource>> {
//! #         Box::pin(std::future::ready(Err(format!("no audio for '{path}'").into())))
//! #     }
//! # }
//! # pollster::block_on(async {
//! let assets = AssetCache::new(Sheet);
//!
//! // Two sprites next to each other on the same sheet
//! assets
//!     .register_image("left", "sheet.png", ImageOptions::region(0, 0, 32, 32))
//!     .await?;
//! assets
//!     .register_image("right", "sheet.png", ImageOptions::region(32, 0, 32, 32))
//!     .await?;
//!
//! assert_eq!(assets.get_image("right")?.left, 32);
//! # Ok::<(), wildflower::Error>(())
//! # }).unwrap();
//! ```

pub(crate) mod audio;
pub(crate) mod image;
pub(crate) mod loader;
mod pending;
pub(crate) mod source;

use std::{cell::RefCell, rc::Rc};

use glamour::{Point2, Rect, Size2};
use hashbrown::HashMap;
use smol_str::SmolStr;

pub use self::{
    audio::{AudioResource, KiraAudio},
    image::Image,
    loader::{LoadFuture, ResourceLoader},
    source::AssetSource,
};
use self::pending::{PendingLoad, WaitForLoad};
use crate::{
    config::{DrawOptions, ImageOptions},
    error::{BoxedError, Error, Result},
    surface::Surface,
};

/// Rectangular region of a cached image registered under a key.
#[derive(Debug, Clone)]
#[allow(clippy::exhaustive_structs)]
pub struct ImageAsset {
    /// Decoded image, shared between all assets with the same source path.
    pub resource: Rc<Image>,
    /// Horizontal position of the region on the image.
    pub left: u32,
    /// Vertical position of the region on the image.
    pub top: u32,
    /// Width of the region.
    pub width: u32,
    /// Height of the region.
    pub height: u32,
}

impl ImageAsset {
    /// Resolve the region options against the natural size of the image.
    fn new(resource: Rc<Image>, options: ImageOptions) -> Self {
        let ImageOptions {
            left,
            top,
            width,
            height,
        } = options;

        let width = width.unwrap_or_else(|| resource.width().saturating_sub(left));
        let height = height.unwrap_or_else(|| resource.height().saturating_sub(top));

        Self {
            resource,
            left,
            top,
            width,
            height,
        }
    }

    /// Region on the source image.
    #[inline]
    #[must_use]
    pub fn source_rect(&self) -> Rect<u32> {
        Rect::new(
            Point2::new(self.left, self.top),
            Size2::new(self.width, self.height),
        )
    }
}

/// Loading state of a sound.
enum AudioState {
    /// Still loading, can't be played yet.
    Loading,
    /// Ready to play.
    Ready(Box<dyn AudioResource>),
}

/// Shared handle to a sound registered in the [`AssetCache`].
///
/// Available as soon as the sound is registered, also while it's still loading.
/// The sound is freed when the last clone of the handle is dropped.
#[derive(Clone)]
pub struct AudioHandle(Rc<RefCell<AudioState>>);

impl AudioHandle {
    /// Create a handle for a sound that's still loading.
    fn loading() -> Self {
        Self(Rc::new(RefCell::new(AudioState::Loading)))
    }

    /// Whether the sound finished loading.
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(*self.0.borrow(), AudioState::Ready(..))
    }

    /// Whether both handles refer to the same sound.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Fill in the loaded resource.
    fn finish(&self, resource: Box<dyn AudioResource>) {
        *self.0.borrow_mut() = AudioState::Ready(resource);
    }
}

impl std::fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AudioHandle")
            .field(&if self.is_loaded() { "ready" } else { "loading" })
            .finish()
    }
}

/// Cached decoded image for a source path.
enum ImageSlot {
    /// Decoded and ready to be shared.
    Loaded(Rc<Image>),
    /// Another registration is loading it.
    Pending(Rc<RefCell<PendingLoad>>),
}

/// Internal wrapped implementation for [`AssetCache`].
#[derive(Default)]
struct AssetCacheInner {
    /// Decoded images by source path.
    images: HashMap<String, ImageSlot>,
    /// Image regions by caller key.
    image_assets: HashMap<SmolStr, ImageAsset>,
    /// Sounds by caller key.
    audio_assets: HashMap<SmolStr, AudioHandle>,
    /// Disable smoothing when drawing.
    pixel_mode: bool,
}

/// Key-addressed cache of images and sounds.
///
/// [`AssetCache`] is cheap to clone due to being a `Rc<RefCell<..>>` under the hood, all clones share the same assets.
#[derive(Clone)]
pub struct AssetCache {
    /// Implementation of all non-primitive parts.
    inner: Rc<RefCell<AssetCacheInner>>,
    /// Platform loader for resources.
    loader: Rc<dyn ResourceLoader>,
}

impl AssetCache {
    /// Create an empty cache loading resources with the loader.
    #[inline]
    #[must_use]
    pub fn new(loader: impl ResourceLoader + 'static) -> Self {
        Self {
            inner: Rc::default(),
            loader: Rc::new(loader),
        }
    }

    /// Load an image, or a region of it, and register it under a key.
    ///
    /// When the source path was loaded before, or is being loaded by another registration, the decoded image is shared instead of loaded again.
    ///
    /// # Arguments
    ///
    /// * `key` - Name to retrieve the asset with, replaces any previous image with this key.
    /// * `src` - Source path passed to the loader.
    /// * `options` - Region of the image, defaults to the whole image.
    ///
    /// # Errors
    ///
    /// - [`Error::Load`] when the loader failed, the key is not registered in that case.
    #[inline]
    pub async fn register_image(
        &self,
        key: impl Into<SmolStr>,
        src: &str,
        options: ImageOptions,
    ) -> Result<ImageAsset> {
        let key = key.into();
        let resource = self.load_image(src).await?;

        let asset = ImageAsset::new(resource, options);
        log::debug!(
            "Registered image '{key}' from '{src}' at ({}, {}) with size {}x{}",
            asset.left,
            asset.top,
            asset.width,
            asset.height
        );

        self.write(|assets| assets.image_assets.insert(key, asset.clone()));

        Ok(asset)
    }

    /// Load a sound and register it under a key.
    ///
    /// The handle is registered immediately, so [`Self::get_audio`] returns it while it's still loading.
    /// Sounds are never shared, every registration loads its source again.
    ///
    /// # Errors
    ///
    /// - [`Error::Load`] when the loader failed, the key is unregistered again in that case.
    #[inline]
    pub async fn register_audio(&self, key: impl Into<SmolStr>, src: &str) -> Result<AudioHandle> {
        let key = key.into();
        let handle = AudioHandle::loading();

        self.write(|assets| assets.audio_assets.insert(key.clone(), handle.clone()));

        // Start the load without holding a borrow so other hooks can use the cache meanwhile
        let load = self.loader.load_audio(src);
        match load.await {
            Ok(resource) => {
                log::debug!("Registered audio '{key}' from '{src}'");

                handle.finish(resource);

                Ok(handle)
            }
            Err(err) => {
                // Only remove the key when it wasn't registered again in the meantime
                self.write(|assets| {
                    if assets
                        .audio_assets
                        .get(&key)
                        .is_some_and(|registered| registered.ptr_eq(&handle))
                    {
                        assets.audio_assets.remove(&key);
                    }
                });

                Err(Error::load(src, err))
            }
        }
    }

    /// Get a registered image.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when the key was never registered or is unloaded.
    #[inline]
    pub fn get_image(&self, key: &str) -> Result<ImageAsset> {
        self.read(|assets| assets.image_assets.get(key).cloned())
            .ok_or_else(|| Error::not_found(key))
    }

    /// Get a registered sound.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when the key was never registered or is unloaded.
    #[inline]
    pub fn get_audio(&self, key: &str) -> Result<AudioHandle> {
        self.read(|assets| assets.audio_assets.get(key).cloned())
            .ok_or_else(|| Error::not_found(key))
    }

    /// Remove the image and sound registered under a key.
    ///
    /// Does nothing when nothing is registered.
    /// Decoded images stay cached by their source path.
    #[inline]
    pub fn unload(&self, key: &str) {
        self.write(|assets| {
            let image = assets.image_assets.remove(key);
            let audio = assets.audio_assets.remove(key);

            if image.is_some() || audio.is_some() {
                log::debug!("Unloaded asset '{key}'");
            }
        });
    }

    /// Draw an image asset on a surface.
    ///
    /// # Arguments
    ///
    /// * `surface` - Surface to draw on, usually the one passed to [`crate::View::on_frame`].
    /// * `asset` - Image region to draw.
    /// * `position` - Top-left corner of the destination in logical pixels.
    /// * `options` - Destination size, defaults to the size of the region.
    #[inline]
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        asset: &ImageAsset,
        position: Point2,
        options: DrawOptions,
    ) {
        let width = options.width.unwrap_or(asset.width as f32);
        let height = options.height.unwrap_or(asset.height as f32);

        surface.set_smoothing(!self.pixel_mode());
        surface.draw_region(
            &asset.resource,
            asset.source_rect(),
            Rect::new(position, Size2::new(width, height)),
        );
    }

    /// Play a sound from the start, restarting it when it's already playing.
    ///
    /// Does nothing when the sound is still loading.
    #[inline]
    pub fn play(&self, audio: &AudioHandle) {
        match &mut *audio.0.borrow_mut() {
            AudioState::Ready(resource) => {
                resource.pause();
                resource.rewind();
                resource.play();
            }
            AudioState::Loading => log::debug!("Ignoring play request for audio still loading"),
        }
    }

    /// Disable or enable smoothing for all following draws.
    #[inline]
    pub fn set_pixel_mode(&self, pixel_mode: bool) {
        self.write(|assets| assets.pixel_mode = pixel_mode);
    }

    /// Whether smoothing is disabled when drawing.
    #[inline]
    #[must_use]
    pub fn pixel_mode(&self) -> bool {
        self.read(|assets| assets.pixel_mode)
    }

    /// Whether an image for the source path is decoded and cached.
    #[inline]
    #[must_use]
    pub fn is_image_cached(&self, src: &str) -> bool {
        self.read(|assets| matches!(assets.images.get(src), Some(ImageSlot::Loaded(..))))
    }

    /// Get the decoded image for a path, loading it only when no other registration did or does.
    async fn load_image(&self, src: &str) -> Result<Rc<Image>> {
        let slot = self.read(|assets| match assets.images.get(src) {
            Some(ImageSlot::Loaded(image)) => Some(Ok(Rc::clone(image))),
            Some(ImageSlot::Pending(pending)) => Some(Err(Rc::clone(pending))),
            None => None,
        });

        match slot {
            // Cached
            Some(Ok(image)) => Ok(image),
            // Another registration is loading it, wait for that
            Some(Err(pending)) => WaitForLoad(pending)
                .await
                .map_err(|message| Error::load(src, message)),
            // Nobody loaded it yet, start the load
            None => {
                let pending = PendingLoad::new_shared();
                self.write(|assets| {
                    assets
                        .images
                        .insert(src.to_owned(), ImageSlot::Pending(Rc::clone(&pending)));
                });

                // Waiters must not hang when this future is dropped before finishing
                let guard = LoadGuard {
                    cache: self,
                    src,
                    pending,
                };

                log::debug!("Loading image '{src}'");
                let load = self.loader.load_image(src);
                let outcome = load.await.map(Rc::new);
                guard.finish(outcome)
            }
        }
    }

    /// Get a read-only reference to the inner struct.
    fn read<R>(&self, reader: impl FnOnce(&AssetCacheInner) -> R) -> R {
        reader(&self.inner.borrow())
    }

    /// Get a mutable reference to the inner struct.
    fn write<R>(&self, writer: impl FnOnce(&mut AssetCacheInner) -> R) -> R {
        writer(&mut self.inner.borrow_mut())
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.read(|assets| {
            f.debug_struct("AssetCache")
                .field("images", &assets.images.len())
                .field("image_assets", &assets.image_assets.len())
                .field("audio_assets", &assets.audio_assets.len())
                .field("pixel_mode", &assets.pixel_mode)
                .finish()
        })
    }
}

/// Owner of an image load in flight.
///
/// Publishes the outcome to everything waiting on the same path, or a cancellation when dropped early.
struct LoadGuard<'cache, 'src> {
    /// Cache the image is stored in.
    cache: &'cache AssetCache,
    /// Source path being loaded.
    src: &'src str,
    /// Shared state the waiters poll.
    pending: Rc<RefCell<PendingLoad>>,
}

impl LoadGuard<'_, '_> {
    /// Store the loaded image, or forget the path when loading failed so it can be retried.
    fn finish(self, outcome: Result<Rc<Image>, BoxedError>) -> Result<Rc<Image>> {
        let src = self.src;

        match outcome {
            Ok(image) => {
                self.cache.write(|assets| {
                    assets
                        .images
                        .insert(src.to_owned(), ImageSlot::Loaded(Rc::clone(&image)));
                });
                self.pending.borrow_mut().finish(Ok(Rc::clone(&image)));

                Ok(image)
            }
            Err(err) => {
                log::debug!("Loading image '{src}' failed: {err}");

                self.cache.write(|assets| assets.images.remove(src));
                self.pending.borrow_mut().finish(Err(err.to_string()));

                Err(Error::load(src, err))
            }
        }
    }
}

impl Drop for LoadGuard<'_, '_> {
    fn drop(&mut self) {
        if self.pending.borrow().is_finished() {
            return;
        }

        log::debug!("Loading image '{}' was cancelled", self.src);

        let src = self.src;
        self.cache.write(|assets| assets.images.remove(src));
        self.pending
            .borrow_mut()
            .finish(Err("loading was cancelled".to_owned()));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        cell::{Cell, RefCell},
        collections::VecDeque,
        future::Future,
        pin::pin,
        rc::Rc,
        sync::Arc,
        task::{Context, Poll, Wake, Waker},
    };

    use glamour::{Point2, Rect, Size2};

    use super::{AssetCache, AudioResource, Image, LoadFuture, ResourceLoader};
    use crate::{
        config::{DrawOptions, ImageOptions},
        error::{BoxedError, Error},
        surface::tests::{Call, RecordingSurface},
    };

    /// In-memory loader counting how often every kind of resource is requested.
    ///
    /// Paths containing `"missing"` fail to load.
    #[derive(Default, Clone)]
    pub(crate) struct TestLoader {
        pub(crate) image_loads: Rc<Cell<usize>>,
        pub(crate) audio_loads: Rc<Cell<usize>>,
        /// Calls made on the loaded sounds.
        pub(crate) audio_calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl ResourceLoader for TestLoader {
        fn load_image(&self, path: &str) -> LoadFuture<Image> {
            self.image_loads.set(self.image_loads.get() + 1);

            let result: Result<Image, BoxedError> = if path.contains("missing") {
                Err(format!("no file at '{path}'").into())
            } else {
                Ok(Image::filled(16, 8, 0xFFFF_FFFF))
            };

            Box::pin(std::future::ready(result))
        }

        fn load_audio(&self, path: &str) -> LoadFuture<Box<dyn AudioResource>> {
            self.audio_loads.set(self.audio_loads.get() + 1);

            let result: Result<Box<dyn AudioResource>, BoxedError> = if path.contains("missing") {
                Err(format!("no file at '{path}'").into())
            } else {
                Ok(Box::new(TestAudio(Rc::clone(&self.audio_calls))))
            };

            Box::pin(std::future::ready(result))
        }
    }

    /// Sound recording the calls made on it.
    struct TestAudio(Rc<RefCell<Vec<&'static str>>>);

    impl AudioResource for TestAudio {
        fn pause(&mut self) {
            self.0.borrow_mut().push("pause");
        }

        fn rewind(&mut self) {
            self.0.borrow_mut().push("rewind");
        }

        fn play(&mut self) {
            self.0.borrow_mut().push("play");
        }
    }

    /// Loader whose loads only finish when the test resolves them.
    #[derive(Default, Clone)]
    struct ManualLoader {
        requests: Rc<RefCell<VecDeque<Rc<RefCell<Option<Image>>>>>>,
    }

    /// Future resolving once its slot is filled.
    struct ManualLoad(Rc<RefCell<Option<Image>>>);

    impl Future for ManualLoad {
        type Output = Result<Image, BoxedError>;

        fn poll(self: std::pin::Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
            self.0.borrow_mut().take().map_or(Poll::Pending, |image| Poll::Ready(Ok(image)))
        }
    }

    impl ResourceLoader for ManualLoader {
        fn load_image(&self, _path: &str) -> LoadFuture<Image> {
            let slot = Rc::new(RefCell::new(None));
            self.requests.borrow_mut().push_back(Rc::clone(&slot));

            Box::pin(ManualLoad(slot))
        }

        fn load_audio(&self, _path: &str) -> LoadFuture<Box<dyn AudioResource>> {
            // Never finishes
            Box::pin(std::future::pending::<Result<Box<dyn AudioResource>, BoxedError>>())
        }
    }

    struct Noop;

    impl Wake for Noop {
        fn wake(self: Arc<Self>) {}
    }

    #[test]
    fn same_source_is_loaded_once() {
        let loader = TestLoader::default();
        let assets = AssetCache::new(loader.clone());

        let (k1, k2) = pollster::block_on(async {
            let k1 = assets
                .register_image("k1", "a.png", ImageOptions::default())
                .await
                .unwrap();
            let k2 = assets
                .register_image("k2", "a.png", ImageOptions::region(4, 2, 8, 4))
                .await
                .unwrap();

            (k1, k2)
        });

        assert_eq!(loader.image_loads.get(), 1);
        assert!(Rc::ptr_eq(&k1.resource, &k2.resource));
        assert!(assets.is_image_cached("a.png"));

        // Independent regions of the same image
        let k1 = assets.get_image("k1").unwrap();
        let k2 = assets.get_image("k2").unwrap();
        assert_eq!((k1.left, k1.top, k1.width, k1.height), (0, 0, 16, 8));
        assert_eq!((k2.left, k2.top, k2.width, k2.height), (4, 2, 8, 4));
        assert_eq!(loader.image_loads.get(), 1);
    }

    #[test]
    fn omitted_size_is_clamped_to_image() {
        let assets = AssetCache::new(TestLoader::default());

        let asset = pollster::block_on(assets.register_image(
            "offset",
            "a.png",
            ImageOptions::default().with_offset(10, 3),
        ))
        .unwrap();

        assert_eq!((asset.width, asset.height), (6, 5));
    }

    #[test]
    fn concurrent_registrations_share_one_load() {
        let loader = ManualLoader::default();
        let assets = AssetCache::new(loader.clone());
        let waker = Waker::from(Arc::new(Noop));
        let mut cx = Context::from_waker(&waker);

        let mut first = pin!(assets.register_image("first", "sheet.png", ImageOptions::default()));
        let mut second =
            pin!(assets.register_image("second", "sheet.png", ImageOptions::region(1, 1, 2, 2)));

        assert!(first.as_mut().poll(&mut cx).is_pending());
        assert!(second.as_mut().poll(&mut cx).is_pending());
        assert_eq!(loader.requests.borrow().len(), 1);
        assert!(assets.get_image("second").is_err());

        // Finish the only load
        let request = loader.requests.borrow_mut().pop_front().unwrap();
        *request.borrow_mut() = Some(Image::filled(4, 4, 0));

        let Poll::Ready(Ok(first)) = first.as_mut().poll(&mut cx) else {
            panic!("first registration should be finished");
        };
        let Poll::Ready(Ok(second)) = second.as_mut().poll(&mut cx) else {
            panic!("second registration should be finished");
        };
        assert!(Rc::ptr_eq(&first.resource, &second.resource));
        assert_eq!(second.width, 2);
    }

    #[test]
    fn cancelled_load_fails_waiters() {
        let loader = ManualLoader::default();
        let assets = AssetCache::new(loader.clone());
        let waker = Waker::from(Arc::new(Noop));
        let mut cx = Context::from_waker(&waker);

        let mut second = pin!(assets.register_image("second", "a.png", ImageOptions::default()));
        {
            let mut first = pin!(assets.register_image("first", "a.png", ImageOptions::default()));
            assert!(first.as_mut().poll(&mut cx).is_pending());
            assert!(second.as_mut().poll(&mut cx).is_pending());
        }

        assert!(matches!(
            second.as_mut().poll(&mut cx),
            Poll::Ready(Err(Error::Load { .. }))
        ));
        assert!(!assets.is_image_cached("a.png"));
    }

    #[test]
    fn failed_image_is_not_registered() {
        let loader = TestLoader::default();
        let assets = AssetCache::new(loader.clone());

        let err = pollster::block_on(assets.register_image(
            "broken",
            "missing.png",
            ImageOptions::default(),
        ))
        .unwrap_err();

        let Error::Load { path, .. } = err else {
            panic!("expected a load error");
        };
        assert_eq!(path, "missing.png");
        assert!(matches!(
            assets.get_image("broken"),
            Err(Error::NotFound { .. })
        ));

        // The failed path is retried
        let _ = pollster::block_on(assets.register_image(
            "broken",
            "missing.png",
            ImageOptions::default(),
        ));
        assert_eq!(loader.image_loads.get(), 2);
    }

    #[test]
    fn audio_is_visible_while_loading() {
        let assets = AssetCache::new(ManualLoader::default());
        let waker = Waker::from(Arc::new(Noop));
        let mut cx = Context::from_waker(&waker);

        let mut register = pin!(assets.register_audio("music", "music.ogg"));
        assert!(register.as_mut().poll(&mut cx).is_pending());

        let handle = assets.get_audio("music").unwrap();
        assert!(!handle.is_loaded());

        // Playing a sound that's still loading is ignored
        assets.play(&handle);
    }

    #[test]
    fn audio_is_loaded_for_every_registration() {
        let loader = TestLoader::default();
        let assets = AssetCache::new(loader.clone());

        pollster::block_on(async {
            assets.register_audio("a", "beep.ogg").await.unwrap();
            assets.register_audio("b", "beep.ogg").await.unwrap();
        });

        assert_eq!(loader.audio_loads.get(), 2);
        assert!(!assets
            .get_audio("a")
            .unwrap()
            .ptr_eq(&assets.get_audio("b").unwrap()));
    }

    #[test]
    fn failed_audio_is_unregistered() {
        let assets = AssetCache::new(TestLoader::default());

        let result = pollster::block_on(assets.register_audio("sfx", "missing.ogg"));

        assert!(matches!(result, Err(Error::Load { .. })));
        assert!(matches!(
            assets.get_audio("sfx"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn unload_removes_both_kinds() {
        let assets = AssetCache::new(TestLoader::default());

        pollster::block_on(async {
            assets
                .register_image("thing", "a.png", ImageOptions::default())
                .await
                .unwrap();
            assets.register_audio("thing", "a.ogg").await.unwrap();
        });

        assets.unload("thing");
        assert!(matches!(
            assets.get_image("thing"),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            assets.get_audio("thing"),
            Err(Error::NotFound { .. })
        ));

        // Unloading again or something unknown is fine
        assets.unload("thing");
        assets.unload("never registered");

        // The decoded image is kept for the path
        assert!(assets.is_image_cached("a.png"));
    }

    #[test]
    fn play_restarts_sound() {
        let loader = TestLoader::default();
        let assets = AssetCache::new(loader.clone());
        let handle = pollster::block_on(assets.register_audio("beep", "beep.ogg")).unwrap();

        assets.play(&handle);
        assets.play(&handle);

        assert_eq!(
            *loader.audio_calls.borrow(),
            ["pause", "rewind", "play", "pause", "rewind", "play"]
        );
    }

    #[test]
    fn draw_uses_asset_region() {
        let assets = AssetCache::new(TestLoader::default());
        let asset = pollster::block_on(assets.register_image(
            "sprite",
            "a.png",
            ImageOptions::region(2, 0, 4, 4),
        ))
        .unwrap();
        let mut surface = RecordingSurface::new(100, 100);

        assets.draw(
            &mut surface,
            &asset,
            Point2::new(10.0, 20.0),
            DrawOptions::default(),
        );
        assets.set_pixel_mode(true);
        assets.draw(
            &mut surface,
            &asset,
            Point2::new(0.0, 0.0),
            DrawOptions::sized(8.0, 2.0),
        );

        assert_eq!(
            surface.calls,
            [
                Call::Smoothing(true),
                Call::Draw {
                    source: Rect::new(Point2::new(2, 0), Size2::new(4, 4)),
                    destination: Rect::new(Point2::new(10.0, 20.0), Size2::new(4.0, 4.0)),
                },
                Call::Smoothing(false),
                Call::Draw {
                    source: Rect::new(Point2::new(2, 0), Size2::new(4, 4)),
                    destination: Rect::new(Point2::new(0.0, 0.0), Size2::new(8.0, 2.0)),
                },
            ]
        );
    }

    #[test]
    fn pixel_mode_lasts_until_disabled() {
        let assets = AssetCache::new(TestLoader::default());
        let asset = pollster::block_on(assets.register_image(
            "sprite",
            "a.png",
            ImageOptions::default(),
        ))
        .unwrap();
        let mut surface = RecordingSurface::new(100, 100);

        assets.set_pixel_mode(true);
        for pixel_mode in [true, false] {
            assets.draw(&mut surface, &asset, Point2::ZERO, DrawOptions::default());
            assets.draw(&mut surface, &asset, Point2::ZERO, DrawOptions::default());
            assert_eq!(assets.pixel_mode(), pixel_mode);

            assets.set_pixel_mode(false);
        }

        let smoothing = surface
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Smoothing(smoothing) => Some(*smoothing),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(smoothing, [false, false, true, true]);
    }
}
