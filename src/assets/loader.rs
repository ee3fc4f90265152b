//! How resources are loaded from their source paths.

use std::{future::Future, pin::Pin};

use super::{audio::AudioResource, image::Image};
use crate::error::BoxedError;

/// Pending result of loading a single resource.
///
/// Resolves on a later turn of the event loop when loading is asynchronous on the platform.
pub type LoadFuture<T> = Pin<Box<dyn Future<Output = Result<T, BoxedError>>>>;

/// Platform capability turning source paths into decoded resources.
///
/// The default implementation for desktop is [`super::source::AssetSource`].
///
/// # Example
///
/// ```
/// use wildflower::assets::{AudioResource, Image, LoadFuture, ResourceLoader};
///
/// /// Serves a single white pixel for every image.
/// struct WhitePixels;
///
/// impl ResourceLoader for WhitePixels {
///     fn load_image(&self, _path: &str) -> LoadFuture<Image> {
///         Box::pin(std::future::ready(Ok(Image::filled(1, 1, 0xFFFF_FFFF))))
///     }
///
///     fn load_audio(&self, path: &str) -> LoadFuture<Box<dyn AudioResource>> {
///         let message = format!("no audio available for '{path}'");
///         Box::pin(std::future::ready(Err(message.into())))
///     }
/// }
/// ```
pub trait ResourceLoader {
    /// Start loading and decoding an image.
    fn load_image(&self, path: &str) -> LoadFuture<Image>;

    /// Start loading and decoding a sound.
    fn load_audio(&self, path: &str) -> LoadFuture<Box<dyn AudioResource>>;
}
