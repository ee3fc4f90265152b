//! Where assets are retrieved from on desktop.

use std::{cell::OnceCell, io::Cursor, path::PathBuf, rc::Rc, thread};

use kira::sound::static_sound::StaticSoundData;

use super::{
    audio::{self, AudioResource, KiraAudio, SharedAudioManager},
    image::Image,
    loader::{LoadFuture, ResourceLoader},
};
use crate::error::BoxedError;

/// Work executed on the loading thread.
type Job = Box<dyn FnOnce() + Send>;

/// Background thread reading and decoding files in the order they were requested.
struct Worker {
    /// Queue of the thread, it stops when this is dropped.
    jobs: flume::Sender<Job>,
}

impl Worker {
    /// Start the thread.
    fn spawn() -> Self {
        let (jobs, queue) = flume::unbounded::<Job>();

        let spawned = thread::Builder::new()
            .name("wildflower-assets".to_owned())
            .spawn(move || {
                for job in queue.iter() {
                    job();
                }
            });
        if let Err(err) = spawned {
            // Every load fails because the queue is closed
            log::error!("Error spawning asset loading thread: {err}");
        }

        Self { jobs }
    }

    /// Queue work for the thread.
    fn run(&self, job: impl FnOnce() + Send + 'static) {
        if self.jobs.send(Box::new(job)).is_err() {
            log::warn!("Asset loading thread is not running");
        }
    }
}

/// Loads PNG images and OGG sounds from a directory on disk.
///
/// Files are read and decoded on a background thread, the returned futures resolve once that's done.
pub struct AssetSource {
    /// Directory all paths are relative to.
    runtime_asset_dir: PathBuf,
    /// Loading thread, started with the first load.
    worker: OnceCell<Worker>,
    /// Audio backend, started when the first sound is loaded.
    audio_manager: Rc<OnceCell<SharedAudioManager>>,
}

impl AssetSource {
    /// Load assets relative to a directory.
    #[inline]
    #[must_use]
    pub fn new(runtime_asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_asset_dir: runtime_asset_dir.into(),
            worker: OnceCell::new(),
            audio_manager: Rc::default(),
        }
    }

    /// Get the loading thread, starting it if needed.
    fn worker(&self) -> &Worker {
        self.worker.get_or_init(Worker::spawn)
    }

    /// Read and decode a file on the loading thread.
    fn decode<T: Send + 'static>(
        &self,
        path: &str,
        decode: impl FnOnce(Vec<u8>) -> Result<T, BoxedError> + Send + 'static,
    ) -> flume::Receiver<Result<T, BoxedError>> {
        let file_path = self.runtime_asset_dir.join(path);
        let (sender, receiver) = flume::bounded(1);

        self.worker().run(move || {
            log::debug!("Loading asset from '{}'", file_path.display());

            let result = std::fs::read(&file_path)
                .map_err(BoxedError::from)
                .and_then(decode);

            // Nobody is waiting when the load got cancelled
            let _ = sender.send(result);
        });

        receiver
    }
}

impl ResourceLoader for AssetSource {
    fn load_image(&self, path: &str) -> LoadFuture<Image> {
        let receiver = self.decode(path, |bytes| Image::from_png_bytes(&bytes));

        Box::pin(async move { receiver.into_recv_async().await? })
    }

    fn load_audio(&self, path: &str) -> LoadFuture<Box<dyn AudioResource>> {
        let receiver = self.decode(path, |bytes| {
            Ok(StaticSoundData::from_cursor(Cursor::new(bytes))?)
        });
        let audio_manager = Rc::clone(&self.audio_manager);

        Box::pin(async move {
            let data = receiver.into_recv_async().await??;

            // The audio manager can't leave this thread
            let audio = KiraAudio::new(data, shared_audio_manager(&audio_manager)?);

            Ok(Box::new(audio) as Box<dyn AudioResource>)
        })
    }
}

/// Get the audio backend, starting it if needed.
fn shared_audio_manager(
    audio_manager: &OnceCell<SharedAudioManager>,
) -> Result<SharedAudioManager, BoxedError> {
    if let Some(manager) = audio_manager.get() {
        return Ok(SharedAudioManager::clone(manager));
    }

    let manager = audio::init_audio()?;
    let _ = audio_manager.set(SharedAudioManager::clone(&manager));

    Ok(manager)
}
