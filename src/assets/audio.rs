//! Play sounds and music files.

use std::{cell::RefCell, rc::Rc, time::Duration};

use kira::{
    manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings},
    sound::{
        static_sound::{StaticSoundData, StaticSoundHandle},
        PlaybackState,
    },
    tween::Tween,
};

use crate::error::BoxedError;

/// Playable audio resource produced by a [`super::ResourceLoader`].
///
/// [`super::AssetCache::play`] restarts a resource by calling [`Self::pause`], [`Self::rewind`] and [`Self::play`] in that order.
pub trait AudioResource {
    /// Pause playback, keeping the current position.
    ///
    /// Must do nothing when the audio is not playing.
    fn pause(&mut self);

    /// Move the playback position back to the start.
    fn rewind(&mut self);

    /// Start or resume playback from the current position.
    fn play(&mut self);
}

/// Audio manager shared by all sounds loaded from the same source.
pub(crate) type SharedAudioManager = Rc<RefCell<AudioManager<DefaultBackend>>>;

/// Start the audio backend.
///
/// # Errors
///
/// - When the audio manager could not find a device to play audio on.
pub(crate) fn init_audio() -> Result<SharedAudioManager, BoxedError> {
    let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())?;

    log::debug!("Audio manager started");

    Ok(Rc::new(RefCell::new(manager)))
}

/// OGG audio decoded in memory and played through [`kira`].
pub struct KiraAudio {
    /// Decoded sound.
    data: StaticSoundData,
    /// Manager playing the sound.
    manager: SharedAudioManager,
    /// Playing instance, `None` if never played.
    handle: Option<StaticSoundHandle>,
}

impl KiraAudio {
    /// Play already decoded sound data with a manager.
    #[inline]
    #[must_use]
    pub(crate) fn new(data: StaticSoundData, manager: SharedAudioManager) -> Self {
        Self {
            data,
            manager,
            handle: None,
        }
    }
}

impl AudioResource for KiraAudio {
    fn pause(&mut self) {
        if let Some(handle) = &mut self.handle {
            handle.pause(immediately());
        }
    }

    fn rewind(&mut self) {
        if let Some(handle) = &mut self.handle {
            handle.seek_to(0.0);
        }
    }

    fn play(&mut self) {
        // A stopped sound can't be resumed, start a new instance instead
        if let Some(handle) = &mut self.handle {
            if handle.state() != PlaybackState::Stopped {
                handle.resume(immediately());

                return;
            }
        }

        // Cloning the sound here is fine because the frames of the static data are reference counted
        match self.manager.borrow_mut().play(self.data.clone()) {
            Ok(handle) => self.handle = Some(handle),
            Err(err) => log::error!("Error playing sound: {err}"),
        }
    }
}

/// Tween without any fading.
fn immediately() -> Tween {
    Tween {
        duration: Duration::ZERO,
        ..Default::default()
    }
}
