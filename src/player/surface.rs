//! Player surface: binds the episode queue to the audio output.
//!
//! The surface owns only display state (elapsed seconds, the duration the
//! output reported, a transient status line). Everything else is read from the
//! [`EpisodeQueue`] it is handed on each call, and the transport controls'
//! enabled/active flags are re-derived from it every time [`PlayerSurface::view`]
//! runs.

use super::audio::{AudioEvent, AudioOutput};
use log::{debug, warn};
use podplay::episode::Episode;
use podplay::queue::EpisodeQueue;
use podplay::utils::time::format_seconds;
use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Control {
    pub enabled: bool,
    pub active: bool,
}

/// Range slider model: position `value` out of `max` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekBar {
    pub max: u64,
    pub value: u64,
}

impl SeekBar {
    pub fn ratio(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            (self.value as f64 / self.max as f64).clamp(0.0, 1.0)
        }
    }
}

pub struct PlayerView<'a> {
    pub episode: Option<&'a Episode>,
    pub is_playing: bool,
    pub shuffle: Control,
    pub previous: Control,
    pub play_pause: Control,
    pub next: Control,
    pub repeat: Control,
    pub elapsed: String,
    pub total: String,
    pub seek_bar: Option<SeekBar>,
}

pub struct PlayerSurface {
    progress: u64,
    reported_duration: Option<u64>,
    /// Queue index and URL the output currently holds.
    loaded: Option<(usize, String)>,
    synced_playing: bool,
    synced_looping: Option<bool>,
    seek_step: u64,
    status: Option<String>,
}

impl PlayerSurface {
    pub fn new(seek_step: u64) -> Self {
        Self {
            progress: 0,
            reported_duration: None,
            loaded: None,
            synced_playing: false,
            synced_looping: None,
            seek_step: seek_step.max(1),
            status: None,
        }
    }

    pub fn progress(&self) -> u64 {
        self.progress
    }

    /// Latest audio error, cleared once taken.
    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    /// Make the next sync load the current episode again.
    pub fn reload(&mut self) {
        self.loaded = None;
    }

    /// Total length of the current episode: the listing's value, or what the
    /// output reported when the listing has none.
    pub fn duration(&self, queue: &EpisodeQueue) -> Option<u64> {
        queue
            .current_episode()
            .map(|episode| episode.duration)
            .filter(|&d| d > 0)
            .or(self.reported_duration)
    }

    /// Bring the audio output in line with the queue after a transition.
    pub fn sync(
        &mut self,
        queue: &EpisodeQueue,
        audio: &mut dyn AudioOutput,
    ) -> Result<(), Box<dyn Error>> {
        let current = queue
            .current_episode_index()
            .zip(queue.current_episode().map(|episode| episode.url.clone()));

        if current != self.loaded {
            self.progress = 0;
            self.reported_duration = None;
            self.loaded = current.clone();
            match current {
                Some((_, url)) => {
                    audio.load(&url)?;
                    // Outputs start playing on their own once loaded
                    self.synced_playing = true;
                }
                None => {
                    audio.unload();
                    self.synced_playing = false;
                }
            }
        }

        if self.synced_looping != Some(queue.is_looping()) {
            audio.set_looping(queue.is_looping());
            self.synced_looping = Some(queue.is_looping());
        }

        if self.loaded.is_some() && queue.is_playing() != self.synced_playing {
            if queue.is_playing() {
                audio.play();
            } else {
                audio.pause();
            }
            self.synced_playing = queue.is_playing();
        }

        Ok(())
    }

    pub fn handle_event(
        &mut self,
        event: AudioEvent,
        queue: &mut EpisodeQueue,
        audio: &mut dyn AudioOutput,
    ) {
        match event {
            AudioEvent::MetadataLoaded { duration } => {
                debug!("Metadata loaded, duration {duration:?}");
                self.reported_duration = duration;
                self.progress = 0;
                if let Err(e) = audio.seek(0) {
                    warn!("Could not rewind new episode: {e}");
                }
            }
            AudioEvent::TimeUpdate(elapsed) => {
                self.progress = elapsed;
            }
            AudioEvent::Ended => {
                // Force a reload on the next sync, even if the same episode is picked again
                self.loaded = None;
                if queue.has_next() {
                    queue.play_next();
                } else {
                    queue.clear_player_state();
                }
            }
            AudioEvent::Played => {
                self.synced_playing = true;
                queue.set_playing_state(true);
            }
            AudioEvent::Paused => {
                self.synced_playing = false;
                queue.set_playing_state(false);
            }
            AudioEvent::Error(message) => {
                warn!("Audio error: {message}");
                self.status = Some(message);
                self.synced_playing = false;
                queue.set_playing_state(false);
            }
        }
    }

    /// Seek request from the slider; the displayed time updates immediately.
    pub fn seek(
        &mut self,
        value: u64,
        queue: &EpisodeQueue,
        audio: &mut dyn AudioOutput,
    ) -> Result<(), Box<dyn Error>> {
        if queue.current_episode().is_none() {
            return Ok(());
        }
        let value = match self.duration(queue) {
            Some(max) => value.min(max),
            None => value,
        };

        audio.seek(value)?;
        self.progress = value;
        Ok(())
    }

    pub fn seek_forward(
        &mut self,
        queue: &EpisodeQueue,
        audio: &mut dyn AudioOutput,
    ) -> Result<(), Box<dyn Error>> {
        self.seek(self.progress.saturating_add(self.seek_step), queue, audio)
    }

    pub fn seek_backward(
        &mut self,
        queue: &EpisodeQueue,
        audio: &mut dyn AudioOutput,
    ) -> Result<(), Box<dyn Error>> {
        self.seek(self.progress.saturating_sub(self.seek_step), queue, audio)
    }

    pub fn view<'a>(&self, queue: &'a EpisodeQueue) -> PlayerView<'a> {
        let episode = queue.current_episode();
        let selected = episode.is_some();
        let total = self.duration(queue);

        PlayerView {
            episode,
            is_playing: queue.is_playing(),
            shuffle: Control {
                enabled: selected && queue.len() > 1,
                active: queue.is_shuffling(),
            },
            previous: Control {
                enabled: selected && queue.has_previous(),
                active: false,
            },
            play_pause: Control {
                enabled: selected,
                active: queue.is_playing(),
            },
            next: Control {
                enabled: selected && queue.has_next(),
                active: false,
            },
            repeat: Control {
                enabled: selected,
                active: queue.is_looping(),
            },
            elapsed: format_seconds(self.progress),
            total: format_seconds(total.unwrap_or(0)),
            seek_bar: episode.map(|_| SeekBar {
                max: total.unwrap_or(0),
                value: self.progress,
            }),
        }
    }
}
