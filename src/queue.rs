//! Shared episode queue and playback flags.
//!
//! [`EpisodeQueue`] is the single piece of mutable playback state in the
//! application. Consumers receive it by reference: the player reads it to
//! render and calls its transition methods in response to key presses and
//! audio notifications. Every transition is applied in full before the
//! registered listeners are notified, so listeners never observe a partial
//! update.
//!
//! Transitions never fail. Advancing past either end of the queue, or toggling
//! playback with nothing selected, leaves the state untouched.

use crate::episode::Episode;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type Listener = Box<dyn FnMut(&EpisodeQueue)>;

pub struct EpisodeQueue {
    episode_list: Vec<Episode>,
    current_episode_index: Option<usize>,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,
    rng: StdRng,
    listeners: Vec<Listener>,
}

impl Default for EpisodeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EpisodeQueue {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Create an empty queue drawing shuffle picks from `rng`.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            episode_list: Vec::new(),
            current_episode_index: None,
            is_playing: false,
            is_looping: false,
            is_shuffling: false,
            rng,
            listeners: Vec::new(),
        }
    }

    /// Register a listener called after every transition.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&EpisodeQueue) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in listeners.iter_mut() {
            listener(self);
        }
        self.listeners = listeners;
    }

    pub fn episode_list(&self) -> &[Episode] {
        &self.episode_list
    }

    pub fn current_episode_index(&self) -> Option<usize> {
        self.current_episode_index
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.current_episode_index
            .and_then(|index| self.episode_list.get(index))
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    pub fn len(&self) -> usize {
        self.episode_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episode_list.is_empty()
    }

    /// Replace the queue with a single episode and start playing it.
    pub fn play(&mut self, episode: Episode) {
        debug!("Queue: play single episode {}", episode.id);
        self.episode_list = vec![episode];
        self.current_episode_index = Some(0);
        self.is_playing = true;
        self.notify();
    }

    /// Replace the queue with `list` and start playing at `index`.
    ///
    /// An index outside the list leaves nothing selected.
    pub fn play_list(&mut self, list: Vec<Episode>, index: usize) {
        if index >= list.len() {
            warn!(
                "Queue: play_list index {index} out of range for {} episodes, clearing",
                list.len()
            );
            self.clear_player_state();
            return;
        }

        debug!("Queue: play list of {} from index {index}", list.len());
        self.episode_list = list;
        self.current_episode_index = Some(index);
        self.is_playing = true;
        self.notify();
    }

    pub fn toggle_play(&mut self) {
        if self.current_episode_index.is_none() {
            debug!("Queue: toggle_play ignored, nothing selected");
            return;
        }
        self.is_playing = !self.is_playing;
        debug!("Queue: playing = {}", self.is_playing);
        self.notify();
    }

    pub fn toggle_loop(&mut self) {
        self.is_looping = !self.is_looping;
        debug!("Queue: looping = {}", self.is_looping);
        self.notify();
    }

    pub fn toggle_shuffle(&mut self) {
        self.is_shuffling = !self.is_shuffling;
        debug!("Queue: shuffling = {}", self.is_shuffling);
        self.notify();
    }

    /// Reconcile `is_playing` with what the audio output reports.
    pub fn set_playing_state(&mut self, playing: bool) {
        if playing && self.current_episode_index.is_none() {
            debug!("Queue: set_playing_state(true) ignored, nothing selected");
            return;
        }
        if self.is_playing == playing {
            return;
        }
        self.is_playing = playing;
        debug!("Queue: playing reconciled to {playing}");
        self.notify();
    }

    pub fn has_next(&self) -> bool {
        match self.current_episode_index {
            Some(index) => self.is_shuffling || index + 1 < self.episode_list.len(),
            None => false,
        }
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.current_episode_index, Some(index) if index > 0)
    }

    /// Advance to the next episode, or to a random one while shuffling.
    ///
    /// The random pick may land on the current episode again.
    pub fn play_next(&mut self) {
        if !self.has_next() {
            debug!("Queue: play_next ignored, no next episode");
            return;
        }

        let next = if self.is_shuffling {
            self.rng.random_range(0..self.episode_list.len())
        } else {
            self.current_episode_index.map_or(0, |index| index + 1)
        };

        debug!("Queue: next index {next}");
        self.current_episode_index = Some(next);
        self.notify();
    }

    pub fn play_previous(&mut self) {
        let Some(index) = self.current_episode_index.filter(|&i| i > 0) else {
            debug!("Queue: play_previous ignored, at start of queue");
            return;
        };

        debug!("Queue: previous index {}", index - 1);
        self.current_episode_index = Some(index - 1);
        self.notify();
    }

    /// Empty the queue and stop playback.
    pub fn clear_player_state(&mut self) {
        debug!("Queue: cleared");
        self.episode_list.clear();
        self.current_episode_index = None;
        self.is_playing = false;
        self.notify();
    }
}
