//! Audio output for the player.
//!
//! [`AudioOutput`] is the narrow command/notification contract the player
//! surface drives: load a source, play, pause, seek, toggle the native loop
//! flag, and poll for notifications (metadata loaded, time progress, ended,
//! play/pause changes). [`RodioOutput`] implements it on top of a rodio sink.
//! Remote episodes are downloaded on a background thread and handed back over
//! a channel, so loading never blocks the UI loop.

use log::{debug, info, warn};
use podplay::constants::MAX_DOWNLOAD_BYTES;
use podplay::utils::http;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::error::Error;
use std::fs::File;
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

/// Notifications produced by an audio output.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// The source is decoded and ready; duration in seconds when known.
    MetadataLoaded { duration: Option<u64> },
    /// Whole seconds elapsed in the current source.
    TimeUpdate(u64),
    /// The source played to the end and the loop flag was off.
    Ended,
    /// Output started advancing.
    Played,
    /// Output stopped advancing.
    Paused,
    Error(String),
}

pub trait AudioOutput {
    /// Start loading `url`; playback starts on its own once the source is ready.
    fn load(&mut self, url: &str) -> Result<(), Box<dyn Error>>;
    fn unload(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    /// Move the playback position to `position` seconds.
    fn seek(&mut self, position: u64) -> Result<(), Box<dyn Error>>;
    /// While set, the source restarts at its end instead of reporting `Ended`.
    fn set_looping(&mut self, looping: bool);
    fn set_volume(&mut self, volume: f32);
    fn poll_events(&mut self) -> Vec<AudioEvent>;
}

struct Fetched {
    generation: u64,
    result: Result<Vec<u8>, String>,
}

/// Snapshot of the sink taken once per poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SinkState {
    paused: bool,
    empty: bool,
    position: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkAction {
    Continue,
    /// Queue the buffered source again from its start.
    Restart,
    /// Drop the source; the episode is over.
    Finish,
}

/// Turns successive sink snapshots into edge-triggered notifications.
#[derive(Debug)]
struct PlaybackTracker {
    reported_paused: bool,
    last_tick: Option<u64>,
    finished: bool,
}

impl PlaybackTracker {
    fn new() -> Self {
        Self {
            reported_paused: true,
            last_tick: None,
            finished: false,
        }
    }

    fn seeked(&mut self, position: u64) {
        self.last_tick = Some(position);
    }

    fn observe(&mut self, state: SinkState, looping: bool) -> (Vec<AudioEvent>, SinkAction) {
        let mut events = Vec::new();
        if self.finished {
            return (events, SinkAction::Continue);
        }

        if state.paused != self.reported_paused {
            self.reported_paused = state.paused;
            events.push(if state.paused {
                AudioEvent::Paused
            } else {
                AudioEvent::Played
            });
        }

        if state.empty {
            if looping {
                self.last_tick = None;
                return (events, SinkAction::Restart);
            }
            self.finished = true;
            self.reported_paused = true;
            events.push(AudioEvent::Ended);
            return (events, SinkAction::Finish);
        }

        if self.last_tick != Some(state.position) {
            self.last_tick = Some(state.position);
            events.push(AudioEvent::TimeUpdate(state.position));
        }

        (events, SinkAction::Continue)
    }
}

pub struct RodioOutput {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Sink,
    volume: f32,
    looping: bool,
    wants_playing: bool,
    /// Bumped on every load/unload; fetch threads stop once it moves on.
    generation: Arc<AtomicU64>,
    fetch_tx: mpsc::Sender<Fetched>,
    fetch_rx: mpsc::Receiver<Fetched>,
    source: Option<Arc<[u8]>>,
    tracker: PlaybackTracker,
}

impl RodioOutput {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let (stream, stream_handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&stream_handle)?;
        let (fetch_tx, fetch_rx) = mpsc::channel();

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink,
            volume: 1.0,
            looping: false,
            wants_playing: false,
            generation: Arc::new(AtomicU64::new(0)),
            fetch_tx,
            fetch_rx,
            source: None,
            tracker: PlaybackTracker::new(),
        })
    }

    fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    fn append_source(&mut self, bytes: &Arc<[u8]>) -> Result<Option<u64>, String> {
        let decoder = Decoder::new(Cursor::new(bytes.clone()))
            .map_err(|e| format!("Could not decode episode audio: {e}"))?;
        let duration = decoder.total_duration().map(|d| d.as_secs());
        self.sink.append(decoder);
        Ok(duration)
    }

    fn start(&mut self, bytes: Vec<u8>) -> Result<Option<u64>, String> {
        let bytes: Arc<[u8]> = bytes.into();
        let duration = self.append_source(&bytes)?;

        if self.wants_playing {
            self.sink.play();
        } else {
            self.sink.pause();
        }
        self.source = Some(bytes);
        self.tracker = PlaybackTracker::new();

        info!("Episode ready, duration: {duration:?}");
        Ok(duration)
    }

    fn restart_loop(&mut self) -> Result<(), String> {
        if let Some(bytes) = self.source.clone() {
            debug!("Looping episode from the start");
            self.append_source(&bytes)?;
        }
        Ok(())
    }
}

fn read_source(url: &str, keep_going: impl Fn() -> bool) -> Result<Vec<u8>, String> {
    if http::is_remote(url) {
        return http::fetch_bytes(url, keep_going).map_err(|e| e.to_string());
    }

    let path = shellexpand::tilde(url).to_string();
    File::open(&path)
        .map_err(Box::<dyn Error>::from)
        .and_then(|file| http::read_capped(file, MAX_DOWNLOAD_BYTES, keep_going))
        .map_err(|e| format!("Could not read {path}: {e}"))
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, url: &str) -> Result<(), Box<dyn Error>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.sink.stop();
        self.sink = Sink::try_new(&self.stream_handle)?;
        self.sink.set_volume(self.volume);
        self.source = None;
        self.wants_playing = true;
        self.tracker = PlaybackTracker::new();

        let current = self.generation.clone();
        let tx = self.fetch_tx.clone();
        let url = url.to_string();
        info!("Loading episode audio: {url}");

        thread::Builder::new()
            .name("podplay-fetch".to_string())
            .spawn(move || {
                let keep_going = || current.load(Ordering::SeqCst) == generation;
                let result = read_source(&url, &keep_going);
                if !keep_going() {
                    debug!("Abandoned fetch of {url} (generation {generation})");
                    return;
                }
                // The receiver is gone once the player has shut down
                let _ = tx.send(Fetched { generation, result });
            })?;

        Ok(())
    }

    fn unload(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.sink.stop();
        self.source = None;
        self.wants_playing = false;
        self.tracker = PlaybackTracker::new();
    }

    fn play(&mut self) {
        self.wants_playing = true;
        if self.is_loaded() {
            self.sink.play();
        }
    }

    fn pause(&mut self) {
        self.wants_playing = false;
        if self.is_loaded() {
            self.sink.pause();
        }
    }

    fn seek(&mut self, position: u64) -> Result<(), Box<dyn Error>> {
        if !self.is_loaded() {
            return Ok(());
        }
        self.sink
            .try_seek(Duration::from_secs(position))
            .map_err(|e| format!("Seek to {position}s failed: {e:?}"))?;
        self.tracker.seeked(position);
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.sink.set_volume(volume);
    }

    fn poll_events(&mut self) -> Vec<AudioEvent> {
        let mut events = Vec::new();

        let generation = self.generation.load(Ordering::SeqCst);
        while let Ok(fetched) = self.fetch_rx.try_recv() {
            if fetched.generation != generation {
                debug!("Dropping stale download (generation {})", fetched.generation);
                continue;
            }
            match fetched.result.and_then(|bytes| self.start(bytes)) {
                Ok(duration) => events.push(AudioEvent::MetadataLoaded { duration }),
                Err(e) => {
                    warn!("Episode load failed: {e}");
                    events.push(AudioEvent::Error(e));
                }
            }
        }

        if !self.is_loaded() {
            return events;
        }

        let state = SinkState {
            paused: self.sink.is_paused(),
            empty: self.sink.empty(),
            position: self.sink.get_pos().as_secs(),
        };
        let (observed, action) = self.tracker.observe(state, self.looping);
        events.extend(observed);

        match action {
            SinkAction::Continue => {}
            SinkAction::Restart => {
                if let Err(e) = self.restart_loop() {
                    events.push(AudioEvent::Error(e));
                }
            }
            SinkAction::Finish => {
                info!("Episode ended");
                self.source = None;
            }
        }

        events
    }
}
