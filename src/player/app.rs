//! Main application state and control flow for the podcast player.
//!
//! This module ties the episode listing, the shared [`EpisodeQueue`], the
//! [`PlayerSurface`] and an [`AudioOutput`] together. It owns the terminal
//! lifecycle and the main event loop: audio notifications and key presses are
//! applied in the order they arrive, the surface re-syncs the output whenever
//! the queue reports a transition, and the UI is redrawn every tick.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use podplay::config::Config;
use podplay::episode::{Episode, load_episodes};
use podplay::queue::EpisodeQueue;
use podplay::utils::time::parse_locale;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;
use std::{error::Error, io, time::Duration};

use super::audio::{AudioOutput, RodioOutput};
use super::surface::PlayerSurface;
use super::ui;

const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

pub struct App {
    pub should_quit: bool,
    pub library: Vec<Episode>,
    pub selected: usize,
    pub queue: EpisodeQueue,
    pub surface: PlayerSurface,
    pub locale: chrono::Locale,
    pub status_message: Option<String>,
    status_timer: Option<Instant>,
    changed: Rc<Cell<bool>>,
}

impl App {
    pub fn new(library: Vec<Episode>, config: &Config) -> Result<Self, Box<dyn Error>> {
        let mut queue = EpisodeQueue::new();
        let changed = Rc::new(Cell::new(false));

        let flag = changed.clone();
        queue.subscribe(move |q| {
            log::debug!(
                "Queue changed: index {:?}, playing {}, looping {}, shuffling {}",
                q.current_episode_index(),
                q.is_playing(),
                q.is_looping(),
                q.is_shuffling()
            );
            flag.set(true);
        });

        Ok(Self {
            should_quit: false,
            library,
            selected: 0,
            queue,
            surface: PlayerSurface::new(config.seek_step_secs),
            locale: parse_locale(&config.date_locale)?,
            status_message: None,
            status_timer: None,
            changed,
        })
    }

    /// Returns true once per batch of queue transitions.
    fn take_changed(&self) -> bool {
        self.changed.replace(false)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_timer = Some(Instant::now());
    }

    fn expire_status(&mut self) {
        if let Some(timer) = self.status_timer
            && timer.elapsed() > STATUS_TIMEOUT
        {
            self.status_message = None;
            self.status_timer.take();
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.library.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Queue the whole listing and start at `index`.
    pub fn play_from(&mut self, index: usize) -> Result<(), Box<dyn Error>> {
        if index >= self.library.len() {
            return Err(format!(
                "Episode index {index} out of range ({} episodes)",
                self.library.len()
            )
            .into());
        }
        info!("Playing listing from episode {index}");
        self.selected = index;
        self.surface.reload();
        self.queue.play_list(self.library.clone(), index);
        Ok(())
    }

    /// Queue only the episode at `index`.
    pub fn play_single(&mut self, index: usize) -> Result<(), Box<dyn Error>> {
        let episode = self.library.get(index).cloned().ok_or_else(|| {
            format!(
                "Episode index {index} out of range ({} episodes)",
                self.library.len()
            )
        })?;
        info!("Playing single episode {}", episode.id);
        self.selected = index;
        self.surface.reload();
        self.queue.play(episode);
        Ok(())
    }

    fn apply_audio_events(&mut self, audio: &mut dyn AudioOutput) {
        for event in audio.poll_events() {
            self.surface.handle_event(event, &mut self.queue, audio);
        }
        if let Some(message) = self.surface.take_status() {
            self.set_status(message);
        }
    }

    fn sync_audio(&mut self, audio: &mut dyn AudioOutput) {
        if !self.take_changed() {
            return;
        }
        if let Err(e) = self.surface.sync(&self.queue, audio) {
            error!("Could not sync audio output: {e}");
            self.set_status(format!("Audio error: {e}"));
            self.queue.set_playing_state(false);
        }
    }

    fn seek_result(&mut self, result: Result<(), Box<dyn Error>>) {
        if let Err(e) = result {
            error!("Seek failed: {e}");
            self.set_status(format!("Seek failed: {e}"));
        }
    }
}

pub fn run(
    source: &str,
    start_index: Option<usize>,
    single: bool,
) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    init_logging(&config.log_path())?;
    info!("Starting podplay with listing {source}");

    // Load everything fallible before taking over the terminal
    let library = load_episodes(source)?;
    let mut app = App::new(library, &config)?;
    let mut audio = RodioOutput::new()?;
    audio.set_volume(config.volume);

    if let Some(index) = start_index {
        if single {
            app.play_single(index)?;
        } else {
            app.play_from(index)?;
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &mut audio);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        error!("Player stopped with error: {e}");
    }
    info!("Exiting podplay");
    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    audio: &mut dyn AudioOutput,
) -> Result<(), Box<dyn Error>> {
    loop {
        app.apply_audio_events(audio);
        app.sync_audio(audio);
        app.expire_status();

        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with a short timeout so progress keeps updating
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(app, key, audio)?;
            app.sync_audio(audio);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key_event(
    app: &mut App,
    key: KeyEvent,
    audio: &mut dyn AudioOutput,
) -> Result<(), Box<dyn Error>> {
    let view = app.surface.view(&app.queue);
    let (shuffle, previous, play_pause, next, repeat) = (
        view.shuffle.enabled,
        view.previous.enabled,
        view.play_pause.enabled,
        view.next.enabled,
        view.repeat.enabled,
    );

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter => {
            if !app.library.is_empty() {
                app.play_from(app.selected)?;
            }
        }
        KeyCode::Char('p') => {
            if !app.library.is_empty() {
                app.play_single(app.selected)?;
            }
        }
        KeyCode::Char(' ') if play_pause => app.queue.toggle_play(),
        KeyCode::Char('n') if next => app.queue.play_next(),
        KeyCode::Char('b') if previous => app.queue.play_previous(),
        KeyCode::Char('s') if shuffle => app.queue.toggle_shuffle(),
        KeyCode::Char('l') if repeat => app.queue.toggle_loop(),
        KeyCode::Char('c') => app.queue.clear_player_state(),
        KeyCode::Right => {
            let result = app.surface.seek_forward(&app.queue, audio);
            app.seek_result(result);
        }
        KeyCode::Left => {
            let result = app.surface.seek_backward(&app.queue, audio);
            app.seek_result(result);
        }
        KeyCode::Home => {
            let result = app.surface.seek(0, &app.queue, audio);
            app.seek_result(result);
        }
        _ => {}
    }
    Ok(())
}

fn init_logging(log_file: &Path) -> Result<(), Box<dyn Error>> {
    use simplelog::{CombinedLogger, LevelFilter, WriteLogger};
    use std::fs::File;

    CombinedLogger::init(vec![WriteLogger::new(
        LevelFilter::Debug,
        simplelog::Config::default(),
        File::create(log_file)?,
    )])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::audio::AudioEvent;
    use crossterm::event::KeyModifiers;
    use podplay::episode::parse_episodes;

    #[derive(Default)]
    struct SilentOutput {
        loads: Vec<String>,
        seeks: Vec<u64>,
    }

    impl AudioOutput for SilentOutput {
        fn load(&mut self, url: &str) -> Result<(), Box<dyn Error>> {
            self.loads.push(url.to_string());
            Ok(())
        }
        fn unload(&mut self) {}
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn seek(&mut self, position: u64) -> Result<(), Box<dyn Error>> {
            self.seeks.push(position);
            Ok(())
        }
        fn set_looping(&mut self, _looping: bool) {}
        fn set_volume(&mut self, _volume: f32) {}
        fn poll_events(&mut self) -> Vec<AudioEvent> {
            Vec::new()
        }
    }

    fn library() -> Vec<Episode> {
        parse_episodes(
            r#"[
            { "id": "a", "title": "A", "members": "Ana", "published_at": "2021-01-03 10:00:00",
              "file": { "url": "a.mp3", "duration": 100 } },
            { "id": "b", "title": "B", "members": "Bia", "published_at": "2021-01-02 10:00:00",
              "file": { "url": "b.mp3", "duration": 200 } },
            { "id": "c", "title": "C", "members": "Caio", "published_at": "2021-01-01 10:00:00",
              "file": { "url": "c.mp3", "duration": 300 } }
        ]"#,
        )
        .unwrap()
    }

    fn new_app() -> App {
        App::new(library(), &Config::new()).unwrap()
    }

    fn press(app: &mut App, audio: &mut SilentOutput, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE), audio).unwrap();
        app.sync_audio(audio);
    }

    #[test]
    fn test_new_app_initial_state() {
        let app = new_app();

        assert!(!app.should_quit);
        assert_eq!(app.library.len(), 3);
        assert_eq!(app.selected, 0);
        assert!(app.queue.is_empty());
        assert!(app.status_message.is_none());
        assert!(!app.take_changed());
    }

    #[test]
    fn test_new_app_rejects_bad_locale() {
        let mut config = Config::new();
        config.date_locale = "nope".to_string();
        assert!(App::new(library(), &config).is_err());
    }

    #[test]
    fn test_selection_is_bounded() {
        let mut app = new_app();
        app.select_previous();
        assert_eq!(app.selected, 0);

        for _ in 0..10 {
            app.select_next();
        }
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn test_enter_plays_listing_from_selection() {
        let mut app = new_app();
        let mut audio = SilentOutput::default();

        press(&mut app, &mut audio, KeyCode::Down);
        press(&mut app, &mut audio, KeyCode::Enter);

        assert_eq!(app.queue.len(), 3);
        assert_eq!(app.queue.current_episode_index(), Some(1));
        assert!(app.queue.is_playing());
        assert_eq!(audio.loads, vec!["b.mp3".to_string()]);
    }

    #[test]
    fn test_p_plays_single_episode() {
        let mut app = new_app();
        let mut audio = SilentOutput::default();

        press(&mut app, &mut audio, KeyCode::Char('j'));
        press(&mut app, &mut audio, KeyCode::Char('j'));
        press(&mut app, &mut audio, KeyCode::Char('p'));

        assert_eq!(app.queue.len(), 1);
        assert_eq!(app.queue.current_episode().unwrap().id, "c");
        assert_eq!(audio.loads, vec!["c.mp3".to_string()]);
    }

    #[test]
    fn test_transport_keys_are_gated_by_controls() {
        let mut app = new_app();
        let mut audio = SilentOutput::default();

        // Nothing selected: every transport key is ignored
        for code in ['n', 'b', 's', 'l', ' '] {
            press(&mut app, &mut audio, KeyCode::Char(code));
        }
        assert!(!app.queue.is_shuffling());
        assert!(!app.queue.is_looping());
        assert!(!app.queue.is_playing());

        press(&mut app, &mut audio, KeyCode::Char('p'));
        // A single episode keeps shuffle disabled
        press(&mut app, &mut audio, KeyCode::Char('s'));
        assert!(!app.queue.is_shuffling());
        press(&mut app, &mut audio, KeyCode::Char('l'));
        assert!(app.queue.is_looping());
        press(&mut app, &mut audio, KeyCode::Char(' '));
        assert!(!app.queue.is_playing());
    }

    #[test]
    fn test_next_and_previous_keys() {
        let mut app = new_app();
        let mut audio = SilentOutput::default();

        press(&mut app, &mut audio, KeyCode::Enter);
        press(&mut app, &mut audio, KeyCode::Char('n'));
        assert_eq!(app.queue.current_episode_index(), Some(1));
        press(&mut app, &mut audio, KeyCode::Char('b'));
        assert_eq!(app.queue.current_episode_index(), Some(0));
        press(&mut app, &mut audio, KeyCode::Char('b'));
        assert_eq!(app.queue.current_episode_index(), Some(0));

        assert_eq!(
            audio.loads,
            vec!["a.mp3".to_string(), "b.mp3".to_string(), "a.mp3".to_string()]
        );
    }

    #[test]
    fn test_seek_keys() {
        let mut app = new_app();
        let mut audio = SilentOutput::default();

        press(&mut app, &mut audio, KeyCode::Enter);
        press(&mut app, &mut audio, KeyCode::Right);
        press(&mut app, &mut audio, KeyCode::Right);
        press(&mut app, &mut audio, KeyCode::Left);
        press(&mut app, &mut audio, KeyCode::Home);

        assert_eq!(audio.seeks, vec![10, 20, 10, 0]);
        assert_eq!(app.surface.progress(), 0);
    }

    #[test]
    fn test_clear_key_empties_queue() {
        let mut app = new_app();
        let mut audio = SilentOutput::default();

        press(&mut app, &mut audio, KeyCode::Enter);
        press(&mut app, &mut audio, KeyCode::Char('c'));

        assert!(app.queue.is_empty());
        assert!(!app.queue.is_playing());
    }

    #[test]
    fn test_play_from_out_of_range() {
        let mut app = new_app();
        assert!(app.play_from(3).is_err());
        assert!(app.play_single(9).is_err());
        assert!(app.queue.is_empty());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = new_app();
        let mut audio = SilentOutput::default();
        press(&mut app, &mut audio, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = new_app();
        press(&mut app, &mut audio, KeyCode::Esc);
        assert!(app.should_quit);
    }
}
