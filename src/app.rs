//! App: terminal init, main loop, tick and key handling.

use crate::GameConfig;
use crate::game::Session;
use crate::highscores::HighScore;
use crate::input::{Action, key_to_action};
use crate::repeat::{Direction, RepeatScheduler};
use crate::snapshot::Snapshot;
use crate::theme::Theme;
use crate::timing::IntervalTimer;
use crate::ui::{self, LineFlash, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Ready,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug)]
pub struct App {
    config: GameConfig,
    theme: Theme,
    high_score: HighScore,
    session: Session,
    screen: Screen,
    /// Gravity: one soft drop per `drop_ms`.
    gravity: IntervalTimer,
    repeat: RepeatScheduler,
    flash: LineFlash,
    show_ghost: bool,
    /// Best score was beaten during the current game.
    new_best: bool,
    games_started: u64,
    /// Terminal reports key releases; without them each press is a single move.
    release_events: bool,
    seen_locks: u64,
    seen_level: u32,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, high_score: HighScore) -> Self {
        let session = Session::new(config.seed, config.initial_level);
        let mut app = Self {
            gravity: IntervalTimer::new(Duration::from_millis(session.drop_ms())),
            repeat: RepeatScheduler::new(config.repeat_delay, config.repeat_interval),
            show_ghost: config.show_ghost,
            seen_level: session.level(),
            session,
            config,
            theme,
            high_score,
            screen: Screen::Ready,
            flash: LineFlash::default(),
            new_best: false,
            games_started: 0,
            release_events: false,
            seen_locks: 0,
        };
        if app.config.autostart {
            app.new_game(Instant::now());
        }
        app
    }

    /// Fresh session; the first game uses the configured seed, later ones step from it.
    fn new_game(&mut self, now: Instant) {
        self.gravity.cancel();
        self.repeat.cancel_all();
        self.flash.clear();
        let seed = self.config.seed.wrapping_add(self.games_started);
        self.games_started += 1;
        self.session = Session::new(seed, self.config.initial_level);
        log::info!("new game: seed {seed}, level {}", self.session.level());
        self.seen_locks = self.session.pieces_locked();
        self.seen_level = self.session.level();
        self.new_best = false;
        self.gravity = IntervalTimer::new(Duration::from_millis(self.session.drop_ms()));
        self.gravity.start(now);
        self.screen = Screen::Playing;
        self.after_command(now);
    }

    fn pause(&mut self) {
        self.gravity.cancel();
        self.repeat.cancel_all();
        self.screen = Screen::Paused;
    }

    fn resume(&mut self, now: Instant) {
        self.gravity.start(now);
        self.screen = Screen::Playing;
    }

    fn move_piece(&mut self, dir: Direction) {
        match dir {
            Direction::Left => self.session.move_left(),
            Direction::Right => self.session.move_right(),
            Direction::Down => self.session.soft_drop(),
        };
    }

    /// Bookkeeping after any session mutation: lock effects, speed changes, best score, game over.
    fn after_command(&mut self, now: Instant) {
        if self.session.pieces_locked() != self.seen_locks {
            self.seen_locks = self.session.pieces_locked();
            self.repeat.cancel_all();
            if let Some(clear) = self.session.last_clear() {
                self.flash.trigger(&clear.rows);
            }
        }
        if self.session.level() != self.seen_level {
            self.seen_level = self.session.level();
            self.gravity.restart_with(Duration::from_millis(self.session.drop_ms()), now);
        }
        if self.high_score.observe(self.session.score()) {
            self.new_best = true;
        }
        if self.session.is_game_over() && self.screen == Screen::Playing {
            self.gravity.cancel();
            self.repeat.cancel_all();
            self.screen = Screen::GameOver;
        }
    }

    /// Handle one key event. Returns false when the player quits.
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        let action = key_to_action(key);
        match key.kind {
            KeyEventKind::Release => {
                if let Some(dir) = action.direction() {
                    self.repeat.release(dir);
                }
                return true;
            }
            // Held keys repeat through the scheduler, not the terminal.
            KeyEventKind::Repeat => return true,
            KeyEventKind::Press => {}
        }

        match (self.screen, action) {
            (_, Action::Quit) => return false,
            (_, Action::ToggleGhost) => self.show_ghost = !self.show_ghost,
            (Screen::Paused, Action::Pause) => self.resume(now),
            (Screen::Playing, Action::Pause) => self.pause(),
            (_, Action::NewGame) => self.new_game(now),
            (Screen::Playing, action) => {
                match action {
                    Action::Move(dir) => {
                        if !self.release_events || self.repeat.press(dir, now) {
                            self.move_piece(dir);
                        }
                    }
                    Action::Rotate => {
                        self.session.rotate();
                    }
                    Action::Hold => {
                        self.session.hold();
                    }
                    Action::HardDrop => {
                        self.session.hard_drop();
                    }
                    _ => {}
                }
                self.after_command(now);
            }
            _ => {}
        }
        true
    }

    /// Advance timers to `now`: held-key repeats first, then gravity.
    fn tick(&mut self, now: Instant) {
        if self.screen != Screen::Playing {
            return;
        }
        for dir in self.repeat.tick(now) {
            self.move_piece(dir);
            self.after_command(now);
            if self.screen != Screen::Playing {
                return;
            }
        }
        if self.gravity.poll(now) {
            self.session.soft_drop();
            self.after_command(now);
        }
    }

    /// What the renderer sees; the ready screen shows an empty well.
    fn display_snapshot(&self) -> Snapshot {
        let mut snap = self.session.snapshot();
        if self.screen == Screen::Ready {
            snap.piece = None;
            snap.ghost_y = None;
        }
        snap
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
                supports_keyboard_enhancement,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Key releases stop held-key repeats; only some terminals report them.
        self.release_events = supports_keyboard_enhancement().unwrap_or(false);
        if self.release_events {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        } else {
            log::info!("terminal does not report key releases, using its own key repeat");
        }

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        let result = self.run_loop(&mut terminal);

        // Restore
        if self.release_events {
            let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        }
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            let snapshot = self.display_snapshot();
            let view = View {
                screen: self.screen,
                snapshot: &snapshot,
                theme: &self.theme,
                best: self.high_score.best(),
                new_best: self.new_best,
                show_ghost: self.show_ghost,
                seed: self.session.seed(),
            };
            terminal.draw(|f| ui::draw(f, &view, &mut self.flash, now))?;

            let mut timeout = frame_duration.saturating_sub(now.elapsed());
            if let Some(gravity_due) = self.gravity.remaining(Instant::now()) {
                timeout = timeout.min(gravity_due);
            }
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if !self.handle_key(key, Instant::now()) {
                            return Ok(());
                        }
                    }
                }
            }
            self.tick(Instant::now());
        }
    }
}
