//! Screen navigation and input routing.
//!
//! `App` owns everything the terminal front-end needs: the running
//! [`RoundMachine`] and its [`TimerQueue`], the result hand-off slot, the
//! database handle and the identity provider. The event loop in `main`
//! only forwards terminal events and calls [`App::on_timers`].

use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use webbrowser::Browser;

use crate::auth::{Identity, IdentityProvider};
use crate::clock::{Clock, Millis};
use crate::config::Config;
use crate::difficulty::DifficultyTier;
use crate::gateway::{save_session, SaveOutcome};
use crate::generator::Viewport;
use crate::profile::ProfileStats;
use crate::round::{GameEvent, RoundMachine, Step};
use crate::session::{ResultSlot, SessionConfig, SessionResult};
use crate::store::{LeaderboardEntry, ReflexDb, LEADERBOARD_LIMIT};
use crate::timer::TimerQueue;

/// Logical units covered by one terminal cell
pub const CELL_WIDTH: f64 = 10.0;
pub const CELL_HEIGHT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Home,
    Game,
    Result,
    Leaderboard,
    Profile,
    Login,
    Register,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub difficulty: DifficultyTier,
    /// Base seed for reproducible target placement
    pub seed: Option<u64>,
    pub save_results: bool,
    pub remember_session: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Settings {
    fn from(cfg: &Config) -> Self {
        Self {
            difficulty: cfg.difficulty,
            seed: None,
            save_results: cfg.save_results,
            remember_session: cfg.remember_session,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardView {
    pub difficulty: DifficultyTier,
    pub entries: Vec<LeaderboardEntry>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
    #[default]
    Email,
    Password,
    Username,
}

/// Sign-in / registration form state
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub username: String,
    pub focus: AuthField,
    pub error: Option<String>,
}

impl AuthForm {
    pub fn fields(register: bool) -> &'static [AuthField] {
        if register {
            &[AuthField::Email, AuthField::Password, AuthField::Username]
        } else {
            &[AuthField::Email, AuthField::Password]
        }
    }

    pub fn focus_next(&mut self, register: bool) {
        self.shift_focus(register, 1);
    }

    pub fn focus_prev(&mut self, register: bool) {
        let len = Self::fields(register).len();
        self.shift_focus(register, len - 1);
    }

    fn shift_focus(&mut self, register: bool, by: usize) {
        let fields = Self::fields(register);
        let at = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(at + by) % fields.len()];
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::Username => &mut self.username,
        }
    }

    pub fn push(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn pop(&mut self) {
        self.focused_mut().pop();
    }
}

pub struct App {
    pub state: AppState,
    pub settings: Settings,
    pub game: Option<RoundMachine>,
    pub results: ResultSlot,
    pub last_save: Option<SaveOutcome>,
    pub leaderboard: LeaderboardView,
    pub profile: Option<ProfileStats>,
    pub profile_error: Option<String>,
    pub form: AuthForm,
    pub viewport: Viewport,
    pub should_quit: bool,
    timers: TimerQueue,
    clock: Box<dyn Clock>,
    db: Option<Rc<ReflexDb>>,
    auth: Box<dyn IdentityProvider>,
    sessions_started: u64,
}

impl App {
    pub fn new(
        settings: Settings,
        clock: Box<dyn Clock>,
        db: Option<Rc<ReflexDb>>,
        auth: Box<dyn IdentityProvider>,
    ) -> Self {
        let leaderboard = LeaderboardView {
            difficulty: settings.difficulty,
            ..LeaderboardView::default()
        };
        Self {
            state: AppState::Home,
            settings,
            game: None,
            results: ResultSlot::default(),
            last_save: None,
            leaderboard,
            profile: None,
            profile_error: None,
            form: AuthForm::default(),
            viewport: Viewport::new(800.0, 480.0),
            should_quit: false,
            timers: TimerQueue::new(),
            clock,
            db,
            auth,
            sessions_started: 0,
        }
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.auth.current_session()
    }

    pub fn config(&self) -> Config {
        Config::from(&self.settings)
    }

    /// Switch screens, applying the guards: the result screen needs a
    /// result, the profile needs a signed-in player, and leaving the game
    /// drops the running session.
    pub fn navigate(&mut self, target: AppState) {
        let target = match target {
            AppState::Result if self.results.latest().is_none() => AppState::Home,
            AppState::Profile if self.identity().is_none() => AppState::Login,
            other => other,
        };

        if self.state == AppState::Game && target != AppState::Game {
            if let Some(game) = self.game.take() {
                if !game.is_complete() {
                    tracing::info!(round = game.display_round(), "session abandoned");
                }
            }
        }

        match target {
            AppState::Game => {
                if self.game.is_none() {
                    self.start_game();
                }
                return;
            }
            AppState::Leaderboard => self.refresh_leaderboard(),
            AppState::Profile => self.refresh_profile(),
            AppState::Login | AppState::Register => {
                if !matches!(self.state, AppState::Login | AppState::Register) {
                    self.form = AuthForm::default();
                } else {
                    self.form.error = None;
                    self.form.focus = AuthField::Email;
                }
            }
            AppState::Home | AppState::Result => {}
        }
        self.state = target;
    }

    pub fn start_game(&mut self) {
        let seed = self
            .settings
            .seed
            .map(|s| s.wrapping_add(self.sessions_started));
        self.sessions_started += 1;

        let config = SessionConfig::new(self.settings.difficulty).with_seed(seed);
        let mut game = RoundMachine::new(&config, self.viewport);
        game.start(self.now(), &mut self.timers);
        tracing::info!(difficulty = %config.difficulty, seed = ?seed, "session started");

        self.game = Some(game);
        self.last_save = None;
        self.state = AppState::Game;
    }

    /// Click at a point in logical units
    pub fn click(&mut self, x: f64, y: f64) {
        if self.state != AppState::Game {
            return;
        }
        let now = self.now();
        let step = match self.game.as_mut() {
            Some(game) => game.handle(GameEvent::Click { x, y }, now, &mut self.timers),
            None => return,
        };
        self.apply_step(step);
    }

    /// Deliver every timer due by now
    pub fn on_timers(&mut self) {
        let now = self.now();
        for kind in self.timers.fire_due(now) {
            let step = match self.game.as_mut() {
                Some(game) => game.handle(GameEvent::Timer(kind), now, &mut self.timers),
                None => continue,
            };
            self.apply_step(step);
        }
    }

    /// Time until the next pending timer, if any
    pub fn next_timer_in(&self) -> Option<Duration> {
        let now = self.now();
        self.timers
            .next_deadline()
            .map(|deadline| Duration::from_millis(deadline.saturating_sub(now)))
    }

    fn apply_step(&mut self, step: Step) {
        match step {
            Step::Completed(result) => self.finish_session(result),
            Step::Hit { round, reaction_ms } => {
                tracing::debug!(round = round + 1, reaction_ms, "target hit");
            }
            Step::Missed => tracing::debug!("missed click"),
            _ => {}
        }
    }

    fn finish_session(&mut self, result: SessionResult) {
        tracing::info!(
            mean_ms = result.mean_reaction_ms,
            accuracy = result.accuracy_percent,
            grade = %result.grade(),
            "session complete"
        );
        self.results.put(result.clone());

        let outcome = match (&self.db, self.settings.save_results) {
            (Some(db), true) => save_session(&**db, self.identity().as_ref(), &result),
            _ => SaveOutcome::Skipped,
        };
        self.last_save = Some(outcome);
        self.navigate(AppState::Result);
    }

    pub fn set_terminal_size(&mut self, cols: u16, rows: u16) {
        self.viewport = Viewport::new(cols as f64 * CELL_WIDTH, rows as f64 * CELL_HEIGHT);
        if let Some(game) = self.game.as_mut() {
            game.set_viewport(self.viewport);
        }
    }

    pub fn select_difficulty(&mut self, tier: DifficultyTier) {
        self.settings.difficulty = tier;
        self.leaderboard.difficulty = tier;
    }

    pub fn refresh_leaderboard(&mut self) {
        let Some(db) = &self.db else {
            self.leaderboard.entries.clear();
            self.leaderboard.error = Some("Leaderboard is unavailable offline".to_string());
            return;
        };
        match db.top_leaderboard(self.leaderboard.difficulty, LEADERBOARD_LIMIT) {
            Ok(entries) => {
                self.leaderboard.entries = entries;
                self.leaderboard.error = None;
            }
            Err(e) => {
                tracing::error!("Failed to load leaderboard: {}", e);
                self.leaderboard.entries.clear();
                self.leaderboard.error = Some(e.to_string());
            }
        }
    }

    fn show_leaderboard_for(&mut self, tier: DifficultyTier) {
        self.leaderboard.difficulty = tier;
        self.refresh_leaderboard();
    }

    pub fn refresh_profile(&mut self) {
        self.profile = None;
        self.profile_error = None;
        let (Some(db), Some(who)) = (&self.db, self.identity()) else {
            return;
        };
        match ProfileStats::load(db, who.id) {
            Ok(stats) => self.profile = Some(stats),
            Err(e) => {
                tracing::error!("Failed to load profile: {}", e);
                self.profile_error = Some(e.to_string());
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.auth.sign_out();
        self.profile = None;
        if self.state == AppState::Profile {
            self.navigate(AppState::Home);
        }
    }

    fn submit_form(&mut self) {
        let outcome = match self.state {
            AppState::Login => self.auth.sign_in(&self.form.email, &self.form.password),
            AppState::Register => {
                self.auth
                    .sign_up(&self.form.email, &self.form.password, &self.form.username)
            }
            _ => return,
        };
        match outcome {
            Ok(_) => {
                self.form = AuthForm::default();
                self.navigate(AppState::Home);
            }
            Err(e) => {
                self.form.password.clear();
                self.form.error = Some(e.to_string());
            }
        }
    }

    /// Tweet intent for the latest result
    pub fn share_url(&self) -> Option<String> {
        let result = self.results.latest()?;
        let text = format!(
            "{} ms / {} / {:.2}% acc on {} in reflex",
            result.mean_reaction_ms,
            result.grade(),
            result.accuracy_percent,
            result.difficulty,
        );
        Some(format!(
            "https://twitter.com/intent/tweet?text={}",
            percent_encode(&text)
        ))
    }

    fn share(&self) {
        if let Some(url) = self.share_url() {
            if Browser::is_available() {
                webbrowser::open(&url).unwrap_or_default();
            }
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let (x, y) = cell_centre(mouse.column, mouse.row);
            self.click(x, y);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state {
            AppState::Home => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('s') => self.start_game(),
                KeyCode::Left | KeyCode::Up => self.select_difficulty(self.settings.difficulty.prev()),
                KeyCode::Right | KeyCode::Down => {
                    self.select_difficulty(self.settings.difficulty.next())
                }
                KeyCode::Char(c @ '1'..='3') => {
                    let tier = DifficultyTier::ALL[c as usize - '1' as usize];
                    self.select_difficulty(tier);
                }
                KeyCode::Char('l') => self.navigate(AppState::Leaderboard),
                KeyCode::Char('p') => self.navigate(AppState::Profile),
                KeyCode::Char('i') if self.identity().is_none() => self.navigate(AppState::Login),
                KeyCode::Char('o') => self.sign_out(),
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            AppState::Game => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                    self.navigate(AppState::Home);
                }
            }
            AppState::Result => match key.code {
                KeyCode::Char('r') | KeyCode::Enter => self.start_game(),
                KeyCode::Char('h') | KeyCode::Esc => self.navigate(AppState::Home),
                KeyCode::Char('l') => self.navigate(AppState::Leaderboard),
                KeyCode::Char('i') if self.identity().is_none() => self.navigate(AppState::Login),
                KeyCode::Char('t') => self.share(),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            AppState::Leaderboard => match key.code {
                KeyCode::Tab | KeyCode::Right => {
                    self.show_leaderboard_for(self.leaderboard.difficulty.next())
                }
                KeyCode::BackTab | KeyCode::Left => {
                    self.show_leaderboard_for(self.leaderboard.difficulty.prev())
                }
                KeyCode::Char(c @ '1'..='3') => {
                    self.show_leaderboard_for(DifficultyTier::ALL[c as usize - '1' as usize])
                }
                KeyCode::Char('r') => self.refresh_leaderboard(),
                KeyCode::Char('h') | KeyCode::Esc => self.navigate(AppState::Home),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            AppState::Profile => match key.code {
                KeyCode::Char('s') | KeyCode::Enter => self.start_game(),
                KeyCode::Char('o') => self.sign_out(),
                KeyCode::Char('h') | KeyCode::Esc => self.navigate(AppState::Home),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            AppState::Login | AppState::Register => self.on_form_key(key),
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        let register = self.state == AppState::Register;
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('r') if !register => self.navigate(AppState::Register),
                KeyCode::Char('l') if register => self.navigate(AppState::Login),
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Esc => self.navigate(AppState::Home),
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(register),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(register),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Backspace => self.form.pop(),
            KeyCode::Char(c) => self.form.push(c),
            _ => {}
        }
    }
}

/// Centre of a terminal cell in logical units
pub fn cell_centre(column: u16, row: u16) -> (f64, f64) {
    (
        column as f64 * CELL_WIDTH + CELL_WIDTH / 2.0,
        row as f64 * CELL_HEIGHT + CELL_HEIGHT / 2.0,
    )
}

fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for b in text.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
