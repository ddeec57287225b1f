use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, AppState};

/// A UI Screen boundary: renders one [`AppState`]
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

pub struct HomeScreen;

impl Screen for HomeScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::home::render_home(app, area, buf);
    }
}

pub struct GameScreen;

impl Screen for GameScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::game::render_game(app, area, buf);
    }
}

pub struct ResultScreen;

impl Screen for ResultScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::result::render_result(app, area, buf);
    }
}

pub struct LeaderboardScreen;

impl Screen for LeaderboardScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::leaderboard::render_leaderboard(app, area, buf);
    }
}

pub struct ProfileScreen;

impl Screen for ProfileScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::profile::render_profile(app, area, buf);
    }
}

/// Sign-in and registration share one form renderer
pub struct AuthScreen {
    pub register: bool,
}

impl Screen for AuthScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::auth::render_auth(app, self.register, area, buf);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Home => Box::new(HomeScreen),
        AppState::Game => Box::new(GameScreen),
        AppState::Result => Box::new(ResultScreen),
        AppState::Leaderboard => Box::new(LeaderboardScreen),
        AppState::Profile => Box::new(ProfileScreen),
        AppState::Login => Box::new(AuthScreen { register: false }),
        AppState::Register => Box::new(AuthScreen { register: true }),
    }
}
