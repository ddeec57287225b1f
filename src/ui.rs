pub mod auth;
pub mod charting;
pub mod game;
pub mod home;
pub mod leaderboard;
pub mod profile;
pub mod result;
pub mod screen;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

pub fn draw(app: &App, f: &mut Frame) {
    let area = f.area();
    screen::current_screen(app.state).render(app, area, f.buffer_mut());
}

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub(crate) fn accent() -> Style {
    bold().fg(Color::Red)
}

pub(crate) fn legend(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().add_modifier(Modifier::ITALIC))
}

/// Split `area` into a body and a one-line legend at the bottom
pub(crate) fn body_and_legend(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Truncate to at most `max` display columns, marking the cut with '…'
pub(crate) fn fit(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('…');
    out
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::rc::Rc;

    use ratatui::{buffer::Buffer, layout::Rect};

    use crate::app::{App, Settings};
    use crate::auth::{IdentityProvider, LocalIdentityProvider, OfflineIdentityProvider};
    use crate::clock::ManualClock;
    use crate::store::ReflexDb;

    pub fn offline_app() -> App {
        let settings = Settings {
            seed: Some(1),
            ..Settings::default()
        };
        App::new(
            settings,
            Box::new(ManualClock::new(0)),
            None,
            Box::new(OfflineIdentityProvider),
        )
    }

    /// App backed by an in-memory database with "ana" signed in
    pub fn signed_in_app() -> (App, Rc<ReflexDb>) {
        let db = Rc::new(ReflexDb::open_in_memory().unwrap());
        let mut auth = LocalIdentityProvider::new(Rc::clone(&db), None);
        auth.sign_up("ana@example.com", "secret1", "ana").unwrap();
        let app = App::new(
            Settings::default(),
            Box::new(ManualClock::new(0)),
            Some(Rc::clone(&db)),
            Box::new(auth),
        );
        (app, db)
    }

    pub fn render(app: &App, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        super::screen::current_screen(app.state).render(app, area, &mut buffer);
        buffer
    }

    pub fn text(buffer: &Buffer) -> String {
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }
}
