use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::difficulty::DifficultyTier;
use crate::session::TOTAL_ROUNDS;

use super::{accent, body_and_legend, bold, dim, fit, legend};

pub fn render_home(app: &App, area: Rect, buf: &mut Buffer) {
    let (body, legend_area) = body_and_legend(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(2), // title
            Constraint::Length(2), // tagline
            Constraint::Length(DifficultyTier::ALL.len() as u16 * 2),
            Constraint::Length(2), // player
            Constraint::Min(0),
        ])
        .split(body);

    Paragraph::new(Span::styled("R E F L E X", accent()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!("Click {TOTAL_ROUNDS} targets as fast as you can"),
        dim(),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[2], buf);

    let mut lines = Vec::new();
    for (i, tier) in DifficultyTier::ALL.iter().enumerate() {
        let selected = *tier == app.settings.difficulty;
        let marker = if selected { "▶ " } else { "  " };
        let style = if selected { accent() } else { bold() };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}({}) {}", i + 1, tier.label()), style),
        ]));
        lines.push(Line::from(Span::styled(tier.description(), dim())));
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let player = match app.identity() {
        Some(who) => Line::from(vec![
            Span::raw("signed in as "),
            Span::styled(fit(who.handle(), 24), Style::default().fg(Color::Cyan)),
        ]),
        None => Line::from(Span::styled("playing anonymously", dim())),
    };
    Paragraph::new(player)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    let keys = if app.identity().is_some() {
        "(enter) start / (←→) difficulty / (l)eaderboard / (p)rofile / sign (o)ut / (q)uit"
    } else {
        "(enter) start / (←→) difficulty / (l)eaderboard / (p)rofile / s(i)gn in / (q)uit"
    };
    Paragraph::new(legend(keys))
        .alignment(Alignment::Center)
        .render(legend_area, buf);
}

#[cfg(test)]
mod tests {
    use crate::app::AppState;
    use crate::ui::test_support::{offline_app, render, signed_in_app, text};

    #[test]
    fn shows_difficulties_and_selection() {
        let app = offline_app();
        let rendered = text(&render(&app, 100, 30));
        assert!(rendered.contains("R E F L E X"));
        assert!(rendered.contains("(1) Easy"));
        assert!(rendered.contains("▶ (2) Normal"));
        assert!(rendered.contains("(3) Hard"));
        assert!(rendered.contains("playing anonymously"));
    }

    #[test]
    fn shows_signed_in_player() {
        let (app, _db) = signed_in_app();
        assert_eq!(app.state, AppState::Home);
        let rendered = text(&render(&app, 100, 30));
        assert!(rendered.contains("signed in as ana"));
        assert!(rendered.contains("sign (o)ut"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let app = offline_app();
        render(&app, 10, 3);
        render(&app, 1, 1);
    }
}
