use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::app::{cell_centre, App};
use crate::generator::TargetGeometry;
use crate::round::Phase;

use super::{bold, dim, legend};

const TARGET_SYMBOL: &str = "█";

pub fn render_game(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(game) = app.game.as_ref() else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // hud
            Constraint::Length(1), // tally
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);
    let hud = Layout::default()
        .direction(Direction::Horizontal)
        .horizontal_margin(1)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    Paragraph::new(Span::styled(
        format!("ROUND {} / {}", game.display_round(), game.total_rounds()),
        bold(),
    ))
    .render(hud[0], buf);
    Paragraph::new(Span::styled(
        game.difficulty().to_string().to_uppercase(),
        dim(),
    ))
    .alignment(Alignment::Right)
    .render(hud[1], buf);

    Paragraph::new(Span::styled(
        format!("hits {}   clicks {}", game.hits().len(), game.total_clicks()),
        dim(),
    ))
    .alignment(Alignment::Center)
    .render(rows[1], buf);

    match game.phase() {
        Phase::Countdown(n) => banner(&n.to_string(), rows[2], buf),
        Phase::Waiting if game.round_index() == 0 => banner("GO!", rows[2], buf),
        Phase::Active { target, .. } => paint_target(target, area, buf),
        Phase::Waiting | Phase::SessionComplete => {}
    }

    Paragraph::new(legend("click the red square / (esc) abandon"))
        .alignment(Alignment::Center)
        .render(rows[3], buf);
}

fn banner(text: &str, area: Rect, buf: &mut Buffer) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);
    Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        bold().fg(Color::White),
    )))
    .alignment(Alignment::Center)
    .render(rows[1], buf);
}

/// Cells of `area` whose centre falls inside the target
pub fn target_cells(target: TargetGeometry, area: Rect) -> Vec<(u16, u16)> {
    let mut cells = Vec::new();
    for row in 0..area.height {
        for col in 0..area.width {
            let (x, y) = cell_centre(col, row);
            if target.contains(x, y) {
                cells.push((area.x + col, area.y + row));
            }
        }
    }
    cells
}

fn paint_target(target: TargetGeometry, area: Rect, buf: &mut Buffer) {
    let style = Style::default().fg(Color::Red);
    for pos in target_cells(target, area) {
        if let Some(cell) = buf.cell_mut(pos) {
            cell.set_symbol(TARGET_SYMBOL).set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_support::{offline_app, render, text};

    #[test]
    fn target_cells_match_hit_test() {
        // 60x60 units at (100, 120): columns 10..=15, rows 6..=8
        let target = TargetGeometry {
            x: 100.0,
            y: 120.0,
            size: 60.0,
        };
        let cells = target_cells(target, Rect::new(0, 0, 80, 24));
        assert_eq!(cells.len(), 6 * 3);
        assert!(cells.contains(&(10, 6)));
        assert!(cells.contains(&(15, 8)));
        assert!(!cells.contains(&(16, 6)));
        assert!(!cells.contains(&(10, 9)));

        for (col, row) in cells {
            let (x, y) = cell_centre(col, row);
            assert!(target.contains(x, y));
        }
    }

    #[test]
    fn countdown_is_shown_first() {
        let mut app = offline_app();
        app.start_game();
        let rendered = text(&render(&app, 80, 24));
        assert!(rendered.contains("ROUND 1 / 10"));
        assert!(rendered.contains("NORMAL"));
        assert!(rendered.contains('3'));
        assert!(!rendered.contains(TARGET_SYMBOL));
    }

    #[test]
    fn nothing_without_a_session() {
        let mut app = offline_app();
        app.state = crate::app::AppState::Game;
        let rendered = text(&render(&app, 40, 10));
        assert!(rendered.trim().is_empty());
    }
}
