use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Widget},
};

use crate::app::App;
use crate::difficulty::DifficultyTier;
use crate::store::LeaderboardEntry;

use super::{accent, body_and_legend, bold, dim, fit, legend};

const NAME_COLUMN: usize = 20;

fn rank_style(rank: usize) -> Style {
    match rank {
        1 => bold().fg(Color::Yellow),
        2 => bold().fg(Color::Gray),
        3 => bold().fg(Color::Rgb(205, 127, 50)),
        _ => Style::default(),
    }
}

pub fn present_row(entry: &LeaderboardEntry) -> Row<'static> {
    Row::new(vec![
        Cell::from(format!("#{}", entry.rank)).style(rank_style(entry.rank)),
        Cell::from(fit(&entry.username, NAME_COLUMN)),
        Cell::from(format!("{} ms", entry.best_reaction_ms)).style(bold()),
        Cell::from(format!("{:.2}%", entry.average_accuracy)),
        Cell::from(entry.total_tests.to_string()),
    ])
}

pub fn render_leaderboard(app: &App, area: Rect, buf: &mut Buffer) {
    let (body, legend_area) = body_and_legend(area);
    let view = &app.leaderboard;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // tabs
            Constraint::Min(0),    // table
        ])
        .split(body);

    let titles: Vec<Line> = DifficultyTier::ALL
        .iter()
        .enumerate()
        .map(|(i, tier)| Line::from(format!("({}) {}", i + 1, tier.label())))
        .collect();
    let selected = DifficultyTier::ALL
        .iter()
        .position(|t| *t == view.difficulty)
        .unwrap_or(0);
    Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Leaderboard"))
        .select(selected)
        .highlight_style(accent())
        .render(chunks[0], buf);

    if let Some(error) = &view.error {
        Paragraph::new(Span::styled(error.clone(), Style::default().fg(Color::Red)))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    } else if view.entries.is_empty() {
        Paragraph::new(Span::styled("No scores yet. Be the first!", dim()))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    } else {
        let header = Row::new(vec!["Rank", "Player", "Best", "Accuracy", "Tests"]).style(dim());
        let rows: Vec<Row> = view.entries.iter().map(present_row).collect();
        Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(NAME_COLUMN as u16 + 1),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .render(chunks[1], buf);
    }

    Paragraph::new(legend("(tab) difficulty / (r)efresh / (h)ome / (q)uit"))
        .alignment(Alignment::Center)
        .render(legend_area, buf);
}
