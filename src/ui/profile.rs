use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::app::App;
use crate::store::PROFILE_HISTORY_LIMIT;

use super::charting::{compute_chart_params, format_label};
use super::{accent, body_and_legend, bold, dim, legend};

pub fn render_profile(app: &App, area: Rect, buf: &mut Buffer) {
    let (body, legend_area) = body_and_legend(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // who
            Constraint::Length(2), // stats
            Constraint::Min(3),    // chart
        ])
        .split(body);

    if let Some(who) = app.identity() {
        Paragraph::new(Line::from(vec![
            Span::styled(who.username.clone(), accent()),
            Span::styled(format!("  {}", who.email), dim()),
        ]))
        .render(chunks[0], buf);
    }

    Paragraph::new(legend("(s)tart / sign (o)ut / (h)ome / (q)uit"))
        .alignment(Alignment::Center)
        .render(legend_area, buf);

    if let Some(error) = &app.profile_error {
        Paragraph::new(Span::styled(error.clone(), Style::default().fg(Color::Red)))
            .render(chunks[1], buf);
        return;
    }
    let Some(stats) = app.profile.as_ref() else {
        return;
    };

    Paragraph::new(Line::from(vec![
        Span::styled("average ", dim()),
        Span::styled(format!("{} ms", stats.average_ms), bold()),
        Span::styled("   best ", dim()),
        Span::styled(format!("{} ms", stats.best_ms), bold().fg(Color::Green)),
        Span::styled("   tests ", dim()),
        Span::styled(stats.total_tests.to_string(), bold()),
    ]))
    .render(chunks[1], buf);

    if stats.recent.is_empty() {
        Paragraph::new(Span::styled(
            "No games yet. Finish a session to see your trend.",
            dim(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
        return;
    }

    let points = stats.trend();
    let (x_bounds, y_bounds) = compute_chart_params(&points);
    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Red))
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("last {PROFILE_HISTORY_LIMIT} games")),
        )
        .x_axis(
            Axis::default()
                .title("game")
                .bounds(x_bounds)
                .labels(vec![
                    Span::styled(format_label(x_bounds[0]), bold()),
                    Span::styled(format_label(x_bounds[1]), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("ms")
                .bounds(y_bounds)
                .labels(vec![
                    Span::styled(format_label(y_bounds[0]), bold()),
                    Span::styled(format_label(y_bounds[1]), bold()),
                ]),
        )
        .render(chunks[2], buf);
}
