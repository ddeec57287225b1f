use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use webbrowser::Browser;

use crate::app::App;
use crate::gateway::SaveOutcome;
use crate::grade::Grade;

use super::{body_and_legend, bold, dim, legend};

fn grade_style(grade: Grade) -> Style {
    if grade.is_elite() {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK)
    } else {
        bold().fg(Color::Red)
    }
}

pub fn render_result(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(result) = app.results.latest() else {
        return;
    };
    let (body, legend_area) = body_and_legend(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // caption
            Constraint::Length(2), // mean
            Constraint::Length(2), // grade
            Constraint::Length(2), // accuracy and difficulty
            Constraint::Length(2), // save status
            Constraint::Min(0),
        ])
        .split(body);

    Paragraph::new(Span::styled("AVERAGE REACTION", dim()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!("{} ms", result.mean_reaction_ms),
        bold().fg(Color::White),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let grade = result.grade();
    Paragraph::new(Line::from(vec![
        Span::styled("grade ", dim()),
        Span::styled(grade.to_string(), grade_style(grade)),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        format!(
            "{:.2}% acc   {}/{} targets   {}",
            result.accuracy_percent,
            result.target_hits,
            result.total_targets,
            result.difficulty.label()
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    let status = match &app.last_save {
        Some(SaveOutcome::Saved { record, new_best }) => {
            if *new_best {
                Span::styled("New personal best!", bold().fg(Color::Green))
            } else {
                Span::styled(
                    format!(
                        "Saved. Best on {}: {} ms",
                        record.difficulty.label(),
                        record.best_reaction_ms
                    ),
                    Style::default().fg(Color::Cyan),
                )
            }
        }
        Some(SaveOutcome::Failed(_)) => Span::styled(
            "Could not save this result",
            Style::default().fg(Color::Red),
        ),
        _ if app.identity().is_none() => Span::styled(
            "s(i)gn in to save your score and get ranked",
            Style::default().add_modifier(Modifier::ITALIC),
        ),
        _ => Span::raw(""),
    };
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[5], buf);

    let keys = if Browser::is_available() {
        "(r)etry / (h)ome / (l)eaderboard / (t)weet / (q)uit"
    } else {
        "(r)etry / (h)ome / (l)eaderboard / (q)uit"
    };
    Paragraph::new(legend(keys))
        .alignment(Alignment::Center)
        .render(legend_area, buf);
}
