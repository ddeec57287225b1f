use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::app::{App, AuthField, AuthForm};
use crate::auth::{MIN_PASSWORD_LEN, USERNAME_MAX, USERNAME_MIN};

use super::{accent, body_and_legend, dim, legend};

const FORM_WIDTH: u16 = 48;

fn field_label(field: AuthField) -> String {
    match field {
        AuthField::Email => "Email".to_string(),
        AuthField::Password => format!("Password (min {MIN_PASSWORD_LEN})"),
        AuthField::Username => format!("Username ({USERNAME_MIN}-{USERNAME_MAX})"),
    }
}

fn field_value(form: &AuthForm, field: AuthField) -> String {
    match field {
        AuthField::Email => form.email.clone(),
        AuthField::Password => "•".repeat(form.password.chars().count()),
        AuthField::Username => form.username.clone(),
    }
}

pub fn render_auth(app: &App, register: bool, area: Rect, buf: &mut Buffer) {
    let (body, legend_area) = body_and_legend(area);
    let fields = AuthForm::fields(register);

    let column = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(FORM_WIDTH),
            Constraint::Min(0),
        ])
        .split(body)[1];

    let mut constraints = vec![Constraint::Min(0), Constraint::Length(2)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Length(2)); // error
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(column);

    let title = if register { "Create account" } else { "Sign in" };
    Paragraph::new(Span::styled(title, accent()))
        .alignment(Alignment::Center)
        .render(rows[1], buf);

    let form = &app.form;
    for (i, field) in fields.iter().enumerate() {
        let focused = form.focus == *field;
        let border = if focused {
            Style::default().fg(Color::Red)
        } else {
            dim()
        };
        let mut spans = vec![Span::raw(field_value(form, *field))];
        if focused {
            spans.push(Span::styled("_", accent()));
        }
        Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(field_label(*field)),
            )
            .render(rows[2 + i], buf);
    }

    if let Some(error) = &form.error {
        Paragraph::new(Span::styled(error.clone(), Style::default().fg(Color::Red)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(rows[2 + fields.len()], buf);
    }

    let keys = if register {
        "(tab) next field / (enter) register / (ctrl+l) sign in instead / (esc) home"
    } else {
        "(tab) next field / (enter) sign in / (ctrl+r) register instead / (esc) home"
    };
    Paragraph::new(legend(keys))
        .alignment(Alignment::Center)
        .render(legend_area, buf);
}
