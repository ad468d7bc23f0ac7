//! Rendering of the terminal client.

mod catalog;
mod quiz;
mod results;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::client::app::{App, QuizScreen, Screen};
use crate::models::Difficulty;
use crate::quiz::Phase;

/// Render the screen the app is on.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    let chunks = Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).split(area);
    render_header(frame, chunks[0], app);

    match &app.screen {
        Screen::Catalog => catalog::render(frame, chunks[1], &app.catalog),
        Screen::Quiz(quiz) => render_quiz_screen(frame, chunks[1], quiz),
        Screen::SignedOut { message } => render_status(
            frame,
            chunks[1],
            message,
            Color::Red,
            "Press [Enter] or [Q] to exit",
        ),
    }
}

fn render_quiz_screen(frame: &mut Frame, area: Rect, quiz: &QuizScreen) {
    match quiz.session.phase() {
        Phase::Loading => render_status(frame, area, "Loading quiz...", Color::Yellow, "Esc back"),
        Phase::InProgress => quiz::render(frame, area, quiz),
        Phase::Submitting => render_status(
            frame,
            area,
            "Submitting your answers...",
            Color::Yellow,
            "Esc back",
        ),
        Phase::Completed => results::render(frame, area, quiz),
        Phase::Errored => render_status(
            frame,
            area,
            quiz.session.error().unwrap_or("Could not load the quiz"),
            Color::Red,
            "[R] retry  ·  Esc back",
        ),
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let user = match &app.user {
        Some(user) => Span::styled(
            format!("{}  ·  {} pts ", user.display_name(), user.score),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled("not signed in ", Style::default().fg(Color::DarkGray)),
    };

    let columns = Layout::horizontal([Constraint::Min(10), Constraint::Min(10)]).split(area);
    let title = Paragraph::new(Span::styled(" QUIZ", Style::default().fg(Color::Cyan).bold()))
        .block(Block::default().borders(Borders::BOTTOM).border_style(Color::DarkGray));
    let user = Paragraph::new(user)
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::BOTTOM).border_style(Color::DarkGray));

    frame.render_widget(title, columns[0]);
    frame.render_widget(user, columns[1]);
}

/// Centered message with a hint line below it.
fn render_status(frame: &mut Frame, area: Rect, message: &str, color: Color, hint: &str) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(5),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(Span::styled(message, Style::default().fg(color).bold())),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, chunks[1]);
}

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}
