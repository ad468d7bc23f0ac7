//! Quiz list with the active filters.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::app::CatalogView;

use super::difficulty_color;

pub fn render(frame: &mut Frame, area: Rect, catalog: &CatalogView) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Filters
        Constraint::Min(5),    // Quizzes
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_filters(frame, chunks[0], catalog);
    render_quizzes(frame, chunks[1], catalog);
    render_controls(frame, chunks[2]);
}

fn render_filters(frame: &mut Frame, area: Rect, catalog: &CatalogView) {
    let filter = &catalog.filter;
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Cyan);

    let line = Line::from(vec![
        Span::styled("category ", label),
        Span::styled(filter.category.clone().unwrap_or_else(|| "all".to_string()), value),
        Span::styled("   difficulty ", label),
        Span::styled(
            filter
                .difficulty
                .map(|d| d.to_string())
                .unwrap_or_else(|| "all".to_string()),
            value,
        ),
        Span::styled("   sort ", label),
        Span::styled(filter.sort.to_string(), value),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_quizzes(frame: &mut Frame, area: Rect, catalog: &CatalogView) {
    let visible = catalog.visible();

    let lines: Vec<Line> = if let Some(error) = &catalog.error {
        vec![Line::from(Span::styled(
            format!("Could not load quizzes: {}", error),
            Style::default().fg(Color::Red),
        ))]
    } else if catalog.loading && catalog.quizzes.is_empty() {
        vec![Line::from(Span::styled(
            "Loading quizzes...",
            Style::default().fg(Color::Yellow),
        ))]
    } else if visible.is_empty() {
        vec![Line::from(Span::styled(
            "No quizzes match the current filters",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        visible
            .iter()
            .enumerate()
            .map(|(i, quiz)| {
                let is_selected = i == catalog.cursor;
                let prefix = if is_selected { "> " } else { "  " };
                let title_style = if is_selected {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::White)
                };

                Line::from(vec![
                    Span::styled(prefix, title_style),
                    Span::styled(format!("{:<32}", quiz.title), title_style),
                    Span::styled(
                        format!("{:<8}", quiz.difficulty),
                        Style::default().fg(difficulty_color(quiz.difficulty)),
                    ),
                    Span::styled(
                        format!("{:<16}", quiz.category),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(
                        format!("{:>3} min  {:>3} q", quiz.time_limit, quiz.question_count()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };

    // Keep the cursor on screen.
    let height = area.height.saturating_sub(2) as usize;
    let offset = catalog.cursor.saturating_sub(height.saturating_sub(1));

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Quizzes ({}) ", visible.len()))
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        )
        .scroll((offset as u16, 0));

    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "j/k move  ·  Enter take  ·  c category  ·  d difficulty  ·  s sort  ·  g reload  ·  q quit",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}
