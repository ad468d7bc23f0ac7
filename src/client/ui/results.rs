//! Result of a completed attempt and the answer review.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::app::QuizScreen;
use crate::models::Quiz;
use crate::quiz::{QuizOutcome, ScoreSource};

use super::quiz::option_label;

pub fn render(frame: &mut Frame, area: Rect, screen: &QuizScreen) {
    let session = &screen.session;
    let (Some(quiz), Some(outcome)) = (session.quiz(), session.outcome()) else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(6), // Score summary
        Constraint::Length(2), // Source banner
        Constraint::Min(6),    // Review
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], quiz, outcome);
    render_source(frame, chunks[1], &outcome.source);
    render_review(frame, chunks[2], quiz, session.answers(), screen.scroll);
    render_controls(frame, chunks[3]);
}

fn render_score_summary(frame: &mut Frame, area: Rect, quiz: &Quiz, outcome: &QuizOutcome) {
    let result = &outcome.result;
    let (verdict, color) = if result.passed {
        ("PASSED", Color::Green)
    } else {
        ("NOT PASSED", Color::Red)
    };

    let content = vec![
        Line::from(Span::styled(quiz.title.as_str(), Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}%  ·  {}", result.score, verdict),
            Style::default().fg(color).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "{} of {} correct  ·  {}:{:02} taken  ·  pass mark {}%",
                result.correct_answers,
                result.total_questions,
                result.time_taken / 60,
                result.time_taken % 60,
                quiz.passing_score,
            ),
            Style::default().fg(Color::Gray),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, area);
}

fn render_source(frame: &mut Frame, area: Rect, source: &ScoreSource) {
    let line = match source {
        ScoreSource::Server => Line::from(Span::styled(
            "Score confirmed by the server",
            Style::default().fg(Color::DarkGray),
        )),
        ScoreSource::LocalEstimate {
            unverifiable,
            reason,
        } => {
            let mut text = format!("Local estimate, submission failed: {}", reason);
            if *unverifiable > 0 {
                text.push_str(&format!(" ({} answers could not be checked)", unverifiable));
            }
            Line::from(Span::styled(text, Style::default().fg(Color::Yellow).bold()))
        }
    };

    let widget = Paragraph::new(line)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_review(frame: &mut Frame, area: Rect, quiz: &Quiz, answers: &[Option<usize>], scroll: usize) {
    let mut lines = Vec::new();

    for (index, (question, answer)) in quiz.questions.iter().zip(answers).enumerate() {
        let (symbol, color) = match answer.and_then(|a| question.is_correct(a)) {
            Some(true) => ("+", Color::Green),
            Some(false) => ("-", Color::Red),
            None if answer.is_none() => (".", Color::DarkGray),
            None => ("?", Color::Yellow),
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
            Span::styled(format!("{:2}. ", index + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(question.text.as_str(), Style::default().fg(Color::White)),
        ]));

        let chosen = match answer.and_then(|a| question.options.get(a).map(|text| (a, text))) {
            Some((a, text)) => format!("{}) {}", option_label(a), text),
            None => "not answered".to_string(),
        };
        lines.push(Line::from(Span::styled(
            format!("      your answer: {}", chosen),
            Style::default().fg(Color::Gray),
        )));

        if let Some(correct) = question
            .correct_option_index
            .and_then(|c| question.options.get(c).map(|text| (c, text)))
        {
            lines.push(Line::from(Span::styled(
                format!("      correct: {}) {}", option_label(correct.0), correct.1),
                Style::default().fg(Color::Green),
            )));
        }
        if let Some(explanation) = &question.explanation {
            lines.push(Line::from(Span::styled(
                format!("      {}", explanation),
                Style::default().fg(Color::DarkGray).italic(),
            )));
        }
    }

    // Scroll is counted in questions; find the first line of that question.
    let offset = line_offset(quiz, scroll);

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Review ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        )
        .scroll((offset as u16, 0));

    frame.render_widget(widget, area);
}

fn line_offset(quiz: &Quiz, scroll: usize) -> usize {
    quiz.questions
        .iter()
        .take(scroll)
        .map(|q| {
            2 + usize::from(q.correct_option_index.is_some_and(|c| c < q.options.len()))
                + usize::from(q.explanation.is_some())
        })
        .sum()
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  r retake  ·  Esc back  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}
