//! Quiz-taking screen.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap};

use crate::client::app::QuizScreen;
use crate::models::{Question, Quiz};

/// Seconds left at which the timer turns red.
const TIMER_WARNING_SECS: u32 = 60;

pub fn render(frame: &mut Frame, area: Rect, screen: &QuizScreen) {
    let session = &screen.session;
    let (Some(quiz), Some(question)) = (session.quiz(), session.current_question()) else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(3), // Title and timer
        Constraint::Length(1), // Progress
        Constraint::Length(1), // Question map
        Constraint::Length(6), // Question text
        Constraint::Min(6),    // Options
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_title(frame, chunks[0], quiz, screen);
    render_progress(frame, chunks[1], screen);
    render_question_map(frame, chunks[2], screen);
    render_question_text(frame, chunks[3], question, session.current_index(), session.question_count());
    render_options(frame, chunks[4], question, screen.highlight, session.current_answer());
    render_controls(frame, chunks[5]);
}

fn render_title(frame: &mut Frame, area: Rect, quiz: &Quiz, screen: &QuizScreen) {
    let countdown = screen.session.countdown();
    let timer_color = if countdown.remaining() <= TIMER_WARNING_SECS {
        Color::Red
    } else {
        Color::Green
    };

    let columns = Layout::horizontal([Constraint::Min(10), Constraint::Length(12)]).split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(quiz.title.as_str(), Style::default().fg(Color::Cyan).bold())),
        Line::from(Span::styled(
            format!("{}  ·  {}  ·  pass {}%", quiz.category, quiz.difficulty, quiz.passing_score),
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    let timer = Paragraph::new(countdown.display())
        .alignment(Alignment::Center)
        .style(Style::default().fg(timer_color).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(title, columns[0]);
    frame.render_widget(timer, columns[1]);
}

fn render_progress(frame: &mut Frame, area: Rect, screen: &QuizScreen) {
    let answered = screen.session.answered_count();
    let total = screen.session.question_count().max(1);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(answered as f64 / total as f64)
        .label(format!("{} of {} answered", answered, screen.session.question_count()));

    frame.render_widget(gauge, area);
}

/// One cell per question: answered, unanswered, current.
fn render_question_map(frame: &mut Frame, area: Rect, screen: &QuizScreen) {
    let current = screen.session.current_index();

    let spans: Vec<Span> = screen
        .session
        .answers()
        .iter()
        .enumerate()
        .map(|(i, answer)| {
            let mut style = match answer {
                Some(_) => Style::default().fg(Color::Green),
                None => Style::default().fg(Color::DarkGray),
            };
            if i == current {
                style = style.reversed();
            }
            Span::styled(format!(" {} ", i + 1), style)
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_question_text(frame: &mut Frame, area: Rect, question: &Question, index: usize, total: usize) {
    let widget = Paragraph::new(question.text.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Question {} of {} ", index + 1, total))
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    question: &Question,
    highlight: usize,
    chosen: Option<usize>,
) {
    let lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let is_highlighted = i == highlight;
            let is_chosen = chosen == Some(i);
            let prefix = if is_highlighted { "> " } else { "  " };
            let marker = if is_chosen { "(*) " } else { "( ) " };

            let style = match (is_highlighted, is_chosen) {
                (true, _) => Style::default().fg(Color::Yellow).bold(),
                (false, true) => Style::default().fg(Color::Green),
                (false, false) => Style::default().fg(Color::White),
            };

            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(marker, style),
                Span::styled(format!("{}) ", option_label(i)), style),
                Span::styled(opt.as_str(), style),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Options ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

/// `A`, `B`, ... falling back to numbers past `Z`.
pub(super) fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "j/k choose  ·  Enter/Space select  ·  h/l previous/next  ·  1-9 jump  ·  S submit  ·  Esc leave",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}
