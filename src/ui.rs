pub mod screen;

use mathtower::{
    question::Operation,
    surface::{Choice, ChoiceMark, ViewState},
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const TOWER_WIDTH: u16 = 12;

const GOLD: Color = Color::Rgb(255, 215, 0);
const ORANGE: Color = Color::Rgb(255, 136, 0);

/// Countdown colour: gold, orange from 30s, red from 10s
pub fn timer_color(seconds: u64) -> Color {
    if seconds <= 10 {
        Color::Red
    } else if seconds <= 30 {
        ORANGE
    } else {
        GOLD
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn render_menu(app: &App, f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(Operation::ALL.len() as u16 + 2),
            Constraint::Min(3), // speeds
            Constraint::Length(1), // legend
        ])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "mathtower",
        bold().fg(Color::Cyan),
    ))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let selected = Style::default().patch(bold()).fg(Color::Green);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let operations: Vec<Line> = Operation::ALL
        .iter()
        .map(|op| {
            let style = if app.menu.operation == Some(*op) {
                selected
            } else {
                dim
            };
            Line::from(Span::styled(format!("[{}] {}", op.symbol(), op), style))
        })
        .collect();
    f.render_widget(
        Paragraph::new(operations).block(Block::default().borders(Borders::ALL).title("Operation")),
        chunks[1],
    );

    let speeds: Vec<Line> = app
        .speeds()
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let style = if app.menu.speed.as_deref() == Some(label.as_str()) {
                selected
            } else {
                dim
            };
            let ms = app
                .session
                .config()
                .question_duration(label)
                .map(|d| d.as_millis())
                .unwrap_or_default();
            Line::from(Span::styled(
                format!("[{}] {} ({:.1}s per question)", i + 1, label, ms as f64 / 1000.0),
                style,
            ))
        })
        .collect();
    f.render_widget(
        Paragraph::new(speeds).block(Block::default().borders(Borders::ALL).title("Speed")),
        chunks[2],
    );

    let legend_style = if app.menu.is_ready() {
        bold().fg(Color::Yellow)
    } else {
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM)
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            "(+ - * /) operation / (1-9) speed / (enter) start / (esc)ape",
            legend_style,
        ))
        .alignment(Alignment::Center),
        chunks[3],
    );
}

pub fn render_game(app: &App, f: &mut Frame) {
    let view = app.session.surface();
    let area = f.area();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(TOWER_WIDTH)])
        .split(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // score + countdown
            Constraint::Length(1), // hourglass
            Constraint::Min(1),    // padding
            Constraint::Length(3), // question
            Constraint::Length(3), // choices
            Constraint::Length(1), // round progress
            Constraint::Min(1),    // padding
        ])
        .split(columns[0]);

    let seconds = view.seconds_remaining.unwrap_or_default();
    let header = Line::from(vec![
        Span::styled(format!("score {}", view.score), bold()),
        Span::raw("   "),
        Span::styled(format!("{}s", seconds), bold().fg(timer_color(seconds))),
    ]);
    f.render_widget(Paragraph::new(header).alignment(Alignment::Center), chunks[0]);

    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Yellow))
            .ratio(view.hourglass.clamp(0.0, 1.0))
            .label(""),
        chunks[1],
    );

    let question = Paragraph::new(Span::styled(
        view.question.clone().unwrap_or_default(),
        bold().fg(Color::White),
    ))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(question, chunks[3]);

    render_choices(view, f, chunks[4]);

    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(view.round_progress.clamp(0.0, 1.0))
            .label(""),
        chunks[5],
    );

    render_tower(view, f, columns[1]);

    if let Some(warning) = view.warning {
        let style = if warning.is_dramatic() {
            bold().fg(Color::White).bg(Color::Red).add_modifier(Modifier::SLOW_BLINK)
        } else {
            bold().fg(Color::Black).bg(ORANGE)
        };
        let banner_area = centered(columns[0], warning.message().len() as u16 + 4, 3);
        f.render_widget(Clear, banner_area);
        f.render_widget(
            Paragraph::new(Span::styled(warning.message(), style))
                .block(Block::default().borders(Borders::ALL).border_style(style))
                .alignment(Alignment::Center),
            banner_area,
        );
    }
}

fn render_choices(view: &ViewState, f: &mut Frame, area: Rect) {
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, ViewState::SLOTS as u32); ViewState::SLOTS])
        .split(area);

    for (i, choice) in view.choices.iter().enumerate().take(ViewState::SLOTS) {
        let Choice { value, mark } = *choice;
        let style = match mark {
            Some(ChoiceMark::Correct) => bold().fg(Color::Black).bg(Color::Green),
            Some(ChoiceMark::Wrong) => bold().fg(Color::White).bg(Color::Red),
            None if view.choices_locked => Style::default().add_modifier(Modifier::DIM),
            None => bold(),
        };
        f.render_widget(
            Paragraph::new(Span::styled(format!("{}", value), style))
                .block(Block::default().borders(Borders::ALL).title(format!("{}", i + 1)))
                .alignment(Alignment::Center),
            slots[i],
        );
    }
}

fn render_tower(view: &ViewState, f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::LEFT).title("tower");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let capacity = inner.height as usize;
    let visible = view.tower_height.min(capacity);
    let mut lines: Vec<Line> = Vec::with_capacity(capacity);
    for _ in visible..capacity {
        lines.push(Line::raw(""));
    }
    for _ in 0..visible {
        lines.push(Line::from(Span::styled(
            "▇".repeat(inner.width.saturating_sub(2) as usize),
            Style::default().fg(Color::Green),
        )));
    }
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

pub fn render_game_over(app: &App, f: &mut Frame) {
    let view = app.session.surface();
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // score
            Constraint::Length(1), // summary
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
            Constraint::Min(1),
        ])
        .split(area);

    let report = view.final_report.or_else(|| app.session.final_report());

    let score = report.map(|r| r.score).unwrap_or(view.score);
    f.render_widget(
        Paragraph::new(Span::styled(format!("score {}", score), bold().fg(GOLD)))
            .alignment(Alignment::Center),
        chunks[1],
    );

    let summary = report.map(|r| r.to_string()).unwrap_or_default();
    f.render_widget(
        Paragraph::new(Span::styled(summary, bold()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[2],
    );

    f.render_widget(
        Paragraph::new(Span::styled(
            "(r)estart / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
        chunks[4],
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
