//! Ratatui rendering for the TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{App, Focus};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(3), // connection form
            Constraint::Min(3),    // log
            Constraint::Length(3), // selector + input
            Constraint::Length(1), // key help
        ])
        .split(frame.area());

    draw_status_bar(frame, app, chunks[0]);
    draw_form(frame, app, chunks[1]);
    draw_log(frame, app, chunks[2]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(10)])
        .split(chunks[3]);
    draw_selector(frame, app, bottom[0]);
    draw_input(frame, app, bottom[1]);

    draw_help(frame, chunks[4]);
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(format!(" {title} "))
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let state = if app.connecting { "Connecting..." } else { "idle" };
    let status_text = format!(
        " [{state}] bots: {} ({} online) | pool: {} | {}",
        app.fleet_size(),
        app.online,
        app.pool_remaining,
        app.channel
    );
    let status = Paragraph::new(status_text)
        .style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(status, area);
}

fn draw_form(frame: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Min(16),
        ])
        .split(area);

    let fields = [
        (Focus::Host, "Host", &app.host),
        (Focus::Port, "Port", &app.port),
        (Focus::Clients, "Clients", &app.clients),
        (Focus::Nicknames, "Nicknames", &app.nicknames),
    ];
    for ((focus, title, value), col) in fields.into_iter().zip(cols.iter()) {
        let focused = app.focus == focus;
        let widget = Paragraph::new(value.as_str()).block(field_block(title, focused));
        frame.render_widget(widget, *col);
        if focused {
            place_cursor(frame, *col, value);
        }
    }
}

fn draw_log(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Log ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = app
        .log
        .tail(inner.height as usize)
        .into_iter()
        .map(|l| {
            let color = if l.contains(" ERROR ") {
                Color::Red
            } else if l.contains(" WARN ") {
                Color::Yellow
            } else {
                Color::Reset
            };
            Line::from(Span::styled(l, Style::default().fg(color)))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_selector(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Selector;
    let label = app
        .selector_options
        .get(app.selected)
        .map(String::as_str)
        .unwrap_or("All");
    let line = Line::from(vec![
        Span::styled("< ", Style::default().fg(Color::DarkGray)),
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(" >", Style::default().fg(Color::DarkGray)),
    ]);
    let title = format!("To {}/{}", app.selected + 1, app.selector_options.len());
    frame.render_widget(Paragraph::new(line).block(field_block(&title, focused)), area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Input;
    let input = Paragraph::new(app.input.as_str()).block(field_block("Input", focused));
    frame.render_widget(input, area);
    if focused {
        place_cursor(frame, area, &app.input);
    }
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        " Tab: next field | Enter/F5: apply fleet size | Enter in input: send | Up/Down: history | Esc: quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

fn place_cursor(frame: &mut Frame, area: Rect, text: &str) {
    let max_x = area.x + area.width.saturating_sub(2);
    let cursor_x = (area.x + 1).saturating_add(text.chars().count() as u16).min(max_x);
    frame.set_cursor_position((cursor_x, area.y + 1));
}
