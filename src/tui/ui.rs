use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::app::{App, InputMode};
use crate::scheduler::ReminderState;
use crate::sync::SyncStatus;

const TOAST_WIDTH: u16 = 36;
const TOAST_HEIGHT: u16 = 4;

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let now = Local::now().naive_local();
    let tasks = app.visible_tasks();

    let rows: Vec<Row> = tasks
        .iter()
        .map(|t| {
            let (status, style) = match app.session.state_of(t, now) {
                ReminderState::Inert => (
                    "Done",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT),
                ),
                ReminderState::Due => ("Due", Style::default().fg(Color::Red)),
                ReminderState::Pending => ("Pending", Style::default().fg(Color::Yellow)),
                ReminderState::NotArmed => ("-", Style::default()),
            };
            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(t.description.clone()),
                Cell::from(t.due_time.map(|d| d.to_string()).unwrap_or_default()),
                Cell::from(status),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(8),
    ];

    let sync = match app.session.sync_status() {
        SyncStatus::Loading => "loading",
        SyncStatus::Synced => "synced",
        SyncStatus::Unsynced => "offline",
        SyncStatus::Diverged => "out of sync",
    };
    let title = format!("Remindust - Tasks [{sync}]");

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["ID", "Task", "Time", "Status"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[0], &mut app.state);

    let help_text = match app.input_mode {
        InputMode::Normal => match &app.message {
            Some(msg) => msg.clone(),
            None => "q: Quit | a: Add | Space: Done | d: Del | c: Toggle Done | s: Push | x: Dismiss | z: Hold".to_string(),
        },
        InputMode::Adding => "Enter: Next Step | Esc: Cancel".to_string(),
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[1]);

    render_toasts(f, app, chunks[0]);

    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);

        let title = match app.add_state.step {
            0 => "Add Task: Enter Description".to_string(),
            _ => match &app.message {
                Some(err) => format!("Add Task: Reminder Time (HH:MM, optional) - {err}"),
                None => "Add Task: Reminder Time (HH:MM, optional)".to_string(),
            },
        };

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(input, area);
    }
}

/// Stacks toasts in the top-right corner of `area`, oldest on top.
fn render_toasts(f: &mut Frame, app: &App, area: Rect) {
    let toasts = &app.session.dispatcher().surface().toasts;
    let width = TOAST_WIDTH.min(area.width);
    let mut y = area.y + 1;
    for toast in toasts.iter() {
        if y + TOAST_HEIGHT > area.y + area.height {
            break;
        }
        let rect = Rect::new(area.x + area.width - width, y, width, TOAST_HEIGHT);
        let title = if toast.held { "Reminder (held)" } else { "Reminder" };
        let body = Paragraph::new(toast.message.as_str())
            .style(Style::default().fg(Color::Black).bg(Color::Green))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(Clear, rect);
        f.render_widget(body, rect);
        y += TOAST_HEIGHT;
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
