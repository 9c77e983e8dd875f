use crate::attendance::{AttendanceForm, AttendanceMark};
use crate::models::ClassDescriptor;
use crate::ui::state::{AppState, LoginField, Notice, NoticeLevel};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const TITLE: &str = "Teacher Attendance System";

pub fn render_ui(frame: &mut Frame, state: &AppState, notice: Option<&Notice>, busy: Option<&str>) {
    match state {
        AppState::Login {
            login_id,
            password,
            focused_field,
        } => render_login(frame, login_id, password, *focused_field),
        AppState::ClassSelection {
            teacher_name,
            classes,
            selected_index,
        } => render_class_selection(frame, teacher_name, classes, *selected_index),
        AppState::LoadingRoster { class } => {
            render_loading(frame, &format!("Loading students for {}...", class.name))
        }
        AppState::Attendance {
            form,
            selected_index,
            date_input,
        } => render_attendance(frame, form, *selected_index, date_input.as_deref()),
    }

    if let Some(message) = busy {
        render_popup(frame, "Please wait", message, Color::Cyan, None);
    } else if let Some(notice) = notice {
        render_notice(frame, notice);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn render_loading(frame: &mut Frame, message: &str) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let paragraph = Paragraph::new(message)
        .block(
            Block::default()
                .title(TITLE)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, chunks[0]);

    let help = Paragraph::new("[Esc: Cancel | q: Quit]")
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(help, chunks[1]);
}

fn render_login(frame: &mut Frame, login_id: &str, password: &str, focused_field: LoginField) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "Teacher Login",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Enter your credentials to access the attendance system"),
    ])
    .block(
        Block::default()
            .title(TITLE)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    )
    .alignment(Alignment::Center);

    frame.render_widget(title, chunks[0]);

    let id_focused = focused_field == LoginField::LoginId;
    let login = Paragraph::new(format!(
        "Login ID: {}{}",
        login_id,
        if id_focused { "_" } else { "" }
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(id_focused)),
    );

    frame.render_widget(login, chunks[1]);

    let pw_focused = focused_field == LoginField::Password;
    let masked = Paragraph::new(format!(
        "Password: {}{}",
        "*".repeat(password.chars().count()),
        if pw_focused { "_" } else { "" }
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(pw_focused)),
    );

    frame.render_widget(masked, chunks[2]);

    let help = Paragraph::new("[Tab: Switch Field | Enter: Sign In | Esc: Quit]")
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(help, chunks[4]);
}

fn render_class_selection(
    frame: &mut Frame,
    teacher_name: &str,
    classes: &[ClassDescriptor],
    selected_index: usize,
) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = classes
        .iter()
        .enumerate()
        .map(|(i, class)| {
            let prefix = if i == selected_index { "> " } else { "  " };
            ListItem::new(format!("{}{}", prefix, class.name)).style(focus_style(i == selected_index))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!("Welcome, {} - Select Class for Attendance", teacher_name))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(list, chunks[0]);

    let help = Paragraph::new(format!(
        "{} class(es) | [↑↓: Navigate | Enter: Select | l: Logout | q: Quit]",
        classes.len()
    ))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);

    frame.render_widget(help, chunks[1]);
}

fn render_attendance(
    frame: &mut Frame,
    form: &AttendanceForm,
    selected_index: usize,
    date_input: Option<&str>,
) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    let title = Paragraph::new(format!("Attendance for {}", form.class().name))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(title, chunks[0]);

    let date_text = match date_input {
        Some(input) => format!("Attendance Date (YYYY-MM-DD): {}_", input),
        None => format!("Attendance Date: {}", form.date()),
    };
    let date = Paragraph::new(date_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(date_input.is_some())),
    );

    frame.render_widget(date, chunks[1]);

    let items: Vec<ListItem> = form
        .roster()
        .iter()
        .enumerate()
        .map(|(i, student)| {
            let (badge, color) = match form.mark(student.id) {
                AttendanceMark::Present => ("[P]", Color::Green),
                AttendanceMark::Absent => ("[A]", Color::Red),
                AttendanceMark::Unmarked => ("[ ]", Color::Gray),
            };
            let prefix = if i == selected_index { "> " } else { "  " };
            let mut name_style = Style::default();
            if i == selected_index {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }

            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::styled(badge, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::styled(student.name.clone(), name_style),
            ]))
        })
        .collect();

    let tally = form.tally();
    let list = List::new(items).block(
        Block::default()
            .title(format!(
                "Students | Present: {} | Absent: {} | Unmarked: {}",
                tally.present, tally.absent, tally.unmarked
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    let mut list_state = ListState::default().with_selected(Some(selected_index));
    frame.render_stateful_widget(list, chunks[2], &mut list_state);

    let help_text = if date_input.is_some() {
        "[Enter: Set Date | Backspace: Delete | Esc: Cancel]"
    } else {
        "[↑↓: Navigate | p: Present | a: Absent | d: Date | s/Enter: Submit | Esc: Back | q: Quit]"
    };
    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(help, chunks[3]);
}

fn render_notice(frame: &mut Frame, notice: &Notice) {
    let color = match notice.level {
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Error => Color::Red,
    };
    render_popup(
        frame,
        &notice.title,
        &notice.message,
        color,
        Some("[Any key: Dismiss]"),
    );
}

fn render_popup(frame: &mut Frame, title: &str, message: &str, color: Color, footer: Option<&str>) {
    let area = centered_rect(60, 9, frame.area());

    let mut text = vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message),
    ];
    if let Some(footer) = footer {
        text.push(Line::from(""));
        text.push(Line::from(footer));
    }

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// Rectangle `percent_x` wide and `height` rows tall, centred in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
