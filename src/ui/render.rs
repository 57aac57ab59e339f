//! Frame layout for the call screen: header, phase panel, status bar.

use super::meter::{level_color, spinner_glyph, volume_bar};
use crate::app::{CallApp, Phase};
use crate::contact::ContactField;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

const BORDER: Color = Color::Rgb(255, 90, 90);
const TITLE: Color = Color::Rgb(255, 110, 110);
const DIM: Color = Color::Rgb(130, 70, 70);
const TEXT: Color = Color::Rgb(210, 205, 200);
const INPUT: Color = Color::Rgb(255, 220, 100);
const STATUS: Color = Color::Rgb(160, 150, 150);

const FIELD_HEIGHT: u16 = 3;
const METER_WIDTH: usize = 30;

const START_LABEL: &str = " Start Application Call ";

pub fn draw(frame: &mut Frame<'_>, app: &CallApp<'_>) {
    let [body, status] =
        Layout::vertical([Constraint::Min(5), Constraint::Length(3)]).areas(frame.area());

    match app.phase() {
        Phase::Idle => draw_form(frame, app, body),
        Phase::Starting => draw_waiting(frame, body, " Starting ", "Connecting your call..."),
        Phase::Active => draw_active(frame, app, body),
        Phase::Ending => draw_waiting(
            frame,
            body,
            " Ending ",
            "Loading call details... please wait",
        ),
        Phase::Resulted => draw_results(frame, app, body),
    }
    draw_status(frame, app, status);
}

fn panel(title: &str, border: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            title,
            Style::default().fg(TITLE).add_modifier(Modifier::BOLD),
        ))
}

fn draw_form(frame: &mut Frame<'_>, app: &CallApp<'_>, area: Rect) {
    let outer = panel(" Contact Details ", BORDER);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let mut constraints = vec![Constraint::Length(FIELD_HEIGHT); ContactField::ALL.len()];
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(inner);

    let form = app.form();
    for (index, field) in ContactField::ALL.iter().copied().enumerate() {
        let focused = form.focused() == field;
        let value = form.value(field);
        let (text, style) = if value.is_empty() {
            (field.placeholder(), Style::default().fg(DIM))
        } else {
            (value, Style::default().fg(INPUT))
        };
        let border = if focused { BORDER } else { DIM };
        let input = Paragraph::new(text)
            .style(style)
            .block(panel(field.placeholder(), border).title_style(Style::default().fg(border)));
        let row = rows[index];
        frame.render_widget(input, row);

        if focused {
            let inner_width = row.width.saturating_sub(2);
            let width = UnicodeWidthStr::width(value).min(u16::MAX as usize) as u16;
            frame.set_cursor_position((
                row.x.saturating_add(1).saturating_add(width.min(inner_width)),
                row.y + 1,
            ));
        }
    }

    let button_style = if app.can_start() {
        Style::default()
            .fg(Color::Black)
            .bg(BORDER)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DIM).add_modifier(Modifier::DIM)
    };
    let button = Paragraph::new(Line::from(Span::styled(START_LABEL, button_style)));
    frame.render_widget(button, rows[ContactField::ALL.len()]);
}

fn draw_waiting(frame: &mut Frame<'_>, area: Rect, title: &str, message: &str) {
    let text = Line::from(vec![
        Span::styled(
            format!("{} ", spinner_glyph()),
            Style::default().fg(INPUT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(message.to_string(), Style::default().fg(TEXT)),
    ]);
    frame.render_widget(Paragraph::new(text).block(panel(title, BORDER)), area);
}

fn draw_active(frame: &mut Frame<'_>, app: &CallApp<'_>, area: Rect) {
    let speaking = if app.assistant_is_speaking() {
        Span::styled(
            "● Assistant speaking",
            Style::default().fg(INPUT).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("○ Listening", Style::default().fg(STATUS))
    };
    let level = app.volume_level();
    let meter = Line::from(vec![
        Span::styled("Volume ", Style::default().fg(TEXT)),
        Span::styled(
            volume_bar(level, METER_WIDTH),
            Style::default().fg(level_color(level)),
        ),
        Span::styled(
            format!(" {:>3.0}%", level.clamp(0.0, 1.0) * 100.0),
            Style::default().fg(STATUS),
        ),
    ]);
    let mut lines = vec![Line::from(speaking), meter, Line::default()];
    if let Some(id) = app.call_id() {
        lines.push(Line::from(Span::styled(
            format!("Call {id}"),
            Style::default().fg(DIM),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled(
            "Enter ",
            Style::default().fg(INPUT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("end call", Style::default().fg(TEXT)),
    ]));
    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(panel(" Call In Progress ", BORDER)),
        area,
    );
}

fn draw_results(frame: &mut Frame<'_>, app: &CallApp<'_>, area: Rect) {
    let Some(result) = app.result() else {
        return;
    };
    let label = Style::default().fg(TITLE).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![
            Span::styled("Qualified: ", label),
            Span::styled(result.qualified_label(), Style::default().fg(INPUT)),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled("Summary: ", label),
            Span::styled(
                result.summary_label().to_string(),
                Style::default().fg(TEXT),
            ),
        ]),
    ];
    let results = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(panel(" Call Results ", BORDER));
    frame.render_widget(results, area);
}

fn draw_status(frame: &mut Frame<'_>, app: &CallApp<'_>, area: Rect) {
    let hints = match app.phase() {
        Phase::Idle => " Tab next  Enter start  Esc quit ",
        Phase::Active => " Enter end call  Esc quit ",
        Phase::Resulted => " Enter new call  Esc quit ",
        Phase::Starting | Phase::Ending => " Esc quit ",
    };
    let status = Paragraph::new(app.status_text())
        .style(Style::default().fg(STATUS))
        .block(
            panel(" Status ", DIM)
                .title_bottom(Line::from(Span::styled(hints, Style::default().fg(DIM)))),
        );
    frame.render_widget(status, area);
}
