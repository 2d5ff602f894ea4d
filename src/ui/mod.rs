//! UI rendering for the gatepass screen.
//!
//! Single screen: a header with the bound identifier, the QR code (or a
//! loading placeholder) centered in the body, a status line, and a footer
//! that doubles as the inline identifier editor.

pub mod qr;
mod theme;

pub use theme::{COLOR_ACCENT, COLOR_BORDER, COLOR_BUSY, COLOR_DIM, COLOR_ERROR, COLOR_OK};

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Mode, Status};

/// Spinner animation frames
const SPINNER_FRAMES: [char; 4] = ['◐', '◓', '◑', '◒'];

/// Render the UI.
pub fn render(frame: &mut Frame, app: &App) {
    let [header, body, status, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    render_header(frame, app, header);
    render_body(frame, app, body);
    render_status(frame, app, status);
    render_footer(frame, app, footer);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let identifier = app.open_id.as_deref().unwrap_or("not bound");
    let title = Line::from(vec![
        Span::styled(
            " GATEPASS ",
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" openId: {}", identifier), Style::default().fg(COLOR_DIM)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER));
    frame.render_widget(Paragraph::new(title).block(block), area);
}

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let Some(payload) = app.pass_code.as_deref() else {
        render_placeholder(frame, app, area);
        return;
    };

    let Some(text) = qr::qr_text(payload, app.scale) else {
        render_message(frame, area, "Pass code could not be encoded", COLOR_ERROR);
        return;
    };

    let width = qr::text_width(&text);
    let height = text.lines.len() as u16;
    if width > area.width || height > area.height {
        render_message(
            frame,
            area,
            "Terminal too small for the QR code (press - to zoom out)",
            COLOR_DIM,
        );
        return;
    }

    let target = centered_rect(area, width, height);
    frame.render_widget(Paragraph::new(text), target);
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect) {
    if app.open_id.is_none() {
        render_message(frame, area, "Press i to bind your openId", COLOR_DIM);
    } else {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        render_message(
            frame,
            area,
            &format!("{} Pass code loading...", spinner),
            COLOR_BUSY,
        );
    }
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: ratatui::style::Color) {
    let width = message.chars().count() as u16;
    let target = centered_rect(area, width.min(area.width), 1);
    frame.render_widget(
        Paragraph::new(Span::styled(message.to_string(), Style::default().fg(color))),
        target,
    );
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let (symbol, color) = status_symbol(&app.status, app.spinner_frame);
    let mut spans = vec![
        Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
        Span::styled(app.status.text(), Style::default().fg(color)),
    ];
    if let Some(at) = app.updated_at {
        spans.push(Span::styled(
            format!("  ·  updated {}", at.format("%H:%M:%S")),
            Style::default().fg(COLOR_DIM),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Pick the status glyph and color: spinner while busy, cross on failure,
/// bullet on success, dim dot when idle.
fn status_symbol(status: &Status, spinner_frame: usize) -> (char, ratatui::style::Color) {
    if status.is_busy() {
        (SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()], COLOR_BUSY)
    } else if status.is_error() {
        ('✗', COLOR_ERROR)
    } else if matches!(status, Status::Idle) {
        ('·', COLOR_DIM)
    } else {
        ('●', COLOR_OK)
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_BORDER));

    let content = match app.mode {
        Mode::EditingIdentifier => Line::from(vec![
            Span::styled("openId: ", Style::default().fg(COLOR_ACCENT)),
            Span::styled(app.input.clone(), Style::default().fg(COLOR_ACCENT)),
            Span::styled("▏", Style::default().fg(COLOR_BUSY)),
            Span::styled("  Enter confirm · Esc cancel", Style::default().fg(COLOR_DIM)),
        ]),
        Mode::Normal => Line::from(Span::styled(
            format!(
                "i set identifier · r refresh · +/- zoom ({:.0}%) · q quit",
                app.scale * 100.0
            ),
            Style::default().fg(COLOR_DIM),
        )),
    };

    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Center a `width` x `height` box inside `area`, clamped to fit.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
