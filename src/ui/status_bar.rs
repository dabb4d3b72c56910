use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let paragraph = match &app.status_message {
        Some(message) => {
            let lower = message.to_lowercase();
            let style = if lower.contains("error") || lower.contains("failed") {
                Style::default().fg(Color::Red)
            } else if lower.contains("success") || lower.contains("ended") {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Yellow)
            };
            Paragraph::new(message.as_str()).style(style)
        }
        None => {
            let count = app.hosts.len();
            let noun = if count == 1 { "host" } else { "hosts" };
            Paragraph::new(format!("{count} {noun}")).style(Style::default().fg(Color::Gray))
        }
    };

    f.render_widget(paragraph.alignment(Alignment::Center), area);
}
