use crate::app::{App, Mode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let (nav_text, action_text) = match app.mode {
        Mode::Hosts => (
            "↑/k ↓/j Move  [PgUp/PgDn] Page  [Home/End] First/Last",
            "[Enter] Connect  [c] Copy key  [q/Esc] Quit",
        ),
        Mode::KeyPicker => (
            "↑/k ↓/j Move  [PgUp/PgDn] Page  [Home/End] First/Last",
            "[Enter] Copy  [Esc] Back",
        ),
    };

    let nav_help = Paragraph::new(nav_text).style(Style::default().fg(Color::Gray));
    let action_help = Paragraph::new(action_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Right);

    f.render_widget(nav_help, footer[0]);
    f.render_widget(action_help, footer[1]);
}
