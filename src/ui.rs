pub mod footer;
pub mod hosts_list;
pub mod status_bar;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Mode};
use footer::draw_footer;
use hosts_list::{draw_details, draw_hosts_list, draw_key_picker};
use status_bar::draw_status_bar;

/// Draw the whole menu. Reads `app`, never changes it.
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1), // Title
                Constraint::Min(3),    // Main content
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Footer
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = match app.mode {
        Mode::Hosts => "Select a host to connect",
        Mode::KeyPicker => "Select a key to copy",
    };
    let title = Paragraph::new(title)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(chunks[1]);

    match app.mode {
        Mode::Hosts => draw_hosts_list(f, app, main[0]),
        Mode::KeyPicker => draw_key_picker(f, app, main[0]),
    }
    draw_details(f, app, main[1]);

    draw_status_bar(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh_config::parse_ssh_config_content;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn render(app: &App, width: u16, height: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_draw_shows_only_visible_rows() {
        let content: String = (0..10).map(|i| format!("Host host{i}\n")).collect();
        let mut app = App::new(parse_ssh_config_content(&content).hosts, None);
        app.set_viewport(crate::app::selector::viewport_rows(8));
        for _ in 0..5 {
            app.selector.apply(crate::app::selector::MenuInput::Down);
        }

        let screen = text(&render(&app, 80, 8));

        assert!(screen.contains("> [6] host5"));
        assert!(screen.contains("host3"));
        assert!(!screen.contains("host2"));
        assert!(!screen.contains("host6"));
        assert!(screen.contains("10 hosts"));
    }

    #[test]
    fn test_draw_details_lists_comment_last() {
        let content = "## prod box\nHost web1\n  HostName 10.0.0.1\n  User deploy\n";
        let mut app = App::new(parse_ssh_config_content(content).hosts, None);
        app.set_viewport(10);

        let screen = text(&render(&app, 100, 15));

        let hostname = screen.find("HostName: 10.0.0.1").unwrap();
        let user = screen.find("User: deploy").unwrap();
        let comment = screen.find("Comment: prod box").unwrap();
        assert!(hostname < user && user < comment);
    }
}
