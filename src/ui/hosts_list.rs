use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{selector::Selector, App, Mode};

pub fn draw_hosts_list(f: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Hosts ({}/{}) ",
        app.selector.cursor() + 1,
        app.selector.len()
    );

    let items = visible_items(&app.selector, Color::Green, |index, text_style| {
        let host = &app.hosts[index];
        let mut spans = vec![Span::styled(host.alias.clone(), text_style)];
        if let Some(comment) = host.attributes.comment() {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("# {comment}"),
                text_style.add_modifier(Modifier::DIM),
            ));
        }
        spans
    });

    let active = app.mode == Mode::Hosts;
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if active {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            })
            .title(title),
    );

    f.render_widget(list, area);
}

pub fn draw_key_picker(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.current_host() {
        Some(host) => format!(" Copy key to {} ", host.alias),
        None => " Keys ".to_string(),
    };

    let items = visible_items(&app.key_selector, Color::Yellow, |index, text_style| {
        let key = &app.keys[index];
        let name = key
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| key.display().to_string());
        vec![Span::styled(name, text_style)]
    });

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );

    f.render_widget(list, area);
}

/// Side panel with the directives of the host under the cursor, comment last.
pub fn draw_details(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(host) = app.current_host() {
        for (key, value) in host.attributes.directives() {
            lines.push(Line::from(vec![
                Span::styled(format!("{key}: "), Style::default().fg(Color::Cyan)),
                Span::raw(value.to_string()),
            ]));
        }
        if let Some(comment) = host.attributes.comment() {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(vec![
                Span::styled("Comment: ", Style::default().fg(Color::LightYellow)),
                Span::styled(
                    comment.to_string(),
                    Style::default().add_modifier(Modifier::ITALIC),
                ),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Details "));

    f.render_widget(paragraph, area);
}

/// Rows in the selector's window, numbered from 1, with the cursor row highlighted.
fn visible_items<'a, F>(selector: &Selector, accent: Color, label: F) -> Vec<ListItem<'a>>
where
    F: Fn(usize, Style) -> Vec<Span<'a>>,
{
    selector
        .visible_range()
        .map(|index| {
            let is_selected = index == selector.cursor();
            let (text_style, bg_style) = if is_selected {
                (
                    Style::default()
                        .fg(Color::Black)
                        .bg(accent)
                        .add_modifier(Modifier::BOLD),
                    Style::default().bg(accent),
                )
            } else {
                (Style::default().fg(Color::White), Style::default())
            };

            let mut spans = vec![
                Span::styled(if is_selected { "> " } else { "  " }, text_style),
                Span::styled(
                    format!("[{}] ", index + 1),
                    if is_selected {
                        text_style
                    } else {
                        text_style.fg(Color::LightYellow)
                    },
                ),
            ];
            spans.extend(label(index, text_style));

            ListItem::new(Line::from(spans)).style(bg_style)
        })
        .collect()
}
