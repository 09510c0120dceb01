use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::UiState;
use crate::output::Level;
use crate::tree::{NodeKind, Row};
use crate::ui::colors::{HIGHLIGHT_BG, TEXT_DIM};

fn marker(row: &Row) -> &'static str {
    let node = &row.node;
    let lazy = matches!(node.kind(), NodeKind::Folder { source: Some(_) });
    if node.has_children() {
        if node.is_expanded() {
            "▾ "
        } else {
            "▸ "
        }
    } else if lazy {
        "▸ "
    } else {
        "  "
    }
}

pub fn render_tree(f: &mut Frame, app: &mut UiState, area: Rect, focused: bool) {
    let rows = app.rows();
    let selected = app.selected_index(&rows);

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            ListItem::new(Line::from(vec![
                Span::raw(indent),
                Span::styled(marker(row), Style::default().fg(TEXT_DIM)),
                Span::styled(row.node.text(), Style::default().fg(row.node.color())),
            ]))
        })
        .collect();

    let border_color = if focused { app.theme.terminal_accent } else { TEXT_DIM };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            format!(" {} ", app.root.text()),
            Style::default().fg(app.theme.terminal_text),
        ));

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(HIGHLIGHT_BG).add_modifier(Modifier::BOLD));

    app.list_state.select(selected);
    f.render_stateful_widget(list, area, &mut app.list_state);
}

pub fn render_output(f: &mut Frame, app: &UiState, area: Rect) {
    let theme = &app.theme;
    let lines: Vec<Line> = app
        .output
        .lines()
        .into_iter()
        .map(|l| {
            let mut spans = Vec::with_capacity(3);
            if l.level != Level::Plain {
                spans.push(Span::styled(
                    format!("{} ", l.time.format("%H:%M:%S")),
                    Style::default().fg(theme.terminal_accent),
                ));
            }
            match l.level {
                Level::Info => spans.push(Span::styled("INFO ", Style::default().fg(theme.info))),
                Level::Error => spans.push(Span::styled("ERROR ", Style::default().fg(theme.error))),
                Level::Plain => {}
            }
            spans.push(Span::styled(l.text, Style::default().fg(theme.terminal_text)));
            Line::from(spans)
        })
        .collect();

    // Keep the newest lines in view (wrapped lines may still push some out)
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height) as u16;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(TEXT_DIM))
        .title(" output ");

    let mut para = Paragraph::new(lines).block(block).scroll((scroll, 0));
    if app.config.terminal_wrap {
        para = para.wrap(Wrap { trim: false });
    }
    f.render_widget(para, area);
}
