use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::app::UiState;
use crate::state::{FormField, View};
use crate::ui::colors::{HIGHLIGHT_BG, TEXT_DIM, TEXT_PRIMARY};

const LABEL_WIDTH: u16 = 11;

pub fn render_login(f: &mut Frame, app: &UiState, area: Rect) {
    let View::Form(form) = &app.view else {
        return;
    };
    let accent = app.theme.terminal_accent;
    let active = !form.tree_focused;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if active { accent } else { TEXT_DIM }))
        .title(" login ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // email
            Constraint::Length(1), // password
            Constraint::Length(1), // gap
            Constraint::Length(1), // buttons
            Constraint::Min(0),    // hints
        ])
        .split(inner);

    let mask: String = form.password.value().chars().map(|_| '*').collect();
    let fields = [
        (FormField::Email, "email", form.email.value().to_string(), form.email.visual_cursor()),
        (FormField::Password, "password", mask, form.password.visual_cursor()),
    ];

    for (i, (field, label, value, cursor)) in fields.into_iter().enumerate() {
        let focused = active && form.focus == field;
        let label_style = if focused {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_DIM)
        };
        let line = Line::from(vec![
            Span::styled(format!("{:<width$}", label, width = LABEL_WIDTH as usize), label_style),
            Span::styled(value, Style::default().fg(TEXT_PRIMARY)),
        ]);
        let row = chunks[i];
        f.render_widget(Paragraph::new(line), row);

        if focused {
            let x = row.x + LABEL_WIDTH + cursor as u16;
            f.set_cursor_position((x.min(row.right().saturating_sub(1)), row.y));
        }
    }

    let button = |field: FormField, text: &'static str| {
        let style = if active && form.focus == field {
            Style::default().fg(TEXT_PRIMARY).bg(HIGHLIGHT_BG).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(accent)
        };
        Span::styled(text, style)
    };
    let buttons = Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH as usize)),
        button(FormField::Test, "[ test ]"),
        Span::raw("  "),
        button(FormField::Save, "[ save ]"),
    ]);
    f.render_widget(Paragraph::new(buttons), chunks[3]);

    let hint_style = Style::default().fg(TEXT_DIM);
    let hints = if active {
        "tab next  enter submit  esc browse"
    } else {
        "tab/esc back to login  r refresh  q quit"
    };
    f.render_widget(Paragraph::new(Span::styled(hints, hint_style)), chunks[4]);
}
