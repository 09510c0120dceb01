use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tui_input::backend::crossterm::EventHandler;

use crate::app::UiState;
use crate::state::{FormField, View};

pub async fn handle_key(app: &mut UiState, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.stop();
        return;
    }

    let form_has_focus = matches!(&app.view, View::Form(form) if !form.tree_focused);
    if form_has_focus {
        handle_form_key(app, key).await;
    } else {
        handle_tree_key(app, key);
    }
}

fn handle_tree_key(app: &mut UiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.stop(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected(),
        KeyCode::Char('r') => app.refresh_selected(),
        KeyCode::Right | KeyCode::Char('l') => app.expand_selected(),
        KeyCode::Left | KeyCode::Char('h') => app.collapse_selected(),
        // back to the credential form, if one is shown
        KeyCode::Esc | KeyCode::Tab => {
            if let View::Form(form) = &mut app.view {
                form.tree_focused = false;
                app.redraw.request();
            }
        }
        _ => {}
    }
}

enum Submit {
    Test,
    Save,
}

async fn handle_form_key(app: &mut UiState, key: KeyEvent) {
    let View::Form(form) = &mut app.view else {
        return;
    };

    let mut submit = None;
    match key.code {
        KeyCode::Esc => form.tree_focused = true,
        KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
        KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.previous(),
        KeyCode::Enter => match form.focus {
            FormField::Email => form.focus = FormField::Password,
            FormField::Password | FormField::Save => submit = Some(Submit::Save),
            FormField::Test => submit = Some(Submit::Test),
        },
        _ => match form.focus {
            FormField::Email => {
                form.email.handle_event(&Event::Key(key));
            }
            FormField::Password => {
                form.password.handle_event(&Event::Key(key));
            }
            FormField::Test | FormField::Save => {}
        },
    }

    let (username, password) = form.values();
    app.redraw.request();

    match submit {
        Some(Submit::Test) => {
            app.test_credentials(&username, &password).await;
        }
        Some(Submit::Save) => {
            // failure is logged and keeps the form open
            let _ = app.save_and_close(&username, &password).await;
        }
        None => {}
    }
}
