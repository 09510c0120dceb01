pub mod colors;
pub mod form;
pub mod panes;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::app::UiState;
use crate::state::View;

/// Height of the credential form when stacked above the tree
const FORM_HEIGHT: u16 = 9;
/// Width of the credential form when placed beside the tree
const FORM_WIDTH: u16 = 50;

pub fn ui(f: &mut Frame, app: &mut UiState) {
    let area = f.area();

    // `horizontal_layout` stacks tree and output; otherwise side by side
    let outer_direction = if app.config.horizontal_layout {
        Direction::Vertical
    } else {
        Direction::Horizontal
    };
    let chunks = Layout::default()
        .direction(outer_direction)
        .constraints([
            Constraint::Ratio(app.config.tree_ratio as u32, total_ratio(app)),
            Constraint::Ratio(app.config.output_ratio as u32, total_ratio(app)),
        ])
        .split(area);
    let (main_area, output_area) = (chunks[0], chunks[1]);

    let tree_area = if app.view.is_form() {
        let (form_area, tree_area) = split_form(main_area, app.config.horizontal_layout);
        form::render_login(f, app, form_area);
        tree_area
    } else {
        main_area
    };

    let tree_focused = match &app.view {
        View::Form(form) => form.tree_focused,
        View::Browser => true,
    };
    panes::render_tree(f, app, tree_area, tree_focused);
    panes::render_output(f, app, output_area);
}

fn total_ratio(app: &UiState) -> u32 {
    (app.config.tree_ratio as u32 + app.config.output_ratio as u32).max(1)
}

fn split_form(area: Rect, horizontal_layout: bool) -> (Rect, Rect) {
    let (direction, form_size) = if horizontal_layout {
        (Direction::Horizontal, Constraint::Length(FORM_WIDTH))
    } else {
        (Direction::Vertical, Constraint::Length(FORM_HEIGHT))
    };
    let chunks = Layout::default()
        .direction(direction)
        .constraints([form_size, Constraint::Min(1)])
        .split(area);
    (chunks[0], chunks[1])
}
