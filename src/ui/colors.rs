use std::str::FromStr;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

// Default palette
pub const ORANGE: Color = Color::Rgb(255, 165, 0);
pub const LIGHT_GREEN: Color = Color::Rgb(144, 238, 144);
pub const DARK_CYAN: Color = Color::Rgb(0, 139, 139);
pub const LIVE_RED: Color = Color::Rgb(255, 0, 0);
pub const DARK_RED: Color = Color::Rgb(139, 0, 0);
pub const ORANGE_RED: Color = Color::Rgb(255, 69, 0);
pub const GREEN: Color = Color::Rgb(0, 128, 0);
pub const TEXT_PRIMARY: Color = Color::White;
pub const TEXT_DIM: Color = Color::Rgb(120, 120, 120);
pub const HIGHLIGHT_BG: Color = Color::Rgb(40, 40, 40);

/// Static color table. Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub category_node: Color,
    pub folder_node: Color,
    pub item_node: Color,
    pub action_node: Color,
    pub loading: Color,
    pub live: Color,
    pub update: Color,
    pub no_content: Color,
    pub info: Color,
    pub error: Color,
    pub terminal_accent: Color,
    pub terminal_text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            category_node: ORANGE,
            folder_node: Color::White,
            item_node: LIGHT_GREEN,
            action_node: DARK_CYAN,
            loading: DARK_CYAN,
            live: LIVE_RED,
            update: DARK_RED,
            no_content: ORANGE_RED,
            info: GREEN,
            error: LIVE_RED,
            terminal_accent: GREEN,
            terminal_text: TEXT_PRIMARY,
        }
    }
}

/// Per-color overrides from the config file. Values are color names
/// (`"red"`, `"lightgreen"`) or `#rrggbb`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ThemeOverrides {
    pub category_node: Option<String>,
    pub folder_node: Option<String>,
    pub item_node: Option<String>,
    pub action_node: Option<String>,
    pub loading: Option<String>,
    pub live: Option<String>,
    pub update: Option<String>,
    pub no_content: Option<String>,
    pub info: Option<String>,
    pub error: Option<String>,
    pub terminal_accent: Option<String>,
    pub terminal_text: Option<String>,
}

impl Theme {
    /// Apply config overrides on top of the defaults. Unparseable values are
    /// skipped and returned so the caller can log them.
    pub fn from_overrides(overrides: &ThemeOverrides) -> (Self, Vec<String>) {
        let mut theme = Theme::default();
        let mut rejected = Vec::new();

        let mut apply = |slot: &mut Color, value: &Option<String>| {
            if let Some(raw) = value {
                match Color::from_str(raw.trim()) {
                    Ok(c) => *slot = c,
                    Err(_) => rejected.push(raw.clone()),
                }
            }
        };

        apply(&mut theme.category_node, &overrides.category_node);
        apply(&mut theme.folder_node, &overrides.folder_node);
        apply(&mut theme.item_node, &overrides.item_node);
        apply(&mut theme.action_node, &overrides.action_node);
        apply(&mut theme.loading, &overrides.loading);
        apply(&mut theme.live, &overrides.live);
        apply(&mut theme.update, &overrides.update);
        apply(&mut theme.no_content, &overrides.no_content);
        apply(&mut theme.info, &overrides.info);
        apply(&mut theme.error, &overrides.error);
        apply(&mut theme.terminal_accent, &overrides.terminal_accent);
        apply(&mut theme.terminal_text, &overrides.terminal_text);

        (theme, rejected)
    }
}
