pub mod api;
pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod nodes;
pub mod output;
pub mod player;
pub mod redraw;
pub mod secret;
pub mod state;
pub mod tree;
pub mod ui;
pub mod update;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
