use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::ui::colors::ThemeOverrides;

pub const DEFAULT_CATALOG_URL: &str = "https://f1tv.formula1.com/api";
pub const DEFAULT_RELEASE_URL: &str =
    "https://api.github.com/repos/pitwall-tui/pitwall/releases/latest";
pub const RELEASE_PAGE_URL: &str = "https://github.com/pitwall-tui/pitwall/releases/latest";

/// User-defined way of opening a stream URL. `$url` in any argument is
/// replaced by the stream URL.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CustomCommand {
    pub title: String,
    pub command: Vec<String>,
}

impl CustomCommand {
    pub fn new(title: &str, command: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            command: command.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Command line with every `$url` replaced
    pub fn resolve(&self, url: &str) -> Vec<String> {
        self.command.iter().map(|arg| arg.replace("$url", url)).collect()
    }
}

fn default_commands() -> Vec<CustomCommand> {
    vec![CustomCommand::new("Play with MPV", &["mpv", "$url", "--quiet"])]
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub horizontal_layout: bool,
    pub tree_ratio: u16,
    pub output_ratio: u16,
    pub terminal_wrap: bool,
    pub live_poll_interval_secs: u64,
    pub catalog_url: String,
    pub release_url: String,
    pub commands: Vec<CustomCommand>,
    pub theme: ThemeOverrides,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            horizontal_layout: false,
            tree_ratio: 1,
            output_ratio: 1,
            terminal_wrap: true,
            live_poll_interval_secs: 60,
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            release_url: DEFAULT_RELEASE_URL.to_string(),
            commands: default_commands(),
            theme: ThemeOverrides::default(),
        }
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "pitwall", "pitwall")
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load from `path`, or the default location when `None`. A missing file
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => return Ok(AppConfig::default()),
        };
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(config.sanitized())
    }

    pub fn save(&self, path: Option<&Path>) -> Result<(), anyhow::Error> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::default_path)
            .ok_or_else(|| anyhow::anyhow!("no config directory available"))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn live_poll_interval(&self) -> Duration {
        Duration::from_secs(self.live_poll_interval_secs)
    }

    // Zero ratios or interval would break layout / spin the poller
    fn sanitized(mut self) -> Self {
        self.tree_ratio = self.tree_ratio.max(1);
        self.output_ratio = self.output_ratio.max(1);
        self.live_poll_interval_secs = self.live_poll_interval_secs.max(5);
        if self.commands.is_empty() {
            self.commands = default_commands();
        }
        self
    }
}
