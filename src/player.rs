use std::process::{Command, Stdio};

use crate::errors::ViewerError;

/// Opens URLs in external programs. Calls return once the program is
/// started; they never wait for it to exit.
pub trait Launcher: Send + Sync {
    fn open_browser(&self, url: &str) -> Result<(), ViewerError>;

    /// Run an already resolved command line (`$url` substituted)
    fn run_command(&self, command: &[String]) -> Result<(), ViewerError>;
}

#[derive(Clone, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for SystemLauncher {
    fn open_browser(&self, url: &str) -> Result<(), ViewerError> {
        webbrowser::open(url).map_err(|e| ViewerError::Launch("browser".to_string(), e.to_string()))
    }

    fn run_command(&self, command: &[String]) -> Result<(), ViewerError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ViewerError::Launch("command".to_string(), "empty command".to_string()))?;

        // Output would corrupt the TUI
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ViewerError::Launch(program.clone(), e.to_string()))?;

        // Reap in the background so the child does not linger as a zombie
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}
