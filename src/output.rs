//! Output pane: the append-only log shown under the tree.

use std::collections::VecDeque;
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};

use crate::redraw::Redraw;

pub const MAX_LINES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
    /// Untagged text, e.g. release notes
    Plain,
}

#[derive(Debug, Clone)]
pub struct OutputLine {
    pub time: DateTime<Local>,
    pub level: Level,
    pub text: String,
}

#[derive(Clone)]
pub struct OutputPane {
    lines: Arc<Mutex<VecDeque<OutputLine>>>,
    redraw: Redraw,
}

impl OutputPane {
    pub fn new(redraw: Redraw) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(64))),
            redraw,
        }
    }

    fn buffer(&self) -> MutexGuard<'_, VecDeque<OutputLine>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, level: Level, text: String) {
        {
            let mut lines = self.buffer();
            // Multi-line messages become one entry per line
            for part in text.split('\n') {
                if lines.len() >= MAX_LINES {
                    lines.pop_front();
                }
                lines.push_back(OutputLine {
                    time: Local::now(),
                    level,
                    text: part.to_string(),
                });
            }
        }
        self.redraw.request();
    }

    pub fn info(&self, msg: impl Display) {
        self.push(Level::Info, msg.to_string());
    }

    pub fn error(&self, msg: impl Display) {
        self.push(Level::Error, msg.to_string());
    }

    pub fn plain(&self, msg: impl Display) {
        self.push(Level::Plain, msg.to_string());
    }

    pub fn lines(&self) -> Vec<OutputLine> {
        self.buffer().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.buffer().iter().any(|l| l.text.contains(needle))
    }
}
