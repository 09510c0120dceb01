//! Busy indicator for nodes whose action is running.

use std::sync::Arc;
use std::time::Duration;

use ratatui::style::Color;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::redraw::Redraw;
use crate::tree::{Action, TreeNode};
use crate::ui::colors::Theme;

pub const BLINK_PERIOD: Duration = Duration::from_millis(200);
pub const LOADING_TEXT: &str = "loading...";

/// Label and color a node had before its action started. `finish` consumes
/// it, so a node is restored at most once per animation.
struct PendingAnimation {
    node: TreeNode,
    original_text: String,
    original_color: Color,
}

impl PendingAnimation {
    fn begin(node: TreeNode) -> Self {
        let original_text = node.text();
        let original_color = node.color();
        node.set_text(LOADING_TEXT);
        Self {
            node,
            original_text,
            original_color,
        }
    }

    fn finish(self) {
        self.node.set_text(self.original_text);
        self.node.set_color(self.original_color);
        self.node.end_busy();
    }
}

#[derive(Clone)]
pub struct Blinker {
    loading_color: Color,
    period: Duration,
    redraw: Redraw,
    runtime: Handle,
}

impl Blinker {
    pub fn new(theme: &Theme, redraw: Redraw, runtime: Handle) -> Self {
        Self {
            loading_color: theme.loading,
            period: BLINK_PERIOD,
            redraw,
            runtime,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Wrap `action` so that triggering it runs the action on a blocking
    /// worker while `node` blinks. `after` runs once the node is restored.
    ///
    /// Triggering again while a previous run is still in flight does
    /// nothing.
    pub fn with_blink(&self, node: TreeNode, action: Action, after: Option<Action>) -> Action {
        let blinker = self.clone();
        let target = node.downgrade();
        Arc::new(move || {
            if let Some(node) = target.upgrade() {
                blinker.start(node, action.clone(), after.clone());
            }
        })
    }

    fn start(&self, node: TreeNode, action: Action, after: Option<Action>) {
        if !node.try_begin_busy() {
            return;
        }
        let worker = self.runtime.spawn_blocking(move || action());
        let blinker = self.clone();
        self.runtime.spawn(async move {
            blinker.blink_until(node, worker).await;
            if let Some(after) = after {
                after();
            }
        });
    }

    /// Toggle the node color every period until `done` resolves. A panicking
    /// action resolves `done` with an error, which ends the animation too.
    async fn blink_until(&self, node: TreeNode, mut done: JoinHandle<()>) {
        let pending = PendingAnimation::begin(node.clone());
        self.redraw.request();

        let mut next = self.loading_color;
        let mut other = pending.original_color;

        let mut ticker = tokio::time::interval(self.period);
        // interval fires immediately; the first color swap waits one period
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut done => break,
                _ = ticker.tick() => {
                    node.set_color(next);
                    std::mem::swap(&mut next, &mut other);
                    self.redraw.request();
                }
            }
        }

        pending.finish();
        self.redraw.request();
    }
}
