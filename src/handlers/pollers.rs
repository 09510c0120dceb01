//! Background loops: mutation consumer, live-session poller, update check.
//!
//! Each loop is its own task. A failing or panicking loop never takes its
//! siblings down; errors end up in the output pane.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::CatalogApi;
use crate::handlers::mutations::{spawn_consumer, TreeChange};
use crate::nodes::NodeFactory;
use crate::output::OutputPane;
use crate::redraw::Redraw;
use crate::tree::TreeNode;
use crate::update::UpdateSource;

/// Everything the supervised loops need
pub struct PollerDeps {
    pub root: TreeNode,
    pub changes_rx: mpsc::UnboundedReceiver<TreeChange>,
    pub redraw: Redraw,
    pub factory: NodeFactory,
    pub live_source: Arc<dyn CatalogApi>,
    pub updates: Arc<dyn UpdateSource>,
    pub output: OutputPane,
    pub version: String,
    pub live_interval: Duration,
}

/// Owns the three background loops. They are started once and never
/// restarted.
pub struct Supervisor {
    consumer: JoinHandle<()>,
    live: JoinHandle<()>,
    live_wake: Arc<Notify>,
    update: JoinHandle<()>,
}

impl Supervisor {
    pub fn start(deps: PollerDeps) -> Self {
        let consumer = spawn_consumer(deps.root, deps.changes_rx, deps.redraw);
        let live_wake = Arc::new(Notify::new());
        let live = spawn_live_poller(
            deps.live_source,
            deps.factory.clone(),
            deps.output.clone(),
            deps.live_interval,
            live_wake.clone(),
        );
        let update = spawn_update_poller(deps.updates, deps.version, deps.factory, deps.output);
        Self {
            consumer,
            live,
            live_wake,
            update,
        }
    }

    /// Run a live check now instead of waiting for the next tick
    pub fn poll_live_now(&self) {
        self.live_wake.notify_one();
    }

    pub fn consumer_running(&self) -> bool {
        !self.consumer.is_finished()
    }

    pub fn live_running(&self) -> bool {
        !self.live.is_finished()
    }

    pub fn update_finished(&self) -> bool {
        self.update.is_finished()
    }

    pub fn stop(&self) {
        self.consumer.abort();
        self.live.abort();
        self.update.abort();
    }
}

/// What was last submitted for one live session
pub struct LiveEntry {
    fingerprint: String,
    node: TreeNode,
}

/// Live sessions currently shown, by id
pub type SeenLive = HashMap<String, LiveEntry>;

/// Poll every `every`, or right away when `wake` is notified
pub fn spawn_live_poller(
    catalog: Arc<dyn CatalogApi>,
    factory: NodeFactory,
    output: OutputPane,
    every: Duration,
    wake: Arc<Notify>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut seen = SeenLive::new();
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            let woken = tokio::select! {
                _ = ticker.tick() => false,
                _ = wake.notified() => true,
            };
            if woken {
                ticker.reset();
            }
            poll_live_once(catalog.as_ref(), &factory, &output, &mut seen).await;
        }
    })
}

/// One live check. New sessions are prepended, changed ones replace their
/// earlier node and ended ones are removed. Returns how many subtrees were
/// submitted. Errors are logged and yield zero.
pub async fn poll_live_once(
    catalog: &dyn CatalogApi,
    factory: &NodeFactory,
    output: &OutputPane,
    seen: &mut SeenLive,
) -> usize {
    let sessions = match catalog.live_sessions().await {
        Ok(s) => s,
        Err(e) if e.is_transient() => {
            output.info(format!("live check failed, retrying on the next tick: {}", e));
            return 0;
        }
        Err(e) => {
            output.error(format!("live check failed: {}", e));
            return 0;
        }
    };

    let current: HashSet<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    let ended: Vec<String> = seen
        .keys()
        .filter(|id| !current.contains(id.as_str()))
        .cloned()
        .collect();
    for id in ended {
        if let Some(entry) = seen.remove(&id) {
            factory.changes().remove(entry.node);
        }
    }

    let mut submitted = 0;
    for session in &sessions {
        let fingerprint = session.fingerprint();
        let node = match seen.get(&session.id) {
            Some(entry) if entry.fingerprint == fingerprint => continue,
            Some(entry) => {
                let node = factory.live_node(session);
                factory.changes().replace(entry.node.clone(), node.clone());
                node
            }
            None => {
                output.info(format!("live now: {}", session.title));
                let node = factory.live_node(session);
                factory.changes().prepend(node.clone());
                node
            }
        };
        seen.insert(session.id.clone(), LiveEntry { fingerprint, node });
        submitted += 1;
    }
    submitted
}

pub fn spawn_update_poller(
    source: Arc<dyn UpdateSource>,
    version: String,
    factory: NodeFactory,
    output: OutputPane,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        check_for_update(source.as_ref(), &version, &factory, &output).await;
    })
}

/// Single update check. Returns whether an update node was submitted.
pub async fn check_for_update(
    source: &dyn UpdateSource,
    version: &str,
    factory: &NodeFactory,
    output: &OutputPane,
) -> bool {
    let release = match source.check_update(version).await {
        Ok((release, true)) => release,
        Ok((_, false)) => return false,
        Err(e) => {
            output.error(format!("failed to check for update: {}", e));
            return false;
        }
    };

    output.info("New version found!");
    output.info(&release.tag);
    output.plain(format!("\n{}", release.name));
    output.plain(format!("{}\n", release.body));

    factory.changes().prepend(factory.update_node(&release));
    true
}
