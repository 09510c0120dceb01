mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Notify;

use pitwall_lib::api::{ApiVersion, StreamLink};
use pitwall_lib::config::AppConfig;
use pitwall_lib::errors::ViewerError;
use pitwall_lib::handlers::blink::Blinker;
use pitwall_lib::handlers::mutations::{spawn_consumer, TreeChange, TreeChanges};
use pitwall_lib::handlers::pollers::{check_for_update, poll_live_once, spawn_live_poller, SeenLive};
use pitwall_lib::nodes::NodeFactory;
use pitwall_lib::output::OutputPane;
use pitwall_lib::redraw::Redraw;
use pitwall_lib::tree::TreeNode;
use pitwall_lib::ui::colors::Theme;

struct Harness {
    catalog: Arc<FakeCatalog>,
    factory: NodeFactory,
    output: OutputPane,
    rx: UnboundedReceiver<TreeChange>,
}

fn harness() -> Harness {
    let catalog = Arc::new(FakeCatalog::new(ApiVersion::V2));
    let theme = Arc::new(Theme::default());
    let redraw = Redraw::new();
    let output = OutputPane::new(redraw.clone());
    let (changes, rx) = TreeChanges::channel();
    let factory = NodeFactory::new(
        theme.clone(),
        AppConfig::default().commands,
        Arc::new(FakeLauncher::default()),
        Blinker::new(&theme, redraw, Handle::current()),
        output.clone(),
        changes,
        Arc::new(FakeCatalog::new(ApiVersion::V1)),
        catalog.clone(),
        Handle::current(),
    );
    Harness {
        catalog,
        factory,
        output,
        rx,
    }
}

fn drain(rx: &mut UnboundedReceiver<TreeChange>) -> Vec<TreeChange> {
    let mut changes = Vec::new();
    while let Ok(change) = rx.try_recv() {
        changes.push(change);
    }
    changes
}

fn prepended(changes: Vec<TreeChange>) -> Vec<TreeNode> {
    changes
        .into_iter()
        .map(|change| match change {
            TreeChange::Prepend(node) => node,
            other => panic!("unexpected change {:?}", other),
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn live_poller_submits_only_new_or_changed_sessions() {
    let mut h = harness();
    let monaco = item("m", "Monaco", &["https://m/1"]);
    let mut monaco_changed = monaco.clone();
    monaco_changed.streams.push(StreamLink {
        title: "onboard".to_string(),
        url: "https://m/2".to_string(),
    });
    let imola = item("i", "Imola", &["https://i/1"]);

    h.catalog.script_live(vec![
        Ok(vec![monaco.clone()]),
        Err(ViewerError::Network("timeout".to_string())),
        Ok(vec![monaco.clone()]),
        Ok(vec![monaco_changed, imola]),
        Ok(vec![]),
    ]);

    let mut seen = SeenLive::new();
    let catalog = h.catalog.as_ref();

    assert_eq!(poll_live_once(catalog, &h.factory, &h.output, &mut seen).await, 1);
    let first = prepended(drain(&mut h.rx));
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].text(), "LIVE: Monaco");
    assert_eq!(first[0].color(), h.factory.theme().live);

    // a failed check is logged and the loop carries on
    assert_eq!(poll_live_once(catalog, &h.factory, &h.output, &mut seen).await, 0);
    assert!(h.output.contains("live check failed"));

    assert_eq!(poll_live_once(catalog, &h.factory, &h.output, &mut seen).await, 0);
    assert!(drain(&mut h.rx).is_empty());

    // the changed session replaces its earlier node instead of stacking
    assert_eq!(poll_live_once(catalog, &h.factory, &h.output, &mut seen).await, 2);
    let changes = drain(&mut h.rx);
    assert_eq!(changes.len(), 2);
    let TreeChange::Replace(old, new) = &changes[0] else {
        panic!("expected a replacement, got {:?}", changes[0]);
    };
    assert!(old.ptr_eq(&first[0]));
    assert_eq!(new.text(), "LIVE: Monaco");
    assert_eq!(new.child_count(), 2);
    let TreeChange::Prepend(imola_node) = &changes[1] else {
        panic!("expected a prepend, got {:?}", changes[1]);
    };
    assert_eq!(imola_node.text(), "LIVE: Imola");

    // sessions that ended leave the tree
    assert_eq!(poll_live_once(catalog, &h.factory, &h.output, &mut seen).await, 0);
    let removed = drain(&mut h.rx);
    assert_eq!(removed.len(), 2);
    assert!(removed.iter().all(|c| matches!(c, TreeChange::Remove(_))));
    assert!(seen.is_empty());
}

#[tokio::test(start_paused = true)]
async fn live_loop_survives_a_failed_tick() {
    let mut h = harness();
    h.catalog.script_live(vec![
        Err(ViewerError::Network("timeout".to_string())),
        Ok(vec![item("s", "Spa", &["https://s"])]),
    ]);
    let poller = spawn_live_poller(
        h.catalog.clone(),
        h.factory.clone(),
        h.output.clone(),
        Duration::from_secs(30),
        Arc::new(Notify::new()),
    );

    let change = tokio::time::timeout(Duration::from_secs(120), h.rx.recv())
        .await
        .expect("no submission after the failed tick")
        .expect("channel closed");
    let TreeChange::Prepend(node) = change else {
        panic!("expected a prepend, got {:?}", change);
    };
    assert_eq!(node.text(), "LIVE: Spa");
    assert!(h.output.contains("live check failed"));
    assert!(!poller.is_finished());
    poller.abort();
}

#[tokio::test(start_paused = true)]
async fn wake_runs_a_check_before_the_next_tick() {
    let mut h = harness();
    h.catalog.script_live(vec![Ok(vec![]), Ok(vec![item("s", "Spa", &["https://s"])])]);
    let wake = Arc::new(Notify::new());
    let poller = spawn_live_poller(
        h.catalog.clone(),
        h.factory.clone(),
        h.output.clone(),
        Duration::from_secs(3600),
        wake.clone(),
    );

    // let the immediate first tick consume the empty answer
    while h.catalog.pending_live() == 2 {
        tokio::task::yield_now().await;
    }
    wake.notify_one();

    let change = tokio::time::timeout(Duration::from_secs(10), h.rx.recv())
        .await
        .expect("wake did not trigger a check")
        .expect("channel closed");
    assert!(matches!(change, TreeChange::Prepend(_)));
    poller.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn update_check_submits_exactly_one_node() {
    let mut h = harness();

    let found = check_for_update(&FakeUpdates::newer("1.1.0"), "1.0.0", &h.factory, &h.output).await;
    assert!(found);
    let nodes = prepended(drain(&mut h.rx));
    assert_eq!(nodes.len(), 1);
    assert!(!nodes[0].is_expanded());
    assert_eq!(nodes[0].child_count(), 1);
    assert!(nodes[0].children()[0].action().is_some());

    let found = check_for_update(&FakeUpdates::none(), "1.0.0", &h.factory, &h.output).await;
    assert!(!found);
    assert!(drain(&mut h.rx).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_producers_lose_nothing() {
    let root = TreeNode::new("root");
    let redraw = Redraw::new();
    let (changes, rx) = TreeChanges::channel();
    let consumer = spawn_consumer(root.clone(), rx, redraw.clone());

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let changes = changes.clone();
            tokio::spawn(async move {
                for i in 0..25 {
                    changes.prepend(TreeNode::new(format!("{}-{}", p, i)));
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }

    assert!(wait_until(|| root.child_count() == 100).await);
    let texts = child_texts(&root);

    // each producer's nodes appear newest first
    for p in 0..4 {
        let own: Vec<&String> = texts.iter().filter(|t| t.starts_with(&format!("{}-", p))).collect();
        let expected: Vec<String> = (0..25).rev().map(|i| format!("{}-{}", p, i)).collect();
        assert_eq!(own.len(), 25);
        assert!(own.iter().zip(expected.iter()).all(|(a, b)| *a == b));
    }
    assert!(redraw.request_count() >= 100);
    consumer.abort();
}
