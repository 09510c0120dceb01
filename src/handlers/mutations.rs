//! Single-writer tree mutation channel.
//!
//! Background producers only hold a `TreeChanges` sender. One consumer task
//! owns the structure of the live tree and applies changes in arrival order.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::redraw::Redraw;
use crate::tree::TreeNode;

#[derive(Debug)]
pub enum TreeChange {
    /// Insert as the first child of the root
    Prepend(TreeNode),
    /// Insert as the last child of the root
    Append(TreeNode),
    /// Replace the children of a node already in the tree and expand it
    SetChildren(TreeNode, Vec<TreeNode>),
    /// Put the second node where the first one sits among the root's
    /// children, or on top if the first is gone
    Replace(TreeNode, TreeNode),
    /// Drop a direct child of the root
    Remove(TreeNode),
}

/// Producer side. Sending never blocks; a send after the consumer is gone
/// is dropped.
#[derive(Clone)]
pub struct TreeChanges {
    tx: mpsc::UnboundedSender<TreeChange>,
}

impl TreeChanges {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TreeChange>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn prepend(&self, node: TreeNode) {
        let _ = self.tx.send(TreeChange::Prepend(node));
    }

    pub fn append(&self, node: TreeNode) {
        let _ = self.tx.send(TreeChange::Append(node));
    }

    pub fn set_children(&self, parent: TreeNode, children: Vec<TreeNode>) {
        let _ = self.tx.send(TreeChange::SetChildren(parent, children));
    }

    pub fn replace(&self, old: TreeNode, new: TreeNode) {
        let _ = self.tx.send(TreeChange::Replace(old, new));
    }

    pub fn remove(&self, node: TreeNode) {
        let _ = self.tx.send(TreeChange::Remove(node));
    }
}

pub fn apply(root: &TreeNode, change: TreeChange) {
    match change {
        TreeChange::Prepend(node) => root.insert_first(node),
        TreeChange::Append(node) => root.add_child(node),
        TreeChange::SetChildren(parent, children) => {
            parent.set_children(children);
            parent.set_expanded(true);
        }
        TreeChange::Replace(old, new) => {
            if !root.replace_child(&old, new.clone()) {
                root.insert_first(new);
            }
        }
        TreeChange::Remove(node) => {
            root.remove_child(&node);
        }
    }
}

/// Spawn the consumer. It runs until every sender is dropped or the handle
/// is aborted.
pub fn spawn_consumer(
    root: TreeNode,
    mut rx: mpsc::UnboundedReceiver<TreeChange>,
    redraw: Redraw,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(change) = rx.recv().await {
            apply(&root, change);
            redraw.request();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drained_submissions_are_most_recent_first() {
        let root = TreeNode::new("root");
        root.add_child(TreeNode::new("home"));
        let (changes, rx) = TreeChanges::channel();
        let redraw = Redraw::new();
        let consumer = spawn_consumer(root.clone(), rx, redraw.clone());

        for i in 0..50 {
            changes.prepend(TreeNode::new(format!("n{}", i)));
        }
        drop(changes);
        consumer.await.unwrap();

        let texts: Vec<String> = root.children().iter().map(TreeNode::text).collect();
        let mut expected: Vec<String> = (0..50).rev().map(|i| format!("n{}", i)).collect();
        expected.push("home".to_string());
        assert_eq!(texts, expected);
        assert_eq!(redraw.request_count(), 50);
    }

    #[test]
    fn set_children_expands_parent() {
        let root = TreeNode::new("root");
        let folder = TreeNode::new("2023").collapsed();
        root.add_child(folder.clone());
        apply(&root, TreeChange::SetChildren(folder.clone(), vec![TreeNode::new("Bahrain")]));
        assert!(folder.is_expanded());
        assert_eq!(folder.children()[0].text(), "Bahrain");
    }

    #[test]
    fn append_goes_last() {
        let root = TreeNode::new("root");
        root.add_child(TreeNode::new("home"));
        apply(&root, TreeChange::Append(TreeNode::new("Log Out")));
        assert_eq!(root.children()[1].text(), "Log Out");
    }

    #[test]
    fn replace_keeps_position_or_falls_back_to_top() {
        let root = TreeNode::new("root");
        let live = TreeNode::new("LIVE: Imola");
        root.add_child(TreeNode::new("home"));
        root.add_child(live.clone());

        apply(&root, TreeChange::Replace(live.clone(), TreeNode::new("LIVE: Imola (2 feeds)")));
        apply(&root, TreeChange::Replace(live, TreeNode::new("LIVE: Spa")));

        let texts: Vec<String> = root.children().iter().map(TreeNode::text).collect();
        assert_eq!(texts, vec!["LIVE: Spa", "home", "LIVE: Imola (2 feeds)"]);

        let spa = root.children()[0].clone();
        apply(&root, TreeChange::Remove(spa));
        assert_eq!(root.child_count(), 2);
    }
}
