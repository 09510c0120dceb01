//! Shared content tree.
//!
//! A `TreeNode` is a cheap handle (`Arc`) to a vertex. Label, color and the
//! expanded flag may be changed by whoever holds a handle; the child list is
//! only changed by the mutation consumer once the UI is running.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use ratatui::style::Color;

use crate::api::ApiVersion;

/// Zero-argument trigger attached to action nodes
pub type Action = Arc<dyn Fn() + Send + Sync>;

/// Listing whose children a lazy folder fetches, and the API serving it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSource {
    pub id: String,
    pub api: ApiVersion,
}

/// Semantic kind of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Category,
    /// Children of `source` are fetched on first selection
    Folder { source: Option<FolderSource> },
    Item,
    Action,
    Info,
}

struct NodeData {
    text: String,
    color: Color,
    expanded: bool,
    kind: NodeKind,
    action: Option<Action>,
    /// Set while the node's action runs
    busy: bool,
    children: Vec<TreeNode>,
}

#[derive(Clone)]
pub struct TreeNode(Arc<Mutex<NodeData>>);

impl TreeNode {
    /// Expanded, white, informational node with no children
    pub fn new(text: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(NodeData {
            text: text.into(),
            color: Color::White,
            expanded: true,
            kind: NodeKind::Info,
            action: None,
            busy: false,
            children: Vec::new(),
        })))
    }

    fn data(&self) -> MutexGuard<'_, NodeData> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_color(self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    pub fn with_kind(self, kind: NodeKind) -> Self {
        self.data().kind = kind;
        self
    }

    pub fn collapsed(self) -> Self {
        self.set_expanded(false);
        self
    }

    /// Attach a trigger; also marks the node as an action node
    pub fn with_action(self, action: Action) -> Self {
        {
            let mut d = self.data();
            d.kind = NodeKind::Action;
            d.action = Some(action);
        }
        self
    }

    pub fn with_children(self, children: Vec<TreeNode>) -> Self {
        self.data().children = children;
        self
    }

    pub fn text(&self) -> String {
        self.data().text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.data().text = text.into();
    }

    pub fn color(&self) -> Color {
        self.data().color
    }

    pub fn set_color(&self, color: Color) {
        self.data().color = color;
    }

    pub fn is_expanded(&self) -> bool {
        self.data().expanded
    }

    pub fn set_expanded(&self, expanded: bool) {
        self.data().expanded = expanded;
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind.clone()
    }

    pub fn action(&self) -> Option<Action> {
        self.data().action.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.data().busy
    }

    /// Mark the node busy. Returns false if it already was.
    pub fn try_begin_busy(&self) -> bool {
        let mut d = self.data();
        if d.busy {
            return false;
        }
        d.busy = true;
        true
    }

    pub fn end_busy(&self) {
        self.data().busy = false;
    }

    /// Snapshot of the child list. The lock is released before returning.
    pub fn children(&self) -> Vec<TreeNode> {
        self.data().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn has_children(&self) -> bool {
        self.child_count() > 0
    }

    pub fn add_child(&self, child: TreeNode) {
        self.data().children.push(child);
    }

    pub fn insert_first(&self, child: TreeNode) {
        self.data().children.insert(0, child);
    }

    pub fn set_children(&self, children: Vec<TreeNode>) {
        self.data().children = children;
    }

    /// Swap the direct child `old` for `new`. Returns false if `old` is not
    /// a child.
    pub fn replace_child(&self, old: &TreeNode, new: TreeNode) -> bool {
        let mut d = self.data();
        match d.children.iter().position(|c| c.ptr_eq(old)) {
            Some(i) => {
                d.children[i] = new;
                true
            }
            None => false,
        }
    }

    pub fn remove_child(&self, child: &TreeNode) -> bool {
        let mut d = self.data();
        let before = d.children.len();
        d.children.retain(|c| !c.ptr_eq(child));
        d.children.len() != before
    }

    pub fn ptr_eq(&self, other: &TreeNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Handle that does not keep the node alive. Actions stored on a node
    /// refer back to it through one of these.
    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Arc::downgrade(&self.0))
    }
}

#[derive(Clone)]
pub struct WeakNode(Weak<Mutex<NodeData>>);

impl WeakNode {
    pub fn upgrade(&self) -> Option<TreeNode> {
        self.0.upgrade().map(TreeNode)
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.data();
        f.debug_struct("TreeNode")
            .field("text", &d.text)
            .field("kind", &d.kind)
            .field("expanded", &d.expanded)
            .field("children", &d.children.len())
            .finish()
    }
}

/// One line of the flattened, visible tree
#[derive(Debug, Clone)]
pub struct Row {
    pub node: TreeNode,
    pub depth: usize,
}

/// Flatten the expanded part of the tree in display order. The root itself
/// is not listed; its children are at depth 0.
pub fn visible_rows(root: &TreeNode) -> Vec<Row> {
    let mut rows = Vec::new();
    push_rows(root, 0, &mut rows);
    rows
}

fn push_rows(parent: &TreeNode, depth: usize, rows: &mut Vec<Row>) {
    for child in parent.children() {
        let expanded = child.is_expanded();
        rows.push(Row {
            node: child.clone(),
            depth,
        });
        if expanded {
            push_rows(&child, depth + 1, rows);
        }
    }
}

/// Find the parent of `target` below `root`
pub fn parent_of(root: &TreeNode, target: &TreeNode) -> Option<TreeNode> {
    for child in root.children() {
        if child.ptr_eq(target) {
            return Some(root.clone());
        }
        if let Some(found) = parent_of(&child, target) {
            return Some(found);
        }
    }
    None
}
