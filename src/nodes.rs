//! Builds tree nodes from catalog listings, releases and commands.

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::api::{ApiVersion, CatalogApi, Listing, ListingKind, StreamLink};
use crate::config::{CustomCommand, RELEASE_PAGE_URL};
use crate::handlers::blink::Blinker;
use crate::handlers::mutations::TreeChanges;
use crate::output::OutputPane;
use crate::player::Launcher;
use crate::tree::{Action, FolderSource, NodeKind, TreeNode};
use crate::ui::colors::Theme;
use crate::update::Release;

pub const UPDATE_NODE_TEXT: &str = "UPDATE AVAILABLE";
pub const LOG_OUT_TEXT: &str = "Log Out";
pub const ARCHIVE_TEXT: &str = "Archive";

#[derive(Clone)]
pub struct NodeFactory {
    theme: Arc<Theme>,
    commands: Arc<Vec<CustomCommand>>,
    launcher: Arc<dyn Launcher>,
    blinker: Blinker,
    output: OutputPane,
    changes: TreeChanges,
    v1: Arc<dyn CatalogApi>,
    v2: Arc<dyn CatalogApi>,
    /// API the listings handed to this factory come from
    api: ApiVersion,
    runtime: Handle,
}

impl NodeFactory {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        theme: Arc<Theme>,
        commands: Vec<CustomCommand>,
        launcher: Arc<dyn Launcher>,
        blinker: Blinker,
        output: OutputPane,
        changes: TreeChanges,
        v1: Arc<dyn CatalogApi>,
        v2: Arc<dyn CatalogApi>,
        runtime: Handle,
    ) -> Self {
        Self {
            theme,
            commands: Arc::new(commands),
            launcher,
            blinker,
            output,
            changes,
            v1,
            v2,
            api: ApiVersion::V2,
            runtime,
        }
    }

    /// Same factory, for listings served by `api`
    pub fn for_api(&self, api: ApiVersion) -> Self {
        Self {
            api,
            ..self.clone()
        }
    }

    fn catalog(&self, api: ApiVersion) -> &Arc<dyn CatalogApi> {
        match api {
            ApiVersion::V1 => &self.v1,
            ApiVersion::V2 => &self.v2,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn changes(&self) -> &TreeChanges {
        &self.changes
    }

    pub fn listing_node(&self, listing: &Listing) -> TreeNode {
        match listing.kind {
            ListingKind::Category => TreeNode::new(listing.title.as_str())
                .with_color(self.theme.category_node)
                .with_kind(NodeKind::Category)
                .collapsed()
                .with_children(self.listing_nodes(&listing.children)),
            ListingKind::Folder => {
                let source = (listing.lazy && listing.children.is_empty()).then(|| FolderSource {
                    id: listing.id.clone(),
                    api: self.api,
                });
                TreeNode::new(listing.title.as_str())
                    .with_color(self.theme.folder_node)
                    .with_kind(NodeKind::Folder { source })
                    .collapsed()
                    .with_children(self.listing_nodes(&listing.children))
            }
            ListingKind::Item => TreeNode::new(listing.title.as_str())
                .with_color(self.theme.item_node)
                .with_kind(NodeKind::Item)
                .collapsed()
                .with_children(self.stream_nodes(&listing.streams)),
        }
    }

    pub fn listing_nodes(&self, listings: &[Listing]) -> Vec<TreeNode> {
        listings.iter().map(|l| self.listing_node(l)).collect()
    }

    /// Live session subtree, marked with the live color
    pub fn live_node(&self, listing: &Listing) -> TreeNode {
        let node = self.listing_node(listing);
        node.set_text(format!("LIVE: {}", listing.title));
        node.with_color(self.theme.live)
    }

    /// One stream puts the commands directly under the item, several get a
    /// sub-node each.
    fn stream_nodes(&self, streams: &[StreamLink]) -> Vec<TreeNode> {
        match streams {
            [] => vec![self.no_content_node()],
            [single] => self.command_nodes(&single.url),
            many => many
                .iter()
                .map(|s| {
                    TreeNode::new(s.title.as_str())
                        .with_color(self.theme.item_node)
                        .with_kind(NodeKind::Item)
                        .collapsed()
                        .with_children(self.command_nodes(&s.url))
                })
                .collect(),
        }
    }

    pub fn no_content_node(&self) -> TreeNode {
        TreeNode::new("no content").with_color(self.theme.no_content)
    }

    /// One blinking action node per configured command
    pub fn command_nodes(&self, url: &str) -> Vec<TreeNode> {
        self.commands
            .iter()
            .map(|cmd| {
                let node = TreeNode::new(cmd.title.as_str()).with_color(self.theme.action_node);
                let line = cmd.resolve(url);
                let launcher = self.launcher.clone();
                let output = self.output.clone();
                let title = cmd.title.clone();
                let run: Action = Arc::new(move || match launcher.run_command(&line) {
                    Ok(()) => output.info(format!("started: {}", title)),
                    Err(e) => output.error(e.diagnostics()),
                });
                let trigger = self.blinker.with_blink(node.clone(), run, None);
                node.with_action(trigger)
            })
            .collect()
    }

    /// Collapsed category holding the v1 archive listings
    pub fn archive_node(&self, listings: &[Listing]) -> TreeNode {
        let children = if listings.is_empty() {
            vec![self.no_content_node()]
        } else {
            self.for_api(ApiVersion::V1).listing_nodes(listings)
        };
        TreeNode::new(ARCHIVE_TEXT)
            .with_color(self.theme.category_node)
            .with_kind(NodeKind::Category)
            .collapsed()
            .with_children(children)
    }

    /// Collapsed "update available" node with a single download action
    pub fn update_node(&self, release: &Release) -> TreeNode {
        let launcher = self.launcher.clone();
        let output = self.output.clone();
        let page = if release.html_url.is_empty() {
            RELEASE_PAGE_URL.to_string()
        } else {
            release.html_url.clone()
        };
        let download = TreeNode::new("download update")
            .with_color(self.theme.action_node)
            .with_action(Arc::new(move || {
                if let Err(e) = launcher.open_browser(&page) {
                    output.error(e.diagnostics());
                }
            }));

        TreeNode::new(format!("{} ({})", UPDATE_NODE_TEXT, release.tag))
            .with_color(self.theme.update)
            .collapsed()
            .with_children(vec![download])
    }

    pub fn action_node(&self, text: &str, action: Action) -> TreeNode {
        TreeNode::new(text)
            .with_color(self.theme.action_node)
            .with_action(action)
    }

    /// Trigger that fetches a lazy folder's children while the folder blinks
    /// and hands them to the mutation channel.
    pub fn load_children(&self, folder: &TreeNode, source: &FolderSource) -> Action {
        let factory = self.for_api(source.api);
        let target = folder.downgrade();
        let source = source.clone();
        let fetch: Action = Arc::new(move || {
            let Some(folder) = target.upgrade() else {
                return;
            };
            let catalog = factory.catalog(source.api).clone();
            match factory.runtime.block_on(catalog.children(&source.id)) {
                Ok(listings) if listings.is_empty() => {
                    factory.changes.set_children(folder, vec![factory.no_content_node()]);
                }
                Ok(listings) => {
                    let children = factory.listing_nodes(&listings);
                    factory.changes.set_children(folder, children);
                }
                Err(e) => factory.output.error(format!("could not load {}: {}", source.id, e)),
            }
        });
        self.blinker.with_blink(folder.clone(), fetch, None)
    }
}
