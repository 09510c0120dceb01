use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::api::CatalogApi;
use crate::config::AppConfig;
use crate::errors::ViewerError;
use crate::handlers::blink::Blinker;
use crate::handlers::input::handle_key;
use crate::handlers::mutations::{TreeChange, TreeChanges};
use crate::handlers::pollers::{PollerDeps, Supervisor};
use crate::nodes::{NodeFactory, LOG_OUT_TEXT};
use crate::output::OutputPane;
use crate::player::Launcher;
use crate::redraw::Redraw;
use crate::secret::CredentialStore;
use crate::state::{LoginForm, Session, View};
use crate::tree::{self, NodeKind, Row, TreeNode};
use crate::ui;
use crate::ui::colors::Theme;
use crate::update::UpdateSource;

pub const ROOT_TEXT: &str = "Categories";

/// Requests from node actions that need the coordinator itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Logout,
}

/// External services the coordinator talks to
#[derive(Clone)]
pub struct Collaborators {
    pub v1: Arc<dyn CatalogApi>,
    pub v2: Arc<dyn CatalogApi>,
    pub store: Arc<dyn CredentialStore>,
    pub updates: Arc<dyn UpdateSource>,
    pub launcher: Arc<dyn Launcher>,
}

/// Top-level UI state: the tree, the session, the presented view and the
/// background loops feeding the tree.
pub struct UiState {
    pub version: String,
    pub config: AppConfig,
    pub theme: Arc<Theme>,
    pub root: TreeNode,
    pub selected: Option<TreeNode>,
    pub list_state: ListState,
    pub output: OutputPane,
    pub redraw: Redraw,
    pub session: Session,
    pub view: View,
    pub should_quit: bool,
    /// Set the first time the credential form is presented
    pub form_shown: bool,

    factory: NodeFactory,
    updates: Arc<dyn UpdateSource>,
    changes_rx: Option<mpsc::UnboundedReceiver<TreeChange>>,
    commands_tx: mpsc::UnboundedSender<UiCommand>,
    commands_rx: mpsc::UnboundedReceiver<UiCommand>,
    supervisor: Option<Supervisor>,
    log_out_added: bool,
}

impl UiState {
    /// Build the tree and attempt one login with stored credentials. Must be
    /// called inside a tokio runtime.
    pub async fn new(config: AppConfig, version: &str, deps: Collaborators) -> Self {
        let redraw = Redraw::new();
        let output = OutputPane::new(redraw.clone());

        let (theme, rejected) = Theme::from_overrides(&config.theme);
        for color in rejected {
            output.error(format!("ignoring unknown theme color {:?}", color));
        }
        let theme = Arc::new(theme);

        let (changes, changes_rx) = TreeChanges::channel();
        let blinker = Blinker::new(&theme, redraw.clone(), Handle::current());
        let factory = NodeFactory::new(
            theme.clone(),
            config.commands.clone(),
            deps.launcher.clone(),
            blinker,
            output.clone(),
            changes,
            deps.v1.clone(),
            deps.v2.clone(),
            Handle::current(),
        );
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let mut ui = UiState {
            version: version.to_string(),
            config,
            theme,
            root: TreeNode::new(ROOT_TEXT),
            selected: None,
            list_state: ListState::default(),
            output,
            redraw,
            session: Session::new(deps.v1, deps.v2, deps.store),
            view: View::Browser,
            should_quit: false,
            form_shown: false,
            factory,
            updates: deps.updates,
            changes_rx: Some(changes_rx),
            commands_tx,
            commands_rx,
            supervisor: None,
            log_out_added: false,
        };

        match ui.session.try_stored_login().await {
            Ok(()) => ui.output.info("logged in!"),
            Err(e) => {
                // Any failure shows the form; only the log line differs
                match &e {
                    ViewerError::NoStoredCredentials => ui.output.info(e.diagnostics()),
                    _ => ui.output.error(format!("stored login failed: {}", e)),
                }
                ui.show_form();
            }
        }

        ui.load_home().await;
        ui.selected = ui.rows().first().map(|r| r.node.clone());
        ui
    }

    // Runs before the mutation consumer exists, so the tree is written directly
    async fn load_home(&mut self) {
        let current = self.session.v2().clone();
        match current.home().await {
            Ok(listings) if listings.is_empty() => {
                self.root.add_child(self.factory.no_content_node());
            }
            Ok(listings) => {
                for node in self.factory.listing_nodes(&listings) {
                    self.root.add_child(node);
                }
            }
            Err(e) => self.output.error(format!(
                "could not load {} catalog: {}",
                current.version().path(),
                e
            )),
        }

        let archive = self.session.v1().clone();
        match archive.home().await {
            Ok(listings) => self.root.add_child(self.factory.archive_node(&listings)),
            Err(e) => self.output.error(format!(
                "could not load {} catalog: {}",
                archive.version().path(),
                e
            )),
        }
    }

    /// Start the background loops. Calling it again has no effect.
    pub fn start(&mut self) {
        let Some(changes_rx) = self.changes_rx.take() else {
            return;
        };
        self.supervisor = Some(Supervisor::start(PollerDeps {
            root: self.root.clone(),
            changes_rx,
            redraw: self.redraw.clone(),
            factory: self.factory.clone(),
            live_source: self.session.v2().clone(),
            updates: self.updates.clone(),
            output: self.output.clone(),
            version: self.version.clone(),
            live_interval: self.config.live_poll_interval(),
        }));
        if self.session.is_authenticated() {
            self.add_log_out();
        }
        self.redraw.request();
    }

    pub fn stop(&mut self) {
        self.should_quit = true;
        if let Some(supervisor) = &self.supervisor {
            supervisor.stop();
        }
    }

    pub fn supervisor(&self) -> Option<&Supervisor> {
        self.supervisor.as_ref()
    }

    fn add_log_out(&mut self) {
        if self.log_out_added {
            return;
        }
        let tx = self.commands_tx.clone();
        let node = self.factory.action_node(
            LOG_OUT_TEXT,
            Arc::new(move || {
                let _ = tx.send(UiCommand::Logout);
            }),
        );
        self.factory.changes().append(node);
        self.log_out_added = true;
    }

    fn show_browser(&mut self) {
        self.view = View::Browser;
        // Before `start` the Log Out node is added there instead
        if self.supervisor.is_some() {
            self.add_log_out();
        }
        self.redraw.request();
    }

    fn show_form(&mut self) {
        let username = self.session.stored_username().unwrap_or_default();
        self.view = View::Form(LoginForm::new(&username));
        self.form_shown = true;
        self.redraw.request();
    }

    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
        token: &str,
    ) -> Result<(), ViewerError> {
        self.session.login(username, password, token).await?;
        self.show_browser();
        Ok(())
    }

    pub async fn try_stored_login(&mut self) -> Result<(), ViewerError> {
        self.session.try_stored_login().await?;
        self.show_browser();
        Ok(())
    }

    /// Log in from the form and keep it open. Used by the "test" button.
    pub async fn test_credentials(&mut self, username: &str, password: &str) -> bool {
        match self.session.login(username, password, "").await {
            Ok(()) => {
                self.output.info("credentials accepted");
                true
            }
            Err(e) => {
                self.output.error(e.diagnostics());
                false
            }
        }
    }

    /// Log in, persist the credentials and switch to the browser. On failure
    /// the form stays open.
    pub async fn save_and_close(&mut self, username: &str, password: &str) -> Result<(), ViewerError> {
        if let Err(e) = self.session.login(username, password, "").await {
            self.output.error(e.diagnostics());
            return Err(e);
        }
        match self.session.persist() {
            Ok(()) => self.output.info("credentials saved"),
            Err(e) => self.output.error(format!("could not save credentials: {}", e)),
        }
        self.show_browser();
        Ok(())
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            self.output.error(e);
        }
        self.output.info("logged out");
        self.show_form();
    }

    /// Handle queued requests from node actions
    pub fn process_commands(&mut self) {
        while let Ok(cmd) = self.commands_rx.try_recv() {
            match cmd {
                UiCommand::Logout => self.logout(),
            }
        }
    }

    pub fn rows(&self) -> Vec<Row> {
        tree::visible_rows(&self.root)
    }

    /// Index of the selected node among the visible rows. Falls back to the
    /// first row when the selection is hidden.
    pub fn selected_index(&mut self, rows: &[Row]) -> Option<usize> {
        if rows.is_empty() {
            self.selected = None;
            return None;
        }
        let found = self
            .selected
            .as_ref()
            .and_then(|sel| rows.iter().position(|r| r.node.ptr_eq(sel)));
        match found {
            Some(i) => Some(i),
            None => {
                self.selected = Some(rows[0].node.clone());
                Some(0)
            }
        }
    }

    fn select_offset(&mut self, delta: isize) {
        let rows = self.rows();
        let Some(i) = self.selected_index(&rows) else {
            return;
        };
        let next = (i as isize + delta).clamp(0, rows.len() as isize - 1) as usize;
        self.selected = Some(rows[next].node.clone());
        self.redraw.request();
    }

    pub fn select_next(&mut self) {
        self.select_offset(1);
    }

    pub fn select_previous(&mut self) {
        self.select_offset(-1);
    }

    /// Run the node's action, start a lazy load, or toggle it open/closed.
    /// Nodes whose action is still running are left alone.
    pub fn activate_selected(&mut self) {
        let Some(node) = self.selected.clone() else {
            return;
        };
        if node.is_busy() {
            return;
        }
        if let Some(action) = node.action() {
            action();
        } else if let NodeKind::Folder { source: Some(source) } = node.kind() {
            if node.has_children() {
                node.set_expanded(!node.is_expanded());
            } else {
                (self.factory.load_children(&node, &source))();
            }
        } else if node.has_children() {
            node.set_expanded(!node.is_expanded());
        }
        self.redraw.request();
    }

    /// Reload the selected lazy folder, or check live sessions right away
    pub fn refresh_selected(&mut self) {
        let selected = self.selected.clone();
        if let Some(node) = &selected {
            if node.is_busy() {
                return;
            }
            if let NodeKind::Folder { source: Some(source) } = node.kind() {
                (self.factory.load_children(node, &source))();
                self.redraw.request();
                return;
            }
        }
        if let Some(supervisor) = &self.supervisor {
            self.output.info("checking live sessions");
            supervisor.poll_live_now();
        }
    }

    pub fn expand_selected(&mut self) {
        if let Some(node) = &self.selected {
            if node.has_children() && !node.is_expanded() {
                node.set_expanded(true);
                self.redraw.request();
            }
        }
    }

    /// Collapse the selected node, or move to its parent if already closed
    pub fn collapse_selected(&mut self) {
        let Some(node) = self.selected.clone() else {
            return;
        };
        if node.has_children() && node.is_expanded() {
            node.set_expanded(false);
        } else if let Some(parent) = tree::parent_of(&self.root, &node) {
            if !parent.ptr_eq(&self.root) {
                self.selected = Some(parent);
            }
        }
        self.redraw.request();
    }

    /// Start the loops and drive input and rendering until quit
    pub async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        self.start();
        loop {
            self.process_commands();
            if self.should_quit {
                break;
            }

            if self.redraw.take() {
                terminal.draw(|f| ui::ui(f, self))?;
            }

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        handle_key(self, key).await;
                    }
                    Event::Resize(_, _) => self.redraw.request(),
                    _ => {}
                }
            }
        }
        self.stop();
        Ok(())
    }
}
