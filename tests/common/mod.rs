#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use pitwall_lib::api::{ApiVersion, CatalogApi, Listing, ListingKind, StreamLink};
use pitwall_lib::app::Collaborators;
use pitwall_lib::errors::ViewerError;
use pitwall_lib::player::Launcher;
use pitwall_lib::secret::{CredentialStore, Credentials};
use pitwall_lib::tree::TreeNode;
use pitwall_lib::update::{Release, UpdateSource};

pub const GOOD_PASSWORD: &str = "pw1";

pub struct FakeCatalog {
    pub version: ApiVersion,
    pub password: String,
    pub home: Vec<Listing>,
    pub live: Mutex<VecDeque<Result<Vec<Listing>, ViewerError>>>,
    pub children: HashMap<String, Vec<Listing>>,
    pub auth_calls: Mutex<Vec<String>>,
    pub logouts: Mutex<usize>,
    pub children_calls: Mutex<usize>,
    pub children_delay: Duration,
}

impl FakeCatalog {
    pub fn new(version: ApiVersion) -> Self {
        Self {
            version,
            password: GOOD_PASSWORD.to_string(),
            home: Vec::new(),
            live: Mutex::new(VecDeque::new()),
            children: HashMap::new(),
            auth_calls: Mutex::new(Vec::new()),
            logouts: Mutex::new(0),
            children_calls: Mutex::new(0),
            children_delay: Duration::ZERO,
        }
    }

    pub fn rejecting(version: ApiVersion) -> Self {
        Self {
            password: "\u{0}never".to_string(),
            ..Self::new(version)
        }
    }

    pub fn with_home(mut self, home: Vec<Listing>) -> Self {
        self.home = home;
        self
    }

    pub fn with_children(mut self, id: &str, children: Vec<Listing>) -> Self {
        self.children.insert(id.to_string(), children);
        self
    }

    pub fn with_slow_children(mut self, delay: Duration) -> Self {
        self.children_delay = delay;
        self
    }

    pub fn logout_count(&self) -> usize {
        *self.logouts.lock().unwrap()
    }

    pub fn children_count(&self) -> usize {
        *self.children_calls.lock().unwrap()
    }

    pub fn pending_live(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn script_live(&self, responses: Vec<Result<Vec<Listing>, ViewerError>>) {
        self.live.lock().unwrap().extend(responses);
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    fn version(&self) -> ApiVersion {
        self.version
    }

    async fn authenticate(&self, username: &str, password: &str, _token: &str) -> Result<(), ViewerError> {
        self.auth_calls.lock().unwrap().push(username.to_string());
        if password == self.password {
            Ok(())
        } else {
            Err(ViewerError::Authentication {
                api: self.version.path().to_string(),
                reason: "wrong password".to_string(),
            })
        }
    }

    fn logout(&self) {
        *self.logouts.lock().unwrap() += 1;
    }

    async fn home(&self) -> Result<Vec<Listing>, ViewerError> {
        Ok(self.home.clone())
    }

    async fn live_sessions(&self) -> Result<Vec<Listing>, ViewerError> {
        self.live.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn children(&self, id: &str) -> Result<Vec<Listing>, ViewerError> {
        *self.children_calls.lock().unwrap() += 1;
        if !self.children_delay.is_zero() {
            tokio::time::sleep(self.children_delay).await;
        }
        self.children
            .get(id)
            .cloned()
            .ok_or_else(|| ViewerError::ServerError(404, id.to_string()))
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub stored: Mutex<Option<Credentials>>,
    pub fail_remove: bool,
    pub saves: Mutex<usize>,
}

impl FakeStore {
    pub fn with(username: &str, password: &str) -> Self {
        Self {
            stored: Mutex::new(Some(Credentials::new(username, password, ""))),
            ..Default::default()
        }
    }
}

impl CredentialStore for FakeStore {
    fn load(&self) -> Result<Credentials, ViewerError> {
        self.stored.lock().unwrap().clone().ok_or(ViewerError::NoStoredCredentials)
    }

    fn save(&self, credentials: &Credentials) -> Result<(), ViewerError> {
        *self.saves.lock().unwrap() += 1;
        *self.stored.lock().unwrap() = Some(credentials.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), ViewerError> {
        if self.fail_remove {
            return Err(ViewerError::Store("keyring locked".to_string()));
        }
        *self.stored.lock().unwrap() = None;
        Ok(())
    }
}

pub struct FakeUpdates {
    pub result: Result<(Release, bool), ViewerError>,
}

impl FakeUpdates {
    pub fn none() -> Self {
        Self {
            result: Ok((release("1.0.0"), false)),
        }
    }

    pub fn newer(tag: &str) -> Self {
        Self {
            result: Ok((release(tag), true)),
        }
    }
}

#[async_trait]
impl UpdateSource for FakeUpdates {
    async fn check_update(&self, _current: &str) -> Result<(Release, bool), ViewerError> {
        self.result.clone()
    }
}

#[derive(Default)]
pub struct FakeLauncher {
    pub opened: Mutex<Vec<String>>,
    pub commands: Mutex<Vec<Vec<String>>>,
}

impl Launcher for FakeLauncher {
    fn open_browser(&self, url: &str) -> Result<(), ViewerError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }

    fn run_command(&self, command: &[String]) -> Result<(), ViewerError> {
        self.commands.lock().unwrap().push(command.to_vec());
        Ok(())
    }
}

pub fn release(tag: &str) -> Release {
    Release {
        tag: tag.to_string(),
        name: format!("pitwall {}", tag),
        body: "faster live checks".to_string(),
        html_url: format!("https://example.com/releases/{}", tag),
    }
}

pub fn item(id: &str, title: &str, urls: &[&str]) -> Listing {
    Listing {
        id: id.to_string(),
        title: title.to_string(),
        kind: ListingKind::Item,
        streams: urls
            .iter()
            .enumerate()
            .map(|(i, u)| StreamLink {
                title: format!("feed {}", i + 1),
                url: u.to_string(),
            })
            .collect(),
        ..Default::default()
    }
}

pub fn lazy_folder(id: &str, title: &str) -> Listing {
    Listing {
        id: id.to_string(),
        title: title.to_string(),
        kind: ListingKind::Folder,
        lazy: true,
        ..Default::default()
    }
}

pub struct Fakes {
    pub v1: Arc<FakeCatalog>,
    pub v2: Arc<FakeCatalog>,
    pub store: Arc<FakeStore>,
    pub updates: Arc<FakeUpdates>,
    pub launcher: Arc<FakeLauncher>,
}

impl Fakes {
    pub fn new(store: FakeStore) -> Self {
        Self {
            v1: Arc::new(FakeCatalog::new(ApiVersion::V1)),
            v2: Arc::new(FakeCatalog::new(ApiVersion::V2)),
            store: Arc::new(store),
            updates: Arc::new(FakeUpdates::none()),
            launcher: Arc::new(FakeLauncher::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            v1: self.v1.clone(),
            v2: self.v2.clone(),
            store: self.store.clone(),
            updates: self.updates.clone(),
            launcher: self.launcher.clone(),
        }
    }
}

pub fn child_texts(node: &TreeNode) -> Vec<String> {
    node.children().iter().map(TreeNode::text).collect()
}

/// Poll `cond` for up to two seconds
pub async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
