use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ViewerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn path(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Category,
    #[default]
    Folder,
    Item,
}

/// One playable variant of a content item (main feed, onboard camera...)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct StreamLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub kind: ListingKind,
    #[serde(default)]
    pub streams: Vec<StreamLink>,
    #[serde(default)]
    pub children: Vec<Listing>,
    /// Children must be fetched with `children(id)` on demand
    #[serde(default)]
    pub lazy: bool,
}

impl Listing {
    /// Changes whenever the title or any stream changes
    pub fn fingerprint(&self) -> String {
        let mut fp = self.title.clone();
        for s in &self.streams {
            fp.push('|');
            fp.push_str(&s.title);
            fp.push('=');
            fp.push_str(&s.url);
        }
        for c in &self.children {
            fp.push('/');
            fp.push_str(&c.fingerprint());
        }
        fp
    }
}

/// Remote catalog, one instance per API version
#[async_trait]
pub trait CatalogApi: Send + Sync {
    fn version(&self) -> ApiVersion;

    async fn authenticate(&self, username: &str, password: &str, token: &str)
        -> Result<(), ViewerError>;

    /// Forget whatever `authenticate` handed out
    fn logout(&self);

    /// Top-level listings shown when the tree is built
    async fn home(&self) -> Result<Vec<Listing>, ViewerError>;

    /// Sessions that are live right now
    async fn live_sessions(&self) -> Result<Vec<Listing>, ViewerError>;

    async fn children(&self, id: &str) -> Result<Vec<Listing>, ViewerError>;
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    login: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    token: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    subscription_token: Option<String>,
}

pub struct HttpCatalog {
    base_url: String,
    version: ApiVersion,
    client: reqwest::Client,
    token: Mutex<Option<String>>,
}

impl HttpCatalog {
    pub fn new(base_url: &str, version: ApiVersion, app_version: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .user_agent(format!("pitwall/{}", app_version))
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url,
            version,
            client,
            token: Mutex::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.version.path(), path)
    }

    fn current_token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn get_listings(&self, path: &str) -> Result<Vec<Listing>, ViewerError> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = self.current_token() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ViewerError::ServerError(status.as_u16(), body));
        }
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    fn version(&self) -> ApiVersion {
        self.version
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        token: &str,
    ) -> Result<(), ViewerError> {
        let resp = self
            .client
            .post(self.url("authenticate"))
            .json(&AuthRequest {
                login: username,
                password,
                token,
            })
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ViewerError::Authentication {
                api: self.version.path().to_string(),
                reason: format!("server answered {}", status),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ViewerError::ServerError(status.as_u16(), body));
        }

        let auth: AuthResponse = serde_json::from_str(&resp.text().await?)?;
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = auth.subscription_token;
        Ok(())
    }

    fn logout(&self) {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    async fn home(&self) -> Result<Vec<Listing>, ViewerError> {
        self.get_listings("home").await
    }

    async fn live_sessions(&self) -> Result<Vec<Listing>, ViewerError> {
        self.get_listings("live").await
    }

    async fn children(&self, id: &str) -> Result<Vec<Listing>, ViewerError> {
        self.get_listings(&format!("listing/{}", id)).await
    }
}
