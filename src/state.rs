use std::sync::Arc;

use tui_input::Input;

use crate::api::CatalogApi;
use crate::errors::ViewerError;
use crate::secret::{CredentialStore, Credentials};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Login state plus the two API clients it authenticates
pub struct Session {
    state: SessionState,
    credentials: Option<Credentials>,
    v1: Arc<dyn CatalogApi>,
    v2: Arc<dyn CatalogApi>,
    store: Arc<dyn CredentialStore>,
}

impl Session {
    pub fn new(
        v1: Arc<dyn CatalogApi>,
        v2: Arc<dyn CatalogApi>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            state: SessionState::Unauthenticated,
            credentials: None,
            v1,
            v2,
            store,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn v1(&self) -> &Arc<dyn CatalogApi> {
        &self.v1
    }

    pub fn v2(&self) -> &Arc<dyn CatalogApi> {
        &self.v2
    }

    /// Authenticate against v1 then v2. Any failure leaves the state as it
    /// was.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
        token: &str,
    ) -> Result<(), ViewerError> {
        self.v1.authenticate(username, password, token).await?;
        if let Err(e) = self.v2.authenticate(username, password, token).await {
            self.v1.logout();
            return Err(e);
        }
        self.credentials = Some(Credentials::new(username, password, token));
        self.state = SessionState::Authenticated;
        Ok(())
    }

    pub async fn try_stored_login(&mut self) -> Result<(), ViewerError> {
        let creds = self.store.load()?;
        self.login(&creds.username, &creds.password, &creds.token).await
    }

    /// Username to pre-fill the login form with, if one is stored
    pub fn stored_username(&self) -> Option<String> {
        self.store.load().ok().map(|c| c.username)
    }

    /// Persist the credentials of the current login
    pub fn persist(&self) -> Result<(), ViewerError> {
        match &self.credentials {
            Some(creds) => self.store.save(creds),
            None => Err(ViewerError::NoStoredCredentials),
        }
    }

    /// Always ends `Unauthenticated` with both clients logged out. A failed
    /// credential removal is returned for logging only.
    pub fn logout(&mut self) -> Result<(), ViewerError> {
        self.v1.logout();
        self.v2.logout();
        let removed = self.store.remove();
        self.credentials = None;
        self.state = SessionState::Unauthenticated;
        removed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Email,
    Password,
    Test,
    Save,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Email => FormField::Password,
            FormField::Password => FormField::Test,
            FormField::Test => FormField::Save,
            FormField::Save => FormField::Email,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormField::Email => FormField::Save,
            FormField::Password => FormField::Email,
            FormField::Test => FormField::Password,
            FormField::Save => FormField::Test,
        }
    }
}

/// Credential form shown while unauthenticated
#[derive(Default)]
pub struct LoginForm {
    pub focus: FormField,
    pub email: Input,
    pub password: Input,
    /// Keys go to the tree instead of the form
    pub tree_focused: bool,
}

impl LoginForm {
    pub fn new(username: &str) -> Self {
        Self {
            email: Input::new(username.to_string()),
            ..Default::default()
        }
    }

    pub fn values(&self) -> (String, String) {
        (self.email.value().to_string(), self.password.value().to_string())
    }
}

/// What is presented next to the output pane
pub enum View {
    Form(LoginForm),
    Browser,
}

impl View {
    pub fn is_form(&self) -> bool {
        matches!(self, View::Form(_))
    }
}
