use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::config::project_dirs;
use crate::errors::ViewerError;

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: Zeroizing<String>,
    #[serde(default)]
    pub token: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str, token: &str) -> Self {
        Self {
            username: username.to_string(),
            password: Zeroizing::new(password.to_string()),
            token: token.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Secret storage for the login. `load` fails with
/// `ViewerError::NoStoredCredentials` when nothing usable is stored.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Credentials, ViewerError>;
    fn save(&self, credentials: &Credentials) -> Result<(), ViewerError>;
    fn remove(&self) -> Result<(), ViewerError>;
}

/// JSON file in the user data directory
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_data_dir() -> Result<Self, ViewerError> {
        let dirs = project_dirs()
            .ok_or_else(|| ViewerError::Store("no home directory".to_string()))?;
        Ok(Self::new(dirs.data_dir().join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Credentials, ViewerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => Zeroizing::new(c),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ViewerError::NoStoredCredentials)
            }
            Err(e) => return Err(ViewerError::Store(e.to_string())),
        };
        let creds: Credentials =
            serde_json::from_str(&content).map_err(|_| ViewerError::NoStoredCredentials)?;
        if creds.username.is_empty() || creds.password.is_empty() {
            return Err(ViewerError::NoStoredCredentials);
        }
        Ok(creds)
    }

    fn save(&self, credentials: &Credentials) -> Result<(), ViewerError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| ViewerError::Store(e.to_string()))?;
        }
        let json = Zeroizing::new(serde_json::to_string(credentials)?);
        fs::write(&self.path, json.as_bytes()).map_err(|e| ViewerError::Store(e.to_string()))?;
        restrict_permissions(&self.path);
        Ok(())
    }

    fn remove(&self) -> Result<(), ViewerError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ViewerError::Store(e.to_string())),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> FileCredentialStore {
        let dir = std::env::temp_dir().join(format!("pitwall-secret-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        FileCredentialStore::new(dir.join("credentials.json"))
    }

    #[test]
    fn missing_file_means_no_credentials() {
        let store = temp_store("missing");
        assert_eq!(store.load().unwrap_err(), ViewerError::NoStoredCredentials);
    }

    #[test]
    fn malformed_file_means_no_credentials() {
        let store = temp_store("malformed");
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load().unwrap_err(), ViewerError::NoStoredCredentials);
    }

    #[test]
    fn save_load_remove() {
        let store = temp_store("cycle");
        store.save(&Credentials::new("a@b.com", "pw1", "")).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.username, "a@b.com");
        assert_eq!(loaded.password.as_str(), "pw1");

        store.remove().unwrap();
        assert!(store.load().is_err());
        // removing twice is fine
        store.remove().unwrap();
    }
}
