use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::ViewerError;

/// Published release. Never changed after it is fetched.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: String,
    /// Page to download the release from
    #[serde(default)]
    pub html_url: String,
}

#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Latest release and whether it is newer than `current_version`
    async fn check_update(&self, current_version: &str) -> Result<(Release, bool), ViewerError>;
}

/// Latest release from a GitHub-style releases endpoint
pub struct GithubReleases {
    url: String,
    client: reqwest::Client,
}

impl GithubReleases {
    pub fn new(url: &str, app_version: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!("pitwall/{}", app_version))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            url: url.to_string(),
            client,
        }
    }
}

#[async_trait]
impl UpdateSource for GithubReleases {
    async fn check_update(&self, current_version: &str) -> Result<(Release, bool), ViewerError> {
        let resp = self
            .client
            .get(&self.url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ViewerError::ServerError(status.as_u16(), status.to_string()));
        }
        let release: Release = serde_json::from_str(&resp.text().await?)?;
        let newer = is_newer(&release.tag, current_version);
        Ok((release, newer))
    }
}

fn version_parts(v: &str) -> Vec<u64> {
    let v = v.trim().trim_start_matches(['v', 'V']);
    // "1.2.3-beta" compares as 1.2.3
    let core = v.split(['-', '+']).next().unwrap_or("");
    core.split('.')
        .map(|p| p.parse::<u64>().unwrap_or(0))
        .collect()
}

/// Whether `candidate` is a strictly higher dotted version than `current`.
/// Missing components count as zero.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    let a = version_parts(candidate);
    let b = version_parts(current);
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        if x != y {
            return x > y;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_numerically() {
        assert!(is_newer("1.10.0", "1.9.3"));
        assert!(is_newer("v1.1.0", "1.0.0"));
        assert!(!is_newer("1.0.0", "1.0.0"));
        assert!(!is_newer("0.9", "1.0.0"));
        assert!(!is_newer("1.0", "1.0.0"));
        assert!(is_newer("2", "1.99.99"));
    }

    #[test]
    fn prerelease_suffix_is_ignored() {
        assert!(!is_newer("1.0.0-rc1", "1.0.0"));
        assert!(is_newer("1.0.1-rc1", "1.0.0"));
    }

    #[test]
    fn release_json_parses() {
        let release: Release = serde_json::from_str(
            r#"{"tag_name": "v1.1.0", "name": "Spa", "body": "fixes", "draft": false,
                "html_url": "https://example.com/releases/v1.1.0"}"#,
        )
        .unwrap();
        assert_eq!(release.tag, "v1.1.0");
        assert_eq!(release.name, "Spa");
        assert_eq!(release.html_url, "https://example.com/releases/v1.1.0");
    }
}
