//! GitHub gists as the snippet service.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use super::{Snippet, SnippetFiles, SnippetService, SyncError};

const GISTS_URL: &str = "https://api.github.com/gists";
const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct GistPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public: Option<bool>,
    files: BTreeMap<&'a str, GistFile<'a>>,
}

#[derive(Debug, Serialize)]
struct GistFile<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    id: String,
    #[serde(default)]
    files: BTreeMap<String, RemoteFile>,
}

#[derive(Debug, Deserialize)]
struct RemoteFile {
    #[serde(default)]
    content: Option<String>,
}

impl<'a> GistPayload<'a> {
    fn new(files: &'a SnippetFiles) -> Self {
        Self {
            description: None,
            public: None,
            files: files
                .iter()
                .map(|(name, content)| (name.as_str(), GistFile { content }))
                .collect(),
        }
    }
}

impl From<GistResponse> for Snippet {
    fn from(gist: GistResponse) -> Self {
        Snippet {
            id: gist.id,
            files: gist
                .files
                .into_iter()
                .filter_map(|(name, file)| Some((name, file.content?)))
                .collect(),
        }
    }
}

/// Private gists authenticated with a personal access token.
#[derive(Debug, Clone)]
pub struct GistService {
    token: String,
    base_url: String,
}

impl GistService {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: GISTS_URL.to_string(),
        }
    }

    /// Point at a GitHub Enterprise or test endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn gist_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        payload: Option<&GistPayload<'_>>,
    ) -> Result<Snippet, SyncError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mcpsync/", env!("CARGO_PKG_VERSION")))
            .timeout(TIMEOUT)
            .build()?;

        let mut request = client
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/vnd.github.v3+json");
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        tracing::debug!(%method, url, "Calling gist API");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let gist: GistResponse = response.json().await?;
        Ok(gist.into())
    }
}

/// Drive one request from synchronous code.
fn block_on<T>(future: impl Future<Output = Result<T, SyncError>>) -> Result<T, SyncError> {
    let runtime = tokio::runtime::Runtime::new().map_err(SyncError::Runtime)?;
    runtime.block_on(future)
}

impl SnippetService for GistService {
    fn create(&self, description: &str, files: &SnippetFiles) -> Result<Snippet, SyncError> {
        let mut payload = GistPayload::new(files);
        payload.description = Some(description);
        payload.public = Some(false);
        block_on(self.send(Method::POST, &self.base_url, Some(&payload)))
    }

    fn update(&self, id: &str, files: &SnippetFiles) -> Result<Snippet, SyncError> {
        let payload = GistPayload::new(files);
        block_on(self.send(Method::PATCH, &self.gist_url(id), Some(&payload)))
    }

    fn fetch(&self, id: &str) -> Result<Snippet, SyncError> {
        block_on(self.send(Method::GET, &self.gist_url(id), None))
    }
}
