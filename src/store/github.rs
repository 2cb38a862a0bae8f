use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::path::{encode_path, normalize_path};
use super::{RemoteFile, RemoteStore, RepoHost, RepoStatus};
use crate::config::ClientConfig;
use crate::error::{Error, GENERIC_FAILURE, Result};
use crate::session::Session;
use crate::types::RevisionToken;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("promptshelf/", env!("CARGO_PKG_VERSION"));
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
/// Served when a file is too large for an inline base64 body.
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

#[derive(Debug, Deserialize)]
struct ContentResponse {
    sha: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl ContentResponse {
    /// Files above the inline limit come back with `encoding: "none"` and no body.
    fn body_omitted(&self) -> bool {
        match self.encoding.as_deref() {
            Some("none") => true,
            _ => self.size > 0 && self.content.as_deref().is_none_or(str::is_empty),
        }
    }
}

#[derive(Debug, Serialize)]
struct PutContentRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentResponse {
    content: CommittedFile,
}

#[derive(Debug, Deserialize)]
struct CommittedFile {
    sha: String,
}

#[derive(Debug, Serialize)]
struct DeleteContentRequest<'a> {
    message: &'a str,
    sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    auto_init: bool,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl ErrorBody {
    /// Validation failures carry the useful text in `errors[].message`.
    fn into_message(self) -> Option<String> {
        self.errors
            .into_iter()
            .find_map(|e| e.message)
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Which kind of request produced a failure; conflicts only exist for
/// conditional content writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Read,
    Write,
    Repo,
}

/// [`RemoteStore`] backed by the GitHub REST contents API, scoped to one
/// repository owned by the session user.
#[derive(Clone)]
pub struct GitHubStore {
    client: Client,
    base_url: String,
    owner: String,
    repo: String,
    branch: Option<String>,
    token: String,
}

fn build_client(config: &ClientConfig) -> Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

impl GitHubStore {
    pub fn new(config: &ClientConfig, session: &Session) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: build_client(config)?,
            base_url: config.api_base().to_string(),
            owner: session.username.clone(),
            repo: config.repo_name.clone(),
            branch: config.branch.clone(),
            token: session.token.clone(),
        })
    }

    /// Resolves the username a token belongs to (`GET /user`).
    pub async fn whoami(config: &ClientConfig, token: &str) -> Result<String> {
        let client = build_client(config)?;
        let url = format!("{}/user", config.api_base());
        let resp = with_headers(client.get(&url), token).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp, Call::Repo).await);
        }
        let user: UserResponse = decode_json(resp).await?;
        Ok(user.login)
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.base_url,
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.repo)
        )
    }

    fn contents_url(&self, path: &str) -> String {
        format!("{}/contents/{}", self.repo_url(), encode_path(path))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        with_headers(self.client.request(method, url), &self.token)
    }

    fn contents_get(&self, url: &str, accept: &str) -> RequestBuilder {
        let req = authorized(self.client.get(url), &self.token, accept);
        match &self.branch {
            Some(branch) => req.query(&[("ref", branch)]),
            None => req,
        }
    }

    async fn read_raw(&self, url: &str, path: &str) -> Result<String> {
        debug!(path = %path, "GET raw contents");
        let resp = self.contents_get(url, RAW_MEDIA_TYPE).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp, Call::Read).await);
        }
        let bytes = resp.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::Malformed("content is not valid UTF-8".to_string()))
    }
}

fn with_headers(builder: RequestBuilder, token: &str) -> RequestBuilder {
    authorized(builder, token, JSON_MEDIA_TYPE)
}

fn authorized(builder: RequestBuilder, token: &str, accept: &str) -> RequestBuilder {
    builder
        .bearer_auth(token)
        .header("Accept", accept)
        .header("X-GitHub-Api-Version", API_VERSION)
}

async fn decode_json<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(Into::into)
}

async fn error_from_response(resp: Response, call: Call) -> Error {
    let status = resp.status();
    let message = match resp.bytes().await {
        Ok(bytes) => serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(ErrorBody::into_message),
        Err(_) => None,
    };
    classify(status, message, call)
}

fn classify(status: StatusCode, message: Option<String>, call: Call) -> Error {
    let message = message.unwrap_or_else(|| GENERIC_FAILURE.to_string());
    match status {
        StatusCode::NOT_FOUND => Error::NotFound,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(message),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY if call == Call::Write => {
            Error::Conflict(message)
        }
        _ => Error::Remote {
            status: status.as_u16(),
            message,
        },
    }
}

/// GitHub wraps base64 payloads at 60 columns.
fn decode_content(raw: &str) -> Result<String> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned)?;
    String::from_utf8(bytes).map_err(|_| Error::Malformed("content is not valid UTF-8".to_string()))
}

impl RemoteStore for GitHubStore {
    async fn read_with_token(&self, path: &str) -> Result<Option<RemoteFile>> {
        let path = normalize_path(path)?;
        let url = self.contents_url(&path);
        debug!(path = %path, "GET contents");

        let resp = self.contents_get(&url, JSON_MEDIA_TYPE).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(error_from_response(resp, Call::Read).await);
        }

        let body: serde_json::Value = decode_json(resp).await?;
        if body.is_array() {
            return Err(Error::Malformed(format!("{path} is a directory, not a file")));
        }
        let file: ContentResponse = serde_json::from_value(body)?;
        let content = match file.encoding.as_deref() {
            _ if file.body_omitted() => self.read_raw(&url, &path).await?,
            Some("base64") | None => decode_content(file.content.as_deref().unwrap_or(""))?,
            Some(other) => {
                return Err(Error::Malformed(format!(
                    "unsupported content encoding '{other}' for {path}"
                )));
            }
        };

        Ok(Some(RemoteFile {
            path,
            content,
            token: RevisionToken::new(file.sha),
        }))
    }

    async fn write_if_token(
        &self,
        path: &str,
        content: &str,
        message: &str,
        token: Option<&RevisionToken>,
    ) -> Result<RevisionToken> {
        let path = normalize_path(path)?;
        let url = self.contents_url(&path);
        debug!(path = %path, conditional = token.is_some(), "PUT contents");

        let body = PutContentRequest {
            message,
            content: STANDARD.encode(content.as_bytes()),
            sha: token.map(RevisionToken::as_str),
            branch: self.branch.as_deref(),
        };
        let resp = self.request(Method::PUT, &url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp, Call::Write).await);
        }

        let committed: PutContentResponse = decode_json(resp).await?;
        Ok(RevisionToken::new(committed.content.sha))
    }

    async fn delete_if_token(&self, path: &str, message: &str, token: &RevisionToken) -> Result<()> {
        let path = normalize_path(path)?;
        let url = self.contents_url(&path);
        debug!(path = %path, "DELETE contents");

        let body = DeleteContentRequest {
            message,
            sha: token.as_str(),
            branch: self.branch.as_deref(),
        };
        let resp = self.request(Method::DELETE, &url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp, Call::Write).await);
        }
        Ok(())
    }
}

impl RepoHost for GitHubStore {
    async fn repo_status(&self) -> Result<RepoStatus> {
        let resp = self.request(Method::GET, &self.repo_url()).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(RepoStatus::Missing),
            s if s.is_success() => Ok(RepoStatus::Present),
            _ => Err(error_from_response(resp, Call::Repo).await),
        }
    }

    async fn create_repo(&self) -> Result<()> {
        let url = format!("{}/user/repos", self.base_url);
        let body = CreateRepoRequest {
            name: &self.repo,
            description: "Prompt library managed by promptshelf",
            private: false,
            auto_init: true,
        };
        let resp = self.request(Method::POST, &url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp, Call::Repo).await);
        }
        Ok(())
    }
}
