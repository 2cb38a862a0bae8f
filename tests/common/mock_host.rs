//! In-process stand-in for the slice of the GitHub REST API the client uses:
//! `GET /user`, `POST /user/repos`, `GET /repos/{owner}/{repo}` and the
//! contents endpoints with sha-checked writes.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tokio::sync::oneshot;

pub const TEST_TOKEN: &str = "ghp_test_token";
pub const TEST_LOGIN: &str = "octocat";

/// One content change, in the order the host accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub method: &'static str,
    pub path: String,
    pub message: String,
}

#[derive(Default)]
struct Repo {
    files: BTreeMap<String, String>,
}

#[derive(Default)]
struct HostState {
    repos: HashMap<String, Repo>,
    commits: Vec<Commit>,
    fail_next_write: Option<WriteFault>,
    inline_limit: Option<usize>,
    raw_reads: usize,
}

struct WriteFault {
    prefix: String,
    status: StatusCode,
    message: String,
}

impl HostState {
    fn take_fault(&mut self, path: &str) -> Option<Response> {
        let hit = self
            .fail_next_write
            .as_ref()
            .is_some_and(|f| path.starts_with(&f.prefix));
        if !hit {
            return None;
        }
        self.fail_next_write
            .take()
            .map(|f| error(f.status, &f.message))
    }
}

type Shared = Arc<Mutex<HostState>>;

pub struct MockHost {
    pub base_url: String,
    state: Shared,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockHost {
    /// Starts the host on its own thread and runtime so that blocking
    /// callers (CLI tests) and async callers can both use it.
    pub fn spawn() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.set_nonblocking(true).expect("set nonblocking");
        let addr = listener.local_addr().expect("local addr");

        let state: Shared = Arc::new(Mutex::new(HostState::default()));
        let app = router(state.clone());
        let (tx, rx) = oneshot::channel::<()>();

        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("build runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("listener");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = rx.await;
                    })
                    .await
                    .expect("serve");
            });
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(tx),
        }
    }

    /// Host with an (empty) repository already present.
    pub fn with_repo(name: &str) -> Self {
        let host = Self::spawn();
        host.lock().repos.insert(name.to_string(), Repo::default());
        host
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().expect("host state")
    }

    pub fn has_repo(&self, name: &str) -> bool {
        self.lock().repos.contains_key(name)
    }

    pub fn files(&self, repo: &str) -> BTreeMap<String, String> {
        self.lock()
            .repos
            .get(repo)
            .map(|r| r.files.clone())
            .unwrap_or_default()
    }

    pub fn file(&self, repo: &str, path: &str) -> Option<String> {
        self.lock().repos.get(repo)?.files.get(path).cloned()
    }

    /// Writes a file directly, without recording a commit.
    pub fn put_file(&self, repo: &str, path: &str, content: &str) {
        self.lock()
            .repos
            .entry(repo.to_string())
            .or_default()
            .files
            .insert(path.to_string(), content.to_string());
    }

    pub fn remove_file(&self, repo: &str, path: &str) {
        if let Some(r) = self.lock().repos.get_mut(repo) {
            r.files.remove(path);
        }
    }

    pub fn commits(&self) -> Vec<Commit> {
        self.lock().commits.clone()
    }

    pub fn clear_commits(&self) {
        self.lock().commits.clear();
    }

    /// Files larger than `bytes` come back as metadata only (`encoding: "none"`)
    /// unless the raw media type is requested, like the real API above 1 MB.
    pub fn set_inline_limit(&self, bytes: usize) {
        self.lock().inline_limit = Some(bytes);
    }

    /// Number of contents reads served with the raw media type.
    pub fn raw_reads(&self) -> usize {
        self.lock().raw_reads
    }

    /// Makes the next PUT or DELETE on contents fail with `status`.
    pub fn fail_next_write(&self, status: u16, message: &str) {
        self.fail_next_write_under("", status, message);
    }

    /// Like [`fail_next_write`](Self::fail_next_write), but only for paths
    /// starting with `prefix`.
    pub fn fail_next_write_under(&self, prefix: &str, status: u16, message: &str) {
        self.lock().fail_next_write = Some(WriteFault {
            prefix: prefix.to_string(),
            status: StatusCode::from_u16(status).expect("status code"),
            message: message.to_string(),
        });
    }
}

impl Drop for MockHost {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Git blob id of `content`, the way GitHub reports file shas.
pub fn blob_sha(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("blob {}\0", content.len()));
    hasher.update(content.as_bytes());
    let mut sha = hex::encode(hasher.finalize());
    sha.truncate(40);
    sha
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/user", get(get_user))
        .route("/user/repos", post(create_repo))
        .route("/repos/{owner}/{repo}", get(get_repo))
        .route(
            "/repos/{owner}/{repo}/contents/{*path}",
            get(get_contents).put(put_contents).delete(delete_contents),
        )
        .with_state(state)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Not Found")
}

fn check_auth(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {TEST_TOKEN}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(v) if v == expected => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Bad credentials")),
    }
}

async fn get_user(headers: HeaderMap) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }
    Json(json!({ "login": TEST_LOGIN, "id": 1 })).into_response()
}

#[derive(Deserialize)]
struct CreateRepoBody {
    name: String,
    #[serde(default)]
    auto_init: bool,
}

async fn create_repo(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CreateRepoBody>,
) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }
    let mut state = state.lock().expect("host state");
    if state.repos.contains_key(&body.name) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "Repository creation failed.",
                "errors": [{
                    "resource": "Repository",
                    "code": "custom",
                    "field": "name",
                    "message": "name already exists on this account"
                }]
            })),
        )
            .into_response();
    }

    let mut repo = Repo::default();
    if body.auto_init {
        repo.files
            .insert("README.md".to_string(), format!("# {}\n", body.name));
    }
    state.repos.insert(body.name.clone(), repo);

    (
        StatusCode::CREATED,
        Json(json!({
            "name": body.name,
            "full_name": format!("{TEST_LOGIN}/{}", body.name),
        })),
    )
        .into_response()
}

async fn get_repo(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((owner, repo)): Path<(String, String)>,
) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }
    let state = state.lock().expect("host state");
    if owner != TEST_LOGIN || !state.repos.contains_key(&repo) {
        return not_found();
    }
    Json(json!({
        "name": repo,
        "full_name": format!("{owner}/{repo}"),
        "default_branch": "main",
    }))
    .into_response()
}

/// Base64 wrapped at 60 columns, as the real API returns it.
fn wrapped_base64(content: &str) -> String {
    let encoded = STANDARD.encode(content.as_bytes());
    let mut out = String::with_capacity(encoded.len() + encoded.len() / 60 + 1);
    for chunk in encoded.as_bytes().chunks(60) {
        out.push_str(std::str::from_utf8(chunk).expect("base64 is ascii"));
        out.push('\n');
    }
    out
}

async fn get_contents(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((owner, repo, path)): Path<(String, String, String)>,
) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }
    let wants_raw = headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "application/vnd.github.raw");
    let mut guard = state.lock().expect("host state");
    let state = &mut *guard;
    let Some(repo) = state.repos.get(&repo).filter(|_| owner == TEST_LOGIN) else {
        return not_found();
    };

    if let Some(content) = repo.files.get(&path) {
        if wants_raw {
            state.raw_reads += 1;
            return (StatusCode::OK, content.clone()).into_response();
        }
        let inline = state.inline_limit.is_none_or(|limit| content.len() <= limit);
        let (encoding, body) = if inline {
            ("base64", wrapped_base64(content))
        } else {
            ("none", String::new())
        };
        return Json(json!({
            "type": "file",
            "encoding": encoding,
            "size": content.len(),
            "name": path.rsplit('/').next().unwrap_or(&path),
            "path": path,
            "sha": blob_sha(content),
            "content": body,
        }))
        .into_response();
    }

    let prefix = format!("{path}/");
    let entries: Vec<Value> = repo
        .files
        .iter()
        .filter(|(p, _)| p.starts_with(&prefix))
        .map(|(p, c)| json!({ "type": "file", "path": p, "sha": blob_sha(c) }))
        .collect();
    if entries.is_empty() {
        return not_found();
    }
    Json(Value::Array(entries)).into_response()
}

#[derive(Deserialize)]
struct PutBody {
    message: String,
    content: String,
    sha: Option<String>,
}

async fn put_contents(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Json(body): Json<PutBody>,
) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }
    let mut guard = state.lock().expect("host state");
    if let Some(resp) = guard.take_fault(&path) {
        return resp;
    }
    let state = &mut *guard;
    let Some(repo) = state.repos.get_mut(&repo).filter(|_| owner == TEST_LOGIN) else {
        return not_found();
    };

    let Ok(bytes) = STANDARD.decode(body.content.as_bytes()) else {
        return error(StatusCode::BAD_REQUEST, "content is not valid Base64");
    };
    let Ok(content) = String::from_utf8(bytes) else {
        return error(StatusCode::BAD_REQUEST, "content is not valid UTF-8");
    };

    let current = repo.files.get(&path).map(|c| blob_sha(c));
    let created = match (current, body.sha.as_deref()) {
        (None, None) => true,
        (Some(_), None) => {
            return error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid request.\n\n\"sha\" wasn't supplied.",
            );
        }
        (Some(current), Some(given)) if current == given => false,
        (_, Some(given)) => {
            return error(StatusCode::CONFLICT, &format!("{path} does not match {given}"));
        }
    };

    let sha = blob_sha(&content);
    repo.files.insert(path.clone(), content);
    state.commits.push(Commit {
        method: "PUT",
        path: path.clone(),
        message: body.message.clone(),
    });

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(json!({
            "content": { "path": path, "sha": sha },
            "commit": { "message": body.message },
        })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct DeleteBody {
    message: String,
    sha: String,
}

async fn delete_contents(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Json(body): Json<DeleteBody>,
) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }
    let mut guard = state.lock().expect("host state");
    if let Some(resp) = guard.take_fault(&path) {
        return resp;
    }
    let state = &mut *guard;
    let Some(repo) = state.repos.get_mut(&repo).filter(|_| owner == TEST_LOGIN) else {
        return not_found();
    };

    let Some(current) = repo.files.get(&path).map(|c| blob_sha(c)) else {
        return not_found();
    };
    if current != body.sha {
        return error(
            StatusCode::CONFLICT,
            &format!("{path} does not match {}", body.sha),
        );
    }

    repo.files.remove(&path);
    state.commits.push(Commit {
        method: "DELETE",
        path,
        message: body.message.clone(),
    });

    Json(json!({ "content": null, "commit": { "message": body.message } })).into_response()
}
