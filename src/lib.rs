//! # Promptshelf
//!
//! Keeps a library of LLM prompts in a GitHub repository owned by the user:
//! a `metadata.json` index plus one file per prompt under `prompts/`.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! promptshelf = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use promptshelf::config::ClientConfig;
//! use promptshelf::session::Session;
//! use promptshelf::store::GitHubStore;
//! use promptshelf::sync::PromptSync;
//!
//! let config = ClientConfig::default();
//! let session = Session::new("octocat", token);
//! let store = GitHubStore::new(&config, &session)?;
//! promptshelf::provision::ensure_repo(&store).await?;
//!
//! let sync = PromptSync::new(store);
//! for prompt in sync.fetch_all().await? {
//!     println!("{}", prompt.record.title);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod provision;
pub mod session;
pub mod store;
pub mod sync;
pub mod types;
pub mod view;
