mod client;

pub use client::{ClientConfig, DEFAULT_API_URL, DEFAULT_REPO_NAME};
