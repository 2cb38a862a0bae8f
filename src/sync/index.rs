use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::RemoteStore;
use crate::types::{METADATA_PATH, MetadataIndex, PromptRecord, RevisionToken};

/// The index as read at one moment, plus the token a write must present.
///
/// `token` is `None` when `metadata.json` does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSnapshot {
    pub index: MetadataIndex,
    pub token: Option<RevisionToken>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexDocument {
    Wrapped(MetadataIndex),
    Bare(Vec<PromptRecord>),
}

/// Parses `metadata.json`; an empty document is an empty index.
pub fn parse_index(raw: &str) -> Result<MetadataIndex> {
    if raw.trim().is_empty() {
        return Ok(MetadataIndex::default());
    }
    match serde_json::from_str::<IndexDocument>(raw) {
        Ok(IndexDocument::Wrapped(index)) => Ok(index),
        Ok(IndexDocument::Bare(prompts)) => Ok(MetadataIndex { prompts }),
        Err(e) => Err(Error::Malformed(format!("{METADATA_PATH}: {e}"))),
    }
}

pub fn serialize_index(index: &MetadataIndex) -> Result<String> {
    let mut out = serde_json::to_string_pretty(index)?;
    out.push('\n');
    Ok(out)
}

pub async fn read_index<S: RemoteStore>(store: &S) -> Result<IndexSnapshot> {
    let Some(file) = store.read_with_token(METADATA_PATH).await? else {
        debug!("no {METADATA_PATH} yet, starting empty");
        return Ok(IndexSnapshot::default());
    };
    Ok(IndexSnapshot {
        index: parse_index(&file.content)?,
        token: Some(file.token),
    })
}

pub async fn write_index<S: RemoteStore>(
    store: &S,
    index: &MetadataIndex,
    token: Option<&RevisionToken>,
    message: &str,
) -> Result<RevisionToken> {
    let body = serialize_index(index)?;
    store.write_if_token(METADATA_PATH, &body, message, token).await
}
