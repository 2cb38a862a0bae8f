use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Token supplied for a single invocation, bypassing the credentials file.
pub const TOKEN_ENV: &str = "PROMPTSHELF_TOKEN";

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl From<Credentials> for Session {
    fn from(creds: Credentials) -> Self {
        Session::new(creds.username, creds.token)
    }
}

#[derive(Default, Serialize, Deserialize)]
pub struct CredentialsFile {
    pub default: Option<Credentials>,
}

fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("", "", "promptshelf")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory. Is $HOME set?"))
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub fn credentials_path() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("credentials.toml"))
}

pub fn load_credentials() -> anyhow::Result<Credentials> {
    read_credentials(&credentials_path()?)
}

pub fn save_credentials(creds: &Credentials) -> anyhow::Result<()> {
    write_credentials(&credentials_path()?, creds)
}

fn read_credentials(path: &Path) -> anyhow::Result<Credentials> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            anyhow::bail!("Not logged in. Run 'promptshelf auth login' first.")
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to read {}: {e}", path.display())),
    };
    toml::from_str::<CredentialsFile>(&content)
        .ok()
        .and_then(|file| file.default)
        .ok_or_else(|| {
            anyhow::anyhow!("Credentials file is corrupted. Run 'promptshelf auth login' to fix.")
        })
}

fn write_credentials(path: &Path, creds: &Credentials) -> anyhow::Result<()> {
    let file = CredentialsFile {
        default: Some(creds.clone()),
    };
    write_private(path, &toml::to_string_pretty(&file)?)
}

/// Owner-only from the first byte; an existing file is narrowed to 0600 too.
fn write_private(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Returns false when there was nothing to delete.
pub fn delete_credentials() -> anyhow::Result<bool> {
    let path = credentials_path()?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
