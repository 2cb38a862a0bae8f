use super::credentials::config_path;
use crate::config::ClientConfig;

/// Prints the effective configuration. With any setting given, or with
/// `--save`, writes it back to the config file first.
pub fn run_config(
    mut config: ClientConfig,
    branch: Option<String>,
    timeout_secs: Option<u64>,
    save: bool,
) -> anyhow::Result<()> {
    let changed = branch.is_some() || timeout_secs.is_some();
    if let Some(branch) = branch {
        config.branch = Some(branch).filter(|b| !b.trim().is_empty());
    }
    if let Some(secs) = timeout_secs {
        config.timeout_secs = Some(secs).filter(|s| *s > 0);
    }

    let path = config_path()?;
    if changed || save {
        config.save(&path)?;
        println!("Saved {}", path.display());
        println!();
    }

    println!("api_url      = {}", config.api_url);
    println!("repo_name    = {}", config.repo_name);
    println!(
        "branch       = {}",
        config.branch.as_deref().unwrap_or("(repository default)")
    );
    match config.timeout_secs {
        Some(secs) => println!("timeout_secs = {secs}"),
        None => println!("timeout_secs = (none)"),
    }
    Ok(())
}
