use crate::error::{Error, Result};

/// Normalizes a repository-relative file path: no leading or trailing
/// slashes, no empty, `.` or `..` segments.
pub fn normalize_path(path: &str) -> Result<String> {
    let path = path.trim();

    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        return Err(Error::BadRequest("Path cannot be empty".to_string()));
    }

    for segment in &segments {
        validate_segment(segment)?;
    }

    Ok(segments.join("/"))
}

/// Percent-encodes each segment of a normalized path for use in a URL.
#[must_use]
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// GitHub repository names: ASCII letters, digits, `-`, `_` and `.`.
pub fn validate_repo_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 100 {
        return Err(Error::BadRequest(
            "Repository name must be 1-100 characters".to_string(),
        ));
    }
    if name == "." || name == ".." {
        return Err(Error::BadRequest("Invalid repository name".to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(Error::BadRequest(format!(
            "Repository name '{name}' contains invalid characters"
        )));
    }
    Ok(())
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment.len() > 255 {
        return Err(Error::BadRequest(
            "Path segment cannot exceed 255 characters".to_string(),
        ));
    }

    if segment == "." || segment == ".." {
        return Err(Error::BadRequest(
            "Path cannot contain relative segments".to_string(),
        ));
    }

    if segment.chars().any(char::is_control) {
        return Err(Error::BadRequest(
            "Path segment contains invalid characters".to_string(),
        ));
    }

    Ok(())
}
