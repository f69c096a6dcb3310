use crate::sources::SourceError;
use crate::url::normalize_url;

/// Reads the uploaded URL list at `path`, one URL per line
pub async fn read_url_list(path: &str) -> Result<Vec<String>, SourceError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::UploadRead {
            path: path.to_string(),
            source,
        })?;

    Ok(parse_url_list(&content))
}

/// Parses URL list text
///
/// Blank lines and `#` comments are skipped; bare hosts get `https://`.
/// Lines that are not valid HTTP(S) URLs are logged and dropped.
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match normalize_url(line) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::warn!("Skipping uploaded URL '{}': {}", line, e);
                None
            }
        })
        .collect()
}
