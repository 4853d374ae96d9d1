use url::Url;

/// Derives the local filename from a URL: last path segment, query string
/// stripped, sanitized for the filesystem. Falls back to a unique name
/// when the URL has no usable segment.
pub fn filename_from_url(url_str: &str) -> String {
    if let Ok(url) = Url::parse(url_str) {
        if let Some(filename) = url.path_segments().and_then(|segments| segments.last()) {
            if !filename.is_empty() {
                return sanitize_filename(filename);
            }
        }
    }
    format!("download_{}", uuid::Uuid::new_v4())
}

pub fn sanitize_filename(filename: &str) -> String {
    filename.replace(|c: char| !c.is_alphanumeric() && c != '.' && c != '-' && c != '_', "_")
}
