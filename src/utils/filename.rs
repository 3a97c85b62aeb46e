use crate::error::StageError;
use percent_encoding::percent_decode_str;
use url::Url;

/// Derives the local filename (and object key) from the last path segment of
/// `file_url`. Query strings and fragments are ignored.
pub fn local_filename(file_url: &str) -> Result<String, StageError> {
    let invalid = |reason: &str| StageError::InvalidSourceUrl {
        url: file_url.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(file_url).map_err(|e| invalid(&e.to_string()))?;

    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    let name = percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| invalid("file name is not valid UTF-8"))?
        .into_owned();

    if name.is_empty() {
        return Err(invalid("URL path does not end in a file name"));
    }

    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(invalid("file name would escape the working directory"));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(invalid("file name contains control characters"));
    }

    Ok(name)
}
