use crate::error::ReportError;

/// Whether a location should be fetched over HTTP rather than read from disk.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read an input document from a local path or an `http(s)://` URL.
pub fn read_source(location: &str) -> Result<String, ReportError> {
    if is_remote(location) {
        fetch_url(location)
    } else {
        std::fs::read_to_string(location).map_err(|source| ReportError::Io {
            path: location.to_string(),
            source,
        })
    }
}

/// Like `read_source`, but a missing local file yields `None`.
pub fn read_optional_source(location: &str) -> Result<Option<String>, ReportError> {
    match read_source(location) {
        Ok(text) => Ok(Some(text)),
        Err(ReportError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn fetch_url(url: &str) -> Result<String, ReportError> {
    let to_error = |source: reqwest::Error| ReportError::Http {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::new();
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(to_error)?;

    response.text().map_err(to_error)
}
