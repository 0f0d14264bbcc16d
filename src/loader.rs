//! Loading log and country file text from disk or over HTTP.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while loading input text.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Returns true if `source` should be fetched over HTTP.
pub fn is_url(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Read a file, replacing invalid UTF-8 sequences.
///
/// Logging programs often write Latin-1, so undecodable bytes must not
/// abort the run.
pub async fn read_file(path: impl AsRef<Path>) -> Result<String, LoadError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(decode(&bytes))
}

/// Fetch text from a URL with an overall request timeout.
pub async fn fetch_url(url: &str, timeout: Duration) -> Result<String, LoadError> {
    info!("Fetching {}", url);

    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await?;
    debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(decode(&bytes))
}

/// Load text from a path or URL.
pub async fn load_text(source: &str, timeout: Duration) -> Result<String, LoadError> {
    let source = source.trim();
    if is_url(source) {
        fetch_url(source, timeout).await
    } else {
        read_file(source).await
    }
}

fn decode(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    // Strip a UTF-8 byte order mark
    text.strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or_else(|| text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ham-wrapped-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://www.country-files.com/cty/cty.dat"));
        assert!(is_url("  HTTP://example.com/cty.dat"));
        assert!(!is_url("/tmp/cty.dat"));
        assert!(!is_url("cty.dat"));
        assert!(!is_url("ftp://example.com/cty.dat"));
    }

    #[test]
    fn test_decode_lossy_and_bom() {
        assert_eq!(decode(b"\xef\xbb\xbf<EOH>"), "<EOH>");
        assert_eq!(decode(b"SP3\xe6BC"), "SP3\u{fffd}BC");
        assert_eq!(decode(b""), "");
    }

    #[tokio::test]
    async fn test_read_file() {
        let path = temp_path("read.adi");
        std::fs::write(&path, "<CALL:4>W1AW<EOR>").unwrap();

        let text = load_text(path.to_str().unwrap(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(text, "<CALL:4>W1AW<EOR>");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let path = temp_path("does-not-exist.adi");
        let err = read_file(&path).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("does-not-exist.adi"));
    }
}
