//! Source loading: local export files or HTTP downloads.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};

/// Downloads `url` and returns the response body.
///
/// # Errors
///
/// Fails on an invalid URL, a transport error, or a non-success status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Whether `source` should be fetched over HTTP rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads export data from a local file path or fetches it over HTTP.
#[tracing::instrument(skip_all, fields(source = %source))]
pub async fn load_source(source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        let client = BasicClient::new();
        fetch_bytes(&client, source).await?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("reading {source}"))?
    };
    tracing::debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::env;
    use std::fs;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Talks to a local listener directly and remembers every requested URL.
    struct RecordingClient {
        inner: reqwest::Client,
        urls: Mutex<Vec<String>>,
    }

    impl RecordingClient {
        fn new() -> Self {
            Self {
                inner: reqwest::Client::builder().no_proxy().build().unwrap(),
                urls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpClient for RecordingClient {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            self.urls.lock().unwrap().push(req.url().to_string());
            self.inner.execute(req).await
        }
    }

    /// Serves a single connection with the given raw HTTP response.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/export.csv")
    }

    #[tokio::test]
    async fn test_fetch_bytes_returns_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 11\r\nConnection: close\r\n\r\nStart Time\n",
        )
        .await;
        let client = RecordingClient::new();

        let bytes = fetch_bytes(&client, &url).await.unwrap();
        assert_eq!(bytes, b"Start Time\n");
        assert_eq!(*client.urls.lock().unwrap(), vec![url]);
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_error_status() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let client = RecordingClient::new();

        let err = fetch_bytes(&client, &url).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.org/export.csv"));
        assert!(is_remote("http://localhost:8080/a.csv"));
        assert!(!is_remote("data/export.csv"));
        assert!(!is_remote("httpdocs/export.csv"));
    }

    #[tokio::test]
    async fn test_load_source_local_file() {
        let path = format!("{}/wind_rater_test_source.csv", env::temp_dir().display());
        fs::write(&path, b"Start Time\n").unwrap();

        let bytes = load_source(&path).await.unwrap();
        assert_eq!(bytes, b"Start Time\n");

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_source_missing_file() {
        assert!(load_source("/nonexistent/wind_rater.csv").await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_bytes_invalid_url() {
        let client = BasicClient::new();
        assert!(fetch_bytes(&client, "not a url").await.is_err());
    }
}
