use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;
use vt_source::Fetcher;

/// Native transport.
///
/// Absolute `http(s)` URLs go over the network; anything else is a path
/// relative to the asset root, read from disk. The root comes from
/// `VITRINE_ASSETS_DIR` when not given (default: current directory).
pub struct HttpFetcher {
    http: reqwest::Client,
    asset_root: PathBuf,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpFetcher {
    pub fn new(asset_root: Option<PathBuf>) -> Self {
        let asset_root = asset_root
            .or_else(|| std::env::var("VITRINE_ASSETS_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            http: reqwest::Client::new(),
            asset_root,
        }
    }

    fn is_remote(url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }
}

#[async_trait(?Send)]
impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        if !Self::is_remote(url) {
            let path = self.asset_root.join(url.trim_start_matches('/'));
            debug!(path = %path.display(), "reading local asset");
            return tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read asset: {}", path.display()));
        }

        debug!(%url, "fetching remote document");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url} transport"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("GET {url} HTTP {status}: {text}");
        }

        response
            .text()
            .await
            .with_context(|| format!("GET {url} body"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_relative_paths_from_asset_root() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("assets"))?;
        std::fs::write(dir.path().join("assets/products-seed.json"), "[]")?;

        let fetcher = HttpFetcher::new(Some(dir.path().to_path_buf()));
        assert_eq!(fetcher.get_text("assets/products-seed.json").await?, "[]");
        assert!(fetcher.get_text("assets/missing.json").await.is_err());
        Ok(())
    }

    #[test]
    fn classifies_urls() {
        assert!(HttpFetcher::is_remote("https://dummyjson.com/products"));
        assert!(!HttpFetcher::is_remote("assets/products-seed.json"));
    }
}
