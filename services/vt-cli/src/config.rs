use std::path::PathBuf;
use vt_core::SourceConfig;

/// Native host settings, read from the environment with defaults.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) data_dir: PathBuf,
    pub(crate) assets_dir: PathBuf,
    pub(crate) sources: SourceConfig,
}

impl Settings {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = SourceConfig::default();

        Self {
            data_dir: var("VITRINE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".vitrine")),
            assets_dir: var("VITRINE_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            sources: SourceConfig {
                seed_path: defaults.seed_path,
                scrape_url: var("VITRINE_SCRAPE_URL").unwrap_or(defaults.scrape_url),
                scrape_origin: var("VITRINE_SCRAPE_ORIGIN").unwrap_or(defaults.scrape_origin),
                api_base: var("VITRINE_API_BASE").unwrap_or(defaults.api_base),
            },
        }
    }

    pub(crate) fn session_dir(&self) -> PathBuf {
        self.data_dir.join("session")
    }
}
