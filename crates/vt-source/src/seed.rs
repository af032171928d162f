use crate::{CatalogSource, Fetcher, SourceError, SourceOutcome};
use async_trait::async_trait;
use tracing::warn;
use vt_types::{Product, SeedRecord};

/// Bundled seed document: a JSON array of loosely-shaped product records.
pub struct SeedSource<F> {
    fetcher: F,
    path: String,
}

impl<F: Fetcher> SeedSource<F> {
    pub fn new(fetcher: F, path: impl Into<String>) -> Self {
        Self {
            fetcher,
            path: path.into(),
        }
    }
}

pub fn parse_seed(raw: &str) -> Result<Vec<Product>, SourceError> {
    let records: Vec<SeedRecord> =
        serde_json::from_str(raw).map_err(|err| SourceError::Parse(err.to_string()))?;
    Ok(records.into_iter().map(SeedRecord::into_product).collect())
}

#[async_trait(?Send)]
impl<F: Fetcher> CatalogSource<Product> for SeedSource<F> {
    fn name(&self) -> &str {
        "seed"
    }

    async fn fetch(&self) -> SourceOutcome<Product> {
        let raw = match self.fetcher.get_text(&self.path).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %self.path, error = %err, "seed resource not found");
                return SourceOutcome::Failed(SourceError::Transport(err.to_string()));
            }
        };
        match parse_seed(&raw) {
            Ok(products) => SourceOutcome::from_items(products),
            Err(err) => {
                warn!(path = %self.path, error = %err, "seed resource invalid");
                SourceOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticFetcher;

    const PATH: &str = "assets/products-seed.json";

    #[test]
    fn non_array_document_is_rejected() {
        assert!(parse_seed(r#"{"products":[]}"#).is_err());
        assert!(parse_seed("not json").is_err());
    }

    #[tokio::test]
    async fn maps_seed_records() {
        let body = r#"[{"name":"Moletom","preco":"199,90"},{"title":"Boné","price":59}]"#;
        let source = SeedSource::new(StaticFetcher::new().with_body(PATH, body), PATH);
        let SourceOutcome::Items(products) = source.fetch().await else {
            panic!("expected items");
        };
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title, "Moletom");
        assert_eq!(products[1].title, "Boné");
    }

    #[tokio::test]
    async fn empty_array_is_empty() {
        let source = SeedSource::new(StaticFetcher::new().with_body(PATH, "[]"), PATH);
        assert!(matches!(source.fetch().await, SourceOutcome::Empty));
    }
}
