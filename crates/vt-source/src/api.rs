//! Public demo API listings (`{base}/products`, `{base}/users`).

use crate::{CatalogSource, Fetcher, SourceError, SourceOutcome};
use async_trait::async_trait;
use tracing::warn;
use vt_types::{ApiProductListing, ApiUserListing, Product, User};

pub struct ProductApiSource<F> {
    fetcher: F,
    url: String,
}

impl<F: Fetcher> ProductApiSource<F> {
    pub fn new(fetcher: F, base: &str) -> Self {
        Self {
            fetcher,
            url: format!("{}/products", base.trim_end_matches('/')),
        }
    }
}

#[async_trait(?Send)]
impl<F: Fetcher> CatalogSource<Product> for ProductApiSource<F> {
    fn name(&self) -> &str {
        "api"
    }

    async fn fetch(&self) -> SourceOutcome<Product> {
        match fetch_json::<ApiProductListing, _>(&self.fetcher, &self.url).await {
            Ok(listing) => {
                SourceOutcome::from_items(listing.products.into_iter().map(Product::from).collect())
            }
            Err(err) => SourceOutcome::Failed(err),
        }
    }
}

pub struct UserApiSource<F> {
    fetcher: F,
    url: String,
}

impl<F: Fetcher> UserApiSource<F> {
    pub fn new(fetcher: F, base: &str) -> Self {
        Self {
            fetcher,
            url: format!("{}/users", base.trim_end_matches('/')),
        }
    }
}

#[async_trait(?Send)]
impl<F: Fetcher> CatalogSource<User> for UserApiSource<F> {
    fn name(&self) -> &str {
        "api"
    }

    async fn fetch(&self) -> SourceOutcome<User> {
        match fetch_json::<ApiUserListing, _>(&self.fetcher, &self.url).await {
            Ok(listing) => {
                SourceOutcome::from_items(listing.users.into_iter().map(User::from).collect())
            }
            Err(err) => SourceOutcome::Failed(err),
        }
    }
}

async fn fetch_json<T, F>(fetcher: &F, url: &str) -> Result<T, SourceError>
where
    T: serde::de::DeserializeOwned,
    F: Fetcher,
{
    let raw = fetcher.get_text(url).await.map_err(|err| {
        warn!(%url, error = %err, "api transport failure");
        SourceError::Transport(err.to_string())
    })?;
    serde_json::from_str(&raw).map_err(|err| {
        warn!(%url, error = %err, "api returned an unexpected document");
        SourceError::Parse(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticFetcher;
    use vt_types::Price;

    const BASE: &str = "https://api.example";

    #[tokio::test]
    async fn maps_product_listing() {
        let body = r#"{"products":[
            {"id":1,"title":"Essence Mascara","description":"d","price":9.99,
             "brand":"Essence","category":"beauty","thumbnail":"https://cdn/x.png","rating":4.9},
            {"id":2,"title":"Apple","description":"fruit","price":1.99,"category":"groceries"}
        ]}"#;
        let fetcher = StaticFetcher::new().with_body("https://api.example/products", body);
        let SourceOutcome::Items(products) = ProductApiSource::new(fetcher, BASE).fetch().await else {
            panic!("expected items");
        };
        assert_eq!(products[0].brand, "Essence");
        assert_eq!(products[0].price, Price::Number(9.99));
        assert_eq!(products[1].brand, "");
        assert_eq!(products[1].thumbnail, "");
    }

    #[tokio::test]
    async fn maps_user_listing() {
        let body = r#"{"users":[{"id":1,"firstName":"Emily","lastName":"Johnson",
            "email":"emily@x.dummyjson.com","age":28,"image":"https://img/1.png"}]}"#;
        let fetcher = StaticFetcher::new().with_body("https://api.example/users", body);
        let source = UserApiSource::new(fetcher, "https://api.example/");
        let SourceOutcome::Items(users) = source.fetch().await else {
            panic!("expected items");
        };
        assert_eq!(users[0].first_name, "Emily");
        assert_eq!(users[0].age, 28);
    }

    #[tokio::test]
    async fn unexpected_shape_is_a_parse_failure() {
        let fetcher = StaticFetcher::new().with_body("https://api.example/products", "<html>");
        let outcome = ProductApiSource::new(fetcher, BASE).fetch().await;
        assert!(matches!(outcome, SourceOutcome::Failed(SourceError::Parse(_))));
    }
}
