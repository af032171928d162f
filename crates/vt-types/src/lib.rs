use serde::{Deserialize, Serialize};

pub const PRODUCTS_KEY: &str = "products";
pub const USERS_KEY: &str = "users";
pub const LAST_SUBMISSION_KEY: &str = "lastSubmission";
pub const PENDING_SUBMISSION_KEY: &str = "pendingSubmission";

/// Price as it appears in stored or remote data: a JSON number or free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Default for Price {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Price {
    /// Numeric value with the first comma read as the decimal separator.
    ///
    /// Blank text counts as zero; anything else that does not parse is `None`.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n).filter(|n| !n.is_nan()),
            Self::Text(raw) => {
                let normalized = raw.replacen(',', ".", 1);
                let trimmed = normalized.trim();
                if trimmed.is_empty() {
                    return Some(0.0);
                }
                trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(raw) if raw.trim().is_empty())
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Product {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub brand: String,
    pub category: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: u32,
    pub image: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ── External schemas ──

/// One record of the bundled seed document. Field aliases are resolved by
/// [`SeedRecord::into_product`]; the first present, non-empty alias wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedRecord {
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub preco: Option<Price>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
}

impl SeedRecord {
    pub fn into_product(self) -> Product {
        Product {
            title: first_text(self.title, self.name),
            description: self.description.unwrap_or_default(),
            price: first_price(self.price, self.preco),
            brand: self.brand.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            thumbnail: first_text(self.image, self.thumbnail),
        }
    }
}

fn first_text(primary: Option<String>, alias: Option<String>) -> String {
    primary
        .filter(|v| !v.is_empty())
        .or(alias.filter(|v| !v.is_empty()))
        .unwrap_or_default()
}

fn first_price(primary: Option<Price>, alias: Option<Price>) -> Price {
    let usable = |p: &Price| match p {
        Price::Number(n) => *n != 0.0 && !n.is_nan(),
        Price::Text(raw) => !raw.is_empty(),
    };
    primary
        .filter(usable)
        .or(alias.filter(usable))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiProduct {
    pub title: String,
    pub description: String,
    pub price: Option<Price>,
    pub brand: Option<String>,
    pub category: String,
    pub thumbnail: Option<String>,
}

impl From<ApiProduct> for Product {
    fn from(p: ApiProduct) -> Self {
        Self {
            title: p.title,
            description: p.description,
            price: p.price.unwrap_or_default(),
            brand: p.brand.unwrap_or_default(),
            category: p.category,
            thumbnail: p.thumbnail.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiProductListing {
    pub products: Vec<ApiProduct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: u32,
    pub image: Option<String>,
}

impl From<ApiUser> for User {
    fn from(u: ApiUser) -> Self {
        Self {
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            age: u.age,
            image: u.image.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUserListing {
    pub users: Vec<ApiUser>,
}

// ── Wizard ──

/// Raw form values as typed by the user, kept between the form and review steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubmissionDraft {
    pub nome: String,
    pub sobrenome: String,
    pub email: String,
    pub idade: String,
}

/// Confirmed wizard record; also the shape of the downloaded `data.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    pub nome: String,
    pub sobrenome: String,
    pub email: String,
    pub idade: u32,
}

impl From<Submission> for SubmissionDraft {
    fn from(s: Submission) -> Self {
        Self {
            nome: s.nome,
            sobrenome: s.sobrenome,
            email: s.email,
            idade: s.idade.to_string(),
        }
    }
}
