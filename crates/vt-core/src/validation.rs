//! Validation of user-entered items.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use vt_types::{Price, Product, User};

pub const MIN_TEXT_LEN: usize = 3;
pub const MAX_TEXT_LEN: usize = 50;
pub const MAX_PRICE: f64 = 120.0;
pub const MAX_AGE: u32 = 120;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("Invalid regex")
});

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },
    #[error("{field} must be a number greater than 0 and less than {max}")]
    Range { field: &'static str, max: f64 },
    #[error("{field} must be a whole number greater than 0 and less than {max}")]
    WholeNumber { field: &'static str, max: u32 },
    #[error("{field} is not a valid email address")]
    Email { field: &'static str },
    #[error("{field} is not a valid URL")]
    Url { field: &'static str },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Length { field, .. }
            | Self::Range { field, .. }
            | Self::WholeNumber { field, .. }
            | Self::Email { field }
            | Self::Url { field } => field,
        }
    }
}

/// Every failing field of one submission, in form order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }

    fn push(&mut self, error: Option<FieldError>) {
        self.0.extend(error);
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.0.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub(crate) fn check_length(field: &'static str, value: &str) -> Option<FieldError> {
    let len = value.trim().chars().count();
    (!(MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&len)).then_some(FieldError::Length {
        field,
        min: MIN_TEXT_LEN,
        max: MAX_TEXT_LEN,
    })
}

pub(crate) fn check_email(field: &'static str, value: &str) -> Option<FieldError> {
    (!EMAIL_RE.is_match(value.trim())).then_some(FieldError::Email { field })
}

fn check_optional_url(field: &'static str, value: &str) -> Option<FieldError> {
    let value = value.trim();
    (!value.is_empty() && url::Url::parse(value).is_err()).then_some(FieldError::Url { field })
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n > 0.0 && *n < MAX_PRICE)
}

/// Whole number in `(0, MAX_AGE)`; `"25.0"` counts as 25.
pub(crate) fn parse_whole_number(raw: &str) -> Option<u32> {
    let n = raw.trim().parse::<f64>().ok()?;
    if n.fract() != 0.0 || n <= 0.0 || n >= f64::from(MAX_AGE) {
        return None;
    }
    Some(n as u32)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: String,
    pub brand: String,
    pub category: String,
    pub thumbnail: String,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<Product, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.push(check_length("title", &self.title));
        errors.push(check_length("description", &self.description));
        let price = parse_price(&self.price);
        errors.push(price.is_none().then_some(FieldError::Range {
            field: "price",
            max: MAX_PRICE,
        }));
        errors.push(check_length("brand", &self.brand));
        errors.push(check_length("category", &self.category));
        errors.push(check_optional_url("thumbnail", &self.thumbnail));

        errors.into_result(|| Product {
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            price: Price::Number(price.unwrap_or_default()),
            brand: self.brand.trim().to_owned(),
            category: self.category.trim().to_owned(),
            thumbnail: self.thumbnail.trim().to_owned(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: String,
    pub image: String,
}

impl UserDraft {
    pub fn validate(&self) -> Result<User, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.push(check_length("firstName", &self.first_name));
        errors.push(check_length("lastName", &self.last_name));
        errors.push(check_email("email", &self.email));
        let age = parse_whole_number(&self.age);
        errors.push(age.is_none().then_some(FieldError::WholeNumber {
            field: "age",
            max: MAX_AGE,
        }));
        errors.push(check_optional_url("image", &self.image));

        errors.into_result(|| User {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            age: age.unwrap_or_default(),
            image: self.image.trim().to_owned(),
        })
    }
}
