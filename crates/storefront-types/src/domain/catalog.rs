use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.png";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCategory {
    pub id: String,
    pub name: String,
    pub hero_line: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: String,
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    /// List rate in rupees; `None` means the rate is shared on request.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub specs: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl CatalogProduct {
    pub fn price_paise(&self) -> Option<i64> {
        self.price
            .filter(|p| p.is_finite())
            .map(|p| (p * 100.0).round() as i64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    pub hero_line: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub price: Option<f64>,
    pub specs: Vec<String>,
    pub highlights: Vec<String>,
}

/// Category fields as typed into the admin form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryForm {
    pub name: String,
    pub hero_line: String,
    pub description: String,
    pub image: String,
}

impl CategoryForm {
    pub fn from_category(category: &CatalogCategory) -> Self {
        Self {
            name: category.name.clone(),
            hero_line: category.hero_line.clone(),
            description: category.description.clone(),
            image: category.image.clone(),
        }
    }

    pub fn into_payload(self) -> Result<CategoryPayload, ValidationError> {
        ValidationError::check(&[
            ("name", self.name.as_str()),
            ("hero line", self.hero_line.as_str()),
            ("description", self.description.as_str()),
        ])?;
        Ok(CategoryPayload {
            name: self.name.trim().to_string(),
            hero_line: self.hero_line.trim().to_string(),
            description: self.description.trim().to_string(),
            image: self.image.trim().to_string(),
        })
    }
}

/// Product fields as typed into the admin form. `specs` and `highlights` are
/// comma separated, `price` is free text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub image: String,
    pub price: String,
    pub specs: String,
    pub highlights: String,
}

impl ProductForm {
    pub fn from_product(product: &CatalogProduct) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            image: product.image.clone(),
            price: product.price.map(|p| p.to_string()).unwrap_or_default(),
            specs: product.specs.join(", "),
            highlights: product.highlights.join(", "),
        }
    }

    pub fn into_payload(self, category_id: &str) -> Result<ProductPayload, ValidationError> {
        ValidationError::check(&[
            ("category", category_id),
            ("name", self.name.as_str()),
            ("description", self.description.as_str()),
        ])?;
        let image = match self.image.trim() {
            "" => PLACEHOLDER_IMAGE.to_string(),
            other => other.to_string(),
        };
        Ok(ProductPayload {
            category_id: category_id.trim().to_string(),
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            image,
            price: parse_price(&self.price),
            specs: parse_list(&self.specs),
            highlights: parse_list(&self.highlights),
        })
    }
}

/// Blank, unparsable and non-finite rates all mean "on request".
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Splits on commas, trims, drops empty entries. An entry that itself
/// contains a comma cannot be expressed.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}
