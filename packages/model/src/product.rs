use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a product is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    /// One base price, no variants
    #[default]
    Simple,
    /// Variants along a single attribute
    SingleVariant,
    /// Variants priced in a two-axis matrix
    Matrix,
    Range,
    Configurable,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Simple => "simple",
            ProductType::SingleVariant => "single-variant",
            ProductType::Matrix => "matrix",
            ProductType::Range => "range",
            ProductType::Configurable => "configurable",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "simple" => Ok(ProductType::Simple),
            "single-variant" => Ok(ProductType::SingleVariant),
            "matrix" => Ok(ProductType::Matrix),
            "range" => Ok(ProductType::Range),
            "configurable" => Ok(ProductType::Configurable),
            other => Err(format!(
                "Invalid product type: {}. Use: simple, single-variant, matrix, range, or configurable",
                other
            )),
        }
    }
}

/// Unit a variant is sold in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    Piece,
    SquareMeter,
    Ton,
    Set,
}

/// Product-level form fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMeta {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: u64,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitType>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ProductMeta {
    fn default() -> Self {
        Self {
            slug: String::new(),
            name: String::new(),
            description: None,
            category_id: 0,
            product_type: ProductType::default(),
            base_price: None,
            unit: None,
            is_active: true,
        }
    }
}

/// A form field that fails validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaIssue {
    pub field: &'static str,
    pub message: &'static str,
}

impl ProductMeta {
    /// Check the fields required before the product can be saved
    pub fn validate(&self) -> Vec<MetaIssue> {
        let mut issues = Vec::new();

        if self.slug.trim().is_empty() {
            issues.push(MetaIssue { field: "slug", message: "slug is required" });
        }
        if self.name.trim().is_empty() {
            issues.push(MetaIssue { field: "name", message: "name is required" });
        }
        if self.category_id < 1 {
            issues.push(MetaIssue { field: "categoryId", message: "category is required" });
        }
        if let Some(price) = self.base_price {
            if price.is_sign_negative() {
                issues.push(MetaIssue { field: "basePrice", message: "price must be non-negative" });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_type_parse() {
        assert_eq!("matrix".parse::<ProductType>(), Ok(ProductType::Matrix));
        assert_eq!("SINGLE_VARIANT".parse::<ProductType>(), Ok(ProductType::SingleVariant));
        assert!("bundle".parse::<ProductType>().is_err());
    }

    #[test]
    fn test_product_type_wire_name() {
        let json = serde_json::to_string(&ProductType::SingleVariant).unwrap();
        assert_eq!(json, "\"SINGLE_VARIANT\"");
    }

    #[test]
    fn test_default_meta_fails_validation() {
        let issues = ProductMeta::default().validate();
        let fields: Vec<_> = issues.iter().map(|i| i.field).collect();
        assert_eq!(fields, vec!["slug", "name", "categoryId"]);
    }

    #[test]
    fn test_negative_base_price_rejected() {
        let meta = ProductMeta {
            slug: "plita".to_string(),
            name: "Plita".to_string(),
            category_id: 3,
            base_price: Some(Decimal::from(-1)),
            ..ProductMeta::default()
        };
        let issues = meta.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "basePrice");
    }
}
