use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogProduct;

/// One product entry in the cart. Name and price are copied from the catalog
/// when the line is created and never refreshed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub unit_price_paise: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_label: Option<String>,
}

impl LineItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_price_paise: i64, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price_paise,
            quantity: quantity.max(1),
            category_label: None,
        }
    }

    pub fn with_category_label(mut self, label: impl Into<String>) -> Self {
        self.category_label = Some(label.into());
        self
    }

    /// Builds a line from a catalog product. A product without a list rate
    /// enters the cart at zero.
    pub fn from_product(product: &CatalogProduct, quantity: u32, category_label: Option<String>) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            unit_price_paise: product.price_paise().unwrap_or(0),
            quantity: quantity.max(1),
            category_label,
        }
    }

    pub fn line_total_paise(&self) -> i64 {
        self.unit_price_paise.saturating_mul(i64::from(self.quantity))
    }
}

/// Clamps an integer quantity into `1..=u32::MAX`.
pub fn normalise_quantity(raw: i64) -> u32 {
    u32::try_from(raw.max(1)).unwrap_or(u32::MAX)
}

/// Coerces a raw form value into a quantity: anything non-numeric, non-finite
/// or below one becomes `1`; fractions are floored.
pub fn parse_quantity_input(raw: &str) -> u32 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 1.0 => {
            if value >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                value.floor() as u32
            }
        }
        _ => 1,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    Add(LineItem),
    UpdateQuantity { id: String, quantity: i64 },
    Remove { id: String },
    Clear,
}

/// The shopper's current selection. Every operation consumes the cart and
/// returns its successor; none of them can fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(self, action: CartAction) -> Self {
        match action {
            CartAction::Add(item) => self.add_to_cart(item),
            CartAction::UpdateQuantity { id, quantity } => self.update_quantity(&id, quantity),
            CartAction::Remove { id } => self.remove_from_cart(&id),
            CartAction::Clear => self.clear(),
        }
    }

    /// Merges into an existing line with the same id by summing quantities;
    /// the first-seen name, price and label are kept.
    pub fn add_to_cart(mut self, item: LineItem) -> Self {
        let quantity = item.quantity.max(1);
        match self.items.iter_mut().find(|line| line.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => self.items.push(LineItem { quantity, ..item }),
        }
        self
    }

    /// Sets the quantity of a line, never below one. Unknown ids are ignored.
    pub fn update_quantity(mut self, id: &str, quantity: i64) -> Self {
        if let Some(line) = self.items.iter_mut().find(|line| line.id == id) {
            line.quantity = normalise_quantity(quantity);
        }
        self
    }

    pub fn remove_from_cart(mut self, id: &str) -> Self {
        self.items.retain(|line| line.id != id);
        self
    }

    pub fn clear(self) -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|line| line.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn total_paise(&self) -> i64 {
        total_of(&self.items)
    }
}

pub(crate) fn total_of(items: &[LineItem]) -> i64 {
    items
        .iter()
        .fold(0i64, |sum, line| sum.saturating_add(line.line_total_paise()))
}
