//! Cart entity keyed by a session key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::order::OrderLine;
use super::product::Product;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: i64,
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub key: String,
    pub lines: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            lines: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, product_id: Uuid) -> Option<usize> {
        self.lines.iter().position(|line| line.product_id == product_id)
    }

    /// Adds one unit of `product`, snapshotting its name and price on first add.
    pub fn add(&mut self, product: &Product) {
        match self.position(product.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = line.quantity.saturating_add(1);
            }
            None => self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                image: product.image.clone(),
                quantity: 1,
            }),
        }
        self.touch();
    }

    /// Returns false when the product is not in the cart.
    pub fn increment(&mut self, product_id: Uuid) -> bool {
        let Some(index) = self.position(product_id) else {
            return false;
        };
        let line = &mut self.lines[index];
        line.quantity = line.quantity.saturating_add(1);
        self.touch();
        true
    }

    /// Decrementing a line with quantity 1 removes it.
    pub fn decrement(&mut self, product_id: Uuid) -> bool {
        let Some(index) = self.position(product_id) else {
            return false;
        };
        if self.lines[index].quantity > 1 {
            self.lines[index].quantity -= 1;
        } else {
            self.lines.remove(index);
        }
        self.touch();
        true
    }

    pub fn remove(&mut self, product_id: Uuid) -> bool {
        let Some(index) = self.position(product_id) else {
            return false;
        };
        self.lines.remove(index);
        self.touch();
        true
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.touch();
    }

    /// Recomputed on every call, never cached.
    pub fn total(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |acc, line| acc.saturating_add(line.line_total()))
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn to_order_lines(&self) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|line| OrderLine {
                product_id: line.product_id,
                name: line.name.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
            })
            .collect()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64) -> Product {
        Product::new(
            "Ao thun".to_string(),
            price,
            Some("tee.png".to_string()),
            "apparel".to_string(),
            "Cotton tee".to_string(),
        )
    }

    #[test]
    fn add_twice_increments_quantity() {
        let mut cart = Cart::empty("s1");
        let tee = product(100_000);
        cart.add(&tee);
        cart.add(&tee);

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.total(), 200_000);
    }

    #[test]
    fn increment_then_decrement_restores_quantity() {
        let mut cart = Cart::empty("s1");
        let tee = product(50_000);
        cart.add(&tee);
        cart.add(&tee);
        let before = cart.lines.clone();

        assert!(cart.increment(tee.id));
        assert!(cart.decrement(tee.id));
        assert_eq!(cart.lines, before);
    }

    #[test]
    fn decrement_from_one_removes_line() {
        let mut cart = Cart::empty("s1");
        let tee = product(50_000);
        cart.add(&tee);

        assert!(cart.decrement(tee.id));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn remove_ignores_quantity() {
        let mut cart = Cart::empty("s1");
        let tee = product(10_000);
        let mug = product(20_000);
        cart.add(&tee);
        cart.add(&tee);
        cart.add(&mug);

        assert!(cart.remove(tee.id));
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total(), 20_000);
    }

    #[test]
    fn unknown_product_is_noop() {
        let mut cart = Cart::empty("s1");
        let missing = Uuid::new_v4();
        assert!(!cart.increment(missing));
        assert!(!cart.decrement(missing));
        assert!(!cart.remove(missing));
        assert!(cart.is_empty());
    }

    #[test]
    fn total_tracks_mixed_lines() {
        let mut cart = Cart::empty("s1");
        let tee = product(100_000);
        let mug = product(35_000);
        cart.add(&tee);
        cart.add(&tee);
        cart.add(&mug);

        assert_eq!(cart.total(), 235_000);
        assert_eq!(cart.item_count(), 3);
        let lines = cart.to_order_lines();
        assert_eq!(crate::domain::order::lines_total(&lines), cart.total());
    }
}
