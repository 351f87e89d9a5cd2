//! Cart mutations. Every change writes the whole cart back and refreshes its TTL.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Cart;
use crate::error::AppError;
use crate::ports::{CartStore, ProductCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Increment,
    Decrement,
    Remove,
}

#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn ProductCatalog>,
}

impl CartService {
    pub fn new(carts: Arc<dyn CartStore>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { carts, catalog }
    }

    pub async fn view(&self, key: &str) -> Result<Cart, AppError> {
        Ok(self.carts.load(key).await?)
    }

    /// Adds one unit of a catalog product. Unknown products are a 404.
    pub async fn add(&self, key: &str, product_id: Uuid) -> Result<Cart, AppError> {
        let product = self.catalog.get(product_id).await?;
        let mut cart = self.carts.load(key).await?;
        cart.add(&product);
        self.carts.save(&cart).await?;

        tracing::debug!(cart = key, product_id = %product_id, "Added product to cart");
        Ok(cart)
    }

    /// Applies a quantity change. A product that is not in the cart leaves it untouched.
    pub async fn apply(
        &self,
        key: &str,
        product_id: Uuid,
        action: CartAction,
    ) -> Result<Cart, AppError> {
        let mut cart = self.carts.load(key).await?;
        let changed = match action {
            CartAction::Increment => cart.increment(product_id),
            CartAction::Decrement => cart.decrement(product_id),
            CartAction::Remove => cart.remove(product_id),
        };

        if changed {
            self.carts.save(&cart).await?;
        }
        Ok(cart)
    }
}
