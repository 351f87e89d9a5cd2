//! Checkout: turns the session cart plus a customer form into a pending order.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Cart, CustomerInfo, Order, PaymentMethod};
use crate::error::AppError;
use crate::ports::{CartStore, OrderRepository};
use crate::validation::{
    sanitize_string, validate_email, validate_enum, validate_max_len, validate_phone,
    validate_required, ADDRESS_MAX_LEN, CITY_MAX_LEN, NAME_MAX_LEN, NOTE_MAX_LEN,
};

/// Customer form submitted at checkout.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub payment_method: String,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl CheckoutInput {
    fn validate(&self) -> Result<(CustomerInfo, PaymentMethod), AppError> {
        let name = sanitize_string(&self.name);
        validate_required("name", &name)?;
        validate_max_len("name", &name, NAME_MAX_LEN)?;

        let email = self.email.trim().to_string();
        validate_email(&email)?;

        let phone = self.phone.trim().to_string();
        validate_phone(&phone)?;

        let address = sanitize_string(&self.address);
        validate_required("address", &address)?;
        validate_max_len("address", &address, ADDRESS_MAX_LEN)?;

        let city = optional_text(self.city.as_deref());
        if let Some(city) = &city {
            validate_max_len("city", city, CITY_MAX_LEN)?;
        }

        let note = optional_text(self.note.as_deref());
        if let Some(note) = &note {
            validate_max_len("note", note, NOTE_MAX_LEN)?;
        }

        let method = self.payment_method.trim().to_lowercase();
        let allowed: Vec<&str> = PaymentMethod::ALL.iter().map(PaymentMethod::as_str).collect();
        validate_enum("paymentMethod", &method, &allowed)?;
        let payment_method = method.parse().map_err(AppError::Validation)?;

        Ok((
            CustomerInfo {
                name,
                email,
                phone,
                address,
                city,
                note,
            },
            payment_method,
        ))
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(sanitize_string).filter(|v| !v.is_empty())
}

/// What the checkout page shows before submitting.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub cart: Cart,
    pub total_amount: i64,
    pub item_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct Checkout {
    orders: Arc<dyn OrderRepository>,
    carts: Arc<dyn CartStore>,
}

impl Checkout {
    pub fn new(orders: Arc<dyn OrderRepository>, carts: Arc<dyn CartStore>) -> Self {
        Self { orders, carts }
    }

    pub async fn summary(&self, cart_key: &str) -> Result<CheckoutSummary, AppError> {
        let cart = self.carts.load(cart_key).await?;
        let message = cart.is_empty().then(|| "cart is empty".to_string());
        Ok(CheckoutSummary {
            total_amount: cart.total(),
            item_count: cart.item_count(),
            cart,
            message,
        })
    }

    /// Creates the order from the cart as it is now and clears the cart.
    /// An empty cart creates nothing.
    pub async fn execute(&self, cart_key: &str, input: CheckoutInput) -> Result<Order, AppError> {
        let (customer, payment_method) = input.validate()?;

        let cart = self.carts.load(cart_key).await?;
        if cart.is_empty() {
            return Err(AppError::Validation("cart is empty".to_string()));
        }

        let order = Order::new(input.user_id, cart.to_order_lines(), customer, payment_method);
        let order = self.orders.insert(&order).await?;

        tracing::info!(
            order_id = %order.id,
            total_amount = order.total_amount,
            payment_method = %order.payment_method,
            lines = order.lines.len(),
            "Order created"
        );

        // The order already exists; a stale cart is the lesser failure.
        if let Err(e) = self.carts.clear(cart_key).await {
            tracing::error!(order_id = %order.id, error = %e, "Failed to clear cart after checkout");
        }

        Ok(order)
    }
}
