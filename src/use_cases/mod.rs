//! Application use cases. Each one depends on ports only, never on adapters.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod dashboard;
pub mod initiate_payment;
pub mod manage_orders;
pub mod reconcile_payment;

#[cfg(test)]
pub(crate) mod testing;

pub use cart::{CartAction, CartService};
pub use catalog::{Catalog, NewProduct};
pub use checkout::{Checkout, CheckoutInput, CheckoutSummary};
pub use dashboard::{Dashboard, DashboardStats};
pub use initiate_payment::{
    BankTransferInstructions, BankingPaymentInput, MomoPaymentInput, MomoPaymentOutput,
    PaymentInitiator,
};
pub use manage_orders::OrderManager;
pub use reconcile_payment::{IpnOutcome, PaymentReconciler, PaymentVerification};
