//! Domain entities, free of HTTP and storage concerns.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartLine};
pub use order::{
    CustomerInfo, Order, OrderLine, OrderStatus, PaymentDetails, PaymentMethod, TransitionActor,
    TransitionError,
};
pub use product::Product;
