pub mod memory;
pub mod postgres_order_repository;
pub mod postgres_product_catalog;
pub mod redis_cart_store;

pub use memory::{InMemoryCartStore, InMemoryOrderRepository, InMemoryProductCatalog};
pub use postgres_order_repository::PostgresOrderRepository;
pub use postgres_product_catalog::PostgresProductCatalog;
pub use redis_cart_store::RedisCartStore;
