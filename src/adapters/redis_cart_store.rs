//! Redis implementation of CartStore. Each cart is one JSON value with a TTL.

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::domain::Cart;
use crate::ports::{CartStore, RepositoryResult};

const CART_PREFIX: &str = "cart:";

#[derive(Clone)]
pub struct RedisCartStore {
    redis_client: redis::Client,
    ttl_secs: u64,
}

impl RedisCartStore {
    pub fn new(redis_url: &str, ttl_secs: u64) -> anyhow::Result<Self> {
        let redis_client = redis::Client::open(redis_url)?;
        Ok(Self {
            redis_client,
            ttl_secs,
        })
    }

    fn key(cart_key: &str) -> String {
        format!("{}{}", CART_PREFIX, cart_key)
    }
}

#[async_trait]
impl CartStore for RedisCartStore {
    async fn load(&self, key: &str) -> RepositoryResult<Cart> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let existing: Option<String> = conn.get(Self::key(key)).await?;

        match existing {
            Some(value) => Ok(serde_json::from_str(&value)?),
            None => Ok(Cart::empty(key)),
        }
    }

    async fn save(&self, cart: &Cart) -> RepositoryResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(cart)?;
        let _: () = conn
            .set_ex(Self::key(&cart.key), serialized, self.ttl_secs)
            .await?;
        Ok(())
    }

    async fn clear(&self, key: &str) -> RepositoryResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(Self::key(key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_keys_are_namespaced() {
        assert_eq!(RedisCartStore::key("abc-123"), "cart:abc-123");
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(RedisCartStore::new("not a url", 60).is_err());
    }

    #[tokio::test]
    #[ignore] // requires a running Redis instance
    async fn save_then_load_round_trip() {
        let store = RedisCartStore::new("redis://127.0.0.1:6379", 60).expect("client");
        let cart = Cart::empty("redis-test");
        store.save(&cart).await.expect("save");
        let loaded = store.load("redis-test").await.expect("load");
        assert_eq!(loaded.key, "redis-test");
        store.clear("redis-test").await.expect("clear");
    }
}
