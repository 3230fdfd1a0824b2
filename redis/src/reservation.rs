//! Redis-backed atomic reservation store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};

use flashsale_core::error::{Result, SaleError};
use flashsale_core::providers::ReservationStore;
use flashsale_core::types::{ReserveOutcome, UserId};

/// Key holding the remaining stock counter.
const STOCK_KEY: &str = "flash_sale:stock_count";
/// Key holding the set of user ids with a successful reservation.
const PURCHASED_USERS_KEY: &str = "flash_sale:purchased_users";

/// Atomic reservation script.
///
/// SADD records the user; a zero reply means the id was already present, so
/// the stock counter is left untouched. Otherwise DECR claims a unit; a
/// negative result means stock is exhausted, and both writes are undone
/// before the script returns. Redis executes the script as one unit, which
/// is what makes the dedup check and the stock check indivisible across
/// service instances — the counter can only be observed negative from
/// inside the script.
const RESERVE_SCRIPT: &str = r"
local stock_key = KEYS[1]
local users_key = KEYS[2]
local user_id = ARGV[1]

local added = redis.call('SADD', users_key, user_id)
if added == 0 then
    return -1
end

local stock = redis.call('DECR', stock_key)
if stock < 0 then
    redis.call('INCR', stock_key)
    redis.call('SREM', users_key, user_id)
    return 0
end

return 1
";

/// Script reply for a successful reservation.
const VERDICT_SUCCESS: i64 = 1;
/// Script reply for a user who already holds a reservation.
const VERDICT_ALREADY_RESERVED: i64 = -1;

/// Redis-backed [`ReservationStore`] shared by all service instances.
#[derive(Clone)]
pub struct RedisReservationStore {
    /// Connection manager for connection pooling.
    conn: ConnectionManager,
    reserve: Script,
}

impl RedisReservationStore {
    /// Connect to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., `redis://127.0.0.1:6379`)
    ///
    /// # Errors
    ///
    /// Returns [`SaleError::StoreUnavailable`] if the connection fails.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|err| unavailable("failed to create Redis client", &err))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|err| unavailable("failed to connect to Redis", &err))?;

        Ok(Self {
            conn,
            reserve: Script::new(RESERVE_SCRIPT),
        })
    }
}

fn unavailable(context: &str, err: &redis::RedisError) -> SaleError {
    SaleError::StoreUnavailable {
        reason: format!("{context}: {err}"),
    }
}

#[async_trait]
impl ReservationStore for RedisReservationStore {
    async fn try_reserve(&self, user: &UserId) -> Result<ReserveOutcome> {
        let mut conn = self.conn.clone();
        let verdict: i64 = self
            .reserve
            .key(STOCK_KEY)
            .key(PURCHASED_USERS_KEY)
            .arg(user.as_str())
            .invoke_async(&mut conn)
            .await
            .map_err(|err| unavailable("reserve script failed", &err))?;

        Ok(match verdict {
            VERDICT_SUCCESS => ReserveOutcome::Success,
            VERDICT_ALREADY_RESERVED => ReserveOutcome::AlreadyReserved,
            _ => ReserveOutcome::SoldOut,
        })
    }

    async fn release(&self, user: &UserId) -> Result<()> {
        let mut conn = self.conn.clone();
        // One transaction: the restored unit and the cleared membership
        // become visible together.
        let _: () = redis::pipe()
            .atomic()
            .incr(STOCK_KEY, 1)
            .ignore()
            .srem(PURCHASED_USERS_KEY, user.as_str())
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|err| unavailable("release failed", &err))?;

        tracing::warn!(user_id = %user, "Released reserved stock");
        Ok(())
    }

    async fn remaining(&self) -> Result<i64> {
        let mut conn = self.conn.clone();
        let stock: Option<i64> = conn
            .get(STOCK_KEY)
            .await
            .map_err(|err| unavailable("failed to read stock counter", &err))?;
        Ok(stock.unwrap_or(0))
    }

    async fn has_reserved(&self, user: &UserId) -> Result<bool> {
        let mut conn = self.conn.clone();
        let member: bool = conn
            .sismember(PURCHASED_USERS_KEY, user.as_str())
            .await
            .map_err(|err| unavailable("failed to check purchased set", &err))?;
        Ok(member)
    }

    async fn initialize(&self, total_stock: i64) -> Result<bool> {
        let mut conn = self.conn.clone();
        // SET NX: only the first instance to start seeds the counter.
        let reply: Option<String> = redis::cmd("SET")
            .arg(STOCK_KEY)
            .arg(total_stock)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(|err| unavailable("failed to initialize stock counter", &err))?;

        let seeded = reply.is_some();
        if seeded {
            tracing::info!(total_stock, "Initialized stock counter");
        } else {
            tracing::info!("Stock counter already initialized");
        }
        Ok(seeded)
    }

    async fn reset(&self, total_stock: i64) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .set(STOCK_KEY, total_stock)
            .ignore()
            .del(PURCHASED_USERS_KEY)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|err| unavailable("reset failed", &err))?;

        tracing::info!(total_stock, "Reset stock and cleared purchased users");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|err| unavailable("ping failed", &err))?;
        Ok(())
    }
}
