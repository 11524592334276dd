//! Fixed-window rate limiting in Redis for the AI endpoints.
//!
//! Key: `ratelimit:{scope}:{user}:{window_start}`. Each hit increments the key and
//! refreshes its TTL in one MULTI/EXEC, so a counter can never be left without
//! expiry. One managed connection is shared by all requests and reconnects on
//! its own. Redis outages fail open.

use std::sync::Arc;

use chrono::Utc;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;

const WINDOW_SECS: u64 = 3600;

#[derive(Clone)]
pub struct RateLimiter {
    client: redis::Client,
    /// Opened on first use; a failed attempt is retried on the next request.
    conn: Arc<OnceCell<ConnectionManager>>,
    /// Requests allowed per window. Zero disables limiting.
    limit: u32,
    window_secs: u64,
}

impl RateLimiter {
    pub fn new(client: redis::Client, limit_per_hour: u32) -> Self {
        Self {
            client,
            conn: Arc::new(OnceCell::new()),
            limit: limit_per_hour,
            window_secs: WINDOW_SECS,
        }
    }

    /// Records one request for `user_id` under `scope` and rejects it when over the limit.
    pub async fn check(&self, scope: &str, user_id: Uuid) -> Result<(), AppError> {
        if self.limit == 0 {
            return Ok(());
        }

        let now = Utc::now().timestamp().max(0) as u64;
        let window = window_start(now, self.window_secs);
        let key = bucket_key(scope, user_id, window);

        match self.hit(&key).await {
            Ok(count) => decide(count, self.limit, window + self.window_secs - now),
            Err(e) => {
                warn!("Rate limiter unavailable, allowing request for {scope}: {e}");
                Ok(())
            }
        }
    }

    async fn hit(&self, key: &str) -> redis::RedisResult<u64> {
        let mut conn = self
            .conn
            .get_or_try_init(|| ConnectionManager::new(self.client.clone()))
            .await?
            .clone();
        let (count,): (u64,) = hit_pipeline(key, self.window_secs)
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }
}

fn window_start(now_secs: u64, window_secs: u64) -> u64 {
    now_secs - now_secs % window_secs
}

fn bucket_key(scope: &str, user_id: Uuid, window_start: u64) -> String {
    format!("ratelimit:{scope}:{user_id}:{window_start}")
}

fn hit_pipeline(key: &str, window_secs: u64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .incr(key, 1u64)
        .expire(key, window_secs as i64)
        .ignore();
    pipe
}

fn decide(count: u64, limit: u32, retry_after_secs: u64) -> Result<(), AppError> {
    if count > u64::from(limit) {
        Err(AppError::RateLimited {
            retry_after_secs: retry_after_secs.max(1),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_start_aligns_to_window() {
        assert_eq!(window_start(7_200, 3_600), 7_200);
        assert_eq!(window_start(7_201, 3_600), 7_200);
        assert_eq!(window_start(10_799, 3_600), 7_200);
    }

    #[test]
    fn test_bucket_key_is_scoped_per_user_and_window() {
        let user = Uuid::nil();
        assert_eq!(
            bucket_key("stories", user, 7_200),
            "ratelimit:stories:00000000-0000-0000-0000-000000000000:7200"
        );
        assert_ne!(bucket_key("stories", user, 7_200), bucket_key("csr", user, 7_200));
    }

    #[test]
    fn test_hit_is_a_single_transaction() {
        let packed = hit_pipeline("ratelimit:csr:u:0", 3_600).get_packed_pipeline();
        let text = String::from_utf8_lossy(&packed);
        let multi = text.find("MULTI").unwrap();
        let incr = text.find("INCR").unwrap();
        let expire = text.find("EXPIRE").unwrap();
        let exec = text.find("EXEC").unwrap();
        assert!(multi < incr && incr < expire && expire < exec);
        assert!(text.contains("3600"));
    }

    #[test]
    fn test_decide_allows_up_to_limit() {
        assert!(decide(1, 3, 100).is_ok());
        assert!(decide(3, 3, 100).is_ok());
        assert!(matches!(
            decide(4, 3, 100),
            Err(AppError::RateLimited {
                retry_after_secs: 100
            })
        ));
    }

    #[test]
    fn test_decide_never_reports_zero_retry() {
        assert!(matches!(
            decide(10, 3, 0),
            Err(AppError::RateLimited { retry_after_secs: 1 })
        ));
    }
}
