//! Distributed per-job leader lock.
//!
//! Grounded on the original `job-orchestrator`'s `lock_manager.py`: acquire
//! with `SET key value NX PX <ttl>` (atomic, no waiting — a failed acquire
//! means another holder is live), release with a Lua script that checks the
//! stored token before deleting, so a stale lock from a crashed process can
//! never be released by the wrong holder. Renewal re-issues the same `PX`
//! expiry under the same token via `PEXPIRE`, guarded the same way.

use redis::aio::ConnectionManager;
use uuid::Uuid;

use crate::error::{OrchestratorError, OrchestratorResult};

const RELEASE_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end
"#;

const RENEW_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("pexpire", KEYS[1], ARGV[2])
else
    return 0
end
"#;

fn lock_key(job_id: Uuid) -> String {
    format!("job:{job_id}")
}

/// A held lock. Dropping this without calling `release` leaves the lock to
/// expire on its own TTL; callers are expected to always call `release` on
/// every stage exit path, matching §5's "orchestrator releases the
/// distributed lock" cancellation contract.
pub struct JobLock {
    conn: ConnectionManager,
    key: String,
    token: String,
}

impl JobLock {
    /// Acquire-or-fail: no waiting, no retry. A stage that cannot acquire
    /// the lock treats the job as already being processed elsewhere.
    pub async fn acquire(
        mut conn: ConnectionManager,
        job_id: Uuid,
        ttl_ms: u64,
    ) -> OrchestratorResult<Self> {
        let key = lock_key(job_id);
        let token = Uuid::now_v7().to_string();

        let acquired: bool = redis::cmd("SET")
            .arg(&key)
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async::<Option<String>>(&mut conn)
            .await
            .map_err(|e| OrchestratorError::Cache(e.to_string()))?
            .is_some();

        if !acquired {
            return Err(OrchestratorError::LockUnavailable(job_id));
        }

        Ok(Self { conn, key, token })
    }

    /// Extend the lock's TTL without changing its token; used by long
    /// stages so the lock survives longer than its initial expiry.
    pub async fn renew(&mut self, ttl_ms: u64) -> OrchestratorResult<bool> {
        let renewed: i32 = redis::Script::new(RENEW_SCRIPT)
            .key(&self.key)
            .arg(&self.token)
            .arg(ttl_ms)
            .invoke_async(&mut self.conn)
            .await
            .map_err(|e| OrchestratorError::Cache(e.to_string()))?;
        Ok(renewed == 1)
    }

    /// Release the lock if (and only if) it still holds our token.
    pub async fn release(mut self) -> OrchestratorResult<bool> {
        let released: i32 = redis::Script::new(RELEASE_SCRIPT)
            .key(&self.key)
            .arg(&self.token)
            .invoke_async(&mut self.conn)
            .await
            .map_err(|e| OrchestratorError::Cache(e.to_string()))?;
        Ok(released == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_key_is_namespaced_by_job_id() {
        let id = Uuid::now_v7();
        assert_eq!(lock_key(id), format!("job:{id}"));
    }
}
