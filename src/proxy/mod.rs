//! Interception pipeline: mode policy and the interceptor stage
//!
//! All cache-touching work from every [`Interceptor`] in the process runs
//! under one coarse lock. It is deliberately not striped by key.

mod interceptor;
mod policy;

pub use interceptor::Interceptor;
pub use policy::ModePolicy;

use tokio::sync::{Mutex, MutexGuard};

static CACHE_LOCK: Mutex<()> = Mutex::const_new(());

/// Acquire the process-wide cache lock
///
/// Released when the guard is dropped, including when the holding future is
/// cancelled.
pub(crate) async fn lock_cache() -> MutexGuard<'static, ()> {
    CACHE_LOCK.lock().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lock_released_on_cancellation() {
        let holder = tokio::spawn(async {
            let _guard = lock_cache().await;
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        holder.abort();
        let _ = holder.await;

        let acquired = tokio::time::timeout(Duration::from_secs(5), lock_cache()).await;
        assert!(acquired.is_ok(), "lock must be free after the holder is cancelled");
    }
}
