//! Bounded pool of live browser instances
//!
//! Capacity is enforced with a semaphore: a permit is taken before an
//! instance is launched and handed back only after the instance has been shut
//! down, so the number of live instances never exceeds the capacity.

use crate::config::BrowserConfig;
use crate::fetcher::ChromeLauncher;
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Starts and stops the instances a [`ResourcePool`] hands out
#[async_trait]
pub trait Launcher: Send + Sync + 'static {
    type Instance: Send + Sync + 'static;

    async fn launch(&self) -> Result<Self::Instance>;

    /// Tears an instance down; failures are logged, never returned
    async fn shutdown(&self, instance: Arc<Self::Instance>);
}

/// The pool used by the render engine
pub type BrowserPool = ResourcePool<ChromeLauncher>;

type LiveMap<I> = Arc<Mutex<HashMap<u64, Arc<I>>>>;

fn lock<I>(live: &LiveMap<I>) -> MutexGuard<'_, HashMap<u64, Arc<I>>> {
    live.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fixed-capacity pool of launched instances
pub struct ResourcePool<L: Launcher> {
    launcher: L,
    permits: Arc<Semaphore>,
    capacity: usize,
    live: LiveMap<L::Instance>,
    next_id: AtomicU64,
}

/// Permit to use one live instance
///
/// Hand it back with [`ResourcePool::release`]. A token dropped without being
/// released (panic, cancelled future) still returns its capacity, but the
/// instance is only torn down by its own `Drop`.
pub struct PoolToken<I: Send + Sync + 'static> {
    id: u64,
    instance: Arc<I>,
    live: LiveMap<I>,
    released: bool,
    _permit: OwnedSemaphorePermit,
}

impl<I: Send + Sync + 'static> PoolToken<I> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn instance(&self) -> &I {
        &self.instance
    }
}

impl<I: Send + Sync + 'static> Drop for PoolToken<I> {
    fn drop(&mut self) {
        if !self.released && lock(&self.live).remove(&self.id).is_some() {
            tracing::warn!("Pool token {} dropped without release", self.id);
        }
    }
}

impl<L: Launcher> ResourcePool<L> {
    /// Creates a pool that keeps at most `capacity` instances alive
    ///
    /// A capacity of zero is raised to one.
    pub fn new(launcher: L, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            launcher,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            live: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tokens currently outstanding, launches in progress included
    pub fn in_use(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    /// Instances currently launched and not yet shut down
    pub fn live_count(&self) -> usize {
        lock(&self.live).len()
    }

    /// Waits for capacity, then launches a new instance
    ///
    /// # Errors
    ///
    /// * `PoolClosed` after [`close_all`](Self::close_all)
    /// * whatever the launcher fails with; the slot is freed again
    pub async fn acquire(&self) -> Result<PoolToken<L::Instance>> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ScrapeError::PoolClosed)?;

        let instance = Arc::new(self.launcher.launch().await?);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.live).insert(id, Arc::clone(&instance));

        tracing::debug!(
            "Acquired instance {} ({}/{} in use)",
            id,
            self.in_use(),
            self.capacity
        );

        Ok(PoolToken {
            id,
            instance,
            live: Arc::clone(&self.live),
            released: false,
            _permit: permit,
        })
    }

    /// Shuts the token's instance down and frees its slot
    ///
    /// Never fails. Releasing after [`close_all`](Self::close_all) already
    /// tore the instance down only frees the slot.
    pub async fn release(&self, mut token: PoolToken<L::Instance>) {
        token.released = true;
        let instance = lock(&self.live).remove(&token.id);

        if let Some(instance) = instance {
            self.launcher.shutdown(instance).await;
        }

        tracing::debug!("Released instance {}", token.id);
        // Permit goes back only now, after shutdown
        drop(token);
    }

    /// Shuts down every live instance and refuses further acquires
    pub async fn close_all(&self) {
        self.permits.close();

        let instances: Vec<(u64, Arc<L::Instance>)> = lock(&self.live).drain().collect();
        if instances.is_empty() {
            return;
        }

        tracing::info!("Closing {} live browser instance(s)", instances.len());
        for (id, instance) in instances {
            tracing::debug!("Shutting down instance {}", id);
            self.launcher.shutdown(instance).await;
        }
    }
}

impl ResourcePool<ChromeLauncher> {
    /// Builds the browser pool sized by `max-browsers`
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self::new(ChromeLauncher::from_config(config), config.max_browsers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        live: AtomicUsize,
        peak: AtomicUsize,
        launches: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    struct TestLauncher {
        counters: Arc<Counters>,
        fail: bool,
    }

    struct TestInstance;

    impl TestLauncher {
        fn new(fail: bool) -> (Self, Arc<Counters>) {
            let counters = Arc::new(Counters::default());
            (
                Self {
                    counters: Arc::clone(&counters),
                    fail,
                },
                counters,
            )
        }
    }

    #[async_trait]
    impl Launcher for TestLauncher {
        type Instance = TestInstance;

        async fn launch(&self) -> Result<TestInstance> {
            self.counters.launches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            if self.fail {
                return Err(ScrapeError::BrowserLaunch("no browser".to_string()));
            }

            let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.peak.fetch_max(live, Ordering::SeqCst);
            Ok(TestInstance)
        }

        async fn shutdown(&self, _instance: Arc<TestInstance>) {
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.counters.live.fetch_sub(1, Ordering::SeqCst);
            self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_capacity_never_exceeded() {
        let (launcher, counters) = TestLauncher::new(false);
        let pool = Arc::new(ResourcePool::new(launcher, 3));

        let mut tasks = Vec::new();
        for i in 0..20 {
            let pool = Arc::clone(&pool);
            tasks.push(tokio::spawn(async move {
                let token = pool.acquire().await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
                // Every other caller "fails" after acquiring; it must still release
                let outcome: Result<()> = if i % 2 == 0 {
                    Ok(())
                } else {
                    Err(ScrapeError::Render {
                        url: "https://example.com".to_string(),
                        message: "boom".to_string(),
                    })
                };
                pool.release(token).await;
                outcome
            }));
        }

        for task in tasks {
            let _ = task.await.unwrap();
        }

        assert!(counters.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(counters.launches.load(Ordering::SeqCst), 20);
        assert_eq!(counters.live.load(Ordering::SeqCst), 0);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.live_count(), 0);
    }

    #[tokio::test]
    async fn test_acquire_waits_for_release() {
        let (launcher, _counters) = TestLauncher::new(false);
        let pool = Arc::new(ResourcePool::new(launcher, 1));

        let first = pool.acquire().await.unwrap();

        let waiter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move {
                let token = pool.acquire().await.unwrap();
                pool.release(token).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        pool.release(first).await;
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish once capacity frees")
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_launch_frees_slot() {
        let (launcher, counters) = TestLauncher::new(true);
        let pool = ResourcePool::new(launcher, 1);

        for _ in 0..3 {
            let result = tokio::time::timeout(Duration::from_secs(1), pool.acquire())
                .await
                .expect("acquire must not hang after a failed launch");
            assert!(matches!(result, Err(ScrapeError::BrowserLaunch(_))));
        }

        assert_eq!(counters.launches.load(Ordering::SeqCst), 3);
        assert_eq!(pool.in_use(), 0);
    }

    #[tokio::test]
    async fn test_dropped_token_returns_capacity() {
        let (launcher, _counters) = TestLauncher::new(false);
        let pool = ResourcePool::new(launcher, 1);

        let token = pool.acquire().await.unwrap();
        assert_eq!(pool.live_count(), 1);
        drop(token);

        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.in_use(), 0);

        let token = tokio::time::timeout(Duration::from_secs(1), pool.acquire())
            .await
            .unwrap()
            .unwrap();
        pool.release(token).await;
    }

    #[tokio::test]
    async fn test_close_all_shuts_down_outstanding() {
        let (launcher, counters) = TestLauncher::new(false);
        let pool = ResourcePool::new(launcher, 2);

        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();
        assert_eq!(counters.live.load(Ordering::SeqCst), 2);

        pool.close_all().await;
        assert_eq!(counters.live.load(Ordering::SeqCst), 0);
        assert_eq!(pool.live_count(), 0);

        // Late releases only free the slot
        pool.release(a).await;
        pool.release(b).await;
        assert_eq!(counters.shutdowns.load(Ordering::SeqCst), 2);

        assert!(matches!(pool.acquire().await, Err(ScrapeError::PoolClosed)));
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let (launcher, _counters) = TestLauncher::new(false);
        let pool = ResourcePool::new(launcher, 0);
        assert_eq!(pool.capacity(), 1);
    }
}
