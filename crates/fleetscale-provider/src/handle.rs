//! Shared, serialized access to the provider from async code.
//!
//! Manager operations block on fleet round trips, so every operation runs on
//! the blocking pool behind one mutex. Only one operation touches the
//! provider at a time, whether it comes from the refresh loop or the API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::FleetProvider;

#[derive(Clone)]
pub struct ProviderHandle {
    inner: Arc<Mutex<FleetProvider>>,
    /// Upper bound for one operation, including time spent waiting for the lock.
    timeout: Duration,
}

impl ProviderHandle {
    pub fn new(provider: FleetProvider, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(provider)),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `op` against the provider on the blocking pool.
    ///
    /// On timeout the caller gets [`ProviderError::Timeout`]; the operation
    /// itself keeps running to completion and releases the lock afterwards.
    /// A panicking operation fails with [`ProviderError::Task`] and leaves
    /// the provider usable for later calls.
    pub async fn call<T, F>(&self, op: F) -> ProviderResult<T>
    where
        F: FnOnce(&mut FleetProvider) -> ProviderResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        let task = tokio::task::spawn_blocking(move || {
            let mut provider = inner.lock().unwrap_or_else(|poisoned| {
                warn!("provider lock poisoned by a failed operation, recovering");
                poisoned.into_inner()
            });
            op(&mut *provider)
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(ProviderError::Task(e.to_string())),
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        }
    }

    pub async fn refresh(&self) -> ProviderResult<()> {
        self.call(|provider| provider.refresh()).await
    }

    /// Refresh every `interval` until `shutdown` flips.
    pub async fn run_refresh_loop(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_ms = interval.as_millis() as u64, "refresh loop started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    match self.refresh().await {
                        Ok(()) => debug!("node groups refreshed"),
                        Err(e) => error!(error = %e, "node group refresh failed"),
                    }
                }
                _ = shutdown.changed() => {
                    info!("refresh loop shutting down");
                    break;
                }
            }
        }
    }
}
