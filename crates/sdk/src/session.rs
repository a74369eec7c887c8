//! Shared session configuration.
//!
//! The host delivers configuration wholesale; outbound calls read an
//! immutable snapshot so a call never sees half of an update.

use crate::config::{HostConfig, SessionConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Holder for the active [`SessionConfig`], shared between the host
/// integration layer (which writes) and the dispatcher (which reads).
#[derive(Debug, Default)]
pub struct SessionConfigHolder {
    current: RwLock<Arc<SessionConfig>>,
    in_flight: AtomicUsize,
}

impl SessionConfigHolder {
    /// Create a holder with the start-up defaults (sandbox, no credentials).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a holder already populated from a host payload.
    pub fn with_host_config(host: &HostConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(SessionConfig::from_host(host))),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Replace the whole configuration from a host payload.
    ///
    /// Updates are expected before traffic starts. An update that lands while
    /// calls are in flight is still applied, but logged, since those calls
    /// keep using the snapshot they started with.
    pub async fn apply(&self, host: &HostConfig) -> Arc<SessionConfig> {
        let next = Arc::new(SessionConfig::from_host(host));

        let busy = self.in_flight();
        if busy > 0 {
            warn!(in_flight = busy, "Session configuration replaced while requests are in flight");
        }

        *self.current.write().await = next.clone();

        info!(
            environment = %next.environment,
            base_url = %next.base_url,
            credentials = next.has_credentials(),
            "Session configuration applied"
        );
        next
    }

    /// Current configuration.
    pub async fn snapshot(&self) -> Arc<SessionConfig> {
        self.current.read().await.clone()
    }

    /// Number of outbound calls currently holding a snapshot.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Take a snapshot and mark a call as in flight until the guard drops.
    pub(crate) async fn begin_call(&self) -> CallGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        CallGuard {
            holder: self,
            config: self.snapshot().await,
        }
    }
}

/// Marks one outbound call as in flight.
pub(crate) struct CallGuard<'a> {
    holder: &'a SessionConfigHolder,
    pub(crate) config: Arc<SessionConfig>,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.holder.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
