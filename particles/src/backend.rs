//! Vision backend readiness.
//!
//! The circle finder is not available until its backend has loaded. Instead
//! of a shared "is it loaded yet" flag, consumers hold a [`Readiness`] handle:
//! a single-shot status signal built on a `tokio::sync::watch` channel that
//! they can poll with [`Readiness::status`] or await with [`Readiness::wait`].
//!
//! Status moves `Loading → Initializing → Ready | Failed`. The user can
//! [`force`](Readiness::force) the handle out of any state except `Ready`,
//! which enables the detect action in a degraded mode; a detection attempted
//! while forced and without a finder fails with
//! [`DetectError::BackendUnavailable`]. A finder that arrives late still moves
//! the handle to `Ready`.

#[cfg(test)]
#[path = "backend_test.rs"]
mod backend_test;

use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::watch;

use crate::detect::{CircleFinder, Detector};
use crate::error::DetectError;

/// Load status of the vision backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The backend is being fetched.
    Loading,
    /// The backend is fetched and setting itself up.
    Initializing,
    /// A circle finder is available.
    Ready,
    /// Every source failed. Carries the last failure reason.
    Failed(String),
    /// The user (or the load timeout) chose to continue without a confirmed backend.
    Forced,
}

impl LoadStatus {
    /// Whether the status will not change without outside action.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_) | Self::Forced)
    }

    /// Whether the detect action should be enabled.
    #[must_use]
    pub fn allows_detection(&self) -> bool {
        matches!(self, Self::Ready | Self::Forced)
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("loading"),
            Self::Initializing => f.write_str("initializing"),
            Self::Ready => f.write_str("ready"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            Self::Forced => f.write_str("forced"),
        }
    }
}

struct Inner {
    status: watch::Sender<LoadStatus>,
    finder: OnceLock<Arc<dyn CircleFinder>>,
}

/// Shared handle to the backend's readiness and, once ready, its circle finder.
#[derive(Clone)]
pub struct Readiness {
    inner: Arc<Inner>,
}

impl fmt::Debug for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Readiness").field("status", &self.status()).finish_non_exhaustive()
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness {
    /// A handle in the `Loading` state with no finder.
    #[must_use]
    pub fn new() -> Self {
        let (status, _) = watch::channel(LoadStatus::Loading);
        Self { inner: Arc::new(Inner { status, finder: OnceLock::new() }) }
    }

    /// A handle that is already `Ready` with `finder`.
    #[must_use]
    pub fn ready(finder: Arc<dyn CircleFinder>) -> Self {
        let readiness = Self::new();
        readiness.resolve(finder);
        readiness
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> LoadStatus {
        self.inner.status.borrow().clone()
    }

    /// A receiver that observes every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadStatus> {
        self.inner.status.subscribe()
    }

    /// Report that the backend is fetched and initializing. Only moves out of `Loading`.
    pub fn mark_initializing(&self) {
        self.inner.status.send_if_modified(|status| {
            if *status == LoadStatus::Loading {
                *status = LoadStatus::Initializing;
                return true;
            }
            false
        });
    }

    /// Install the circle finder and move to `Ready`.
    ///
    /// Returns `false` if a finder was already installed; the first one wins.
    pub fn resolve(&self, finder: Arc<dyn CircleFinder>) -> bool {
        if self.inner.finder.set(finder).is_err() {
            return false;
        }
        tracing::info!("vision backend ready");
        self.inner.status.send_replace(LoadStatus::Ready);
        true
    }

    /// Record a load failure. Has no effect once `Ready` or `Forced`.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.inner.status.send_if_modified(|status| match status {
            LoadStatus::Ready | LoadStatus::Forced => false,
            _ => {
                tracing::warn!(%reason, "vision backend failed to load");
                *status = LoadStatus::Failed(reason);
                true
            }
        });
    }

    /// Continue without a confirmed backend. Returns `true` if the status changed.
    pub fn force(&self) -> bool {
        self.inner.status.send_if_modified(|status| match status {
            LoadStatus::Ready | LoadStatus::Forced => false,
            _ => {
                tracing::warn!(previous = %status, "forcing vision backend readiness");
                *status = LoadStatus::Forced;
                true
            }
        })
    }

    /// Wait for a terminal status. If none arrives within `timeout`, force and return `Forced`.
    pub async fn wait(&self, timeout: Duration) -> LoadStatus {
        let mut rx = self.subscribe();
        let settled = match tokio::time::timeout(timeout, rx.wait_for(LoadStatus::is_terminal)).await {
            Ok(Ok(status)) => Some(status.clone()),
            Ok(Err(_)) | Err(_) => None,
        };
        match settled {
            Some(status) => status,
            None => {
                tracing::warn!(timeout_secs = timeout.as_secs_f64(), "vision backend load timed out");
                self.force();
                self.status()
            }
        }
    }

    /// Load from `primary`, trying `fallback` exactly once if it fails.
    ///
    /// Returns the resulting status. A source error is recorded with
    /// [`fail`](Self::fail) and never retried beyond the single fallback.
    pub async fn load<P, F, FF>(&self, primary: P, fallback: F) -> LoadStatus
    where
        P: Future<Output = Result<Arc<dyn CircleFinder>, DetectError>>,
        F: FnOnce() -> FF,
        FF: Future<Output = Result<Arc<dyn CircleFinder>, DetectError>>,
    {
        match primary.await {
            Ok(finder) => {
                self.resolve(finder);
            }
            Err(primary_err) => {
                self.fail(primary_err.to_string());
                match fallback().await {
                    Ok(finder) => {
                        tracing::info!("vision backend loaded from fallback source");
                        self.resolve(finder);
                    }
                    Err(fallback_err) => self.fail(fallback_err.to_string()),
                }
            }
        }
        self.status()
    }

    /// A detector over the installed finder.
    ///
    /// # Errors
    ///
    /// [`DetectError::BackendUnavailable`] when no finder has been installed,
    /// including in `Forced` mode.
    pub fn detector(&self) -> Result<Detector, DetectError> {
        self.inner.finder.get().map(|finder| Detector::new(Arc::clone(finder))).ok_or(DetectError::BackendUnavailable)
    }
}
