use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    /// The awaited condition never held; carries the page specific message.
    #[error("{message} (waited {}ms)", .waited.as_millis())]
    Timeout { message: String, waited: Duration },
}

/// Minimal view of a browser session used by page objects.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn is_existing(&self, selector: &str) -> bool;

    /// Visible text of the first element matching `selector`.
    async fn get_text(&self, selector: &str) -> Option<String>;
}

/// A located element, addressed by the selector that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub selector: String,
}

/// Polling parameters for [`wait_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Wait {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Re-evaluates `condition` every `interval` until it holds or `timeout`
/// passes. The condition is always checked at least once.
pub async fn wait_until<F, Fut>(wait: Wait, message: impl Into<String>, mut condition: F) -> Result<(), PageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = tokio::time::Instant::now();
    loop {
        if condition().await {
            return Ok(());
        }
        let waited = started.elapsed();
        if waited >= wait.timeout {
            let message = message.into();
            tracing::debug!(%message, "Page wait timed out");
            return Err(PageError::Timeout { message, waited });
        }
        let remaining = wait.timeout - waited;
        tokio::time::sleep(wait.interval.min(remaining)).await;
    }
}
