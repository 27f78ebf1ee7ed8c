use std::future::Future;
use std::time::Duration;

/// Default pause after every request, in milliseconds.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1_000;

/// Fixed-delay request pacer.
///
/// Every operation run through the pacer is followed by a fixed pause before
/// the result is handed back, so a caller issuing requests one after another
/// can never exceed one request per `delay`. This is a plain fixed-rate
/// throttle: it never looks at rate-limit response headers.
///
/// # Example
///
/// ```ignore
/// use locus::RequestPacer;
///
/// let pacer = RequestPacer::new(Duration::from_secs(1));
/// let response = pacer.run(|| transport.get(request)).await;
/// ```
#[derive(Debug, Clone)]
pub struct RequestPacer {
    delay: Duration,
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A pacer that never pauses.
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation` to completion, then pause for the configured delay.
    ///
    /// The pause happens whatever the operation returned.
    pub async fn run<T, F, Fut>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let output = operation().await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        output
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_REQUEST_DELAY_MS))
    }
}
