//! Shared request pacing
//!
//! Every outbound judge-site request must pass through one Pacer, no matter
//! which component issues it. The pacer enforces a minimum spacing between
//! consecutive requests: a fixed delay for listing pagination, a randomized
//! delay within a configured range for enrichment fetches. The last-request
//! instant is kept behind a mutex that is held across the wait, so
//! concurrent callers serialize against a single global spacing contract.

use crate::config::PacingConfig;
use rand::Rng;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// What kind of request is about to be issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A listing page fetch (fixed spacing)
    Listing,

    /// A statistics or submissions fetch (randomized spacing)
    Enrich,
}

/// Global rate limiter for judge-site requests
pub struct Pacer {
    listing_delay: Duration,
    enrich_delay_min_ms: u64,
    enrich_delay_max_ms: u64,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Creates a pacer from the pacing configuration
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            listing_delay: Duration::from_millis(config.listing_delay_ms),
            enrich_delay_min_ms: config.enrich_delay_min_ms,
            enrich_delay_max_ms: config.enrich_delay_max_ms,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until the next request is allowed to proceed
    ///
    /// The very first request goes out immediately. The lock is held for
    /// the whole wait, so two concurrent callers can never violate the
    /// minimum-interval policy between their requests.
    pub async fn throttle(&self, kind: RequestKind) {
        let spacing = self.spacing_for(kind);
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let earliest = previous + spacing;
            let now = Instant::now();
            if earliest > now {
                let wait = earliest - now;
                tracing::debug!("Pacing: waiting {:?} before next request", wait);
                tokio::time::sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
    }

    /// Minimum spacing to apply before a request of the given kind
    fn spacing_for(&self, kind: RequestKind) -> Duration {
        match kind {
            RequestKind::Listing => self.listing_delay,
            RequestKind::Enrich => {
                if self.enrich_delay_min_ms >= self.enrich_delay_max_ms {
                    Duration::from_millis(self.enrich_delay_min_ms)
                } else {
                    let ms = rand::thread_rng()
                        .gen_range(self.enrich_delay_min_ms..=self.enrich_delay_max_ms);
                    Duration::from_millis(ms)
                }
            }
        }
    }
}
