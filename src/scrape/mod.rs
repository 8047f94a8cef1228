//! Crawl pipeline for the judge site
//!
//! This module contains the scraping machinery:
//! - Paced, session-aware HTTP fetching
//! - Paginated listing traversal
//! - Per-problem statistics enrichment
//! - The shared request rate limiter

pub mod enricher;
pub mod fetcher;
pub mod pacer;
pub mod pager;
pub mod parser;
pub mod selectors;

pub use enricher::Enricher;
pub use fetcher::{build_http_client, Fetcher};
pub use pacer::{Pacer, RequestKind};
pub use pager::Pager;

use crate::config::Config;
use crate::model::ProblemRecord;
use crate::session::SessionManager;
use crate::TrackerError;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// One complete crawl pipeline: listing traversal plus enrichment
///
/// Pager and Enricher share a single Fetcher, so every request they issue
/// runs through the same session and the same global pacing budget.
pub struct Scraper {
    pager: Pager,
    enricher: Arc<Enricher>,
}

impl Scraper {
    /// Wires up the pipeline against a shared session
    pub fn new(config: &Config, session: Arc<SessionManager>) -> Result<Self, TrackerError> {
        let base = Url::parse(&config.site.base_url)?;
        let pacer = Arc::new(Pacer::new(&config.pacing));
        let fetcher = Arc::new(Fetcher::new(session, pacer)?);

        let pager = Pager::new(Arc::clone(&fetcher), base.clone());
        let enricher = Arc::new(Enricher::new(
            fetcher,
            base,
            config.user.full_name.clone(),
            config.user.username.clone(),
        ));

        Ok(Self { pager, enricher })
    }

    /// Runs one full crawl: every listing page, then every enrichment
    ///
    /// Enrichment of distinct stubs runs concurrently; the shared pacer
    /// still serializes their network calls. Any single failure makes the
    /// whole attempt fail - no partial result is ever returned. The
    /// returned records are sorted by name.
    pub async fn run(&self) -> Result<Vec<ProblemRecord>, TrackerError> {
        let stubs = self.pager.crawl_listing().await?;

        let mut tasks = JoinSet::new();
        for stub in stubs {
            let enricher = Arc::clone(&self.enricher);
            tasks.spawn(async move { enricher.enrich(stub).await });
        }

        let mut records = Vec::new();
        let mut first_error: Option<TrackerError> = None;

        // In-flight tasks run to completion even after a failure; there is
        // no cancellation, only a terminal error for the attempt.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(record)) => records.push(record),
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(TrackerError::Join(e));
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}
