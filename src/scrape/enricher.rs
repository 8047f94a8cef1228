//! Per-problem enrichment
//!
//! For each stub, one statistics fetch finds the fastest global time and,
//! on the fast path, the user's own leaderboard placement. Only when the
//! user is not on the leaderboard does a second fetch of their submissions
//! page run, to find their best accepted CPU time.

use crate::model::{ProblemRecord, ProblemStub, TopPlacement};
use crate::scrape::fetcher::Fetcher;
use crate::scrape::pacer::RequestKind;
use crate::scrape::parser::{best_accepted_time, scan_toplist};
use crate::scrape::selectors::{statistics_path, submissions_path};
use crate::TrackerError;
use std::sync::Arc;
use url::Url;

/// Enriches problem stubs with runtime statistics
pub struct Enricher {
    fetcher: Arc<Fetcher>,
    base: Url,
    full_name: String,
    username: String,
}

impl Enricher {
    pub fn new(fetcher: Arc<Fetcher>, base: Url, full_name: String, username: String) -> Self {
        Self {
            fetcher,
            base,
            full_name,
            username,
        }
    }

    /// Turns a stub into a full record
    ///
    /// Fast path: the user appears on the statistics page's leaderboard,
    /// so rank, own time, and fastest global time all come from one
    /// request. Fallback: a second request to the submissions page finds
    /// the minimum accepted CPU time; no top-rank fields are set.
    ///
    /// Any non-success fetch is fatal for the whole crawl attempt, since a
    /// snapshot with holes would corrupt the cache.
    pub async fn enrich(&self, stub: ProblemStub) -> Result<ProblemRecord, TrackerError> {
        let stats_url = self.base.join(&statistics_path(&stub.href))?;
        let body = self
            .fetcher
            .fetch_page(stats_url.as_str(), RequestKind::Enrich)
            .await?;

        let scan = scan_toplist(&body, &self.full_name);

        if let Some(own) = scan.own_row {
            tracing::debug!("{}: on the leaderboard at rank {}", stub.name, own.rank);
            return Ok(ProblemRecord {
                name: stub.name,
                href: stub.href,
                fastest_global: scan.fastest_global,
                mine: own.runtime,
                top: Some(TopPlacement {
                    rank: own.rank,
                    href: stats_url.to_string(),
                }),
            });
        }

        let subs_url = self
            .base
            .join(&submissions_path(&stub.href, &self.username))?;
        let body = self
            .fetcher
            .fetch_page(subs_url.as_str(), RequestKind::Enrich)
            .await?;
        let mine = best_accepted_time(&body);

        tracing::debug!("{}: best accepted time '{}'", stub.name, mine);
        Ok(ProblemRecord {
            name: stub.name,
            href: stub.href,
            fastest_global: scan.fastest_global,
            mine,
            top: None,
        })
    }
}
