//! Paginated listing traversal
//!
//! Pages are fetched strictly in sequence: the next page's URL is only
//! known once the current page is parsed. Any failed page fetch is terminal
//! for the whole crawl attempt; there is no partial listing.

use crate::model::ProblemStub;
use crate::scrape::fetcher::Fetcher;
use crate::scrape::pacer::RequestKind;
use crate::scrape::parser::parse_listing;
use crate::scrape::selectors::LISTING_PATH;
use crate::TrackerError;
use std::sync::Arc;
use url::Url;

/// Walks the solved-problems listing and collects problem stubs
pub struct Pager {
    fetcher: Arc<Fetcher>,
    base: Url,
}

impl Pager {
    pub fn new(fetcher: Arc<Fetcher>, base: Url) -> Self {
        Self { fetcher, base }
    }

    /// Traverses every listing page and returns all stubs in page order
    ///
    /// Terminates when a page has no "next page" control or the control
    /// carries no link. Not resumable mid-page; a failed attempt restarts
    /// from the first page on the next call.
    pub async fn crawl_listing(&self) -> Result<Vec<ProblemStub>, TrackerError> {
        let mut url = self.base.join(LISTING_PATH)?;
        let mut stubs = Vec::new();
        let mut page_count = 0u32;

        loop {
            let body = self
                .fetcher
                .fetch_page(url.as_str(), RequestKind::Listing)
                .await?;
            let page = parse_listing(&body);
            page_count += 1;

            tracing::debug!("Listing page {}: {} stubs", page_count, page.stubs.len());
            stubs.extend(page.stubs);

            match page.next {
                // The next link may be relative; resolve against the current page
                Some(next) => url = url.join(&next)?,
                None => break,
            }
        }

        tracing::info!(
            "Listing crawl done: {} solved problems across {} pages",
            stubs.len(),
            page_count
        );
        Ok(stubs)
    }
}
