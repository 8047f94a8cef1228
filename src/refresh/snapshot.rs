//! Immutable crawl snapshots

use crate::model::ProblemRecord;
use chrono::NaiveDate;

/// One complete, immutable result of a crawl cycle
///
/// Created only by a crawl that finished successfully, and superseded
/// atomically by the next one. `fetched_at` has day granularity.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// All records, ordered by name
    pub records: Vec<ProblemRecord>,

    /// Calendar day of the crawl that produced this snapshot
    pub fetched_at: NaiveDate,
}

impl Snapshot {
    /// Whether this snapshot is older than the given calendar day
    ///
    /// Day-granularity comparison: a snapshot fetched yesterday at 23:59
    /// is stale at 00:00, one fetched today never is.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.fetched_at < today
    }
}
