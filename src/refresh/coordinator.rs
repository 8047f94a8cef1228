//! Refresh coordination: staleness checks, single-flight crawls, and the
//! current best-known snapshot
//!
//! The coordinator is the only owner of refresh state. Readers get the last
//! committed snapshot immediately and never wait on a crawl; a staleness
//! check that fires while a crawl is already in flight is a no-op.

use crate::config::Config;
use crate::model::ProblemRecord;
use crate::notify::Notifier;
use crate::refresh::snapshot::Snapshot;
use crate::scrape::Scraper;
use crate::session::SessionManager;
use crate::storage::{SqliteStorage, Store};
use crate::TrackerError;
use chrono::Local;
use std::sync::{Arc, Mutex};

/// What a consumer sees: the best-known records plus a staleness flag
///
/// `stale` is true while a refresh is underway, and also when no fresh
/// snapshot exists yet. The records are always the last fully committed
/// snapshot; they are never mixed with an in-progress crawl's output.
#[derive(Debug, Clone)]
pub struct TrackerView {
    pub stale: bool,
    pub records: Vec<ProblemRecord>,
}

/// Process-wide refresh state
struct RefreshState {
    in_flight: bool,
    last_snapshot: Option<Arc<Snapshot>>,
    /// Whether the cache store has been consulted yet (lazy first load)
    loaded: bool,
}

/// Owns the refresh state machine (IDLE / REFRESHING)
pub struct RefreshCoordinator {
    config: Config,
    session: Arc<SessionManager>,
    store: Arc<Mutex<SqliteStorage>>,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    /// Creates a coordinator with no snapshot loaded yet
    pub fn new(
        config: Config,
        store: SqliteStorage,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, TrackerError> {
        let session = Arc::new(SessionManager::new(&config, notifier)?);

        Ok(Self {
            config,
            session,
            store: Arc::new(Mutex::new(store)),
            state: Mutex::new(RefreshState {
                in_flight: false,
                last_snapshot: None,
                loaded: false,
            }),
        })
    }

    /// Returns the current best-known records and a staleness flag
    ///
    /// Never blocks on a crawl; a potentially one-day-stale snapshot is
    /// served immediately while a background refresh proceeds.
    pub fn current_view(&self) -> Result<TrackerView, TrackerError> {
        let mut state = self.state.lock().unwrap();
        self.load_if_needed(&mut state)?;

        let today = Local::now().date_naive();
        let (stale_by_date, records) = match &state.last_snapshot {
            Some(snapshot) => (snapshot.is_stale(today), snapshot.records.clone()),
            None => (true, Vec::new()),
        };

        Ok(TrackerView {
            stale: state.in_flight || stale_by_date,
            records,
        })
    }

    /// Kicks off a background refresh if the snapshot is stale
    ///
    /// Single-flight: if a crawl is already running, or the snapshot is
    /// from today, this is a no-op. Returns whether a crawl was started.
    pub fn ensure_fresh(this: &Arc<Self>) -> Result<bool, TrackerError> {
        {
            let mut state = this.state.lock().unwrap();
            this.load_if_needed(&mut state)?;

            if state.in_flight {
                return Ok(false);
            }

            let today = Local::now().date_naive();
            let stale = state
                .last_snapshot
                .as_ref()
                .map_or(true, |snapshot| snapshot.is_stale(today));
            if !stale {
                return Ok(false);
            }

            state.in_flight = true;
        }

        let coordinator = Arc::clone(this);
        tokio::spawn(async move {
            if let Err(e) = coordinator.refresh_cycle().await {
                tracing::error!("Background refresh failed, keeping previous snapshot: {}", e);
            }
        });

        Ok(true)
    }

    /// Runs one crawl cycle right now, regardless of snapshot age
    ///
    /// Still single-flight: returns Ok(false) without crawling if a
    /// refresh is already running. Used by the CLI's default mode.
    pub async fn run_once(&self) -> Result<bool, TrackerError> {
        {
            let mut state = self.state.lock().unwrap();
            self.load_if_needed(&mut state)?;

            if state.in_flight {
                return Ok(false);
            }
            state.in_flight = true;
        }

        self.refresh_cycle().await?;
        Ok(true)
    }

    /// One guarded refresh: crawl, commit, swap the snapshot, release
    ///
    /// The in-flight flag must already be set by the caller. It is cleared
    /// on every exit path; the snapshot is replaced only on success.
    async fn refresh_cycle(&self) -> Result<(), TrackerError> {
        tracing::info!("Refresh started");
        let outcome = self.crawl_and_commit().await;

        let mut state = self.state.lock().unwrap();
        state.in_flight = false;

        match outcome {
            Ok(snapshot) => {
                tracing::info!(
                    "Refresh committed: {} records for {}",
                    snapshot.records.len(),
                    snapshot.fetched_at
                );
                state.last_snapshot = Some(Arc::new(snapshot));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Runs the crawl pipeline and persists its result
    ///
    /// A persist failure discards this cycle's records; the previous
    /// snapshot stays authoritative both in the store and in memory.
    async fn crawl_and_commit(&self) -> Result<Snapshot, TrackerError> {
        let scraper = Scraper::new(&self.config, Arc::clone(&self.session))?;
        let records = scraper.run().await?;
        let fetched_at = Local::now().date_naive();

        {
            let mut store = self.store.lock().unwrap();
            store.commit_snapshot(&records, fetched_at)?;
        }

        Ok(Snapshot {
            records,
            fetched_at,
        })
    }

    /// Lazily loads the cached snapshot from the store on first access
    fn load_if_needed(&self, state: &mut RefreshState) -> Result<(), TrackerError> {
        if state.loaded {
            return Ok(());
        }

        let store = self.store.lock().unwrap();
        let records = store.load_problems()?;
        let fetch_date = store.load_fetch_date()?;

        if let Some(fetched_at) = fetch_date {
            tracing::debug!(
                "Loaded {} cached records from {}",
                records.len(),
                fetched_at
            );
            state.last_snapshot = Some(Arc::new(Snapshot {
                records,
                fetched_at,
            }));
        }

        state.loaded = true;
        Ok(())
    }
}
