//! HTTP client construction and session-aware page fetching
//!
//! `fetch_page` is the single path every authenticated page request takes:
//! pacing delay, session headers, status check, cookie-rotation absorption,
//! and the logged-in marker check with one bounded re-authentication retry.

use crate::scrape::pacer::{Pacer, RequestKind};
use crate::scrape::parser::is_logged_in;
use crate::session::SessionManager;
use crate::TrackerError;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// How many times a page fetch may run the logged-in check before failing
///
/// One initial attempt plus one retry after a fresh sign-in; a second
/// consecutive logged-out response is fatal for the crawl attempt rather
/// than looping on sign-in forever.
const MAX_AUTH_ATTEMPTS: u32 = 2;

/// Builds an HTTP client for the judge site
///
/// Redirect-following clients are used for page fetches, so an expired
/// session lands on the login page (which fails the logged-in marker check
/// and triggers renewal). The login flow itself uses a non-following client
/// so the set-cookie header of the login response stays observable.
pub fn build_http_client(follow_redirects: bool) -> Result<Client, reqwest::Error> {
    let redirect = if follow_redirects {
        Policy::limited(10)
    } else {
        Policy::none()
    };

    Client::builder()
        .user_agent(format!("kattrack/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues paced, authenticated page fetches
pub struct Fetcher {
    client: Client,
    session: Arc<SessionManager>,
    pacer: Arc<Pacer>,
}

impl Fetcher {
    /// Creates a fetcher sharing the given session and pacing budget
    pub fn new(session: Arc<SessionManager>, pacer: Arc<Pacer>) -> Result<Self, TrackerError> {
        let client = build_http_client(true)?;
        Ok(Self {
            client,
            session,
            pacer,
        })
    }

    /// Fetches an authenticated page and returns its body
    ///
    /// # Request flow
    ///
    /// 1. Complete the shared pacing delay for this request kind
    /// 2. Attach the current session cookie (signing in first if needed)
    /// 3. GET the URL; any non-success status is a fatal FetchError
    /// 4. Absorb a rotated session cookie, if the response carries one
    /// 5. Verify the logged-in marker; if absent, invalidate the session
    ///    and retry the whole fetch once with a fresh sign-in
    pub async fn fetch_page(&self, url: &str, kind: RequestKind) -> Result<String, TrackerError> {
        for attempt in 1..=MAX_AUTH_ATTEMPTS {
            self.pacer.throttle(kind).await;

            let headers = self.session.current_headers().await?;
            let response = self.client.get(url).headers(headers).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(TrackerError::Fetch {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            self.session.absorb_rotation(response.headers()).await;

            let body = response.text().await?;
            if is_logged_in(&body) {
                return Ok(body);
            }

            tracing::warn!(
                "Page {} came back logged out (attempt {}/{})",
                url,
                attempt,
                MAX_AUTH_ATTEMPTS
            );
            self.session.invalidate().await;
        }

        Err(TrackerError::Auth(format!(
            "still logged out after renewing the session for {}",
            url
        )))
    }
}
